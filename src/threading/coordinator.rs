use crossbeam::channel::{self, select, Receiver, Sender};
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::runtime::Error;

pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Shared state of one pipeline run: progress counters, the first fatal
/// error and the cancellation signal.
///
/// Cancellation is broadcast by dropping the only sender of a channel that
/// never carries messages; every clone of the receiver then becomes ready
/// at once, so it can take part in `select!` next to the work queues.
pub struct Coordinator {
    n_accepted: AtomicU64,
    n_skipped: AtomicU64,
    n_written: AtomicU64,
    progress_interval: u64,

    cancelled: AtomicBool,
    cancel_tx: Mutex<Option<Sender<()>>>,
    cancel_rx: Receiver<()>,
    first_error: Mutex<Option<Error>>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Coordinator {
        Coordinator::with_progress_interval(DEFAULT_PROGRESS_INTERVAL)
    }

    pub fn with_progress_interval(progress_interval: u64) -> Coordinator {
        let (cancel_tx, cancel_rx) = channel::bounded::<()>(0);
        Coordinator {
            n_accepted: AtomicU64::new(0),
            n_skipped: AtomicU64::new(0),
            n_written: AtomicU64::new(0),
            progress_interval: progress_interval.max(1),
            cancelled: AtomicBool::new(false),
            cancel_tx: Mutex::new(Some(cancel_tx)),
            cancel_rx,
            first_error: Mutex::new(None),
        }
    }

    pub fn record_accepted(&self) {
        let n = self.n_accepted.fetch_add(1, Ordering::Relaxed) + 1;
        if n % self.progress_interval == 0 {
            info!(
                "Processed {} records ({} skipped)",
                n,
                self.n_skipped.load(Ordering::Relaxed)
            );
        }
    }

    pub fn record_skipped(&self) {
        self.n_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_written(&self, n: u64) {
        self.n_written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn n_accepted(&self) -> u64 {
        self.n_accepted.load(Ordering::Relaxed)
    }

    pub fn n_skipped(&self) -> u64 {
        self.n_skipped.load(Ordering::Relaxed)
    }

    pub fn n_written(&self) -> u64 {
        self.n_written.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A receiver that becomes ready (disconnected) once the run is cancelled
    pub fn cancel_signal(&self) -> Receiver<()> {
        self.cancel_rx.clone()
    }

    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("Cancelling all pipeline stages");
        let mut cancel_tx = self.cancel_tx.lock().unwrap_or_else(|e| e.into_inner());
        cancel_tx.take();
    }

    /// Record a fatal error and cancel the run. Only the first error is kept
    pub fn fail(&self, err: Error) {
        {
            let mut first_error = self.first_error.lock().unwrap_or_else(|e| e.into_inner());
            if first_error.is_none() {
                error!("{}", err);
                *first_error = Some(err);
            } else {
                debug!("Discarding error raised after cancellation: {}", err);
            }
        }
        self.cancel();
    }

    pub fn take_error(&self) -> Option<Error> {
        self.first_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

/// Blocking send that gives up when the run is cancelled or the receiving
/// side is gone. Returns whether the message was delivered
pub fn send_or_cancel<T>(tx: &Sender<T>, msg: T, cancel: &Receiver<()>) -> bool {
    select! {
        send(tx, msg) -> res => res.is_ok(),
        recv(cancel) -> _ => false,
    }
}

/// Blocking receive that gives up when the run is cancelled or all senders
/// are gone
pub fn recv_or_cancel<T>(rx: &Receiver<T>, cancel: &Receiver<()>) -> Option<T> {
    select! {
        recv(rx) -> msg => msg.ok(),
        recv(cancel) -> _ => None,
    }
}
