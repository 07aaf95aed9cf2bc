use crossbeam::channel::Sender;
use log::debug;

use crate::common::{Batch, ReadPair};
use crate::runtime::Result;
use crate::threading::{send_or_cancel, Coordinator};

/// Groups consecutive read pairs into numbered batches of at most
/// `batch_size` pairs. The last batch may be short; an empty input yields
/// no batch at all
pub struct Batcher<I> {
    pairs: I,
    batch_size: usize,
    next_seq_no: u64,
    done: bool,
}

impl<I> Batcher<I>
where
    I: Iterator<Item = Result<ReadPair>>,
{
    pub fn new(pairs: I, batch_size: usize) -> Batcher<I> {
        Batcher {
            pairs,
            batch_size: batch_size.max(1),
            next_seq_no: 0,
            done: false,
        }
    }
}

impl<I> Iterator for Batcher<I>
where
    I: Iterator<Item = Result<ReadPair>>,
{
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut pairs = Vec::with_capacity(self.batch_size);
        while pairs.len() < self.batch_size {
            match self.pairs.next() {
                Some(Ok(pair)) => pairs.push(pair),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if pairs.is_empty() {
            return None;
        }
        let seq_no = self.next_seq_no;
        self.next_seq_no += 1;
        Some(Ok(Batch { seq_no, pairs }))
    }
}

/// Push batches onto the work queue until the input ends, an error is hit
/// or the run is cancelled.
///
/// Every batch needs a ticket from `window` before it is read. The writer
/// hands tickets back once it has written a batch, so at most
/// `window.capacity()` batches exist between reading and writing. Blocks
/// while the window or the work queue is full.
/// Returns the number of batches handed over
pub fn dispatch_batches<I>(
    mut batches: I,
    tx: &Sender<Batch>,
    window: &Sender<()>,
    coordinator: &Coordinator,
) -> u64
where
    I: Iterator<Item = Result<Batch>>,
{
    let cancel = coordinator.cancel_signal();
    let mut n_sent = 0;
    loop {
        if coordinator.is_cancelled() {
            break;
        }
        if !send_or_cancel(window, (), &cancel) {
            debug!("Batch window closed, stopping reader");
            break;
        }
        match batches.next() {
            None => break,
            Some(Ok(batch)) => {
                if !send_or_cancel(tx, batch, &cancel) {
                    debug!("Work queue closed, stopping reader");
                    break;
                }
                n_sent += 1;
            }
            Some(Err(e)) => {
                coordinator.fail(e);
                break;
            }
        }
    }
    n_sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Record;
    use crate::runtime::Error;
    use crossbeam::channel;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_until<F: Fn() -> bool>(cond: F) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn pairs(n: u64) -> Vec<Result<ReadPair>> {
        (0..n)
            .map(|index| {
                Ok(ReadPair {
                    r1: Record::new(format!("r{}/1", index).as_bytes(), b"A", b"I"),
                    r2: Record::new(format!("r{}/2", index).as_bytes(), b"A", b"I"),
                    index,
                })
            })
            .collect()
    }

    #[test]
    fn test_batch_sizes_and_numbering() {
        let batches: Vec<Batch> = Batcher::new(pairs(7).into_iter(), 3)
            .map(|b| b.unwrap())
            .collect();
        let sizes: Vec<usize> = batches.iter().map(|b| b.pairs.len()).collect();
        let seq_nos: Vec<u64> = batches.iter().map(|b| b.seq_no).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(seq_nos, vec![0, 1, 2]);

        let indices: Vec<u64> = batches
            .iter()
            .flat_map(|b| b.pairs.iter().map(|p| p.index))
            .collect();
        assert_eq!(indices, (0..7).collect::<Vec<u64>>());
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let n = Batcher::new(pairs(6).into_iter(), 3).count();
        assert_eq!(n, 2);
        assert_eq!(Batcher::new(pairs(0).into_iter(), 3).count(), 0);
    }

    #[test]
    fn test_error_ends_batching() {
        let mut input = pairs(2);
        input.push(Err(Error::stream_desync(2, "R2")));
        input.extend(pairs(2));
        let mut batcher = Batcher::new(input.into_iter(), 10);
        assert!(matches!(batcher.next(), Some(Err(Error::StreamDesync { .. }))));
        assert!(batcher.next().is_none());
    }

    #[test]
    fn test_dispatch_records_error() {
        let coordinator = Coordinator::new();
        let (tx, rx) = channel::bounded(10);
        let mut input = pairs(2);
        input.push(Err(Error::stream_desync(2, "R1")));

        let (window, _tickets) = channel::bounded(10);
        let n_sent = dispatch_batches(
            Batcher::new(input.into_iter(), 1),
            &tx,
            &window,
            &coordinator,
        );
        assert_eq!(n_sent, 2);
        assert_eq!(rx.len(), 2);
        assert!(coordinator.is_cancelled());
        assert!(matches!(
            coordinator.take_error(),
            Some(Error::StreamDesync { .. })
        ));
    }

    #[test]
    fn test_dispatch_stops_when_workers_are_gone() {
        let coordinator = Coordinator::new();
        let (tx, rx) = channel::bounded(1);
        drop(rx);
        let (window, _tickets) = channel::bounded(10);
        let n_sent = dispatch_batches(
            Batcher::new(pairs(5).into_iter(), 1),
            &tx,
            &window,
            &coordinator,
        );
        assert_eq!(n_sent, 0);
    }

    #[test]
    fn test_dispatch_blocks_on_full_window() {
        let coordinator = Arc::new(Coordinator::new());
        let (tx, rx) = channel::bounded(100);
        let (window, tickets) = channel::bounded(3);

        let handle = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                dispatch_batches(
                    Batcher::new(pairs(20).into_iter(), 1),
                    &tx,
                    &window,
                    &coordinator,
                )
            })
        };

        // nothing is written, so no ticket ever comes back
        wait_until(|| rx.len() == 3);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rx.len(), 3);
        assert_eq!(tickets.len(), 3);

        // writing one batch lets exactly one more through
        tickets.recv().unwrap();
        wait_until(|| rx.len() == 4);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rx.len(), 4);

        coordinator.cancel();
        assert_eq!(handle.join().unwrap(), 4);
        let seq_nos: Vec<u64> = rx.try_iter().map(|b| b.seq_no).collect();
        assert_eq!(seq_nos, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dispatch_stops_when_writer_is_gone() {
        let coordinator = Coordinator::new();
        let (tx, rx) = channel::bounded(10);
        let (window, tickets) = channel::bounded(10);
        drop(tickets);
        let n_sent = dispatch_batches(
            Batcher::new(pairs(5).into_iter(), 1),
            &tx,
            &window,
            &coordinator,
        );
        assert_eq!(n_sent, 0);
        assert!(rx.is_empty());
    }
}
