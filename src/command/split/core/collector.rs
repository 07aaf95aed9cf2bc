use crossbeam::channel::Receiver;
use log::{debug, trace};
use std::io::Write;

use crate::common::OutputBatch;
use crate::fileformat::TripleWriter;
use crate::runtime::{Error, Result};
use crate::threading::{recv_or_cancel, Coordinator, ReorderBuffer};

/// Writes output batches in the order they were read, whatever order the
/// workers finish them in
pub struct OrderedCollector<W: Write> {
    pending: ReorderBuffer<OutputBatch>,
    writer: TripleWriter<W>,
}

impl<W: Write> OrderedCollector<W> {
    pub fn new(writers: [W; 3]) -> OrderedCollector<W> {
        OrderedCollector {
            pending: ReorderBuffer::new(),
            writer: TripleWriter::new(writers),
        }
    }

    /// Take one batch; write it and every batch it unblocks.
    /// Returns the number of triples written
    pub fn accept(&mut self, batch: OutputBatch) -> Result<u64> {
        trace!(
            "Collector got batch {} (expecting {}, {} pending)",
            batch.seq_no,
            self.pending.next_seq(),
            self.pending.len()
        );
        self.pending.insert(batch.seq_no, batch)?;

        let mut n_written = 0;
        while let Some(batch) = self.pending.pop_ready() {
            for triple in &batch.triples {
                self.writer.write_triple(triple)?;
            }
            n_written += batch.triples.len() as u64;
        }
        Ok(n_written)
    }

    pub fn next_seq(&self) -> u64 {
        self.pending.next_seq()
    }

    pub fn n_pending(&self) -> usize {
        self.pending.len()
    }

    pub fn n_written(&self) -> u64 {
        self.writer.n_written()
    }

    /// Flush and return the sinks. With `require_complete`, batches still
    /// parked mean an earlier batch never arrived
    pub fn finish(self, require_complete: bool) -> Result<[W; 3]> {
        if require_complete {
            if let Some(seq_no) = self.pending.lowest_pending() {
                return Err(Error::sequence_violation(seq_no, self.pending.next_seq()));
            }
        }
        self.writer.into_inner()
    }
}

/// Writer thread body: collect until the workers are done or the run is
/// cancelled, then close the outputs. One ticket goes back to `window` for
/// every batch written, which lets the reader start on another one
pub fn collect_batches<W: Write>(
    rx: &Receiver<OutputBatch>,
    window: &Receiver<()>,
    writers: [W; 3],
    coordinator: &Coordinator,
) -> Option<[W; 3]> {
    let cancel = coordinator.cancel_signal();
    let mut collector = OrderedCollector::new(writers);

    'collect: while let Some(batch) = recv_or_cancel(rx, &cancel) {
        if coordinator.is_cancelled() {
            break;
        }
        let seq_before = collector.next_seq();
        match collector.accept(batch) {
            Ok(n) => coordinator.record_written(n),
            Err(e) => {
                coordinator.fail(e);
                break;
            }
        }
        for _ in seq_before..collector.next_seq() {
            if recv_or_cancel(window, &cancel).is_none() {
                break 'collect;
            }
        }
    }
    debug!(
        "Collector done: {} triples written, {} batches pending",
        collector.n_written(),
        collector.n_pending()
    );

    match collector.finish(!coordinator.is_cancelled()) {
        Ok(writers) => Some(writers),
        Err(e) => {
            coordinator.fail(e);
            None
        }
    }
}
