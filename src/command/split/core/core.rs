use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, info, trace};
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

use seq_io::fastq::Reader as FastqReader;

use super::batcher::{dispatch_batches, Batcher};
use super::collector::collect_batches;
use super::params;

use crate::barcode;
use crate::common::{Batch, OutputBatch};
use crate::fileformat::{self, FastqOutput, PairedReader};
use crate::runtime::{Error, Result};
use crate::threading::{recv_or_cancel, send_or_cancel, Coordinator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitStats {
    /// Read pairs consumed from the inputs
    pub pairs: u64,
    pub accepted: u64,
    pub skipped: u64,
    /// Records written to each of the three outputs
    pub written: u64,
}

pub struct SplitReport<W> {
    pub stats: SplitStats,
    pub writers: [W; 3],
}

/// Cancels the run if a worker unwinds
struct PanicGuard<'a>(&'a Coordinator);

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

////////// loop for a worker thread
fn loop_worker(rx: &Receiver<Batch>, tx: &Sender<OutputBatch>, coordinator: &Coordinator) {
    let _guard = PanicGuard(coordinator);
    let cancel = coordinator.cancel_signal();

    while let Some(batch) = recv_or_cancel(rx, &cancel) {
        if coordinator.is_cancelled() {
            break;
        }
        trace!("Worker got batch {} ({} pairs)", batch.seq_no, batch.pairs.len());
        match barcode::transform_batch(batch) {
            Ok(output) => {
                if !send_or_cancel(tx, output, &cancel) {
                    break;
                }
            }
            Err(e) => {
                coordinator.fail(e);
                break;
            }
        }
    }
}

pub struct Splitter {}

impl Splitter {
    /// Run the pipeline over two FASTQ readers and three sinks.
    ///
    /// Reading and batching happen on the calling thread, the transform on
    /// `threads_work` pool threads and writing on one dedicated thread. All
    /// stages talk through queues of `queue_depth` batches, and no more than
    /// `queue_depth + threads_work` batches are read ahead of the writer, so
    /// memory stays bounded whatever the input size or the order in which
    /// workers finish.
    pub fn run_streams<R1, R2, W>(
        reader_r1: FastqReader<R1>,
        reader_r2: FastqReader<R2>,
        writers: [W; 3],
        params_runtime: &params::Runtime,
        params_threading: &params::Threading,
    ) -> Result<SplitReport<W>>
    where
        R1: Read,
        R2: Read,
        W: Write + Send + 'static,
    {
        let coordinator = Arc::new(Coordinator::new());
        let threads_work = params_threading.threads_work.max(1);
        let queue_depth = params_threading.queue_depth.max(1);
        let window = params_threading.batch_window();

        // Limit how many batches can be in the air at the same time
        let (tx_work, rx_work) = channel::bounded::<Batch>(queue_depth);
        let (tx_out, rx_out) = channel::bounded::<OutputBatch>(queue_depth);
        // One ticket per batch between reading and writing
        let (tx_window, rx_window) = channel::bounded::<()>(window);
        debug!("At most {} batches in flight", window);

        // Start writer thread
        let writer_handle = {
            let coordinator = Arc::clone(&coordinator);
            thread::Builder::new()
                .name("bcsplit-writer".to_string())
                .spawn(move || {
                    let _guard = PanicGuard(&coordinator);
                    collect_batches(&rx_out, &rx_window, writers, &coordinator)
                })
                .map_err(|e| Error::io("starting writer thread", e))?
        };

        // Start worker threads
        let thread_pool_work = threadpool::Builder::new()
            .num_threads(threads_work)
            .thread_name("bcsplit-worker".to_string())
            .build();
        for tidx in 0..threads_work {
            let rx_work = rx_work.clone();
            let tx_out = tx_out.clone();
            let coordinator = Arc::clone(&coordinator);

            debug!("Starting worker thread {}", tidx);
            thread_pool_work.execute(move || {
                loop_worker(&rx_work, &tx_out, &coordinator);
            });
        }
        // Only the stages own queue ends from here on, so a stage that exits
        // disconnects its neighbours
        drop(rx_work);
        drop(tx_out);

        // Read the fastq files, send to worker threads
        debug!("Starting to read input files");
        let mut reader = PairedReader::new(reader_r1, reader_r2, Arc::clone(&coordinator));
        let n_batches = dispatch_batches(
            Batcher::new(&mut reader, params_runtime.batch_size),
            &tx_work,
            &tx_window,
            &coordinator,
        );
        let n_pairs = reader.n_pairs();
        drop(tx_work);
        drop(tx_window);
        debug!("Reader done: {} pairs in {} batches", n_pairs, n_batches);

        // Wait for the workers, then the writer
        thread_pool_work.join();
        let n_panicked = thread_pool_work.panic_count();
        if n_panicked > 0 {
            coordinator.fail(Error::thread_panicked("worker", n_panicked));
        }

        let writers = match writer_handle.join() {
            Ok(writers) => writers,
            Err(_) => {
                coordinator.fail(Error::thread_panicked("writer", 1));
                None
            }
        };

        if let Some(e) = coordinator.take_error() {
            return Err(e);
        }
        let writers = writers.ok_or_else(|| Error::thread_panicked("writer", 1))?;

        let stats = SplitStats {
            pairs: n_pairs,
            accepted: coordinator.n_accepted(),
            skipped: coordinator.n_skipped(),
            written: coordinator.n_written(),
        };
        Ok(SplitReport { stats, writers })
    }

    /// Open the input files, run, and close the three output files
    pub fn run_files(
        params_io: &params::IO,
        params_runtime: &params::Runtime,
        params_threading: &params::Threading,
    ) -> Result<SplitStats> {
        info!("Running command: split");

        fileformat::verify_input_fq_file(&params_io.path_r1)?;
        fileformat::verify_input_fq_file(&params_io.path_r2)?;

        let reader_r1 = fileformat::open_fastq(&params_io.path_r1)?;
        let reader_r2 = fileformat::open_fastq(&params_io.path_r2)?;

        let [path_r1, path_r2, path_r3] = params_io.output_paths();
        let writers = [
            FastqOutput::create(&path_r1, params_io.compression_level)?,
            FastqOutput::create(&path_r2, params_io.compression_level)?,
            FastqOutput::create(&path_r3, params_io.compression_level)?,
        ];

        let report = Splitter::run_streams(
            reader_r1,
            reader_r2,
            writers,
            params_runtime,
            params_threading,
        )?;

        for writer in report.writers {
            debug!("Closing {}", writer.path().display());
            writer.finish()?;
        }

        Ok(report.stats)
    }
}
