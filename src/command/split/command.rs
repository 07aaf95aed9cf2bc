use anyhow::Result;
use clap::Args;
use log::info;
use std::path::PathBuf;

use super::{
    constants::{
        SPLIT_DEFAULT_BATCH_SIZE, SPLIT_DEFAULT_COMPRESSION_LEVEL, SPLIT_DEFAULT_NUMBER_SUFFIX,
        SPLIT_DEFAULT_THREADS, SPLIT_QUEUE_BATCHES_PER_WORKER,
    },
    core::{core::Splitter, params},
};

#[derive(Args)]
pub struct Command {
    #[arg(short = '1', long = "r1", value_parser, help = "Input R1 FASTQ file")]
    pub path_r1: PathBuf,

    #[arg(short = '2', long = "r2", value_parser, help = "Input R2 FASTQ file, barcode in its last 16 bases")]
    pub path_r2: PathBuf,

    #[arg(short = 'o', long = "output-prefix", help = "Output prefix")]
    pub output_prefix: String,

    #[arg(short = 't', long = "threads", default_value_t = SPLIT_DEFAULT_THREADS, value_parser = clap::value_parser!(usize), help = "Number of worker threads")]
    pub threads_work: usize,

    #[arg(short = 'b', long = "batch-size", default_value_t = SPLIT_DEFAULT_BATCH_SIZE, help = "Read pairs per batch")]
    pub batch_size: usize,

    #[arg(short = 'n', long = "number-suffix", default_value = SPLIT_DEFAULT_NUMBER_SUFFIX, help = "Number suffix for output files (e.g., 001, 002)")]
    pub number_suffix: String,

    #[arg(long = "queue-depth", help = "Batches each queue may hold. Defaults to twice the worker count")]
    pub queue_depth: Option<usize>,

    #[arg(long = "uncompressed", help = "Write plain FASTQ instead of gzip")]
    pub uncompressed: bool,

    #[arg(long = "compression-level", default_value_t = SPLIT_DEFAULT_COMPRESSION_LEVEL, value_parser = clap::value_parser!(u32).range(0..=9), help = "Gzip level for the outputs")]
    pub compression_level: u32,
}

impl Command {
    pub fn try_execute(&mut self) -> Result<()> {
        let (threads_work, queue_depth) = self.resolve_thread_config()?;
        if self.batch_size == 0 {
            anyhow::bail!("Batch size must be at least 1");
        }

        let params_io = params::IO {
            path_r1: self.path_r1.clone(),
            path_r2: self.path_r2.clone(),
            output_prefix: self.output_prefix.clone(),
            number_suffix: self.number_suffix.clone(),
            compression_level: if self.uncompressed {
                None
            } else {
                Some(self.compression_level)
            },
        };
        let params_runtime = params::Runtime {
            batch_size: self.batch_size,
        };
        let params_threading = params::Threading {
            threads_work,
            queue_depth,
        };

        info!(
            "Using {} worker threads, batch size {}, queue depth {}, at most {} batches in flight",
            threads_work,
            self.batch_size,
            queue_depth,
            params_threading.batch_window()
        );

        let stats = Splitter::run_files(&params_io, &params_runtime, &params_threading)?;

        info!("Processing complete!");
        info!("Processed records: {}", stats.accepted);
        info!("Filtered out records: {}", stats.skipped);
        info!("Output files:");
        let [path_r1, path_r2, path_r3] = params_io.output_paths();
        info!("  R1: {}", path_r1.display());
        info!("  R2: {}", path_r2.display());
        info!("  R3: {}", path_r3.display());

        Ok(())
    }

    fn resolve_thread_config(&self) -> Result<(usize, usize)> {
        if self.threads_work == 0 {
            anyhow::bail!("At least one work thread required");
        }
        let queue_depth = self
            .queue_depth
            .unwrap_or(self.threads_work * SPLIT_QUEUE_BATCHES_PER_WORKER);
        if queue_depth == 0 {
            anyhow::bail!("Queue depth must be at least 1");
        }
        Ok((self.threads_work, queue_depth))
    }
}
