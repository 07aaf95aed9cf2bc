use std::path::PathBuf;

use crate::command::split::constants::{SPLIT_OUTPUT_ROLES, SPLIT_SAMPLE_LANE_TOKEN};

pub struct IO {
    pub path_r1: PathBuf,
    pub path_r2: PathBuf,

    pub output_prefix: String,
    pub number_suffix: String,

    // None writes plain FASTQ
    pub compression_level: Option<u32>,
}

impl IO {
    /// `<prefix>_S1_L001_<role>_<suffix>.fastq[.gz]`
    pub fn output_path(&self, role: &str) -> PathBuf {
        let extension = if self.compression_level.is_some() {
            "fastq.gz"
        } else {
            "fastq"
        };
        PathBuf::from(format!(
            "{}_{}_{}_{}.{}",
            self.output_prefix, SPLIT_SAMPLE_LANE_TOKEN, role, self.number_suffix, extension
        ))
    }

    pub fn output_paths(&self) -> [PathBuf; 3] {
        SPLIT_OUTPUT_ROLES.map(|role| self.output_path(role))
    }
}

pub struct Runtime {
    pub batch_size: usize,
}

pub struct Threading {
    pub threads_work: usize,
    pub queue_depth: usize,
}

impl Threading {
    /// Batches allowed between reading and writing, including those parked
    /// in the reorder buffer behind a late one
    pub fn batch_window(&self) -> usize {
        self.queue_depth.max(1) + self.threads_work.max(1)
    }
}
