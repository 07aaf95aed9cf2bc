pub const SPLIT_DEFAULT_THREADS: usize = 4;
pub const SPLIT_DEFAULT_BATCH_SIZE: usize = 100_000;
pub const SPLIT_DEFAULT_NUMBER_SUFFIX: &str = "001";
pub const SPLIT_DEFAULT_COMPRESSION_LEVEL: u32 = 1;

// bounded queues hold this many batches per worker
pub const SPLIT_QUEUE_BATCHES_PER_WORKER: usize = 2;

pub const SPLIT_SAMPLE_LANE_TOKEN: &str = "S1_L001";
pub const SPLIT_OUTPUT_ROLES: [&str; 3] = ["R1", "R2", "R3"];
