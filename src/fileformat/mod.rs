pub mod fastq;
pub mod paired_fastq;
pub mod triple_writer;

pub use fastq::open_fastq;
pub use fastq::verify_input_fq_file;
pub use fastq::write_fastq_record;
pub use fastq::FastqOutput;

pub use paired_fastq::PairedReader;
pub use triple_writer::TripleWriter;
