use std::io::Write;

use crate::common::OutputTriple;
use crate::fileformat::fastq::write_fastq_record;
use crate::runtime::{Error, Result};

const STREAM_NAMES: [&str; 3] = ["R1", "R2", "R3"];

/// The three output streams, always written in lock-step so that they hold
/// the same number of records after every call
pub struct TripleWriter<W: Write> {
    writers: [W; 3],
    n_written: u64,
}

impl<W: Write> TripleWriter<W> {
    pub fn new(writers: [W; 3]) -> TripleWriter<W> {
        TripleWriter {
            writers,
            n_written: 0,
        }
    }

    pub fn write_triple(&mut self, triple: &OutputTriple) -> Result<()> {
        let records = [&triple.r1, &triple.r2_barcode, &triple.r3_insert];
        for ((writer, record), name) in self.writers.iter_mut().zip(records).zip(STREAM_NAMES) {
            write_fastq_record(writer, record)
                .map_err(|e| Error::io(format!("writing {} record", name), e))?;
        }
        self.n_written += 1;
        Ok(())
    }

    pub fn n_written(&self) -> u64 {
        self.n_written
    }

    pub fn flush(&mut self) -> Result<()> {
        for (writer, name) in self.writers.iter_mut().zip(STREAM_NAMES) {
            writer
                .flush()
                .map_err(|e| Error::io(format!("flushing {} output", name), e))?;
        }
        Ok(())
    }

    /// Flush and hand back the sinks
    pub fn into_inner(mut self) -> Result<[W; 3]> {
        self.flush()?;
        Ok(self.writers)
    }
}
