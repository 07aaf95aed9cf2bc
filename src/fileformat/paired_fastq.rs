use log::trace;
use std::io::Read;
use std::sync::Arc;

use seq_io::fastq::Reader as FastqReader;

use crate::common::{
    strip_pair_suffix, ReadPair, Record, MATE_SUFFIX_R1, MATE_SUFFIX_R2, R2_READ_LENGTH,
};
use crate::runtime::{Error, Result};
use crate::threading::Coordinator;

/// Reads two FASTQ streams in lock-step.
///
/// Yields accepted pairs in input order. Pairs whose R2 is not exactly
/// `R2_READ_LENGTH` long are skipped and counted; mismatching names,
/// streams of unequal length and unparsable records end the iteration
/// with an error.
pub struct PairedReader<R1: Read, R2: Read> {
    reader_r1: FastqReader<R1>,
    reader_r2: FastqReader<R2>,
    coordinator: Arc<Coordinator>,
    next_index: u64,
    done: bool,
}

impl<R1: Read, R2: Read> PairedReader<R1, R2> {
    pub fn new(
        reader_r1: FastqReader<R1>,
        reader_r2: FastqReader<R2>,
        coordinator: Arc<Coordinator>,
    ) -> PairedReader<R1, R2> {
        PairedReader {
            reader_r1,
            reader_r2,
            coordinator,
            next_index: 0,
            done: false,
        }
    }

    /// Number of pairs consumed so far, accepted or not
    pub fn n_pairs(&self) -> u64 {
        self.next_index
    }

    fn read_pair(&mut self) -> Result<Option<ReadPair>> {
        let index = self.next_index;
        let (r1, r2) = match (self.reader_r1.next(), self.reader_r2.next()) {
            (None, None) => return Ok(None),
            (Some(Err(e)), _) => return Err(Error::malformed("R1", index, Some(e.to_string()))),
            (_, Some(Err(e))) => return Err(Error::malformed("R2", index, Some(e.to_string()))),
            (Some(Ok(_)), None) => return Err(Error::stream_desync(index, "R2")),
            (None, Some(Ok(_))) => return Err(Error::stream_desync(index, "R1")),
            (Some(Ok(r1)), Some(Ok(r2))) => (Record::from_fastq(&r1), Record::from_fastq(&r2)),
        };
        self.next_index += 1;

        let id1 = strip_pair_suffix(&r1.head, MATE_SUFFIX_R1);
        let id2 = strip_pair_suffix(&r2.head, MATE_SUFFIX_R2);
        if id1 != id2 {
            return Err(Error::header_mismatch(index, &r1.head, &r2.head));
        }

        Ok(Some(ReadPair { r1, r2, index }))
    }
}

impl<R1: Read, R2: Read> Iterator for PairedReader<R1, R2> {
    type Item = Result<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.read_pair() {
                Ok(Some(pair)) => {
                    if pair.r2.seq.len() == R2_READ_LENGTH {
                        self.coordinator.record_accepted();
                        return Some(Ok(pair));
                    }
                    trace!(
                        "Skipping pair {}: R2 length {} != {}",
                        pair.index,
                        pair.r2.seq.len(),
                        R2_READ_LENGTH
                    );
                    self.coordinator.record_skipped();
                }
                Ok(None) => {
                    self.done = true;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fastq(records: &[(&str, usize)]) -> FastqReader<std::io::Cursor<Vec<u8>>> {
        let mut text = String::new();
        for (name, len) in records {
            text.push_str(&format!("@{}\n{}\n+\n{}\n", name, "A".repeat(*len), "I".repeat(*len)));
        }
        FastqReader::new(std::io::Cursor::new(text.into_bytes()))
    }

    #[test]
    fn test_length_filter_boundaries() {
        let coordinator = Arc::new(Coordinator::new());
        let reader = PairedReader::new(
            fastq(&[("a/1", 10), ("b/1", 10), ("c/1", 10)]),
            fastq(&[("a/2", 165), ("b/2", 166), ("c/2", 167)]),
            Arc::clone(&coordinator),
        );
        let pairs: Vec<ReadPair> = reader.map(|p| p.unwrap()).collect();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].index, 1);
        assert_eq!(pairs[0].r1.head, b"b/1");
        assert_eq!(coordinator.n_accepted(), 1);
        assert_eq!(coordinator.n_skipped(), 2);
    }

    #[test]
    fn test_header_mismatch_is_fatal() {
        let coordinator = Arc::new(Coordinator::new());
        let mut reader = PairedReader::new(
            fastq(&[("a/1", 10), ("b/1", 10)]),
            fastq(&[("a/2", 166), ("x/2", 166)]),
            coordinator,
        );
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(Error::HeaderMismatch { index, .. })) => assert_eq!(index, 1),
            other => panic!("expected header mismatch, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_header_mismatch_checked_before_length_filter() {
        let coordinator = Arc::new(Coordinator::new());
        let mut reader = PairedReader::new(
            fastq(&[("a/1", 10)]),
            fastq(&[("b/2", 20)]),
            coordinator,
        );
        assert!(matches!(reader.next(), Some(Err(Error::HeaderMismatch { .. }))));
    }

    #[test]
    fn test_stream_desync_is_fatal() {
        let coordinator = Arc::new(Coordinator::new());
        let mut reader = PairedReader::new(
            fastq(&[("a/1", 10), ("b/1", 10)]),
            fastq(&[("a/2", 166)]),
            coordinator,
        );
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(Error::StreamDesync { index, exhausted })) => {
                assert_eq!(index, 1);
                assert_eq!(exhausted, "R2");
            }
            other => panic!("expected desync, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_record_is_fatal() {
        let coordinator = Arc::new(Coordinator::new());
        let r2 = FastqReader::new(std::io::Cursor::new(b"@a/2\nACGT\nIIII\n".to_vec()));
        let mut reader = PairedReader::new(fastq(&[("a/1", 4)]), r2, coordinator);
        match reader.next() {
            Some(Err(Error::MalformedRecord { stream, .. })) => assert_eq!(stream, "R2"),
            other => panic!("expected malformed record, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_streams() {
        let coordinator = Arc::new(Coordinator::new());
        let mut reader = PairedReader::new(fastq(&[]), fastq(&[]), coordinator);
        assert!(reader.next().is_none());
        assert_eq!(reader.n_pairs(), 0);
    }
}
