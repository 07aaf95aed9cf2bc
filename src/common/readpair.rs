/// One FASTQ entry. `head` is the header line without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub head: Vec<u8>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl Record {
    pub fn new(head: &[u8], seq: &[u8], qual: &[u8]) -> Record {
        Record {
            head: head.to_vec(),
            seq: seq.to_vec(),
            qual: qual.to_vec(),
        }
    }

    pub fn from_fastq<R: seq_io::fastq::Record>(record: &R) -> Record {
        Record::new(record.head(), record.seq(), record.qual())
    }
}

/// Mates read from the same position of the two input streams.
/// `index` is the 0-based position of the pair in the input.
#[derive(Debug, Clone)]
pub struct ReadPair {
    pub r1: Record,
    pub r2: Record,
    pub index: u64,
}

#[derive(Debug)]
pub struct Batch {
    pub seq_no: u64,
    pub pairs: Vec<ReadPair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTriple {
    pub r1: Record,
    pub r2_barcode: Record,
    pub r3_insert: Record,
}

#[derive(Debug)]
pub struct OutputBatch {
    pub seq_no: u64,
    pub triples: Vec<OutputTriple>,
}

/// Remove a trailing mate suffix such as `/1` from a read name
#[inline]
pub fn strip_pair_suffix<'a>(head: &'a [u8], suffix: &[u8]) -> &'a [u8] {
    head.strip_suffix(suffix).unwrap_or(head)
}
