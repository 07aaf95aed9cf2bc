use crate::barcode::revcomp::{revcomp, reverse_qual};
use crate::common::{
    strip_pair_suffix, Batch, OutputBatch, OutputTriple, ReadPair, Record, MATE_SUFFIX_R1,
    R2_INSERT_LENGTH, R2_READ_LENGTH,
};
use crate::runtime::{Error, Result};

fn check_record(record: &Record, stream: &str, index: u64) -> Result<()> {
    if record.seq.len() != record.qual.len() {
        return Err(Error::malformed(
            stream,
            index,
            Some(format!(
                "sequence length {} does not match quality length {}",
                record.seq.len(),
                record.qual.len()
            )),
        ));
    }
    Ok(())
}

/// Split one read pair into R1, barcode and insert records.
///
/// R2 is laid out as `[insert 0..150][barcode 150..166]`. The insert keeps
/// its orientation, the barcode is reverse complemented (its quality only
/// reversed). All three records get the R1 name with `/1` removed.
pub fn transform_pair(pair: ReadPair) -> Result<OutputTriple> {
    let ReadPair { r1, r2, index } = pair;
    check_record(&r1, "R1", index)?;
    check_record(&r2, "R2", index)?;

    if r2.seq.len() != R2_READ_LENGTH {
        return Err(Error::malformed(
            "R2",
            index,
            Some(format!(
                "length {} reached the transform, expected {}",
                r2.seq.len(),
                R2_READ_LENGTH
            )),
        ));
    }

    let head = strip_pair_suffix(&r1.head, MATE_SUFFIX_R1).to_vec();

    let (insert_seq, barcode_seq) = r2.seq.split_at(R2_INSERT_LENGTH);
    let (insert_qual, barcode_qual) = r2.qual.split_at(R2_INSERT_LENGTH);

    let r2_barcode = Record {
        head: head.clone(),
        seq: revcomp(barcode_seq),
        qual: reverse_qual(barcode_qual),
    };
    let r3_insert = Record {
        head: head.clone(),
        seq: insert_seq.to_vec(),
        qual: insert_qual.to_vec(),
    };

    //Reuse the R1 buffers, only the name changes
    let mut r1 = r1;
    r1.head = head;

    Ok(OutputTriple {
        r1,
        r2_barcode,
        r3_insert,
    })
}

/// Transform a whole batch, keeping pair order and the batch number
pub fn transform_batch(batch: Batch) -> Result<OutputBatch> {
    let Batch { seq_no, pairs } = batch;
    let mut triples = Vec::with_capacity(pairs.len());
    for pair in pairs {
        triples.push(transform_pair(pair)?);
    }
    Ok(OutputBatch { seq_no, triples })
}
