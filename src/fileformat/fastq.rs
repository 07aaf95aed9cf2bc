use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use seq_io::fastq::Reader as FastqReader;

use crate::common::{Record, U8_CHAR_FASTQ_RECORD, U8_CHAR_FASTQ_SEPERATOR, U8_CHAR_NEWLINE};
use crate::runtime::{Error, Result};

pub type FastqFileReader = FastqReader<Box<dyn std::io::Read>>;

// 4 MiB in front of each output
const OUTPUT_BUFFER_SIZE: usize = 4 << 20;
const NIFFLER_MIN_SNIFF_LEN: u64 = 5;

/// Open a FASTQ file, plain or compressed
pub fn open_fastq(path: &Path) -> Result<FastqFileReader> {
    let opened_handle = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::file_not_found(path))
        }
        Err(e) => return Err(Error::io(format!("opening {}", path.display()), e)),
    };

    //Too short to carry any compression magic; niffler refuses to sniff these
    let len = opened_handle
        .metadata()
        .map_err(|e| Error::io(format!("reading metadata of {}", path.display()), e))?
        .len();
    if len < NIFFLER_MIN_SNIFF_LEN {
        debug!("Opened file {} as plain text ({} bytes)", path.display(), len);
        return Ok(FastqReader::new(Box::new(opened_handle)));
    }

    let (reader, compression) = niffler::get_reader(Box::new(opened_handle)).map_err(|e| {
        Error::io(
            format!("detecting compression of {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        )
    })?;

    debug!(
        "Opened file {} with compression {:?}",
        path.display(),
        compression
    );
    Ok(FastqReader::new(reader))
}

/// Check that an input exists. An empty file is allowed but suspicious
pub fn verify_input_fq_file(path_in: &Path) -> Result<()> {
    match std::fs::metadata(path_in) {
        Ok(meta) => {
            if meta.len() == 0 {
                log::warn!("Input file {} is empty", path_in.display());
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::file_not_found(path_in)),
        Err(e) => Err(Error::io(format!("inspecting {}", path_in.display()), e)),
    }
}

////////// Write one FASTQ read
pub fn write_fastq_record<W: Write>(writer: &mut W, record: &Record) -> std::io::Result<()> {
    writer.write_all(&[U8_CHAR_FASTQ_RECORD])?;
    writer.write_all(&record.head)?;
    writer.write_all(&[U8_CHAR_NEWLINE])?;
    writer.write_all(&record.seq)?;
    writer.write_all(&[U8_CHAR_NEWLINE, U8_CHAR_FASTQ_SEPERATOR, U8_CHAR_NEWLINE])?;
    writer.write_all(&record.qual)?;
    writer.write_all(&[U8_CHAR_NEWLINE])?;
    Ok(())
}

/// One output FASTQ file, gzipped or plain
pub enum FastqOutput {
    Gzip {
        path: PathBuf,
        writer: BufWriter<GzEncoder<File>>,
    },
    Plain {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

impl FastqOutput {
    pub fn create(path: &Path, compression_level: Option<u32>) -> Result<FastqOutput> {
        let file = File::create(path)
            .map_err(|e| Error::io(format!("creating {}", path.display()), e))?;
        debug!("Created output file {}", path.display());

        Ok(match compression_level {
            Some(level) => FastqOutput::Gzip {
                path: path.to_path_buf(),
                writer: BufWriter::with_capacity(
                    OUTPUT_BUFFER_SIZE,
                    GzEncoder::new(file, Compression::new(level)),
                ),
            },
            None => FastqOutput::Plain {
                path: path.to_path_buf(),
                writer: BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, file),
            },
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            FastqOutput::Gzip { path, .. } => path,
            FastqOutput::Plain { path, .. } => path,
        }
    }

    /// Flush all buffers and write the gzip trailer.
    /// Dropping without calling this still closes the file, but errors are lost
    pub fn finish(self) -> Result<()> {
        match self {
            FastqOutput::Gzip { path, writer } => {
                let encoder = writer
                    .into_inner()
                    .map_err(|e| Error::io(format!("flushing {}", path.display()), e.into_error()))?;
                let mut file = encoder
                    .finish()
                    .map_err(|e| Error::io(format!("finishing {}", path.display()), e))?;
                file.flush()
                    .map_err(|e| Error::io(format!("flushing {}", path.display()), e))?;
            }
            FastqOutput::Plain { path, mut writer } => {
                writer
                    .flush()
                    .map_err(|e| Error::io(format!("flushing {}", path.display()), e))?;
            }
        }
        Ok(())
    }
}

impl Write for FastqOutput {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            FastqOutput::Gzip { writer, .. } => writer.write(buf),
            FastqOutput::Plain { writer, .. } => writer.write(buf),
        }
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            FastqOutput::Gzip { writer, .. } => writer.write_all(buf),
            FastqOutput::Plain { writer, .. } => writer.write_all(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            FastqOutput::Gzip { writer, .. } => writer.flush(),
            FastqOutput::Plain { writer, .. } => writer.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::MultiGzDecoder;
    use seq_io::fastq::Record as FastqRecord;
    use std::io::Read;

    #[test]
    fn test_write_fastq_record() {
        let mut out = Vec::new();
        write_fastq_record(&mut out, &Record::new(b"read1", b"ACGT", b"IIII")).unwrap();
        assert_eq!(out, b"@read1\nACGT\n+\nIIII\n");
    }

    #[test]
    fn test_gzip_output_round_trips_through_open_fastq() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fastq.gz");

        let mut output = FastqOutput::create(&path, Some(1)).unwrap();
        write_fastq_record(&mut output, &Record::new(b"a", b"ACGT", b"IIII")).unwrap();
        write_fastq_record(&mut output, &Record::new(b"b", b"TT", b"##")).unwrap();
        output.finish().unwrap();

        let mut text = String::new();
        MultiGzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "@a\nACGT\n+\nIIII\n@b\nTT\n+\n##\n");

        let mut reader = open_fastq(&path).unwrap();
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.head(), b"a");
        assert_eq!(rec.seq(), b"ACGT");
    }

    #[test]
    fn test_plain_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fastq");

        let mut output = FastqOutput::create(&path, None).unwrap();
        write_fastq_record(&mut output, &Record::new(b"a", b"A", b"I")).unwrap();
        assert_eq!(output.path(), path.as_path());
        output.finish().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"@a\nA\n+\nI\n");
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.fq.gz");
        assert!(matches!(
            verify_input_fq_file(&path),
            Err(Error::FileNotFound { .. })
        ));
        assert!(matches!(open_fastq(&path), Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_unreadable_input_is_not_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        // a path through a regular file fails with NotADirectory, not NotFound
        let blocker = dir.path().join("plain_file");
        std::fs::write(&blocker, b"@a\nA\n+\nI\n").unwrap();
        let path = blocker.join("in.fq.gz");
        match verify_input_fq_file(&path) {
            Err(Error::Io { context, .. }) => assert!(context.contains("in.fq.gz")),
            Err(e) => panic!("expected an I/O error, got {}", e),
            Ok(()) => panic!("expected an error"),
        }
    }
}
