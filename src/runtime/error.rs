use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error("I/O failure while {}: {}", context, source)]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Malformed record in {} at pair {}{}",
        stream,
        index,
        Error::format_msg_as_detail(msg)
    )]
    MalformedRecord {
        stream: String,
        index: u64,
        msg: Option<String>,
    },

    #[error(
        "Input streams are out of sync: {} ended before its mate at pair {}. The files no longer correspond read-for-read.",
        exhausted,
        index
    )]
    StreamDesync { index: u64, exhausted: String },

    #[error(
        "Read names differ at pair {}: '{}' (R1) vs '{}' (R2).",
        index,
        header_r1,
        header_r2
    )]
    HeaderMismatch {
        index: u64,
        header_r1: String,
        header_r2: String,
    },

    #[error("Batch sequence violation: got batch {} while expecting batch {}.", seq_no, expected)]
    SequenceViolation { seq_no: u64, expected: u64 },

    #[error("{} {} thread(s) panicked.", count, stage)]
    ThreadPanicked { stage: String, count: usize },
}

impl Error {
    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn io<C: Into<String>>(context: C, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    #[cold]
    pub fn malformed<S: Into<String>, M: Into<String>>(stream: S, index: u64, msg: Option<M>) -> Self {
        Error::MalformedRecord {
            stream: stream.into(),
            index,
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn stream_desync<S: Into<String>>(index: u64, exhausted: S) -> Self {
        Error::StreamDesync {
            index,
            exhausted: exhausted.into(),
        }
    }

    #[cold]
    pub fn header_mismatch(index: u64, header_r1: &[u8], header_r2: &[u8]) -> Self {
        Error::HeaderMismatch {
            index,
            header_r1: String::from_utf8_lossy(header_r1).into_owned(),
            header_r2: String::from_utf8_lossy(header_r2).into_owned(),
        }
    }

    #[cold]
    pub fn sequence_violation(seq_no: u64, expected: u64) -> Self {
        Error::SequenceViolation { seq_no, expected }
    }

    #[cold]
    pub fn thread_panicked<S: Into<String>>(stage: S, count: usize) -> Self {
        Error::ThreadPanicked {
            stage: stage.into(),
            count,
        }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}
