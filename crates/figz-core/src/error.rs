use crate::record::RecordDecodeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file size too small: {size} bytes (expected at least {minimum})")]
    TooSmall { size: usize, minimum: usize },

    #[error("unsupported file format")]
    UnsupportedFormat,

    #[error("archive error: {message}")]
    Archive { message: String },

    #[error("divergent read and uncompressed size: expected {expected}, found {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("chunk {index} declares {declared} bytes at offset {offset}, but only {available} remain")]
    TruncatedChunk {
        index: usize,
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("malformed container: {message}")]
    MalformedContainer { message: String },

    #[error("error inflating chunk {index}: {source}")]
    Inflate {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    RecordDecode(#[from] RecordDecodeError),

    #[error("document has no root node (0:0)")]
    MissingRoot,
}

impl From<zip::result::ZipError> for Error {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Archive {
            message: value.to_string(),
        }
    }
}
