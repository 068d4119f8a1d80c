use std::io;

/// Failures while reading or writing protocol messages.
///
/// Every decode failure is terminal for the message being read: no partial
/// request or response is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("stream ended before {0} was complete")]
    Truncated(&'static str),

    #[error("no delimiter found in {field} within {limit} bytes")]
    NoDelimiter { field: &'static str, limit: usize },

    #[error("expected delimiter after {0}")]
    MissingDelimiter(&'static str),

    #[error("malformed request id: {0}")]
    Id(#[from] uuid::Error),

    #[error("invalid {field} {value:?}")]
    Number { field: &'static str, value: String },

    #[error("unrecognized response kind {0:?}")]
    Kind(String),

    #[error("frame of {size} bytes exceeds limit of {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("binary payload: {0}")]
    Bincode(#[from] bincode::Error),
}

impl CodecError {
    /// Maps an early end of stream onto `Truncated`, leaving other I/O
    /// failures untouched.
    pub(crate) fn eof_as_truncated(err: io::Error, field: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated(field)
        } else {
            CodecError::Io(err)
        }
    }
}
