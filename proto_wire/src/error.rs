use thiserror::Error;

/// Result alias used across the wire runtime.
pub type WireResult<T> = Result<T, WireError>;

/// Errors produced by the low-level wire primitives.
#[derive(Debug, Error)]
pub enum WireError {
    /// The stream ended in the middle of a value. Clean exhaustion before
    /// a field key is not an error and is reported separately by
    /// [`crate::read_key`] returning `Ok(None)`.
    #[error("unexpected end of stream while reading {context}")]
    UnexpectedEof { context: &'static str },

    /// A varint ran past its maximum length of 10 bytes.
    #[error("varint exceeds 10 bytes")]
    VarintTooLong,

    /// A length-delimited payload declared to hold UTF-8 text did not.
    #[error("length-delimited payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Wire type bits that the skip rules do not recognize.
    #[error("unsupported wire type {wire}")]
    UnsupportedWireType { wire: u8 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
