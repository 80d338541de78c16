use thiserror::Error;

/// Errors returned by snapshot decoding.
///
/// # Examples
/// ```
/// use rfshared_core::DecodeError;
///
/// let err = DecodeError::SizeMismatch { expected: 28_895, actual: 12 };
/// assert!(err.to_string().contains("size mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("snapshot size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// A raw enum code outside the set defined by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: i8,
}
