//! Error types for hash state misuse.
//!
//! Hashing is pure computation, so there are no transient failures: every
//! error here is a usage error surfaced to the caller. Individual crates may
//! define additional errors as needed.

use core::fmt;

/// A hash state operation was rejected.
///
/// # Examples
///
/// ```
/// use traits::HashError;
///
/// let err = HashError::InvalidOutputBuffer { required: 32, actual: 31 };
/// assert_eq!(err.to_string(), "output buffer too small: need 32 bytes, got 31");
/// assert_eq!(HashError::AlreadyFinalized.to_string(), "hash state already finalized");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashError {
  /// The destination passed to finalize is shorter than the digest.
  ///
  /// Recoverable: the state is not mutated, retry with a larger buffer.
  InvalidOutputBuffer {
    /// Digest length in bytes.
    required: usize,
    /// Length of the buffer that was provided.
    actual: usize,
  },
  /// The state was already finalized; it must be reset before reuse.
  AlreadyFinalized,
}

impl HashError {
  /// Whether retrying the same call with a different argument can succeed.
  #[inline]
  #[must_use]
  pub const fn is_recoverable(&self) -> bool {
    matches!(self, Self::InvalidOutputBuffer { .. })
  }
}

impl fmt::Display for HashError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidOutputBuffer { required, actual } => {
        write!(f, "output buffer too small: need {required} bytes, got {actual}")
      }
      Self::AlreadyFinalized => f.write_str("hash state already finalized"),
    }
  }
}

impl core::error::Error for HashError {}
