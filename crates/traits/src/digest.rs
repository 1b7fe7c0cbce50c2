//! Cryptographic digest traits.
//!
//! Unlike a checksum, a digest state here has an explicit terminal step:
//! finalization consumes the state, and any later mutation is reported as
//! [`HashError::AlreadyFinalized`] until [`Digest::reset`] is called.

use core::fmt::Debug;

use crate::HashError;

/// Cryptographic hash function producing a fixed-size digest.
///
/// # Implementor Requirements
///
/// - `new()` must return the same state as `Default::default()`
/// - `finalize_into()` must not write anything when it returns an error
/// - after a successful finalize, `update()` and `finalize_into()` must fail with
///   [`HashError::AlreadyFinalized`]
/// - `reset()` must restore the hasher to its initial state
pub trait Digest: Clone + Default {
  /// Output size in bytes.
  const OUTPUT_SIZE: usize;

  /// The digest output type.
  ///
  /// Typically `[u8; N]`.
  type Output: Copy + Eq + Debug;

  /// Create a new hasher in its initial state.
  #[must_use]
  fn new() -> Self;

  /// Update the hasher with additional data.
  ///
  /// Any length is accepted, including zero.
  ///
  /// # Errors
  ///
  /// [`HashError::AlreadyFinalized`] if the state has already been finalized.
  fn update(&mut self, data: &[u8]) -> Result<(), HashError>;

  /// Update the hasher with multiple non-contiguous buffers.
  ///
  /// # Errors
  ///
  /// [`HashError::AlreadyFinalized`] if the state has already been finalized.
  #[inline]
  fn update_vectored(&mut self, bufs: &[&[u8]]) -> Result<(), HashError> {
    for buf in bufs {
      self.update(buf)?;
    }
    Ok(())
  }

  /// Finalize into a caller-provided buffer of at least [`Self::OUTPUT_SIZE`] bytes.
  ///
  /// Only the first `OUTPUT_SIZE` bytes of `out` are written.
  ///
  /// # Errors
  ///
  /// - [`HashError::InvalidOutputBuffer`] if `out` is too short; the state is unchanged.
  /// - [`HashError::AlreadyFinalized`] if the state has already been finalized.
  fn finalize_into(&mut self, out: &mut [u8]) -> Result<(), HashError>;

  /// Finalize and return the digest.
  ///
  /// # Errors
  ///
  /// [`HashError::AlreadyFinalized`] if the state has already been finalized.
  fn finalize(&mut self) -> Result<Self::Output, HashError>;

  /// Whether the state has been finalized.
  #[must_use]
  fn is_finalized(&self) -> bool;

  /// Reset the hasher to its initial state.
  fn reset(&mut self);

  /// Compute the digest of data in one shot.
  #[must_use]
  fn digest(data: &[u8]) -> Self::Output;

  /// Compute the digest of multiple buffers in one shot.
  #[must_use]
  fn digest_vectored(bufs: &[&[u8]]) -> Self::Output;
}
