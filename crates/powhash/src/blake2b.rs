//! BLAKE2b-256 with the `"ckb-default-hash"` personalization (RFC 7693).
//!
//! One configuration only: unkeyed, sequential mode, 32-byte digest,
//! fanout 1, depth 1. The compression function is dispatched at runtime
//! between a portable scalar kernel and an x86_64 SSSE3 kernel; both are
//! bit-identical.
//!
//! ```
//! use powhash::blake2b::{self, Blake2b256};
//!
//! let mut h = Blake2b256::new();
//! h.update(b"ab")?;
//! h.update(b"c")?;
//! let mut out = [0u8; 32];
//! h.finalize(&mut out)?;
//! assert_eq!(out, blake2b::hash(b"abc"));
//! # Ok::<(), powhash::HashError>(())
//! ```

#![allow(clippy::indexing_slicing)] // Compression schedule uses fixed indices

pub mod config;
mod dispatch;
pub mod kernels;
pub mod param;
pub(crate) mod portable;
#[cfg(target_arch = "x86_64")]
pub(crate) mod x86_64;

use core::fmt;

pub use dispatch::kernel_name;
pub use kernels::Blake2b256KernelId;
use kernels::CompressFn;
use param::ParamBlock;
use traits::{Digest, HashError};

/// Compression block size in bytes.
pub const BLOCK_LEN: usize = 128;

/// Digest size in bytes.
pub const OUT_LEN: usize = 32;

/// Personalization tag written into the parameter block.
pub const PERSONALIZATION: &[u8; 16] = b"ckb-default-hash";

pub(crate) const IV: [u64; 8] = [
  0x6a09_e667_f3bc_c908,
  0xbb67_ae85_84ca_a73b,
  0x3c6e_f372_fe94_f82b,
  0xa54f_f53a_5f1d_36f1,
  0x510e_527f_ade6_82d1,
  0x9b05_688c_2b3e_6c1f,
  0x1f83_d9ab_fb41_bd6b,
  0x5be0_cd19_137e_2179,
];

/// Message word schedule. Rounds 10 and 11 reuse rows 0 and 1.
pub(crate) const SIGMA: [[usize; 16]; 12] = [
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
  [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
  [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
  [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
  [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
  [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
  [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
  [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
  [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

/// Load a block as 16 little-endian message words.
#[inline(always)]
pub(crate) fn message_words(block: &[u8; BLOCK_LEN]) -> [u64; 16] {
  let (chunks, _) = block.as_chunks::<8>();
  let mut m = [0u64; 16];
  for (word, chunk) in m.iter_mut().zip(chunks) {
    *word = u64::from_le_bytes(*chunk);
  }
  m
}

/// Lifecycle of a [`Blake2b256`] state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
  /// Initialized, nothing absorbed yet.
  Fresh,
  /// At least one byte absorbed; more may follow.
  Accumulating,
  /// Digest produced. Only [`Blake2b256::reset`] leaves this phase.
  Finalized,
}

/// Streaming BLAKE2b-256 state.
///
/// The last full block is always held back in the buffer so finalization
/// can flag it; the buffer therefore holds 1..=128 bytes once any input
/// has been absorbed.
#[derive(Clone)]
pub struct Blake2b256 {
  h: [u64; 8],
  t: [u64; 2],
  f: [u64; 2],
  buf: [u8; BLOCK_LEN],
  buf_len: usize,
  out_len: usize,
  last_node: bool,
  kernel: Blake2b256KernelId,
  compress: CompressFn,
}

impl Blake2b256 {
  /// Fresh state using the process-wide kernel.
  #[inline]
  #[must_use]
  pub fn new() -> Self {
    Self::with_kernel(dispatch::kernel_id())
  }

  /// Fresh state pinned to `kernel`.
  ///
  /// The caller must have checked [`kernels::required_caps`].
  #[must_use]
  pub(crate) fn with_kernel(kernel: Blake2b256KernelId) -> Self {
    let param = ParamBlock::new();
    let mut h = IV;
    for (word, p) in h.iter_mut().zip(param.to_words()) {
      *word ^= p;
    }

    Self {
      h,
      t: [0; 2],
      f: [0; 2],
      buf: [0; BLOCK_LEN],
      buf_len: 0,
      out_len: usize::from(param.digest_length()),
      last_node: false,
      kernel,
      compress: kernels::compress_fn(kernel),
    }
  }

  /// Absorb `data`. Empty input is a no-op.
  ///
  /// # Errors
  ///
  /// [`HashError::AlreadyFinalized`] after [`finalize`](Self::finalize);
  /// the state is left unchanged.
  #[inline]
  pub fn update(&mut self, data: &[u8]) -> Result<(), HashError> {
    if self.is_finalized() {
      return Err(HashError::AlreadyFinalized);
    }
    self.absorb(data);
    Ok(())
  }

  fn absorb(&mut self, mut data: &[u8]) {
    let compress = self.compress;
    let fill = BLOCK_LEN - self.buf_len;

    if data.len() > fill {
      let (head, rest) = data.split_at(fill);
      self.buf[self.buf_len..].copy_from_slice(head);
      self.buf_len = 0;
      self.increment_counter(BLOCK_LEN as u64);
      compress(&mut self.h, &self.buf, &self.t, &self.f);
      data = rest;

      // Strictly greater: the final block stays buffered for finalize.
      while data.len() > BLOCK_LEN {
        let Some((block, rest)) = data.split_first_chunk::<BLOCK_LEN>() else {
          break;
        };
        self.increment_counter(BLOCK_LEN as u64);
        compress(&mut self.h, block, &self.t, &self.f);
        data = rest;
      }
    }

    let end = self.buf_len + data.len();
    self.buf[self.buf_len..end].copy_from_slice(data);
    self.buf_len = end;
  }

  #[inline(always)]
  fn increment_counter(&mut self, inc: u64) {
    self.t[0] = self.t[0].wrapping_add(inc);
    self.t[1] = self.t[1].wrapping_add(u64::from(self.t[0] < inc));
  }

  /// Write the digest into `out[..32]`. Bytes past 32 are not touched.
  ///
  /// # Errors
  ///
  /// - [`HashError::InvalidOutputBuffer`] if `out` is shorter than 32 bytes.
  /// - [`HashError::AlreadyFinalized`] if called twice without [`reset`](Self::reset).
  ///
  /// Neither error writes to `out` or changes the state.
  pub fn finalize(&mut self, out: &mut [u8]) -> Result<(), HashError> {
    let actual = out.len();
    let Some(dst) = out.get_mut(..self.out_len) else {
      return Err(HashError::InvalidOutputBuffer { required: self.out_len, actual });
    };
    if self.is_finalized() {
      return Err(HashError::AlreadyFinalized);
    }

    let digest = self.finish();
    dst.copy_from_slice(&digest[..dst.len()]);
    Ok(())
  }

  /// Finalize into a fresh array.
  ///
  /// # Errors
  ///
  /// [`HashError::AlreadyFinalized`] if the state was already finalized.
  #[inline]
  pub fn finalize_array(&mut self) -> Result<[u8; OUT_LEN], HashError> {
    if self.is_finalized() {
      return Err(HashError::AlreadyFinalized);
    }
    Ok(self.finish())
  }

  fn finish(&mut self) -> [u8; OUT_LEN] {
    self.increment_counter(self.buf_len as u64);
    self.f[0] = u64::MAX;
    if self.last_node {
      self.f[1] = u64::MAX;
    }
    self.buf[self.buf_len..].fill(0);
    (self.compress)(&mut self.h, &self.buf, &self.t, &self.f);

    let mut out = [0u8; OUT_LEN];
    let (chunks, _) = out.as_chunks_mut::<8>();
    for (chunk, word) in chunks.iter_mut().zip(&self.h) {
      *chunk = word.to_le_bytes();
    }
    out
  }

  /// Return to [`Phase::Fresh`], keeping the selected kernel.
  #[inline]
  pub fn reset(&mut self) {
    *self = Self::with_kernel(self.kernel);
  }

  #[inline]
  #[must_use]
  pub const fn is_finalized(&self) -> bool {
    self.f[0] != 0
  }

  #[must_use]
  pub const fn phase(&self) -> Phase {
    if self.is_finalized() {
      Phase::Finalized
    } else if self.t[0] == 0 && self.t[1] == 0 && self.buf_len == 0 {
      Phase::Fresh
    } else {
      Phase::Accumulating
    }
  }

  /// Total bytes absorbed so far, including buffered bytes.
  ///
  /// After finalization the buffered bytes are already in the counter.
  #[must_use]
  pub const fn bytes_hashed(&self) -> u128 {
    let counted = ((self.t[1] as u128) << 64) | self.t[0] as u128;
    if self.is_finalized() { counted } else { counted + self.buf_len as u128 }
  }

  /// Kernel this state compresses with.
  #[inline]
  #[must_use]
  pub const fn kernel(&self) -> Blake2b256KernelId {
    self.kernel
  }
}

impl Default for Blake2b256 {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Blake2b256 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Blake2b256")
      .field("phase", &self.phase())
      .field("bytes_hashed", &self.bytes_hashed())
      .field("kernel", &self.kernel.as_str())
      .finish_non_exhaustive()
  }
}

impl Digest for Blake2b256 {
  const OUTPUT_SIZE: usize = OUT_LEN;
  type Output = [u8; OUT_LEN];

  #[inline]
  fn new() -> Self {
    Blake2b256::new()
  }

  #[inline]
  fn update(&mut self, data: &[u8]) -> Result<(), HashError> {
    Blake2b256::update(self, data)
  }

  #[inline]
  fn finalize_into(&mut self, out: &mut [u8]) -> Result<(), HashError> {
    Blake2b256::finalize(self, out)
  }

  #[inline]
  fn finalize(&mut self) -> Result<Self::Output, HashError> {
    self.finalize_array()
  }

  #[inline]
  fn is_finalized(&self) -> bool {
    Blake2b256::is_finalized(self)
  }

  #[inline]
  fn reset(&mut self) {
    Blake2b256::reset(self);
  }

  #[inline]
  fn digest(data: &[u8]) -> Self::Output {
    hash(data)
  }

  #[inline]
  fn digest_vectored(bufs: &[&[u8]]) -> Self::Output {
    hash_vectored(bufs)
  }
}

#[cfg(feature = "std")]
impl std::io::Write for Blake2b256 {
  #[inline]
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.update(buf).map_err(std::io::Error::other)?;
    Ok(buf.len())
  }

  #[inline]
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

/// Fresh hashing state. Same as [`Blake2b256::new`].
#[inline]
#[must_use]
pub fn initialize() -> Blake2b256 {
  Blake2b256::new()
}

/// One-shot digest of `data`.
#[inline]
#[must_use]
pub fn hash(data: &[u8]) -> [u8; OUT_LEN] {
  let mut h = Blake2b256::new();
  h.absorb(data);
  h.finish()
}

/// One-shot digest of the concatenation of `bufs`.
#[must_use]
pub fn hash_vectored(bufs: &[&[u8]]) -> [u8; OUT_LEN] {
  let mut h = Blake2b256::new();
  for buf in bufs {
    h.absorb(buf);
  }
  h.finish()
}

#[cfg(test)]
mod tests {
  use std::{format, vec::Vec};

  use super::*;

  fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(7)).collect()
  }

  #[test]
  fn initial_chaining_value_is_iv_xor_params() {
    let h = Blake2b256::with_kernel(Blake2b256KernelId::Portable);
    assert_eq!(h.h[0], IV[0] ^ 0x0101_0020);
    assert_eq!(&h.h[1..6], &IV[1..6]);
    assert_eq!(h.h[6], IV[6] ^ u64::from_le_bytes(*b"ckb-defa"));
    assert_eq!(h.h[7], IV[7] ^ u64::from_le_bytes(*b"ult-hash"));
    assert_eq!(h.out_len, OUT_LEN);
    assert!(!h.last_node);
  }

  #[test]
  fn empty_input_digest() {
    let expected = [
      0x44, 0xf4, 0xc6, 0x97, 0x44, 0xd5, 0xf8, 0xc5, 0x5d, 0x64, 0x20, 0x62, 0x94, 0x9d, 0xca, 0xe4, 0x9b, 0xc4, 0xe7,
      0xef, 0x43, 0xd3, 0x88, 0xc5, 0xa1, 0x2f, 0x42, 0xb5, 0x63, 0x3d, 0x16, 0x3e,
    ];
    assert_eq!(hash(&[]), expected);

    let mut h = initialize();
    let mut out = [0u8; OUT_LEN];
    h.finalize(&mut out).unwrap();
    assert_eq!(out, expected);
  }

  #[test]
  fn counter_carries_into_high_word() {
    let mut h = Blake2b256::new();
    h.t = [u64::MAX - 100, 0];
    h.increment_counter(128);
    assert_eq!(h.t, [27, 1]);

    h.t = [u64::MAX, 0];
    h.increment_counter(1);
    assert_eq!(h.t, [0, 1]);

    h.t = [5, 0];
    h.increment_counter(0);
    assert_eq!(h.t, [5, 0]);
  }

  #[test]
  fn bytes_hashed_spans_both_counter_words() {
    let mut h = Blake2b256::new();
    h.t = [u64::MAX, 0];
    h.increment_counter(BLOCK_LEN as u64);
    assert_eq!(h.bytes_hashed(), (1u128 << 64) + 127);
  }

  #[test]
  fn phases_follow_the_lifecycle() {
    let mut h = Blake2b256::new();
    assert_eq!(h.phase(), Phase::Fresh);

    h.update(&[]).unwrap();
    assert_eq!(h.phase(), Phase::Fresh);

    h.update(b"a").unwrap();
    assert_eq!(h.phase(), Phase::Accumulating);

    let _ = h.finalize_array().unwrap();
    assert_eq!(h.phase(), Phase::Finalized);
    assert!(h.is_finalized());

    h.reset();
    assert_eq!(h.phase(), Phase::Fresh);
    assert_eq!(h.bytes_hashed(), 0);
  }

  #[test]
  fn full_block_is_held_back_until_more_input() {
    let mut h = Blake2b256::new();
    h.update(&[0u8; BLOCK_LEN]).unwrap();
    assert_eq!(h.t, [0, 0]);
    assert_eq!(h.buf_len, BLOCK_LEN);

    h.update(&[0u8]).unwrap();
    assert_eq!(h.t, [BLOCK_LEN as u64, 0]);
    assert_eq!(h.buf_len, 1);
    assert_eq!(h.bytes_hashed(), BLOCK_LEN as u128 + 1);
  }

  #[test]
  fn short_output_buffer_is_rejected_without_side_effects() {
    let mut h = Blake2b256::new();
    h.update(b"abc").unwrap();

    let mut short = [0xaau8; 31];
    assert_eq!(h.finalize(&mut short), Err(HashError::InvalidOutputBuffer { required: 32, actual: 31 }));
    assert_eq!(short, [0xaau8; 31]);
    assert_eq!(h.phase(), Phase::Accumulating);

    let mut out = [0u8; OUT_LEN];
    h.finalize(&mut out).unwrap();
    assert_eq!(out, hash(b"abc"));
  }

  #[test]
  fn oversized_output_buffer_keeps_its_tail() {
    let mut h = Blake2b256::new();
    h.update(b"abc").unwrap();

    let mut out = [0x55u8; 40];
    h.finalize(&mut out).unwrap();
    assert_eq!(&out[..OUT_LEN], &hash(b"abc"));
    assert_eq!(&out[OUT_LEN..], &[0x55u8; 8]);
  }

  #[test]
  fn second_finalize_is_rejected_and_writes_nothing() {
    let mut h = Blake2b256::new();
    let mut out = [0u8; OUT_LEN];
    h.finalize(&mut out).unwrap();

    let mut again = [0u8; OUT_LEN];
    assert_eq!(h.finalize(&mut again), Err(HashError::AlreadyFinalized));
    assert_eq!(again, [0u8; OUT_LEN]);
    assert_eq!(h.finalize_array(), Err(HashError::AlreadyFinalized));
  }

  #[test]
  fn short_buffer_is_reported_before_finalized() {
    let mut h = Blake2b256::new();
    let _ = h.finalize_array().unwrap();
    let mut short = [0u8; 8];
    assert!(matches!(h.finalize(&mut short), Err(HashError::InvalidOutputBuffer { .. })));
  }

  #[test]
  fn update_after_finalize_is_rejected() {
    let mut h = Blake2b256::new();
    h.update(b"abc").unwrap();
    let _ = h.finalize_array().unwrap();
    let snapshot = h.bytes_hashed();

    assert_eq!(h.update(b"more"), Err(HashError::AlreadyFinalized));
    assert_eq!(h.bytes_hashed(), snapshot);
  }

  #[test]
  fn every_split_point_matches_one_shot() {
    let msg = pattern(3 * BLOCK_LEN + 17);
    let expected = hash(&msg);

    for split in 0..=msg.len() {
      let (a, b) = msg.split_at(split);
      let mut h = Blake2b256::new();
      h.update(a).unwrap();
      h.update(b).unwrap();
      assert_eq!(h.finalize_array().unwrap(), expected, "split={split}");
    }
  }

  #[test]
  fn byte_at_a_time_matches_one_shot() {
    let msg = pattern(2 * BLOCK_LEN + 1);
    let mut h = Blake2b256::new();
    for b in &msg {
      h.update(core::slice::from_ref(b)).unwrap();
    }
    assert_eq!(h.finalize_array().unwrap(), hash(&msg));
  }

  #[test]
  fn vectored_matches_concatenation() {
    let msg = pattern(300);
    let (a, rest) = msg.split_at(100);
    let (b, c) = rest.split_at(150);
    let empty: &[u8] = &[];
    assert_eq!(hash_vectored(&[a, empty, b, c]), hash(&msg));
    assert_eq!(<Blake2b256 as Digest>::digest_vectored(&[a, b, c]), hash(&msg));
  }

  #[test]
  fn single_byte_change_alters_digest() {
    let msg = pattern(200);
    let base = hash(&msg);
    for i in [0, 1, 127, 128, 199] {
      let mut tweaked = msg.clone();
      tweaked[i] ^= 1;
      assert_ne!(hash(&tweaked), base, "flip at {i}");
    }
  }

  #[test]
  fn clone_forks_a_common_prefix() {
    let mut prefix = Blake2b256::new();
    prefix.update(&pattern(130)).unwrap();

    let mut a = prefix.clone();
    let mut b = prefix;
    a.update(b"left").unwrap();
    b.update(b"right").unwrap();

    let mut left = pattern(130);
    left.extend_from_slice(b"left");
    assert_eq!(a.finalize_array().unwrap(), hash(&left));
    assert_ne!(b.finalize_array().unwrap(), hash(&left));
  }

  #[test]
  #[cfg(feature = "std")]
  fn io_write_streams_and_reports_finalized() {
    use std::io::Write;

    let mut h = Blake2b256::new();
    h.write_all(b"The quick brown fox ").unwrap();
    h.write_all(b"jumps over the lazy dog").unwrap();
    h.flush().unwrap();
    let digest = h.finalize_array().unwrap();
    assert_eq!(digest, hash(b"The quick brown fox jumps over the lazy dog"));

    let err = h.write(b"x").unwrap_err();
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<HashError>());
    assert_eq!(inner, Some(&HashError::AlreadyFinalized));
  }

  #[test]
  fn reset_keeps_the_pinned_kernel() {
    let mut h = Blake2b256::with_kernel(Blake2b256KernelId::Portable);
    h.update(b"abc").unwrap();
    let first = h.finalize_array().unwrap();

    h.reset();
    assert_eq!(h.kernel(), Blake2b256KernelId::Portable);
    assert_eq!(h.phase(), Phase::Fresh);

    h.update(b"abc").unwrap();
    assert_eq!(h.finalize_array().unwrap(), first);
  }

  #[test]
  fn debug_hides_internal_state() {
    let h = Blake2b256::new();
    let s = format!("{h:?}");
    assert!(s.contains("Fresh"));
    assert!(!s.contains("buf"));
  }

  #[test]
  fn last_node_sets_second_flag_word() {
    let mut plain = Blake2b256::with_kernel(Blake2b256KernelId::Portable);
    let mut last = plain.clone();
    last.last_node = true;

    let a = plain.finalize_array().unwrap();
    let b = last.finalize_array().unwrap();
    assert_eq!(plain.f, [u64::MAX, 0]);
    assert_eq!(last.f, [u64::MAX, u64::MAX]);
    assert_ne!(a, b);
  }
}
