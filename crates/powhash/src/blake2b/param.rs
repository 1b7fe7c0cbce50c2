//! BLAKE2b parameter block (RFC 7693 section 2.5).
//!
//! Only one configuration exists here: unkeyed, sequential mode, 32-byte
//! digest, zero salt, `"ckb-default-hash"` personalization.

use super::{OUT_LEN, PERSONALIZATION};

/// Serialized parameter block length in bytes.
pub const PARAM_LEN: usize = 64;

/// The 64-byte configuration XORed into the IV at initialization.
///
/// Immutable once built: fields are private and there are no setters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamBlock {
  digest_length: u8,
  key_length: u8,
  fanout: u8,
  depth: u8,
  leaf_length: u32,
  node_offset: u64,
  node_depth: u8,
  inner_length: u8,
  reserved: [u8; 14],
  salt: [u8; 16],
  personal: [u8; 16],
}

impl ParamBlock {
  /// The fixed sequential-mode block.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      digest_length: OUT_LEN as u8,
      key_length: 0,
      fanout: 1,
      depth: 1,
      leaf_length: 0,
      node_offset: 0,
      node_depth: 0,
      inner_length: 0,
      reserved: [0; 14],
      salt: [0; 16],
      personal: *PERSONALIZATION,
    }
  }

  #[inline]
  #[must_use]
  pub const fn digest_length(&self) -> u8 {
    self.digest_length
  }

  #[inline]
  #[must_use]
  pub const fn key_length(&self) -> u8 {
    self.key_length
  }

  #[inline]
  #[must_use]
  pub const fn fanout(&self) -> u8 {
    self.fanout
  }

  #[inline]
  #[must_use]
  pub const fn depth(&self) -> u8 {
    self.depth
  }

  #[inline]
  #[must_use]
  pub const fn personal(&self) -> &[u8; 16] {
    &self.personal
  }

  /// Wire layout: bytes 0..4 are the single-byte fields, 4..8 leaf length,
  /// 8..16 node offset, 16 node depth, 17 inner length, 18..32 reserved,
  /// 32..48 salt, 48..64 personalization. Multi-byte integers are little-endian.
  #[must_use]
  pub const fn to_bytes(&self) -> [u8; PARAM_LEN] {
    let mut out = [0u8; PARAM_LEN];
    out[0] = self.digest_length;
    out[1] = self.key_length;
    out[2] = self.fanout;
    out[3] = self.depth;

    let leaf = self.leaf_length.to_le_bytes();
    let mut i = 0;
    while i < 4 {
      out[4 + i] = leaf[i];
      i += 1;
    }

    let offset = self.node_offset.to_le_bytes();
    i = 0;
    while i < 8 {
      out[8 + i] = offset[i];
      i += 1;
    }

    out[16] = self.node_depth;
    out[17] = self.inner_length;

    i = 0;
    while i < 14 {
      out[18 + i] = self.reserved[i];
      i += 1;
    }

    i = 0;
    while i < 16 {
      out[32 + i] = self.salt[i];
      out[48 + i] = self.personal[i];
      i += 1;
    }

    out
  }

  /// The block as 8 little-endian words, ready to XOR into the IV.
  #[must_use]
  pub const fn to_words(&self) -> [u64; 8] {
    let bytes = self.to_bytes();
    let mut words = [0u64; 8];
    let mut w = 0;
    while w < 8 {
      let mut le = [0u8; 8];
      let mut b = 0;
      while b < 8 {
        le[b] = bytes[w * 8 + b];
        b += 1;
      }
      words[w] = u64::from_le_bytes(le);
      w += 1;
    }
    words
  }
}

impl Default for ParamBlock {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
