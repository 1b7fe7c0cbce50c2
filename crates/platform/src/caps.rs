//! CPU capability representation.
//!
//! This module answers the question: "What instructions can I legally run on
//! this machine?" for the kernels the workspace actually ships.
//!
//! # Bit Layout
//!
//! - Bits 0-31: x86/x86_64 features
//! - Bits 32-63: reserved
//!
//! # Usage
//!
//! ```
//! use platform::caps::x86;
//!
//! let c = platform::caps();
//! if c.has(x86::SSSE3) {
//!   // 128-bit byte shuffles are available
//! }
//! # let _ = c;
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Core Capability Type
// ─────────────────────────────────────────────────────────────────────────────

/// CPU capabilities: a 64-bit feature bitset.
///
/// `Caps` is `Copy`, `Send`, and `Sync`. It can be freely shared across threads.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub(crate) u64);

impl Caps {
  /// Empty capability set (no features). Always satisfies portable kernels.
  pub const NONE: Self = Self(0);

  /// Create a capability set with a single bit set.
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    Self(1u64 << (bit % 64))
  }

  /// Check if all features in `required` are present.
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0 & required.0) == required.0
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  /// Intersection of two capability sets.
  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self(self.0 & other.0)
  }

  /// Check if the capability set is empty.
  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  /// Raw bits, used by the override storage.
  #[inline]
  #[must_use]
  pub(crate) const fn bits(self) -> u64 {
    self.0
  }

  /// Iterate over the names of all known features present in this set.
  pub fn feature_names(self) -> impl Iterator<Item = &'static str> {
    NAMED.iter().filter(move |(_, caps)| self.has(*caps)).map(|(name, _)| *name)
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitAnd for Caps {
  type Output = Self;

  #[inline]
  fn bitand(self, rhs: Self) -> Self::Output {
    self.intersection(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

impl core::fmt::Debug for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_set().entries(self.feature_names()).finish()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86/x86_64 Features (bits 0-31)
// ─────────────────────────────────────────────────────────────────────────────

/// x86/x86_64 CPU features.
pub mod x86 {
  use super::Caps;

  pub const SSE2: Caps = Caps::bit(0);
  pub const SSSE3: Caps = Caps::bit(1);

  /// Everything the 128-bit BLAKE2b kernel touches (`pshufb`, `palignr`).
  pub const SSSE3_READY: Caps = SSE2.union(SSSE3);
}

const NAMED: &[(&str, Caps)] = &[("sse2", x86::SSE2), ("ssse3", x86::SSSE3)];
