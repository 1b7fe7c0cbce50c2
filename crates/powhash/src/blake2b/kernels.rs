use platform::Caps;

use super::{BLOCK_LEN, portable};

pub(crate) type CompressFn = fn(&mut [u64; 8], &[u8; BLOCK_LEN], &[u64; 2], &[u64; 2]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Blake2b256KernelId {
  Portable = 0,
  #[cfg(target_arch = "x86_64")]
  X86Ssse3 = 1,
}

/// Every kernel compiled for this target, slowest first.
pub const ALL: &[Blake2b256KernelId] = &[
  Blake2b256KernelId::Portable,
  #[cfg(target_arch = "x86_64")]
  Blake2b256KernelId::X86Ssse3,
];

impl Blake2b256KernelId {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Portable => "portable",
      #[cfg(target_arch = "x86_64")]
      Self::X86Ssse3 => "x86_64/ssse3",
    }
  }
}

#[must_use]
pub fn id_from_name(name: &str) -> Option<Blake2b256KernelId> {
  match name {
    "portable" => Some(Blake2b256KernelId::Portable),
    #[cfg(target_arch = "x86_64")]
    "x86_64/ssse3" => Some(Blake2b256KernelId::X86Ssse3),
    _ => None,
  }
}

#[must_use]
pub(crate) fn compress_fn(id: Blake2b256KernelId) -> CompressFn {
  match id {
    Blake2b256KernelId::Portable => portable::compress,
    #[cfg(target_arch = "x86_64")]
    Blake2b256KernelId::X86Ssse3 => super::x86_64::compress,
  }
}

#[inline]
#[must_use]
pub const fn required_caps(id: Blake2b256KernelId) -> Caps {
  match id {
    Blake2b256KernelId::Portable => Caps::NONE,
    #[cfg(target_arch = "x86_64")]
    Blake2b256KernelId::X86Ssse3 => platform::caps::x86::SSSE3_READY,
  }
}

/// Fastest kernel whose requirements `caps` satisfies.
#[must_use]
pub fn best_for_caps(caps: Caps) -> Blake2b256KernelId {
  ALL.iter().rev().copied().find(|&id| caps.has(required_caps(id))).unwrap_or(Blake2b256KernelId::Portable)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_round_trip() {
    for &id in ALL {
      assert_eq!(id_from_name(id.as_str()), Some(id));
    }
    assert_eq!(id_from_name("avx512"), None);
  }

  #[test]
  fn portable_needs_nothing() {
    assert!(required_caps(Blake2b256KernelId::Portable).is_empty());
    assert_eq!(best_for_caps(Caps::NONE), Blake2b256KernelId::Portable);
  }

  #[test]
  #[cfg(target_arch = "x86_64")]
  fn ssse3_selected_only_with_both_bits() {
    use platform::caps::x86;

    assert_eq!(best_for_caps(x86::SSE2), Blake2b256KernelId::Portable);
    assert_eq!(best_for_caps(x86::SSSE3), Blake2b256KernelId::Portable);
    assert_eq!(best_for_caps(x86::SSSE3_READY), Blake2b256KernelId::X86Ssse3);
    assert_eq!(best_for_caps(x86::SSSE3_READY | platform::Caps::bit(40)), Blake2b256KernelId::X86Ssse3);
  }
}
