//! BLAKE2b-256 runtime configuration (kernel overrides).
//!
//! `POWHASH_BLAKE2B_FORCE` selects a kernel by family:
//! - `auto` (default): fastest kernel the CPU supports
//! - `portable` / `scalar`: the scalar reference kernel
//! - `ssse3` / `simd`: the x86_64 SSSE3 kernel
//!
//! Forced modes are always clamped to detected CPU capabilities. The
//! environment is read once per process (`std` only).

use platform::Caps;

use super::kernels::{self, Blake2b256KernelId};

/// Forced kernel selection for BLAKE2b-256.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Blake2bForce {
  /// Use the fastest supported kernel.
  #[default]
  Auto,
  /// Force the portable scalar kernel.
  Portable,
  /// Force the x86_64 SSSE3 kernel (if available).
  Ssse3,
}

impl Blake2bForce {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Auto => "auto",
      Self::Portable => "portable",
      Self::Ssse3 => "ssse3",
    }
  }
}

/// Full BLAKE2b-256 runtime configuration (after applying overrides).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blake2bConfig {
  /// Requested force mode (env).
  pub requested_force: Blake2bForce,
  /// Force mode clamped to detected CPU capabilities.
  pub effective_force: Blake2bForce,
}

impl Blake2bConfig {
  /// Kernel this configuration selects on a machine with `caps`.
  #[must_use]
  pub fn kernel(self, caps: Caps) -> Blake2b256KernelId {
    match self.effective_force {
      Blake2bForce::Auto => kernels::best_for_caps(caps),
      Blake2bForce::Portable => Blake2b256KernelId::Portable,
      #[cfg(target_arch = "x86_64")]
      Blake2bForce::Ssse3 => Blake2b256KernelId::X86Ssse3,
      #[cfg(not(target_arch = "x86_64"))]
      Blake2bForce::Ssse3 => kernels::best_for_caps(caps),
    }
  }
}

/// Parse a force value. Case-insensitive, surrounding whitespace ignored.
#[must_use]
pub fn parse_force(value: &str) -> Option<Blake2bForce> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }

  if value.eq_ignore_ascii_case("auto") {
    return Some(Blake2bForce::Auto);
  }
  if value.eq_ignore_ascii_case("portable") || value.eq_ignore_ascii_case("scalar") {
    return Some(Blake2bForce::Portable);
  }
  if value.eq_ignore_ascii_case("ssse3") || value.eq_ignore_ascii_case("simd") {
    return Some(Blake2bForce::Ssse3);
  }

  None
}

#[cfg(feature = "std")]
fn requested_force() -> Blake2bForce {
  use std::sync::OnceLock;
  static FORCE: OnceLock<Blake2bForce> = OnceLock::new();
  *FORCE.get_or_init(|| std::env::var("POWHASH_BLAKE2B_FORCE").ok().and_then(|v| parse_force(&v)).unwrap_or_default())
}

#[cfg(not(feature = "std"))]
fn requested_force() -> Blake2bForce {
  Blake2bForce::Auto
}

#[inline]
#[must_use]
#[allow(unused_variables)] // `caps` only used on x86_64
fn clamp_force_to_caps(requested: Blake2bForce, caps: Caps) -> Blake2bForce {
  match requested {
    Blake2bForce::Auto | Blake2bForce::Portable => requested,
    Blake2bForce::Ssse3 => {
      #[cfg(target_arch = "x86_64")]
      {
        if caps.has(platform::caps::x86::SSSE3_READY) {
          return Blake2bForce::Ssse3;
        }
      }
      Blake2bForce::Auto
    }
  }
}

/// Get the effective BLAKE2b-256 configuration for the current platform.
#[inline]
#[must_use]
pub fn get() -> Blake2bConfig {
  let requested_force = requested_force();
  Blake2bConfig { requested_force, effective_force: clamp_force_to_caps(requested_force, platform::caps()) }
}
