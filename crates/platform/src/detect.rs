//! CPU capability detection.
//!
//! - Compile-time detection via `cfg!(target_feature = ...)`
//! - Runtime detection via `is_x86_feature_detected!` (std only)
//! - Caching via `OnceLock` (std); compile-time results need no cache
//! - User-supplied overrides for bare metal and testing
//!
//! The override takes precedence over detection.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::caps::Caps;
#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
use crate::caps::x86;

// ─────────────────────────────────────────────────────────────────────────────
// Compile-Time Static Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Returns CPU capabilities known at compile time.
///
/// Detects features enabled via `-C target-feature=...` or `-C target-cpu=native`.
///
/// ```
/// const CAPS: platform::Caps = platform::caps_static();
///
/// #[cfg(target_arch = "x86_64")]
/// assert!(CAPS.has(platform::caps::x86::SSE2));
/// # let _ = CAPS;
/// ```
#[inline(always)]
#[must_use]
pub const fn caps_static() -> Caps {
  #[allow(unused_macros)] // Only used on x86/x86_64
  macro_rules! detect {
    ($caps:ident; $($feature:literal => $cap:expr),+ $(,)?) => {
      $(if cfg!(target_feature = $feature) { $caps = $caps.union($cap); })+
    };
  }

  #[allow(unused_mut)]
  let mut result = Caps::NONE;

  #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
  {
    detect!(result;
      "sse2" => x86::SSE2,
      "ssse3" => x86::SSSE3,
    );
  }

  result
}

// ─────────────────────────────────────────────────────────────────────────────
// Override Support
// ─────────────────────────────────────────────────────────────────────────────

static OVERRIDE_SET: AtomicBool = AtomicBool::new(false);
static OVERRIDE_BITS: AtomicU64 = AtomicU64::new(0);

/// Set or clear the capabilities override.
///
/// When set, [`caps()`] returns the override value instead of detecting.
/// Pass `None` to clear the override and resume detection.
///
/// Kernel dispatch caches its decision on first use, so the override should
/// be installed early in program initialization.
pub fn set_caps_override(value: Option<Caps>) {
  match value {
    Some(caps) => {
      OVERRIDE_BITS.store(caps.bits(), Ordering::Release);
      OVERRIDE_SET.store(true, Ordering::Release);
    }
    None => OVERRIDE_SET.store(false, Ordering::Release),
  }
}

/// Check if an override is currently set.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  OVERRIDE_SET.load(Ordering::Acquire)
}

fn get_override() -> Option<Caps> {
  if !OVERRIDE_SET.load(Ordering::Acquire) {
    return None;
  }
  Some(Caps(OVERRIDE_BITS.load(Ordering::Acquire)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Main API
// ─────────────────────────────────────────────────────────────────────────────

/// Get detected CPU capabilities.
///
/// Under Miri, always returns portable-only capabilities to avoid
/// interpreting SIMD intrinsics.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  #[cfg(miri)]
  {
    Caps::NONE
  }

  #[cfg(not(miri))]
  {
    if let Some(caps) = get_override() {
      return caps;
    }

    #[cfg(feature = "std")]
    {
      use std::sync::OnceLock;
      static CACHED: OnceLock<Caps> = OnceLock::new();
      *CACHED.get_or_init(detect_uncached)
    }

    #[cfg(not(feature = "std"))]
    {
      caps_static()
    }
  }
}

/// Detect capabilities without caching or overrides.
#[inline]
#[must_use]
pub fn detect_uncached() -> Caps {
  #[cfg(all(feature = "std", any(target_arch = "x86_64", target_arch = "x86")))]
  {
    detect_x86()
  }

  #[cfg(not(all(feature = "std", any(target_arch = "x86_64", target_arch = "x86"))))]
  {
    caps_static()
  }
}

#[cfg(all(feature = "std", any(target_arch = "x86_64", target_arch = "x86")))]
fn detect_x86() -> Caps {
  let mut caps = caps_static();
  if std::arch::is_x86_feature_detected!("sse2") {
    caps |= x86::SSE2;
  }
  if std::arch::is_x86_feature_detected!("ssse3") {
    caps |= x86::SSSE3;
  }
  caps
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn runtime_detection_includes_compile_time_features() {
    assert!(detect_uncached().has(caps_static()));
  }

  #[test]
  #[cfg(target_arch = "x86_64")]
  fn x86_64_baseline_has_sse2() {
    assert!(caps_static().has(x86::SSE2));
    assert!(detect_uncached().has(x86::SSE2));
  }

  #[test]
  fn detection_reports_only_dispatched_features() {
    #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
    assert!(x86::SSSE3_READY.has(detect_uncached()));

    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
    assert!(detect_uncached().is_empty());
  }

  #[test]
  #[cfg(all(target_arch = "x86_64", not(miri)))]
  fn cached_caps_stable() {
    if has_override() {
      return;
    }
    assert_eq!(caps(), caps());
  }

  // Override tests live in `tests/override.rs`, which runs in its own process
  // so it cannot race the detection tests above.
}
