//! CPU detection and capabilities for powhash.
//!
//! This crate is the single source of truth for CPU feature detection across
//! the workspace. Algorithms query [`caps()`] instead of doing ad-hoc
//! detection, then pick a kernel whose required [`Caps`] are present.
//!
//! ```
//! use platform::caps::x86;
//!
//! if platform::caps().has(x86::SSSE3_READY) {
//!   // SSSE3 kernel is legal on this machine
//! }
//! ```
//!
//! 1. **Compile-time when possible**: `cfg!(target_feature)` results are folded in.
//! 2. **Cached otherwise**: runtime detection is cached in a `OnceLock` (std).
//! 3. **Overridable**: [`set_caps_override`] pins the result for tests and bare metal.
//! 4. **Miri-safe**: under Miri, always returns portable-only caps.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod caps;
mod detect;

pub use caps::Caps;
pub use detect::{caps, caps_static, detect_uncached, has_override, set_caps_override};
