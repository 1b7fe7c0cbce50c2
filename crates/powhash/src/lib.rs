//! Personalized BLAKE2b-256 hashing core.
//!
//! The single primitive is BLAKE2b with a 32-byte digest and the
//! `"ckb-default-hash"` personalization, the hash used across the CKB
//! proof-of-work stack. This crate is `no_std` compatible; the `std`
//! feature (default) adds runtime CPU detection, environment overrides and
//! an `io::Write` impl.
//!
//! ```
//! let digest = powhash::blake2b::hash(b"");
//! assert_eq!(digest[..4], [0x44, 0xf4, 0xc6, 0x97]);
//! ```
//!
//! # Modules
//!
//! - [`blake2b`] - Streaming state, one-shot helpers, kernel dispatch.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod blake2b;

pub use blake2b::{Blake2b256, hash, hash_vectored, initialize};
pub use traits::{Digest, HashError};
