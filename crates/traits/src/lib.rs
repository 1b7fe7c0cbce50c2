//! Core hashing traits for powhash.
//!
//! This crate provides the foundational trait that every hasher in the
//! workspace conforms to, plus the shared error taxonomy. It is `no_std`
//! compatible and has zero dependencies.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Digest`] | Streaming cryptographic hash with an explicit finalize step |
//! | [`HashError`] | Misuse of a hash state (short output buffer, reuse after finalize) |
//!
//! # Fallibility Discipline
//!
//! This crate denies `unwrap`, `expect`, and indexing in non-test code to ensure
//! all error paths are handled explicitly.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod digest;
pub mod error;

pub use digest::Digest;
pub use error::HashError;
