//! Backend crate: dispatch caching for powhash kernels.
//!
//! Algorithm crates resolve their kernel once (capabilities + configuration)
//! and keep the result in a [`OnceCache`]. Every later call is a single load
//! followed by an indirect call.
//!
//! ```
//! use backend::OnceCache;
//!
//! static ACTIVE: OnceCache<&'static str> = OnceCache::new();
//!
//! let name = ACTIVE.get_or_init(|| "portable");
//! assert_eq!(name, "portable");
//! ```
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cache;

pub use cache::OnceCache;
