//! Keyed memoization with time-based expiry.
//!
//! The crate exposes a single type, [`TtlCache`]: a thread-safe map from
//! string keys to built values, where every entry carries its own time to
//! live and concurrent builds of the same key collapse into one.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod ttl;

// Re-export the cache at the crate root for convenience.
pub use ttl::TtlCache;
