//! Integration test crate for Strata.
//!
//! Carries no library code of its own; the end-to-end scenarios live under
//! `tests/`. Never published.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
