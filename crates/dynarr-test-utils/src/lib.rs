//! Test utilities for dynarr development.
//!
//! Provides [`Tracked`], an element type that reports every construction,
//! clone and drop to a per-thread ledger and can be armed to panic on the
//! k-th construction, plus [`panics`] for asserting on unwinding calls.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{counts, disarm, panic_on_construction, panics, reset, Counts, Tracked};
