//! Domain logic for the CoachKit security core.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the API server, and any future worker or CLI tooling.

pub mod api_keys;
pub mod error;
pub mod hashing;
pub mod reporting;
pub mod security;
pub mod types;
