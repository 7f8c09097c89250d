//! # termsweep core
//!
//! Shared, I/O-free logic for termsweep: term set normalization, the
//! multi-pattern matcher, per-term aggregation, domain normalization and
//! owner resolution.
//!
//! Nothing in this crate touches the filesystem or spawns threads. The
//! root `termsweep` crate owns discovery, the worker pool and all output.

pub mod aggregate;
pub mod domain;
pub mod error;
pub mod matcher;
pub mod models;
pub mod owner;
pub mod terms;
