//! # IronBind Bench
//!
//! Benchmarking utilities for IronBind performance testing.

pub mod fixtures;
pub mod latency;
pub mod throughput;
