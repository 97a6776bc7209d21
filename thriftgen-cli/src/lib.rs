//! Library half of the `thriftgen` binary: configuration discovery and
//! merging, kept separate from `main.rs` so it can be tested directly.

pub mod config;
