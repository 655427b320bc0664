//! Core types and utilities for rbus
//!
//! # Modules
//!
//! - `config`: Environment file loading and dump configuration
//! - `error`: Error types and Result alias
//! - `types`: Line tokens, interface map, and introspection summaries

pub mod config;
pub mod error;
pub mod types;

// Re-exports
pub use config::DumpConfig;
pub use error::{Error, Result};
pub use types::*;
