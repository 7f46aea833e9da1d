//! # brandlens common library
//!
//! Shared code for the brandlens crates:
//! - Error and result types
//! - TOML configuration loading, resolution and write-back

pub mod config;
pub mod error;

pub use error::{Error, Result};
