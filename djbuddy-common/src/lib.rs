//! # djbuddy common library
//!
//! Shared code for the djbuddy workspace:
//! - Error type and result alias
//! - Configuration loading (TOML file + compiled defaults)
//! - Mixxx library database discovery

pub mod config;
pub mod error;

pub use error::{Error, Result};
