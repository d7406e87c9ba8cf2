//! `cadence-core` — shared configuration and error types for the cadence
//! daemon.

pub mod config;
pub mod error;

pub use config::CadenceConfig;
pub use error::{CadenceError, Result};
