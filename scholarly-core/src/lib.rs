//! Scholarly Core - shared configuration, errors, logging and async helpers
//!
//! Every other scholarly crate builds on the types defined here.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;

pub use self::async_utils::*;
pub use self::config::*;
pub use self::error::*;
pub use self::logging::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
