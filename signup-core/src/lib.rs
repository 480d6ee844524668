//! Signup Core - Shared data structures for the activity sign-up client
//!
//! Domain types, the unified error type, logging setup and configuration handling.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
