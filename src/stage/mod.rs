//! The stage: entry point, configuration, and errors.

pub mod config;
pub mod core;
pub mod error;

pub use config::{StageConfig, StageConfigBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use core::Stage;
pub use error::StageError;
