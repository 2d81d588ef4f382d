//! Error types for melody-core
//!
//! Defines engine-specific error types using thiserror for clear error
//! propagation across the plugin and transport boundaries.

use thiserror::Error;

use crate::engine::Stage;

/// Main error type for the orchestration engine
#[derive(Error, Debug)]
pub enum Error {
    /// Plugin registration rejected (duplicate instance, empty name)
    #[error("Invalid plugin: {0}")]
    InvalidPlugin(String),

    /// Selected plugin is not resident in the registry
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    /// Operation requires a selected plugin (and credential) that is absent
    #[error("No plugin selected: {0}")]
    NoPluginSelected(String),

    /// Driving operation invoked out of sequence
    #[error("Operation '{operation}' is not valid in stage {stage:?}")]
    InvalidStage {
        /// Name of the driving operation that was attempted
        operation: &'static str,
        /// Stage the engine was in when the operation arrived
        stage: Stage,
    },

    /// Interactive or provider-side credential acquisition failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Unrecoverable provider fetch failure
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the melody-core Error
pub type Result<T> = std::result::Result<T, Error>;
