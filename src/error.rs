//! Error handling for the tax engine
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.
//!
//! The evaluation pipeline itself never fails on bad input rows; those are
//! collected as skipped items (see `tax::engine`). These variants cover the
//! surrounding I/O: reading input files and configuration.

use thiserror::Error;

/// Core error types for tax engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("import error: {0}")]
    ImportError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("export error: {0}")]
    ExportError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tax engine operations
pub type Result<T> = anyhow::Result<T>;
