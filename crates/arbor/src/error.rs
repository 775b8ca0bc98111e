//! Error types for Arbor operations.
//!
//! This module provides the main error type [`ArborError`]. Most editing
//! problems never become an `ArborError`: rejected mutations are reported in
//! the returned frame, and persistence failures during editing are logged and
//! skipped. What remains are setup and output failures.

use std::io;

use thiserror::Error;

use arbor_core::error::TreeError;

use crate::export::ExportError;

/// The main error type for Arbor operations.
#[derive(Debug, Error)]
pub enum ArborError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl From<serde_json::Error> for ArborError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
