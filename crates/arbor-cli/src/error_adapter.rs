//! Error adapter for converting ArborError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's report formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use arbor::{ArborError, TreeError};

/// Adapter giving an [`ArborError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a ArborError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ArborError::Io(_) => "arbor::io",
            ArborError::Config(_) => "arbor::config",
            ArborError::Persistence(_) => "arbor::persistence",
            ArborError::Tree(_) => "arbor::tree",
            ArborError::Export(_) => "arbor::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            ArborError::Config(_) => "check the configuration file or pass one with --config",
            ArborError::Tree(TreeError::NotFound(_)) => {
                "run `arbor show` to list the ids in the current tree"
            }
            ArborError::Tree(TreeError::ProtectedRoot(_)) => {
                "use `arbor reset` to start over with a fresh tree"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
