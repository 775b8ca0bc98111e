//! Output formats for editor frames.
//!
//! A [`Renderer`] turns a [`Frame`] into a text document. [`SvgRenderer`]
//! draws the tree the way the editor shows it; [`OutlineRenderer`] prints an
//! indented listing for terminals.

mod outline;
mod svg;

pub use self::{outline::OutlineRenderer, svg::SvgRenderer};

use std::{fs, io, path::Path};

use log::{error, info};
use thiserror::Error;

use crate::editor::Frame;

/// Renders a frame into a text document.
pub trait Renderer {
    /// Renders `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Render`] if the frame cannot be expressed in
    /// this format.
    fn render(&self, frame: &Frame) -> Result<String, ExportError>;
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Renders `frame` with `renderer` and writes the result to `path`.
///
/// # Errors
///
/// Returns the renderer's error, or [`ExportError::Io`] if the file cannot be
/// written.
pub fn write_to_file(
    renderer: &impl Renderer,
    frame: &Frame,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let document = renderer.render(frame)?;

    info!(path = path.display().to_string(); "Writing rendered tree");
    if let Err(err) = fs::write(path, document) {
        error!(path = path.display().to_string(), err:err; "Failed to write rendered tree");
        return Err(ExportError::Io(err));
    }

    Ok(())
}
