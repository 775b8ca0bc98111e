//! Plain-text outline of a frame.

use std::fmt::Write;

use super::{ExportError, Renderer};
use crate::editor::Frame;

/// Prints one line per node in pre-order, indented by depth:
///
/// ```text
/// n0  Root
///   n1  Node 1
///     n3  Node 3
///   n2  Node 2
/// ```
#[derive(Debug, Clone)]
pub struct OutlineRenderer {
    indent: usize,
}

impl Default for OutlineRenderer {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of spaces per depth level
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Renderer for OutlineRenderer {
    fn render(&self, frame: &Frame) -> Result<String, ExportError> {
        let mut out = String::new();
        for node in frame.layout().nodes() {
            let pad = (node.depth() - 1) * self.indent;
            writeln!(out, "{:pad$}{}  {}", "", node.id(), node.label())
                .map_err(|err| ExportError::Render(err.to_string()))?;
        }
        if let Some(notice) = frame.notice() {
            writeln!(out, "! {notice}").map_err(|err| ExportError::Render(err.to_string()))?;
        }
        Ok(out)
    }
}
