//! SVG rendering of a frame.

use log::debug;
use svg::{
    Document,
    node::{Text as SvgText, element as svg_element},
};

use arbor_core::geometry::Size;

use super::{ExportError, Renderer};
use crate::{
    config::Palette,
    editor::Frame,
    layout::{Connector, PlacedNode, TreeLayout},
};

/// Draws the tree as an SVG document sized to the layout canvas.
///
/// Layers, bottom to top: optional background, connectors, node boxes with
/// their labels, and the frame's notice if there is one.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    palette: Palette,
    font_family: String,
    font_size: f32,
    corner_radius: f32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl SvgRenderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            corner_radius: 6.0,
        }
    }

    /// Set the label font family
    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    /// Set the label font size
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Builds the SVG document for `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Render`] if the canvas size is not a finite,
    /// positive size.
    pub fn render_document(&self, frame: &Frame) -> Result<Document, ExportError> {
        let layout = frame.layout();
        let canvas = layout.canvas_size();
        if !(canvas.width() > 0.0 && canvas.height() > 0.0)
            || !canvas.width().is_finite()
            || !canvas.height().is_finite()
        {
            return Err(ExportError::Render(format!(
                "invalid canvas size {}x{}",
                canvas.width(),
                canvas.height()
            )));
        }

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", canvas.width(), canvas.height()),
            )
            .set("width", canvas.width())
            .set("height", canvas.height());

        if let Some(background) = self.render_background(canvas) {
            doc = doc.add(background);
        }
        doc = doc.add(self.render_connectors(layout.connectors()));

        let mut nodes = svg_element::Group::new().set("class", "nodes");
        for node in layout.nodes() {
            nodes = nodes.add(self.render_node(layout, node));
        }
        doc = doc.add(nodes);

        if let Some(notice) = frame.notice() {
            let text = svg_element::Text::new("")
                .set("class", "notice")
                .set("x", canvas.width() / 2.0)
                .set("y", self.font_size)
                .set("text-anchor", "middle")
                .set("dominant-baseline", "central")
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size)
                .set("fill", &self.palette.text)
                .add(SvgText::new(notice.to_string()));
            doc = doc.add(text);
        }

        debug!(
            nodes_len = layout.node_count(),
            connectors_len = layout.connectors().len();
            "SVG document rendered",
        );
        Ok(doc)
    }

    fn render_background(&self, canvas: Size) -> Option<svg_element::Rectangle> {
        let color = self.palette.background.as_ref()?;
        Some(
            svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", canvas.width())
                .set("height", canvas.height())
                .set("fill", color)
                .set("fill-opacity", color.alpha()),
        )
    }

    fn render_connectors(&self, connectors: &[Connector]) -> svg_element::Group {
        let stroke = &self.palette.connector_stroke;
        connectors.iter().fold(
            svg_element::Group::new()
                .set("class", "connectors")
                .set("fill", "none")
                .set("stroke", stroke)
                .set("stroke-opacity", stroke.alpha())
                .set("stroke-width", self.palette.stroke_width),
            |group, connector| {
                group.add(
                    svg_element::Path::new()
                        .set("data-parent", connector.parent().as_str())
                        .set("d", connector.to_path_data()),
                )
            },
        )
    }

    fn render_node(&self, layout: &TreeLayout, node: &PlacedNode) -> svg_element::Group {
        let size = layout.node_size();
        let position = node.position();
        let center = position.add_point(size.half_extent());
        let fill = if node.id() == layout.root() {
            &self.palette.root_fill
        } else {
            &self.palette.node_fill
        };

        let rect = svg_element::Rectangle::new()
            .set("x", position.x())
            .set("y", position.y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", self.corner_radius)
            .set("fill", fill)
            .set("fill-opacity", fill.alpha())
            .set("stroke", &self.palette.node_stroke)
            .set("stroke-width", self.palette.stroke_width);

        let label = svg_element::Text::new("")
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", &self.palette.text)
            .add(SvgText::new(node.label()));

        svg_element::Group::new()
            .set("class", "node")
            .set("data-id", node.id().as_str())
            .add(rect)
            .add(label)
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, frame: &Frame) -> Result<String, ExportError> {
        self.render_document(frame).map(|doc| doc.to_string())
    }
}
