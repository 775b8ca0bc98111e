//! Configuration types for the Arbor editor.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default, so a partial file (or none at all)
//! is valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Node size, gaps, margin and viewport used by the layout engine.
//! - [`EditorConfig`] - Editing rules such as the maximum tree depth.
//! - [`StyleConfig`] - Colors and stroke width used by the SVG renderer.
//!
//! # Example
//!
//! ```
//! # use arbor::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.editor().max_depth(), 10);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use arbor_core::{color::Color, geometry::Size, mutation::DEFAULT_MAX_DEPTH};

use crate::{error::ArborError, layout::LayoutOptions};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Editor configuration section.
    #[serde(default)]
    editor: EditorConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, editor: EditorConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            editor,
            style,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the editor configuration.
    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Checks that the configured values can produce a sensible layout.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Config`] for a node size that is not a positive
    /// finite number, negative or non-finite gaps and margin, a zero maximum
    /// depth, or an unparsable color.
    pub fn validate(&self) -> Result<(), ArborError> {
        let layout = &self.layout;
        let positive = |value: f32| value > 0.0 && value.is_finite();
        if !(positive(layout.node_width) && positive(layout.node_height)) {
            return Err(ArborError::Config(format!(
                "node size must be positive, got {}x{}",
                layout.node_width, layout.node_height
            )));
        }
        for (name, value) in [
            ("horizontal_gap", layout.horizontal_gap),
            ("vertical_gap", layout.vertical_gap),
            ("margin", layout.margin),
            ("viewport_width", layout.viewport_width),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(ArborError::Config(format!(
                    "`{name}` must be a non-negative number, got {value}"
                )));
            }
        }
        if self.editor.max_depth == 0 {
            return Err(ArborError::Config("`max_depth` must be at least 1".to_string()));
        }
        self.style.palette().map(|_| ()).map_err(ArborError::Config)
    }
}

/// Layout geometry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    node_width: f32,
    node_height: f32,
    horizontal_gap: f32,
    vertical_gap: f32,
    margin: f32,
    viewport_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 100.0,
            node_height: 40.0,
            horizontal_gap: 20.0,
            vertical_gap: 80.0,
            margin: 40.0,
            viewport_width: 800.0,
        }
    }
}

impl LayoutConfig {
    /// Returns the size of every node box.
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    /// Returns the horizontal space between adjacent sibling subtrees.
    pub fn horizontal_gap(&self) -> f32 {
        self.horizontal_gap
    }

    /// Returns the vertical distance between a parent row and its children row.
    pub fn vertical_gap(&self) -> f32 {
        self.vertical_gap
    }

    /// Returns the blank border around the tree on every side.
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Returns the minimum canvas width.
    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Builds the [`LayoutOptions`] the layout engine runs with.
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions::new(self.node_size())
            .with_horizontal_gap(self.horizontal_gap)
            .with_vertical_gap(self.vertical_gap)
            .with_margin(self.margin)
            .with_viewport_width(self.viewport_width)
    }
}

/// Editing rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    max_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EditorConfig {
    /// Creates an editor configuration with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns the maximum depth of any node (the root is at depth 1).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Visual styling configuration, as CSS color strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    node_fill: String,
    root_fill: String,
    node_stroke: String,
    connector_stroke: String,
    text_color: String,
    stroke_width: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            node_fill: "#e8f0fe".to_string(),
            root_fill: "#c6dafc".to_string(),
            node_stroke: "#1a73e8".to_string(),
            connector_stroke: "#5f6368".to_string(),
            text_color: "#202124".to_string(),
            stroke_width: 1.5,
        }
    }
}

impl StyleConfig {
    /// Parses every configured color into a [`Palette`].
    ///
    /// # Errors
    ///
    /// Returns a message naming the first color string that cannot be parsed.
    pub fn palette(&self) -> Result<Palette, String> {
        let parse = |name: &str, value: &str| {
            Color::new(value).map_err(|err| format!("Invalid {name} in config: {err}"))
        };

        Ok(Palette {
            background: self
                .background_color
                .as_deref()
                .map(|value| parse("background_color", value))
                .transpose()?,
            node_fill: parse("node_fill", &self.node_fill)?,
            root_fill: parse("root_fill", &self.root_fill)?,
            node_stroke: parse("node_stroke", &self.node_stroke)?,
            connector_stroke: parse("connector_stroke", &self.connector_stroke)?,
            text: parse("text_color", &self.text_color)?,
            stroke_width: self.stroke_width,
        })
    }
}

/// Parsed colors used when rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Option<Color>,
    pub node_fill: Color,
    pub root_fill: Color,
    pub node_stroke: Color,
    pub connector_stroke: Color,
    pub text: Color,
    pub stroke_width: f32,
}

impl Default for Palette {
    fn default() -> Self {
        StyleConfig::default()
            .palette()
            .expect("default style colors are valid CSS colors")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        let layout = config.layout();
        assert_eq!(layout.node_size(), Size::new(100.0, 40.0));
        assert_eq!(layout.horizontal_gap(), 20.0);
        assert_eq!(layout.vertical_gap(), 80.0);
        assert_eq!(layout.margin(), 40.0);
        assert_eq!(layout.viewport_width(), 800.0);
        assert_eq!(config.editor().max_depth(), 10);
        assert!(config.style().palette().unwrap().background.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.layout.node_width = 0.0;
        assert!(matches!(config.validate(), Err(ArborError::Config(_))));

        for size in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut config = AppConfig::default();
            config.layout.node_width = size;
            assert!(config.validate().is_err(), "node_width {size} accepted");

            let mut config = AppConfig::default();
            config.layout.node_height = size;
            assert!(config.validate().is_err(), "node_height {size} accepted");
        }

        let mut config = AppConfig::default();
        config.layout.horizontal_gap = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.layout.vertical_gap = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vertical_gap"));

        let mut config = AppConfig::default();
        config.editor = EditorConfig::new(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.style.node_fill = "definitely-not-a-color".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("node_fill"));
    }

    #[test]
    fn test_palette_with_background() {
        let style = StyleConfig {
            background_color: Some("white".to_string()),
            ..StyleConfig::default()
        };
        let palette = style.palette().unwrap();
        assert_eq!(palette.background.map(|c| c.to_string()), Some("white".to_string()));
    }
}
