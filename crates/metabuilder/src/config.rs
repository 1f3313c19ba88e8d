//! Configuration types for the MetaBuilder editing engine.
//!
//! All types implement [`serde::Deserialize`] so that front ends can load
//! them from a TOML file. Every section falls back to its defaults when it
//! is missing.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining canvas and text settings.
//! - [`CanvasConfig`] - Size of the drawing area new elements are clipped to.
//! - [`TextMetrics`] - Measurement of element and label text.
//!
//! # Example
//!
//! ```
//! # use metabuilder::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.canvas().width(), 1000);
//! ```

use serde::Deserialize;

use metabuilder_core::geometry::Dimension;

use crate::{error::MetabuilderError, viewer::TextMetrics};

/// Smallest canvas width or height accepted by [`AppConfig::validate`].
pub const MIN_CANVAS_SIZE: i32 = 250;

/// Largest canvas width or height accepted by [`AppConfig::validate`].
pub const MAX_CANVAS_SIZE: i32 = 4000;

/// Top-level configuration combining canvas and text settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,

    /// Text measurement section.
    #[serde(default)]
    text: TextMetrics,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `canvas` - Size of the drawing area.
    /// * `text` - Text measurement parameters.
    pub fn new(canvas: CanvasConfig, text: TextMetrics) -> Self {
        Self { canvas, text }
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Returns the text metrics.
    pub fn text(&self) -> &TextMetrics {
        &self.text
    }

    /// Checks that the canvas size lies within
    /// [`MIN_CANVAS_SIZE`]..=[`MAX_CANVAS_SIZE`], that text metrics have a
    /// positive character width and line height, and that text padding is
    /// not negative.
    ///
    /// # Errors
    ///
    /// Returns [`MetabuilderError::Config`] naming the offending setting.
    pub fn validate(&self) -> Result<(), MetabuilderError> {
        for (name, value) in [("width", self.canvas.width), ("height", self.canvas.height)] {
            if !(MIN_CANVAS_SIZE..=MAX_CANVAS_SIZE).contains(&value) {
                return Err(MetabuilderError::Config(format!(
                    "canvas {name} {value} is outside {MIN_CANVAS_SIZE}..={MAX_CANVAS_SIZE}"
                )));
            }
        }

        for (name, value) in [
            ("char_width", self.text.char_width()),
            ("line_height", self.text.line_height()),
        ] {
            if value <= 0 {
                return Err(MetabuilderError::Config(format!(
                    "text {name} {value} must be positive"
                )));
            }
        }

        for (name, value) in [
            ("horizontal_padding", self.text.horizontal_padding()),
            ("vertical_padding", self.text.vertical_padding()),
        ] {
            if value < 0 {
                return Err(MetabuilderError::Config(format!(
                    "text {name} {value} must not be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Size of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    width: i32,
    height: i32,
}

impl CanvasConfig {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn dimension(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(1000, 1000)
    }
}
