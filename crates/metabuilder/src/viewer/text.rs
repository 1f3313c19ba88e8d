//! Monospace text measurement.
//!
//! Element and label sizes depend on the extent of their text. The engine
//! does not rasterize fonts; it measures text with a fixed advance per
//! character and a fixed height per line, which is enough to keep layout
//! decisions stable and reproducible.

use serde::Deserialize;

use metabuilder_core::geometry::Dimension;

/// Measurement parameters for a monospace font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    /// Advance of a single character in pixels.
    char_width: i32,

    /// Height of a single line in pixels.
    line_height: i32,

    /// Horizontal padding added on each side of padded text.
    horizontal_padding: i32,

    /// Vertical padding added above and below padded text.
    vertical_padding: i32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7,
            line_height: 16,
            horizontal_padding: 7,
            vertical_padding: 6,
        }
    }
}

impl TextMetrics {
    pub fn new(
        char_width: i32,
        line_height: i32,
        horizontal_padding: i32,
        vertical_padding: i32,
    ) -> Self {
        Self {
            char_width,
            line_height,
            horizontal_padding,
            vertical_padding,
        }
    }

    pub fn char_width(&self) -> i32 {
        self.char_width
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    pub fn horizontal_padding(&self) -> i32 {
        self.horizontal_padding
    }

    pub fn vertical_padding(&self) -> i32 {
        self.vertical_padding
    }

    /// Extent of `text` without padding.
    ///
    /// Lines are separated by `\n`. Empty text has no extent.
    pub fn dimension(&self, text: &str) -> Dimension {
        if text.is_empty() {
            return Dimension::ZERO;
        }
        let mut lines = 0;
        let mut widest = 0;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count() as i32);
        }
        Dimension::new(widest * self.char_width, lines * self.line_height)
    }

    /// Extent of `text` including padding on every side.
    pub fn padded_dimension(&self, text: &str) -> Dimension {
        if text.is_empty() {
            return Dimension::ZERO;
        }
        self.dimension(text)
            .include(self.horizontal_padding, self.vertical_padding)
    }

    /// Greedy word wrap to at most `line_length` characters per line.
    ///
    /// Words longer than `line_length` are kept whole on their own line.
    pub fn wrap(&self, text: &str, line_length: usize) -> String {
        let mut wrapped = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let needed = if line.is_empty() {
                    word.chars().count()
                } else {
                    line.chars().count() + 1 + word.chars().count()
                };
                if needed > line_length && !line.is_empty() {
                    wrapped.push(std::mem::take(&mut line));
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
            wrapped.push(line);
        }
        wrapped.join("\n")
    }
}
