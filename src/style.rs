//! Colors and text styles used by the compositor.

use crate::font::StandardFont;

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// Horizontal alignment of a label inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font, size and color of one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f64,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(font: StandardFont, size: f64, color: Color) -> Self {
        Self { font, size, color }
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.size * 1.2
    }
}

/// The invoice palette.
pub mod palette {
    use super::Color;

    pub const INK: Color = Color::rgb(0.1, 0.1, 0.15);
    pub const MUTED: Color = Color::rgb(0.4, 0.4, 0.4);
    pub const HEADER_BAND: Color = Color::rgb(0.12, 0.12, 0.18);
    pub const RULE: Color = Color::rgb(0.85, 0.85, 0.85);
}

/// Text styles used across the page.
pub mod text_styles {
    use super::{palette, Color, TextStyle};
    use crate::font::StandardFont::{Helvetica, HelveticaBold};

    pub const TITLE: TextStyle = TextStyle::new(HelveticaBold, 22.0, palette::INK);
    pub const SELLER: TextStyle = TextStyle::new(HelveticaBold, 13.0, palette::INK);
    pub const SECTION: TextStyle = TextStyle::new(HelveticaBold, 9.0, palette::MUTED);
    pub const BODY: TextStyle = TextStyle::new(Helvetica, 9.0, palette::INK);
    pub const RUNNING: TextStyle = TextStyle::new(HelveticaBold, 11.0, palette::INK);
    pub const TABLE_HEADER: TextStyle = TextStyle::new(HelveticaBold, 9.0, Color::WHITE);
    pub const CELL: TextStyle = TextStyle::new(Helvetica, 9.0, palette::INK);
    pub const SUMMARY: TextStyle = TextStyle::new(Helvetica, 10.0, palette::INK);
    pub const SUMMARY_STRONG: TextStyle = TextStyle::new(HelveticaBold, 10.0, palette::INK);
    pub const FOOTER: TextStyle = TextStyle::new(Helvetica, 8.0, palette::INK);
    pub const FOOTER_HEADING: TextStyle = TextStyle::new(HelveticaBold, 8.0, palette::MUTED);
    pub const FOLIO: TextStyle = TextStyle::new(Helvetica, 8.0, palette::MUTED);
}
