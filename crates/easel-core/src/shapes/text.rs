//! Text shape.

use super::{SerializableColor, ShapeKind, ShapeStyle, ShapeTrait, StyleError, default_scale};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            FontWeight::Light => "Light",
            FontWeight::Normal => "Normal",
            FontWeight::Bold => "Bold",
        }
    }

    /// Average glyph advance as a fraction of the font size.
    fn char_width_factor(&self) -> f64 {
        match self {
            FontWeight::Light => 0.50,
            FontWeight::Normal => 0.55,
            FontWeight::Bold => 0.60,
        }
    }
}

impl FromStr for FontWeight {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "lighter" | "300" => Ok(FontWeight::Light),
            "normal" | "regular" | "400" => Ok(FontWeight::Normal),
            "bold" | "bolder" | "700" => Ok(FontWeight::Bold),
            _ => Err(StyleError::InvalidValue {
                property: "font_weight".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Optional text attributes used when creating text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub fill: Option<SerializableColor>,
}

/// A single text property change.
#[derive(Debug, Clone, PartialEq)]
pub enum TextStyleChange {
    FontFamily(String),
    FontSize(f64),
    FontWeight(FontWeight),
    Fill(SerializableColor),
}

impl TextStyleChange {
    /// Parse a `(property, value)` pair such as `("fontSize", "32")`.
    pub fn parse(property: &str, value: &str) -> Result<Self, StyleError> {
        let key: String = property
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let invalid = || StyleError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        };
        match key.as_str() {
            "fontfamily" | "family" => {
                let family = value.trim();
                if family.is_empty() {
                    return Err(invalid());
                }
                Ok(TextStyleChange::FontFamily(family.to_string()))
            }
            "fontsize" | "size" => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|size| size.is_finite() && *size > 0.0)
                .map(TextStyleChange::FontSize)
                .ok_or_else(invalid),
            "fontweight" | "weight" => value.parse().map(TextStyleChange::FontWeight),
            "fill" | "color" => SerializableColor::parse(value).map(TextStyleChange::Fill),
            _ => Err(StyleError::UnknownProperty(property.to_string())),
        }
    }
}

/// A text shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Position (top-left corner of text bounding box).
    pub position: Point,
    /// The text content.
    pub content: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
    /// Style properties; the fill is the text color.
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Times New Roman";
    pub const LINE_HEIGHT: f64 = 1.16;

    /// Create a new text shape with default font settings and black fill.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::default(),
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: ShapeStyle::filled(SerializableColor::black()),
        }
    }

    /// Override whichever attributes the style specifies.
    pub fn with_style(mut self, style: &TextStyle) -> Self {
        if let Some(family) = &style.font_family {
            self.font_family = family.clone();
        }
        if let Some(size) = style.font_size {
            self.font_size = size;
        }
        if let Some(weight) = style.font_weight {
            self.font_weight = weight;
        }
        if let Some(fill) = style.fill {
            self.style.fill_color = Some(fill);
        }
        self
    }

    /// Apply a single property change.
    pub fn apply(&mut self, change: TextStyleChange) {
        match change {
            TextStyleChange::FontFamily(family) => self.font_family = family,
            TextStyleChange::FontSize(size) => self.font_size = size,
            TextStyleChange::FontWeight(weight) => self.font_weight = weight,
            TextStyleChange::Fill(color) => self.style.fill_color = Some(color),
        }
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of laid-out lines (empty content counts as one).
    pub fn line_count(&self) -> usize {
        let lines = self.content.lines().count().max(1);
        if self.content.ends_with('\n') { lines + 1 } else { lines }
    }

    /// Average horizontal advance of one character.
    pub fn glyph_advance(&self) -> f64 {
        self.font_size * self.font_weight.char_width_factor()
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.font_size * Self::LINE_HEIGHT
    }

    /// Approximate width based on character count and font size.
    /// This is a rough estimate; actual width depends on the font.
    pub fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        max_line_len as f64 * self.glyph_advance()
    }

    /// Approximate height based on font size and number of lines.
    pub fn approximate_height(&self) -> f64 {
        self.line_count() as f64 * self.line_height()
    }

    /// Unscaled layout box.
    pub fn layout_rect(&self) -> Rect {
        Rect::from_origin_size(
            self.position,
            (self.approximate_width().max(1.0), self.approximate_height()),
        )
    }
}

impl ShapeTrait for Text {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Text
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn to_path(&self) -> BezPath {
        // Text has no outline of its own; its layout box stands in for selection and bounds
        self.layout_rect().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    shape_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = Text::new(Point::new(100.0, 100.0), "Hello");
        assert_eq!(text.content(), "Hello");
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
        assert_eq!(text.font_family, Text::DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn test_with_style_overrides_only_given_fields() {
        let style = TextStyle {
            font_size: Some(40.0),
            fill: Some(SerializableColor::parse("purple").unwrap()),
            ..TextStyle::default()
        };
        let text = Text::new(Point::ZERO, "Hi").with_style(&style);
        assert!((text.font_size - 40.0).abs() < f64::EPSILON);
        assert_eq!(text.font_family, Text::DEFAULT_FONT_FAMILY);
        assert_eq!(text.style.fill_color, style.fill);
    }

    #[test]
    fn test_parse_changes() {
        assert_eq!(
            TextStyleChange::parse("fontSize", "32").unwrap(),
            TextStyleChange::FontSize(32.0)
        );
        assert_eq!(
            TextStyleChange::parse("font-family", "Arial").unwrap(),
            TextStyleChange::FontFamily("Arial".to_string())
        );
        assert_eq!(
            TextStyleChange::parse("font_weight", "bold").unwrap(),
            TextStyleChange::FontWeight(FontWeight::Bold)
        );
        assert!(matches!(
            TextStyleChange::parse("fill", "red").unwrap(),
            TextStyleChange::Fill(_)
        ));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            TextStyleChange::parse("fontSize", "-3"),
            Err(StyleError::InvalidValue { .. })
        ));
        assert!(matches!(
            TextStyleChange::parse("underline", "yes"),
            Err(StyleError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_multiline_height() {
        let text = Text::new(Point::ZERO, "a\nb\n");
        assert_eq!(text.line_count(), 3);
        assert!(text.approximate_height() > text.font_size * 3.0);
    }
}
