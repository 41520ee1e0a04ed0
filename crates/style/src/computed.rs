//! The resolved style of one box, as reported by a box-model provider.
//!
//! Values are kept as the provider's strings and interpreted lazily through
//! typed accessors. Accessors never fail: a missing or unusable value reads
//! as the CSS initial value. Malformed values for known properties are
//! removed up front by [`ComputedStyle::sanitize`].

use crate::dimension::Dimension;
use crate::flex::FlexDirection;
use crate::flow::{Clear, Direction, Display, Float, Position, TextAlign, VerticalAlign, Visibility};
use crate::font::{FontStyle, FontWeight};
use crate::gradient::Gradient;
use crate::parsers::{
    StyleParseError, parse_dimension, parse_length, parse_linear_gradient, parse_normal_or_length,
    parse_vertical_align, run_parser,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use weft_types::{Color, Edges};

type Validator = fn(&str, &str) -> Result<(), StyleParseError>;

fn keyword<T>(parse: fn(&str) -> Result<T, String>) -> impl Fn(&str, &str) -> Result<(), StyleParseError> {
    move |property, value| {
        parse(value).map(|_| ()).map_err(|_| StyleParseError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        })
    }
}

fn check_display(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Display::parse)(p, v)
}
fn check_position(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Position::parse)(p, v)
}
fn check_float(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Float::parse)(p, v)
}
fn check_clear(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Clear::parse)(p, v)
}
fn check_text_align(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(TextAlign::parse)(p, v)
}
fn check_direction(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Direction::parse)(p, v)
}
fn check_visibility(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Visibility::parse)(p, v)
}
fn check_flex_direction(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(FlexDirection::parse)(p, v)
}
fn check_font_weight(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(FontWeight::parse)(p, v)
}
fn check_font_style(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(FontStyle::parse)(p, v)
}
fn check_color(p: &str, v: &str) -> Result<(), StyleParseError> {
    keyword(Color::parse)(p, v)
}
fn check_vertical_align(p: &str, v: &str) -> Result<(), StyleParseError> {
    run_parser(p, v, parse_vertical_align).map(|_| ())
}
fn check_dimension(p: &str, v: &str) -> Result<(), StyleParseError> {
    run_parser(p, v, parse_dimension).map(|_| ())
}
fn check_length(p: &str, v: &str) -> Result<(), StyleParseError> {
    run_parser(p, v, parse_length).map(|_| ())
}
fn check_line_height(p: &str, v: &str) -> Result<(), StyleParseError> {
    parse_normal_or_length(p, v).map(|_| ())
}
fn check_integer_or_auto(p: &str, v: &str) -> Result<(), StyleParseError> {
    if v.trim() == "auto" || v.trim().parse::<i32>().is_ok() {
        Ok(())
    } else {
        Err(StyleParseError::InvalidValue {
            property: p.to_string(),
            value: v.to_string(),
        })
    }
}
fn check_number(p: &str, v: &str) -> Result<(), StyleParseError> {
    v.trim()
        .parse::<f32>()
        .map(|_| ())
        .map_err(|_| StyleParseError::InvalidValue {
            property: p.to_string(),
            value: v.to_string(),
        })
}

/// Properties the converter interprets, with the check each value must pass.
const KNOWN_PROPERTIES: &[(&str, Validator)] = &[
    ("display", check_display),
    ("position", check_position),
    ("float", check_float),
    ("clear", check_clear),
    ("vertical-align", check_vertical_align),
    ("text-align", check_text_align),
    ("direction", check_direction),
    ("visibility", check_visibility),
    ("flex-direction", check_flex_direction),
    ("font-weight", check_font_weight),
    ("font-style", check_font_style),
    ("font-size", check_length),
    ("line-height", check_line_height),
    ("color", check_color),
    ("background-color", check_color),
    ("border-color", check_color),
    ("border-radius", check_length),
    ("width", check_dimension),
    ("height", check_dimension),
    ("top", check_dimension),
    ("left", check_dimension),
    ("z-index", check_integer_or_auto),
    ("column-count", check_integer_or_auto),
    ("opacity", check_number),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedStyle {
    properties: BTreeMap<String, String>,
}

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(properties: BTreeMap<String, String>) -> Self {
        let properties = properties
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        Self { properties }
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.properties.remove(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Drops every known property whose value does not parse and returns one
    /// error per dropped property. Unknown properties are left untouched.
    pub fn sanitize(&mut self) -> Vec<StyleParseError> {
        let mut errors = Vec::new();
        for (property, check) in KNOWN_PROPERTIES {
            let Some(value) = self.properties.get(*property) else {
                continue;
            };
            if let Err(e) = check(property, value) {
                errors.push(e);
                self.properties.remove(*property);
            }
        }
        errors
    }

    fn keyword_or_default<T: Default>(&self, property: &str, parse: fn(&str) -> Result<T, String>) -> T {
        self.get(property)
            .and_then(|v| parse(v).ok())
            .unwrap_or_default()
    }

    fn length(&self, property: &str) -> Option<f32> {
        self.get(property)
            .and_then(|v| run_parser(property, v, parse_length).ok())
    }

    fn dimension(&self, property: &str) -> Dimension {
        self.get(property)
            .and_then(|v| run_parser(property, v, parse_dimension).ok())
            .unwrap_or_default()
    }

    // --- Flow ---

    pub fn display(&self) -> Display {
        self.keyword_or_default("display", Display::parse)
    }

    pub fn position(&self) -> Position {
        self.keyword_or_default("position", Position::parse)
    }

    pub fn float(&self) -> Float {
        self.keyword_or_default("float", Float::parse)
    }

    pub fn clear(&self) -> Clear {
        self.keyword_or_default("clear", Clear::parse)
    }

    pub fn vertical_align(&self) -> VerticalAlign {
        self.get("vertical-align")
            .and_then(|v| run_parser("vertical-align", v, parse_vertical_align).ok())
            .unwrap_or_default()
    }

    pub fn text_align(&self) -> TextAlign {
        self.keyword_or_default("text-align", TextAlign::parse)
    }

    pub fn direction(&self) -> Direction {
        self.keyword_or_default("direction", Direction::parse)
    }

    pub fn visibility(&self) -> Visibility {
        self.keyword_or_default("visibility", Visibility::parse)
    }

    pub fn flex_direction(&self) -> FlexDirection {
        self.keyword_or_default("flex-direction", FlexDirection::parse)
    }

    pub fn width(&self) -> Dimension {
        self.dimension("width")
    }

    pub fn height(&self) -> Dimension {
        self.dimension("height")
    }

    pub fn top(&self) -> Dimension {
        self.dimension("top")
    }

    /// Stacking index; `auto` and missing values read as 0.
    pub fn z_index(&self) -> i32 {
        self.get("z-index")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Requested column count; `auto` reads as 1.
    pub fn column_count(&self) -> u32 {
        self.get("column-count")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    pub fn margin(&self) -> Option<Edges> {
        self.box_edges("margin")
    }

    fn box_edges(&self, prefix: &str) -> Option<Edges> {
        let side = |s: &str| self.length(&format!("{}-{}", prefix, s));
        let (t, r, b, l) = (side("top"), side("right"), side("bottom"), side("left"));
        if t.is_none() && r.is_none() && b.is_none() && l.is_none() {
            return None;
        }
        Some(Edges::new(
            t.unwrap_or(0.0),
            r.unwrap_or(0.0),
            b.unwrap_or(0.0),
            l.unwrap_or(0.0),
        ))
    }

    // --- Text ---

    pub fn font_family(&self) -> Option<&str> {
        self.get("font-family")
            .and_then(|v| v.split(',').next())
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|f| !f.is_empty())
    }

    pub fn font_size(&self) -> Option<f32> {
        self.length("font-size")
    }

    pub fn font_weight(&self) -> FontWeight {
        self.keyword_or_default("font-weight", FontWeight::parse)
    }

    pub fn font_style(&self) -> FontStyle {
        self.keyword_or_default("font-style", FontStyle::parse)
    }

    /// Effective line height in px. `normal` resolves to 1.2 times the font size.
    pub fn line_height(&self) -> f32 {
        let explicit = self
            .get("line-height")
            .and_then(|v| parse_normal_or_length("line-height", v).ok())
            .flatten();
        explicit.unwrap_or_else(|| self.font_size().unwrap_or(16.0) * 1.2)
    }

    // --- Paint ---

    pub fn opacity(&self) -> f32 {
        self.get("opacity")
            .and_then(|v| v.parse::<f32>().ok())
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }

    pub fn color(&self) -> Option<Color> {
        self.get("color").and_then(|v| Color::parse(v).ok())
    }

    /// Background color, `None` when absent or fully transparent.
    pub fn background_color(&self) -> Option<Color> {
        self.get("background-color")
            .and_then(|v| Color::parse(v).ok())
            .filter(|c| !c.is_transparent())
    }

    pub fn background_gradient(&self) -> Option<Gradient> {
        self.get("background-image")
            .and_then(|v| run_parser("background-image", v, parse_linear_gradient).ok())
    }

    /// The `url(...)` target of `background-image`, unquoted.
    pub fn background_image_url(&self) -> Option<String> {
        let value = self.get("background-image")?.trim();
        let inner = value.strip_prefix("url(")?.strip_suffix(')')?;
        let inner = inner.trim().trim_matches(|c| c == '"' || c == '\'');
        (!inner.is_empty()).then(|| inner.to_string())
    }

    pub fn border_color(&self) -> Option<Color> {
        self.get("border-color")
            .and_then(|v| Color::parse(v).ok())
            .filter(|c| !c.is_transparent())
    }

    pub fn border_radius(&self) -> f32 {
        self.length("border-radius").unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(pairs: &[(&str, &str)]) -> ComputedStyle {
        ComputedStyle::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_when_missing() {
        let s = ComputedStyle::new();
        assert_eq!(s.display(), Display::Inline);
        assert_eq!(s.position(), Position::Static);
        assert_eq!(s.z_index(), 0);
        assert_eq!(s.column_count(), 1);
        assert!(s.width().is_auto());
        assert_eq!(s.opacity(), 1.0);
    }

    #[test]
    fn test_typed_accessors() {
        let s = style(&[
            ("display", "block"),
            ("float", "left"),
            ("width", "50%"),
            ("font-family", "\"Open Sans\", sans-serif"),
            ("font-size", "12pt"),
            ("z-index", "3"),
            ("background-color", "rgba(0, 0, 0, 0)"),
        ]);
        assert_eq!(s.display(), Display::Block);
        assert_eq!(s.float(), Float::Left);
        assert_eq!(s.width(), Dimension::Percent(50.0));
        assert_eq!(s.font_family(), Some("Open Sans"));
        assert_eq!(s.font_size(), Some(16.0));
        assert_eq!(s.z_index(), 3);
        assert!(s.background_color().is_none());
    }

    #[test]
    fn test_line_height_normal_follows_font_size() {
        let s = style(&[("font-size", "10px"), ("line-height", "normal")]);
        assert!((s.line_height() - 12.0).abs() < 0.001);
        let s = style(&[("line-height", "30px")]);
        assert_eq!(s.line_height(), 30.0);
    }

    #[test]
    fn test_background_image_variants() {
        let s = style(&[("background-image", "url(\"img/logo.png\")")]);
        assert_eq!(s.background_image_url().as_deref(), Some("img/logo.png"));
        assert!(s.background_gradient().is_none());

        let s = style(&[("background-image", "linear-gradient(red, blue)")]);
        assert!(s.background_gradient().is_some());
        assert!(s.background_image_url().is_none());
    }

    #[test]
    fn test_sanitize_drops_only_malformed_known_properties() {
        let mut s = style(&[
            ("display", "blocky"),
            ("width", "wide"),
            ("color", "#FF0000"),
            ("-webkit-unknown", "whatever"),
        ]);
        let errors = s.sanitize();
        assert_eq!(errors.len(), 2);
        assert!(s.get("display").is_none());
        assert!(s.get("width").is_none());
        assert_eq!(s.get("color"), Some("#FF0000"));
        assert_eq!(s.get("-webkit-unknown"), Some("whatever"));
    }

    #[test]
    fn test_margin_edges() {
        let s = style(&[("margin-top", "4px"), ("margin-left", "-2px")]);
        assert_eq!(s.margin(), Some(Edges::new(4.0, 0.0, 0.0, -2.0)));
        assert!(ComputedStyle::new().margin().is_none());
    }
}
