/*! Typed property values read from live nodes, windows and scenes. */

use super::{Bounds, Insets};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// RGBA color with components in the 0.0-1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Color {
  pub r: f64,
  pub g: f64,
  pub b: f64,
  pub a: f64,
}

impl Color {
  pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
  pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
  pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

  pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
    Self { r, g, b, a }
  }

  /// Create an opaque color (alpha = 1.0).
  pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
    Self { r, g, b, a: 1.0 }
  }
}

impl std::fmt::Display for Color {
  #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Components are clamped to 0.0-1.0
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    write!(
      f,
      "rgba({}, {}, {}, {})",
      channel(self.r),
      channel(self.g),
      channel(self.b),
      self.a
    )
  }
}

/// Font description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Font {
  pub family: String,
  pub style: String,
  pub size: f64,
}

impl Font {
  pub const DEFAULT_SIZE: f64 = 13.0;

  pub fn system(size: f64) -> Self {
    Self {
      family: "System".into(),
      style: "Regular".into(),
      size,
    }
  }
}

impl Default for Font {
  fn default() -> Self {
    Self::system(Self::DEFAULT_SIZE)
  }
}

/// Reference to a loaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImageRef {
  pub url: Option<String>,
  pub width: f64,
  pub height: f64,
}

/// Value of a named property.
///
/// Closed over the value shapes the attribute model knows how to display.
/// Anything else is reported as `Object` with its string rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "value")]
#[ts(export)]
pub enum PropValue {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  /// Enumeration constant with its full domain.
  Enum { value: String, domain: Vec<String> },
  Color(Color),
  Image(ImageRef),
  Insets(Insets),
  Bounds(Bounds),
  Font(Font),
  /// Background fills.
  Background(Vec<Color>),
  /// Border strokes and widths.
  Border { strokes: Vec<Color>, widths: Insets },
  /// Observable list rendered item by item.
  List(Vec<String>),
  /// Opaque value, already rendered to a string.
  Object(String),
}

impl PropValue {
  /// Enumeration constant drawn from `domain`.
  pub fn enumeration(value: &str, domain: &[&str]) -> Self {
    Self::Enum {
      value: value.to_owned(),
      domain: domain.iter().map(|s| (*s).to_owned()).collect(),
    }
  }

  pub fn text(value: impl Into<String>) -> Self {
    Self::Text(value.into())
  }

  pub fn list<S: AsRef<str>>(items: &[S]) -> Self {
    Self::List(items.iter().map(|s| s.as_ref().to_owned()).collect())
  }

  pub const fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  pub const fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  /// Numeric value, widening integers.
  #[allow(clippy::cast_precision_loss)]
  pub const fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Float(f) => Some(*f),
      Self::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) | Self::Object(s) => Some(s),
      Self::Enum { value, .. } => Some(value),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[String]> {
    match self {
      Self::List(items) => Some(items),
      _ => None,
    }
  }

  pub const fn as_insets(&self) -> Option<Insets> {
    match self {
      Self::Insets(i) => Some(*i),
      _ => None,
    }
  }

  pub const fn as_color(&self) -> Option<Color> {
    match self {
      Self::Color(c) => Some(*c),
      _ => None,
    }
  }

  pub fn as_font(&self) -> Option<&Font> {
    match self {
      Self::Font(f) => Some(f),
      _ => None,
    }
  }

  /// Enumeration constant name, if this is an enumeration.
  pub fn enum_value(&self) -> Option<&str> {
    match self {
      Self::Enum { value, .. } => Some(value),
      _ => None,
    }
  }
}

impl std::fmt::Display for PropValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Null => f.write_str("null"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Int(i) => write!(f, "{i}"),
      Self::Float(v) => write!(f, "{v}"),
      Self::Text(s) | Self::Object(s) => f.write_str(s),
      Self::Enum { value, .. } => f.write_str(value),
      Self::Color(c) => write!(f, "{c}"),
      Self::Image(img) => match &img.url {
        Some(url) => write!(f, "Image[url={url}, {}x{}]", img.width, img.height),
        None => write!(f, "Image[{}x{}]", img.width, img.height),
      },
      Self::Insets(i) => write!(f, "Insets {i}"),
      Self::Bounds(b) => write!(f, "Bounds [x={}, y={}, width={}, height={}]", b.x, b.y, b.w, b.h),
      Self::Font(font) => write!(f, "Font[name={}, style={}, size={}]", font.family, font.style, font.size),
      Self::Background(fills) => {
        let fills: Vec<String> = fills.iter().map(ToString::to_string).collect();
        write!(f, "Background[fills=[{}]]", fills.join(", "))
      }
      Self::Border { strokes, widths } => {
        let strokes: Vec<String> = strokes.iter().map(ToString::to_string).collect();
        write!(f, "Border[strokes=[{}], widths={widths}]", strokes.join(", "))
      }
      Self::List(items) => write!(f, "[{}]", items.join(", ")),
    }
  }
}

impl From<bool> for PropValue {
  fn from(v: bool) -> Self {
    Self::Bool(v)
  }
}

impl From<f64> for PropValue {
  fn from(v: f64) -> Self {
    Self::Float(v)
  }
}

impl From<i64> for PropValue {
  fn from(v: i64) -> Self {
    Self::Int(v)
  }
}

impl From<&str> for PropValue {
  fn from(v: &str) -> Self {
    Self::Text(v.to_owned())
  }
}

impl From<String> for PropValue {
  fn from(v: String) -> Self {
    Self::Text(v)
  }
}

impl From<Color> for PropValue {
  fn from(v: Color) -> Self {
    Self::Color(v)
  }
}

impl From<Insets> for PropValue {
  fn from(v: Insets) -> Self {
    Self::Insets(v)
  }
}

impl From<Font> for PropValue {
  fn from(v: Font) -> Self {
    Self::Font(v)
  }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
  fn from(v: Option<T>) -> Self {
    v.map_or(Self::Null, Into::into)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn color_renders_as_css_rgba() {
    assert_eq!(Color::rgb(1.0, 0.0, 0.5).to_string(), "rgba(255, 0, 128, 1)");
  }

  #[test]
  fn numeric_accessor_widens_ints() {
    assert_eq!(PropValue::Int(4).as_f64(), Some(4.0));
    assert_eq!(PropValue::Float(0.5).as_f64(), Some(0.5));
    assert_eq!(PropValue::text("x").as_f64(), None);
  }

  #[test]
  fn option_none_becomes_null() {
    let v: PropValue = Option::<f64>::None.into();
    assert!(v.is_null());
  }

  #[test]
  fn serializes_tagged() {
    let json = serde_json::to_value(PropValue::enumeration("LEFT", &["LEFT", "RIGHT"])).unwrap();
    assert_eq!(json["type"], "Enum");
    assert_eq!(json["value"]["value"], "LEFT");
  }
}
