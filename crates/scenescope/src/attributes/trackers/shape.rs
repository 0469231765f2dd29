//! Shape and text node attributes.

use super::region::{has_archetype, names};
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::platform::{Archetypes, Toolkit};
use crate::types::{Attribute, Color, DisplayHint, PropValue, Target, ValueState};

pub const SHAPE_PROPERTIES: &[&str] = &[
  "fill",
  "smooth",
  "stroke",
  "strokeType",
  "strokeWidth",
  "strokeDashArray",
  "strokeDashOffset",
  "strokeLineCap",
  "strokeLineJoin",
  "strokeMiterLimit",
];

pub const TEXT_PROPERTIES: &[&str] = &[
  "text",
  "font",
  "textOrigin",
  "x",
  "y",
  "textAlignment",
  "boundsType",
  "tabSize",
  "lineSpacing",
  "wrappingWidth",
  "underline",
  "strikethrough",
  "fontSmoothingType",
];

pub(crate) struct ShapeReader;

impl AttributeReader for ShapeReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::SHAPE)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(SHAPE_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "fill" => {
        if r.value(name).is_null() {
          log::warn!("Shape {} has no fill", r.target);
        }
        r.color(name, Color::BLACK).css()
      }
      "smooth" => r.boolean(name, true).css(),
      "stroke" => stroke(r).css(),
      "strokeType" => r.choice(name, "CENTERED").css(),
      "strokeWidth" => r.number(name, 1.0).css(),
      "strokeDashArray" => r
        .attribute(name, DisplayHint::Object, |v| {
          ValueState::default_if(v.as_list().map_or(true, <[String]>::is_empty))
        })
        .css(),
      "strokeDashOffset" => r.number(name, 0.0).css(),
      "strokeLineCap" => r.choice(name, "SQUARE").css(),
      "strokeLineJoin" => r.choice(name, "MITER").css(),
      "strokeMiterLimit" => r.number(name, 10.0).css(),
      _ => None,
    }
  }
}

/// Unset strokes are default. So is a black stroke on an open shape whose
/// fill is still black.
fn stroke(r: &Reading<'_>) -> Option<Attribute> {
  let open = has_archetype(r.host, r.target, Archetypes::OPEN_SHAPE);
  let black_fill = r.value("fill").as_color() == Some(Color::BLACK);
  r.attribute("stroke", DisplayHint::Color, |v| {
    ValueState::default_if(v.is_null() || (open && black_fill))
  })
}

pub(crate) struct TextReader;

impl AttributeReader for TextReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::TEXT)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(TEXT_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "text" => r.attribute(name, DisplayHint::Text, |v| ValueState::default_if(v.is_null())),
      "font" => r.object(name, DisplayHint::Font).css(),
      "textOrigin" => r.choice(name, "BASELINE").css(),
      "x" | "y" | "wrappingWidth" => r.number(name, 0.0),
      "textAlignment" => r.choice(name, "LEFT").css(),
      "boundsType" => r.choice(name, "LOGICAL").css(),
      "tabSize" => r
        .attribute(name, DisplayHint::Numeric, |v| ValueState::default_if(*v == PropValue::Int(8)))
        .css(),
      "lineSpacing" => r.number(name, 0.0).css(),
      "underline" | "strikethrough" => r.boolean(name, false).css(),
      "fontSmoothingType" => r.choice(name, "GRAY").css(),
      _ => None,
    }
  }
}
