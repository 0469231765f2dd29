//! Attributes of controls that display text and a graphic.

use super::region::{has_archetype, names};
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::platform::{Archetypes, Toolkit};
use crate::types::{Attribute, Color, DisplayHint, Target};

pub const LABELED_PROPERTIES: &[&str] = &[
  "text",
  "font",
  "textFill",
  "graphic",
  "graphicTextGap",
  "labelPadding",
  "contentDisplay",
  "alignment",
  "textAlignment",
  "textOverrun",
  "wrapText",
  "underline",
  "ellipsisString",
];

pub(crate) struct LabeledReader;

impl AttributeReader for LabeledReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::LABELED)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(LABELED_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "text" => r.text(name),
      "font" => r.object(name, DisplayHint::Font).css(),
      "textFill" => r.color(name, Color::BLACK).css(),
      "graphic" => r.object(name, DisplayHint::Text).css(),
      "graphicTextGap" => r.number(name, 4.0).css(),
      "labelPadding" => r.insets(name).css(),
      "contentDisplay" => r.choice(name, "LEFT").css(),
      "alignment" => r.choice(name, "CENTER_LEFT").css(),
      "textAlignment" => r.choice(name, "LEFT").css(),
      "textOverrun" => r.choice(name, "ELLIPSIS").css(),
      "wrapText" | "underline" => r.boolean(name, false).css(),
      "ellipsisString" => r.text_or(name, "...").css(),
      _ => None,
    }
  }
}
