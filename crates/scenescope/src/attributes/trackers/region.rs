//! Region and control attributes.

use super::parent::stylesheets;
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::platform::{Archetypes, Toolkit};
use crate::types::{Attribute, DisplayHint, Target};

pub const REGION_PROPERTIES: &[&str] = &[
  "padding",
  "insets",
  "snapToPixel",
  "shape",
  "scaleShape",
  "centerShape",
  "userAgentStylesheet",
  "minWidth",
  "minHeight",
  "prefWidth",
  "prefHeight",
  "maxWidth",
  "maxHeight",
];

pub const CONTROL_PROPERTIES: &[&str] = &[
  "skin",
  "minWidth",
  "minHeight",
  "prefWidth",
  "prefHeight",
  "maxWidth",
  "maxHeight",
  "stylesheets",
  "userAgentStylesheet",
];

const SIZES: &[&str] = &["minWidth", "minHeight", "prefWidth", "prefHeight", "maxWidth", "maxHeight"];

pub(crate) fn has_archetype(host: &dyn Toolkit, target: Target, archetype: Archetypes) -> bool {
  target
    .node()
    .is_some_and(|node| host.archetypes(node).contains(archetype))
}

pub(crate) fn names(list: &[&str]) -> Vec<String> {
  list.iter().map(|name| (*name).to_owned()).collect()
}

pub(crate) struct RegionReader;

impl AttributeReader for RegionReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::REGION)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(REGION_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "padding" => r.insets(name).css(),
      "insets" => r.insets(name),
      "snapToPixel" | "scaleShape" => r.boolean(name, true).css(),
      "centerShape" => r.boolean(name, true).css_as("-fx-position-shape"),
      "shape" => r.object(name, DisplayHint::Text).css(),
      "userAgentStylesheet" => r.object(name, DisplayHint::Text),
      size if SIZES.contains(&size) => r.size(size).css(),
      _ => None,
    }
  }
}

pub(crate) struct ControlReader;

impl AttributeReader for ControlReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::CONTROL)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(CONTROL_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "skin" => r.auto(name, DisplayHint::Text).css(),
      "stylesheets" => stylesheets(r),
      "userAgentStylesheet" => r.object(name, DisplayHint::Text),
      size if SIZES.contains(&size) => r.size(size),
      _ => None,
    }
  }
}
