//! Image view attributes.

use super::region::{has_archetype, names};
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::platform::{Archetypes, Toolkit};
use crate::types::{Attribute, DisplayHint, PropValue, Target};

pub const IMAGE_VIEW_PROPERTIES: &[&str] = &["fitWidth", "fitHeight", "image", "preserveRatio", "smooth"];

pub(crate) struct ImageViewReader;

impl AttributeReader for ImageViewReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::IMAGE_VIEW)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(IMAGE_VIEW_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "fitWidth" | "fitHeight" => r.number(name, 0.0).css(),
      "image" => image(r).css(),
      "preserveRatio" => r.boolean(name, false).css(),
      // Platform dependent
      "smooth" => r.auto(name, DisplayHint::Boolean).css(),
      _ => None,
    }
  }
}

/// The image is shown by its URL when it has one.
fn image(r: &Reading<'_>) -> Option<Attribute> {
  let mut attr = r.object("image", DisplayHint::Text)?;
  attr.value = match &attr.value {
    PropValue::Image(image) => match &image.url {
      Some(url) => PropValue::Text(url.clone()),
      None => PropValue::Text(attr.value.to_string()),
    },
    other => other.clone(),
  };
  Some(attr)
}
