//! Attributes discovered from a target's observable accessors.
//!
//! Works for any target. Nothing is known about defaults, so every value is
//! reported as [`ValueState::Auto`].

use crate::attributes::tracker::{css_name, AttributeReader, Reading};
use crate::platform::{Toolkit, PROPERTY_SUFFIX};
use crate::types::{Attribute, DisplayHint, PropValue, Target, ValueState};

pub(crate) struct ReflectiveReader;

impl AttributeReader for ReflectiveReader {
  fn accepts(&self, _host: &dyn Toolkit, _target: Target) -> bool {
    true
  }

  fn supported(&self, r: &Reading<'_>) -> Vec<String> {
    r.properties.properties().keys().cloned().collect()
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    read_discovered(r, name, true)
  }
}

/// Read a discovered property, classifying the display hint by value shape.
///
/// With `styled`, properties the style engine knows get their css name.
pub(crate) fn read_discovered(r: &Reading<'_>, name: &str, styled: bool) -> Option<Attribute> {
  let observable = r.properties.get(name)?;
  let value = r.value(name);
  let (value, hint, valid) = classify(value);

  let mut attr = Attribute::new(name, value, observable.kind, hint, ValueState::Auto)
    .with_field(format!("{name}{PROPERTY_SUFFIX}"))
    .with_valid_values(valid);
  if styled && is_styleable(r, name) {
    attr = attr.with_css(css_name(name));
  }
  Some(attr)
}

fn classify(value: PropValue) -> (PropValue, DisplayHint, Vec<PropValue>) {
  match value {
    PropValue::Bool(_) => (value, DisplayHint::Boolean, Vec::new()),
    PropValue::Int(_) | PropValue::Float(_) => (value, DisplayHint::Numeric, Vec::new()),
    PropValue::Text(_) => (value, DisplayHint::Text, Vec::new()),
    PropValue::Enum { ref domain, .. } => {
      let valid = domain.iter().map(|d| PropValue::Text(d.clone())).collect();
      (value, DisplayHint::Enum, valid)
    }
    PropValue::Color(_) => (value, DisplayHint::Color, Vec::new()),
    PropValue::Image(_) => (value, DisplayHint::Image, Vec::new()),
    PropValue::Background(_) => (value, DisplayHint::Background, Vec::new()),
    PropValue::Border { .. } => (value, DisplayHint::Border, Vec::new()),
    other => (PropValue::Text(other.to_string()), DisplayHint::Object, Vec::new()),
  }
}

fn is_styleable(r: &Reading<'_>, name: &str) -> bool {
  r.host
    .type_info(r.target)
    .is_ok_and(|info| info.is_styleable(name))
}
