//! Window and scene attributes.
//!
//! Both readers accept windows. The scene reader observes the scene the
//! window displays, so the two never compete for the same target.

use super::node::user_data;
use super::region::names;
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::attributes::trackers::reflective;
use crate::platform::{Channel, Toolkit};
use crate::types::{Attribute, ObservableType, PropValue, Target};

pub const WINDOW_PROPERTIES: &[&str] = &[
  "width",
  "height",
  "x",
  "y",
  "opacity",
  "focused",
  "showing",
  "outputScaleX",
  "outputScaleY",
  "renderScaleX",
  "renderScaleY",
  "forceIntegerRenderScale",
  "userData",
];

/// Scene attributes that are not discovered from observable accessors.
pub const SCENE_PROPERTIES: &[&str] = &["stylesheets", "userData"];

pub(crate) struct WindowReader;

impl AttributeReader for WindowReader {
  fn accepts(&self, _host: &dyn Toolkit, target: Target) -> bool {
    matches!(target, Target::Window(_))
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(WINDOW_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "width" | "height" | "x" | "y" => r.number_auto(name),
      "opacity" => r
        .number(name, 1.0)
        .valid(vec![PropValue::Float(0.0), PropValue::Float(1.0)]),
      "focused" | "showing" | "forceIntegerRenderScale" => r.boolean(name, false),
      "outputScaleX" | "outputScaleY" | "renderScaleX" | "renderScaleY" => r.number(name, 1.0),
      "userData" => user_data(r),
      _ => None,
    }
  }
}

pub(crate) struct SceneReader;

impl AttributeReader for SceneReader {
  fn accepts(&self, _host: &dyn Toolkit, target: Target) -> bool {
    matches!(target, Target::Window(_) | Target::Scene(_))
  }

  fn resolve_target(&self, target: Target) -> Target {
    match target {
      Target::Window(id) => Target::Scene(id),
      other => other,
    }
  }

  /// Discovered properties plus the fixed ones, sorted by name.
  fn supported(&self, r: &Reading<'_>) -> Vec<String> {
    let mut all: Vec<String> = r.properties.properties().keys().cloned().collect();
    all.extend(names(SCENE_PROPERTIES));
    all.sort();
    all.dedup();
    all
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "stylesheets" => r.list(name, "\n", ObservableType::List),
      "userData" => user_data(r),
      _ => reflective::read_discovered(r, name, false),
    }
  }

  fn extra_watched(&self) -> Vec<(Channel, &'static [&'static str])> {
    vec![(Channel::Property("stylesheets".into()), &["stylesheets"])]
  }
}

