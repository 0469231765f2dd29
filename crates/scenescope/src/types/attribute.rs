/*! Attribute snapshots and their classification. */

use super::PropValue;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use ts_rs::TS;

/// How the backing property can be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ObservableType {
  ReadWrite,
  ReadOnly,
  /// Read-write property currently bound to another value.
  Bound,
  List,
  Set,
  NotObservable,
}

/// How a consumer should render the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DisplayHint {
  Background,
  Boolean,
  Border,
  Bounds,
  Clip,
  Color,
  ColumnConstraints,
  Effect,
  Enum,
  Font,
  Image,
  Insets,
  Numeric,
  Object,
  Properties,
  RowConstraints,
  Text,
  Transforms,
}

/// Whether the current value is the archetype default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ValueState {
  Default,
  Changed,
  /// No default can be inferred.
  Auto,
}

impl ValueState {
  pub const fn default_if(is_default: bool) -> Self {
    if is_default {
      Self::Default
    } else {
      Self::Changed
    }
  }
}

/// Closed set of attribute categories, one per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AttributeCategory {
  Control,
  GridPane,
  Labeled,
  ImageView,
  Node,
  Parent,
  Reflective,
  Region,
  Scene,
  Shape,
  Text,
  Window,
}

impl AttributeCategory {
  pub const ALL: [Self; 12] = [
    Self::Control,
    Self::GridPane,
    Self::Labeled,
    Self::ImageView,
    Self::Node,
    Self::Parent,
    Self::Reflective,
    Self::Region,
    Self::Scene,
    Self::Shape,
    Self::Text,
    Self::Window,
  ];
}

impl std::fmt::Display for AttributeCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::Control => "CONTROL",
      Self::GridPane => "GRID_PANE",
      Self::Labeled => "LABELED",
      Self::ImageView => "IMAGE_VIEW",
      Self::Node => "NODE",
      Self::Parent => "PARENT",
      Self::Reflective => "REFLECTIVE",
      Self::Region => "REGION",
      Self::Scene => "SCENE",
      Self::Shape => "SHAPE",
      Self::Text => "TEXT",
      Self::Window => "WINDOW",
    };
    f.write_str(name)
  }
}

/// Immutable snapshot of one named attribute.
///
/// Equality and hashing use the name only, so a list of attributes can be
/// updated in place by name.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Attribute {
  pub name: String,
  pub value: PropValue,
  /// Backing field identifier, when it differs from the name.
  pub field: Option<String>,
  /// Style-engine property name.
  pub css_property: Option<String>,
  pub observable_type: ObservableType,
  pub display_hint: DisplayHint,
  pub value_state: ValueState,
  pub valid_values: Vec<PropValue>,
}

impl Attribute {
  /// Attribute with no field, no css name and no value domain.
  pub fn new(
    name: impl Into<String>,
    value: PropValue,
    observable_type: ObservableType,
    display_hint: DisplayHint,
    value_state: ValueState,
  ) -> Self {
    Self {
      name: name.into(),
      value,
      field: None,
      css_property: None,
      observable_type,
      display_hint,
      value_state,
      valid_values: Vec::new(),
    }
  }

  #[must_use]
  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }

  #[must_use]
  pub fn with_css(mut self, css_property: impl Into<String>) -> Self {
    self.css_property = Some(css_property.into());
    self
  }

  #[must_use]
  pub fn with_valid_values(mut self, values: Vec<PropValue>) -> Self {
    self.valid_values = values;
    self
  }

  pub fn to_log_string(&self) -> String {
    format!(
      "{}={} ({:?}, {:?})",
      self.name, self.value, self.observable_type, self.value_state
    )
  }
}

impl PartialEq for Attribute {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for Attribute {}

impl Hash for Attribute {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}
