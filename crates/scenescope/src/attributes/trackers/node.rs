//! Attributes every node has.

use super::parent::stylesheets;
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::platform::{Archetypes, Channel, Orientation, Toolkit, BASELINE_OFFSET_SAME_AS_HEIGHT};
use crate::types::{Attribute, DisplayHint, NodeId, ObservableType, PropValue, Target, ValueState};

pub const NODE_PROPERTIES: &[&str] = &[
  "className",
  "pseudoClass",
  "styleClass",
  "stylesheets",
  "managed",
  "visible",
  "focusVisible",
  "focusWithin",
  "resizable",
  "layoutBounds",
  "boundsInParent",
  "baselineOffset",
  "layoutConstraints",
  "opacity",
  "viewOrder",
  "blendMode",
  "cursor",
  "effect",
  "clip",
  "rotate",
  "transforms",
  "layoutX",
  "layoutY",
  "scaleX",
  "scaleY",
  "scaleZ",
  "translateX",
  "translateY",
  "translateZ",
  "contentBias",
  "minWidth",
  "minHeight",
  "prefWidth",
  "prefHeight",
  "maxWidth",
  "maxHeight",
  "userAgentStylesheet",
  "userData",
];

/// Only sub-scenes carry their own user agent stylesheet.
const SUB_SCENE_PROPERTIES: &[&str] = &["userAgentStylesheet"];

pub(crate) const BLEND_MODES: &[&str] = &[
  "SRC_OVER",
  "SRC_ATOP",
  "ADD",
  "MULTIPLY",
  "SCREEN",
  "OVERLAY",
  "DARKEN",
  "LIGHTEN",
  "COLOR_DODGE",
  "COLOR_BURN",
  "HARD_LIGHT",
  "SOFT_LIGHT",
  "DIFFERENCE",
  "EXCLUSION",
  "RED",
  "GREEN",
  "BLUE",
];

pub(crate) struct NodeReader;

impl AttributeReader for NodeReader {
  fn accepts(&self, _host: &dyn Toolkit, target: Target) -> bool {
    target.node().is_some()
  }

  fn supported(&self, r: &Reading<'_>) -> Vec<String> {
    let sub_scene = is(r, Archetypes::SUB_SCENE);
    NODE_PROPERTIES
      .iter()
      .filter(|name| sub_scene || !SUB_SCENE_PROPERTIES.contains(name))
      .map(|name| (*name).to_owned())
      .collect()
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    let node = r.target.node()?;
    match name {
      "className" => {
        let type_info = r.host.type_info(r.target).ok()?;
        Some(r.computed(name, PropValue::Text(type_info.name.clone()), DisplayHint::Text))
      }
      "pseudoClass" => r.list_from(name, "pseudoClassStates", " ", ObservableType::Set, DisplayHint::Text),
      "styleClass" => r.list_from(name, "styleClass", " ", ObservableType::List, DisplayHint::Text),
      "stylesheets" => stylesheets(r),
      "managed" => r.boolean(name, true).css(),
      "visible" => r.boolean(name, true).css_as("visibility"),
      "focusVisible" | "focusWithin" => r.boolean(name, false),
      "resizable" => Some(r.computed(
        name,
        PropValue::Bool(is(r, Archetypes::REGION)),
        DisplayHint::Boolean,
      )),
      "layoutBounds" | "boundsInParent" => r.auto(name, DisplayHint::Bounds),
      "baselineOffset" => {
        let offset = r.host.baseline_offset(node).unwrap_or(BASELINE_OFFSET_SAME_AS_HEIGHT);
        Some(r.computed(name, PropValue::Float(offset), DisplayHint::Numeric))
      }
      "layoutConstraints" => Some(layout_constraints(r, node)),
      "opacity" => r
        .number(name, 1.0)
        .css()
        .valid(vec![PropValue::Float(0.0), PropValue::Float(1.0)]),
      "viewOrder" | "rotate" | "translateX" | "translateY" | "translateZ" => r.number(name, 0.0).css(),
      "scaleX" | "scaleY" | "scaleZ" => r.number(name, 1.0).css(),
      "layoutX" | "layoutY" => r.number_auto(name),
      "blendMode" => r.choice_in(name, BLEND_MODES).css(),
      "cursor" => r.object(name, DisplayHint::Text).css(),
      "effect" => r.object(name, DisplayHint::Effect).css(),
      "clip" => r.object(name, DisplayHint::Clip),
      "transforms" => r.items(name, DisplayHint::Transforms),
      "contentBias" => Some(content_bias(r, node)),
      "minWidth" | "minHeight" | "prefWidth" | "prefHeight" | "maxWidth" | "maxHeight" => {
        let sizes = r.host.computed_sizes(node).ok()?;
        let value = match name {
          "minWidth" => sizes.min.width,
          "minHeight" => sizes.min.height,
          "prefWidth" => sizes.pref.width,
          "prefHeight" => sizes.pref.height,
          "maxWidth" => sizes.max.width,
          _ => sizes.max.height,
        };
        Some(r.computed(name, PropValue::Float(value), DisplayHint::Numeric))
      }
      "userAgentStylesheet" if is(r, Archetypes::SUB_SCENE) => r.object(name, DisplayHint::Text),
      "userData" => user_data(r),
      _ => None,
    }
  }

  fn extra_watched(&self) -> Vec<(Channel, &'static [&'static str])> {
    vec![
      (Channel::Property("transforms".into()), &["transforms"]),
      (Channel::Property("stylesheets".into()), &["stylesheets"]),
      (Channel::StyleClass, &["styleClass"]),
      (Channel::Property("pseudoClassStates".into()), &["pseudoClass"]),
    ]
  }
}

fn is(r: &Reading<'_>, archetype: Archetypes) -> bool {
  r.target
    .node()
    .is_some_and(|node| r.host.archetypes(node).contains(archetype))
}

/// Constraints the layout parent stored on the node, as a JSON object.
fn layout_constraints(r: &Reading<'_>, node: NodeId) -> Attribute {
  let constraints: serde_json::Map<String, serde_json::Value> = r
    .host
    .layout_constraints(node)
    .into_iter()
    .map(|(key, value)| (key, serde_json::Value::String(value)))
    .collect();
  r.computed(
    "layoutConstraints",
    PropValue::Object(serde_json::Value::Object(constraints).to_string()),
    DisplayHint::Properties,
  )
}

/// Default iff width and height are independent.
fn content_bias(r: &Reading<'_>, node: NodeId) -> Attribute {
  let bias = r.host.content_bias(node);
  let value = bias.map_or(PropValue::Null, |o| {
    PropValue::enumeration(&o.to_string(), &Orientation::NAMES)
  });
  Attribute::new(
    "contentBias",
    value,
    ObservableType::NotObservable,
    DisplayHint::Enum,
    ValueState::default_if(bias.is_none()),
  )
  .with_valid_values(Orientation::NAMES.iter().map(|n| PropValue::text(*n)).collect())
}

/// User data rendered as text. Default iff unset.
pub(crate) fn user_data(r: &Reading<'_>) -> Option<Attribute> {
  let value = r.host.property(r.target, "userData")?.value;
  let state = ValueState::default_if(value.is_null());
  Some(
    Attribute::new(
      "userData",
      PropValue::Text(value.to_string()),
      ObservableType::NotObservable,
      DisplayHint::Text,
      state,
    )
    .with_field("userData"),
  )
}
