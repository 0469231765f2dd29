//! Attributes of nodes with a child list.

use crate::attributes::tracker::{AttributeReader, Reading};
use crate::core::tree;
use crate::platform::{Archetypes, Channel, Toolkit};
use crate::types::{Attribute, DisplayHint, ObservableType, PropValue, Target, ValueState};

pub const PARENT_PROPERTIES: &[&str] = &["stylesheets", "needsLayout", "childCount", "branchCount"];

pub(crate) struct ParentReader;

impl AttributeReader for ParentReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    target
      .node()
      .is_some_and(|node| host.archetypes(node).contains(Archetypes::PARENT))
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    PARENT_PROPERTIES.iter().map(|name| (*name).to_owned()).collect()
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    let node = r.target.node()?;
    match name {
      "stylesheets" => stylesheets(r),
      "needsLayout" => r.auto(name, DisplayHint::Boolean),
      #[allow(clippy::cast_possible_wrap)]
      "childCount" => {
        let count = tree::count_children(r.host, node) as i64;
        Some(r.computed(name, PropValue::Int(count), DisplayHint::Numeric))
      }
      #[allow(clippy::cast_possible_wrap)]
      "branchCount" => {
        let count = tree::count_branch(r.host, node) as i64;
        Some(r.computed(name, PropValue::Int(count), DisplayHint::Numeric))
      }
      _ => None,
    }
  }

  fn extra_watched(&self) -> Vec<(Channel, &'static [&'static str])> {
    vec![
      (Channel::Children, &["childCount", "branchCount"]),
      (Channel::Property("stylesheets".into()), &["stylesheets"]),
    ]
  }
}

/// Stylesheet URIs, one per line.
pub(crate) fn stylesheets(r: &Reading<'_>) -> Option<Attribute> {
  r.list("stylesheets", "\n", ObservableType::List)
    .map(|attr| Attribute {
      value_state: ValueState::Auto,
      ..attr
    })
}
