/*! Element facade over a live node or window. */

use super::{Uid, WindowId};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use ts_rs::TS;

/// Node ids starting with this prefix belong to overlay artifacts created by
/// scenescope itself. They are never observed, counted or hit-tested.
pub const AUX_NODE_ID_PREFIX: &str = "scenescope.";

/// Check a node id for the auxiliary tag.
pub fn is_auxiliary_id(id: Option<&str>) -> bool {
  id.is_some_and(|id| id.starts_with(AUX_NODE_ID_PREFIX))
}

/// Identity of a monitored window. Lives as long as its monitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventSource {
  pub application: Option<String>,
  pub uid: WindowId,
  pub is_primary: bool,
}

impl EventSource {
  pub fn new(application: Option<String>, uid: WindowId, is_primary: bool) -> Self {
    Self {
      application,
      uid,
      is_primary,
    }
  }

  /// `app#uid` rendering for logs.
  pub fn to_log_string(&self) -> String {
    format!("{}#{}", self.application.as_deref().unwrap_or(""), self.uid)
  }
}

/// Resolved naming of a concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClassInfo {
  pub module: Option<String>,
  pub name: String,
  pub simple_name: String,
}

/// Window flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum WindowType {
  Stage,
  Modal,
  Popup,
  Alert,
}

/// Node-only element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NodeProperties {
  pub id: Option<String>,
  pub style_class: Vec<String>,
  pub stylesheets: Vec<String>,
  pub user_agent_stylesheet: Option<String>,
  pub is_control: bool,
  pub is_pane: bool,
  pub is_visible: bool,
  pub is_auxiliary: bool,
}

/// Window-only element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WindowProperties {
  pub window_type: WindowType,
  pub scene_stylesheets: Vec<String>,
  pub user_agent_stylesheet: Option<String>,
  pub is_primary_stage: bool,
  pub window_title: Option<String>,
  /// Simple class name of the owning node, for popups.
  pub owner_class_name: Option<String>,
}

/// Exactly one of node or window data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "properties")]
#[ts(export)]
pub enum ElementKind {
  Node(NodeProperties),
  Window(WindowProperties),
}

/// Facade over a live node or window, rebuilt on demand and never cached.
///
/// Equality and hashing use the uid only: two elements built from the same
/// live object at different times compare equal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Element {
  pub uid: Uid,
  pub class_info: ClassInfo,
  pub kind: ElementKind,
}

impl Element {
  pub fn simple_class_name(&self) -> &str {
    &self.class_info.simple_name
  }

  pub const fn is_node(&self) -> bool {
    matches!(self.kind, ElementKind::Node(_))
  }

  pub const fn is_window(&self) -> bool {
    matches!(self.kind, ElementKind::Window(_))
  }

  pub const fn node_properties(&self) -> Option<&NodeProperties> {
    match &self.kind {
      ElementKind::Node(props) => Some(props),
      ElementKind::Window(_) => None,
    }
  }

  pub const fn window_properties(&self) -> Option<&WindowProperties> {
    match &self.kind {
      ElementKind::Window(props) => Some(props),
      ElementKind::Node(_) => None,
    }
  }

  /// `Class#uid` rendering for logs.
  pub fn to_log_string(&self) -> String {
    format!("{}#{}", self.class_info.simple_name, self.uid)
  }
}

impl PartialEq for Element {
  fn eq(&self, other: &Self) -> bool {
    self.uid == other.uid
  }
}

impl Eq for Element {}

impl Hash for Element {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.uid.hash(state);
  }
}

/// Owned snapshot of an element and its non-auxiliary descendants.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ElementTree {
  pub element: Element,
  pub children: Vec<ElementTree>,
}

impl ElementTree {
  /// Depth-first search by uid.
  pub fn find(&self, uid: Uid) -> Option<&ElementTree> {
    if self.element.uid == uid {
      return Some(self);
    }
    self.children.iter().find_map(|child| child.find(uid))
  }

  /// Number of elements in the snapshot, including this one.
  pub fn len(&self) -> usize {
    1 + self.children.iter().map(ElementTree::len).sum::<usize>()
  }

  pub const fn is_empty(&self) -> bool {
    false
  }

  /// All elements in depth-first order.
  pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
    let mut stack = vec![self];
    std::iter::from_fn(move || {
      let next = stack.pop()?;
      stack.extend(next.children.iter().rev());
      Some(&next.element)
    })
  }
}

/// Window properties plus every node that declares its own stylesheets.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct StyledElements {
  pub window: Element,
  pub nodes: Vec<Element>,
}
