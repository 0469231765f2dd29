/*! Branded ID types for type-safe references into the observed tree. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Host handle for a live node. Stable for the node's lifetime.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct NodeId(pub u64);

/// Host handle for a live window. Stable for the window's lifetime.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct WindowId(pub u64);

/// Element identity, derived from the wrapped node or window handle.
///
/// Hosts allocate node and window handles from one counter, so a uid never
/// names both a node and a window.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct Uid(pub u64);

impl From<NodeId> for Uid {
  fn from(id: NodeId) -> Self {
    Self(id.0)
  }
}

impl From<WindowId> for Uid {
  fn from(id: WindowId) -> Self {
    Self(id.0)
  }
}

impl Uid {
  /// Reinterpret as a node handle.
  pub const fn as_node(self) -> NodeId {
    NodeId(self.0)
  }

  /// Reinterpret as a window handle.
  pub const fn as_window(self) -> WindowId {
    WindowId(self.0)
  }
}

/// Something a tracker or property listener can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[serde(tag = "type", content = "id")]
#[ts(export)]
pub enum Target {
  Node(NodeId),
  Window(WindowId),
  /// The scene displayed by a window.
  Scene(WindowId),
}

impl Target {
  /// Node handle, if this target is a node.
  pub const fn node(self) -> Option<NodeId> {
    match self {
      Self::Node(id) => Some(id),
      Self::Window(_) | Self::Scene(_) => None,
    }
  }

  /// Window handle for window and scene targets.
  pub const fn window(self) -> Option<WindowId> {
    match self {
      Self::Window(id) | Self::Scene(id) => Some(id),
      Self::Node(_) => None,
    }
  }

  /// Uid of the element this target is reported as.
  ///
  /// Scene targets report as their window.
  pub fn uid(self) -> Uid {
    match self {
      Self::Node(id) => id.into(),
      Self::Window(id) | Self::Scene(id) => id.into(),
    }
  }
}

impl std::fmt::Display for Target {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Node(id) => write!(f, "node#{id}"),
      Self::Window(id) => write!(f, "window#{id}"),
      Self::Scene(id) => write!(f, "scene#{id}"),
    }
  }
}
