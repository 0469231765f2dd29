/*!
Observed-tree abstraction traits.

These traits define the contract between core code and the toolkit that owns
the live scene. Core code only uses these traits, never toolkit types directly.

Everything here runs on the toolkit's UI thread. Notifications are delivered
synchronously, and implementations must not hold internal borrows while
invoking listeners: listeners are free to query and (un)subscribe re-entrantly.
*/

use std::rc::Rc;
use std::sync::Arc;

use bitflags::bitflags;
use derive_more::Display;

use super::Dispatcher;
use crate::types::{
  Bounds, NodeId, ObservableType, Point, PropValue, ScopeResult, Size, Target, WindowId, WindowType,
};

/// Suffix of accessors that return an observable property.
pub const PROPERTY_SUFFIX: &str = "Property";

/// Baseline offset of nodes without a meaningful baseline.
pub const BASELINE_OFFSET_SAME_AS_HEIGHT: f64 = f64::NEG_INFINITY;

/// Sizing sentinel: let the layout compute the size.
pub const USE_COMPUTED_SIZE: f64 = -1.0;

/// Sizing sentinel: clamp to the preferred size.
pub const USE_PREF_SIZE: f64 = f64::NEG_INFINITY;

/// Handle returned by [`Toolkit::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct SubscriptionId(pub u64);

/// Callback invoked for each matching notification.
pub type Listener = Rc<dyn Fn(&Notification)>;

/// Change stream a listener can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
  /// Invalidation of one named property.
  Property(String),
  /// Child list mutations of a node.
  Children,
  /// Visibility flag of a node.
  Visibility,
  /// Every event dispatched through a node.
  AnyEvent,
  /// Style class list of a node.
  StyleClass,
  /// Displayed content root of a window.
  Root,
  /// Pointer movement and presses inside a window.
  Pointer,
}

/// Pointer notification flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
  Moved,
  Pressed,
}

/// Notifications from toolkit to core.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
  /// A named property may have changed.
  Invalidated { target: Target, property: String },
  /// One mutation batch of a child list. Removals apply before additions.
  ChildrenChanged {
    parent: NodeId,
    removed: Vec<NodeId>,
    added: Vec<NodeId>,
  },
  VisibilityChanged { node: NodeId, visible: bool },
  StyleClassChanged { node: NodeId },
  /// A host event passing through `node`.
  Event {
    node: NodeId,
    event_type: String,
    description: String,
  },
  RootChanged {
    window: WindowId,
    old: Option<NodeId>,
    new: Option<NodeId>,
  },
  /// Pointer input in scene coordinates.
  Pointer {
    window: WindowId,
    kind: PointerKind,
    position: Point,
  },
  WindowsChanged {
    added: Vec<WindowId>,
    removed: Vec<WindowId>,
  },
}

bitflags! {
  /// Node archetypes. A node usually satisfies several.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct Archetypes: u16 {
    /// Has a child list.
    const PARENT = 1 << 0;
    /// Container whose child list can host overlay primitives.
    const PANE = 1 << 1;
    const REGION = 1 << 2;
    const CONTROL = 1 << 3;
    const LABELED = 1 << 4;
    const GRID_PANE = 1 << 5;
    const IMAGE_VIEW = 1 << 6;
    const SHAPE = 1 << 7;
    /// Shape without an interior (lines, paths).
    const OPEN_SHAPE = 1 << 8;
    const TEXT = 1 << 9;
    const SUB_SCENE = 1 << 10;
  }
}

/// Dimension a node's size depends on for the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Orientation {
  #[display("HORIZONTAL")]
  Horizontal,
  #[display("VERTICAL")]
  Vertical,
}

impl Orientation {
  /// Constant names, in declaration order.
  pub const NAMES: [&'static str; 2] = ["HORIZONTAL", "VERTICAL"];
}

/// Sizes the layout computes for a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComputedSizes {
  pub min: Size,
  pub pref: Size,
  pub max: Size,
}

/// Runtime description of a concrete toolkit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
  pub module: Option<String>,
  /// Fully qualified name.
  pub name: String,
  /// Empty for anonymous types.
  pub simple_name: String,
  pub super_type: Option<Arc<TypeInfo>>,
  /// Properties introduced by this type (not inherited).
  pub declared_properties: Vec<String>,
  /// Declared properties that are also style-engine properties.
  pub styleable_properties: Vec<String>,
}

impl TypeInfo {
  /// Walk this type and its ancestors, nearest first.
  pub fn ancestry(self: &Arc<Self>) -> impl Iterator<Item = Arc<TypeInfo>> {
    let mut next = Some(Arc::clone(self));
    std::iter::from_fn(move || {
      let current = next.take()?;
      next = current.super_type.clone();
      Some(current)
    })
  }

  /// Whether any type in the ancestry declares `property` styleable.
  pub fn is_styleable(self: &Arc<Self>, property: &str) -> bool {
    self
      .ancestry()
      .any(|t| t.styleable_properties.iter().any(|p| p == property))
  }
}

/// Window state as reported by the toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
  pub title: Option<String>,
  pub window_type: WindowType,
  pub bounds: Bounds,
  pub focused: bool,
  pub showing: bool,
  /// Node that opened a popup.
  pub owner: Option<NodeId>,
  pub auto_hide: bool,
}

/// Resolved observable property of a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservableRef {
  pub target: Target,
  /// Logical property name (accessor name minus [`PROPERTY_SUFFIX`]).
  pub name: String,
  pub kind: ObservableType,
}

/// Current value of a named property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySnapshot {
  pub value: PropValue,
  pub kind: ObservableType,
}

/// The toolkit owning the observed scene.
pub trait Toolkit {
  // === Windows ===

  /// All open windows, in opening order.
  fn windows(&self) -> Vec<WindowId>;

  fn window_info(&self, window: WindowId) -> ScopeResult<WindowInfo>;

  /// Currently displayed content root.
  fn window_root(&self, window: WindowId) -> Option<NodeId>;

  fn scene_stylesheets(&self, window: WindowId) -> Vec<String>;

  fn scene_user_agent_stylesheet(&self, window: WindowId) -> Option<String>;

  fn hide_window(&self, window: WindowId) -> ScopeResult<()>;

  fn set_popup_auto_hide(&self, window: WindowId, auto_hide: bool) -> ScopeResult<()>;

  /// Application-wide user agent stylesheet.
  fn user_agent_stylesheet(&self) -> Option<String>;

  /// Toolkit preferences, as key/value pairs.
  fn platform_preferences(&self) -> Vec<(String, String)> {
    Vec::new()
  }

  // === Structure ===

  fn parent(&self, node: NodeId) -> Option<NodeId>;

  /// Children in paint order (last child is topmost).
  fn children(&self, node: NodeId) -> Vec<NodeId>;

  /// Window whose displayed tree contains the node.
  fn window_of(&self, node: NodeId) -> Option<WindowId>;

  fn node_id(&self, node: NodeId) -> Option<String>;

  fn style_classes(&self, node: NodeId) -> Vec<String>;

  fn stylesheets(&self, node: NodeId) -> Vec<String>;

  fn node_user_agent_stylesheet(&self, node: NodeId) -> Option<String>;

  fn is_visible(&self, node: NodeId) -> bool;

  fn is_mouse_transparent(&self, node: NodeId) -> bool;

  fn archetypes(&self, node: NodeId) -> Archetypes;

  // === Geometry ===

  /// Layout bounds in the node's local space.
  fn layout_bounds(&self, node: NodeId) -> ScopeResult<Bounds>;

  /// Bounds after the node's own transforms, in the parent's space.
  fn bounds_in_parent(&self, node: NodeId) -> ScopeResult<Bounds>;

  /// Layout position (layoutX, layoutY).
  fn layout_position(&self, node: NodeId) -> ScopeResult<Point>;

  fn local_to_scene(&self, node: NodeId, point: Point) -> ScopeResult<Point>;

  fn scene_to_local(&self, node: NodeId, point: Point) -> ScopeResult<Point>;

  /// Baseline offset, or [`BASELINE_OFFSET_SAME_AS_HEIGHT`].
  fn baseline_offset(&self, node: NodeId) -> ScopeResult<f64>;

  /// Point containment test in local coordinates.
  fn contains(&self, node: NodeId, local: Point) -> bool;

  /// Minimum, preferred and maximum size, resolved against the content bias.
  fn computed_sizes(&self, node: NodeId) -> ScopeResult<ComputedSizes>;

  /// `None` when width and height are independent.
  fn content_bias(&self, _node: NodeId) -> Option<Orientation> {
    None
  }

  /// Constraints a layout parent stored on the node (`gridpane-row`,
  /// `hbox-margin`, ...), sorted by key.
  fn layout_constraints(&self, _node: NodeId) -> Vec<(String, String)> {
    Vec::new()
  }

  // === Properties ===

  /// Names of the zero-argument accessors of a target.
  fn accessors(&self, target: Target) -> Vec<String>;

  /// Resolve an accessor returning an observable. May be denied.
  fn observable(&self, target: Target, accessor: &str) -> ScopeResult<ObservableRef>;

  fn property(&self, target: Target, name: &str) -> Option<PropertySnapshot>;

  // === Types ===

  fn type_info(&self, target: Target) -> ScopeResult<Arc<TypeInfo>>;

  fn type_by_name(&self, name: &str) -> Option<Arc<TypeInfo>>;

  // === Subscriptions ===

  fn subscribe(
    &self,
    target: Target,
    channel: Channel,
    listener: Listener,
  ) -> ScopeResult<SubscriptionId>;

  fn subscribe_windows(&self, listener: Listener) -> SubscriptionId;

  /// Returns false if the subscription was already gone.
  fn unsubscribe(&self, id: SubscriptionId) -> bool;

  /// Number of live subscriptions.
  fn subscription_count(&self) -> usize;

  // === Scheduling ===

  fn dispatcher(&self) -> Dispatcher;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn archetype_set_membership() {
    let set = Archetypes::PARENT | Archetypes::REGION;
    assert!(set.contains(Archetypes::PARENT));
    assert!(set.contains(Archetypes::REGION));
    assert!(!set.contains(Archetypes::CONTROL));
    assert!(set.union(Archetypes::CONTROL).contains(Archetypes::CONTROL));
    assert!(!Archetypes::empty().contains(Archetypes::PARENT));
    assert!(Archetypes::default().is_empty());
  }

  #[test]
  fn ancestry_walks_to_root() {
    let node = Arc::new(TypeInfo {
      module: None,
      name: "scene.Node".into(),
      simple_name: "Node".into(),
      super_type: None,
      declared_properties: vec!["opacity".into()],
      styleable_properties: vec!["opacity".into()],
    });
    let region = Arc::new(TypeInfo {
      module: None,
      name: "scene.Region".into(),
      simple_name: "Region".into(),
      super_type: Some(Arc::clone(&node)),
      declared_properties: vec!["padding".into()],
      styleable_properties: vec![],
    });
    let names: Vec<String> = region.ancestry().map(|t| t.simple_name.clone()).collect();
    assert_eq!(names, vec!["Region", "Node"]);
    assert!(region.is_styleable("opacity"));
    assert!(!region.is_styleable("padding"));
  }
}
