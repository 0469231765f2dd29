/*!
Arena storage for the in-memory scene.

Single source of truth for node properties, parent/child links and window
roots. All mutations go through methods that keep the bidirectional
parent/child links consistent.

## Invariants

1. **Single parent**: a node appears in at most one child list, and its
   `parent` field names that list's owner.
2. **Detached nodes survive**: removing a node from its parent keeps it in the
   arena, so late observers can still query it.
*/

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::kinds::{self, NodeKind};
use crate::platform::{
  ComputedSizes, Orientation, TypeInfo, BASELINE_OFFSET_SAME_AS_HEIGHT, USE_COMPUTED_SIZE,
};
use crate::types::{
  Affine, Bounds, Font, NodeId, ObservableType, Point, PropValue, ScopeError, ScopeResult, Size,
  Target, WindowId, WindowType,
};

/// One named property value.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
  pub(crate) value: PropValue,
  pub(crate) kind: ObservableType,
  /// Exposed through a `…Property` accessor.
  pub(crate) observable: bool,
  /// Access-control failure reported when resolving the accessor.
  pub(crate) denied: Option<String>,
}

impl Slot {
  pub(crate) const fn observable(value: PropValue, kind: ObservableType) -> Self {
    Self {
      value,
      kind,
      observable: true,
      denied: None,
    }
  }

  pub(crate) const fn plain(value: PropValue) -> Self {
    Self {
      value,
      kind: ObservableType::NotObservable,
      observable: false,
      denied: None,
    }
  }
}

pub(super) type Slots = BTreeMap<String, Slot>;

pub(super) fn slots_from(defaults: impl IntoIterator<Item = (String, Slot)>) -> Slots {
  defaults.into_iter().collect()
}

#[derive(Debug)]
pub(super) struct NodeData {
  pub(super) kind: NodeKind,
  pub(super) type_info: Arc<TypeInfo>,
  pub(super) parent: Option<NodeId>,
  pub(super) children: Vec<NodeId>,
  pub(super) slots: Slots,
  /// Free-form node properties; layout parents keep their constraints here.
  pub(super) properties: BTreeMap<String, String>,
}

#[derive(Debug)]
pub(super) struct WindowData {
  pub(super) window_type: WindowType,
  pub(super) type_info: Arc<TypeInfo>,
  pub(super) owner: Option<NodeId>,
  pub(super) root: Option<NodeId>,
  pub(super) slots: Slots,
  pub(super) scene_slots: Slots,
}

#[derive(Debug, Default)]
pub(super) struct Graph {
  next_id: u64,
  pub(super) nodes: HashMap<NodeId, NodeData>,
  pub(super) windows: BTreeMap<WindowId, WindowData>,
  /// Open windows in opening order.
  pub(super) open: Vec<WindowId>,
}

impl Graph {
  pub(super) fn new() -> Self {
    Self {
      next_id: 1,
      ..Self::default()
    }
  }

  /// Allocate a handle value. Nodes and windows share the counter.
  pub(super) fn allocate(&mut self) -> u64 {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  pub(super) fn node(&self, id: NodeId) -> ScopeResult<&NodeData> {
    self.nodes.get(&id).ok_or(ScopeError::NodeNotFound(id))
  }

  pub(super) fn node_mut(&mut self, id: NodeId) -> ScopeResult<&mut NodeData> {
    self.nodes.get_mut(&id).ok_or(ScopeError::NodeNotFound(id))
  }

  pub(super) fn window(&self, id: WindowId) -> ScopeResult<&WindowData> {
    self.windows.get(&id).ok_or(ScopeError::WindowNotFound(id))
  }

  pub(super) fn window_mut(&mut self, id: WindowId) -> ScopeResult<&mut WindowData> {
    self.windows.get_mut(&id).ok_or(ScopeError::WindowNotFound(id))
  }

  pub(super) fn slots(&self, target: Target) -> ScopeResult<&Slots> {
    match target {
      Target::Node(id) => Ok(&self.node(id)?.slots),
      Target::Window(id) => Ok(&self.window(id)?.slots),
      Target::Scene(id) => Ok(&self.window(id)?.scene_slots),
    }
  }

  pub(super) fn slots_mut(&mut self, target: Target) -> ScopeResult<&mut Slots> {
    match target {
      Target::Node(id) => Ok(&mut self.node_mut(id)?.slots),
      Target::Window(id) => Ok(&mut self.window_mut(id)?.slots),
      Target::Scene(id) => Ok(&mut self.window_mut(id)?.scene_slots),
    }
  }

  pub(super) fn exists(&self, target: Target) -> bool {
    self.slots(target).is_ok()
  }

  pub(super) fn value(&self, target: Target, name: &str) -> Option<&PropValue> {
    self.slots(target).ok()?.get(name).map(|slot| &slot.value)
  }

  fn f64_or(&self, node: NodeId, name: &str, default: f64) -> f64 {
    self
      .value(Target::Node(node), name)
      .and_then(PropValue::as_f64)
      .unwrap_or(default)
  }

  // === Structure ===

  /// Detach `child` from its current parent. Returns the old parent.
  pub(super) fn detach(&mut self, child: NodeId) -> Option<NodeId> {
    let parent = self.nodes.get_mut(&child)?.parent.take()?;
    if let Some(data) = self.nodes.get_mut(&parent) {
      data.children.retain(|c| *c != child);
    }
    Some(parent)
  }

  /// Insert `child` into `parent` at `index` (clamped). The child must be detached.
  pub(super) fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) -> ScopeResult<()> {
    self.node(child)?;
    let data = self.node_mut(parent)?;
    let index = index.min(data.children.len());
    data.children.insert(index, child);
    self.node_mut(child)?.parent = Some(parent);
    Ok(())
  }

  /// Topmost ancestor of a node (the node itself when detached).
  pub(super) fn top(&self, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(parent) = self.nodes.get(&current).and_then(|n| n.parent) {
      current = parent;
    }
    current
  }

  pub(super) fn window_of(&self, node: NodeId) -> Option<WindowId> {
    let top = self.top(node);
    self
      .windows
      .iter()
      .find(|(_, w)| w.root == Some(top))
      .map(|(id, _)| *id)
  }

  /// Ancestors from the topmost down to the node itself.
  pub(super) fn path_from_top(&self, node: NodeId) -> Vec<NodeId> {
    let mut path = vec![node];
    let mut current = node;
    while let Some(parent) = self.nodes.get(&current).and_then(|n| n.parent) {
      path.push(parent);
      current = parent;
    }
    path.reverse();
    path
  }

  // === Geometry ===

  pub(super) fn layout_bounds(&self, node: NodeId) -> ScopeResult<Bounds> {
    let data = self.node(node)?;
    let f = |name: &str, default: f64| self.f64_or(node, name, default);
    let bounds = match data.kind {
      NodeKind::Group => {
        let empty = Bounds::new(0.0, 0.0, -1.0, -1.0);
        let union = data
          .children
          .iter()
          .filter_map(|child| self.bounds_in_parent(*child).ok())
          .fold(empty, |acc, b| acc.union(&b));
        if union.is_empty() {
          Bounds::ZERO
        } else {
          union
        }
      }
      NodeKind::Rectangle => Bounds::new(f("x", 0.0), f("y", 0.0), f("width", 0.0), f("height", 0.0)),
      NodeKind::Line => Bounds::from_corners(
        Point::new(f("startX", 0.0), f("startY", 0.0)),
        Point::new(f("endX", 0.0), f("endY", 0.0)),
      ),
      NodeKind::Circle => {
        let r = f("radius", 0.0);
        Bounds::new(f("centerX", 0.0) - r, f("centerY", 0.0) - r, 2.0 * r, 2.0 * r)
      }
      NodeKind::Text => {
        let size = self.font_size(node);
        let chars = self
          .value(Target::Node(node), "text")
          .and_then(PropValue::as_str)
          .map_or(0, |t| t.chars().count());
        #[allow(clippy::cast_precision_loss)]
        let width = chars as f64 * size * TEXT_ADVANCE;
        Bounds::new(
          f("x", 0.0),
          f("y", 0.0) - size * TEXT_ASCENT,
          width,
          size * TEXT_LINE_HEIGHT,
        )
      }
      NodeKind::ImageView => {
        let (image_w, image_h) = match self.value(Target::Node(node), "image") {
          Some(PropValue::Image(img)) => (img.width, img.height),
          _ => (0.0, 0.0),
        };
        let fit_w = f("fitWidth", 0.0);
        let fit_h = f("fitHeight", 0.0);
        Bounds::new(
          f("x", 0.0),
          f("y", 0.0),
          if fit_w > 0.0 { fit_w } else { image_w },
          if fit_h > 0.0 { fit_h } else { image_h },
        )
      }
      NodeKind::Pane
      | NodeKind::GridPane
      | NodeKind::Region
      | NodeKind::Control
      | NodeKind::Label
      | NodeKind::Button
      | NodeKind::SubScene => Bounds::new(0.0, 0.0, f("width", 0.0), f("height", 0.0)),
    };
    Ok(bounds)
  }

  /// Resizable kinds resolve their sizing properties, every other kind is
  /// fixed at its layout bounds.
  pub(super) fn computed_sizes(&self, node: NodeId) -> ScopeResult<ComputedSizes> {
    let kind = self.node(node)?.kind;
    let bounds = self.layout_bounds(node)?;
    if !kind.is_resizable() {
      let size = Size::new(bounds.w, bounds.h);
      return Ok(ComputedSizes {
        min: size,
        pref: size,
        max: size,
      });
    }
    // Layout panes shrink to nothing and grow without limit; controls stick
    // to their preferred size.
    let pane = matches!(kind, NodeKind::Pane | NodeKind::GridPane | NodeKind::Region);
    let axis = |dimension: &str, content: f64| {
      let f = |prefix: &str| self.f64_or(node, &format!("{prefix}{dimension}"), USE_COMPUTED_SIZE);
      let pref = resolve_size(f("pref"), content, content);
      let min = resolve_size(f("min"), if pane { 0.0 } else { pref }, pref);
      let max = resolve_size(f("max"), if pane { f64::MAX } else { pref }, pref);
      (min, pref, max)
    };
    let (min_w, pref_w, max_w) = axis("Width", bounds.w);
    let (min_h, pref_h, max_h) = axis("Height", bounds.h);
    Ok(ComputedSizes {
      min: Size::new(min_w, min_h),
      pref: Size::new(pref_w, pref_h),
      max: Size::new(max_w, max_h),
    })
  }

  /// Wrapping labeled controls trade height for width.
  pub(super) fn content_bias(&self, node: NodeId) -> Option<Orientation> {
    let kind = self.nodes.get(&node)?.kind;
    let wraps = matches!(kind, NodeKind::Label | NodeKind::Button)
      && self.value(Target::Node(node), "wrapText").and_then(PropValue::as_bool) == Some(true);
    wraps.then_some(Orientation::Horizontal)
  }

  fn font_size(&self, node: NodeId) -> f64 {
    self
      .value(Target::Node(node), "font")
      .and_then(PropValue::as_font)
      .map_or(Font::DEFAULT_SIZE, |font| font.size)
  }

  /// Local to parent transform: layout + translate, then rotate and scale
  /// about the layout bounds centre.
  pub(super) fn local_transform(&self, node: NodeId) -> ScopeResult<Affine> {
    let f = |name: &str, default: f64| self.f64_or(node, name, default);
    let pivot = self.layout_bounds(node)?.center();
    let spin = Affine::rotate(f("rotate", 0.0))
      .then(&Affine::scale(f("scaleX", 1.0), f("scaleY", 1.0)))
      .about(pivot);
    Ok(
      Affine::translate(
        f("layoutX", 0.0) + f("translateX", 0.0),
        f("layoutY", 0.0) + f("translateY", 0.0),
      )
      .then(&spin),
    )
  }

  /// Local to scene transform (through every ancestor).
  pub(super) fn scene_transform(&self, node: NodeId) -> ScopeResult<Affine> {
    let mut transform = Affine::IDENTITY;
    for id in self.path_from_top(node) {
      transform = transform.then(&self.local_transform(id)?);
    }
    Ok(transform)
  }

  pub(super) fn bounds_in_parent(&self, node: NodeId) -> ScopeResult<Bounds> {
    let layout = self.layout_bounds(node)?;
    Ok(self.local_transform(node)?.apply_bounds(&layout))
  }

  pub(super) fn contains(&self, node: NodeId, local: Point) -> bool {
    let Ok(data) = self.node(node) else {
      return false;
    };
    match data.kind {
      NodeKind::Circle => {
        let f = |name: &str| self.f64_or(node, name, 0.0);
        let (dx, dy) = (local.x - f("centerX"), local.y - f("centerY"));
        dx.hypot(dy) <= f("radius")
      }
      // A group is hit when one of its children is
      NodeKind::Group => data.children.iter().any(|child| {
        self
          .local_transform(*child)
          .is_ok_and(|t| self.contains(*child, t.inverse().apply(local)))
      }),
      NodeKind::Pane
      | NodeKind::GridPane
      | NodeKind::Region
      | NodeKind::Control
      | NodeKind::Label
      | NodeKind::Button
      | NodeKind::ImageView
      | NodeKind::Rectangle
      | NodeKind::Line
      | NodeKind::Text
      | NodeKind::SubScene => self.layout_bounds(node).is_ok_and(|b| b.contains(local)),
    }
  }

  pub(super) fn baseline_offset(&self, node: NodeId) -> ScopeResult<f64> {
    let data = self.node(node)?;
    let offset = match data.kind {
      NodeKind::Text => self.font_size(node) * TEXT_ASCENT,
      NodeKind::Label | NodeKind::Button => {
        let height = self.f64_or(node, "height", 0.0);
        let size = self.font_size(node);
        // Single line of text, vertically centred
        (height - size * TEXT_LINE_HEIGHT) / 2.0 + size * TEXT_ASCENT
      }
      NodeKind::Group
      | NodeKind::Pane
      | NodeKind::GridPane
      | NodeKind::Region
      | NodeKind::Control
      | NodeKind::ImageView
      | NodeKind::Rectangle
      | NodeKind::Line
      | NodeKind::Circle
      | NodeKind::SubScene => BASELINE_OFFSET_SAME_AS_HEIGHT,
    };
    Ok(offset)
  }

  /// Visible flag of a node.
  pub(super) fn is_visible(&self, node: NodeId) -> bool {
    self
      .value(Target::Node(node), "visible")
      .and_then(PropValue::as_bool)
      .unwrap_or(false)
  }

  pub(super) fn new_node(&mut self, kind: NodeKind, type_info: Arc<TypeInfo>) -> NodeId {
    let id = NodeId(self.allocate());
    let slots = slots_from(kinds::default_slots(&type_info));
    self.nodes.insert(
      id,
      NodeData {
        kind,
        type_info,
        parent: None,
        children: Vec::new(),
        slots,
        properties: BTreeMap::new(),
      },
    );
    id
  }
}

/// Explicit sizes win, `USE_PREF_SIZE` clamps to `pref`, anything else
/// negative falls back to `computed`.
fn resolve_size(value: f64, computed: f64, pref: f64) -> f64 {
  if value >= 0.0 {
    value
  } else if value.is_infinite() {
    pref
  } else {
    computed
  }
}

/// Glyph advance as a fraction of the font size.
const TEXT_ADVANCE: f64 = 0.6;
/// Ascent as a fraction of the font size.
const TEXT_ASCENT: f64 = 0.8;
const TEXT_LINE_HEIGHT: f64 = 1.2;

#[cfg(test)]
mod tests {
  use super::super::kinds::TypeRegistry;
  use super::*;

  fn graph_with(kind: NodeKind) -> (Graph, NodeId) {
    let registry = TypeRegistry::new();
    let mut graph = Graph::new();
    let info = registry.get(kind.type_name()).unwrap();
    let id = graph.new_node(kind, info);
    (graph, id)
  }

  fn set(graph: &mut Graph, node: NodeId, name: &str, value: f64) {
    graph
      .slots_mut(Target::Node(node))
      .unwrap()
      .get_mut(name)
      .unwrap()
      .value = PropValue::Float(value);
  }

  #[test]
  fn attach_and_detach_keep_links() {
    let registry = TypeRegistry::new();
    let mut graph = Graph::new();
    let pane = registry.get(NodeKind::Pane.type_name()).unwrap();
    let parent = graph.new_node(NodeKind::Pane, Arc::clone(&pane));
    let child = graph.new_node(NodeKind::Pane, pane);
    graph.attach(parent, child, 0).unwrap();
    assert_eq!(graph.node(parent).unwrap().children, vec![child]);
    assert_eq!(graph.node(child).unwrap().parent, Some(parent));
    assert_eq!(graph.detach(child), Some(parent));
    assert!(graph.node(parent).unwrap().children.is_empty());
    assert!(graph.node(child).is_ok(), "detached nodes stay in the arena");
  }

  #[test]
  fn rectangle_bounds_in_parent_follow_layout() {
    let (mut graph, rect) = graph_with(NodeKind::Rectangle);
    set(&mut graph, rect, "width", 100.0);
    set(&mut graph, rect, "height", 50.0);
    set(&mut graph, rect, "layoutX", 10.0);
    set(&mut graph, rect, "layoutY", 20.0);
    assert_eq!(graph.layout_bounds(rect).unwrap(), Bounds::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(graph.bounds_in_parent(rect).unwrap(), Bounds::new(10.0, 20.0, 100.0, 50.0));
  }

  #[test]
  fn pane_sizes_fall_back_to_content() {
    let (mut graph, pane) = graph_with(NodeKind::Pane);
    set(&mut graph, pane, "width", 80.0);
    set(&mut graph, pane, "height", 40.0);
    set(&mut graph, pane, "minWidth", 10.0);
    set(&mut graph, pane, "maxHeight", f64::NEG_INFINITY);
    let sizes = graph.computed_sizes(pane).unwrap();
    assert_eq!(sizes.pref, Size::new(80.0, 40.0));
    assert_eq!(sizes.min, Size::new(10.0, 0.0));
    assert_eq!(sizes.max, Size::new(f64::MAX, 40.0));
  }

  #[test]
  fn shapes_are_fixed_at_their_bounds() {
    let (mut graph, rect) = graph_with(NodeKind::Rectangle);
    set(&mut graph, rect, "width", 30.0);
    set(&mut graph, rect, "height", 20.0);
    let sizes = graph.computed_sizes(rect).unwrap();
    assert_eq!(sizes.min, sizes.pref);
    assert_eq!(sizes.max, Size::new(30.0, 20.0));
  }

  #[test]
  fn wrapping_label_has_horizontal_bias() {
    let (mut graph, label) = graph_with(NodeKind::Label);
    assert_eq!(graph.content_bias(label), None);
    graph
      .slots_mut(Target::Node(label))
      .unwrap()
      .get_mut("wrapText")
      .unwrap()
      .value = PropValue::Bool(true);
    assert_eq!(graph.content_bias(label), Some(Orientation::Horizontal));
  }

  #[test]
  fn scale_is_about_center() {
    let (mut graph, rect) = graph_with(NodeKind::Rectangle);
    set(&mut graph, rect, "width", 100.0);
    set(&mut graph, rect, "height", 100.0);
    set(&mut graph, rect, "scaleX", 2.0);
    let b = graph.bounds_in_parent(rect).unwrap();
    assert_eq!(b, Bounds::new(-50.0, 0.0, 200.0, 100.0));
  }

  #[test]
  fn zero_scale_makes_scene_inverse_non_finite() {
    let (mut graph, rect) = graph_with(NodeKind::Rectangle);
    set(&mut graph, rect, "width", 10.0);
    set(&mut graph, rect, "height", 10.0);
    set(&mut graph, rect, "scaleX", 0.0);
    let inv = graph.scene_transform(rect).unwrap().inverse();
    assert!(!inv.apply(Point::new(1.0, 1.0)).is_finite());
  }

  #[test]
  fn circle_contains_uses_radius() {
    let (mut graph, circle) = graph_with(NodeKind::Circle);
    set(&mut graph, circle, "radius", 10.0);
    assert!(graph.contains(circle, Point::new(7.0, 7.0)));
    assert!(!graph.contains(circle, Point::new(9.0, 9.0)));
  }

  #[test]
  fn shapes_have_no_baseline() {
    let (graph, rect) = graph_with(NodeKind::Rectangle);
    assert_eq!(graph.baseline_offset(rect).unwrap(), BASELINE_OFFSET_SAME_AS_HEIGHT);
  }
}
