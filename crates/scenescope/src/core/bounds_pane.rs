/*!
Selection highlight primitives.

Three primitives are kept in the coordinate space of an anchor container:
the layout bounds box, the bounds-in-parent box and the baseline line. They
are plain geometry; embedders draw them however they like.
*/

use super::tree;
use crate::platform::{Toolkit, BASELINE_OFFSET_SAME_AS_HEIGHT};
use crate::types::{
  Bounds, NodeId, OverlayLine, OverlayRect, OverlaySnapshot, Point, ScopeResult, Uid, AUX_NODE_ID_PREFIX,
};

pub const LAYOUT_BOUNDS_ID: &str = "layoutBoundsRect";
pub const BOUNDS_IN_PARENT_ID: &str = "boundsInParentRect";
pub const BASELINE_ID: &str = "baselineLine";

fn aux_id(name: &str) -> String {
  format!("{AUX_NODE_ID_PREFIX}{name}")
}

#[derive(Debug, Clone)]
pub struct BoundsPane {
  anchor: Option<NodeId>,
  layout_bounds: OverlayRect,
  bounds_in_parent: OverlayRect,
  baseline: OverlayLine,
}

impl Default for BoundsPane {
  fn default() -> Self {
    Self::new()
  }
}

impl BoundsPane {
  pub fn new() -> Self {
    Self {
      anchor: None,
      layout_bounds: OverlayRect::hidden(&aux_id(LAYOUT_BOUNDS_ID)),
      bounds_in_parent: OverlayRect::hidden(&aux_id(BOUNDS_IN_PARENT_ID)),
      baseline: OverlayLine::hidden(&aux_id(BASELINE_ID)),
    }
  }

  /// Container the primitives are expressed in.
  pub fn anchor(&self) -> Option<NodeId> {
    self.anchor
  }

  /// Anchor the primitives to the nearest pane of `candidate`.
  ///
  /// Without a usable pane the overlay stays detached and every primitive is
  /// hidden.
  pub fn attach(&mut self, host: &dyn Toolkit, candidate: Option<NodeId>) {
    self.detach();
    self.anchor = candidate.and_then(|root| tree::find_nearest_pane(host, root));
    if self.anchor.is_none() {
      if let Some(root) = candidate {
        log::warn!("No pane under node#{root} can host the overlay, highlighting is disabled");
      }
      self.hide_all();
    }
  }

  pub fn detach(&mut self) {
    self.anchor = None;
  }

  pub fn hide_all(&mut self) {
    self.layout_bounds.hide();
    self.bounds_in_parent.hide();
    self.baseline.hide();
  }

  /// Show the layout bounds of `node`, or hide them on `None`.
  pub fn toggle_layout_bounds(&mut self, host: &dyn Toolkit, node: Option<NodeId>) -> ScopeResult<()> {
    let bounds = match node {
      Some(node) => self.calc_relative_bounds(host, node, true),
      None => Ok(None),
    };
    Self::place(&mut self.layout_bounds, bounds)
  }

  /// Show the bounds in parent of `node`, or hide them on `None`.
  pub fn toggle_bounds_in_parent(&mut self, host: &dyn Toolkit, node: Option<NodeId>) -> ScopeResult<()> {
    let bounds = match node {
      Some(node) => self.calc_relative_bounds(host, node, false),
      None => Ok(None),
    };
    Self::place(&mut self.bounds_in_parent, bounds)
  }

  /// Show the baseline of `node`, or hide it on `None`.
  pub fn toggle_baseline(&mut self, host: &dyn Toolkit, node: Option<NodeId>) -> ScopeResult<()> {
    let (Some(anchor), Some(node)) = (self.anchor, node) else {
      self.baseline.hide();
      return Ok(());
    };
    match baseline_segment(host, anchor, node) {
      Ok(Some((start, end))) => {
        self.baseline.start = start;
        self.baseline.end = end;
        self.baseline.visible = true;
        Ok(())
      }
      Ok(None) => {
        self.baseline.hide();
        Ok(())
      }
      Err(e) => {
        self.baseline.hide();
        Err(e)
      }
    }
  }

  /// Bounds of `node` in the anchor's space. `None` while detached.
  ///
  /// A root node is inset by one unit on each side so its outline stays
  /// inside the window.
  pub fn calc_relative_bounds(
    &self,
    host: &dyn Toolkit,
    node: NodeId,
    use_layout_bounds: bool,
  ) -> ScopeResult<Option<Bounds>> {
    let Some(anchor) = self.anchor else {
      return Ok(None);
    };
    let (bounds, layout) = if use_layout_bounds {
      (host.layout_bounds(node)?, host.layout_position(node)?)
    } else {
      (host.bounds_in_parent(node)?, Point::ORIGIN)
    };

    let Some(parent) = host.parent(node) else {
      return Ok(Some(
        Bounds::new(bounds.x + layout.x, bounds.y + layout.y, bounds.w, bounds.h).inset(1.0),
      ));
    };
    let scene = host.local_to_scene(parent, Point::new(bounds.x, bounds.y))?;
    let local = host.scene_to_local(anchor, scene)?;
    Ok(Some(Bounds::new(local.x + layout.x, local.y + layout.y, bounds.w, bounds.h)))
  }

  pub fn snapshot(&self) -> OverlaySnapshot {
    OverlaySnapshot {
      anchor: self.anchor.map(Uid::from),
      layout_bounds: self.layout_bounds.clone(),
      bounds_in_parent: self.bounds_in_parent.clone(),
      baseline: self.baseline.clone(),
    }
  }

  fn place(rect: &mut OverlayRect, bounds: ScopeResult<Option<Bounds>>) -> ScopeResult<()> {
    match bounds {
      Ok(Some(b)) if b.is_finite() => {
        rect.bounds = b;
        rect.visible = true;
        Ok(())
      }
      Ok(_) => {
        rect.hide();
        Ok(())
      }
      Err(e) => {
        rect.hide();
        Err(e)
      }
    }
  }
}

/// Baseline endpoints in the anchor's space, `None` when the node has no
/// usable baseline.
fn baseline_segment(host: &dyn Toolkit, anchor: NodeId, node: NodeId) -> ScopeResult<Option<(Point, Point)>> {
  let offset = host.baseline_offset(node)?;
  if offset == BASELINE_OFFSET_SAME_AS_HEIGHT || !offset.is_finite() {
    return Ok(None);
  }
  let bounds = host.layout_bounds(node)?;
  let scene = host.local_to_scene(node, Point::new(bounds.x, bounds.y + offset))?;
  let start = host.scene_to_local(anchor, scene)?;
  if !start.is_finite() {
    return Ok(None);
  }
  Ok(Some((start, start.offset(bounds.w, 0.0))))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{MemoryToolkit, NodeKind};
  use crate::types::{Target, WindowType};
  use std::rc::Rc;

  /// Pane root 400x300 with a button 80x20 at (200, 100).
  fn scene() -> (Rc<MemoryToolkit>, NodeId, NodeId) {
    let tk = MemoryToolkit::new();
    let window = tk.open_window(WindowType::Stage, "t", Bounds::new(0.0, 0.0, 400.0, 300.0));
    let root = tk.create_node(NodeKind::Pane);
    tk.set_size(root, 400.0, 300.0).unwrap();
    tk.set_root(window, Some(root)).unwrap();
    let button = tk.create_node(NodeKind::Button);
    tk.set_size(button, 80.0, 20.0).unwrap();
    tk.set_layout(button, 200.0, 100.0).unwrap();
    tk.add_child(root, button).unwrap();
    (tk, root, button)
  }

  mod attach {
    use super::*;

    #[test]
    fn anchors_to_nearest_pane() {
      let (tk, root, _) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      assert_eq!(pane.anchor(), Some(root));
    }

    #[test]
    fn no_pane_leaves_overlay_detached() {
      let tk = MemoryToolkit::new();
      let rect = tk.create_node(NodeKind::Rectangle);
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(rect));
      assert_eq!(pane.anchor(), None);
      pane.toggle_layout_bounds(tk.as_ref(), Some(rect)).unwrap();
      assert!(!pane.snapshot().layout_bounds.visible);
    }

    #[test]
    fn primitives_carry_auxiliary_ids() {
      let snapshot = BoundsPane::new().snapshot();
      assert_eq!(snapshot.layout_bounds.id, "scenescope.layoutBoundsRect");
      assert_eq!(snapshot.bounds_in_parent.id, "scenescope.boundsInParentRect");
      assert_eq!(snapshot.baseline.id, "scenescope.baselineLine");
    }
  }

  mod bounds {
    use super::*;

    #[test]
    fn child_layout_bounds_relative_to_anchor() {
      let (tk, root, button) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      let bounds = pane.calc_relative_bounds(tk.as_ref(), button, true).unwrap();
      assert_eq!(bounds, Some(Bounds::new(200.0, 100.0, 80.0, 20.0)));
    }

    #[test]
    fn child_bounds_in_parent_relative_to_anchor() {
      let (tk, root, button) = scene();
      tk.set_property(Target::Node(button), "translateX", 10.0).unwrap();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      let bounds = pane.calc_relative_bounds(tk.as_ref(), button, false).unwrap().unwrap();
      assert!(bounds.matches(&Bounds::new(210.0, 100.0, 80.0, 20.0), 1e-9));
    }

    #[test]
    fn root_is_inset_by_one() {
      let (tk, root, _) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      let bounds = pane.calc_relative_bounds(tk.as_ref(), root, true).unwrap();
      assert_eq!(bounds, Some(Bounds::new(1.0, 1.0, 398.0, 298.0)));
    }

    #[test]
    fn detached_pane_has_no_bounds() {
      let (tk, _, button) = scene();
      let pane = BoundsPane::new();
      assert_eq!(pane.calc_relative_bounds(tk.as_ref(), button, true).unwrap(), None);
    }

    #[test]
    fn non_finite_result_hides_primitive() {
      let (tk, root, button) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      pane.toggle_layout_bounds(tk.as_ref(), Some(button)).unwrap();
      assert!(pane.snapshot().layout_bounds.visible);

      // A zero scale makes the anchor transform singular
      tk.set_property(Target::Node(root), "scaleX", 0.0).unwrap();
      pane.toggle_layout_bounds(tk.as_ref(), Some(button)).unwrap();
      let rect = pane.snapshot().layout_bounds;
      assert!(!rect.visible);
      assert_eq!(rect.bounds, Bounds::ZERO);
    }

    #[test]
    fn unknown_node_is_an_error() {
      let (tk, root, _) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      assert!(pane.toggle_layout_bounds(tk.as_ref(), Some(NodeId(9_999))).is_err());
      assert!(!pane.snapshot().layout_bounds.visible);
    }
  }

  mod baseline {
    use super::*;

    #[test]
    fn labeled_node_has_baseline() {
      let (tk, root, button) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      pane.toggle_baseline(tk.as_ref(), Some(button)).unwrap();
      let line = pane.snapshot().baseline;
      assert!(line.visible);
      assert_eq!(line.start.x, 200.0);
      assert_eq!(line.end.x, 280.0);
      assert_eq!(line.start.y, line.end.y);
    }

    #[test]
    fn pane_has_no_baseline() {
      let (tk, root, _) = scene();
      let mut pane = BoundsPane::new();
      pane.attach(tk.as_ref(), Some(root));
      pane.toggle_baseline(tk.as_ref(), Some(root)).unwrap();
      assert!(!pane.snapshot().baseline.visible);
    }
  }
}
