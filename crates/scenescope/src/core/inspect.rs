/*!
Hover feedback shown in inspect mode: a curtain over the window with a hole
at the hovered node, and a short tooltip describing it.
*/

use crate::types::{Bounds, Element, InspectSnapshot, Size};

/// Below this difference on both axes a node counts as filling the window.
const FILL_DELTA: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct InspectOverlay {
  state: InspectSnapshot,
}

impl Default for InspectOverlay {
  fn default() -> Self {
    Self::new()
  }
}

impl InspectOverlay {
  pub fn new() -> Self {
    Self {
      state: InspectSnapshot {
        visible: false,
        highlight: Bounds::ZERO,
        viewport: Bounds::ZERO,
        tooltip: String::new(),
      },
    }
  }

  pub fn is_visible(&self) -> bool {
    self.state.visible
  }

  /// Highlight `element`, whose bounds are given in the anchor's space.
  pub fn show(&mut self, element: &Element, bounds: Bounds, root: Size) {
    let fills_root = root.width - bounds.w < FILL_DELTA && root.height - bounds.h < FILL_DELTA;
    self.state = InspectSnapshot {
      visible: true,
      highlight: bounds,
      viewport: if fills_root { Bounds::ZERO } else { bounds },
      tooltip: tooltip(element, bounds),
    };
  }

  pub fn hide(&mut self) {
    *self = Self::new();
  }

  pub fn snapshot(&self) -> InspectSnapshot {
    self.state.clone()
  }
}

fn tooltip(element: &Element, bounds: Bounds) -> String {
  let mut header = element.simple_class_name().to_owned();
  if let Some(props) = element.node_properties() {
    if let Some(id) = &props.id {
      header.push_str(&format!(" id=\"{id}\""));
    }
    if !props.style_class.is_empty() {
      header.push_str(&format!(" class=\"{}\"", props.style_class.join(" ")));
    }
  }
  format!(
    "{header}\nx: {:.1} y: {:.1}\nwidth: {:.1} height: {:.1}",
    bounds.x, bounds.y, bounds.w, bounds.h
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{ClassInfo, ElementKind, NodeProperties, Uid};

  fn button(id: Option<&str>, classes: &[&str]) -> Element {
    Element {
      uid: Uid(7),
      class_info: ClassInfo {
        module: None,
        name: "scene.control.Button".into(),
        simple_name: "Button".into(),
      },
      kind: ElementKind::Node(NodeProperties {
        id: id.map(str::to_owned),
        style_class: classes.iter().map(|c| (*c).to_owned()).collect(),
        stylesheets: vec![],
        user_agent_stylesheet: None,
        is_control: true,
        is_pane: false,
        is_visible: true,
        is_auxiliary: false,
      }),
    }
  }

  #[test]
  fn tooltip_lists_id_class_and_geometry() {
    let mut overlay = InspectOverlay::new();
    overlay.show(
      &button(Some("ok"), &["button", "primary"]),
      Bounds::new(1.0, 2.0, 3.0, 4.0),
      Size::new(640.0, 480.0),
    );
    assert_eq!(
      overlay.snapshot().tooltip,
      "Button id=\"ok\" class=\"button primary\"\nx: 1.0 y: 2.0\nwidth: 3.0 height: 4.0"
    );
  }

  #[test]
  fn tooltip_omits_missing_parts() {
    let mut overlay = InspectOverlay::new();
    overlay.show(&button(None, &[]), Bounds::new(0.24, 0.0, 10.0, 10.0), Size::new(640.0, 480.0));
    assert!(overlay.snapshot().tooltip.starts_with("Button\nx: 0.2"));
  }

  #[test]
  fn node_filling_the_window_zeroes_viewport() {
    let mut overlay = InspectOverlay::new();
    let bounds = Bounds::new(0.0, 0.0, 639.0, 479.0);
    overlay.show(&button(None, &[]), bounds, Size::new(640.0, 480.0));
    let snapshot = overlay.snapshot();
    assert_eq!(snapshot.viewport, Bounds::ZERO);
    assert_eq!(snapshot.highlight, bounds);
  }

  #[test]
  fn hide_resets_state() {
    let mut overlay = InspectOverlay::new();
    overlay.show(&button(None, &[]), Bounds::new(5.0, 5.0, 10.0, 10.0), Size::new(640.0, 480.0));
    assert!(overlay.is_visible());
    assert_eq!(overlay.snapshot().viewport, Bounds::new(5.0, 5.0, 10.0, 10.0));
    overlay.hide();
    assert!(!overlay.is_visible());
    assert!(overlay.snapshot().tooltip.is_empty());
  }
}
