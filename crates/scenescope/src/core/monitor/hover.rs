/*! Pointer tracking and inspect-mode hover. */

use super::Inner;
use crate::core::tree;
use crate::platform::PointerKind;
use crate::types::{Bounds, ConnectorEvent, Element, NodeId, Point, ScopeResult, Size};

impl Inner {
  pub(super) fn on_pointer(&mut self, kind: PointerKind, position: Point) {
    let options = self.options.get();
    match kind {
      PointerKind::Moved => {
        self.ctx.emit(ConnectorEvent::MousePos {
          source: self.ctx.source.clone(),
          position,
        });
        if options.inspect_mode {
          self.update_hover(position, options.ignore_mouse_transparent);
        }
      }
      PointerKind::Pressed => {
        if !options.inspect_mode {
          return;
        }
        let Some(node) = self.hit(position, options.ignore_mouse_transparent) else {
          return;
        };
        match self.ctx.node_element(node) {
          Ok(element) => self.ctx.emit(ConnectorEvent::NodeSelected {
            source: self.ctx.source.clone(),
            element,
          }),
          Err(e) => log::warn!("Pressed node#{node} cannot be resolved: {e}"),
        }
      }
    }
  }

  pub(super) fn clear_hover(&mut self) {
    self.hovered = None;
    self.inspect.hide();
  }

  fn hit(&self, position: Point, ignore_mouse_transparent: bool) -> Option<NodeId> {
    let root = self.root?;
    tree::find_hovered(self.ctx.host.as_ref(), root, position, ignore_mouse_transparent)
  }

  fn update_hover(&mut self, position: Point, ignore_mouse_transparent: bool) {
    let hovered = self.hit(position, ignore_mouse_transparent);
    if hovered.is_some() && hovered == self.hovered {
      return;
    }
    self.hovered = hovered;
    let Some(node) = hovered else {
      self.inspect.hide();
      return;
    };
    match self.hover_display(node) {
      Ok(Some((element, bounds, root))) => self.inspect.show(&element, bounds, root),
      Ok(None) => self.inspect.hide(),
      Err(e) => {
        self.inspect.hide();
        self.ctx.emit_error(&e);
      }
    }
  }

  /// Element, anchor-relative bounds and window size for the hover display.
  fn hover_display(&self, node: NodeId) -> ScopeResult<Option<(Element, Bounds, Size)>> {
    let host = self.ctx.host.as_ref();
    let Some(bounds) = self.bounds_pane.calc_relative_bounds(host, node, false)? else {
      return Ok(None);
    };
    if !bounds.is_finite() {
      return Ok(None);
    }
    let window = host.window_info(self.window)?.bounds;
    Ok(Some((
      self.ctx.node_element(node)?,
      bounds,
      Size::new(window.w, window.h),
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::super::tests::{fixture, Fixture};
  use super::*;
  use crate::core::ConnectorOptions;
  use crate::types::{EventType, Uid};

  fn inspecting() -> Fixture {
    let f = fixture();
    f.options.set(ConnectorOptions {
      inspect_mode: true,
      ..ConnectorOptions::default()
    });
    f
  }

  #[test]
  fn moves_report_position() {
    let Fixture {
      tk, monitor, window, events, ..
    } = fixture();
    events.take();
    tk.pointer_moved(window, Point::new(5.0, 6.0)).unwrap();
    let moves = events.of(EventType::MousePos);
    assert_eq!(moves.len(), 1);
    assert!(!monitor.inspect_overlay().visible);
  }

  #[test]
  fn hover_shows_tooltip() {
    let Fixture {
      tk, monitor, window, ..
    } = inspecting();
    tk.pointer_moved(window, Point::new(30.0, 35.0)).unwrap();
    let inspect = monitor.inspect_overlay();
    assert!(inspect.visible);
    assert_eq!(inspect.highlight, Bounds::new(20.0, 30.0, 80.0, 20.0));
    assert_eq!(inspect.viewport, inspect.highlight);
    assert_eq!(inspect.tooltip, "Button id=\"ok\"\nx: 20.0 y: 30.0\nwidth: 80.0 height: 20.0");
  }

  #[test]
  fn leaving_every_node_hides() {
    let Fixture {
      tk, monitor, window, ..
    } = inspecting();
    tk.pointer_moved(window, Point::new(30.0, 35.0)).unwrap();
    tk.pointer_moved(window, Point::new(900.0, 900.0)).unwrap();
    assert!(!monitor.inspect_overlay().visible);
  }

  #[test]
  fn unchanged_hover_keeps_state() {
    let Fixture {
      tk,
      monitor,
      window,
      child,
      ..
    } = inspecting();
    tk.pointer_moved(window, Point::new(30.0, 35.0)).unwrap();
    // Moving the node does not refresh the tooltip while the pointer stays on it
    tk.set_layout(child, 22.0, 30.0).unwrap();
    tk.pointer_moved(window, Point::new(31.0, 35.0)).unwrap();
    assert_eq!(
      monitor.inspect_overlay().highlight,
      Bounds::new(20.0, 30.0, 80.0, 20.0)
    );
  }

  #[test]
  fn press_reports_node_under_pointer() {
    let Fixture {
      tk,
      window,
      child,
      events,
      monitor: _monitor,
      ..
    } = inspecting();
    events.take();
    tk.pointer_pressed(window, Point::new(30.0, 35.0)).unwrap();
    let selected = events.of(EventType::NodeSelected);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].element().map(|e| e.uid), Some(Uid::from(child)));
  }

  #[test]
  fn press_outside_inspect_mode_is_ignored() {
    let Fixture {
      tk,
      window,
      events,
      monitor: _monitor,
      ..
    } = fixture();
    events.take();
    tk.pointer_pressed(window, Point::new(30.0, 35.0)).unwrap();
    assert!(events.of(EventType::NodeSelected).is_empty());
  }

  #[test]
  fn mouse_transparent_nodes_need_override() {
    let Fixture {
      tk,
      monitor,
      window,
      child,
      options,
      ..
    } = inspecting();
    tk.set_mouse_transparent(child, true).unwrap();
    tk.pointer_moved(window, Point::new(30.0, 35.0)).unwrap();
    assert!(monitor.inspect_overlay().tooltip.starts_with("Pane"));

    options.set(ConnectorOptions {
      inspect_mode: true,
      ignore_mouse_transparent: true,
      ..ConnectorOptions::default()
    });
    tk.pointer_moved(window, Point::new(31.0, 35.0)).unwrap();
    assert!(monitor.inspect_overlay().tooltip.starts_with("Button"));
  }
}
