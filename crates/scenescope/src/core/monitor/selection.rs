/*!
Selection: the window, one node, or nothing.

A selected node is watched for bounds changes so the highlight follows it
while it moves or resizes.
*/

use std::rc::Rc;

use serde::Serialize;
use ts_rs::TS;

use super::Inner;
use crate::core::tree;
use crate::platform::Channel;
use crate::types::{HighlightOptions, NodeId, Target, Uid};

const BOUNDS_PROPERTIES: [&str; 2] = ["layoutBounds", "boundsInParent"];

/// What a monitor has selected. A node and the window are never selected
/// together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "type")]
#[ts(export)]
pub enum Selection {
  #[default]
  None,
  Window,
  Node { node: NodeId, options: HighlightOptions },
}

impl Selection {
  pub const fn node(&self) -> Option<NodeId> {
    match self {
      Self::Node { node, .. } => Some(*node),
      Self::None | Self::Window => None,
    }
  }

  pub const fn is_window(&self) -> bool {
    matches!(self, Self::Window)
  }
}

impl Inner {
  pub(super) fn select_window(&mut self) {
    self.unwatch_bounds();
    self.bounds_pane.hide_all();
    self.selection = Selection::Window;
    self.attributes.set_target(Some(Target::Window(self.window)));
  }

  /// Select the node with `uid`. Unknown uids are logged and ignored.
  pub(super) fn select_node(&mut self, uid: Uid, options: Option<HighlightOptions>) {
    let host = Rc::clone(&self.ctx.host);
    let Some(node) = self.root.and_then(|root| tree::find_node(host.as_ref(), root, uid)) else {
      log::warn!(
        "{}: element {uid} is not part of the monitored tree",
        self.ctx.source.to_log_string()
      );
      return;
    };

    self.unwatch_bounds();
    for property in BOUNDS_PROPERTIES {
      let channel = Channel::Property(property.to_owned());
      match host.subscribe(Target::Node(node), channel, Rc::clone(&self.listener)) {
        Ok(id) => self.bounds_subscriptions.push(id),
        Err(e) => self.ctx.emit_error(&e),
      }
    }
    self.selection = Selection::Node {
      node,
      options: options.unwrap_or_default(),
    };
    self.highlight();
    self.attributes.set_target(Some(Target::Node(node)));
  }

  /// Drop the selection and hide the highlight. Safe to call repeatedly.
  pub(super) fn clear_selection(&mut self) {
    self.unwatch_bounds();
    self.selection = Selection::None;
    self.bounds_pane.hide_all();
    self.attributes.set_target(None);
  }

  /// Place every primitive the selection asks for and hide the others.
  pub(super) fn highlight(&mut self) {
    let (node, options) = match self.selection {
      Selection::Node { node, options } => (Some(node), options),
      Selection::None | Selection::Window => (None, HighlightOptions::new(false, false, false)),
    };
    let host = Rc::clone(&self.ctx.host);
    let results = [
      self
        .bounds_pane
        .toggle_layout_bounds(host.as_ref(), node.filter(|_| options.layout_bounds)),
      self
        .bounds_pane
        .toggle_bounds_in_parent(host.as_ref(), node.filter(|_| options.bounds_in_parent)),
      self
        .bounds_pane
        .toggle_baseline(host.as_ref(), node.filter(|_| options.baseline)),
    ];
    for result in results {
      if let Err(e) = result {
        self.ctx.emit_error(&e);
      }
    }
  }

  /// Bounds of the selected node were invalidated.
  pub(super) fn on_selected_bounds_changed(&mut self, node: NodeId) {
    let Selection::Node { node: selected, options } = self.selection else {
      return;
    };
    if selected != node || self.tracking_bounds {
      return;
    }
    self.tracking_bounds = true;
    let host = Rc::clone(&self.ctx.host);
    let results = [
      self
        .bounds_pane
        .toggle_layout_bounds(host.as_ref(), Some(node).filter(|_| options.layout_bounds)),
      self
        .bounds_pane
        .toggle_bounds_in_parent(host.as_ref(), Some(node).filter(|_| options.bounds_in_parent)),
    ];
    for result in results {
      if let Err(e) = result {
        self.ctx.emit_error(&e);
      }
    }
    self.tracking_bounds = false;
  }

  fn unwatch_bounds(&mut self) {
    for id in self.bounds_subscriptions.drain(..) {
      self.ctx.host.unsubscribe(id);
    }
  }
}
