/*!
Branch instrumentation.

Every non-auxiliary node of the monitored tree gets four subscriptions:
visibility, any-event, style class and its child list. The registry keeps
the children each node had when it was last seen, so a removed subtree is
detached symmetrically even after the host stopped reporting it.
*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::tree;
use crate::platform::{Channel, Listener, SubscriptionId, Toolkit};
use crate::types::{NodeId, ScopeError, Target};

const NODE_CHANNELS: [Channel; 3] = [Channel::Visibility, Channel::AnyEvent, Channel::StyleClass];

#[derive(Debug, Default)]
struct BranchEntry {
  subscriptions: Vec<SubscriptionId>,
  children: Vec<NodeId>,
}

/// Subscriptions of every instrumented node.
#[derive(Debug, Default)]
pub(super) struct Branches {
  entries: HashMap<NodeId, BranchEntry>,
}

impl Branches {
  /// Number of instrumented nodes.
  pub(super) fn len(&self) -> usize {
    self.entries.len()
  }

  pub(super) fn contains(&self, node: NodeId) -> bool {
    self.entries.contains_key(&node)
  }

  /// Instrument `node` and its non-auxiliary descendants.
  ///
  /// A node whose subscriptions fail is skipped together with its subtree.
  /// Failures are pushed to `errors` and the walk continues.
  pub(super) fn instrument(
    &mut self,
    host: &dyn Toolkit,
    node: NodeId,
    listener: &Listener,
    errors: &mut Vec<ScopeError>,
  ) {
    if tree::is_auxiliary(host, node) || self.entries.contains_key(&node) {
      return;
    }

    let target = Target::Node(node);
    let mut subscriptions = Vec::with_capacity(NODE_CHANNELS.len() + 1);
    for channel in NODE_CHANNELS {
      match host.subscribe(target, channel, Rc::clone(listener)) {
        Ok(id) => subscriptions.push(id),
        Err(e) => {
          for id in subscriptions {
            host.unsubscribe(id);
          }
          errors.push(ScopeError::Instrumentation {
            node,
            reason: e.to_string(),
          });
          return;
        }
      }
    }

    let children = tree::children(host, node);
    for child in &children {
      self.instrument(host, *child, listener, errors);
    }

    match host.subscribe(target, Channel::Children, Rc::clone(listener)) {
      Ok(id) => subscriptions.push(id),
      Err(e) => errors.push(ScopeError::Instrumentation {
        node,
        reason: e.to_string(),
      }),
    }
    self.entries.insert(node, BranchEntry { subscriptions, children });
  }

  /// Detach `node` and every descendant recorded for it.
  ///
  /// Returns the detached nodes, `node` first. Empty if `node` was not
  /// instrumented.
  pub(super) fn deinstrument(&mut self, host: &dyn Toolkit, node: NodeId) -> Vec<NodeId> {
    let mut detached = Vec::new();
    self.detach_into(host, node, &mut detached);
    detached
  }

  fn detach_into(&mut self, host: &dyn Toolkit, node: NodeId, detached: &mut Vec<NodeId>) {
    let Some(entry) = self.entries.remove(&node) else {
      return;
    };
    for id in entry.subscriptions {
      host.unsubscribe(id);
    }
    detached.push(node);
    for child in entry.children {
      self.detach_into(host, child, detached);
    }
  }

  /// Record the current children of an instrumented node.
  pub(super) fn set_children(&mut self, node: NodeId, children: Vec<NodeId>) {
    if let Some(entry) = self.entries.get_mut(&node) {
      entry.children = children;
    }
  }
}
