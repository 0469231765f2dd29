/*!
Recursive queries over a live subtree.

Every query visits all children of every node. Auxiliary subtrees are
skipped everywhere.
*/

use crate::platform::{Archetypes, Toolkit};
use crate::types::{is_auxiliary_id, NodeId, Point, Uid};

pub(crate) fn is_auxiliary(host: &dyn Toolkit, node: NodeId) -> bool {
  is_auxiliary_id(host.node_id(node).as_deref())
}

/// Children without auxiliary nodes.
pub(crate) fn children(host: &dyn Toolkit, node: NodeId) -> Vec<NodeId> {
  host
    .children(node)
    .into_iter()
    .filter(|child| !is_auxiliary(host, *child))
    .collect()
}

pub(crate) fn count_children(host: &dyn Toolkit, node: NodeId) -> usize {
  children(host, node).len()
}

/// Nodes in the branch rooted at `node`, itself included.
pub(crate) fn count_branch(host: &dyn Toolkit, node: NodeId) -> usize {
  if is_auxiliary(host, node) {
    return 0;
  }
  1 + host
    .children(node)
    .into_iter()
    .map(|child| count_branch(host, child))
    .sum::<usize>()
}

pub(crate) fn find_node(host: &dyn Toolkit, root: NodeId, uid: Uid) -> Option<NodeId> {
  if is_auxiliary(host, root) {
    return None;
  }
  if Uid::from(root) == uid {
    return Some(root);
  }
  host
    .children(root)
    .into_iter()
    .find_map(|child| find_node(host, child, uid))
}

/// Nearest container that can host overlay children: `node` itself, or the
/// first one found depth-first among its descendants.
pub(crate) fn find_nearest_pane(host: &dyn Toolkit, node: NodeId) -> Option<NodeId> {
  if host.archetypes(node).contains(Archetypes::PANE) {
    return Some(node);
  }
  children(host, node)
    .into_iter()
    .filter(|child| host.archetypes(*child).contains(Archetypes::PARENT))
    .find_map(|child| find_nearest_pane(host, child))
}

/// A node is visible on screen only if it and every ancestor are visible.
pub(crate) fn is_branch_visible(host: &dyn Toolkit, node: NodeId) -> bool {
  let mut current = Some(node);
  while let Some(n) = current {
    if !host.is_visible(n) {
      return false;
    }
    current = host.parent(n);
  }
  true
}

/// Topmost node under a scene point. Children are tested before their
/// parent, last child first.
///
/// `ignore_mouse_transparent` only lifts the mouse-transparency check; the
/// visibility chain is always required.
pub(crate) fn find_hovered(
  host: &dyn Toolkit,
  node: NodeId,
  scene: Point,
  ignore_mouse_transparent: bool,
) -> Option<NodeId> {
  if is_auxiliary(host, node) {
    return None;
  }
  for child in host.children(node).into_iter().rev() {
    if let Some(hit) = find_hovered(host, child, scene, ignore_mouse_transparent) {
      return Some(hit);
    }
  }
  let local = host.scene_to_local(node, scene).ok()?;
  let interactive = ignore_mouse_transparent || !host.is_mouse_transparent(node);
  (local.is_finite() && host.contains(node, local) && interactive && is_branch_visible(host, node))
    .then_some(node)
}

/// Whether `uri` is the user agent stylesheet or one of the stylesheets of
/// any node in the branch.
pub(crate) fn contains_stylesheet(host: &dyn Toolkit, node: NodeId, uri: &str) -> bool {
  if host.node_user_agent_stylesheet(node).as_deref() == Some(uri) {
    return true;
  }
  if host.stylesheets(node).iter().any(|sheet| sheet == uri) {
    return true;
  }
  host
    .children(node)
    .into_iter()
    .any(|child| contains_stylesheet(host, child, uri))
}

/// Nodes of the branch that declare their own stylesheets, depth-first.
pub(crate) fn collect_styled(host: &dyn Toolkit, node: NodeId, out: &mut Vec<NodeId>) {
  if is_auxiliary(host, node) {
    return;
  }
  if !host.stylesheets(node).is_empty() {
    out.push(node);
  }
  for child in host.children(node) {
    collect_styled(host, child, out);
  }
}
