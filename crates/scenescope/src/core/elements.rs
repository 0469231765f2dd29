/*!
Building [`Element`] facades from live host state.

Elements are recomputed on every call and never cached. Parent and children
are not stored on the element; they are looked up through the host on demand.
*/

use crate::class_info::ClassInfoCache;
use crate::platform::{Archetypes, Toolkit};
use crate::types::{
  is_auxiliary_id, Element, ElementKind, ElementTree, NodeId, NodeProperties, ScopeResult, Target,
  WindowId, WindowProperties,
};

pub fn node_element(host: &dyn Toolkit, classes: &ClassInfoCache, node: NodeId) -> ScopeResult<Element> {
  let class_info = classes.class_info(&host.type_info(Target::Node(node))?);
  let archetypes = host.archetypes(node);
  let id = host.node_id(node);
  let is_auxiliary = is_auxiliary_id(id.as_deref());
  Ok(Element {
    uid: node.into(),
    class_info,
    kind: ElementKind::Node(NodeProperties {
      id,
      style_class: host.style_classes(node),
      stylesheets: host.stylesheets(node),
      user_agent_stylesheet: host.node_user_agent_stylesheet(node),
      is_control: archetypes.contains(Archetypes::CONTROL),
      is_pane: archetypes.contains(Archetypes::PANE),
      is_visible: host.is_visible(node),
      is_auxiliary,
    }),
  })
}

pub fn window_element(
  host: &dyn Toolkit,
  classes: &ClassInfoCache,
  window: WindowId,
  is_primary: bool,
) -> ScopeResult<Element> {
  let info = host.window_info(window)?;
  let class_info = classes.class_info(&host.type_info(Target::Window(window))?);
  let owner_class_name = info
    .owner
    .and_then(|owner| host.type_info(Target::Node(owner)).ok())
    .map(|t| classes.class_info(&t).simple_name);
  let user_agent_stylesheet = host
    .scene_user_agent_stylesheet(window)
    .filter(|uri| !uri.is_empty());
  Ok(Element {
    uid: window.into(),
    class_info,
    kind: ElementKind::Window(WindowProperties {
      window_type: info.window_type,
      scene_stylesheets: host.scene_stylesheets(window),
      user_agent_stylesheet,
      is_primary_stage: is_primary,
      window_title: info.title,
      owner_class_name,
    }),
  })
}

/// Snapshot of `node` and its non-auxiliary descendants.
pub fn element_tree(host: &dyn Toolkit, classes: &ClassInfoCache, node: NodeId) -> ScopeResult<ElementTree> {
  let element = node_element(host, classes, node)?;
  let mut children = Vec::new();
  for child in host.children(node) {
    if is_auxiliary_id(host.node_id(child).as_deref()) {
      continue;
    }
    children.push(element_tree(host, classes, child)?);
  }
  Ok(ElementTree { element, children })
}

impl Element {
  /// Parent element, computed from the host. Windows and roots have none.
  pub fn parent(&self, host: &dyn Toolkit, classes: &ClassInfoCache) -> Option<Element> {
    if !self.is_node() {
      return None;
    }
    let parent = host.parent(self.uid.as_node())?;
    node_element(host, classes, parent).ok()
  }

  /// Child elements, computed from the host. A window's only child is its root.
  pub fn children(&self, host: &dyn Toolkit, classes: &ClassInfoCache) -> Vec<Element> {
    let nodes = match &self.kind {
      ElementKind::Node(_) => host.children(self.uid.as_node()),
      ElementKind::Window(_) => host.window_root(self.uid.as_window()).into_iter().collect(),
    };
    nodes
      .into_iter()
      .filter_map(|node| node_element(host, classes, node).ok())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{MemoryToolkit, NodeKind};
  use crate::types::{Bounds, WindowType};
  use std::rc::Rc;

  fn scene() -> (Rc<MemoryToolkit>, WindowId, NodeId) {
    let tk = MemoryToolkit::new();
    let window = tk.open_window(WindowType::Stage, "Main", Bounds::new(0.0, 0.0, 400.0, 300.0));
    let root = tk.create_node(NodeKind::Pane);
    tk.set_root(window, Some(root)).unwrap();
    (tk, window, root)
  }

  #[test]
  fn node_element_reads_live_properties() {
    let (tk, _, root) = scene();
    let button = tk.create_node_with_id(NodeKind::Button, "ok");
    tk.set_style_classes(button, &["button", "primary"]).unwrap();
    tk.add_child(root, button).unwrap();
    let element = node_element(tk.as_ref(), &ClassInfoCache::new(), button).unwrap();
    let props = element.node_properties().unwrap();
    assert_eq!(props.id.as_deref(), Some("ok"));
    assert_eq!(props.style_class, vec!["button", "primary"]);
    assert!(props.is_control);
    assert!(!props.is_pane);
    assert_eq!(element.simple_class_name(), "Button");
  }

  #[test]
  fn tree_skips_auxiliary_children() {
    let (tk, _, root) = scene();
    let label = tk.create_node(NodeKind::Label);
    let aux = tk.create_node_with_id(NodeKind::Rectangle, "scenescope.overlay");
    tk.add_child(root, label).unwrap();
    tk.add_child(root, aux).unwrap();
    let tree = element_tree(tk.as_ref(), &ClassInfoCache::new(), root).unwrap();
    assert_eq!(tree.len(), 2);
    assert!(tree.find(aux.into()).is_none());
  }

  #[test]
  fn window_children_is_root() {
    let (tk, window, root) = scene();
    let classes = ClassInfoCache::new();
    let element = window_element(tk.as_ref(), &classes, window, true).unwrap();
    assert!(element.window_properties().unwrap().is_primary_stage);
    let children = element.children(tk.as_ref(), &classes);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].uid, root.into());
    assert!(element.parent(tk.as_ref(), &classes).is_none());
  }

  #[test]
  fn parent_is_looked_up_on_demand() {
    let (tk, _, root) = scene();
    let classes = ClassInfoCache::new();
    let child = tk.create_node(NodeKind::Text);
    tk.add_child(root, child).unwrap();
    let element = node_element(tk.as_ref(), &classes, child).unwrap();
    assert_eq!(element.parent(tk.as_ref(), &classes).map(|p| p.uid), Some(root.into()));
    // Same live node, rebuilt later, compares equal
    tk.set_node_id(child, Some("renamed")).unwrap();
    assert_eq!(node_element(tk.as_ref(), &classes, child).unwrap(), element);
  }

  #[test]
  fn popup_reports_owner_class() {
    let (tk, _, root) = scene();
    let popup = tk.open_popup(root, Bounds::new(0.0, 0.0, 10.0, 10.0));
    let element = window_element(tk.as_ref(), &ClassInfoCache::new(), popup, false).unwrap();
    let props = element.window_properties().unwrap();
    assert_eq!(props.window_type, WindowType::Popup);
    assert_eq!(props.owner_class_name.as_deref(), Some("Pane"));
  }
}
