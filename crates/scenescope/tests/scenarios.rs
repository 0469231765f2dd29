//! End-to-end behaviour through the public connector API.

use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use scenescope::{
  node_element, AttributeCategory, Bounds, Connector, ConnectorEvent, Element, EventGroup, EventSource, EventType,
  HighlightOptions, MemoryToolkit, NodeId, NodeKind, Point, PropValue, Selection, Target, Toolkit, Topic, Uid,
  ValueState, WindowId, WindowType, AUX_NODE_ID_PREFIX,
};

struct Scene {
  tk: Rc<MemoryToolkit>,
  window: WindowId,
  root: NodeId,
  child: NodeId,
  connector: Connector,
  events: Arc<Mutex<Vec<ConnectorEvent>>>,
}

impl Scene {
  fn of(&self, event_type: EventType) -> Vec<ConnectorEvent> {
    self
      .events
      .lock()
      .iter()
      .filter(|e| e.event_type() == event_type)
      .cloned()
      .collect()
  }

  fn clear(&self) {
    self.events.lock().clear();
  }

  fn element(&self, node: NodeId) -> Element {
    node_element(self.tk.as_ref(), self.connector.classes(), node).unwrap()
  }

  fn select(&self, node: NodeId, options: Option<HighlightOptions>) {
    self.connector.select_node(self.window, &self.element(node), options);
  }

  fn aux(&self, suffix: &str) -> NodeId {
    self
      .tk
      .create_node_with_id(NodeKind::Pane, &format!("{AUX_NODE_ID_PREFIX}{suffix}"))
  }
}

/// Window 400x300 with a Pane root and one Button child at (20, 30).
/// `prepare` runs before the connector starts.
fn scene_with(inspect_mode: bool, prepare: impl FnOnce(&Rc<MemoryToolkit>, NodeId)) -> Scene {
  let tk = MemoryToolkit::new();
  let window = tk.open_window(WindowType::Stage, "main", Bounds::new(0.0, 0.0, 400.0, 300.0));
  let root = tk.create_node(NodeKind::Pane);
  tk.set_size(root, 400.0, 300.0).unwrap();
  let child = tk.create_node_with_id(NodeKind::Button, "ok");
  tk.set_size(child, 80.0, 20.0).unwrap();
  tk.set_layout(child, 20.0, 30.0).unwrap();
  tk.add_child(root, child).unwrap();
  prepare(&tk, root);
  tk.set_root(window, Some(root)).unwrap();

  let host: Rc<dyn Toolkit> = tk.clone();
  let connector = Connector::builder(host, Some(window))
    .application("scenarios")
    .inspect_mode(inspect_mode)
    .build();
  let events = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&events);
  connector
    .bus()
    .subscribe(Topic::Group(EventGroup::Any), move |e| sink.lock().push(e.clone()));
  connector.start();
  Scene {
    tk,
    window,
    root,
    child,
    connector,
    events,
  }
}

fn scene() -> Scene {
  scene_with(false, |_, _| {})
}

fn is_auxiliary(element: &Element) -> bool {
  element.node_properties().is_some_and(|p| p.is_auxiliary)
}

mod scenarios {
  use super::*;

  #[test]
  fn root_snapshot_skips_auxiliary_siblings() {
    let mut aux = None;
    let s = scene_with(false, |tk, root| {
      let overlay = tk.create_node_with_id(NodeKind::Pane, &format!("{AUX_NODE_ID_PREFIX}overlay"));
      let inner = tk.create_node(NodeKind::Rectangle);
      tk.add_child(overlay, inner).unwrap();
      tk.add_child(root, overlay).unwrap();
      aux = Some((overlay, inner));
    });
    let (overlay, inner) = aux.unwrap();

    let roots = s.of(EventType::RootChanged);
    assert_eq!(roots.len(), 1);
    let ConnectorEvent::RootChanged { element, tree, .. } = &roots[0] else {
      unreachable!()
    };
    assert_eq!(element.uid, Uid::from(s.window));
    assert_eq!(tree.element.uid, Uid::from(s.root));
    assert!(tree.find(Uid::from(s.child)).is_some());
    assert!(tree.find(Uid::from(overlay)).is_none());
    assert!(tree.find(Uid::from(inner)).is_none());
    assert_eq!(tree.len(), 2);

    assert!(s
      .events
      .lock()
      .iter()
      .filter_map(ConnectorEvent::element)
      .all(|e| !is_auxiliary(e) && e.uid != Uid::from(inner)));
  }

  #[test]
  fn layout_bounds_highlight_only() {
    let s = scene();
    s.select(s.child, Some(HighlightOptions::new(true, false, false)));

    let overlay = s.connector.overlay(s.window).unwrap();
    assert_eq!(overlay.anchor, Some(Uid::from(s.root)));
    assert!(overlay.layout_bounds.visible);
    assert_eq!(overlay.layout_bounds.bounds, Bounds::new(20.0, 30.0, 80.0, 20.0));
    assert!(!overlay.bounds_in_parent.visible);
    assert!(!overlay.baseline.visible);
  }

  #[test]
  fn removing_selected_node_clears_selection() {
    let s = scene();
    let monitor = s.connector.monitor(s.window).unwrap();
    let before_child = s.tk.subscription_count();
    s.select(s.child, None);
    assert_eq!(s.connector.selection(s.window).unwrap().node(), Some(s.child));
    s.clear();

    s.tk.remove_child(s.root, s.child).unwrap();

    assert_eq!(s.connector.selection(s.window), Some(Selection::None));
    assert!(!monitor.is_instrumented(s.child));
    // visibility, events, style class and children of the button
    assert_eq!(s.tk.subscription_count(), before_child - 4);
    let removed = s.of(EventType::NodeRemoved);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].element().map(|e| e.uid), Some(Uid::from(s.child)));
    assert!(!s.connector.overlay(s.window).unwrap().layout_bounds.visible);
  }

  fn reload_opacity(opacity: f64) -> (PropValue, ValueState) {
    let s = scene();
    s.tk.set_property(Target::Node(s.child), "opacity", opacity).unwrap();
    s.select(s.child, None);
    s.clear();

    s.connector
      .reload_attributes(s.window, Some(AttributeCategory::Node), Some("opacity"));

    let updated = s.of(EventType::AttributeUpdated);
    assert_eq!(updated.len(), 1);
    let ConnectorEvent::AttributeUpdated {
      element,
      category,
      attribute,
      ..
    } = &updated[0]
    else {
      unreachable!()
    };
    assert_eq!(element.uid, Uid::from(s.child));
    assert_eq!(*category, AttributeCategory::Node);
    assert_eq!(attribute.name, "opacity");
    (attribute.value.clone(), attribute.value_state)
  }

  #[test]
  fn opacity_reload_reports_default_state() {
    assert_eq!(reload_opacity(1.0), (PropValue::Float(1.0), ValueState::Default));
    assert_eq!(reload_opacity(0.5), (PropValue::Float(0.5), ValueState::Changed));
  }

  #[test]
  fn off_thread_fire_runs_once_on_ui_thread() {
    let s = scene();
    let ui_thread = std::thread::current().id();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    s.connector.bus().subscribe(EventType::WindowClosed, move |_| {
      sink.lock().push(std::thread::current().id());
    });

    let bus = s.connector.bus().clone();
    let source = EventSource::new(Some("scenarios".into()), s.window, true);
    std::thread::spawn(move || bus.fire(ConnectorEvent::WindowClosed { source }))
      .join()
      .unwrap();
    assert!(calls.lock().is_empty());

    assert_eq!(s.connector.bus().dispatcher().pump(), 1);
    assert_eq!(*calls.lock(), vec![ui_thread]);
    assert_eq!(s.connector.bus().dispatcher().pump(), 0);
    assert_eq!(calls.lock().len(), 1);
  }
}

mod properties {
  use super::*;

  #[test]
  fn selecting_same_node_twice_reloads_once() {
    let s = scene();
    s.clear();
    s.select(s.child, None);
    let first = s.of(EventType::AttributeList).len();
    assert!(first > 0);

    s.clear();
    s.select(s.child, None);
    assert!(s.of(EventType::AttributeList).is_empty());
  }

  #[test]
  fn auxiliary_nodes_stay_invisible() {
    let s = scene_with(true, |_, _| {});
    let monitor = s.connector.monitor(s.window).unwrap();
    s.clear();

    // Topmost and covering the button
    let overlay = s.aux("curtain");
    s.tk.set_size(overlay, 400.0, 300.0).unwrap();
    s.tk.add_child(s.root, overlay).unwrap();
    assert!(s.of(EventType::NodeAdded).is_empty());
    assert!(!monitor.is_instrumented(overlay));

    s.tk.pointer_pressed(s.window, Point::new(30.0, 35.0)).unwrap();
    let selected = s.of(EventType::NodeSelected);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].element().map(|e| e.uid), Some(Uid::from(s.child)));

    // Unresolvable through the tree, so never selectable
    s.connector.select_node(s.window, &s.element(overlay), None);
    assert_eq!(s.connector.selection(s.window), Some(Selection::None));

    s.tk.remove_child(s.root, overlay).unwrap();
    assert!(s.of(EventType::NodeRemoved).is_empty());
  }

  #[test]
  fn window_and_node_selection_are_exclusive() {
    let s = scene();
    s.select(s.child, None);
    assert!(s.connector.overlay(s.window).unwrap().layout_bounds.visible);

    s.connector.select_window(s.window);
    assert_eq!(s.connector.selection(s.window), Some(Selection::Window));
    let overlay = s.connector.overlay(s.window).unwrap();
    assert!(!overlay.layout_bounds.visible && !overlay.bounds_in_parent.visible);

    s.select(s.child, None);
    let selection = s.connector.selection(s.window).unwrap();
    assert!(!selection.is_window());
    assert_eq!(selection.node(), Some(s.child));
  }

  #[test]
  fn full_reloads_stay_within_declared_names() {
    let kinds = [
      NodeKind::Group,
      NodeKind::Pane,
      NodeKind::GridPane,
      NodeKind::Region,
      NodeKind::Label,
      NodeKind::Button,
      NodeKind::ImageView,
      NodeKind::Rectangle,
      NodeKind::Line,
      NodeKind::Circle,
      NodeKind::Text,
      NodeKind::SubScene,
    ];
    let s = scene();
    for kind in kinds {
      let node = s.tk.create_node(kind);
      s.tk.add_child(s.root, node).unwrap();
      s.select(node, None);
      s.clear();
      s.connector.reload_attributes(s.window, None, None);

      let lists = s.of(EventType::AttributeList);
      assert!(!lists.is_empty(), "{kind:?}");
      for event in lists {
        let ConnectorEvent::AttributeList {
          category, attributes, ..
        } = event
        else {
          unreachable!()
        };
        assert!(!attributes.is_empty(), "{kind:?} {category}");
        if category == AttributeCategory::Reflective {
          continue;
        }
        let declared = category.supported_properties();
        for attribute in &attributes {
          assert!(
            declared.contains(&attribute.name.as_str()),
            "{kind:?} {category}: {}",
            attribute.name
          );
        }
      }
    }
  }

  #[test]
  fn non_finite_geometry_hides_primitives() {
    let s = scene();
    s.tk.set_layout(s.child, f64::NAN, 30.0).unwrap();
    s.select(s.child, Some(HighlightOptions::new(true, true, false)));

    let overlay = s.connector.overlay(s.window).unwrap();
    assert!(!overlay.layout_bounds.visible);
    assert_eq!(overlay.layout_bounds.bounds, Bounds::ZERO);
    assert!(!overlay.bounds_in_parent.visible);
    assert_eq!(overlay.bounds_in_parent.bounds, Bounds::ZERO);
  }

  /// Pane subtree from parent picks: node `i + 1` hangs under one of nodes `0..=i`.
  fn build_subtree(tk: &MemoryToolkit, picks: &[prop::sample::Index]) -> NodeId {
    let mut nodes = vec![tk.create_node(NodeKind::Pane)];
    for pick in picks {
      let node = tk.create_node(NodeKind::Pane);
      tk.add_child(*pick.get(&nodes), node).unwrap();
      nodes.push(node);
    }
    nodes[0]
  }

  proptest! {
    #[test]
    fn attach_then_detach_restores_subscriptions(
      picks in prop::collection::vec(any::<prop::sample::Index>(), 0..12)
    ) {
      let s = scene();
      let baseline = s.tk.subscription_count();
      let subtree = build_subtree(&s.tk, &picks);

      s.tk.add_child(s.root, subtree).unwrap();
      prop_assert_eq!(s.tk.subscription_count(), baseline + 4 * (picks.len() + 1));

      s.tk.remove_child(s.root, subtree).unwrap();
      prop_assert_eq!(s.tk.subscription_count(), baseline);
      prop_assert!(!s.connector.monitor(s.window).unwrap().is_instrumented(subtree));
    }
  }
}
