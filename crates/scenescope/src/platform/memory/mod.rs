/*!
In-memory toolkit: a retained scene graph that implements [`Toolkit`].

It serves embedders without a native toolkit, and drives the test suite.
Mutations update the arena under a short borrow, collect the resulting
notifications, release the borrow and only then invoke listeners. Listeners
may therefore query the toolkit and (un)subscribe from inside a callback.

# Module Structure

- `mod.rs` - `MemoryToolkit`, mutation API, `Toolkit` impl
- `graph.rs` - arena storage, links, geometry
- `kinds.rs` - built-in node kinds, runtime types, default properties

# Example

```ignore
let toolkit = MemoryToolkit::new();
let window = toolkit.open_window(WindowType::Stage, "Main", Bounds::new(0.0, 0.0, 800.0, 600.0));
let root = toolkit.create_node(NodeKind::Pane);
toolkit.set_size(root, 800.0, 600.0);
toolkit.set_root(window, Some(root));
```
*/

mod graph;
mod kinds;

pub use kinds::NodeKind;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use graph::{slots_from, Graph, Slot, WindowData};
use kinds::TypeRegistry;

use super::{
  Archetypes, Channel, ComputedSizes, Dispatcher, Listener, Notification, ObservableRef,
  Orientation, PointerKind, PropertySnapshot, SubscriptionId, Toolkit, TypeInfo, WindowInfo,
  PROPERTY_SUFFIX,
};
use crate::types::{
  Bounds, ImageRef, NodeId, ObservableType, Point, PropValue, ScopeError, ScopeResult, Target,
  WindowId, WindowType,
};

/// Properties derived from geometry rather than stored.
const DERIVED_NODE_PROPERTIES: [&str; 2] = ["layoutBounds", "boundsInParent"];

/// Properties whose change moves or resizes the layout bounds.
const SHAPE_PROPERTIES: &[&str] = &[
  "width", "height", "x", "y", "startX", "startY", "endX", "endY", "centerX", "centerY", "radius",
  "text", "font", "fitWidth", "fitHeight", "image",
];

/// Properties whose change only moves the node within its parent.
const TRANSFORM_PROPERTIES: &[&str] = &[
  "layoutX",
  "layoutY",
  "translateX",
  "translateY",
  "scaleX",
  "scaleY",
  "rotate",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
  Scoped(Target, Channel),
  Windows,
}

struct Subscription {
  key: Key,
  listener: Listener,
}

#[derive(Default)]
struct Subscriptions {
  next_id: u64,
  by_id: BTreeMap<SubscriptionId, Subscription>,
  by_key: HashMap<Key, Vec<SubscriptionId>>,
}

impl Subscriptions {
  fn insert(&mut self, key: Key, listener: Listener) -> SubscriptionId {
    self.next_id += 1;
    let id = SubscriptionId(self.next_id);
    self.by_key.entry(key.clone()).or_default().push(id);
    self.by_id.insert(id, Subscription { key, listener });
    id
  }

  fn remove(&mut self, id: SubscriptionId) -> bool {
    let Some(sub) = self.by_id.remove(&id) else {
      return false;
    };
    if let Some(ids) = self.by_key.get_mut(&sub.key) {
      ids.retain(|other| *other != id);
      if ids.is_empty() {
        self.by_key.remove(&sub.key);
      }
    }
    true
  }

  fn listeners(&self, key: &Key) -> Vec<(SubscriptionId, Listener)> {
    self
      .by_key
      .get(key)
      .into_iter()
      .flatten()
      .filter_map(|id| self.by_id.get(id).map(|sub| (*id, Rc::clone(&sub.listener))))
      .collect()
  }
}

/// Retained scene graph living on the UI thread.
pub struct MemoryToolkit {
  graph: RefCell<Graph>,
  types: RefCell<TypeRegistry>,
  subscriptions: RefCell<Subscriptions>,
  dispatcher: Dispatcher,
  user_agent_stylesheet: RefCell<Option<String>>,
  preferences: RefCell<Vec<(String, String)>>,
  /// Notifications delivered so far, for diagnostics.
  delivered: Cell<u64>,
}

impl std::fmt::Debug for MemoryToolkit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MemoryToolkit")
      .field("nodes", &self.graph.borrow().nodes.len())
      .field("windows", &self.graph.borrow().open)
      .field("subscriptions", &self.subscription_count())
      .finish_non_exhaustive()
  }
}

type Outbox = Vec<(Key, Notification)>;

impl MemoryToolkit {
  /// Create an empty toolkit bound to the calling thread.
  pub fn new() -> Rc<Self> {
    Rc::new(Self {
      graph: RefCell::new(Graph::new()),
      types: RefCell::new(TypeRegistry::new()),
      subscriptions: RefCell::new(Subscriptions::default()),
      dispatcher: Dispatcher::for_current_thread(),
      user_agent_stylesheet: RefCell::new(None),
      preferences: RefCell::new(Vec::new()),
      delivered: Cell::new(0),
    })
  }

  /// Number of notifications delivered to listeners so far.
  pub fn delivered_count(&self) -> u64 {
    self.delivered.get()
  }

  fn dispatch(&self, outbox: Outbox) {
    for (key, notification) in outbox {
      let listeners = self.subscriptions.borrow().listeners(&key);
      for (id, listener) in listeners {
        // Skip listeners removed by an earlier callback of this batch
        if !self.subscriptions.borrow().by_id.contains_key(&id) {
          continue;
        }
        self.delivered.set(self.delivered.get() + 1);
        listener(&notification);
      }
    }
  }

  fn invalidated(target: Target, property: &str) -> (Key, Notification) {
    (
      Key::Scoped(target, Channel::Property(property.to_owned())),
      Notification::Invalidated {
        target,
        property: property.to_owned(),
      },
    )
  }

  /// Geometry invalidations after `node` moved or resized, walking up
  /// through groups whose bounds follow their children.
  fn geometry_changed(graph: &Graph, node: NodeId, resized: bool, outbox: &mut Outbox) {
    let target = Target::Node(node);
    if resized {
      outbox.push(Self::invalidated(target, "layoutBounds"));
    }
    outbox.push(Self::invalidated(target, "boundsInParent"));
    if let Some(parent) = graph.nodes.get(&node).and_then(|n| n.parent) {
      if graph.nodes.get(&parent).is_some_and(|p| p.kind == NodeKind::Group) {
        Self::geometry_changed(graph, parent, true, outbox);
      }
    }
  }

  // === Node creation ===

  /// Create a detached node of a built-in kind.
  pub fn create_node(&self, kind: NodeKind) -> NodeId {
    let info = self.types.borrow().get(kind.type_name());
    let info = info.unwrap_or_else(|| {
      // Every built-in kind is registered at construction
      Arc::new(TypeInfo {
        module: None,
        name: kind.type_name().to_owned(),
        simple_name: kinds::simple_name(kind.type_name()).to_owned(),
        super_type: None,
        declared_properties: Vec::new(),
        styleable_properties: Vec::new(),
      })
    });
    self.graph.borrow_mut().new_node(kind, info)
  }

  /// Create a detached node with the given id.
  pub fn create_node_with_id(&self, kind: NodeKind, id: &str) -> NodeId {
    let node = self.create_node(kind);
    self.write_slot(Target::Node(node), "id", PropValue::text(id));
    node
  }

  /// Create a node whose runtime type is a subtype of a built-in kind.
  ///
  /// An empty `simple_name` models an anonymous type.
  pub fn create_custom_node(&self, kind: NodeKind, name: &str, simple_name: &str) -> NodeId {
    let base = self.types.borrow().get(kind.type_name());
    let info = Arc::new(TypeInfo {
      module: Some("app".into()),
      name: name.to_owned(),
      simple_name: simple_name.to_owned(),
      super_type: base,
      declared_properties: Vec::new(),
      styleable_properties: Vec::new(),
    });
    self.types.borrow_mut().insert(Arc::clone(&info));
    self.graph.borrow_mut().new_node(kind, info)
  }

  fn write_slot(&self, target: Target, name: &str, value: PropValue) -> bool {
    let mut graph = self.graph.borrow_mut();
    let Ok(slots) = graph.slots_mut(target) else {
      return false;
    };
    match slots.get_mut(name) {
      Some(slot) => {
        slot.value = value;
      }
      None => {
        slots.insert(name.to_owned(), Slot::observable(value, ObservableType::ReadWrite));
      }
    }
    true
  }

  // === Structure mutations ===

  /// Append `child` to `parent`, moving it from its previous parent.
  pub fn add_child(&self, parent: NodeId, child: NodeId) -> ScopeResult<()> {
    let len = self.graph.borrow().node(parent)?.children.len();
    self.insert_child(parent, len, child)
  }

  /// Insert `child` at `index` of `parent`, moving it from its previous parent.
  pub fn insert_child(&self, parent: NodeId, index: usize, child: NodeId) -> ScopeResult<()> {
    let mut outbox = Outbox::new();
    {
      let mut graph = self.graph.borrow_mut();
      graph.node(parent)?;
      graph.node(child)?;
      if let Some(old) = graph.detach(child) {
        outbox.push(Self::children_changed(old, vec![child], vec![]));
      }
      graph.attach(parent, child, index)?;
      outbox.push(Self::children_changed(parent, vec![], vec![child]));
      Self::geometry_changed(&graph, child, false, &mut outbox);
    }
    self.dispatch(outbox);
    Ok(())
  }

  /// Remove `child` from `parent`. The child stays alive, detached.
  pub fn remove_child(&self, parent: NodeId, child: NodeId) -> ScopeResult<()> {
    let mut outbox = Outbox::new();
    {
      let mut graph = self.graph.borrow_mut();
      if graph.node(child)?.parent != Some(parent) {
        return Err(ScopeError::NodeNotFound(child));
      }
      graph.detach(child);
      outbox.push(Self::children_changed(parent, vec![child], vec![]));
      if graph.node(parent)?.kind == NodeKind::Group {
        Self::geometry_changed(&graph, parent, true, &mut outbox);
      }
    }
    self.dispatch(outbox);
    Ok(())
  }

  /// Replace every child of `parent` in one batch.
  pub fn set_children(&self, parent: NodeId, children: &[NodeId]) -> ScopeResult<()> {
    let mut outbox = Outbox::new();
    {
      let mut graph = self.graph.borrow_mut();
      let old = graph.node(parent)?.children.clone();
      for child in children {
        graph.node(*child)?;
      }
      for child in &old {
        graph.detach(*child);
      }
      for child in children {
        if let Some(other) = graph.detach(*child) {
          outbox.push(Self::children_changed(other, vec![*child], vec![]));
        }
      }
      for (index, child) in children.iter().enumerate() {
        graph.attach(parent, *child, index)?;
      }
      outbox.push(Self::children_changed(parent, old, children.to_vec()));
      if graph.node(parent)?.kind == NodeKind::Group {
        Self::geometry_changed(&graph, parent, true, &mut outbox);
      }
    }
    self.dispatch(outbox);
    Ok(())
  }

  fn children_changed(parent: NodeId, removed: Vec<NodeId>, added: Vec<NodeId>) -> (Key, Notification) {
    (
      Key::Scoped(Target::Node(parent), Channel::Children),
      Notification::ChildrenChanged {
        parent,
        removed,
        added,
      },
    )
  }

  // === Property mutations ===

  /// Set a named property and notify its observers.
  ///
  /// Geometry-affecting properties also invalidate `layoutBounds` and
  /// `boundsInParent`; `visible` also notifies visibility listeners.
  pub fn set_property(&self, target: Target, name: &str, value: impl Into<PropValue>) -> ScopeResult<()> {
    let value = value.into();
    let mut outbox = Outbox::new();
    {
      let mut graph = self.graph.borrow_mut();
      let slots = graph.slots_mut(target)?;
      let slot = slots
        .entry(name.to_owned())
        .or_insert_with(|| Slot::observable(PropValue::Null, ObservableType::ReadWrite));
      slot.value = value.clone();
      outbox.push(Self::invalidated(target, name));

      if let Target::Node(node) = target {
        if name == "visible" {
          outbox.push((
            Key::Scoped(target, Channel::Visibility),
            Notification::VisibilityChanged {
              node,
              visible: value.as_bool().unwrap_or(false),
            },
          ));
        }
        if name == "styleClass" {
          outbox.push((
            Key::Scoped(target, Channel::StyleClass),
            Notification::StyleClassChanged { node },
          ));
        }
        if SHAPE_PROPERTIES.contains(&name) {
          Self::geometry_changed(&graph, node, true, &mut outbox);
        } else if TRANSFORM_PROPERTIES.contains(&name) {
          Self::geometry_changed(&graph, node, false, &mut outbox);
        }
      }
    }
    self.dispatch(outbox);
    Ok(())
  }

  /// Resize a node (width/height are read-only to observers).
  pub fn set_size(&self, node: NodeId, width: f64, height: f64) -> ScopeResult<()> {
    self.set_property(Target::Node(node), "width", width)?;
    self.set_property(Target::Node(node), "height", height)
  }

  pub fn set_layout(&self, node: NodeId, x: f64, y: f64) -> ScopeResult<()> {
    self.set_property(Target::Node(node), "layoutX", x)?;
    self.set_property(Target::Node(node), "layoutY", y)
  }

  pub fn set_visible(&self, node: NodeId, visible: bool) -> ScopeResult<()> {
    self.set_property(Target::Node(node), "visible", visible)
  }

  pub fn set_mouse_transparent(&self, node: NodeId, transparent: bool) -> ScopeResult<()> {
    self.set_property(Target::Node(node), "mouseTransparent", transparent)
  }

  pub fn set_node_id(&self, node: NodeId, id: Option<&str>) -> ScopeResult<()> {
    self.set_property(Target::Node(node), "id", id.map(str::to_owned))
  }

  pub fn set_style_classes(&self, node: NodeId, classes: &[&str]) -> ScopeResult<()> {
    self.set_list(Target::Node(node), "styleClass", classes)
  }

  pub fn set_stylesheets(&self, node: NodeId, sheets: &[&str]) -> ScopeResult<()> {
    self.set_list(Target::Node(node), "stylesheets", sheets)
  }

  /// Store a free-form node property. Layout parents keep their per-child
  /// constraints here under keys such as `gridpane-row` or `hbox-margin`.
  /// `None` removes the entry.
  pub fn set_node_property(&self, node: NodeId, key: &str, value: Option<&str>) -> ScopeResult<()> {
    let mut graph = self.graph.borrow_mut();
    let properties = &mut graph.node_mut(node)?.properties;
    match value {
      Some(value) => properties.insert(key.to_owned(), value.to_owned()),
      None => properties.remove(key),
    };
    Ok(())
  }

  pub fn set_scene_stylesheets(&self, window: WindowId, sheets: &[&str]) -> ScopeResult<()> {
    self.set_list(Target::Scene(window), "stylesheets", sheets)
  }

  /// Replace a list-valued, non-observable slot and notify list listeners.
  fn set_list(&self, target: Target, name: &str, items: &[&str]) -> ScopeResult<()> {
    {
      let mut graph = self.graph.borrow_mut();
      let slots = graph.slots_mut(target)?;
      let slot = slots
        .entry(name.to_owned())
        .or_insert_with(|| Slot::plain(PropValue::List(vec![])));
      slot.value = PropValue::list(items);
    }
    let mut outbox = vec![Self::invalidated(target, name)];
    if let (Target::Node(node), "styleClass") = (target, name) {
      outbox.push((
        Key::Scoped(target, Channel::StyleClass),
        Notification::StyleClassChanged { node },
      ));
    }
    self.dispatch(outbox);
    Ok(())
  }

  pub fn set_image(&self, node: NodeId, url: Option<&str>, width: f64, height: f64) -> ScopeResult<()> {
    let image = ImageRef {
      url: url.map(str::to_owned),
      width,
      height,
    };
    self.set_property(Target::Node(node), "image", PropValue::Image(image))
  }

  /// Make resolving `accessor` fail with an access-control error.
  pub fn deny_access(&self, target: Target, property: &str, reason: &str) -> ScopeResult<()> {
    let mut graph = self.graph.borrow_mut();
    let slot = graph
      .slots_mut(target)?
      .get_mut(property)
      .ok_or_else(|| ScopeError::NotSupported(format!("no property '{property}' on {target}")))?;
    slot.denied = Some(reason.to_owned());
    Ok(())
  }

  /// Mark a read-write property as bound.
  pub fn bind(&self, target: Target, property: &str) -> ScopeResult<()> {
    let mut graph = self.graph.borrow_mut();
    if let Some(slot) = graph.slots_mut(target)?.get_mut(property) {
      if slot.kind == ObservableType::ReadWrite {
        slot.kind = ObservableType::Bound;
      }
    }
    Ok(())
  }

  pub fn set_user_agent_stylesheet(&self, uri: Option<&str>) {
    *self.user_agent_stylesheet.borrow_mut() = uri.map(str::to_owned);
  }

  pub fn set_preference(&self, key: &str, value: &str) {
    let mut prefs = self.preferences.borrow_mut();
    prefs.retain(|(k, _)| k != key);
    prefs.push((key.to_owned(), value.to_owned()));
  }

  // === Events and input ===

  /// Dispatch a host event to `node`, passing through every ancestor from
  /// the top down.
  pub fn fire_event(&self, node: NodeId, event_type: &str, description: &str) -> ScopeResult<()> {
    let path = {
      let graph = self.graph.borrow();
      graph.node(node)?;
      graph.path_from_top(node)
    };
    let outbox = path
      .into_iter()
      .map(|hop| {
        (
          Key::Scoped(Target::Node(hop), Channel::AnyEvent),
          Notification::Event {
            node: hop,
            event_type: event_type.to_owned(),
            description: description.to_owned(),
          },
        )
      })
      .collect();
    self.dispatch(outbox);
    Ok(())
  }

  pub fn pointer_moved(&self, window: WindowId, position: Point) -> ScopeResult<()> {
    self.pointer(window, PointerKind::Moved, position)
  }

  pub fn pointer_pressed(&self, window: WindowId, position: Point) -> ScopeResult<()> {
    self.pointer(window, PointerKind::Pressed, position)
  }

  fn pointer(&self, window: WindowId, kind: PointerKind, position: Point) -> ScopeResult<()> {
    self.graph.borrow().window(window)?;
    self.dispatch(vec![(
      Key::Scoped(Target::Window(window), Channel::Pointer),
      Notification::Pointer {
        window,
        kind,
        position,
      },
    )]);
    Ok(())
  }

  // === Windows ===

  /// Open and show a window.
  pub fn open_window(&self, window_type: WindowType, title: &str, bounds: Bounds) -> WindowId {
    self.open(window_type, Some(title), bounds, None)
  }

  /// Open a popup owned by `owner`.
  pub fn open_popup(&self, owner: NodeId, bounds: Bounds) -> WindowId {
    self.open(WindowType::Popup, None, bounds, Some(owner))
  }

  fn open(&self, window_type: WindowType, title: Option<&str>, bounds: Bounds, owner: Option<NodeId>) -> WindowId {
    let type_name = match window_type {
      WindowType::Popup => "stage.Popup",
      WindowType::Stage | WindowType::Modal | WindowType::Alert => "stage.Stage",
    };
    let type_info = self.types.borrow().get(type_name);
    let id = {
      let mut graph = self.graph.borrow_mut();
      let id = WindowId(graph.allocate());
      let mut slots = slots_from(kinds::window_slots().into_iter().map(|(n, s)| (n.to_owned(), s)));
      for (name, value) in [
        ("x", PropValue::Float(bounds.x)),
        ("y", PropValue::Float(bounds.y)),
        ("width", PropValue::Float(bounds.w)),
        ("height", PropValue::Float(bounds.h)),
        ("showing", PropValue::Bool(true)),
        ("title", title.map(str::to_owned).into()),
        ("autoHide", PropValue::Bool(window_type == WindowType::Popup)),
      ] {
        if let Some(slot) = slots.get_mut(name) {
          slot.value = value;
        }
      }
      let mut scene_slots = slots_from(kinds::scene_slots().into_iter().map(|(n, s)| (n.to_owned(), s)));
      for (name, value) in [("width", bounds.w), ("height", bounds.h)] {
        if let Some(slot) = scene_slots.get_mut(name) {
          slot.value = PropValue::Float(value);
        }
      }
      let type_info = type_info.unwrap_or_else(|| {
        Arc::new(TypeInfo {
          module: None,
          name: type_name.to_owned(),
          simple_name: kinds::simple_name(type_name).to_owned(),
          super_type: None,
          declared_properties: Vec::new(),
          styleable_properties: Vec::new(),
        })
      });
      graph.windows.insert(
        id,
        WindowData {
          window_type,
          type_info,
          owner,
          root: None,
          slots,
          scene_slots,
        },
      );
      graph.open.push(id);
      id
    };
    self.dispatch(vec![(
      Key::Windows,
      Notification::WindowsChanged {
        added: vec![id],
        removed: vec![],
      },
    )]);
    id
  }

  /// Close a window. Its data stays queryable until the toolkit is dropped.
  pub fn close_window(&self, window: WindowId) -> ScopeResult<()> {
    {
      let mut graph = self.graph.borrow_mut();
      let data = graph.window_mut(window)?;
      if let Some(slot) = data.slots.get_mut("showing") {
        slot.value = PropValue::Bool(false);
      }
      if !graph.open.contains(&window) {
        return Ok(());
      }
      graph.open.retain(|w| *w != window);
    }
    self.dispatch(vec![
      Self::invalidated(Target::Window(window), "showing"),
      (
        Key::Windows,
        Notification::WindowsChanged {
          added: vec![],
          removed: vec![window],
        },
      ),
    ]);
    Ok(())
  }

  /// Swap the displayed content root of a window.
  pub fn set_root(&self, window: WindowId, root: Option<NodeId>) -> ScopeResult<()> {
    let old = {
      let mut graph = self.graph.borrow_mut();
      if let Some(node) = root {
        graph.node(node)?;
      }
      let data = graph.window_mut(window)?;
      std::mem::replace(&mut data.root, root)
    };
    self.dispatch(vec![(
      Key::Scoped(Target::Window(window), Channel::Root),
      Notification::RootChanged {
        window,
        old,
        new: root,
      },
    )]);
    Ok(())
  }

  pub fn set_window_bounds(&self, window: WindowId, bounds: Bounds) -> ScopeResult<()> {
    let target = Target::Window(window);
    let mut outbox = Outbox::new();
    {
      let mut graph = self.graph.borrow_mut();
      let data = graph.window_mut(window)?;
      for (name, value) in [("x", bounds.x), ("y", bounds.y), ("width", bounds.w), ("height", bounds.h)] {
        if let Some(slot) = data.slots.get_mut(name) {
          if slot.value.as_f64() != Some(value) {
            slot.value = PropValue::Float(value);
            outbox.push(Self::invalidated(target, name));
          }
        }
      }
      for (name, value) in [("width", bounds.w), ("height", bounds.h)] {
        if let Some(slot) = data.scene_slots.get_mut(name) {
          if slot.value.as_f64() != Some(value) {
            slot.value = PropValue::Float(value);
            outbox.push(Self::invalidated(Target::Scene(window), name));
          }
        }
      }
    }
    self.dispatch(outbox);
    Ok(())
  }

  pub fn set_focused(&self, window: WindowId, focused: bool) -> ScopeResult<()> {
    self.set_property(Target::Window(window), "focused", focused)
  }
}

impl Toolkit for MemoryToolkit {
  fn windows(&self) -> Vec<WindowId> {
    self.graph.borrow().open.clone()
  }

  fn window_info(&self, window: WindowId) -> ScopeResult<WindowInfo> {
    let graph = self.graph.borrow();
    let data = graph.window(window)?;
    let f = |name: &str| data.slots.get(name).and_then(|s| s.value.as_f64()).unwrap_or(f64::NAN);
    let b = |name: &str| data.slots.get(name).and_then(|s| s.value.as_bool()).unwrap_or(false);
    Ok(WindowInfo {
      title: data
        .slots
        .get("title")
        .and_then(|s| s.value.as_str())
        .map(str::to_owned),
      window_type: data.window_type,
      bounds: Bounds::new(f("x"), f("y"), f("width"), f("height")),
      focused: b("focused"),
      showing: b("showing"),
      owner: data.owner,
      auto_hide: b("autoHide"),
    })
  }

  fn window_root(&self, window: WindowId) -> Option<NodeId> {
    self.graph.borrow().windows.get(&window).and_then(|w| w.root)
  }

  fn scene_stylesheets(&self, window: WindowId) -> Vec<String> {
    let graph = self.graph.borrow();
    graph
      .value(Target::Scene(window), "stylesheets")
      .and_then(PropValue::as_list)
      .map(<[String]>::to_vec)
      .unwrap_or_default()
  }

  fn scene_user_agent_stylesheet(&self, window: WindowId) -> Option<String> {
    let graph = self.graph.borrow();
    graph
      .value(Target::Scene(window), "userAgentStylesheet")
      .and_then(PropValue::as_str)
      .map(str::to_owned)
  }

  fn hide_window(&self, window: WindowId) -> ScopeResult<()> {
    self.close_window(window)
  }

  fn set_popup_auto_hide(&self, window: WindowId, auto_hide: bool) -> ScopeResult<()> {
    if self.graph.borrow().window(window)?.window_type != WindowType::Popup {
      return Err(ScopeError::NotSupported(format!("window {window} is not a popup")));
    }
    self.set_property(Target::Window(window), "autoHide", auto_hide)
  }

  fn user_agent_stylesheet(&self) -> Option<String> {
    self.user_agent_stylesheet.borrow().clone()
  }

  fn platform_preferences(&self) -> Vec<(String, String)> {
    self.preferences.borrow().clone()
  }

  fn parent(&self, node: NodeId) -> Option<NodeId> {
    self.graph.borrow().nodes.get(&node).and_then(|n| n.parent)
  }

  fn children(&self, node: NodeId) -> Vec<NodeId> {
    self
      .graph
      .borrow()
      .nodes
      .get(&node)
      .map(|n| n.children.clone())
      .unwrap_or_default()
  }

  fn window_of(&self, node: NodeId) -> Option<WindowId> {
    self.graph.borrow().window_of(node)
  }

  fn node_id(&self, node: NodeId) -> Option<String> {
    let graph = self.graph.borrow();
    graph
      .value(Target::Node(node), "id")
      .and_then(PropValue::as_str)
      .map(str::to_owned)
  }

  fn style_classes(&self, node: NodeId) -> Vec<String> {
    self.list(Target::Node(node), "styleClass")
  }

  fn stylesheets(&self, node: NodeId) -> Vec<String> {
    self.list(Target::Node(node), "stylesheets")
  }

  fn node_user_agent_stylesheet(&self, node: NodeId) -> Option<String> {
    let graph = self.graph.borrow();
    graph
      .value(Target::Node(node), "userAgentStylesheet")
      .and_then(PropValue::as_str)
      .map(str::to_owned)
  }

  fn is_visible(&self, node: NodeId) -> bool {
    self.graph.borrow().is_visible(node)
  }

  fn is_mouse_transparent(&self, node: NodeId) -> bool {
    let graph = self.graph.borrow();
    graph
      .value(Target::Node(node), "mouseTransparent")
      .and_then(PropValue::as_bool)
      .unwrap_or(false)
  }

  fn archetypes(&self, node: NodeId) -> Archetypes {
    self
      .graph
      .borrow()
      .nodes
      .get(&node)
      .map_or(Archetypes::empty(), |n| n.kind.archetypes())
  }

  fn layout_bounds(&self, node: NodeId) -> ScopeResult<Bounds> {
    self.graph.borrow().layout_bounds(node)
  }

  fn bounds_in_parent(&self, node: NodeId) -> ScopeResult<Bounds> {
    self.graph.borrow().bounds_in_parent(node)
  }

  fn layout_position(&self, node: NodeId) -> ScopeResult<Point> {
    let graph = self.graph.borrow();
    graph.node(node)?;
    let f = |name: &str| {
      graph
        .value(Target::Node(node), name)
        .and_then(PropValue::as_f64)
        .unwrap_or(0.0)
    };
    Ok(Point::new(f("layoutX"), f("layoutY")))
  }

  fn local_to_scene(&self, node: NodeId, point: Point) -> ScopeResult<Point> {
    Ok(self.graph.borrow().scene_transform(node)?.apply(point))
  }

  fn scene_to_local(&self, node: NodeId, point: Point) -> ScopeResult<Point> {
    Ok(self.graph.borrow().scene_transform(node)?.inverse().apply(point))
  }

  fn baseline_offset(&self, node: NodeId) -> ScopeResult<f64> {
    self.graph.borrow().baseline_offset(node)
  }

  fn contains(&self, node: NodeId, local: Point) -> bool {
    self.graph.borrow().contains(node, local)
  }

  fn computed_sizes(&self, node: NodeId) -> ScopeResult<ComputedSizes> {
    self.graph.borrow().computed_sizes(node)
  }

  fn content_bias(&self, node: NodeId) -> Option<Orientation> {
    self.graph.borrow().content_bias(node)
  }

  fn layout_constraints(&self, node: NodeId) -> Vec<(String, String)> {
    let graph = self.graph.borrow();
    graph.nodes.get(&node).map_or_else(Vec::new, |data| {
      data
        .properties
        .iter()
        .filter(|(key, _)| key.contains("pane-") || key.contains("box-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
    })
  }

  fn accessors(&self, target: Target) -> Vec<String> {
    let graph = self.graph.borrow();
    let Ok(slots) = graph.slots(target) else {
      return Vec::new();
    };
    let mut names: Vec<String> = slots
      .iter()
      .map(|(name, slot)| {
        if slot.observable {
          format!("{name}{PROPERTY_SUFFIX}")
        } else {
          getter_name(name)
        }
      })
      .collect();
    if matches!(target, Target::Node(_)) {
      names.extend(DERIVED_NODE_PROPERTIES.iter().map(|n| format!("{n}{PROPERTY_SUFFIX}")));
    }
    names
  }

  fn observable(&self, target: Target, accessor: &str) -> ScopeResult<ObservableRef> {
    let name = accessor
      .strip_suffix(PROPERTY_SUFFIX)
      .ok_or_else(|| ScopeError::NotSupported(format!("'{accessor}' is not a property accessor")))?;
    let graph = self.graph.borrow();
    let slots = graph.slots(target)?;
    if matches!(target, Target::Node(_)) && DERIVED_NODE_PROPERTIES.contains(&name) {
      return Ok(ObservableRef {
        target,
        name: name.to_owned(),
        kind: ObservableType::ReadOnly,
      });
    }
    let slot = slots
      .get(name)
      .filter(|slot| slot.observable)
      .ok_or_else(|| ScopeError::NotSupported(format!("no accessor '{accessor}' on {target}")))?;
    if let Some(reason) = &slot.denied {
      return Err(ScopeError::AccessDenied {
        accessor: accessor.to_owned(),
        reason: reason.clone(),
      });
    }
    Ok(ObservableRef {
      target,
      name: name.to_owned(),
      kind: slot.kind,
    })
  }

  fn property(&self, target: Target, name: &str) -> Option<PropertySnapshot> {
    let graph = self.graph.borrow();
    if let Target::Node(node) = target {
      let derived = match name {
        "layoutBounds" => Some(graph.layout_bounds(node)),
        "boundsInParent" => Some(graph.bounds_in_parent(node)),
        _ => None,
      };
      if let Some(bounds) = derived {
        return bounds.ok().map(|b| PropertySnapshot {
          value: PropValue::Bounds(b),
          kind: ObservableType::ReadOnly,
        });
      }
    }
    let slot = graph.slots(target).ok()?.get(name)?;
    Some(PropertySnapshot {
      value: slot.value.clone(),
      kind: slot.kind,
    })
  }

  fn type_info(&self, target: Target) -> ScopeResult<Arc<TypeInfo>> {
    let graph = self.graph.borrow();
    match target {
      Target::Node(id) => Ok(Arc::clone(&graph.node(id)?.type_info)),
      Target::Window(id) => Ok(Arc::clone(&graph.window(id)?.type_info)),
      Target::Scene(id) => {
        graph.window(id)?;
        self
          .types
          .borrow()
          .get("scene.Scene")
          .ok_or_else(|| ScopeError::NotSupported("scene type".into()))
      }
    }
  }

  fn type_by_name(&self, name: &str) -> Option<Arc<TypeInfo>> {
    self.types.borrow().get(name)
  }

  fn subscribe(&self, target: Target, channel: Channel, listener: Listener) -> ScopeResult<SubscriptionId> {
    {
      let graph = self.graph.borrow();
      if !graph.exists(target) {
        return Err(match target {
          Target::Node(id) => ScopeError::NodeNotFound(id),
          Target::Window(id) | Target::Scene(id) => ScopeError::WindowNotFound(id),
        });
      }
      let valid = match (&channel, target) {
        (Channel::Property(_), _) => true,
        (Channel::Root | Channel::Pointer, Target::Window(_)) => true,
        (
          Channel::Children | Channel::Visibility | Channel::AnyEvent | Channel::StyleClass,
          Target::Node(_),
        ) => true,
        _ => false,
      };
      if !valid {
        return Err(ScopeError::NotSupported(format!("{channel:?} on {target}")));
      }
    }
    Ok(self.subscriptions.borrow_mut().insert(Key::Scoped(target, channel), listener))
  }

  fn subscribe_windows(&self, listener: Listener) -> SubscriptionId {
    self.subscriptions.borrow_mut().insert(Key::Windows, listener)
  }

  fn unsubscribe(&self, id: SubscriptionId) -> bool {
    self.subscriptions.borrow_mut().remove(id)
  }

  fn subscription_count(&self) -> usize {
    self.subscriptions.borrow().by_id.len()
  }

  fn dispatcher(&self) -> Dispatcher {
    self.dispatcher.clone()
  }
}

impl MemoryToolkit {
  fn list(&self, target: Target, name: &str) -> Vec<String> {
    let graph = self.graph.borrow();
    graph
      .value(target, name)
      .and_then(PropValue::as_list)
      .map(<[String]>::to_vec)
      .unwrap_or_default()
  }

  /// Whether a node satisfies an archetype.
  pub fn is(&self, node: NodeId, archetype: Archetypes) -> bool {
    self.archetypes(node).contains(archetype)
  }
}

/// `styleClass` → `getStyleClass`.
fn getter_name(name: &str) -> String {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
    None => "get".to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn recorder() -> (Rc<RefCell<Vec<Notification>>>, Listener) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let listener: Listener = Rc::new(move |n: &Notification| sink.borrow_mut().push(n.clone()));
    (log, listener)
  }

  fn scene() -> (Rc<MemoryToolkit>, WindowId, NodeId) {
    let tk = MemoryToolkit::new();
    let window = tk.open_window(WindowType::Stage, "Main", Bounds::new(0.0, 0.0, 800.0, 600.0));
    let root = tk.create_node(NodeKind::Pane);
    tk.set_size(root, 800.0, 600.0).unwrap();
    tk.set_root(window, Some(root)).unwrap();
    (tk, window, root)
  }

  mod structure {
    use super::*;

    #[test]
    fn add_child_notifies_children_listeners() {
      let (tk, _, root) = scene();
      let (log, listener) = recorder();
      tk.subscribe(Target::Node(root), Channel::Children, listener).unwrap();
      let child = tk.create_node(NodeKind::Button);
      tk.add_child(root, child).unwrap();
      assert_eq!(
        log.borrow().as_slice(),
        &[Notification::ChildrenChanged {
          parent: root,
          removed: vec![],
          added: vec![child],
        }]
      );
      assert_eq!(tk.parent(child), Some(root));
    }

    #[test]
    fn moving_a_child_notifies_old_parent() {
      let (tk, _, root) = scene();
      let a = tk.create_node(NodeKind::Pane);
      let b = tk.create_node(NodeKind::Pane);
      let child = tk.create_node(NodeKind::Rectangle);
      tk.add_child(root, a).unwrap();
      tk.add_child(root, b).unwrap();
      tk.add_child(a, child).unwrap();
      let (log, listener) = recorder();
      tk.subscribe(Target::Node(a), Channel::Children, listener).unwrap();
      tk.add_child(b, child).unwrap();
      assert!(matches!(
        log.borrow().first(),
        Some(Notification::ChildrenChanged { removed, .. }) if removed == &vec![child]
      ));
      assert_eq!(tk.children(b), vec![child]);
    }

    #[test]
    fn set_children_is_one_batch() {
      let (tk, _, root) = scene();
      let a = tk.create_node(NodeKind::Pane);
      let b = tk.create_node(NodeKind::Pane);
      tk.add_child(root, a).unwrap();
      let (log, listener) = recorder();
      tk.subscribe(Target::Node(root), Channel::Children, listener).unwrap();
      tk.set_children(root, &[b]).unwrap();
      assert_eq!(
        log.borrow().as_slice(),
        &[Notification::ChildrenChanged {
          parent: root,
          removed: vec![a],
          added: vec![b],
        }]
      );
    }

    #[test]
    fn window_of_follows_root() {
      let (tk, window, root) = scene();
      let child = tk.create_node(NodeKind::Label);
      tk.add_child(root, child).unwrap();
      assert_eq!(tk.window_of(child), Some(window));
      tk.remove_child(root, child).unwrap();
      assert_eq!(tk.window_of(child), None);
    }
  }

  mod subscriptions {
    use super::*;

    #[test]
    fn unsubscribe_stops_delivery() {
      let (tk, _, root) = scene();
      let (log, listener) = recorder();
      let id = tk
        .subscribe(Target::Node(root), Channel::Property("opacity".into()), listener)
        .unwrap();
      tk.set_property(Target::Node(root), "opacity", 0.5).unwrap();
      assert!(tk.unsubscribe(id));
      assert!(!tk.unsubscribe(id));
      tk.set_property(Target::Node(root), "opacity", 0.7).unwrap();
      assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
      let (tk, _, root) = scene();
      let slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
      let weak = Rc::downgrade(&tk);
      let own = Rc::clone(&slot);
      let listener: Listener = Rc::new(move |_| {
        if let (Some(tk), Some(id)) = (weak.upgrade(), own.get()) {
          tk.unsubscribe(id);
        }
      });
      let id = tk
        .subscribe(Target::Node(root), Channel::Visibility, listener)
        .unwrap();
      slot.set(Some(id));
      tk.set_visible(root, false).unwrap();
      assert_eq!(tk.subscription_count(), 0);
    }

    #[test]
    fn invalid_channel_is_rejected() {
      let (tk, _, root) = scene();
      let (_, listener) = recorder();
      assert!(tk.subscribe(Target::Node(root), Channel::Root, listener).is_err());
    }

    #[test]
    fn missing_node_is_rejected() {
      let (tk, _, _) = scene();
      let (_, listener) = recorder();
      let err = tk
        .subscribe(Target::Node(NodeId(999)), Channel::Children, listener)
        .unwrap_err();
      assert!(matches!(err, ScopeError::NodeNotFound(NodeId(999))));
    }

    #[test]
    fn layout_change_invalidates_bounds() {
      let (tk, _, root) = scene();
      let child = tk.create_node(NodeKind::Rectangle);
      tk.add_child(root, child).unwrap();
      let (log, listener) = recorder();
      tk.subscribe(Target::Node(child), Channel::Property("boundsInParent".into()), listener)
        .unwrap();
      tk.set_layout(child, 5.0, 5.0).unwrap();
      assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn events_pass_through_ancestors() {
      let (tk, _, root) = scene();
      let child = tk.create_node(NodeKind::Button);
      tk.add_child(root, child).unwrap();
      let (log, listener) = recorder();
      tk.subscribe(Target::Node(root), Channel::AnyEvent, Rc::clone(&listener)).unwrap();
      tk.subscribe(Target::Node(child), Channel::AnyEvent, listener).unwrap();
      tk.fire_event(child, "ACTION", "pressed").unwrap();
      let nodes: Vec<NodeId> = log
        .borrow()
        .iter()
        .filter_map(|n| match n {
          Notification::Event { node, .. } => Some(*node),
          _ => None,
        })
        .collect();
      assert_eq!(nodes, vec![root, child]);
    }
  }

  mod properties {
    use super::*;

    #[test]
    fn accessors_follow_naming_convention() {
      let (tk, _, root) = scene();
      let accessors = tk.accessors(Target::Node(root));
      assert!(accessors.contains(&"opacityProperty".to_owned()));
      assert!(accessors.contains(&"getStyleClass".to_owned()));
      assert!(accessors.contains(&"layoutBoundsProperty".to_owned()));
    }

    #[test]
    fn denied_accessor_fails() {
      let (tk, _, root) = scene();
      tk.deny_access(Target::Node(root), "clip", "module not open").unwrap();
      let err = tk.observable(Target::Node(root), "clipProperty").unwrap_err();
      assert!(matches!(err, ScopeError::AccessDenied { .. }));
    }

    #[test]
    fn plain_accessor_is_not_observable() {
      let (tk, _, root) = scene();
      assert!(tk.observable(Target::Node(root), "getStyleClass").is_err());
    }

    #[test]
    fn bound_property_reports_kind() {
      let (tk, _, root) = scene();
      tk.bind(Target::Node(root), "opacity").unwrap();
      let observable = tk.observable(Target::Node(root), "opacityProperty").unwrap();
      assert_eq!(observable.kind, ObservableType::Bound);
    }

    #[test]
    fn window_info_reflects_bounds() {
      let (tk, window, _) = scene();
      tk.set_window_bounds(window, Bounds::new(10.0, 20.0, 300.0, 200.0)).unwrap();
      let info = tk.window_info(window).unwrap();
      assert_eq!(info.bounds, Bounds::new(10.0, 20.0, 300.0, 200.0));
      assert_eq!(info.title.as_deref(), Some("Main"));
      assert!(info.showing);
    }

    #[test]
    fn getter_name_capitalizes() {
      assert_eq!(getter_name("styleClass"), "getStyleClass");
    }
  }

  mod windows {
    use super::*;

    #[test]
    fn close_removes_from_open_list() {
      let (tk, window, _) = scene();
      let (log, listener) = recorder();
      tk.subscribe_windows(listener);
      tk.close_window(window).unwrap();
      assert!(tk.windows().is_empty());
      assert_eq!(
        log.borrow().as_slice(),
        &[Notification::WindowsChanged {
          added: vec![],
          removed: vec![window],
        }]
      );
      assert!(!tk.window_info(window).unwrap().showing);
    }

    #[test]
    fn popup_auto_hide_only_for_popups() {
      let (tk, window, root) = scene();
      assert!(tk.set_popup_auto_hide(window, false).is_err());
      let popup = tk.open_popup(root, Bounds::new(0.0, 0.0, 10.0, 10.0));
      assert!(tk.window_info(popup).unwrap().auto_hide);
      tk.set_popup_auto_hide(popup, false).unwrap();
      assert!(!tk.window_info(popup).unwrap().auto_hide);
    }
  }
}
