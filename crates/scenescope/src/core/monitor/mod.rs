/*!
Window monitor - observes one window and reports its scene on the bus.

# Module Structure

- `mod.rs` - lifecycle, root changes, host notification routing, queries
- `instrumentation.rs` - per-node subscription registry
- `selection.rs` - window/node selection and highlight tracking
- `hover.rs` - pointer events and inspect-mode hover

Every host subscription shares one listener that routes the notification
back into the monitor. Notifications arriving after `stop` are ignored.
*/

mod hover;
mod instrumentation;
mod selection;

pub use selection::Selection;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use instrumentation::Branches;

use super::bounds_pane::BoundsPane;
use super::inspect::InspectOverlay;
use super::options::ConnectorOptions;
use super::{tree, Ctx};
use crate::attributes::AttributeListener;
use crate::platform::{Channel, Listener, Notification, SubscriptionId};
use crate::types::{
  AttributeCategory, ConnectorEvent, Element, EventSource, HighlightOptions, InspectSnapshot, NodeId,
  OverlaySnapshot, Point, ScopeResult, Size, StyledElements, Target, Uid, WindowId,
};

/// Window properties reported through `WindowProperties` events.
const WINDOW_PROPERTIES: [&str; 5] = ["x", "y", "width", "height", "focused"];

/// Monitor lifecycle. A stopped monitor cannot be started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
  Idle,
  Started,
  Stopped,
}

struct Inner {
  ctx: Ctx,
  window: WindowId,
  options: Rc<Cell<ConnectorOptions>>,
  state: MonitorState,
  root: Option<NodeId>,
  /// Shared by every host subscription of this monitor.
  listener: Listener,
  window_subscriptions: Vec<SubscriptionId>,
  branches: Branches,
  selection: Selection,
  bounds_subscriptions: Vec<SubscriptionId>,
  /// Set while the highlight is being re-placed after a bounds change.
  tracking_bounds: bool,
  hovered: Option<NodeId>,
  bounds_pane: BoundsPane,
  inspect: InspectOverlay,
  attributes: AttributeListener,
}

/// Observes one window. Clone is cheap (Rc bump).
#[derive(Clone)]
pub struct WindowMonitor {
  inner: Rc<RefCell<Inner>>,
  ctx: Ctx,
}

impl std::fmt::Debug for WindowMonitor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WindowMonitor")
      .field("source", &self.ctx.source.to_log_string())
      .field("state", &self.state())
      .finish_non_exhaustive()
  }
}

impl WindowMonitor {
  pub(crate) fn new(ctx: Ctx, options: Rc<Cell<ConnectorOptions>>) -> Self {
    let inner = Rc::new_cyclic(|this: &Weak<RefCell<Inner>>| {
      let this = this.clone();
      let listener: Listener = Rc::new(move |notification: &Notification| route(&this, notification));
      RefCell::new(Inner {
        window: ctx.source.uid,
        options,
        state: MonitorState::Idle,
        root: None,
        listener,
        window_subscriptions: Vec::new(),
        branches: Branches::default(),
        selection: Selection::None,
        bounds_subscriptions: Vec::new(),
        tracking_bounds: false,
        hovered: None,
        bounds_pane: BoundsPane::new(),
        inspect: InspectOverlay::new(),
        attributes: AttributeListener::new(&ctx),
        ctx: ctx.clone(),
      })
    });
    Self { inner, ctx }
  }

  pub fn window(&self) -> WindowId {
    self.ctx.source.uid
  }

  pub fn source(&self) -> &EventSource {
    &self.ctx.source
  }

  pub fn state(&self) -> MonitorState {
    self.read(|inner| inner.state).unwrap_or(MonitorState::Started)
  }

  /// Subscribe to the window, instrument its tree and report it.
  pub fn start(&self) {
    self.update(Inner::start);
  }

  /// Tear everything down. Idempotent.
  pub fn stop(&self) {
    self.update(Inner::stop);
  }

  /// Re-run the root change sequence for the current root.
  pub fn refresh_root(&self) {
    self.update(|inner| {
      let root = inner.root;
      inner.change_root(root, true);
    });
  }

  /// Inspect mode was toggled on the connector.
  pub(crate) fn inspect_mode_changed(&self, enabled: bool) {
    self.update(|inner| {
      if !enabled {
        inner.clear_hover();
      }
      let root = inner.root;
      inner.change_root(root, true);
    });
  }

  pub fn root(&self) -> Option<NodeId> {
    self.read(|inner| inner.root).flatten()
  }

  pub fn select_window(&self) {
    self.update(Inner::select_window);
  }

  pub fn select_node(&self, uid: Uid, options: Option<HighlightOptions>) {
    self.update(|inner| inner.select_node(uid, options));
  }

  pub fn clear_selection(&self) {
    self.update(Inner::clear_selection);
  }

  pub fn selection(&self) -> Selection {
    self.read(|inner| inner.selection).unwrap_or_default()
  }

  /// Reload every tracker, one category, or one attribute of a category.
  pub fn reload_attributes(&self, category: Option<AttributeCategory>, name: Option<&str>) {
    self.update(|inner| inner.attributes.reload(category, name));
  }

  /// Current target of each attribute tracker.
  pub fn attribute_targets(&self) -> Vec<(AttributeCategory, Option<Target>)> {
    self
      .read(|inner| inner.attributes.tracker_targets())
      .unwrap_or_default()
  }

  /// Ask the host to hide the window.
  ///
  /// The host reports the window as gone synchronously, so this must run
  /// without any monitor borrow held.
  pub fn hide_window(&self) -> ScopeResult<()> {
    self.ctx.host.hide_window(self.window())
  }

  /// Window properties and the nodes declaring their own stylesheets.
  pub fn styled_elements(&self) -> ScopeResult<StyledElements> {
    let window = self.ctx.window_element()?;
    let mut styled = Vec::new();
    if let Some(root) = self.root() {
      tree::collect_styled(self.ctx.host.as_ref(), root, &mut styled);
    }
    let nodes = styled
      .into_iter()
      .filter_map(|node| self.ctx.node_element(node).ok())
      .collect();
    Ok(StyledElements { window, nodes })
  }

  /// Whether `uri` is used by the scene or any node of the tree.
  pub fn contains_stylesheet(&self, uri: &str) -> bool {
    let host = self.ctx.host.as_ref();
    let window = self.window();
    if host.scene_user_agent_stylesheet(window).as_deref() == Some(uri)
      || host.scene_stylesheets(window).iter().any(|sheet| sheet == uri)
    {
      return true;
    }
    self
      .root()
      .is_some_and(|root| tree::contains_stylesheet(host, root, uri))
  }

  pub fn find_node(&self, uid: Uid) -> Option<NodeId> {
    let root = self.root()?;
    tree::find_node(self.ctx.host.as_ref(), root, uid)
  }

  pub fn overlay(&self) -> OverlaySnapshot {
    self
      .read(|inner| inner.bounds_pane.snapshot())
      .unwrap_or_else(|| BoundsPane::new().snapshot())
  }

  pub fn inspect_overlay(&self) -> InspectSnapshot {
    self
      .read(|inner| inner.inspect.snapshot())
      .unwrap_or_else(|| InspectOverlay::new().snapshot())
  }

  /// Number of nodes currently instrumented.
  pub fn instrumented_count(&self) -> usize {
    self.read(|inner| inner.branches.len()).unwrap_or_default()
  }

  pub fn is_instrumented(&self, node: NodeId) -> bool {
    self
      .read(|inner| inner.branches.contains(node))
      .unwrap_or_default()
  }

  /// Run `f` under a mutable borrow, then deliver the queued events.
  fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Option<R> {
    let result = match self.inner.try_borrow_mut() {
      Ok(mut inner) => Some(f(&mut inner)),
      Err(_) => {
        log::warn!("{}: monitor busy, operation dropped", self.ctx.source.to_log_string());
        None
      }
    };
    self.ctx.flush();
    result
  }

  fn read<R>(&self, f: impl FnOnce(&Inner) -> R) -> Option<R> {
    self.inner.try_borrow().ok().map(|inner| f(&inner))
  }
}

/// Host notification entry point.
fn route(this: &Weak<RefCell<Inner>>, notification: &Notification) {
  let Some(inner) = this.upgrade() else {
    return;
  };
  let ctx = {
    let Ok(mut inner) = inner.try_borrow_mut() else {
      log::warn!("Monitor busy, dropping {notification:?}");
      return;
    };
    if inner.state != MonitorState::Started {
      return;
    }
    inner.handle(notification);
    inner.ctx.clone()
  };
  ctx.flush();
}

impl Inner {
  fn start(&mut self) {
    match self.state {
      MonitorState::Idle => {}
      MonitorState::Started => {
        log::warn!("{}: monitor already started", self.ctx.source.to_log_string());
        return;
      }
      MonitorState::Stopped => {
        log::warn!("{}: a stopped monitor cannot restart", self.ctx.source.to_log_string());
        return;
      }
    }
    log::debug!("Starting monitor {}", self.ctx.source.to_log_string());
    self.state = MonitorState::Started;
    self.watch_window();
    let root = self.ctx.host.window_root(self.window);
    self.change_root(root, true);
    self.emit_window_properties();
  }

  fn stop(&mut self) {
    match self.state {
      MonitorState::Started => {}
      MonitorState::Idle => {
        self.state = MonitorState::Stopped;
        return;
      }
      MonitorState::Stopped => return,
    }
    log::debug!("Stopping monitor {}", self.ctx.source.to_log_string());
    self.clear_selection();
    self.clear_hover();
    self.bounds_pane.hide_all();
    self.bounds_pane.detach();
    let host = Rc::clone(&self.ctx.host);
    if let Some(root) = self.root.take() {
      self.branches.deinstrument(host.as_ref(), root);
    }
    for id in self.window_subscriptions.drain(..) {
      host.unsubscribe(id);
    }
    self.attributes.release();
    self.state = MonitorState::Stopped;
  }

  fn watch_window(&mut self) {
    let host = Rc::clone(&self.ctx.host);
    let target = Target::Window(self.window);
    let channels = WINDOW_PROPERTIES
      .iter()
      .map(|name| Channel::Property((*name).to_owned()))
      .chain([Channel::Root, Channel::Pointer]);
    for channel in channels {
      match host.subscribe(target, channel, Rc::clone(&self.listener)) {
        Ok(id) => self.window_subscriptions.push(id),
        Err(e) => self.ctx.emit_error(&e),
      }
    }
  }

  /// Swap the instrumented root. `force` re-runs the sequence for an
  /// unchanged root.
  fn change_root(&mut self, new: Option<NodeId>, force: bool) {
    if self.state != MonitorState::Started {
      return;
    }
    let old = self.root;
    if !force && old == new {
      return;
    }
    log::debug!(
      "{}: root {old:?} -> {new:?}",
      self.ctx.source.to_log_string()
    );

    let host = Rc::clone(&self.ctx.host);
    if let Some(old) = old {
      self.branches.deinstrument(host.as_ref(), old);
    }
    self.root = new;
    let mut errors = Vec::new();
    if let Some(new) = new {
      self.branches.instrument(host.as_ref(), new, &self.listener, &mut errors);
    }
    for e in &errors {
      self.ctx.emit_error(e);
    }

    self.bounds_pane.attach(host.as_ref(), new);
    self.clear_hover();
    if let Some(selected) = self.selection.node() {
      let still_shown = new.is_some_and(|root| tree::find_node(host.as_ref(), root, selected.into()).is_some());
      if still_shown {
        self.highlight();
      } else {
        self.clear_selection();
      }
    }
    self.notify_root_changed();
  }

  fn notify_root_changed(&self) {
    let Some(root) = self.root else {
      log::debug!("{}: window has no root", self.ctx.source.to_log_string());
      return;
    };
    let event = self.ctx.window_element().and_then(|element| {
      Ok(ConnectorEvent::RootChanged {
        source: self.ctx.source.clone(),
        element,
        tree: self.ctx.tree(root)?,
      })
    });
    match event {
      Ok(event) => self.ctx.emit(event),
      Err(e) => self.ctx.emit_error(&e),
    }
  }

  fn handle(&mut self, notification: &Notification) {
    match notification {
      Notification::Invalidated {
        target: Target::Window(_),
        ..
      } => self.emit_window_properties(),
      Notification::Invalidated {
        target: Target::Node(node),
        ..
      } => self.on_selected_bounds_changed(*node),
      Notification::RootChanged { new, .. } => self.change_root(*new, false),
      Notification::ChildrenChanged {
        parent,
        removed,
        added,
      } => self.on_children_changed(*parent, removed, added),
      Notification::VisibilityChanged { node, visible } => {
        let visible = *visible;
        self.emit_for(*node, |source, element| ConnectorEvent::NodeVisibility {
          source,
          element,
          visible,
        });
      }
      Notification::StyleClassChanged { node } => {
        let style_class = self.ctx.host.style_classes(*node);
        self.emit_for(*node, |source, element| ConnectorEvent::NodeStyleClass {
          source,
          element,
          style_class,
        });
      }
      Notification::Event {
        node,
        event_type,
        description,
      } => self.emit_for(*node, |source, element| ConnectorEvent::Forwarded {
        source,
        element,
        event_type: event_type.clone(),
        value: description.clone(),
      }),
      Notification::Pointer { kind, position, .. } => self.on_pointer(*kind, *position),
      Notification::Invalidated {
        target: Target::Scene(_),
        ..
      }
      | Notification::WindowsChanged { .. } => {}
    }
  }

  /// One child list batch. Removals are processed before additions.
  fn on_children_changed(&mut self, parent: NodeId, removed: &[NodeId], added: &[NodeId]) {
    let host = Rc::clone(&self.ctx.host);
    for node in removed {
      if tree::is_auxiliary(host.as_ref(), *node) {
        continue;
      }
      let detached = self.branches.deinstrument(host.as_ref(), *node);
      let inside = |n: NodeId| n == *node || detached.contains(&n);
      if self.selection.node().is_some_and(inside) {
        self.clear_selection();
      }
      if self.hovered.is_some_and(inside) {
        self.clear_hover();
      }
      match self.ctx.node_element(*node) {
        Ok(element) => self.ctx.emit(ConnectorEvent::NodeRemoved {
          source: self.ctx.source.clone(),
          element,
        }),
        Err(e) => log::debug!("Removed node#{node} cannot be resolved: {e}"),
      }
    }

    let mut errors = Vec::new();
    for node in added {
      if tree::is_auxiliary(host.as_ref(), *node) {
        continue;
      }
      self.branches.instrument(host.as_ref(), *node, &self.listener, &mut errors);
      self.emit_for(*node, |source, element| ConnectorEvent::NodeAdded { source, element });
    }
    for e in &errors {
      self.ctx.emit_error(e);
    }
    self.branches.set_children(parent, tree::children(host.as_ref(), parent));
  }

  fn emit_window_properties(&self) {
    match self.ctx.host.window_info(self.window) {
      Ok(info) => self.ctx.emit(ConnectorEvent::WindowProperties {
        source: self.ctx.source.clone(),
        position: Point::new(info.bounds.x, info.bounds.y),
        size: Size::new(info.bounds.w, info.bounds.h),
        focused: info.focused,
      }),
      Err(e) => log::warn!("{}: {e}", self.ctx.source.to_log_string()),
    }
  }

  fn emit_for(&self, node: NodeId, event: impl FnOnce(EventSource, Element) -> ConnectorEvent) {
    match self.ctx.node_element(node) {
      Ok(element) => self.ctx.emit(event(self.ctx.source.clone(), element)),
      Err(e) => log::warn!(
        "{}: cannot resolve node#{node}: {e}",
        self.ctx.source.to_log_string()
      ),
    }
  }
}
