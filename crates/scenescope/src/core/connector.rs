/*!
Connector - one monitor per window, plus the operations UI and CLI layers call.

Every operation addressed to a window uid is a logged no-op when no monitor
exists for that window. Errors never escape: they are logged, or reported as
`Exception` events on the bus.

# Example

```ignore
use scenescope::{Connector, EventType, MemoryToolkit};

let toolkit = MemoryToolkit::new();
let connector = Connector::builder(toolkit.clone(), None)
    .application("demo")
    .inspect_mode(true)
    .build();

connector.bus().subscribe(EventType::RootChanged, |event| {
    println!("{}", event.to_log_string());
});
connector.start();
```
*/

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::bus::EventBus;
use super::context::Outbox;
use super::monitor::{Selection, WindowMonitor};
use super::options::ConnectorOptions;
use super::resource::{FsResourceAccessor, ResourceAccessor};
use super::{tree, Ctx};
use crate::class_info::ClassInfoCache;
use crate::platform::{Listener, Notification, SubscriptionId, Toolkit};
use crate::types::{
  AttributeCategory, ClassInfo, ConnectorEvent, Element, EventSource, HighlightOptions, InspectSnapshot,
  OverlaySnapshot, ScopeError, StyledElements, WindowId, WindowType,
};

/// Builder for a [`Connector`].
///
/// # Example
///
/// ```ignore
/// let connector = Connector::builder(toolkit, Some(main_window))
///     .application("demo")
///     .prevent_popup_auto_hide(true)
///     .build();
/// ```
#[must_use = "Builder does nothing until .build() is called"]
pub struct ConnectorBuilder {
  host: Rc<dyn Toolkit>,
  primary_window: Option<WindowId>,
  application: Option<String>,
  options: ConnectorOptions,
  classes: ClassInfoCache,
  resources: Box<dyn ResourceAccessor>,
}

impl std::fmt::Debug for ConnectorBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ConnectorBuilder")
      .field("primary_window", &self.primary_window)
      .field("application", &self.application)
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

impl ConnectorBuilder {
  /// Application name carried by every event source.
  pub fn application(mut self, name: impl Into<String>) -> Self {
    self.application = Some(name.into());
    self
  }

  /// Enable hover highlighting and press-to-select. Default: false.
  pub fn inspect_mode(mut self, enabled: bool) -> Self {
    self.options.inspect_mode = enabled;
    self
  }

  /// Hit test mouse transparent nodes too. Default: false.
  pub fn ignore_mouse_transparent(mut self, ignore: bool) -> Self {
    self.options.ignore_mouse_transparent = ignore;
    self
  }

  /// Keep popups open when they lose focus. Default: false.
  pub fn prevent_popup_auto_hide(mut self, prevent: bool) -> Self {
    self.options.prevent_popup_auto_hide = prevent;
    self
  }

  /// Share a class-info cache with other connectors.
  pub fn class_cache(mut self, classes: ClassInfoCache) -> Self {
    self.classes = classes;
    self
  }

  /// Where stylesheet resources are read from. Default: the local file system.
  pub fn resource_accessor(mut self, resources: impl ResourceAccessor + 'static) -> Self {
    self.resources = Box::new(resources);
    self
  }

  /// Build the connector. Nothing is observed until [`Connector::start`].
  #[must_use = "Connector must be stored and started to observe anything"]
  pub fn build(self) -> Connector {
    let bus = EventBus::new(self.host.dispatcher());
    Connector {
      shared: Rc::new(Shared {
        host: self.host,
        primary_window: self.primary_window,
        application: self.application,
        options: Rc::new(Cell::new(self.options)),
        classes: self.classes,
        resources: self.resources,
        bus,
        outbox: Outbox::default(),
        monitors: RefCell::new(HashMap::new()),
        windows_subscription: Cell::new(None),
      }),
    }
  }
}

struct Shared {
  host: Rc<dyn Toolkit>,
  primary_window: Option<WindowId>,
  application: Option<String>,
  options: Rc<Cell<ConnectorOptions>>,
  classes: ClassInfoCache,
  resources: Box<dyn ResourceAccessor>,
  bus: EventBus,
  outbox: Outbox,
  monitors: RefCell<HashMap<WindowId, WindowMonitor>>,
  windows_subscription: Cell<Option<SubscriptionId>>,
}

/// Entry point for observing every window of a toolkit.
///
/// Clone is cheap (Rc bump). UI thread only.
#[derive(Clone)]
pub struct Connector {
  shared: Rc<Shared>,
}

impl std::fmt::Debug for Connector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Connector")
      .field("application", &self.shared.application)
      .field("monitors", &self.shared.monitors.borrow().len())
      .field("options", &self.shared.options.get())
      .finish_non_exhaustive()
  }
}

impl Connector {
  /// Create a builder. `primary_window` is flagged as the primary stage in
  /// event sources.
  pub fn builder(toolkit: Rc<dyn Toolkit>, primary_window: Option<WindowId>) -> ConnectorBuilder {
    ConnectorBuilder {
      host: toolkit,
      primary_window,
      application: None,
      options: ConnectorOptions::default(),
      classes: ClassInfoCache::new(),
      resources: Box::new(FsResourceAccessor),
    }
  }

  // === Lifecycle ===

  /// Monitor every open window and follow windows opening and closing.
  pub fn start(&self) {
    if self.is_started() {
      log::warn!("Connector already started");
      return;
    }
    let this = Rc::downgrade(&self.shared);
    let listener: Listener = Rc::new(move |notification: &Notification| {
      if let Notification::WindowsChanged { added, removed } = notification {
        if let Some(shared) = Weak::upgrade(&this) {
          Connector { shared }.on_windows_changed(added, removed);
        }
      }
    });
    let id = self.shared.host.subscribe_windows(listener);
    self.shared.windows_subscription.set(Some(id));
    for window in self.shared.host.windows() {
      self.add_window(window);
    }
    log::debug!("Connector started with {} monitor(s)", self.shared.monitors.borrow().len());
  }

  /// Stop every monitor and stop following windows.
  pub fn stop(&self) {
    if let Some(id) = self.shared.windows_subscription.take() {
      self.shared.host.unsubscribe(id);
    }
    let monitors: Vec<WindowMonitor> = self.shared.monitors.borrow_mut().drain().map(|(_, m)| m).collect();
    for monitor in monitors {
      monitor.stop();
    }
  }

  pub fn is_started(&self) -> bool {
    self.shared.windows_subscription.get().is_some()
  }

  fn on_windows_changed(&self, added: &[WindowId], removed: &[WindowId]) {
    for window in removed {
      self.remove_window(*window);
    }
    for window in added {
      self.add_window(*window);
    }
  }

  fn add_window(&self, window: WindowId) {
    if self.is_auxiliary_window(window) {
      log::debug!("Skipping auxiliary window {window}");
      return;
    }
    let shared = &self.shared;
    let ctx = Ctx {
      host: Rc::clone(&shared.host),
      classes: shared.classes.clone(),
      source: EventSource::new(
        shared.application.clone(),
        window,
        shared.primary_window == Some(window),
      ),
      bus: shared.bus.clone(),
      outbox: shared.outbox.clone(),
    };
    let monitor = WindowMonitor::new(ctx, Rc::clone(&shared.options));
    let previous = shared.monitors.borrow_mut().insert(window, monitor.clone());
    if let Some(previous) = previous {
      log::error!("Window {window} was already monitored, replacing its monitor");
      previous.stop();
    }
    if shared.options.get().prevent_popup_auto_hide {
      self.apply_auto_hide(window, false);
    }
    monitor.start();
  }

  fn remove_window(&self, window: WindowId) {
    let Some(monitor) = self.shared.monitors.borrow_mut().remove(&window) else {
      return;
    };
    monitor.stop();
    self.emit(ConnectorEvent::WindowClosed {
      source: monitor.source().clone(),
    });
  }

  /// Windows created by scenescope itself: an auxiliary root, or a popup
  /// owned by an auxiliary node.
  fn is_auxiliary_window(&self, window: WindowId) -> bool {
    let host = self.shared.host.as_ref();
    if host.window_root(window).is_some_and(|root| tree::is_auxiliary(host, root)) {
      return true;
    }
    host
      .window_info(window)
      .ok()
      .and_then(|info| info.owner)
      .is_some_and(|owner| tree::is_auxiliary(host, owner))
  }

  // === Window operations ===

  /// Monitor of `window`, with a warning when there is none.
  pub fn monitor(&self, window: WindowId) -> Option<WindowMonitor> {
    let monitor = self.shared.monitors.borrow().get(&window).cloned();
    if monitor.is_none() {
      log::warn!("No monitor for window {window}");
    }
    monitor
  }

  pub fn select_window(&self, window: WindowId) {
    if let Some(monitor) = self.monitor(window) {
      monitor.select_window();
    }
  }

  /// Select `element` in `window`. `None` options mean the default highlight.
  pub fn select_node(&self, window: WindowId, element: &Element, options: Option<HighlightOptions>) {
    if !element.is_node() {
      log::warn!("{}", ScopeError::NotANode(element.uid));
      return;
    }
    if let Some(monitor) = self.monitor(window) {
      monitor.select_node(element.uid, options);
    }
  }

  pub fn clear_selection(&self, window: WindowId) {
    if let Some(monitor) = self.monitor(window) {
      monitor.clear_selection();
    }
  }

  pub fn selection(&self, window: WindowId) -> Option<Selection> {
    self.monitor(window).map(|monitor| monitor.selection())
  }

  /// Reload attributes of the current selection: every category, one
  /// category, or one attribute of a category.
  pub fn reload_attributes(&self, window: WindowId, category: Option<AttributeCategory>, name: Option<&str>) {
    if let Some(monitor) = self.monitor(window) {
      monitor.reload_attributes(category, name);
    }
  }

  pub fn hide_window(&self, window: WindowId) {
    let Some(monitor) = self.monitor(window) else {
      return;
    };
    if let Err(e) = monitor.hide_window() {
      log::warn!("Cannot hide window {window}: {e}");
    }
  }

  pub fn styled_elements(&self, window: WindowId) -> Option<StyledElements> {
    let monitor = self.monitor(window)?;
    match monitor.styled_elements() {
      Ok(styled) => Some(styled),
      Err(e) => {
        log::warn!("Cannot collect styled elements of window {window}: {e}");
        None
      }
    }
  }

  /// Text of a stylesheet resource, if the window references `uri`.
  ///
  /// Unreferenced URIs are refused. Read failures are reported as
  /// `Exception` events.
  pub fn resource(&self, window: WindowId, uri: &str) -> Option<String> {
    let monitor = self.monitor(window)?;
    if !monitor.contains_stylesheet(uri) {
      log::warn!("{}", ScopeError::ResourceNotReferenced(uri.to_owned()));
      return None;
    }
    match self.shared.resources.read(uri) {
      Ok(text) => Some(text),
      Err(e) => {
        log::error!("{}: {e}", monitor.source().to_log_string());
        self.emit(ConnectorEvent::exception(monitor.source().clone(), &e));
        None
      }
    }
  }

  pub fn overlay(&self, window: WindowId) -> Option<OverlaySnapshot> {
    self.monitor(window).map(|monitor| monitor.overlay())
  }

  pub fn inspect_overlay(&self, window: WindowId) -> Option<InspectSnapshot> {
    self.monitor(window).map(|monitor| monitor.inspect_overlay())
  }

  // === Global queries ===

  /// Application-wide user agent stylesheet.
  pub fn user_agent_stylesheet(&self) -> Option<String> {
    self.shared.host.user_agent_stylesheet()
  }

  /// Type in the ancestry of `class_name` that declares `property`.
  pub fn declaring_class(&self, class_name: &str, property: &str) -> Option<ClassInfo> {
    let info = self.shared.host.type_by_name(class_name)?;
    info
      .ancestry()
      .find(|t| t.declared_properties.iter().any(|p| p == property))
      .map(|t| self.shared.classes.class_info(&t))
  }

  /// Sources of every monitored window, by window uid.
  pub fn event_sources(&self) -> Vec<EventSource> {
    let mut sources: Vec<EventSource> = self
      .shared
      .monitors
      .borrow()
      .values()
      .map(|monitor| monitor.source().clone())
      .collect();
    sources.sort_by_key(|source| source.uid);
    sources
  }

  pub fn bus(&self) -> &EventBus {
    &self.shared.bus
  }

  pub fn classes(&self) -> &ClassInfoCache {
    &self.shared.classes
  }

  // === Options ===

  pub fn options(&self) -> ConnectorOptions {
    self.shared.options.get()
  }

  /// Toggle inspect mode. Every monitor refreshes its root; disabling also
  /// hides the hover display.
  pub fn set_inspect_mode(&self, enabled: bool) {
    let mut options = self.shared.options.get();
    if options.inspect_mode == enabled {
      return;
    }
    options.inspect_mode = enabled;
    self.shared.options.set(options);
    for monitor in self.monitors() {
      monitor.inspect_mode_changed(enabled);
    }
  }

  pub fn set_ignore_mouse_transparent(&self, ignore: bool) {
    let mut options = self.shared.options.get();
    options.ignore_mouse_transparent = ignore;
    self.shared.options.set(options);
  }

  /// Keep popups open on focus loss. Applies to open popups right away.
  pub fn set_prevent_popup_auto_hide(&self, prevent: bool) {
    let mut options = self.shared.options.get();
    options.prevent_popup_auto_hide = prevent;
    self.shared.options.set(options);
    for monitor in self.monitors() {
      self.apply_auto_hide(monitor.window(), !prevent);
    }
  }

  fn apply_auto_hide(&self, window: WindowId, auto_hide: bool) {
    let host = self.shared.host.as_ref();
    let is_popup = host
      .window_info(window)
      .is_ok_and(|info| info.window_type == WindowType::Popup);
    if !is_popup {
      return;
    }
    if let Err(e) = host.set_popup_auto_hide(window, auto_hide) {
      log::warn!("Cannot change auto-hide of popup {window}: {e}");
    }
  }

  fn monitors(&self) -> Vec<WindowMonitor> {
    self.shared.monitors.borrow().values().cloned().collect()
  }

  fn emit(&self, event: ConnectorEvent) {
    self.shared.outbox.push(event);
    self.shared.outbox.flush(&self.shared.bus);
  }
}

impl Drop for Shared {
  fn drop(&mut self) {
    if let Some(id) = self.windows_subscription.take() {
      self.host.unsubscribe(id);
    }
    for monitor in self.monitors.get_mut().values() {
      monitor.stop();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::bus::Topic;
  use crate::platform::{MemoryToolkit, NodeKind};
  use crate::types::{Bounds, EventGroup, EventType, NodeId, Uid};
  use parking_lot::Mutex;
  use std::sync::Arc;

  struct Fixture {
    tk: Rc<MemoryToolkit>,
    main: WindowId,
    root: NodeId,
    button: NodeId,
    connector: Connector,
    events: Arc<Mutex<Vec<ConnectorEvent>>>,
  }

  impl Fixture {
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
      crate::core::elements::node_element(self.tk.as_ref(), self.connector.classes(), node).unwrap()
    }
  }

  fn fixture_with(build: impl FnOnce(ConnectorBuilder) -> ConnectorBuilder) -> Fixture {
    let tk = MemoryToolkit::new();
    let main = tk.open_window(WindowType::Stage, "main", Bounds::new(0.0, 0.0, 400.0, 300.0));
    let root = tk.create_node(NodeKind::Pane);
    tk.set_size(root, 400.0, 300.0).unwrap();
    let button = tk.create_node(NodeKind::Button);
    tk.set_size(button, 80.0, 20.0).unwrap();
    tk.add_child(root, button).unwrap();
    tk.set_root(main, Some(root)).unwrap();

    let host: Rc<dyn Toolkit> = tk.clone();
    let connector = build(Connector::builder(host, Some(main)).application("app")).build();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    connector
      .bus()
      .subscribe(Topic::Group(EventGroup::Any), move |e| sink.lock().push(e.clone()));
    connector.start();
    Fixture {
      tk,
      main,
      root,
      button,
      connector,
      events,
    }
  }

  fn fixture() -> Fixture {
    fixture_with(|b| b)
  }

  mod windows {
    use super::*;

    #[test]
    fn start_monitors_open_windows() {
      let f = fixture();
      let sources = f.connector.event_sources();
      assert_eq!(sources.len(), 1);
      assert!(sources[0].is_primary);
      assert_eq!(sources[0].application.as_deref(), Some("app"));
      assert_eq!(f.of(EventType::RootChanged).len(), 1);
    }

    #[test]
    fn new_window_gets_a_monitor() {
      let f = fixture();
      let second = f.tk.open_window(WindowType::Modal, "dialog", Bounds::new(0.0, 0.0, 100.0, 100.0));
      let sources = f.connector.event_sources();
      assert_eq!(sources.len(), 2);
      assert!(!sources[1].is_primary);
      assert_eq!(sources[1].uid, second);
    }

    #[test]
    fn closing_reports_window_closed() {
      let f = fixture();
      f.clear();
      f.tk.close_window(f.main).unwrap();
      let closed = f.of(EventType::WindowClosed);
      assert_eq!(closed.len(), 1);
      assert_eq!(closed[0].source().uid, f.main);
      assert!(f.connector.event_sources().is_empty());
    }

    #[test]
    fn hide_window_goes_through_the_host() {
      let f = fixture();
      f.connector.hide_window(f.main);
      assert_eq!(f.of(EventType::WindowClosed).len(), 1);
      assert!(f.connector.monitor(f.main).is_none());
    }

    #[test]
    fn popups_of_auxiliary_nodes_are_ignored() {
      let f = fixture();
      let aux = f.tk.create_node_with_id(NodeKind::Pane, "scenescope.tooltip");
      f.tk.add_child(f.root, aux).unwrap();
      f.tk.open_popup(aux, Bounds::new(0.0, 0.0, 10.0, 10.0));
      assert_eq!(f.connector.event_sources().len(), 1);
    }

    #[test]
    fn stop_releases_host_subscriptions() {
      let f = fixture();
      f.connector.select_node(f.main, &f.element(f.button), None);
      f.connector.stop();
      assert!(!f.connector.is_started());
      assert_eq!(f.tk.subscription_count(), 0);
    }

    #[test]
    fn popup_auto_hide_follows_option() {
      let f = fixture_with(|b| b.prevent_popup_auto_hide(true));
      let popup = f.tk.open_popup(f.button, Bounds::new(0.0, 0.0, 50.0, 50.0));
      assert!(!f.tk.window_info(popup).unwrap().auto_hide);
      f.connector.set_prevent_popup_auto_hide(false);
      assert!(f.tk.window_info(popup).unwrap().auto_hide);
    }
  }

  mod operations {
    use super::*;

    #[test]
    fn unknown_window_is_a_no_op() {
      let f = fixture();
      f.clear();
      let ghost = WindowId(9_999);
      f.connector.select_window(ghost);
      f.connector.clear_selection(ghost);
      f.connector.reload_attributes(ghost, None, None);
      f.connector.hide_window(ghost);
      assert!(f.connector.styled_elements(ghost).is_none());
      assert!(f.connector.resource(ghost, "file:///a.css").is_none());
      assert!(f.events.lock().is_empty());
    }

    #[test]
    fn window_element_is_not_selectable_as_node() {
      let f = fixture();
      let window = crate::core::elements::window_element(f.tk.as_ref(), f.connector.classes(), f.main, true).unwrap();
      f.connector.select_node(f.main, &window, None);
      assert_eq!(f.connector.selection(f.main), Some(Selection::None));
    }

    #[test]
    fn select_then_clear() {
      let f = fixture();
      f.connector.select_node(f.main, &f.element(f.button), None);
      assert_eq!(
        f.connector.selection(f.main).and_then(|s| s.node()),
        Some(f.button)
      );
      f.connector.clear_selection(f.main);
      assert_eq!(f.connector.selection(f.main), Some(Selection::None));
      let overlay = f.connector.overlay(f.main).unwrap();
      assert!(!overlay.layout_bounds.visible);
    }

    #[test]
    fn unreferenced_resource_is_refused() {
      struct Panicking;
      impl ResourceAccessor for Panicking {
        fn read(&self, uri: &str) -> crate::types::ScopeResult<String> {
          panic!("must not read {uri}");
        }
      }
      let f = fixture_with(|b| b.resource_accessor(Panicking));
      assert!(f.connector.resource(f.main, "file:///etc/passwd").is_none());
    }

    #[test]
    fn referenced_resource_is_read() {
      struct Fixed;
      impl ResourceAccessor for Fixed {
        fn read(&self, uri: &str) -> crate::types::ScopeResult<String> {
          Ok(format!("/* {uri} */"))
        }
      }
      let f = fixture_with(|b| b.resource_accessor(Fixed));
      f.tk.set_stylesheets(f.button, &["file:///button.css"]).unwrap();
      assert_eq!(
        f.connector.resource(f.main, "file:///button.css").as_deref(),
        Some("/* file:///button.css */")
      );
    }

    #[test]
    fn failed_read_is_an_exception_event() {
      let f = fixture();
      f.tk.set_stylesheets(f.button, &["file:///definitely/missing.css"]).unwrap();
      f.clear();
      assert!(f.connector.resource(f.main, "file:///definitely/missing.css").is_none());
      let errors = f.of(EventType::Exception);
      assert_eq!(errors.len(), 1);
      let ConnectorEvent::Exception { class_name, .. } = &errors[0] else {
        panic!("expected an exception");
      };
      assert_eq!(class_name, "Resource");
    }

    #[test]
    fn styled_elements_include_window() {
      let f = fixture();
      f.tk.set_stylesheets(f.root, &["root.css"]).unwrap();
      let styled = f.connector.styled_elements(f.main).unwrap();
      assert_eq!(styled.window.uid, Uid::from(f.main));
      assert_eq!(styled.nodes.len(), 1);
    }
  }

  mod options {
    use super::*;

    #[test]
    fn inspect_mode_refreshes_roots() {
      let f = fixture();
      f.clear();
      f.connector.set_inspect_mode(true);
      assert!(f.connector.options().inspect_mode);
      assert_eq!(f.of(EventType::RootChanged).len(), 1);
      // Unchanged value does nothing
      f.connector.set_inspect_mode(true);
      assert_eq!(f.of(EventType::RootChanged).len(), 1);
    }

    #[test]
    fn disabling_inspect_mode_hides_hover() {
      let f = fixture_with(|b| b.inspect_mode(true));
      f.tk.set_layout(f.button, 10.0, 10.0).unwrap();
      f.tk.pointer_moved(f.main, crate::types::Point::new(20.0, 15.0)).unwrap();
      assert!(f.connector.inspect_overlay(f.main).unwrap().visible);
      f.connector.set_inspect_mode(false);
      assert!(!f.connector.inspect_overlay(f.main).unwrap().visible);
    }
  }

  mod queries {
    use super::*;

    #[test]
    fn declaring_class_walks_ancestry() {
      let f = fixture();
      let declaring = f.connector.declaring_class("scene.control.Button", "opacity").unwrap();
      assert_eq!(declaring.simple_name, "Node");
      assert!(f.connector.declaring_class("scene.control.Button", "noSuchProperty").is_none());
      assert!(f.connector.declaring_class("no.such.Type", "opacity").is_none());
    }

    #[test]
    fn user_agent_stylesheet_comes_from_host() {
      let f = fixture();
      assert_eq!(f.connector.user_agent_stylesheet(), None);
      f.tk.set_user_agent_stylesheet(Some("modena.css"));
      assert_eq!(f.connector.user_agent_stylesheet().as_deref(), Some("modena.css"));
    }
  }
}
