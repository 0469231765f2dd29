/*!
Generic observable-property discovery.

Accessors whose name ends in [`PROPERTY_SUFFIX`] return an observable. The
listener resolves each of them, subscribes one invalidation callback per
property and forwards the logical property name to its owner.
*/

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::platform::{Channel, Listener, Notification, ObservableRef, SubscriptionId, Toolkit, PROPERTY_SUFFIX};
use crate::types::Target;

/// Called with the logical name of an invalidated property.
pub type ChangeCallback = Rc<dyn Fn(&str)>;

/// Discovered observables of one target, keyed by logical name.
#[derive(Debug, Default)]
pub struct PropertyListener {
  target: Option<Target>,
  properties: BTreeMap<String, ObservableRef>,
  subscriptions: Vec<SubscriptionId>,
}

impl PropertyListener {
  pub fn new() -> Self {
    Self::default()
  }

  /// Release the previous target, then discover and watch `target`.
  ///
  /// Accessors that fail to resolve are logged and skipped.
  pub fn use_target(&mut self, host: &dyn Toolkit, target: Target, on_change: ChangeCallback) {
    self.release(host);

    for accessor in host.accessors(target) {
      if !accessor.ends_with(PROPERTY_SUFFIX) {
        continue;
      }
      match host.observable(target, &accessor) {
        Ok(observable) => {
          self.properties.insert(observable.name.clone(), observable);
        }
        Err(e) => log::info!("Skipping accessor '{accessor}' on {target}: {e}"),
      }
    }

    for name in self.properties.keys() {
      let on_change = Rc::clone(&on_change);
      let listener: Listener = Rc::new(move |notification: &Notification| {
        if let Notification::Invalidated { property, .. } = notification {
          on_change(property);
        }
      });
      match host.subscribe(target, Channel::Property(name.clone()), listener) {
        Ok(id) => self.subscriptions.push(id),
        Err(e) => log::info!("Cannot watch '{name}' on {target}: {e}"),
      }
    }

    self.target = Some(target);
  }

  /// Unsubscribe every listener and forget the discovered properties.
  pub fn release(&mut self, host: &dyn Toolkit) {
    for id in self.subscriptions.drain(..) {
      host.unsubscribe(id);
    }
    self.properties.clear();
    self.target = None;
  }

  pub fn target(&self) -> Option<Target> {
    self.target
  }

  pub fn properties(&self) -> &BTreeMap<String, ObservableRef> {
    &self.properties
  }

  pub fn get(&self, name: &str) -> Option<&ObservableRef> {
    self.properties.get(name)
  }

  pub fn subscription_count(&self) -> usize {
    self.subscriptions.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{MemoryToolkit, NodeKind};
  use crate::types::ObservableType;
  use std::cell::RefCell;

  fn recording() -> (Rc<RefCell<Vec<String>>>, ChangeCallback) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, Rc::new(move |name: &str| sink.borrow_mut().push(name.to_owned())))
  }

  #[test]
  fn discovers_observable_accessors_only() {
    let tk = MemoryToolkit::new();
    let node = tk.create_node(NodeKind::Rectangle);
    let mut listener = PropertyListener::new();
    let (_, callback) = recording();
    listener.use_target(tk.as_ref(), Target::Node(node), callback);

    assert!(listener.get("opacity").is_some());
    assert!(listener.get("layoutBounds").is_some());
    // Plain getters are not observables
    assert!(listener.get("styleClass").is_none());
    assert_eq!(listener.get("focused").map(|o| o.kind), Some(ObservableType::ReadOnly));
    assert_eq!(listener.subscription_count(), listener.properties().len());
  }

  #[test]
  fn forwards_invalidations_by_name() {
    let tk = MemoryToolkit::new();
    let node = tk.create_node(NodeKind::Rectangle);
    let mut listener = PropertyListener::new();
    let (log, callback) = recording();
    listener.use_target(tk.as_ref(), Target::Node(node), callback);
    tk.set_property(Target::Node(node), "opacity", 0.5).unwrap();
    assert!(log.borrow().contains(&"opacity".to_owned()));
  }

  #[test]
  fn denied_accessor_is_skipped() {
    let tk = MemoryToolkit::new();
    let node = tk.create_node(NodeKind::Rectangle);
    tk.deny_access(Target::Node(node), "effect", "module not open").unwrap();
    let mut listener = PropertyListener::new();
    let (_, callback) = recording();
    listener.use_target(tk.as_ref(), Target::Node(node), callback);
    assert!(listener.get("effect").is_none());
    assert!(listener.get("opacity").is_some());
  }

  #[test]
  fn release_restores_subscription_count() {
    let tk = MemoryToolkit::new();
    let node = tk.create_node(NodeKind::Label);
    let before = tk.subscription_count();
    let mut listener = PropertyListener::new();
    let (log, callback) = recording();
    listener.use_target(tk.as_ref(), Target::Node(node), callback);
    assert!(tk.subscription_count() > before);
    listener.release(tk.as_ref());
    assert_eq!(tk.subscription_count(), before);
    assert!(listener.properties().is_empty());
    tk.set_property(Target::Node(node), "text", "x").unwrap();
    assert!(log.borrow().is_empty());
  }

  #[test]
  fn retargeting_releases_previous_target() {
    let tk = MemoryToolkit::new();
    let a = tk.create_node(NodeKind::Label);
    let b = tk.create_node(NodeKind::Label);
    let mut listener = PropertyListener::new();
    let (log, callback) = recording();
    listener.use_target(tk.as_ref(), Target::Node(a), Rc::clone(&callback));
    let per_target = tk.subscription_count();
    listener.use_target(tk.as_ref(), Target::Node(b), callback);
    assert_eq!(tk.subscription_count(), per_target);
    tk.set_property(Target::Node(a), "text", "stale").unwrap();
    assert!(log.borrow().is_empty());
    assert_eq!(listener.target(), Some(Target::Node(b)));
  }
}
