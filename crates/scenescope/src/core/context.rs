/*!
Per-monitor context shared by the monitor, its trackers and its overlays.

Components never fire on the bus while they hold a `RefCell` borrow. They
queue events in the [`Outbox`], and the entry point that received the host
notification (or the public call) flushes it once every borrow is released.
Bus subscribers can then call straight back into the connector.
*/

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::bus::EventBus;
use crate::class_info::ClassInfoCache;
use crate::platform::Toolkit;
use crate::types::{ConnectorEvent, Element, ElementTree, EventSource, NodeId, ScopeError, ScopeResult, Target};

/// Events waiting for delivery.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outbox {
  queue: Rc<RefCell<VecDeque<ConnectorEvent>>>,
}

impl Outbox {
  pub(crate) fn push(&self, event: ConnectorEvent) {
    self.queue.borrow_mut().push_back(event);
  }

  pub(crate) fn len(&self) -> usize {
    self.queue.borrow().len()
  }

  /// Fire queued events in order, including events queued by subscribers.
  pub(crate) fn flush(&self, bus: &EventBus) {
    loop {
      // Pop under the borrow, fire without it
      let Some(event) = self.queue.borrow_mut().pop_front() else {
        return;
      };
      bus.fire(event);
    }
  }
}

/// Handles shared by everything a monitor owns.
#[derive(Clone)]
pub(crate) struct Ctx {
  pub(crate) host: Rc<dyn Toolkit>,
  pub(crate) classes: ClassInfoCache,
  pub(crate) source: EventSource,
  pub(crate) bus: EventBus,
  pub(crate) outbox: Outbox,
}

impl std::fmt::Debug for Ctx {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Ctx")
      .field("source", &self.source.to_log_string())
      .field("queued", &self.outbox.len())
      .finish_non_exhaustive()
  }
}

impl Ctx {
  pub(crate) fn emit(&self, event: ConnectorEvent) {
    self.outbox.push(event);
  }

  /// Queue an exception event for `error`.
  pub(crate) fn emit_error(&self, error: &ScopeError) {
    log::error!("{}: {error}", self.source.to_log_string());
    self.emit(ConnectorEvent::exception(self.source.clone(), error));
  }

  pub(crate) fn flush(&self) {
    self.outbox.flush(&self.bus);
  }

  pub(crate) fn node_element(&self, node: NodeId) -> ScopeResult<Element> {
    super::elements::node_element(self.host.as_ref(), &self.classes, node)
  }

  /// Element of the monitored window.
  pub(crate) fn window_element(&self) -> ScopeResult<Element> {
    super::elements::window_element(
      self.host.as_ref(),
      &self.classes,
      self.source.uid,
      self.source.is_primary,
    )
  }

  /// Element standing for a tracker target. Scenes are shown as their window.
  pub(crate) fn target_element(&self, target: Target) -> ScopeResult<Element> {
    match target {
      Target::Node(node) => self.node_element(node),
      Target::Window(_) | Target::Scene(_) => self.window_element(),
    }
  }

  pub(crate) fn tree(&self, node: NodeId) -> ScopeResult<ElementTree> {
    super::elements::element_tree(self.host.as_ref(), &self.classes, node)
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;
  use crate::core::bus::Topic;
  use crate::platform::MemoryToolkit;
  use crate::types::{EventGroup, EventType, WindowId};
  use parking_lot::Mutex;
  use std::sync::Arc;

  /// Collects every event fired on a bus.
  #[derive(Clone, Default)]
  pub(crate) struct Recorder(Arc<Mutex<Vec<ConnectorEvent>>>);

  impl Recorder {
    pub(crate) fn attach(bus: &EventBus) -> Self {
      let recorder = Self::default();
      let sink = Arc::clone(&recorder.0);
      bus.subscribe(Topic::Group(EventGroup::Any), move |event| sink.lock().push(event.clone()));
      recorder
    }

    pub(crate) fn take(&self) -> Vec<ConnectorEvent> {
      std::mem::take(&mut *self.0.lock())
    }

    pub(crate) fn of(&self, event_type: EventType) -> Vec<ConnectorEvent> {
      self
        .0
        .lock()
        .iter()
        .filter(|e| e.event_type() == event_type)
        .cloned()
        .collect()
    }
  }

  pub(crate) fn ctx(host: &Rc<MemoryToolkit>, window: WindowId) -> (Ctx, Recorder) {
    let bus = EventBus::new(host.dispatcher());
    let recorder = Recorder::attach(&bus);
    let host: Rc<dyn Toolkit> = Rc::clone(host) as Rc<dyn Toolkit>;
    let ctx = Ctx {
      host,
      classes: ClassInfoCache::new(),
      source: EventSource::new(Some("test".into()), window, true),
      bus,
      outbox: Outbox::default(),
    };
    (ctx, recorder)
  }
}
