/*!
Typed publish/subscribe with UI-thread delivery.

Callbacks are keyed by an event kind or an event group. Delivery always
happens on the dispatcher's thread: `fire` from any other thread is queued
with [`Dispatcher::run_later`]. After callbacks run, each event is also
broadcast on an async stream for consumers that prefer `.recv().await`.
*/

use async_broadcast::{InactiveReceiver, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::platform::Dispatcher;
use crate::types::{ConnectorEvent, EventGroup, EventType};

const EVENT_CHANNEL_CAPACITY: usize = 5000;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct SubscriberId(pub u64);

/// What a subscriber listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
pub enum Topic {
  /// Exactly one event kind.
  Kind(EventType),
  /// Every kind tagged with the group.
  Group(EventGroup),
}

impl Topic {
  pub fn matches(self, event_type: EventType) -> bool {
    match self {
      Topic::Kind(kind) => kind == event_type,
      Topic::Group(group) => event_type.groups().contains(&group),
    }
  }
}

/// Subscriber callback. Runs on the UI thread.
pub type Callback = Arc<dyn Fn(&ConnectorEvent) + Send + Sync>;

struct Subscriber {
  id: SubscriberId,
  topic: Topic,
  callback: Callback,
}

struct Inner {
  dispatcher: Dispatcher,
  subscribers: Mutex<Vec<Subscriber>>,
  next_id: AtomicU64,
  events_tx: Sender<ConnectorEvent>,
  events_keepalive: InactiveReceiver<ConnectorEvent>,
}

/// Event bus. Clone is cheap (Arc bump) - share freely across threads.
#[derive(Clone)]
pub struct EventBus {
  inner: Arc<Inner>,
}

impl std::fmt::Debug for EventBus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EventBus")
      .field("subscribers", &self.subscriber_count())
      .finish_non_exhaustive()
  }
}

impl EventBus {
  /// Create a bus delivering on `dispatcher`'s thread.
  pub fn new(dispatcher: Dispatcher) -> Self {
    let (mut tx, rx) = async_broadcast::broadcast(EVENT_CHANNEL_CAPACITY);
    tx.set_overflow(true); // Drop oldest messages when full

    Self {
      inner: Arc::new(Inner {
        dispatcher,
        subscribers: Mutex::new(Vec::new()),
        next_id: AtomicU64::new(1),
        events_tx: tx,
        events_keepalive: rx.deactivate(),
      }),
    }
  }

  /// Register `callback` for a kind or group.
  pub fn subscribe(
    &self,
    topic: impl Into<Topic>,
    callback: impl Fn(&ConnectorEvent) + Send + Sync + 'static,
  ) -> SubscriberId {
    let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
    self.inner.subscribers.lock().push(Subscriber {
      id,
      topic: topic.into(),
      callback: Arc::new(callback),
    });
    id
  }

  /// Returns false if `id` was not subscribed.
  pub fn unsubscribe(&self, id: SubscriberId) -> bool {
    let mut subscribers = self.inner.subscribers.lock();
    let before = subscribers.len();
    subscribers.retain(|s| s.id != id);
    subscribers.len() != before
  }

  pub fn subscriber_count(&self) -> usize {
    self.inner.subscribers.lock().len()
  }

  /// Async stream of every delivered event.
  pub fn stream(&self) -> Receiver<ConnectorEvent> {
    self.inner.events_keepalive.activate_cloned()
  }

  pub fn dispatcher(&self) -> &Dispatcher {
    &self.inner.dispatcher
  }

  /// Deliver `event`. Off the UI thread, delivery is queued instead.
  pub fn fire(&self, event: ConnectorEvent) {
    if !self.inner.dispatcher.is_ui_thread() {
      log::warn!(
        "EventBus::fire called off the UI thread, rescheduling: {:?}",
        event.event_type()
      );
      let bus = self.clone();
      self.inner.dispatcher.run_later(move || bus.deliver(&event));
      return;
    }
    self.deliver(&event);
  }

  fn deliver(&self, event: &ConnectorEvent) {
    log::trace!("{:?}: {}", event.event_type(), event.to_log_string());

    let event_type = event.event_type();
    // Snapshot under the lock so callbacks may (un)subscribe
    let callbacks: Vec<(SubscriberId, Callback)> = self
      .inner
      .subscribers
      .lock()
      .iter()
      .filter(|s| s.topic.matches(event_type))
      .map(|s| (s.id, Arc::clone(&s.callback)))
      .collect();

    for (id, callback) in callbacks {
      if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(event))) {
        log::error!(
          "Subscriber {id} panicked handling {event_type:?}: {}",
          panic_message(payload.as_ref())
        );
      }
    }

    if let Err(e) = self.inner.events_tx.try_broadcast(event.clone()) {
      if e.is_full() {
        log::error!(
          "Event channel overflow - events are being dropped. \
           Consider increasing EVENT_CHANNEL_CAPACITY or processing events faster."
        );
      }
    }
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
  payload
    .downcast_ref::<&str>()
    .copied()
    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
    .unwrap_or("<non-string panic>")
}
