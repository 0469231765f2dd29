/*!
UI-thread affinity.

The observed scene and every listener live on one thread. Work produced on
other threads is queued with [`Dispatcher::run_later`] and executed when the
UI thread next calls [`Dispatcher::pump`].
*/

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::ThreadId;

type Task = Box<dyn FnOnce() + Send>;

struct Inner {
  ui_thread: ThreadId,
  queue: Mutex<VecDeque<Task>>,
}

/// Cooperative scheduler pinned to the thread that created it.
///
/// Clone is cheap (Arc bump) - share freely across threads.
#[derive(Clone)]
pub struct Dispatcher {
  inner: Arc<Inner>,
}

impl std::fmt::Debug for Dispatcher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Dispatcher")
      .field("ui_thread", &self.inner.ui_thread)
      .field("pending", &self.pending())
      .finish()
  }
}

impl Dispatcher {
  /// Bind a dispatcher to the calling thread.
  pub fn for_current_thread() -> Self {
    Self {
      inner: Arc::new(Inner {
        ui_thread: std::thread::current().id(),
        queue: Mutex::new(VecDeque::new()),
      }),
    }
  }

  pub fn is_ui_thread(&self) -> bool {
    std::thread::current().id() == self.inner.ui_thread
  }

  /// Queue a task for the UI thread. Safe to call from any thread.
  pub fn run_later(&self, task: impl FnOnce() + Send + 'static) {
    self.inner.queue.lock().push_back(Box::new(task));
  }

  /// Number of queued tasks.
  pub fn pending(&self) -> usize {
    self.inner.queue.lock().len()
  }

  /// Run queued tasks, including tasks queued while pumping. UI thread only.
  ///
  /// Returns the number of tasks executed.
  pub fn pump(&self) -> usize {
    if !self.is_ui_thread() {
      log::warn!("Dispatcher::pump called off the UI thread, ignoring");
      return 0;
    }

    let mut ran = 0;
    loop {
      // Pop under the lock, run without it
      let Some(task) = self.inner.queue.lock().pop_front() else {
        return ran;
      };
      task();
      ran += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[test]
  fn pump_runs_in_fifo_order() {
    let dispatcher = Dispatcher::for_current_thread();
    let log = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
      let log = Arc::clone(&log);
      dispatcher.run_later(move || log.lock().push(i));
    }
    assert_eq!(dispatcher.pending(), 3);
    assert_eq!(dispatcher.pump(), 3);
    assert_eq!(*log.lock(), vec![0, 1, 2]);
    assert_eq!(dispatcher.pending(), 0);
  }

  #[test]
  fn tasks_queued_during_pump_run_in_same_pump() {
    let dispatcher = Dispatcher::for_current_thread();
    let count = Arc::new(AtomicUsize::new(0));
    let inner = dispatcher.clone();
    let c = Arc::clone(&count);
    dispatcher.run_later(move || {
      let c2 = Arc::clone(&c);
      inner.run_later(move || {
        c2.fetch_add(1, Ordering::SeqCst);
      });
      c.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(dispatcher.pump(), 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn pump_off_thread_runs_nothing() {
    let dispatcher = Dispatcher::for_current_thread();
    dispatcher.run_later(|| {});
    let remote = dispatcher.clone();
    let ran = std::thread::spawn(move || (remote.is_ui_thread(), remote.pump()))
      .join()
      .unwrap();
    assert_eq!(ran, (false, 0));
    assert_eq!(dispatcher.pending(), 1);
  }
}
