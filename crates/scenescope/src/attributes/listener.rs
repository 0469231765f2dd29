/*!
Fan-out of one selection target to every attribute tracker.
*/

use std::cell::RefCell;
use std::rc::Rc;

use super::tracker::Tracker;
use crate::core::Ctx;
use crate::types::{AttributeCategory, Target};

/// One tracker per category, in [`AttributeCategory::ALL`] order.
#[derive(Debug)]
pub struct AttributeListener {
  trackers: Vec<Rc<RefCell<Tracker>>>,
  target: Option<Target>,
}

impl AttributeListener {
  pub(crate) fn new(ctx: &Ctx) -> Self {
    Self {
      trackers: AttributeCategory::ALL
        .iter()
        .map(|category| Tracker::new(*category, ctx.clone()))
        .collect(),
      target: None,
    }
  }

  pub fn target(&self) -> Option<Target> {
    self.target
  }

  /// Current target of each tracker.
  pub fn tracker_targets(&self) -> Vec<(AttributeCategory, Option<Target>)> {
    self
      .trackers
      .iter()
      .filter_map(|tracker| tracker.try_borrow().ok().map(|t| (t.category(), t.target())))
      .collect()
  }

  /// Hand `target` to the trackers that accept it and reset the others.
  ///
  /// Does nothing when `target` is already the current one.
  pub(crate) fn set_target(&mut self, target: Option<Target>) {
    if self.target == target {
      return;
    }
    self.target = target;
    for tracker in &self.trackers {
      let Ok(mut tracker) = tracker.try_borrow_mut() else {
        log::warn!("Tracker busy, skipping target change to {target:?}");
        continue;
      };
      match target {
        Some(t) if tracker.accepts(t) => {
          tracker.set_target(Some(t));
        }
        _ => {
          tracker.reset();
        }
      }
    }
  }

  /// Reload every tracker, or one category. A name restricts the reload to
  /// that attribute.
  pub(crate) fn reload(&self, category: Option<AttributeCategory>, name: Option<&str>) {
    let names: Vec<&str> = name.into_iter().collect();
    for tracker in &self.trackers {
      let Ok(tracker) = tracker.try_borrow() else {
        continue;
      };
      if category.map_or(true, |c| c == tracker.category()) {
        tracker.reload(&names);
      }
    }
  }

  /// Release every tracker without emitting anything.
  pub(crate) fn release(&mut self) {
    self.target = None;
    for tracker in &self.trackers {
      if let Ok(mut tracker) = tracker.try_borrow_mut() {
        tracker.release();
      }
    }
  }
}
