/*! Highlight overlay data. Geometry only, nothing is drawn. */

use super::{Bounds, Point};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which overlay primitives are active for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[allow(clippy::struct_excessive_bools)]
pub struct HighlightOptions {
  pub layout_bounds: bool,
  pub bounds_in_parent: bool,
  pub baseline: bool,
}

impl HighlightOptions {
  pub const fn new(layout_bounds: bool, bounds_in_parent: bool, baseline: bool) -> Self {
    Self {
      layout_bounds,
      bounds_in_parent,
      baseline,
    }
  }
}

impl Default for HighlightOptions {
  fn default() -> Self {
    Self::new(true, true, false)
  }
}

/// Rectangle primitive in the anchor's coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OverlayRect {
  /// Auxiliary node id of the primitive.
  pub id: String,
  pub bounds: Bounds,
  pub visible: bool,
}

impl OverlayRect {
  pub(crate) fn hidden(id: &str) -> Self {
    Self {
      id: id.to_owned(),
      bounds: Bounds::ZERO,
      visible: false,
    }
  }

  pub(crate) fn hide(&mut self) {
    self.bounds = Bounds::ZERO;
    self.visible = false;
  }
}

/// Line primitive in the anchor's coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OverlayLine {
  /// Auxiliary node id of the primitive.
  pub id: String,
  pub start: Point,
  pub end: Point,
  pub visible: bool,
}

impl OverlayLine {
  pub(crate) fn hidden(id: &str) -> Self {
    Self {
      id: id.to_owned(),
      start: Point::ORIGIN,
      end: Point::ORIGIN,
      visible: false,
    }
  }

  pub(crate) fn hide(&mut self) {
    self.start = Point::ORIGIN;
    self.end = Point::ORIGIN;
    self.visible = false;
  }
}

/// Current state of the three selection primitives.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OverlaySnapshot {
  /// Uid of the node the primitives are expressed relative to.
  pub anchor: Option<super::Uid>,
  pub layout_bounds: OverlayRect,
  pub bounds_in_parent: OverlayRect,
  pub baseline: OverlayLine,
}

/// Hover tooltip and curtain shown in inspect mode.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InspectSnapshot {
  pub visible: bool,
  /// Highlighted node rectangle, anchor coordinates.
  pub highlight: Bounds,
  /// Region of the curtain left transparent. Zeroed when the node fills the window.
  pub viewport: Bounds,
  pub tooltip: String,
}
