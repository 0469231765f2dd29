/*! Geometry types for scene and local coordinates. */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Bounds {
  pub x: f64,
  pub y: f64,
  pub w: f64,
  pub h: f64,
}

impl Bounds {
  pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

  pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
    Self { x, y, w, h }
  }

  /// Smallest bounds enclosing both corners, in any order.
  pub fn from_corners(a: Point, b: Point) -> Self {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
  }

  /// Smallest bounds enclosing all points. None for an empty input.
  pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let (mut min, mut max) = (first, first);
    for p in iter {
      min = Point::new(min.x.min(p.x), min.y.min(p.y));
      max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    Some(Self::from_corners(min, max))
  }

  pub fn max_x(&self) -> f64 {
    self.x + self.w
  }

  pub fn max_y(&self) -> f64 {
    self.y + self.h
  }

  pub fn center(&self) -> Point {
    Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
  }

  /// Corners clockwise from the origin corner.
  pub fn corners(&self) -> [Point; 4] {
    [
      Point::new(self.x, self.y),
      Point::new(self.max_x(), self.y),
      Point::new(self.max_x(), self.max_y()),
      Point::new(self.x, self.max_y()),
    ]
  }

  /// True when every coordinate and dimension is a finite number.
  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
  }

  /// A negative width or height marks an empty box.
  pub fn is_empty(&self) -> bool {
    self.w < 0.0 || self.h < 0.0
  }

  /// Union of two boxes. Empty boxes are ignored.
  pub fn union(&self, other: &Bounds) -> Bounds {
    if self.is_empty() {
      return *other;
    }
    if other.is_empty() {
      return *self;
    }
    let x = self.x.min(other.x);
    let y = self.y.min(other.y);
    Bounds::new(
      x,
      y,
      self.max_x().max(other.max_x()) - x,
      self.max_y().max(other.max_y()) - y,
    )
  }

  /// Shrink by `by` on every side.
  pub fn inset(&self, by: f64) -> Bounds {
    Bounds::new(self.x + by, self.y + by, self.w - 2.0 * by, self.h - 2.0 * by)
  }

  /// Check if two bounds match within a margin of error.
  pub fn matches(&self, other: &Bounds, margin: f64) -> bool {
    (self.x - other.x).abs() <= margin
      && (self.y - other.y).abs() <= margin
      && (self.w - other.w).abs() <= margin
      && (self.h - other.h).abs() <= margin
  }

  /// Check if a point is contained within these bounds.
  pub fn contains(&self, point: Point) -> bool {
    point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
  }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const ORIGIN: Self = Self::new(0.0, 0.0);

  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }

  pub fn offset(&self, dx: f64, dy: f64) -> Point {
    Point::new(self.x + dx, self.y + dy)
  }
}

/// Width and height.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Size {
  pub width: f64,
  pub height: f64,
}

impl Size {
  pub const fn new(width: f64, height: f64) -> Self {
    Self { width, height }
  }
}

/// Per-side offsets (padding, insets).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Insets {
  pub top: f64,
  pub right: f64,
  pub bottom: f64,
  pub left: f64,
}

impl Insets {
  pub const EMPTY: Self = Self::uniform(0.0);

  pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
    Self { top, right, bottom, left }
  }

  pub const fn uniform(value: f64) -> Self {
    Self::new(value, value, value, value)
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::EMPTY
  }
}

impl std::fmt::Display for Insets {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}, {}, {}, {}]", self.top, self.right, self.bottom, self.left)
  }
}

/// 2D affine transform.
///
/// ```text
/// | mxx mxy tx |
/// | myx myy ty |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
  pub mxx: f64,
  pub mxy: f64,
  pub tx: f64,
  pub myx: f64,
  pub myy: f64,
  pub ty: f64,
}

impl Default for Affine {
  fn default() -> Self {
    Self::IDENTITY
  }
}

impl Affine {
  pub const IDENTITY: Self = Self {
    mxx: 1.0,
    mxy: 0.0,
    tx: 0.0,
    myx: 0.0,
    myy: 1.0,
    ty: 0.0,
  };

  pub const fn translate(tx: f64, ty: f64) -> Self {
    Self { tx, ty, ..Self::IDENTITY }
  }

  pub const fn scale(sx: f64, sy: f64) -> Self {
    Self {
      mxx: sx,
      myy: sy,
      ..Self::IDENTITY
    }
  }

  /// Rotation by `degrees`, clockwise in a y-down coordinate system.
  pub fn rotate(degrees: f64) -> Self {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Self {
      mxx: cos,
      mxy: -sin,
      tx: 0.0,
      myx: sin,
      myy: cos,
      ty: 0.0,
    }
  }

  /// `self * other`: `other` applies first.
  pub fn then(&self, other: &Affine) -> Affine {
    Affine {
      mxx: self.mxx * other.mxx + self.mxy * other.myx,
      mxy: self.mxx * other.mxy + self.mxy * other.myy,
      tx: self.mxx * other.tx + self.mxy * other.ty + self.tx,
      myx: self.myx * other.mxx + self.myy * other.myx,
      myy: self.myx * other.mxy + self.myy * other.myy,
      ty: self.myx * other.tx + self.myy * other.ty + self.ty,
    }
  }

  /// Transform about a pivot point.
  pub fn about(&self, pivot: Point) -> Affine {
    Affine::translate(pivot.x, pivot.y)
      .then(self)
      .then(&Affine::translate(-pivot.x, -pivot.y))
  }

  pub fn determinant(&self) -> f64 {
    self.mxx * self.myy - self.mxy * self.myx
  }

  /// Inverse transform.
  ///
  /// A singular matrix yields non-finite components instead of failing, so
  /// callers see NaN/infinite coordinates and apply their degenerate-value policy.
  pub fn inverse(&self) -> Affine {
    let det = self.determinant();
    let inv = 1.0 / det;
    Affine {
      mxx: self.myy * inv,
      mxy: -self.mxy * inv,
      tx: (self.mxy * self.ty - self.myy * self.tx) * inv,
      myx: -self.myx * inv,
      myy: self.mxx * inv,
      ty: (self.myx * self.tx - self.mxx * self.ty) * inv,
    }
  }

  pub fn apply(&self, p: Point) -> Point {
    Point::new(
      self.mxx * p.x + self.mxy * p.y + self.tx,
      self.myx * p.x + self.myy * p.y + self.ty,
    )
  }

  /// Axis-aligned box enclosing the transformed corners.
  pub fn apply_bounds(&self, b: &Bounds) -> Bounds {
    Bounds::enclosing(b.corners().map(|p| self.apply(p))).unwrap_or(*b)
  }
}
