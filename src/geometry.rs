//! Core geometry types for page segmentation
//!
//! This module provides the geometric primitives the segmentation pipeline
//! operates on. All units are CSS pixels as reported by the render
//! collaborator, with the origin at the top-left corner:
//! - Positive X extends to the right
//! - Positive Y extends downward
//!
//! Node geometry arrives parent-relative from the renderer; the geometry
//! resolver converts it to page-absolute coordinates before any
//! position-dependent step runs.

use std::fmt;

/// A 2D point in CSS pixel space
///
/// # Examples
///
/// ```
/// use pageseg::geometry::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (increases to the right)
  pub x: f32,
  /// Y coordinate (increases downward)
  pub y: f32,
}

impl Point {
  /// The origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  /// Translates this point by another point's coordinates
  ///
  /// # Examples
  ///
  /// ```
  /// use pageseg::geometry::Point;
  ///
  /// let p = Point::new(10.0, 20.0).translate(Point::new(5.0, 3.0));
  /// assert_eq!(p, Point::new(15.0, 23.0));
  /// ```
  pub fn translate(self, other: Point) -> Self {
    Self {
      x: self.x + other.x,
      y: self.y + other.y,
    }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2D size (width and height) in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
  /// Horizontal extent
  pub width: f32,
  /// Vertical extent
  pub height: f32,
}

impl Size {
  /// A zero-area size
  pub const ZERO: Self = Self {
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new size
  pub const fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }

  /// Returns the enclosed area
  pub fn area(self) -> f32 {
    self.width * self.height
  }

  /// Returns true when either dimension is zero or negative
  pub fn is_empty(self) -> bool {
    self.width <= 0.0 || self.height <= 0.0
  }
}

/// An axis-aligned rectangle in CSS pixel space
///
/// The workhorse of the pipeline: node bounds, block bounds, viewport and
/// quad-tree partitions are all `Rect`s.
///
/// # Examples
///
/// ```
/// use pageseg::geometry::Rect;
///
/// let r = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);
/// assert_eq!(r.max_x(), 110.0);
/// assert_eq!(r.area(), 5000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  /// The top-left corner
  pub origin: Point,
  /// The extent
  pub size: Size,
}

impl Rect {
  /// A zero-sized rectangle at the origin
  pub const ZERO: Self = Self {
    origin: Point::ZERO,
    size: Size::ZERO,
  };

  /// Creates a new rectangle from an origin and size
  pub const fn new(origin: Point, size: Size) -> Self {
    Self { origin, size }
  }

  /// Creates a rectangle from x, y, width, height components
  pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      origin: Point::new(x, y),
      size: Size::new(width, height),
    }
  }

  /// Returns the x coordinate of the left edge
  pub fn x(self) -> f32 {
    self.origin.x
  }

  /// Returns the y coordinate of the top edge
  pub fn y(self) -> f32 {
    self.origin.y
  }

  /// Returns the width
  pub fn width(self) -> f32 {
    self.size.width
  }

  /// Returns the height
  pub fn height(self) -> f32 {
    self.size.height
  }

  /// Returns the x coordinate of the left edge
  pub fn min_x(self) -> f32 {
    self.origin.x
  }

  /// Returns the x coordinate of the right edge
  pub fn max_x(self) -> f32 {
    self.origin.x + self.size.width
  }

  /// Returns the y coordinate of the top edge
  pub fn min_y(self) -> f32 {
    self.origin.y
  }

  /// Returns the y coordinate of the bottom edge
  pub fn max_y(self) -> f32 {
    self.origin.y + self.size.height
  }

  /// Returns the center point
  pub fn center(self) -> Point {
    Point::new(
      self.origin.x + self.size.width / 2.0,
      self.origin.y + self.size.height / 2.0,
    )
  }

  /// Returns the enclosed area
  pub fn area(self) -> f32 {
    self.size.area()
  }

  /// Returns true when the rectangle encloses no area
  pub fn is_empty(self) -> bool {
    self.size.is_empty()
  }

  /// Translates the rectangle by the given offset
  pub fn translate(self, offset: Point) -> Self {
    Self {
      origin: self.origin.translate(offset),
      size: self.size,
    }
  }

  /// Returns true when this rectangle overlaps `other` with positive area
  ///
  /// Edge-touching rectangles do not intersect.
  pub fn intersects(self, other: Rect) -> bool {
    self.min_x() < other.max_x()
      && other.min_x() < self.max_x()
      && self.min_y() < other.max_y()
      && other.min_y() < self.max_y()
  }

  /// Returns the overlapping region, or `None` when disjoint
  ///
  /// # Examples
  ///
  /// ```
  /// use pageseg::geometry::Rect;
  ///
  /// let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
  /// let b = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
  /// assert_eq!(a.intersection(b), Some(Rect::from_xywh(5.0, 5.0, 5.0, 5.0)));
  /// ```
  pub fn intersection(self, other: Rect) -> Option<Rect> {
    let x0 = self.min_x().max(other.min_x());
    let y0 = self.min_y().max(other.min_y());
    let x1 = self.max_x().min(other.max_x());
    let y1 = self.max_y().min(other.max_y());
    if x1 > x0 && y1 > y0 {
      Some(Rect::from_xywh(x0, y0, x1 - x0, y1 - y0))
    } else {
      None
    }
  }

  /// Returns the smallest rectangle containing both rectangles
  pub fn union(self, other: Rect) -> Rect {
    let x0 = self.min_x().min(other.min_x());
    let y0 = self.min_y().min(other.min_y());
    let x1 = self.max_x().max(other.max_x());
    let y1 = self.max_y().max(other.max_y());
    Rect::from_xywh(x0, y0, x1 - x0, y1 - y0)
  }

  /// Returns true when `other` lies entirely inside this rectangle
  ///
  /// Containment is inclusive of edges, with a small tolerance for
  /// floating-point drift introduced by offset accumulation.
  pub fn contains_rect(self, other: Rect) -> bool {
    const EPS: f32 = 0.01;
    other.min_x() >= self.min_x() - EPS
      && other.min_y() >= self.min_y() - EPS
      && other.max_x() <= self.max_x() + EPS
      && other.max_y() <= self.max_y() + EPS
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}x{} at {}",
      self.size.width, self.size.height, self.origin
    )
  }
}
