//! Geometric primitives for tree layout and rendering.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Arbor uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The root sits at the top of the canvas and each level of the tree is
//! placed further down the Y axis.

/// A 2D point representing a position in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use arbor_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns a copy of this point with a different x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Returns a copy of this point with a different y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the vector from a box's top-left corner to its center
    pub fn half_extent(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Merges two bounds to create a larger bounds that contains both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arbor_core::geometry::{Bounds, Point, Size};
    /// let left = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 40.0));
    /// let right = Bounds::new_from_top_left(Point::new(120.0, 80.0), Size::new(100.0, 40.0));
    ///
    /// let combined = left.merge(&right);
    /// assert_eq!(combined.width(), 220.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns true if the horizontal extents of the two bounds share any interior.
    ///
    /// Bounds that merely touch at an edge do not overlap.
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        self.min_x < other.max_x && other.min_x < self.max_x
    }
}
