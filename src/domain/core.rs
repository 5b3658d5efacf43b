//! Core geometric types
//!
//! This module defines the pure geometry the widget works in: points in
//! triangle space, the equilateral triangle itself, and the rectangle a
//! rendering surface occupies in client coordinates.

use serde::{Deserialize, Serialize};

use crate::domain::weights::Dosha;

/// Default side length, matching a `0 0 200 200` view box
pub const DEFAULT_SIDE: f64 = 200.0;

/// Point in triangle space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrianglePoint {
    pub x: f64,
    pub y: f64,
}

impl TrianglePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &TrianglePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Equilateral triangle with its apex at the top
///
/// Vertex placement inside a `side x side` box:
/// - `top`   = (side/2, 0)      Pitta
/// - `left`  = (0, height)      Vata
/// - `right` = (side, height)   Kapha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    side: f64,
    top: TrianglePoint,
    left: TrianglePoint,
    right: TrianglePoint,
}

impl Triangle {
    /// Creates an equilateral triangle with the given side length
    pub fn equilateral(side: f64) -> Self {
        let height = side * 3f64.sqrt() / 2.0;
        Self {
            side,
            top: TrianglePoint::new(side / 2.0, 0.0),
            left: TrianglePoint::new(0.0, height),
            right: TrianglePoint::new(side, height),
        }
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub fn height(&self) -> f64 {
        self.side * 3f64.sqrt() / 2.0
    }

    pub fn top(&self) -> TrianglePoint {
        self.top
    }

    pub fn left(&self) -> TrianglePoint {
        self.left
    }

    pub fn right(&self) -> TrianglePoint {
        self.right
    }

    /// Vertex associated with a dosha
    ///
    /// Both projection directions go through this mapping, so the
    /// vertex-to-dosha assignment lives in exactly one place.
    pub fn vertex(&self, dosha: Dosha) -> TrianglePoint {
        match dosha {
            Dosha::Vata => self.left,
            Dosha::Pitta => self.top,
            Dosha::Kapha => self.right,
        }
    }

    /// Point where all three doshas weigh the same
    pub fn centroid(&self) -> TrianglePoint {
        TrianglePoint::new(
            (self.top.x + self.left.x + self.right.x) / 3.0,
            (self.top.y + self.left.y + self.right.y) / 3.0,
        )
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self::equilateral(DEFAULT_SIDE)
    }
}

/// Rectangle in client coordinates
///
/// Describes where a rendering surface sits on screen so pointer events
/// can be made relative to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// True when the rectangle has a positive, finite extent on both axes
    pub fn has_area(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn equilateral_vertices() {
        let tri = Triangle::equilateral(200.0);
        let h = 200.0 * 3f64.sqrt() / 2.0;
        assert_eq!(tri.top(), TrianglePoint::new(100.0, 0.0));
        assert_eq!(tri.left(), TrianglePoint::new(0.0, h));
        assert_eq!(tri.right(), TrianglePoint::new(200.0, h));
        assert!((tri.height() - h).abs() < EPS);
    }

    #[test]
    fn sides_are_equal() {
        let tri = Triangle::equilateral(120.0);
        let a = tri.top().distance_to(&tri.left());
        let b = tri.left().distance_to(&tri.right());
        let c = tri.right().distance_to(&tri.top());
        assert!((a - 120.0).abs() < EPS);
        assert!((b - 120.0).abs() < EPS);
        assert!((c - 120.0).abs() < EPS);
    }

    #[test]
    fn vertex_mapping() {
        let tri = Triangle::default();
        assert_eq!(tri.vertex(Dosha::Vata), tri.left());
        assert_eq!(tri.vertex(Dosha::Pitta), tri.top());
        assert_eq!(tri.vertex(Dosha::Kapha), tri.right());
    }

    #[test]
    fn centroid_is_equidistant() {
        let tri = Triangle::default();
        let c = tri.centroid();
        let d_top = c.distance_to(&tri.top());
        assert!((c.distance_to(&tri.left()) - d_top).abs() < EPS);
        assert!((c.distance_to(&tri.right()) - d_top).abs() < EPS);
    }

    #[test]
    fn rect_area_check() {
        assert!(Rect::new(0.0, 0.0, 256.0, 256.0).has_area());
        assert!(!Rect::new(0.0, 0.0, 0.0, 256.0).has_area());
        assert!(!Rect::new(0.0, 0.0, f64::NAN, 10.0).has_area());
    }
}
