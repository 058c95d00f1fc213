//! Axis-aligned geometry for entities
//!
//! Every entity is positioned by its center. A `Rect` is the axis-aligned box
//! around that center; which direction +y points is up to the variant.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width and height of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f32,
    pub height: f32,
}

impl Size2 {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle stored as min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Size2) -> Self {
        let half = size.half();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Grow by `dw` total width and `dh` total height, keeping the center
    pub fn expanded(&self, dw: f32, dh: f32) -> Self {
        let pad = Vec2::new(dw / 2.0, dh / 2.0);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Horizontal extents overlap (ignores y)
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center() {
        let rect = Rect::from_center(Vec2::new(100.0, 50.0), Size2::new(40.0, 20.0));
        assert_eq!(rect.min, Vec2::new(80.0, 40.0));
        assert_eq!(rect.max, Vec2::new(120.0, 60.0));
        assert_eq!(rect.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_expanded_keeps_center() {
        let rect = Rect::from_center(Vec2::new(10.0, 10.0), Size2::new(100.0, 60.0));
        let grown = rect.expanded(40.0, 20.0);
        assert_eq!(grown.width(), 140.0);
        assert_eq!(grown.height(), 80.0);
        assert_eq!(grown.center(), rect.center());
    }

    #[test]
    fn test_intersects() {
        let a = Rect::from_center(Vec2::ZERO, Size2::new(10.0, 10.0));
        let b = Rect::from_center(Vec2::new(9.0, 0.0), Size2::new(10.0, 10.0));
        let c = Rect::from_center(Vec2::new(30.0, 0.0), Size2::new(10.0, 10.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));

        // Touching edges
        let d = Rect::from_center(Vec2::new(10.0, 0.0), Size2::new(10.0, 10.0));
        assert!(a.intersects(&d));
    }

    #[test]
    fn test_overlaps_x_ignores_y() {
        let a = Rect::from_center(Vec2::ZERO, Size2::new(10.0, 10.0));
        let b = Rect::from_center(Vec2::new(2.0, 500.0), Size2::new(10.0, 10.0));
        assert!(a.overlaps_x(&b));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_distance() {
        assert!((distance(Vec2::ZERO, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }
}
