//! A point quadtree answering "how many / which points lie inside this
//! region" without scanning every point.
//!
//! Leaves hold up to `capacity` distinct coordinates and split into four
//! quadrants when that is exceeded. Queries walk the tree top-down and prune
//! whole subtrees that are fully inside or fully outside the region.

mod config;
mod error;
mod feature;
mod list;
mod point;
mod quadtree;
mod rect;

/// Geometric answers the tree needs from a query shape.
///
/// Implementations are read-only; an empty shape answers `false` to all
/// three questions.
pub trait Region {
    /// The whole rectangle, boundary included, lies within the region.
    fn contains_rect(&self, rect: &Rect) -> bool;
    /// The rectangle and the region share at least one point.
    fn intersects_rect(&self, rect: &Rect) -> bool;
    fn contains_coord(&self, coord: Coord) -> bool;
}

impl<R: Region + ?Sized> Region for &R {
    fn contains_rect(&self, rect: &Rect) -> bool {
        (**self).contains_rect(rect)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        (**self).intersects_rect(rect)
    }

    fn contains_coord(&self, coord: Coord) -> bool {
        (**self).contains_coord(coord)
    }
}

pub trait QuadtreeVisitor<P> {
    fn record(&mut self, record: &P);
    fn leaf(&mut self, depth: u32, rect: &Rect, count: usize);
    fn branch(&mut self, depth: u32, rect: &Rect, count: usize);
}

pub use config::*;
pub use error::*;
pub use feature::*;
pub use point::{Coord, Locate, Point};
pub use quadtree::*;
pub use rect::*;
