use geo::{
    coord, Area, BoundingRect, Contains, Intersects, Line, LineString, MultiPolygon, Polygon,
};

use crate::point::Coord;
use crate::rect::Rect;
use crate::Region;

/// A polygonal [`Region`] answered by the `geo` crate.
///
/// The bounding box is computed once here and used as a cheap pre-check
/// before the exact predicates run.
#[derive(Clone, Debug)]
pub struct Feature {
    geometry: MultiPolygon<f64>,
    bounds: Option<Rect>,
}

impl Feature {
    pub fn new<G>(geometry: G) -> Self
    where
        G: Into<MultiPolygon<f64>>,
    {
        let geometry = geometry.into();
        // Collinear rings and collapsed rectangles cover nothing.
        let bounds = if geometry.unsigned_area() > 0.0 {
            geometry
                .bounding_rect()
                .map(|b| (b.min(), b.max()))
                .and_then(|(min, max)| Rect::new(min.x, min.y, max.x, max.y).ok())
        } else {
            None
        };
        Self { geometry, bounds }
    }

    /// Polygon covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(to_polygon(&rect))
    }

    /// Polygon with the given exterior ring. The ring is closed if needed.
    pub fn from_exterior<I>(ring: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let exterior = LineString::from(ring.into_iter().collect::<Vec<_>>());
        Self::new(Polygon::new(exterior, vec![]))
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Bounding box of the geometry, `None` when it has no area.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }
}

impl Region for Feature {
    fn contains_rect(&self, rect: &Rect) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        if !bounds.contains_rect(rect) {
            return false;
        }
        // Zero-area cells are tested as the line or point they collapse to.
        match (rect.width() > 0.0, rect.height() > 0.0) {
            (true, true) => self.geometry.contains(&to_polygon(rect)),
            (false, false) => self
                .geometry
                .contains(&geo::Point::new(rect.min_x(), rect.min_y())),
            _ => self.geometry.contains(&to_line(rect)),
        }
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        if !bounds.intersects(rect) {
            return false;
        }
        match (rect.width() > 0.0, rect.height() > 0.0) {
            (true, true) => self.geometry.intersects(&to_polygon(rect)),
            (false, false) => self
                .geometry
                .intersects(&geo::Point::new(rect.min_x(), rect.min_y())),
            _ => self.geometry.intersects(&to_line(rect)),
        }
    }

    /// Points on the boundary count as inside.
    fn contains_coord(&self, coord: Coord) -> bool {
        match self.bounds {
            Some(bounds) => {
                bounds.contains(coord)
                    && self
                        .geometry
                        .intersects(&geo::Point::new(coord.x, coord.y))
            }
            None => false,
        }
    }
}

fn to_polygon(rect: &Rect) -> Polygon<f64> {
    geo::Rect::new(
        coord! { x: rect.min_x(), y: rect.min_y() },
        coord! { x: rect.max_x(), y: rect.max_y() },
    )
    .to_polygon()
}

fn to_line(rect: &Rect) -> Line<f64> {
    Line::new(
        coord! { x: rect.min_x(), y: rect.min_y() },
        coord! { x: rect.max_x(), y: rect.max_y() },
    )
}
