use crate::error::{Error, Result};
use crate::point::Coord;
use crate::Region;

/// Axis-aligned rectangle with closed bounds on all four sides.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        // Written as negations so NaN bounds are rejected too.
        if !(min_x <= max_x) || !(min_y <= max_y) {
            return Err(Error::InvalidRectangle(format!(
                "({min_x}, {min_y}, {max_x}, {max_y}) is not ordered min <= max"
            )));
        }
        if [min_x, min_y, max_x, max_y].iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidRectangle(format!(
                "({min_x}, {min_y}, {max_x}, {max_y}) has an infinite bound"
            )));
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Builds a rectangle from `[min_x, min_y, max_x, max_y]`.
    pub fn from_slice(bounds: &[f64]) -> Result<Self> {
        match *bounds {
            [min_x, min_y, max_x, max_y] => Self::new(min_x, min_y, max_x, max_y),
            _ => Err(Error::InvalidRectangle(format!(
                "expected 4 coordinates, got {}",
                bounds.len()
            ))),
        }
    }

    /// Minimal rectangle enclosing every coordinate.
    pub fn bounding<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut coords = coords.into_iter();
        let first = coords.next().ok_or(Error::EmptyInput)?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);

        for c in coords {
            if c.x < min_x {
                min_x = c.x;
            }
            if c.x > max_x {
                max_x = c.x;
            }
            if c.y < min_y {
                min_y = c.y;
            }
            if c.y > max_y {
                max_y = c.y;
            }
        }
        Self::new(min_x, min_y, max_x, max_y)
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// False for rectangles collapsed to a segment or a point.
    pub fn has_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Corners in ring order: (x0, y0), (x1, y0), (x1, y1), (x0, y1).
    pub fn corners(&self) -> [Coord; 4] {
        [
            Coord::new(self.min_x, self.min_y),
            Coord::new(self.max_x, self.min_y),
            Coord::new(self.max_x, self.max_y),
            Coord::new(self.min_x, self.max_y),
        ]
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        self.min_x <= coord.x
            && coord.x <= self.max_x
            && self.min_y <= coord.y
            && coord.y <= self.max_y
    }

    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.min_x <= other.min_x
            && other.max_x <= self.max_x
            && self.min_y <= other.min_y
            && other.max_y <= self.max_y
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        other.min_x <= self.max_x
            && other.max_x >= self.min_x
            && other.min_y <= self.max_y
            && other.max_y >= self.min_y
    }

    /// Splits along both midlines. The order is fixed and decides which child
    /// owns a coordinate lying on a shared edge.
    pub fn quadrants(&self) -> [Rect; 4] {
        let half_width = (self.max_x - self.min_x) / 2.0;
        let half_height = (self.max_y - self.min_y) / 2.0;
        let mid_x = self.min_x + half_width;
        let mid_y = self.min_y + half_height;
        [
            Rect {
                min_x: self.min_x,
                min_y: self.min_y,
                max_x: mid_x,
                max_y: mid_y,
            },
            Rect {
                min_x: self.min_x,
                min_y: mid_y,
                max_x: mid_x,
                max_y: self.max_y,
            },
            Rect {
                min_x: mid_x,
                min_y: mid_y,
                max_x: self.max_x,
                max_y: self.max_y,
            },
            Rect {
                min_x: mid_x,
                min_y: self.min_y,
                max_x: self.max_x,
                max_y: mid_y,
            },
        ]
    }
}

// A region without area holds nothing, so a zero-width or zero-height
// rectangle answers false to every predicate.
impl Region for Rect {
    fn contains_rect(&self, rect: &Rect) -> bool {
        self.has_area() && Rect::contains_rect(self, rect)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.has_area() && self.intersects(rect)
    }

    fn contains_coord(&self, coord: Coord) -> bool {
        self.has_area() && self.contains(coord)
    }
}

/// Position of a child inside its parent, in child order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Quadrant {
    BottomLeft = 0,
    TopLeft = 1,
    TopRight = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub fn index(self) -> usize {
        self as usize
    }
}

pub static QUADRANTS: [Quadrant; 4] = [
    Quadrant::BottomLeft,
    Quadrant::TopLeft,
    Quadrant::TopRight,
    Quadrant::BottomRight,
];
