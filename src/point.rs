/// A bare (x, y) position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Hashable identity of the coordinate. `-0.0` and `0.0` share a key.
    pub(crate) fn key(self) -> CoordKey {
        CoordKey((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CoordKey(u64, u64);

/// A position carrying an opaque payload.
///
/// Two points are equal when both their coordinates and their payloads are
/// equal. The tree itself only ever looks at the coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point<T = ()> {
    pub x: f64,
    pub y: f64,
    pub data: T,
}

impl Point<()> {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, data: () }
    }
}

impl<T> Point<T> {
    pub fn with_data(x: f64, y: f64, data: T) -> Self {
        Self { x, y, data }
    }
}

/// Extracts the coordinate of anything that can be stored in a tree.
pub trait Locate {
    fn coord(&self) -> Coord;
}

impl Locate for Coord {
    fn coord(&self) -> Coord {
        *self
    }
}

impl<T> Locate for Point<T> {
    fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

impl Locate for (f64, f64) {
    fn coord(&self) -> Coord {
        Coord::new(self.0, self.1)
    }
}

impl Locate for [f64; 2] {
    fn coord(&self) -> Coord {
        Coord::new(self[0], self[1])
    }
}

impl Locate for geo::Coord<f64> {
    fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

impl Locate for geo::Point<f64> {
    fn coord(&self) -> Coord {
        Coord::new(self.x(), self.y())
    }
}

impl<L: Locate + ?Sized> Locate for &L {
    fn coord(&self) -> Coord {
        (**self).coord()
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
