//! Membership oracle for the managed territory.
//!
//! The pipeline never decides on its own whether a stop lies inside the
//! territory; it asks a [`Territory`]. Boundary data is supplied by the caller.

use geo::{Contains, Coord, Intersects, MultiPolygon, Polygon, Rect};

/// Decide whether a coordinate belongs to the managed territory.
///
/// # Examples
/// ```
/// use geo::{Coord, Rect};
/// use stopdelta_core::Territory;
///
/// let bounds = Rect::new(Coord { x: 5.9, y: 45.8 }, Coord { x: 10.5, y: 47.9 });
/// assert!(bounds.contains_stop(Coord { x: 7.44, y: 46.95 }));
/// assert!(!bounds.contains_stop(Coord { x: 2.35, y: 48.85 }));
/// ```
pub trait Territory {
    /// Return `true` when `location` lies within the territory.
    fn contains_stop(&self, location: Coord<f64>) -> bool;
}

/// Territory accepting every coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Unbounded;

impl Territory for Unbounded {
    fn contains_stop(&self, _location: Coord<f64>) -> bool {
        true
    }
}

impl Territory for Polygon<f64> {
    fn contains_stop(&self, location: Coord<f64>) -> bool {
        self.contains(&location)
    }
}

impl Territory for MultiPolygon<f64> {
    fn contains_stop(&self, location: Coord<f64>) -> bool {
        self.contains(&location)
    }
}

impl Territory for Rect<f64> {
    fn contains_stop(&self, location: Coord<f64>) -> bool {
        // `Intersects` treats boundary points as inside the rectangle.
        self.intersects(&location)
    }
}

impl<F> Territory for F
where
    F: Fn(Coord<f64>) -> bool,
{
    fn contains_stop(&self, location: Coord<f64>) -> bool {
        self(location)
    }
}
