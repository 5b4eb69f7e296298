//! Coordinate keys, fixed-width rendering and great-circle distance.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching the
//! `geo` convention.

use std::fmt;

use geo::Coord;

/// Mean Earth radius in metres used by [`haversine_distance`].
pub const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// Decimal places used when building a [`CoordKey`].
pub const KEY_PRECISION: usize = 8;

/// Decimal places written to the fixed-width coordinate files.
pub const FILE_PRECISION: usize = 6;

/// Column width of a longitude or latitude in the fixed-width files.
pub const FILE_COLUMN_WIDTH: usize = 11;

/// Exact-match key for a coordinate, `"<lat>,<lon>"` at eight decimals.
///
/// Two coordinates are treated as the same stop when their keys are equal.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use stopdelta_core::CoordKey;
///
/// let key = CoordKey::from_coord(Coord { x: 8.5, y: 47.25 });
/// assert_eq!(key.as_str(), "47.25000000,8.50000000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(String);

impl CoordKey {
    /// Build the key for a longitude/latitude pair.
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self(format!("{lat:.prec$},{lon:.prec$}", prec = KEY_PRECISION))
    }

    /// Build the key for a `geo` coordinate.
    #[must_use]
    pub fn from_coord(location: Coord<f64>) -> Self {
        Self::new(location.x, location.y)
    }

    /// Borrow the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a coordinate as `<lon:>11.6f><lat:>11.6f>`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use stopdelta_core::coord::fixed_columns;
///
/// assert_eq!(
///     fixed_columns(Coord { x: 12.3456, y: 47.1234 }),
///     "  12.345600  47.123400"
/// );
/// ```
#[must_use]
pub fn fixed_columns(location: Coord<f64>) -> String {
    format!(
        "{lon:>width$.prec$}{lat:>width$.prec$}",
        lon = location.x,
        lat = location.y,
        width = FILE_COLUMN_WIDTH,
        prec = FILE_PRECISION,
    )
}

/// Round a coordinate to the precision stored in the fixed-width files.
///
/// A location read back from a ledger line equals the snapped location that
/// was written, so keys built from either side agree.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use stopdelta_core::coord::snap_to_file_grid;
///
/// let snapped = snap_to_file_grid(Coord { x: 8.123_456_789, y: 47.5 });
/// assert_eq!(snapped, Coord { x: 8.123_457, y: 47.5 });
/// ```
#[must_use]
pub fn snap_to_file_grid(location: Coord<f64>) -> Coord<f64> {
    let snap = |value: f64| {
        format!("{value:.prec$}", prec = FILE_PRECISION)
            .parse::<f64>()
            .unwrap_or(value)
    };
    Coord {
        x: snap(location.x),
        y: snap(location.y),
    }
}

/// Great-circle distance in metres between two coordinates.
///
/// Uses the haversine formula `R * 2 * atan2(sqrt(a), sqrt(1 - a))` with
/// `a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)` and
/// [`EARTH_RADIUS_METRES`]. The exact formula matters: the spatial
/// deduplicator's threshold boundary must be reproducible across runs.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use stopdelta_core::haversine_distance;
///
/// let a = Coord { x: 8.0, y: 47.0 };
/// let b = Coord { x: 8.0, y: 47.0005 };
/// let metres = haversine_distance(a, b);
/// assert!((metres - 55.6).abs() < 0.1);
/// ```
#[must_use]
pub fn haversine_distance(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let phi1 = from.y.to_radians();
    let phi2 = to.y.to_radians();
    let delta_phi = (to.y - from.y).to_radians();
    let delta_lambda = (to.x - from.x).to_radians();
    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    EARTH_RADIUS_METRES * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Coord { x: 8.0, y: 47.0 }, "47.00000000,8.00000000")]
    #[case(Coord { x: -0.123_456_789, y: 51.5 }, "51.50000000,-0.12345679")]
    fn keys_use_eight_decimals_latitude_first(#[case] location: Coord<f64>, #[case] expected: &str) {
        assert_eq!(CoordKey::from_coord(location).as_str(), expected);
    }

    #[rstest]
    fn keys_for_rounded_equal_coordinates_match() {
        let a = CoordKey::new(8.123_456_781, 47.0);
        let b = CoordKey::new(8.123_456_779, 47.0);
        assert_eq!(a, b);
    }

    #[rstest]
    fn fixed_columns_pad_negative_values() {
        assert_eq!(
            fixed_columns(Coord { x: -3.5, y: 40.25 }),
            "  -3.500000  40.250000"
        );
    }

    #[rstest]
    fn snapped_coordinates_survive_a_file_round_trip() {
        let snapped = snap_to_file_grid(Coord { x: 7.439_123_4, y: 46.948_765_4 });
        let columns = fixed_columns(snapped);
        let parsed: Vec<f64> = columns
            .split_whitespace()
            .map(|token| token.parse().expect("number"))
            .collect();
        assert_eq!(parsed, [snapped.x, snapped.y]);
    }

    #[rstest]
    fn identical_points_are_zero_metres_apart() {
        let point = Coord { x: 7.44, y: 46.95 };
        assert!(haversine_distance(point, point).abs() < f64::EPSILON);
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = Coord { x: 7.44, y: 46.95 };
        let b = Coord { x: 8.54, y: 47.37 };
        let forward = haversine_distance(a, b);
        let backward = haversine_distance(b, a);
        assert!((forward - backward).abs() < 1.0e-6);
        // Bern to Zurich is roughly 95 km.
        assert!((94_000.0..97_000.0).contains(&forward), "got {forward}");
    }

    #[rstest]
    fn one_degree_of_latitude_matches_radius() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 0.0, y: 1.0 };
        let expected = EARTH_RADIUS_METRES * 1.0_f64.to_radians();
        assert!((haversine_distance(a, b) - expected).abs() < 1.0e-6);
    }
}
