//! Rounded-coordinate join keys.

use std::fmt;

use geo::{Centroid, Coord, Geometry};
use wildfire_rehab_feature::models::GeometryKind;

/// Number of key units per coordinate unit (three decimals).
const SCALE: f64 = 1000.0;

/// A coordinate rounded to three decimals, held as integer thousandths so
/// equal keys hash equally.
///
/// Rounding works on the exact decimal value of the `f64`, with exact ties
/// going to even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    x: i64,
    y: i64,
}

impl CoordKey {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: thousandths(x),
            y: thousandths(y),
        }
    }

    #[must_use]
    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

/// Rounds through the decimal formatter rather than scaling first, since
/// `x * 1000.0` can itself round across a `.0005` boundary.
#[allow(clippy::cast_possible_truncation)]
fn thousandths(value: f64) -> i64 {
    format!("{value:.3}")
        .replace('.', "")
        .parse()
        .unwrap_or_else(|_| (value * SCALE) as i64)
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", Thousandths(self.x), Thousandths(self.y))
    }
}

struct Thousandths(i64);

impl fmt::Display for Thousandths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / 1000, abs % 1000)
    }
}

/// Join key of a feature.
///
/// Line keys are ordered: a line digitized in the opposite direction has a
/// different fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fingerprint {
    Point(CoordKey),
    Line { first: CoordKey, last: CoordKey },
}

impl Fingerprint {
    /// Computes the fingerprint of `geometry` as a feature of `kind`.
    ///
    /// Returns `None` for empty geometries.
    #[must_use]
    pub fn of(kind: GeometryKind, geometry: &Geometry<f64>) -> Option<Self> {
        match kind {
            GeometryKind::Point => geometry
                .centroid()
                .map(|c| Self::Point(CoordKey::from_coord(c.0))),
            GeometryKind::Polyline => {
                let (first, last) = endpoints(geometry)?;
                Some(Self::Line {
                    first: CoordKey::from_coord(first),
                    last: CoordKey::from_coord(last),
                })
            }
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(key) => write!(f, "{key}"),
            Self::Line { first, last } => write!(f, "({first}, {last})"),
        }
    }
}

/// First vertex of the first part and last vertex of the last part.
fn endpoints(geometry: &Geometry<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    match geometry {
        Geometry::LineString(ls) => Some((*ls.0.first()?, *ls.0.last()?)),
        Geometry::MultiLineString(mls) => {
            let first = mls.0.iter().find_map(|part| part.0.first())?;
            let last = mls.0.iter().rev().find_map(|part| part.0.last())?;
            Some((*first, *last))
        }
        Geometry::Line(line) => Some((line.start, line.end)),
        _ => None,
    }
}
