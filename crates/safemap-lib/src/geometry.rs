//! Planar coordinates and the rounding rule that turns them into node keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Decimal digits kept when collapsing endpoint coordinates into node keys.
pub const NODE_PRECISION_DIGITS: i32 = 6;

const NODE_SCALE: f64 = 1_000_000.0;

/// Largest absolute coordinate that still scales into an `i64` node key.
pub const MAX_NODE_COORDINATE: f64 = 9.0e12;

/// A 2D coordinate pair in the dataset's own coordinate system.
///
/// No reprojection happens anywhere in the crate; distances are plain
/// Euclidean distances over whatever units the dataset uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another coordinate.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether both axes are finite and within [`MAX_NODE_COORDINATE`], so
    /// the node key is exact rather than saturated.
    pub fn fits_node_key(&self) -> bool {
        self.is_finite()
            && self.x.abs() <= MAX_NODE_COORDINATE
            && self.y.abs() <= MAX_NODE_COORDINATE
    }

    /// Round to the node precision, using round-half-to-even so values exactly
    /// on a boundary collapse the same way every time.
    pub fn node_key(&self) -> NodeKey {
        NodeKey {
            x: scale(self.x),
            y: scale(self.y),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    /// Parse `"x,y"` (surrounding whitespace allowed).
    fn from_str(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidCoordinate {
            input: input.to_string(),
        };

        let (x, y) = input.split_once(',').ok_or_else(invalid)?;
        let x: f64 = x.trim().parse().map_err(|_| invalid())?;
        let y: f64 = y.trim().parse().map_err(|_| invalid())?;
        let coordinate = Coordinate { x, y };
        if !coordinate.is_finite() {
            return Err(invalid());
        }
        Ok(coordinate)
    }
}

/// Parse a request of the form `"x1,y1;x2,y2"` into a start and end pair.
pub fn parse_coordinate_pair(input: &str) -> Result<(Coordinate, Coordinate)> {
    let (start, end) = input
        .split_once(';')
        .ok_or_else(|| Error::InvalidCoordinate {
            input: input.to_string(),
        })?;
    Ok((start.parse()?, end.parse()?))
}

/// Exact identity of a graph node: coordinates in integer micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    x: i64,
    y: i64,
}

impl NodeKey {
    /// The rounded coordinate this key stands for.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            x: self.x as f64 / NODE_SCALE,
            y: self.y as f64 / NODE_SCALE,
        }
    }
}

fn scale(value: f64) -> i64 {
    (value * NODE_SCALE).round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_with_whitespace() {
        let c: Coordinate = " 37.519457 , 55.541895 ".parse().unwrap();
        assert_eq!(c, Coordinate::new(37.519457, 55.541895));
    }

    #[test]
    fn rejects_malformed_coordinates() {
        for input in ["", "1", "1;2", "a,b", "1,NaN", "1,inf"] {
            let err = input.parse::<Coordinate>().expect_err(input);
            assert!(matches!(err, Error::InvalidCoordinate { .. }), "{input}");
        }
    }

    #[test]
    fn parses_request_pair() {
        let (start, end) = parse_coordinate_pair("37.5,55.5;37.6,55.6").unwrap();
        assert_eq!(start, Coordinate::new(37.5, 55.5));
        assert_eq!(end, Coordinate::new(37.6, 55.6));
        assert!(parse_coordinate_pair("37.5,55.5").is_err());
    }

    #[test]
    fn near_duplicates_share_a_node_key() {
        let a = Coordinate::new(37.123_456_7, 55.000_000_1);
        let b = Coordinate::new(37.123_457_2, 54.999_999_9);
        assert_eq!(a.node_key(), b.node_key());
        assert_eq!(a.node_key().coordinate(), Coordinate::new(37.123457, 55.0));
    }

    #[test]
    fn distinct_coordinates_keep_distinct_keys() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.000_001, 0.0);
        assert_ne!(a.node_key(), b.node_key());
    }

    #[test]
    fn node_key_range_is_bounded() {
        assert!(Coordinate::new(-MAX_NODE_COORDINATE, MAX_NODE_COORDINATE).fits_node_key());
        assert!(!Coordinate::new(1.0e13, 0.0).fits_node_key());
        assert!(!Coordinate::new(0.0, -1.0e13).fits_node_key());
        assert!(!Coordinate::new(f64::NAN, 0.0).fits_node_key());

        // Both would saturate to the same key without the bound.
        let far = Coordinate::new(1.0e13, 0.0).node_key();
        let farther = Coordinate::new(2.0e13, 0.0).node_key();
        assert_eq!(far, farther);
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Coordinate::new(0.0, 0.0).distance_to(&Coordinate::new(3.0, 4.0));
        assert_eq!(d, 5.0);
    }
}
