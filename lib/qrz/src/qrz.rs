use std::{
    fmt,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axial step vectors in the order neighbours are expanded: east, north-east,
/// north-west, west, south-west, south-east.
pub const DIRECTIONS: [Qrz; 6] = [
    Qrz { q: 1, r: 0 },  // east
    Qrz { q: 1, r: -1 }, // north-east
    Qrz { q: 0, r: -1 }, // north-west
    Qrz { q: -1, r: 0 }, // west
    Qrz { q: -1, r: 1 }, // south-west
    Qrz { q: 0, r: 1 },  // south-east
];

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("q + r + s must be 0, got ({q}, {r}, {s})")]
pub struct InvalidCube {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("malformed hex key {0:?}, expected \"q_r\"")]
pub struct ParseKeyError(pub String);

/// Cube coordinate on a hex grid.
///
/// Only `q` and `r` are stored; `s` is always `-q-r`, so the cube invariant
/// cannot be broken once a value exists. The stable key of a coordinate is its
/// `Display` form, `"{q}_{r}"`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Qrz {
    pub q: i32,
    pub r: i32,
}

impl Qrz {
    pub const ORIGIN: Qrz = Qrz { q: 0, r: 0 };

    /// Build from a full cube triple, rejecting triples off the q+r+s=0 plane.
    pub fn new(q: i32, r: i32, s: i32) -> Result<Qrz, InvalidCube> {
        if q + r + s != 0 {
            return Err(InvalidCube { q, r, s });
        }
        Ok(Qrz { q, r })
    }

    pub const fn axial(q: i32, r: i32) -> Qrz {
        Qrz { q, r }
    }

    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn distance(&self, other: &Qrz) -> i32 {
        (self.q - other.q)
            .abs()
            .max((self.r - other.r).abs())
            .max((self.s() - other.s()).abs())
    }

    pub fn is_neighbor(&self, other: &Qrz) -> bool {
        self.distance(other) == 1
    }

    pub fn neighbors(&self) -> [Qrz; 6] {
        DIRECTIONS.map(|dir| *self + dir)
    }

    /// Every coordinate within `radius` of the origin, in ascending q then r.
    pub fn hexagon(radius: i32) -> impl Iterator<Item = Qrz> {
        (-radius..=radius).flat_map(move |q| {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            (r1..=r2).map(move |r| Qrz { q, r })
        })
    }
}

impl fmt::Display for Qrz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.q, self.r)
    }
}

impl FromStr for Qrz {
    type Err = ParseKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseKeyError(key.to_owned());
        let (q, r) = key.split_once('_').ok_or_else(malformed)?;
        let q = q.parse().map_err(|_| malformed())?;
        let r = r.parse().map_err(|_| malformed())?;
        Ok(Qrz { q, r })
    }
}

impl Mul<i32> for Qrz {
    type Output = Qrz;
    fn mul(self, rhs: i32) -> Self::Output {
        Qrz { q: self.q * rhs, r: self.r * rhs }
    }
}

impl Add<Qrz> for Qrz {
    type Output = Qrz;
    fn add(self, rhs: Qrz) -> Self::Output {
        Qrz { q: self.q + rhs.q, r: self.r + rhs.r }
    }
}

impl Sub<Qrz> for Qrz {
    type Output = Qrz;
    fn sub(self, rhs: Qrz) -> Self::Output {
        Qrz { q: self.q - rhs.q, r: self.r - rhs.r }
    }
}

/// Round a fractional cube coordinate to the nearest hex.
///
/// The component with the largest rounding error is recomputed from the other
/// two so the result stays on the q+r+s=0 plane.
pub fn round(q0: f64, r0: f64, s0: f64) -> Qrz {
    let mut q = q0.round();
    let mut r = r0.round();
    let s = s0.round();

    let q_diff = (q - q0).abs();
    let r_diff = (r - r0).abs();
    let s_diff = (s - s0).abs();

    if q_diff > r_diff && q_diff > s_diff {
        q = -r - s;
    } else if r_diff > s_diff {
        r = -q - s;
    }

    Qrz { q: q as i32, r: r as i32 }
}
