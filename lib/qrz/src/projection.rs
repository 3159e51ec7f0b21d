//! # Projection: hex <-> continuous world space
//!
//! Pointy-top orientation: each hexagon has a vertex pointing up. The affine
//! forward matrix takes `(q, r)` to `(x, y)`; the inverse takes a world point
//! back to a fractional cube coordinate, which is then rounded with
//! [`round`](crate::round). Both axes are scaled independently by `size`, so a
//! squashed (isometric-looking) grid is just a smaller `size.y`.
//!
//! ```rust
//! use glam::Vec2;
//! use qrz::{Convert, Projection, Qrz};
//!
//! let projection = Projection::new(Vec2::new(100., 50.));
//! let world: Vec2 = projection.convert(Qrz::axial(2, -1));
//! let back: Qrz = projection.convert(world);
//! assert_eq!(back, Qrz::axial(2, -1));
//! ```

use std::f64::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::qrz::{self, Qrz};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Affine transformation matrices for pointy-top hex orientation:
/// (forward matrix, inverse matrix, start angle in multiples of 60 degrees).
const ORIENTATION: ([f64; 4], [f64; 4], f64) = (
    [SQRT_3, SQRT_3 / 2., 0., 3. / 2.],
    [SQRT_3 / 3., -1. / 3., 0., 2. / 3.],
    0.5,
);

/// Bidirectional coordinate conversion
pub trait Convert<T, U> {
    /// Convert from type T to type U
    fn convert(&self, it: T) -> U;
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Projection {
    size: Vec2,
}

impl Projection {
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// The six corners of the hexagon around `center`, clockwise from the
    /// upper-right one.
    pub fn corners(&self, center: Vec2) -> [Vec2; 6] {
        std::array::from_fn(|i| {
            let angle = PI / 180. * 60. * (i as f64 - ORIENTATION.2);
            center
                + Vec2::new(
                    (self.size.x as f64 * angle.cos()) as f32,
                    (self.size.y as f64 * angle.sin()) as f32,
                )
        })
    }
}

impl Convert<Vec2, Qrz> for Projection {
    fn convert(&self, other: Vec2) -> Qrz {
        let x = other.x as f64 / self.size.x as f64;
        let y = other.y as f64 / self.size.y as f64;
        let q = ORIENTATION.1[0] * x + ORIENTATION.1[1] * y;
        let r = ORIENTATION.1[2] * x + ORIENTATION.1[3] * y;
        qrz::round(q, r, -q - r)
    }
}

impl Convert<Qrz, Vec2> for Projection {
    fn convert(&self, other: Qrz) -> Vec2 {
        let x = (ORIENTATION.0[0] * other.q as f64 + ORIENTATION.0[1] * other.r as f64) * self.size.x as f64;
        let y = (ORIENTATION.0[2] * other.q as f64 + ORIENTATION.0[3] * other.r as f64) * self.size.y as f64;
        Vec2::new(x as f32, y as f32)
    }
}
