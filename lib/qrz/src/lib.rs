mod map;
mod projection;
mod qrz;

pub use map::Map;
pub use projection::{Convert, Projection};
pub use qrz::{round, InvalidCube, ParseKeyError, Qrz, DIRECTIONS};
