pub mod camera;
pub mod preview;
