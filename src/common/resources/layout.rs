use glam::Vec2;
use qrz::{Convert, Projection, Qrz};

/// Hex <-> world <-> screen transforms plus the panned camera.
///
/// World space is centred on hex (0,0). Screen space is world space shifted by
/// `origin` (where the renderer puts the board) and the accumulated camera
/// offset.
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    projection: Projection,
    origin: Vec2,
    camera: Vec2,
    radius: i32,
}

impl Layout {
    pub fn new(size: Vec2, origin: Vec2, radius: i32) -> Self {
        Self { projection: Projection::new(size), origin, camera: Vec2::ZERO, radius }
    }

    pub fn size(&self) -> Vec2 {
        self.projection.size()
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn camera_offset(&self) -> Vec2 {
        self.camera
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: i32) {
        self.radius = radius;
    }

    pub fn hex_to_world(&self, qrz: Qrz) -> Vec2 {
        self.projection.convert(qrz)
    }

    pub fn world_to_hex(&self, world: Vec2) -> Qrz {
        self.projection.convert(world)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen - self.origin - self.camera
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world + self.origin + self.camera
    }

    pub fn hex_to_screen(&self, qrz: Qrz) -> Vec2 {
        self.world_to_screen(self.hex_to_world(qrz))
    }

    pub fn screen_to_hex(&self, screen: Vec2) -> Qrz {
        self.world_to_hex(self.screen_to_world(screen))
    }

    /// Screen-space outline of `qrz`.
    pub fn corners(&self, qrz: Qrz) -> [Vec2; 6] {
        self.projection.corners(self.hex_to_screen(qrz))
    }

    /// Pan by `delta`. Each axis saturates on its own at `radius * size`; an
    /// axis that would leave that box keeps its old value. Returns whether
    /// either axis moved.
    pub fn update_camera_offset(&mut self, delta: Vec2) -> bool {
        let max = self.size() * self.radius as f32;
        let next = self.camera + delta;
        let mut updated = false;

        if next.x.abs() <= max.x {
            self.camera.x = next.x;
            updated = true;
        }
        if next.y.abs() <= max.y {
            self.camera.y = next.y;
            updated = true;
        }
        updated
    }

    pub fn reset_camera_offset(&mut self) {
        self.camera = Vec2::ZERO;
    }

    pub fn update_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }
}
