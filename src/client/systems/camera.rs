use glam::Vec2;

use crate::{client::config::GameConfig, common::resources::layout::Layout};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pan {
    Up,
    Down,
    Left,
    Right,
}

/// Held camera keys.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CameraControl {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl CameraControl {
    pub fn set(&mut self, pan: Pan, pressed: bool) {
        match pan {
            Pan::Up => self.up = pressed,
            Pan::Down => self.down = pressed,
            Pan::Left => self.left = pressed,
            Pan::Right => self.right = pressed,
        }
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Unit direction the board slides in; opposite keys cancel.
    pub fn direction(&self) -> Vec2 {
        let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }

    /// Pan the layout for one tick. Diagonals move no faster than a single
    /// axis; zoom slows panning down.
    pub fn pan(&self, layout: &mut Layout, config: &GameConfig, dt: f32) -> bool {
        let direction = self.direction();
        if direction == Vec2::ZERO {
            return false;
        }
        layout.update_camera_offset(direction * config.camera_speed / config.pixel_ratio * dt)
    }
}
