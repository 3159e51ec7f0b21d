use std::collections::HashMap;

use crate::common::components::unit::UnitAction;

/// Read-only source of per-action animation frames.
///
/// The engine only asks how long a sheet is and which entry the cursor points
/// at; what a sprite actually is belongs to the renderer.
pub trait SpriteSheets {
    type Sprite;

    fn sheet(&self, action: UnitAction) -> Option<&[Self::Sprite]>;
}

/// Sprite sheets as plain atlas frame indices, for headless runs.
#[derive(Clone, Debug, Default)]
pub struct FrameTable {
    sheets: HashMap<UnitAction, Vec<usize>>,
}

impl FrameTable {
    /// Same frame count for every action.
    pub fn uniform(frames: usize) -> Self {
        [UnitAction::Idle, UnitAction::Moving, UnitAction::Striking, UnitAction::Dying]
            .into_iter()
            .fold(Self::default(), |table, action| table.with(action, frames))
    }

    pub fn with(mut self, action: UnitAction, frames: usize) -> Self {
        self.sheets.insert(action, (0..frames).collect());
        self
    }
}

impl SpriteSheets for FrameTable {
    type Sprite = usize;

    fn sheet(&self, action: UnitAction) -> Option<&[usize]> {
        self.sheets.get(&action).map(Vec::as_slice)
    }
}
