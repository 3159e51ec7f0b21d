//! # Unit
//!
//! A combatant and its four-state intent machine:
//!
//! ```text
//! Idle -> Moving   -> Idle
//! Idle -> Striking -> Idle   (when the strike sheet runs out)
//! any  -> Dying    -> Idle   (when the death sheet runs out; tombstone)
//! ```
//!
//! Where a unit is drawn and which cell it holds are one value, [`Presence`],
//! so a unit can never hold a cell without a world position. Cell binding is
//! only changed through [`Roster`](crate::common::resources::roster::Roster),
//! which keeps the grid's back-reference in lockstep.

use glam::Vec2;
use qrz::Qrz;
use serde::{Deserialize, Serialize};

use crate::common::{
    components::UnitIdx,
    error::GameError,
    resources::sprites::SpriteSheets,
};

/// Ticks a sprite frame is held before advancing.
pub const ANIMATION_SPEED: u32 = 10;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum UnitAction {
    Idle,
    Moving,
    Striking,
    Dying,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Vitals {
    #[default]
    Alive,
    Dead,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Presence {
    /// Not known to this client.
    #[default]
    Fogged,
    /// Drawn but holding no cell: walking through fog, or a corpse still
    /// playing its death animation.
    Adrift { world: Vec2 },
    Placed { cell: Qrz, world: Vec2 },
}

impl Presence {
    pub fn world(&self) -> Option<Vec2> {
        match *self {
            Presence::Fogged => None,
            Presence::Adrift { world } | Presence::Placed { world, .. } => Some(world),
        }
    }

    pub fn cell(&self) -> Option<Qrz> {
        match *self {
            Presence::Placed { cell, .. } => Some(cell),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub owner: String,
    pub idx: UnitIdx,
    /// World units per second.
    pub speed: f32,
    vitals: Vitals,
    presence: Presence,
    action: UnitAction,
    facing: Facing,
    frame: usize,
    counter: u32,
}

impl Unit {
    pub fn new(owner: impl Into<String>, idx: UnitIdx, speed: f32) -> Self {
        Self {
            owner: owner.into(),
            idx,
            speed,
            vitals: Vitals::Alive,
            presence: Presence::Fogged,
            action: UnitAction::Idle,
            facing: Facing::Right,
            frame: 0,
            counter: 0,
        }
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    pub fn is_dead(&self) -> bool {
        self.vitals == Vitals::Dead
    }

    pub fn is_visible(&self) -> bool {
        !self.is_dead() && self.presence.cell().is_some()
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn world(&self) -> Option<Vec2> {
        self.presence.world()
    }

    pub fn cell(&self) -> Option<Qrz> {
        self.presence.cell()
    }

    pub fn action(&self) -> UnitAction {
        self.action
    }

    pub fn is(&self, action: UnitAction) -> bool {
        self.action == action
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Index into the current action's sprite sheet.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn start_moving(&mut self) {
        self.enter(UnitAction::Moving);
    }

    pub fn strike(&mut self) {
        self.enter(UnitAction::Striking);
    }

    pub fn idle(&mut self) {
        self.enter(UnitAction::Idle);
    }

    /// Mark dead and start the death animation. The corpse keeps its world
    /// position but gives up its cell; the released cell is returned so the
    /// grid can drop its back-reference.
    pub(crate) fn die(&mut self) -> Result<Option<Qrz>, GameError> {
        if self.is_dead() {
            return Err(GameError::AlreadyDead(self.idx));
        }
        self.vitals = Vitals::Dead;
        self.enter(UnitAction::Dying);
        Ok(self.unbind())
    }

    pub fn turn_left(&mut self) {
        self.facing = Facing::Left;
    }

    pub fn turn_right(&mut self) {
        self.facing = Facing::Right;
    }

    /// Face the direction of horizontal travel; zero leaves facing unchanged.
    pub fn face(&mut self, dx: f32) {
        if dx > 0. {
            self.turn_right();
        } else if dx < 0. {
            self.turn_left();
        }
    }

    /// Move the drawn position without touching the cell binding.
    pub(crate) fn set_world(&mut self, world: Vec2) {
        self.presence = match self.presence {
            Presence::Placed { cell, .. } => Presence::Placed { cell, world },
            _ => Presence::Adrift { world },
        };
    }

    pub(crate) fn bind(&mut self, cell: Qrz, world: Vec2) {
        self.presence = Presence::Placed { cell, world };
    }

    /// Placed -> Adrift. Returns the cell given up, if any.
    pub(crate) fn unbind(&mut self) -> Option<Qrz> {
        let Presence::Placed { cell, world } = self.presence else { return None };
        self.presence = Presence::Adrift { world };
        Some(cell)
    }

    /// Drop out of the world entirely. Returns the cell given up, if any.
    pub(crate) fn fog(&mut self) -> Option<Qrz> {
        let cell = self.presence.cell();
        self.presence = Presence::Fogged;
        cell
    }

    /// Advance the animation one tick.
    pub fn update(&mut self, sheets: &impl SpriteSheets) -> Result<(), GameError> {
        self.counter += 1;
        if self.counter < ANIMATION_SPEED {
            return Ok(());
        }
        self.counter = 0;

        let len = sheets.sheet(self.action).ok_or(GameError::MissingSprites(self.action))?.len();
        if self.frame + 1 < len {
            self.frame += 1;
            return Ok(());
        }

        self.frame = 0;
        match self.action {
            UnitAction::Striking => self.idle(),
            UnitAction::Dying => {
                self.idle();
                if self.is_dead() {
                    self.presence = Presence::Fogged;
                }
            }
            UnitAction::Idle | UnitAction::Moving => {}
        }
        Ok(())
    }

    pub fn current_sprite<'a, S: SpriteSheets>(&self, sheets: &'a S) -> Result<&'a S::Sprite, GameError> {
        sheets
            .sheet(self.action)
            .and_then(|sheet| sheet.get(self.frame))
            .ok_or(GameError::MissingSprites(self.action))
    }

    /// Switch action with the counter primed, so the first `update` after a
    /// change already advances the frame.
    fn enter(&mut self, action: UnitAction) {
        if self.action != action {
            self.action = action;
            self.frame = 0;
            self.counter = ANIMATION_SPEED - 1;
        }
    }
}
