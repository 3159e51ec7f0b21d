use glam::Vec2;
use qrz::Qrz;

use crate::common::{
    components::{
        movement_state::MovementState,
        unit::{Unit, UnitAction},
        UnitIdx,
    },
    error::GameError,
    resources::{
        grid::Grid,
        layout::Layout,
        roster::Roster,
        turn::TurnAuthority,
        visibility::{Fov, Visibility},
        Identity,
    },
};

/// All engine state of one match.
///
/// Fields are public so systems can borrow them independently, e.g. the
/// roster mutably alongside the grid.
#[derive(Clone, Debug)]
pub struct Battle {
    pub grid: Grid,
    pub layout: Layout,
    pub roster: Roster,
    pub visibility: Visibility,
    pub turn: TurnAuthority,
    pub identity: Identity,
    /// Steps left for whichever unit is currently walking.
    pub movement: MovementState,
}

impl Battle {
    pub fn new(layout: Layout, identity: Identity) -> Self {
        Self {
            grid: Grid::default(),
            layout,
            roster: Roster::default(),
            visibility: Visibility::default(),
            turn: TurnAuthority::default(),
            identity,
            movement: MovementState::default(),
        }
    }

    pub fn active_unit(&self) -> Result<&Unit, GameError> {
        self.roster.unit(self.turn.active())
    }

    pub fn active_unit_mut(&mut self) -> Result<&mut Unit, GameError> {
        self.roster.unit_mut(self.turn.active())
    }

    pub fn is_ally(&self, unit: &Unit) -> bool {
        self.identity.is_ally(&unit.owner)
    }

    pub fn is_enemy(&self, unit: &Unit) -> bool {
        self.identity.is_enemy(&unit.owner)
    }

    /// Whether the local player could order `attacker` to hit `target` right now.
    pub fn can_attack(&self, attacker: UnitIdx, target: Qrz) -> bool {
        let Some(attacker) = self.roster.get(attacker) else { return false };
        let Some(from) = attacker.cell() else { return false };
        let Some(cell) = self.grid.get(target) else { return false };
        let Some(occupant) = cell.occupant.and_then(|idx| self.roster.get(idx)) else { return false };

        !cell.is_obstacle
            && self.visibility.is_visible(target)
            && self.is_enemy(occupant)
            && self.is_ally(attacker)
            && from.is_neighbor(&target)
    }

    /// The active unit belongs to the local player and is waiting for orders.
    pub fn can_active_unit_act(&self) -> bool {
        self.active_unit().is_ok_and(|unit| unit.is(UnitAction::Idle) && self.is_ally(unit))
    }

    /// World position of a visible cell's occupant, for renderers and facing.
    pub fn occupant_world(&self, qrz: Qrz) -> Option<Vec2> {
        let idx = self.grid.get(qrz)?.occupant?;
        self.roster.get(idx)?.world()
    }
}
