//! Per-tick stepping of the walking unit.
//!
//! The unit glides toward the centre of its next goal at `speed` world units
//! per second. Its cell follows the world position: whenever rounding the new
//! position lands in a different cell, the front step's snapshot (if any) is
//! applied first and the unit is rebound second, both inside the same tick.
//! Both are checked before the tick moves anything, so a crossing that cannot
//! be applied fails with the unit, the enemies and the FOV as they were.
//! Walking into a cell that is in fog unbinds instead, leaving the unit drawn
//! but untracked until a later snapshot or rebind catches it.

use log::{debug, trace};
use qrz::Qrz;

use crate::common::{
    battle::Battle,
    components::{movement_state::StepSnapshot, unit::UnitAction, UnitIdx},
    error::GameError,
    resources::visibility::Fov,
};

/// Advance the active unit by `dt` seconds.
pub fn step_active_unit(battle: &mut Battle, dt: f32) -> Result<(), GameError> {
    let idx = battle.turn.active();
    let unit = battle.roster.unit(idx)?;
    if !unit.is(UnitAction::Moving) {
        return Ok(());
    }

    let Some(goal) = battle.movement.next_goal() else {
        let visible = unit.is_visible();
        battle.roster.unit_mut(idx)?.idle();
        if !visible {
            battle.roster.hide(idx, &mut battle.grid)?;
        }
        debug!("unit {idx} finished moving");
        return Ok(());
    };

    let world = unit.world().ok_or(GameError::UnitNotInWorld(idx))?;
    let target = battle.layout.hex_to_world(goal);
    let goal_visible = battle.visibility.is_visible(goal);

    let delta = target - world;
    let distance = delta.length();
    let reach = unit.speed * dt;
    let arrived = distance <= f32::EPSILON || distance < reach;
    let next = if arrived { target } else { world + delta / distance * reach };

    let prev_cell = battle.layout.world_to_hex(world);
    let new_cell = battle.layout.world_to_hex(next);
    for cell in [prev_cell, new_cell] {
        if !battle.grid.contains(cell) {
            return Err(GameError::OffGrid(cell));
        }
    }

    let crossing = prev_cell != new_cell;
    if crossing && goal_visible {
        let pending = battle.movement.peek_snapshot();
        if let Some(snapshot) = pending {
            battle.roster.check_enemy_positions(&snapshot.enemies, &battle.identity, &battle.grid)?;
        }
        if entry_blocked(battle, idx, new_cell, pending) {
            return Err(GameError::OccupiedCell(new_cell));
        }
    }

    let unit = battle.roster.unit_mut(idx)?;
    unit.face(delta.x);
    unit.set_world(next);

    if crossing {
        let snapshot = battle.movement.consume_snapshot();
        if goal_visible {
            if let Some(snapshot) = snapshot {
                apply_snapshot(battle, snapshot)?;
            }
            battle.roster.rebind(idx, new_cell, &mut battle.grid)?;
            trace!("unit {idx} crossed {prev_cell} -> {new_cell}");
        } else {
            battle.roster.unbind(idx, &mut battle.grid)?;
            trace!("unit {idx} crossed {prev_cell} -> {new_cell} into fog");
        }
    }

    if arrived {
        battle.movement.advance_one_cell();
    }
    Ok(())
}

/// Reposition enemies, then replace the FOV if the step carries one. A
/// rejected enemy list leaves both untouched.
pub fn apply_snapshot(battle: &mut Battle, snapshot: StepSnapshot) -> Result<(), GameError> {
    battle
        .roster
        .apply_enemy_positions(&snapshot.enemies, &battle.identity, &mut battle.grid, &battle.layout)?;
    if let Some(visibility) = snapshot.visibility {
        battle.visibility.set_visibility(visibility);
    }
    debug!("applied step snapshot with {} sightings", snapshot.enemies.len());
    Ok(())
}

/// Whether unit `idx` could not be bound to `cell` once `snapshot`, if any,
/// has repositioned the enemies. Every live enemy either moves to its listed
/// cell or is hidden, so only listed enemies and non-enemies can block.
fn entry_blocked(battle: &Battle, idx: UnitIdx, cell: Qrz, snapshot: Option<&StepSnapshot>) -> bool {
    let Some(target) = battle.grid.get(cell) else { return true };
    if target.is_obstacle {
        return true;
    }
    let Some(snapshot) = snapshot else {
        return target.occupant.is_some_and(|other| other != idx);
    };

    let is_enemy = |other: UnitIdx| {
        battle.roster.get(other).is_some_and(|unit| !unit.is_dead() && battle.is_enemy(unit))
    };
    snapshot.enemies.iter().any(|(&other, &at)| at == cell && other != idx && is_enemy(other))
        || target.occupant.is_some_and(|other| other != idx && !is_enemy(other))
}
