//! Checks inbound server events against the current battle before anything is
//! mutated.
//!
//! Every function here takes `&Battle` and returns either a fully resolved
//! value for the caller to apply, or the first named violation found. None of
//! them change state.

use std::collections::{HashMap, HashSet};

use qrz::Qrz;

use crate::common::{
    battle::Battle,
    components::{movement_state::*, UnitIdx},
    error::GameError,
    message::*,
    resources::{visibility::Fov, Identity},
};

#[derive(Clone, Debug, PartialEq)]
pub struct ValidAttack {
    pub attacker: UnitIdx,
    pub target: UnitIdx,
    pub target_cell: Qrz,
    /// Horizontal offset from attacker to target, for facing.
    pub dx: f32,
    pub fov: HashSet<Qrz>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyAppearance {
    pub unit: UnitIdx,
    /// Where the enemy comes into view.
    pub start: Qrz,
    pub goals: Vec<Qrz>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidShrink {
    pub level: i32,
    pub dead: Vec<UnitIdx>,
    pub fov: HashSet<Qrz>,
}

pub fn parse_keys(keys: &[String]) -> Result<HashSet<Qrz>, GameError> {
    keys.iter().map(|key| key.parse::<Qrz>().map_err(GameError::from)).collect()
}

fn require_active(battle: &Battle, idx: UnitIdx) -> Result<(), GameError> {
    if !battle.turn.is_active(idx) {
        return Err(GameError::UnitNotActive(idx));
    }
    Ok(())
}

fn resolve(battle: &Battle, qrz: Qrz) -> Result<Qrz, GameError> {
    battle.grid.cell(qrz).map(|_| qrz)
}

pub fn validate_attack(battle: &Battle, data: &UnitAttack) -> Result<ValidAttack, GameError> {
    let idx = data.attacker_idx;
    require_active(battle, idx)?;

    let attacker = battle.roster.unit(idx)?;
    let attacker_world = attacker.world().ok_or(GameError::AttackerNotVisible(idx))?;

    let target_cell = data.target_coords;
    let cell = battle.grid.cell(target_cell)?;
    let target_idx = cell.occupant.ok_or(GameError::NoTargetUnit(target_cell))?;
    let target = battle.roster.unit(target_idx)?;
    let target_world = target.world().ok_or(GameError::TargetNotVisible(target_cell))?;

    let from = attacker.cell().ok_or(GameError::AttackerUnbound(idx))?;
    if cell.is_obstacle {
        return Err(GameError::ObstacleTarget(target_cell));
    }
    if !battle.visibility.is_visible(target_cell) {
        return Err(GameError::TargetNotVisible(target_cell));
    }
    if target.owner == attacker.owner {
        return Err(GameError::NotAnEnemy(target_cell));
    }
    if !from.is_neighbor(&target_cell) {
        return Err(GameError::NotAdjacent { from, target: target_cell });
    }

    Ok(ValidAttack {
        attacker: idx,
        target: target_idx,
        target_cell,
        dx: target_world.x - attacker_world.x,
        fov: parse_keys(&data.fov)?,
    })
}

/// Resolve an ally move into steps. A step carries a snapshot when the
/// server sent an FOV list for it or saw at least one enemy from it.
pub fn validate_ally_move(battle: &Battle, data: &AllyMove) -> Result<Vec<MoveStep>, GameError> {
    require_active(battle, data.unit_idx)?;
    if data.path.is_empty() {
        return Err(GameError::EmptyPath);
    }
    let (goals, visibility, enemies) =
        (data.path.len(), data.path_fov.len(), data.visible_units_along_path.len());
    if visibility > goals || enemies > goals {
        return Err(GameError::SnapshotMismatch { goals, visibility, enemies });
    }

    data.path
        .iter()
        .enumerate()
        .map(|(i, &qrz)| -> Result<MoveStep, GameError> {
            let goal = resolve(battle, qrz)?;
            let visibility = data.path_fov.get(i).map(|keys| parse_keys(keys)).transpose()?;
            let sightings = data.visible_units_along_path.get(i).map(Vec::as_slice).unwrap_or_default();

            let enemies = sightings
                .iter()
                .map(|sighting| -> Result<(UnitIdx, Qrz), GameError> {
                    battle.roster.unit(sighting.idx)?;
                    Ok((sighting.idx, resolve(battle, sighting.qrz())?))
                })
                .collect::<Result<HashMap<_, _>, _>>()?;

            let snapshot = (visibility.is_some() || !enemies.is_empty())
                .then_some(StepSnapshot { visibility, enemies });
            Ok(MoveStep { goal, snapshot })
        })
        .collect()
}

/// `Ok(None)` when the enemy moved entirely out of sight.
pub fn validate_enemy_move(battle: &Battle, data: &EnemyMove) -> Result<Option<EnemyAppearance>, GameError> {
    require_active(battle, data.unit_idx)?;
    let Some((&first, rest)) = data.path.split_first() else { return Ok(None) };

    battle.roster.unit(data.unit_idx)?;
    let start = battle.grid.cell(first)?;
    let holds_it = start.occupant == Some(data.unit_idx);
    if !holds_it && !start.is_traversable() {
        return Err(GameError::StartOccupied(first));
    }

    let goals = rest.iter().map(|&qrz| resolve(battle, qrz)).collect::<Result<_, _>>()?;
    Ok(Some(EnemyAppearance { unit: data.unit_idx, start: first, goals }))
}

pub fn validate_turn_change(battle: &Battle, data: &TurnChange) -> Result<UnitIdx, GameError> {
    battle.roster.unit(data.next_unit_idx)?;
    Ok(data.next_unit_idx)
}

pub fn validate_shrink(battle: &Battle, data: &MapShrink) -> Result<ValidShrink, GameError> {
    let current = battle.grid.radius();
    if data.shrink_level >= current {
        return Err(GameError::GridGrowth { current, requested: data.shrink_level });
    }

    let mut seen = HashSet::new();
    for &idx in &data.dead_units {
        if battle.roster.unit(idx)?.is_dead() || !seen.insert(idx) {
            return Err(GameError::AlreadyDead(idx));
        }
    }

    for unit in battle.roster.iter().filter(|unit| !unit.is_dead() && !seen.contains(&unit.idx)) {
        let Some(cell) = unit.cell() else { continue };
        if cell.distance(&Qrz::ORIGIN) > data.shrink_level {
            return Err(GameError::StrandedUnit { idx: unit.idx, cell, level: data.shrink_level });
        }
    }

    Ok(ValidShrink { level: data.shrink_level, dead: data.dead_units.clone(), fov: parse_keys(&data.fov)? })
}

/// The local player must be one of the two; returns the opponent's name.
pub fn validate_game_start<'a>(identity: &Identity, data: &'a GameStart) -> Result<&'a str, GameError> {
    if identity.is_ally(&data.player1) {
        Ok(&data.player2)
    } else if identity.is_ally(&data.player2) {
        Ok(&data.player1)
    } else {
        Err(GameError::UnknownPlayer(identity.username.clone()))
    }
}
