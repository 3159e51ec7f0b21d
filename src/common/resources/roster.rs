//! # Roster
//!
//! Every unit of the match in a fixed slot array. Slots are never removed, so
//! an index handed out by the server stays valid for the whole match; dead
//! units stay behind as tombstones.
//!
//! All cell binding goes through here so that `Unit::presence` and
//! `Cell::occupant` always agree.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use log::{debug, trace};
use qrz::Qrz;

use crate::common::{
    components::{unit::*, UnitIdx},
    error::GameError,
    resources::{grid::Grid, layout::Layout, Identity},
};

#[derive(Clone, Debug, Default)]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    /// Create the three match slots. The first player fields one unit, the
    /// second two; only the local player's units start on the board.
    pub fn spawn(
        &mut self,
        player1: &str,
        player2: &str,
        identity: &Identity,
        grid: &mut Grid,
        layout: &Layout,
        speed: f32,
    ) -> Result<(), GameError> {
        let n = grid.radius();
        let allies = if identity.is_ally(player1) {
            vec![(0, Qrz::axial(-(n - 1), 0))]
        } else if identity.is_ally(player2) {
            vec![(1, Qrz::axial(n - 1, 0)), (2, Qrz::axial(n - 2, 0))]
        } else {
            return Err(GameError::UnknownPlayer(identity.username.clone()));
        };

        for &(_, cell) in &allies {
            if !grid.cell(cell)?.is_traversable() {
                return Err(GameError::OccupiedCell(cell));
            }
        }

        self.units = vec![Unit::new(player1, 0, speed), Unit::new(player2, 1, speed), Unit::new(player2, 2, speed)];
        for (idx, cell) in allies {
            self.place(idx, cell, grid, layout)?;
        }
        debug!("spawned {} units for {player1} vs {player2}", self.units.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, idx: UnitIdx) -> Option<&Unit> {
        self.units.get(idx)
    }

    pub fn unit(&self, idx: UnitIdx) -> Result<&Unit, GameError> {
        self.units.get(idx).ok_or(GameError::UnknownUnit(idx))
    }

    pub fn unit_mut(&mut self, idx: UnitIdx) -> Result<&mut Unit, GameError> {
        self.units.get_mut(idx).ok_or(GameError::UnknownUnit(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Units still worth drawing: everything except tombstones whose death
    /// animation has finished.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|unit| !(unit.is_dead() && unit.is(UnitAction::Idle)))
    }

    pub fn iter_alive_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut().filter(|unit| !(unit.is_dead() && unit.is(UnitAction::Idle)))
    }

    /// Bind to `cell` and stand on its centre.
    pub fn place(&mut self, idx: UnitIdx, cell: Qrz, grid: &mut Grid, layout: &Layout) -> Result<(), GameError> {
        self.bind(idx, cell, layout.hex_to_world(cell), grid)
    }

    /// Bind to `cell` keeping the current world position; used mid-step when
    /// a walking unit crosses into the next cell.
    pub fn rebind(&mut self, idx: UnitIdx, cell: Qrz, grid: &mut Grid) -> Result<(), GameError> {
        let world = self.unit(idx)?.world().ok_or(GameError::UnitNotInWorld(idx))?;
        self.bind(idx, cell, world, grid)
    }

    /// Give up the cell but stay drawn.
    pub fn unbind(&mut self, idx: UnitIdx, grid: &mut Grid) -> Result<(), GameError> {
        let released = self.unit_mut(idx)?.unbind();
        release(grid, released, idx);
        Ok(())
    }

    /// Give up the cell and vanish into fog.
    pub fn hide(&mut self, idx: UnitIdx, grid: &mut Grid) -> Result<(), GameError> {
        let released = self.unit_mut(idx)?.fog();
        release(grid, released, idx);
        Ok(())
    }

    pub fn kill(&mut self, idx: UnitIdx, grid: &mut Grid) -> Result<(), GameError> {
        let released = self.unit_mut(idx)?.die()?;
        release(grid, released, idx);
        debug!("unit {idx} died");
        Ok(())
    }

    /// Put every listed live enemy on its cell and hide every live enemy that
    /// is not listed. Checked in full before anything moves.
    /// Enemies a sighting list would move, or the first cell it cannot use.
    /// Nothing is changed.
    pub fn check_enemy_positions(
        &self,
        positions: &HashMap<UnitIdx, Qrz>,
        identity: &Identity,
        grid: &Grid,
    ) -> Result<Vec<UnitIdx>, GameError> {
        let enemies: Vec<UnitIdx> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| !unit.is_dead() && identity.is_enemy(&unit.owner))
            .map(|(idx, _)| idx)
            .collect();
        let moving_away = |other: UnitIdx| enemies.contains(&other) && positions.get(&other).is_none_or(|&to| {
            self.units[other].cell() != Some(to)
        });

        let mut claimed = HashSet::new();
        for &idx in &enemies {
            let Some(&cell) = positions.get(&idx) else { continue };
            let target = grid.cell(cell)?;
            let blocked = target.is_obstacle
                || target.occupant.is_some_and(|other| other != idx && !moving_away(other))
                || !claimed.insert(cell);
            if blocked {
                return Err(GameError::OccupiedCell(cell));
            }
        }
        Ok(enemies)
    }

    pub fn apply_enemy_positions(
        &mut self,
        positions: &HashMap<UnitIdx, Qrz>,
        identity: &Identity,
        grid: &mut Grid,
        layout: &Layout,
    ) -> Result<(), GameError> {
        let enemies = self.check_enemy_positions(positions, identity, grid)?;
        for &idx in positions.keys() {
            if !enemies.contains(&idx) {
                trace!("ignoring sighting of non-enemy unit {idx}");
            }
        }

        for &idx in &enemies {
            let unit = &mut self.units[idx];
            let released = match positions.get(&idx) {
                None => unit.fog(),
                Some(&cell) if unit.cell() != Some(cell) => unit.unbind(),
                Some(_) => None,
            };
            release(grid, released, idx);
        }
        for &idx in &enemies {
            let Some(&cell) = positions.get(&idx) else { continue };
            if self.units[idx].cell() != Some(cell) {
                self.place(idx, cell, grid, layout)?;
            }
        }
        Ok(())
    }

    fn bind(&mut self, idx: UnitIdx, cell: Qrz, world: Vec2, grid: &mut Grid) -> Result<(), GameError> {
        let unit = self.unit(idx)?;
        if unit.is_dead() {
            return Err(GameError::AlreadyDead(idx));
        }
        let target = grid.cell(cell)?;
        if target.is_obstacle || target.occupant.is_some_and(|other| other != idx) {
            return Err(GameError::OccupiedCell(cell));
        }

        let previous = unit.cell();
        if previous != Some(cell) {
            release(grid, previous, idx);
        }
        grid.cell_mut(cell)?.occupant = Some(idx);
        self.units[idx].bind(cell, world);
        Ok(())
    }
}

fn release(grid: &mut Grid, cell: Option<Qrz>, idx: UnitIdx) {
    let Some(cell) = cell.and_then(|qrz| grid.get_mut(qrz)) else { return };
    if cell.occupant == Some(idx) {
        cell.occupant = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::components::unit::Presence;

    fn setup() -> (Roster, Grid, Layout, Identity) {
        let grid = Grid::new(4);
        let layout = Layout::new(Vec2::new(100., 50.), Vec2::ZERO, 4);
        let identity = Identity::new("alice").with_opponent("bob");
        let roster = Roster::new(vec![
            Unit::new("alice", 0, 160.),
            Unit::new("bob", 1, 160.),
            Unit::new("bob", 2, 160.),
        ]);
        (roster, grid, layout, identity)
    }

    // ===== OCCUPANCY TESTS =====

    #[test]
    fn test_place_sets_back_reference() {
        let (mut roster, mut grid, layout, _) = setup();
        let cell = Qrz::axial(-3, 0);
        roster.place(0, cell, &mut grid, &layout).unwrap();

        assert_eq!(grid.cell(cell).unwrap().occupant, Some(0));
        assert_eq!(roster.unit(0).unwrap().world(), Some(layout.hex_to_world(cell)));
        assert!(roster.unit(0).unwrap().is_visible());
    }

    #[test]
    fn test_place_releases_previous_cell() {
        let (mut roster, mut grid, layout, _) = setup();
        roster.place(0, Qrz::axial(-3, 0), &mut grid, &layout).unwrap();
        roster.place(0, Qrz::axial(-2, 0), &mut grid, &layout).unwrap();

        assert_eq!(grid.cell(Qrz::axial(-3, 0)).unwrap().occupant, None);
        assert_eq!(grid.cell(Qrz::axial(-2, 0)).unwrap().occupant, Some(0));
    }

    #[test]
    fn test_two_live_units_cannot_share() {
        let (mut roster, mut grid, layout, _) = setup();
        let cell = Qrz::axial(1, 1);
        roster.place(0, cell, &mut grid, &layout).unwrap();

        assert_eq!(roster.place(1, cell, &mut grid, &layout), Err(GameError::OccupiedCell(cell)));
        assert_eq!(roster.unit(1).unwrap().presence(), Presence::Fogged, "failed bind changes nothing");
    }

    #[test]
    fn test_obstacle_rejects_bind() {
        let (mut roster, mut grid, layout, _) = setup();
        grid.set_obstacle(Qrz::axial(1, 1), true).unwrap();
        assert!(roster.place(0, Qrz::axial(1, 1), &mut grid, &layout).is_err());
    }

    #[test]
    fn test_dead_occupant_frees_cell() {
        let (mut roster, mut grid, layout, _) = setup();
        let cell = Qrz::axial(1, 1);
        roster.place(1, cell, &mut grid, &layout).unwrap();
        roster.kill(1, &mut grid).unwrap();

        assert!(grid.is_traversable(cell));
        roster.place(0, cell, &mut grid, &layout).unwrap();
        assert_eq!(grid.cell(cell).unwrap().occupant, Some(0));
    }

    #[test]
    fn test_dead_unit_cannot_bind() {
        let (mut roster, mut grid, layout, _) = setup();
        roster.kill(2, &mut grid).unwrap();
        assert_eq!(roster.place(2, Qrz::axial(1, 1), &mut grid, &layout), Err(GameError::AlreadyDead(2)));
    }

    #[test]
    fn test_rebind_keeps_world() {
        let (mut roster, mut grid, layout, _) = setup();
        roster.place(0, Qrz::axial(-3, 0), &mut grid, &layout).unwrap();
        let world = roster.unit(0).unwrap().world().unwrap();
        roster.rebind(0, Qrz::axial(-2, 0), &mut grid).unwrap();

        assert_eq!(roster.unit(0).unwrap().presence(), Presence::Placed { cell: Qrz::axial(-2, 0), world });
    }

    #[test]
    fn test_rebind_needs_world() {
        let (mut roster, mut grid, _, _) = setup();
        assert_eq!(roster.rebind(1, Qrz::axial(1, 1), &mut grid), Err(GameError::UnitNotInWorld(1)));
    }

    #[test]
    fn test_unbind_and_hide() {
        let (mut roster, mut grid, layout, _) = setup();
        roster.place(0, Qrz::axial(-3, 0), &mut grid, &layout).unwrap();
        roster.unbind(0, &mut grid).unwrap();
        assert!(matches!(roster.unit(0).unwrap().presence(), Presence::Adrift { .. }));
        assert!(grid.is_traversable(Qrz::axial(-3, 0)));

        roster.hide(0, &mut grid).unwrap();
        assert_eq!(roster.unit(0).unwrap().presence(), Presence::Fogged);
    }

    #[test]
    fn test_unknown_unit() {
        let (mut roster, mut grid, _, _) = setup();
        assert_eq!(roster.kill(7, &mut grid), Err(GameError::UnknownUnit(7)));
    }

    // ===== ITERATION TESTS =====

    #[test]
    fn test_iter_alive_skips_finished_tombstones() {
        let (mut roster, mut grid, _, _) = setup();
        roster.kill(1, &mut grid).unwrap();
        assert_eq!(roster.iter_alive().count(), 3, "dying units are still drawn");

        roster.unit_mut(1).unwrap().idle();
        let alive: Vec<_> = roster.iter_alive().map(|unit| unit.idx).collect();
        assert_eq!(alive, vec![0, 2]);
        assert_eq!(roster.len(), 3, "tombstones keep their slot");
    }

    // ===== SPAWN TESTS =====

    #[test]
    fn test_spawn_as_first_player() {
        let (mut roster, mut grid, layout, identity) = setup();
        roster.spawn("alice", "bob", &identity, &mut grid, &layout, 160.).unwrap();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.unit(0).unwrap().cell(), Some(Qrz::axial(-3, 0)));
        assert_eq!(roster.unit(1).unwrap().presence(), Presence::Fogged);
        assert_eq!(roster.unit(2).unwrap().presence(), Presence::Fogged);
        assert_eq!(roster.unit(1).unwrap().owner, "bob");
    }

    #[test]
    fn test_spawn_as_second_player() {
        let (mut roster, mut grid, layout, _) = setup();
        let identity = Identity::new("bob").with_opponent("alice");
        roster.spawn("alice", "bob", &identity, &mut grid, &layout, 160.).unwrap();

        assert_eq!(roster.unit(0).unwrap().presence(), Presence::Fogged);
        assert_eq!(roster.unit(1).unwrap().cell(), Some(Qrz::axial(3, 0)));
        assert_eq!(roster.unit(2).unwrap().cell(), Some(Qrz::axial(2, 0)));
        assert_eq!(grid.cell(Qrz::axial(2, 0)).unwrap().occupant, Some(2));
    }

    #[test]
    fn test_spawn_for_stranger_fails() {
        let (mut roster, mut grid, layout, _) = setup();
        let identity = Identity::new("mallory");
        let err = roster.spawn("alice", "bob", &identity, &mut grid, &layout, 160.).unwrap_err();
        assert_eq!(err, GameError::UnknownPlayer("mallory".into()));
    }

    // ===== ENEMY POSITION TESTS =====

    #[test]
    fn test_enemy_positions_place_and_hide() {
        let (mut roster, mut grid, layout, identity) = setup();
        roster.place(2, Qrz::axial(2, 0), &mut grid, &layout).unwrap();

        let positions = HashMap::from([(1, Qrz::axial(3, 0))]);
        roster.apply_enemy_positions(&positions, &identity, &mut grid, &layout).unwrap();

        assert_eq!(roster.unit(1).unwrap().cell(), Some(Qrz::axial(3, 0)));
        assert_eq!(roster.unit(2).unwrap().presence(), Presence::Fogged);
        assert!(grid.is_traversable(Qrz::axial(2, 0)));
    }

    #[test]
    fn test_enemy_positions_ignore_allies() {
        let (mut roster, mut grid, layout, identity) = setup();
        roster.place(0, Qrz::axial(-3, 0), &mut grid, &layout).unwrap();

        roster.apply_enemy_positions(&HashMap::new(), &identity, &mut grid, &layout).unwrap();
        assert!(roster.unit(0).unwrap().is_visible(), "allies are never hidden by sightings");
    }

    #[test]
    fn test_enemy_on_ally_cell_fails_atomically() {
        let (mut roster, mut grid, layout, identity) = setup();
        roster.place(0, Qrz::axial(-3, 0), &mut grid, &layout).unwrap();
        roster.place(2, Qrz::axial(2, 0), &mut grid, &layout).unwrap();

        let positions = HashMap::from([(1, Qrz::axial(-3, 0))]);
        let err = roster.apply_enemy_positions(&positions, &identity, &mut grid, &layout);
        assert_eq!(err, Err(GameError::OccupiedCell(Qrz::axial(-3, 0))));
        assert!(roster.unit(2).unwrap().is_visible(), "nothing moved");
    }

    #[test]
    fn test_enemies_may_swap_cells() {
        let (mut roster, mut grid, layout, identity) = setup();
        roster.place(1, Qrz::axial(2, 0), &mut grid, &layout).unwrap();
        roster.place(2, Qrz::axial(3, 0), &mut grid, &layout).unwrap();

        let positions = HashMap::from([(1, Qrz::axial(3, 0)), (2, Qrz::axial(2, 0))]);
        roster.apply_enemy_positions(&positions, &identity, &mut grid, &layout).unwrap();

        assert_eq!(grid.cell(Qrz::axial(3, 0)).unwrap().occupant, Some(1));
        assert_eq!(grid.cell(Qrz::axial(2, 0)).unwrap().occupant, Some(2));
    }

    #[test]
    fn test_enemy_staying_put_is_untouched() {
        let (mut roster, mut grid, layout, identity) = setup();
        roster.place(1, Qrz::axial(2, 0), &mut grid, &layout).unwrap();
        roster.unit_mut(1).unwrap().set_world(Vec2::new(1., 1.));

        let positions = HashMap::from([(1, Qrz::axial(2, 0))]);
        roster.apply_enemy_positions(&positions, &identity, &mut grid, &layout).unwrap();
        assert_eq!(roster.unit(1).unwrap().world(), Some(Vec2::new(1., 1.)));
    }
}
