//! The client's fixed-step loop around one [`Battle`].
//!
//! Each tick applies at most one queued server notification, and during a
//! match only while the active unit is idle, so two events never land on a
//! unit that is still mid-animation. Every notification is validated against
//! the battle before anything is mutated; a rejected one is logged and
//! dropped without side effects.

use glam::Vec2;
use log::{debug, info, trace, warn};

use crate::{
    client::{
        config::GameConfig,
        inbox::Inbox,
        systems::{
            camera::CameraControl,
            preview::{self, PathPreview},
        },
        timestep::FixedTimestep,
    },
    common::{
        battle::Battle,
        components::{movement_state::MoveStep, unit::UnitAction},
        error::GameError,
        message::*,
        resources::{layout::Layout, sprites::SpriteSheets, visibility::Fov, Identity},
        systems::{movement::step_active_unit, validate::*},
    },
};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    /// Waiting for the server to start a match.
    #[default]
    Lobby,
    InGame,
    /// `winner` is `None` on a draw.
    Over { winner: Option<String> },
}

pub struct Game<S: SpriteSheets> {
    pub battle: Battle,
    pub inbox: Inbox,
    pub camera: CameraControl,
    pub preview: PathPreview,
    config: GameConfig,
    sheets: S,
    timestep: FixedTimestep,
    phase: Phase,
    ticks: u64,
}

impl<S: SpriteSheets> Game<S> {
    pub fn new(config: GameConfig, identity: Identity, room_id: impl Into<String>, sheets: S) -> Self {
        let layout = Layout::new(config.cell_size, config.origin, config.radius);
        Self {
            battle: Battle::new(layout, identity),
            inbox: Inbox::new(room_id),
            camera: CameraControl::default(),
            preview: PathPreview::default(),
            timestep: FixedTimestep::new(config.tick_rate, config.max_frame),
            config,
            sheets,
            phase: Phase::Lobby,
            ticks: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sheets(&self) -> &S {
        &self.sheets
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fraction of a tick not yet simulated, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    /// Feed one rendered frame's elapsed seconds; returns how many ticks ran.
    pub fn update(&mut self, frame_time: f32) -> Result<u32, GameError> {
        self.timestep.accumulate(frame_time);
        let dt = self.timestep.dt();
        let mut ran = 0;
        while self.timestep.consume_tick() {
            self.tick(dt)?;
            ran += 1;
        }
        Ok(ran)
    }

    /// One fixed step: inbound notification, camera, movement, animation.
    pub fn tick(&mut self, dt: f32) -> Result<(), GameError> {
        self.ticks += 1;

        if self.ready_for_notification() {
            match self.inbox.pop() {
                Ok(Some(notification)) => {
                    if let Err(err) = self.apply(notification) {
                        warn!("rejected notification: {err}");
                    }
                }
                Ok(None) => {}
                Err(err) => warn!("dropped notification: {err}"),
            }
        }

        self.camera.pan(&mut self.battle.layout, &self.config, dt);

        if self.phase != Phase::Lobby {
            step_active_unit(&mut self.battle, dt)?;
        }
        for unit in self.battle.roster.iter_alive_mut() {
            unit.update(&self.sheets)?;
        }
        Ok(())
    }

    fn ready_for_notification(&self) -> bool {
        match self.phase {
            Phase::InGame => self.battle.active_unit().is_ok_and(|unit| unit.is(UnitAction::Idle)),
            Phase::Lobby | Phase::Over { .. } => true,
        }
    }

    /// Validate `notification` against the battle and apply it.
    pub fn apply(&mut self, notification: Notification) -> Result<(), GameError> {
        trace!("applying {notification:?}");
        match notification {
            Notification::GameStart(data) => self.start(data),
            other if self.phase != Phase::InGame => {
                debug!("ignoring {other:?} outside a match");
                Ok(())
            }
            Notification::UnitAttack(data) => self.attack(data),
            Notification::AllyMove(data) => self.ally_move(data),
            Notification::EnemyMove(data) => self.enemy_move(data),
            Notification::TurnChange(data) => {
                let next = validate_turn_change(&self.battle, &data)?;
                self.battle.turn.advance(next);
                self.preview.clear();
                Ok(())
            }
            Notification::MapShrink(data) => self.shrink(data),
            Notification::GameOver(data) => {
                info!("game over, winner {:?}", data.winner);
                self.battle.movement.clear();
                self.preview.clear();
                self.phase = Phase::Over { winner: data.winner };
                Ok(())
            }
        }
    }

    fn start(&mut self, data: GameStart) -> Result<(), GameError> {
        let opponent = validate_game_start(&self.battle.identity, &data)?.to_owned();
        let fov = parse_keys(&data.fov)?;

        let radius = self.config.radius;
        let battle = &mut self.battle;
        battle.identity.opponent = Some(opponent);
        battle.grid.fill(radius);
        battle.layout.set_radius(radius);
        battle.layout.reset_camera_offset();
        battle.roster.spawn(
            &data.player1,
            &data.player2,
            &battle.identity,
            &mut battle.grid,
            &battle.layout,
            self.config.unit_speed,
        )?;
        battle.visibility.set_visibility(fov);
        battle.turn.reset();
        battle.movement.clear();
        self.preview.clear();
        self.phase = Phase::InGame;
        info!("match started: {} vs {} on radius {radius}", data.player1, data.player2);
        Ok(())
    }

    fn attack(&mut self, data: UnitAttack) -> Result<(), GameError> {
        let valid = validate_attack(&self.battle, &data)?;
        let battle = &mut self.battle;

        let attacker = battle.roster.unit_mut(valid.attacker)?;
        attacker.face(valid.dx);
        attacker.strike();
        battle.roster.kill(valid.target, &mut battle.grid)?;
        battle.visibility.set_visibility(valid.fov);
        info!("unit {} struck unit {} at {}", valid.attacker, valid.target, valid.target_cell);
        Ok(())
    }

    fn ally_move(&mut self, data: AllyMove) -> Result<(), GameError> {
        let steps = validate_ally_move(&self.battle, &data)?;
        debug!("unit {} walks {} steps", data.unit_idx, steps.len());
        self.battle.movement.set_steps(steps);
        self.battle.roster.unit_mut(data.unit_idx)?.start_moving();
        self.preview.clear();
        Ok(())
    }

    fn enemy_move(&mut self, data: EnemyMove) -> Result<(), GameError> {
        let Some(appearance) = validate_enemy_move(&self.battle, &data)? else {
            debug!("unit {} moved out of sight", data.unit_idx);
            return Ok(());
        };
        let battle = &mut self.battle;
        battle.roster.place(appearance.unit, appearance.start, &mut battle.grid, &battle.layout)?;
        battle.movement.set_steps(appearance.goals.into_iter().map(MoveStep::bare));
        battle.roster.unit_mut(appearance.unit)?.start_moving();
        debug!("unit {} appeared at {}", appearance.unit, appearance.start);
        Ok(())
    }

    fn shrink(&mut self, data: MapShrink) -> Result<(), GameError> {
        let valid = validate_shrink(&self.battle, &data)?;
        let battle = &mut self.battle;
        for idx in valid.dead {
            battle.roster.kill(idx, &mut battle.grid)?;
        }
        battle.grid.shrink(valid.level);
        battle.visibility.set_visibility(valid.fov);
        info!("map shrank to radius {}", valid.level);
        Ok(())
    }

    /// Refresh the path preview for the cell under `screen`.
    pub fn hover(&mut self, screen: Vec2) {
        let hovered = self.battle.layout.screen_to_hex(screen);
        self.preview.hover(&self.battle, hovered);
    }

    /// The request a click at `screen` would send, if any.
    pub fn click(&self, screen: Vec2) -> Option<ActionRequest> {
        if self.phase != Phase::InGame {
            return None;
        }
        preview::click(&self.battle, self.battle.layout.screen_to_hex(screen))
    }

    pub fn skip_turn(&self) -> Option<ActionRequest> {
        if self.phase != Phase::InGame {
            return None;
        }
        preview::skip_turn(&self.battle)
    }
}

#[cfg(test)]
mod tests {
    use qrz::Qrz;

    use super::*;
    use crate::common::{components::unit::Presence, resources::sprites::FrameTable};

    const DT: f32 = 1. / 60.;
    const ROOM: &str = "room-1";

    fn game_start(player1: &str, player2: &str) -> Notification {
        Notification::GameStart(GameStart {
            player1: player1.into(),
            player2: player2.into(),
            fov: Qrz::hexagon(4).map(|qrz| qrz.to_string()).collect(),
            room_id: ROOM.into(),
        })
    }

    fn turn_change(next: usize) -> Notification {
        Notification::TurnChange(TurnChange { next_unit_idx: next, room_id: ROOM.into() })
    }

    /// Alice (slot 0) against bob, match already running.
    fn started() -> Game<FrameTable> {
        let mut game = Game::new(GameConfig::default(), Identity::new("alice"), ROOM, FrameTable::uniform(2));
        game.apply(game_start("alice", "bob")).unwrap();
        game
    }

    /// Tick until the inbox is empty and the active unit idles.
    fn settle(game: &mut Game<FrameTable>, cap: usize) -> usize {
        for tick in 0..cap {
            game.tick(DT).unwrap();
            let idle = game.battle.active_unit().is_ok_and(|unit| unit.is(UnitAction::Idle));
            if game.inbox.is_empty() && idle {
                return tick + 1;
            }
        }
        panic!("game did not settle in {cap} ticks");
    }

    // ===== MATCH LIFECYCLE TESTS =====

    #[test]
    fn test_game_start_sets_up_board() {
        let game = started();
        assert_eq!(game.phase(), &Phase::InGame);
        assert_eq!(game.battle.identity.opponent.as_deref(), Some("bob"));
        assert_eq!(game.battle.grid.radius(), 4);
        assert_eq!(game.battle.roster.len(), 3);
        assert_eq!(game.battle.roster.unit(0).unwrap().cell(), Some(Qrz::axial(-3, 0)));
        assert!(!game.battle.roster.unit(1).unwrap().is_visible());
        assert!(game.battle.visibility.is_visible(Qrz::axial(3, 0)));
        assert_eq!(game.battle.turn.active(), 0);
    }

    #[test]
    fn test_second_player_gets_two_units() {
        let mut game = Game::new(GameConfig::default(), Identity::new("bob"), ROOM, FrameTable::uniform(2));
        game.apply(game_start("alice", "bob")).unwrap();
        assert_eq!(game.battle.roster.unit(1).unwrap().cell(), Some(Qrz::axial(3, 0)));
        assert_eq!(game.battle.roster.unit(2).unwrap().cell(), Some(Qrz::axial(2, 0)));
        assert!(!game.battle.roster.unit(0).unwrap().is_visible());
    }

    #[test]
    fn test_stranger_cannot_start() {
        let mut game = Game::new(GameConfig::default(), Identity::new("carol"), ROOM, FrameTable::uniform(2));
        assert_eq!(game.apply(game_start("alice", "bob")), Err(GameError::UnknownPlayer("carol".into())));
        assert_eq!(game.phase(), &Phase::Lobby);
        assert!(game.battle.grid.is_empty());
    }

    #[test]
    fn test_lobby_ignores_match_events() {
        let mut game = Game::new(GameConfig::default(), Identity::new("alice"), ROOM, FrameTable::uniform(2));
        assert_eq!(game.apply(turn_change(1)), Ok(()));
        assert_eq!(game.battle.turn.generation(), 0);
        assert_eq!(game.click(Vec2::ZERO), None);
        assert_eq!(game.skip_turn(), None);
    }

    #[test]
    fn test_game_over() {
        let mut game = started();
        let over = Notification::GameOver(GameOver { winner: Some("bob".into()), room_id: ROOM.into() });
        game.apply(over).unwrap();
        assert_eq!(game.phase(), &Phase::Over { winner: Some("bob".into()) });
        assert_eq!(game.apply(turn_change(1)), Ok(()));
        assert_eq!(game.battle.turn.active(), 0);
    }

    // ===== TICK LOOP TESTS =====

    #[test]
    fn test_update_runs_whole_ticks() {
        let mut game = started();
        assert_eq!(game.update(2.5 * DT), Ok(2));
        assert_eq!(game.ticks(), 2);
        assert_eq!(game.update(0.6 * DT), Ok(1));
    }

    #[test]
    fn test_one_notification_per_tick() {
        let mut game = started();
        game.inbox.push(turn_change(1));
        game.inbox.push(turn_change(2));

        game.tick(DT).unwrap();
        assert_eq!(game.battle.turn.active(), 1);
        game.tick(DT).unwrap();
        assert_eq!(game.battle.turn.active(), 2);
    }

    #[test]
    fn test_notifications_wait_for_idle() {
        let mut game = started();
        let walk = AllyMove {
            unit_idx: 0,
            path: vec![Qrz::axial(-2, 0)],
            path_fov: vec![],
            visible_units_along_path: vec![],
            room_id: ROOM.into(),
        };
        game.inbox.push(Notification::AllyMove(walk));
        game.inbox.push(turn_change(1));

        game.tick(DT).unwrap();
        game.tick(DT).unwrap();
        assert!(game.battle.active_unit().unwrap().is(UnitAction::Moving));
        assert_eq!(game.inbox.len(), 1);
        assert_eq!(game.battle.turn.active(), 0);

        settle(&mut game, 600);
        assert_eq!(game.battle.turn.active(), 1);
        assert_eq!(game.battle.roster.unit(0).unwrap().cell(), Some(Qrz::axial(-2, 0)));
    }

    #[test]
    fn test_wrong_room_and_rejections_are_dropped() {
        let mut game = started();
        game.inbox.push(Notification::TurnChange(TurnChange { next_unit_idx: 1, room_id: "elsewhere".into() }));
        game.inbox.push(turn_change(7));
        game.inbox.push(turn_change(2));

        for _ in 0..3 {
            game.tick(DT).unwrap();
        }
        assert!(game.inbox.is_empty());
        assert_eq!(game.battle.turn.active(), 2);
        assert_eq!(game.battle.turn.generation(), 1);
    }

    // ===== EVENT APPLICATION TESTS =====

    #[test]
    fn test_ally_move_reveals_enemy_at_second_step() {
        let mut game = started();
        let walk = AllyMove {
            unit_idx: 0,
            path: vec![Qrz::axial(-2, 0), Qrz::axial(-1, 0)],
            path_fov: vec![],
            visible_units_along_path: vec![vec![], vec![Sighting { idx: 1, q: 3, r: 0 }]],
            room_id: ROOM.into(),
        };
        game.inbox.push(Notification::AllyMove(walk));

        game.tick(DT).unwrap();
        assert_eq!(game.battle.movement.len(), 2);
        assert_eq!(game.battle.movement.steps().filter(|step| step.snapshot.is_some()).count(), 1);

        let mut revealed_from = None;
        for _ in 0..600 {
            game.tick(DT).unwrap();
            let enemy = game.battle.roster.unit(1).unwrap();
            if revealed_from.is_none() && enemy.is_visible() {
                revealed_from = game.battle.roster.unit(0).unwrap().cell();
            }
            if game.battle.active_unit().unwrap().is(UnitAction::Idle) {
                break;
            }
        }

        assert_eq!(revealed_from, Some(Qrz::axial(-1, 0)));
        let ally = game.battle.roster.unit(0).unwrap();
        assert_eq!(ally.cell(), Some(Qrz::axial(-1, 0)));
        assert!(ally.is(UnitAction::Idle));
        assert_eq!(game.battle.roster.unit(1).unwrap().cell(), Some(Qrz::axial(3, 0)));
        assert_eq!(game.battle.grid.cell(Qrz::axial(3, 0)).unwrap().occupant, Some(1));
        assert!(game.battle.grid.is_traversable(Qrz::axial(-3, 0)));
        assert!(game.battle.movement.is_empty());
    }

    #[test]
    fn test_enemy_appears_and_walks() {
        let mut game = started();
        game.apply(turn_change(1)).unwrap();
        let walk = EnemyMove { unit_idx: 1, path: vec![Qrz::axial(-1, 0), Qrz::axial(-2, 0)], room_id: ROOM.into() };
        game.apply(Notification::EnemyMove(walk)).unwrap();
        assert_eq!(game.battle.roster.unit(1).unwrap().cell(), Some(Qrz::axial(-1, 0)));

        settle(&mut game, 600);
        let enemy = game.battle.roster.unit(1).unwrap();
        assert_eq!(enemy.cell(), Some(Qrz::axial(-2, 0)));
        assert!(game.battle.grid.is_traversable(Qrz::axial(-1, 0)));
    }

    #[test]
    fn test_unseen_enemy_move_changes_nothing() {
        let mut game = started();
        game.apply(turn_change(2)).unwrap();
        let walk = EnemyMove { unit_idx: 2, path: vec![], room_id: ROOM.into() };
        game.apply(Notification::EnemyMove(walk)).unwrap();
        assert_eq!(game.battle.roster.unit(2).unwrap().presence(), Presence::Fogged);
        assert!(game.battle.movement.is_empty());
    }

    #[test]
    fn test_attack_kills_and_animates() {
        let mut game = started();
        game.apply(turn_change(1)).unwrap();
        let walk = EnemyMove { unit_idx: 1, path: vec![Qrz::axial(-2, 0)], room_id: ROOM.into() };
        game.apply(Notification::EnemyMove(walk)).unwrap();
        settle(&mut game, 60);
        game.apply(turn_change(0)).unwrap();

        let strike = UnitAttack {
            attacker_idx: 0,
            target_coords: Qrz::axial(-2, 0),
            fov: vec!["-3_0".into(), "-2_0".into()],
            room_id: ROOM.into(),
        };
        game.apply(Notification::UnitAttack(strike)).unwrap();

        let attacker = game.battle.roster.unit(0).unwrap();
        assert!(attacker.is(UnitAction::Striking));
        assert_eq!(attacker.facing(), crate::common::components::unit::Facing::Right);
        let target = game.battle.roster.unit(1).unwrap();
        assert!(target.is_dead());
        assert!(target.is(UnitAction::Dying));
        assert!(game.battle.grid.is_traversable(Qrz::axial(-2, 0)));
        assert!(!game.battle.visibility.is_visible(Qrz::axial(0, 1)));

        // two frames per sheet: the first advances at once, the second is held
        for _ in 0..10 {
            game.tick(DT).unwrap();
        }
        assert!(game.battle.roster.unit(0).unwrap().is(UnitAction::Striking));
        assert!(game.battle.roster.unit(1).unwrap().is(UnitAction::Dying));
        game.tick(DT).unwrap();
        assert!(game.battle.roster.unit(0).unwrap().is(UnitAction::Idle));
        assert_eq!(game.battle.roster.unit(1).unwrap().presence(), Presence::Fogged);
        assert_eq!(game.battle.roster.iter_alive().count(), 2);
    }

    #[test]
    fn test_rejected_attack_mutates_nothing() {
        let mut game = started();
        let strike = UnitAttack {
            attacker_idx: 0,
            target_coords: Qrz::axial(-2, 0),
            fov: vec![],
            room_id: ROOM.into(),
        };
        assert_eq!(
            game.apply(Notification::UnitAttack(strike)),
            Err(GameError::NoTargetUnit(Qrz::axial(-2, 0)))
        );
        assert!(game.battle.active_unit().unwrap().is(UnitAction::Idle));
        assert!(game.battle.visibility.is_visible(Qrz::axial(0, 1)));
    }

    #[test]
    fn test_shrink_kills_then_shrinks() {
        let mut game = started();
        let shrink = MapShrink {
            shrink_level: 2,
            dead_units: vec![0],
            fov: vec!["1_0".into()],
            room_id: ROOM.into(),
        };
        game.apply(Notification::MapShrink(shrink)).unwrap();

        assert_eq!(game.battle.grid.radius(), 2);
        assert!(!game.battle.grid.contains(Qrz::axial(-3, 0)));
        assert!(game.battle.roster.unit(0).unwrap().is_dead());
        assert_eq!(game.battle.visibility.cells().len(), 1);
    }

    #[test]
    fn test_shrink_growth_rejected() {
        let mut game = started();
        let shrink = MapShrink { shrink_level: 5, dead_units: vec![0], fov: vec![], room_id: ROOM.into() };
        assert_eq!(
            game.apply(Notification::MapShrink(shrink)),
            Err(GameError::GridGrowth { current: 4, requested: 5 })
        );
        assert!(!game.battle.roster.unit(0).unwrap().is_dead());
    }

    #[test]
    fn test_shrink_leaving_unit_outside_rejected() {
        let mut game = started();
        let shrink = MapShrink { shrink_level: 2, dead_units: vec![], fov: vec![], room_id: ROOM.into() };
        assert_eq!(
            game.apply(Notification::MapShrink(shrink)),
            Err(GameError::StrandedUnit { idx: 0, cell: Qrz::axial(-3, 0), level: 2 })
        );

        assert_eq!(game.battle.grid.radius(), 4);
        assert_eq!(game.battle.grid.cell(Qrz::axial(-3, 0)).unwrap().occupant, Some(0));
        assert_eq!(game.battle.roster.unit(0).unwrap().cell(), Some(Qrz::axial(-3, 0)));
    }

    // ===== INPUT TESTS =====

    #[test]
    fn test_hover_and_click_through_screen_space() {
        let mut game = started();
        let screen = game.battle.layout.hex_to_screen(Qrz::axial(-1, 0));

        game.hover(screen);
        assert_eq!(game.preview.goals.len(), 3);
        assert_eq!(game.click(screen), Some(ActionRequest::UnitMove { unit_idx: 0, goal: Qrz::axial(-1, 0) }));
        assert_eq!(game.skip_turn(), Some(ActionRequest::TurnSkip { unit_idx: 0 }));
    }

    #[test]
    fn test_turn_change_clears_preview() {
        let mut game = started();
        game.hover(game.battle.layout.hex_to_screen(Qrz::axial(-1, 0)));
        game.apply(turn_change(1)).unwrap();
        assert!(game.preview.is_empty());
    }
}
