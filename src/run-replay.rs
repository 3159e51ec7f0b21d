//! Headless replay of a recorded notification log.
//!
//! Each line of the log is one server notification as JSON. The lines are
//! queued in order and the fixed-step loop runs until everything has been
//! applied and every unit has come to rest.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};

use hex_skirmish::{
    client::{config::GameConfig, game::Game},
    common::{
        components::unit::UnitAction,
        message::Notification,
        resources::{sprites::FrameTable, Identity},
    },
};

/// Frames per sheet for every action when no renderer supplies real ones.
const HEADLESS_FRAMES: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "replay", about = "Replay a JSON-lines notification log through the game loop")]
struct Args {
    /// Notification log, one JSON object per line
    log: PathBuf,

    /// Local player the log was recorded for
    #[arg(short, long)]
    username: String,

    /// JSON file overriding default game settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up after this many ticks
    #[arg(short, long, default_value = "36000")]
    ticks: u64,
}

fn read_log(path: &Path) -> anyhow::Result<Vec<Notification>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| Notification::parse(line).with_context(|| format!("{}:{}", path.display(), i + 1)))
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let notifications = read_log(&args.log)?;
    let Some(room_id) = notifications.first().map(|it| it.room_id().to_owned()) else {
        bail!("{} holds no notifications", args.log.display());
    };
    info!("replaying {} notifications for room {room_id}", notifications.len());

    let frame = 1. / config.tick_rate as f32;
    let mut game = Game::new(config, Identity::new(&args.username), room_id, FrameTable::uniform(HEADLESS_FRAMES));
    for notification in notifications {
        game.inbox.push(notification);
    }

    while game.ticks() < args.ticks {
        game.update(frame)?;
        let at_rest = game.battle.roster.iter_alive().all(|unit| unit.is(UnitAction::Idle));
        if game.inbox.is_empty() && at_rest {
            break;
        }
    }
    if !game.inbox.is_empty() {
        warn!("stopped after {} ticks with {} notifications pending", game.ticks(), game.inbox.len());
    }

    info!("finished after {} ticks in phase {:?}", game.ticks(), game.phase());
    info!("turn {} belongs to unit {}", game.battle.turn.generation(), game.battle.turn.active());
    for unit in game.battle.roster.iter() {
        info!("unit {} ({}): {:?} {:?} {:?}", unit.idx, unit.owner, unit.vitals(), unit.action(), unit.presence());
    }
    Ok(())
}
