use qrz::{InvalidCube, ParseKeyError, Qrz};
use thiserror::Error;

use crate::common::components::{unit::UnitAction, UnitIdx};

/// Every way an inbound event or a local mutation can be refused.
///
/// Raised before any state is touched; a caller that sees one of these has a
/// desynchronized or malformed game and should abort it rather than retry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GameError {
    #[error("unit {0} is not the active unit")]
    UnitNotActive(UnitIdx),
    #[error("hex {0} is not on the grid")]
    UnknownHex(Qrz),
    #[error("no unit with index {0}")]
    UnknownUnit(UnitIdx),
    #[error("hex {0} is already occupied")]
    OccupiedCell(Qrz),
    #[error("target {target} out of range from {from}")]
    NotAdjacent { from: Qrz, target: Qrz },
    #[error("attacker {0} not visible")]
    AttackerNotVisible(UnitIdx),
    #[error("attacker {0} has no hex position")]
    AttackerUnbound(UnitIdx),
    #[error("target unit at {0} not visible")]
    TargetNotVisible(Qrz),
    #[error("no unit at target hex {0}")]
    NoTargetUnit(Qrz),
    #[error("cannot attack obstacle at {0}")]
    ObstacleTarget(Qrz),
    #[error("unit at {0} is not an enemy")]
    NotAnEnemy(Qrz),
    #[error("path must contain at least 1 hex")]
    EmptyPath,
    #[error("{goals} goals with {visibility} visibility and {enemies} enemy snapshots")]
    SnapshotMismatch { goals: usize, visibility: usize, enemies: usize },
    #[error("unit {0} not in world")]
    UnitNotInWorld(UnitIdx),
    #[error("unit stepped off the grid at {0}")]
    OffGrid(Qrz),
    #[error("unit {0} is already dead")]
    AlreadyDead(UnitIdx),
    #[error(transparent)]
    MalformedKey(#[from] ParseKeyError),
    #[error(transparent)]
    InvalidCube(#[from] InvalidCube),
    #[error("wrong room id, expected {expected} received {received}")]
    WrongRoom { expected: String, received: String },
    #[error("unparsable notification: {0}")]
    Unparsable(String),
    #[error("{0} is not a player in this match")]
    UnknownPlayer(String),
    #[error("cannot shrink grid of radius {current} to {requested}")]
    GridGrowth { current: i32, requested: i32 },
    #[error("unit {idx} at {cell} is outside radius {level} but not listed as dead")]
    StrandedUnit { idx: UnitIdx, cell: Qrz, level: i32 },
    #[error("sprite sheet is missing for {0:?}")]
    MissingSprites(UnitAction),
    #[error("enemy cannot appear on occupied hex {0}")]
    StartOccupied(Qrz),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Unparsable(err.to_string())
    }
}
