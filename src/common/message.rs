//! Wire types exchanged with the game server.
//!
//! Inbound notifications arrive as `{"type": "...", "data": {...}}` with
//! camelCase fields; coordinates are `{"q": .., "r": ..}` objects and FOV
//! entries are `"q_r"` keys.

use qrz::Qrz;
use serde::{Deserialize, Serialize};

use crate::common::{components::UnitIdx, error::GameError};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    GameStart(GameStart),
    UnitAttack(UnitAttack),
    AllyMove(AllyMove),
    EnemyMove(EnemyMove),
    TurnChange(TurnChange),
    MapShrink(MapShrink),
    GameOver(GameOver),
}

impl Notification {
    pub fn parse(raw: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn room_id(&self) -> &str {
        match self {
            Notification::GameStart(it) => &it.room_id,
            Notification::UnitAttack(it) => &it.room_id,
            Notification::AllyMove(it) => &it.room_id,
            Notification::EnemyMove(it) => &it.room_id,
            Notification::TurnChange(it) => &it.room_id,
            Notification::MapShrink(it) => &it.room_id,
            Notification::GameOver(it) => &it.room_id,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    pub player1: String,
    pub player2: String,
    pub fov: Vec<String>,
    pub room_id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitAttack {
    pub attacker_idx: UnitIdx,
    pub target_coords: Qrz,
    /// FOV after the target died.
    pub fov: Vec<String>,
    pub room_id: String,
}

/// One enemy seen from a step of an ally's path.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Sighting {
    pub idx: UnitIdx,
    pub q: i32,
    pub r: i32,
}

impl Sighting {
    pub fn qrz(&self) -> Qrz {
        Qrz::axial(self.q, self.r)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllyMove {
    pub unit_idx: UnitIdx,
    /// Cells to walk through, excluding the one the unit stands on.
    pub path: Vec<Qrz>,
    #[serde(default)]
    pub path_fov: Vec<Vec<String>>,
    #[serde(default)]
    pub visible_units_along_path: Vec<Vec<Sighting>>,
    pub room_id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyMove {
    pub unit_idx: UnitIdx,
    /// Empty when the whole move happened in fog; otherwise the first cell is
    /// where the enemy comes into view.
    pub path: Vec<Qrz>,
    pub room_id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnChange {
    pub next_unit_idx: UnitIdx,
    pub room_id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapShrink {
    pub shrink_level: i32,
    pub dead_units: Vec<UnitIdx>,
    pub fov: Vec<String>,
    pub room_id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOver {
    /// `None` on a draw.
    pub winner: Option<String>,
    pub room_id: String,
}

/// Orders sent to the server on the local player's turn.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum ActionRequest {
    UnitMove { unit_idx: UnitIdx, goal: Qrz },
    UnitAttack { unit_idx: UnitIdx, goal: Qrz },
    TurnSkip { unit_idx: UnitIdx },
}

impl ActionRequest {
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }
}
