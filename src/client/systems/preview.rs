//! Hover preview and click intents for the local player's active unit.

use log::debug;
use qrz::Qrz;

use crate::common::{
    battle::Battle,
    message::ActionRequest,
    resources::visibility::Fov,
    systems::pathfind::search_path,
};

/// Path drawn under the cursor. `is_traversable` is false when the route
/// only exists through fog, so the renderer can tint it as uncertain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathPreview {
    pub goals: Vec<Qrz>,
    pub is_traversable: bool,
}

impl PathPreview {
    pub fn clear(&mut self) {
        self.goals.clear();
        self.is_traversable = false;
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Recompute for the hovered cell.
    pub fn hover(&mut self, battle: &Battle, hovered: Qrz) {
        self.clear();
        if !battle.grid.is_traversable(hovered)
            || !battle.visibility.is_visible(hovered)
            || !battle.can_active_unit_act()
        {
            return;
        }
        let Some(start) = battle.active_unit().ok().and_then(|unit| unit.cell()) else { return };

        let path = search_path(&battle.grid, &battle.visibility, start, hovered, true);
        if path.len() > 1 {
            self.goals = path;
            self.is_traversable = true;
            return;
        }

        let path = search_path(&battle.grid, &battle.visibility, start, hovered, false);
        if path.len() > 1 {
            self.goals = path;
        }
    }
}

/// What clicking `clicked` asks the server for, if anything.
pub fn click(battle: &Battle, clicked: Qrz) -> Option<ActionRequest> {
    if !battle.can_active_unit_act() {
        return None;
    }
    let unit_idx = battle.turn.active();

    let request = if battle.grid.is_traversable(clicked) && battle.visibility.is_visible(clicked) {
        ActionRequest::UnitMove { unit_idx, goal: clicked }
    } else if battle.can_attack(unit_idx, clicked) {
        ActionRequest::UnitAttack { unit_idx, goal: clicked }
    } else {
        return None;
    };
    debug!("click on {clicked}: {request:?}");
    Some(request)
}

/// Ends the local player's turn without acting.
pub fn skip_turn(battle: &Battle) -> Option<ActionRequest> {
    battle.can_active_unit_act().then(|| ActionRequest::TurnSkip { unit_idx: battle.turn.active() })
}
