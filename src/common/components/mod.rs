pub mod movement_state;
pub mod unit;

use serde::{Deserialize, Serialize};

/// Stable slot id of a unit; turn order and targeting address units by it.
pub type UnitIdx = usize;

/// One tile of the grid. The coordinate is the key it is stored under.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Cell {
    pub is_obstacle: bool,
    /// Back-reference to the live unit standing here. Death unbinds, so a
    /// stored occupant is never dead.
    pub occupant: Option<UnitIdx>,
}

impl Cell {
    pub fn is_traversable(&self) -> bool {
        self.occupant.is_none() && !self.is_obstacle
    }
}
