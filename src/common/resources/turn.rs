use log::debug;

use crate::common::components::UnitIdx;

/// Which unit may act, and how many times the turn has changed hands.
///
/// Validation reads this instead of a global flag, so replaying the same
/// notifications against the same authority gives the same verdicts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TurnAuthority {
    active: UnitIdx,
    generation: u64,
}

impl TurnAuthority {
    pub fn new(active: UnitIdx) -> Self {
        Self { active, generation: 0 }
    }

    pub fn active(&self) -> UnitIdx {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self, idx: UnitIdx) -> bool {
        self.active == idx
    }

    /// Hand the turn to `next`.
    pub fn advance(&mut self, next: UnitIdx) {
        self.active = next;
        self.generation += 1;
        debug!("turn {} goes to unit {next}", self.generation);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
