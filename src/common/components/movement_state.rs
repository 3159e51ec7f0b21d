//! # MovementState
//!
//! The queue of cells the active unit still has to walk through, each zipped
//! with the visibility/enemy snapshot the server captured for that step.
//!
//! Goals are popped when the unit *reaches* a cell centre; snapshots are
//! taken when the unit *crosses* into a new cell, which happens half a step
//! earlier. Keeping both on one `MoveStep` means a snapshot can be consumed at
//! most once and can never drift out of step with its goal.

use std::collections::{HashMap, HashSet, VecDeque};

use qrz::Qrz;

use crate::common::{components::UnitIdx, error::GameError};

/// What the server said the world looked like once the mover entered a step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepSnapshot {
    /// Replacement FOV; `None` keeps the current one.
    pub visibility: Option<HashSet<Qrz>>,
    /// Enemy unit -> cell. Enemies absent from the map are hidden.
    pub enemies: HashMap<UnitIdx, Qrz>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveStep {
    pub goal: Qrz,
    pub snapshot: Option<StepSnapshot>,
}

impl MoveStep {
    pub fn bare(goal: Qrz) -> Self {
        Self { goal, snapshot: None }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MovementState {
    steps: VecDeque<MoveStep>,
}

impl MovementState {
    /// Replace everything with `goals`, attaching the i-th snapshot pair to
    /// the i-th goal. The snapshot lists must be equally long and no longer
    /// than the goal list.
    pub fn set(
        &mut self,
        goals: Vec<Qrz>,
        visibility: Vec<HashSet<Qrz>>,
        enemies: Vec<HashMap<UnitIdx, Qrz>>,
    ) -> Result<(), GameError> {
        if visibility.len() != enemies.len() || visibility.len() > goals.len() {
            return Err(GameError::SnapshotMismatch {
                goals: goals.len(),
                visibility: visibility.len(),
                enemies: enemies.len(),
            });
        }

        let mut snapshots = visibility
            .into_iter()
            .zip(enemies)
            .map(|(visibility, enemies)| StepSnapshot { visibility: Some(visibility), enemies });
        self.steps = goals
            .into_iter()
            .map(|goal| MoveStep { goal, snapshot: snapshots.next() })
            .collect();
        Ok(())
    }

    pub fn set_steps(&mut self, steps: impl IntoIterator<Item = MoveStep>) {
        self.steps = steps.into_iter().collect();
    }

    pub fn next_goal(&self) -> Option<Qrz> {
        self.steps.front().map(|step| step.goal)
    }

    /// Drop the goal just reached. A snapshot still attached to it belonged to
    /// a crossing that never happened (the unit already stood on the goal), so
    /// it and every later snapshot move up one step to the next crossing.
    pub fn advance_one_cell(&mut self) -> Option<Qrz> {
        let step = self.steps.pop_front()?;
        if step.snapshot.is_some() {
            let mut carry = step.snapshot;
            for next in self.steps.iter_mut() {
                carry = std::mem::replace(&mut next.snapshot, carry);
            }
        }
        Some(step.goal)
    }

    /// The front step's snapshot, left in place.
    pub fn peek_snapshot(&self) -> Option<&StepSnapshot> {
        self.steps.front().and_then(|step| step.snapshot.as_ref())
    }

    /// Hand out the front step's snapshot. A second call before the goal is
    /// popped returns `None`.
    pub fn consume_snapshot(&mut self) -> Option<StepSnapshot> {
        self.steps.front_mut().and_then(|step| step.snapshot.take())
    }

    pub fn is_moving(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &MoveStep> {
        self.steps.iter()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}
