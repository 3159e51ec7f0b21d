//! Breadth-first path search over the grid.
//!
//! The frontier is a plain `Vec` read through a moving index rather than a
//! deque, and expansion stops the moment the goal shows up among a node's
//! admissible neighbours. An empty result means either "already there" or "no
//! route"; callers that care compare `start` and `goal` themselves.

use std::collections::HashMap;

use qrz::{Qrz, DIRECTIONS};

use crate::common::resources::{grid::Grid, visibility::Fov};

/// Shortest path from `start` to `goal`, both ends included.
///
/// A step is admissible when its cell is traversable and, if
/// `require_visible`, currently in the field of view. `start` itself is never
/// checked, since it is usually occupied by the unit asking.
pub fn search_path(grid: &Grid, fov: &impl Fov, start: Qrz, goal: Qrz, require_visible: bool) -> Vec<Qrz> {
    if start == goal {
        return Vec::new();
    }

    let admissible = |qrz: Qrz| grid.is_traversable(qrz) && (!require_visible || fov.is_visible(qrz));

    let mut frontier = vec![start];
    let mut came_from: HashMap<Qrz, Qrz> = HashMap::from([(start, start)]);
    let mut read = 0;

    'search: while read < frontier.len() {
        let current = frontier[read];
        read += 1;

        for next in DIRECTIONS.map(|dir| current + dir) {
            if !admissible(next) {
                continue;
            }
            if next == goal {
                came_from.insert(goal, current);
                break 'search;
            }
            if !came_from.contains_key(&next) {
                came_from.insert(next, current);
                frontier.push(next);
            }
        }
    }

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(&previous) = came_from.get(&current) else { return Vec::new() };
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
