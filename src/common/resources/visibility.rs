use std::collections::HashSet;

use log::trace;
use qrz::Qrz;

/// Server-authoritative field of view. The engine never computes FOV; it only
/// stores what it was told and answers membership queries.
pub trait Fov {
    fn is_visible(&self, qrz: Qrz) -> bool;
    fn set_visibility(&mut self, cells: HashSet<Qrz>);
}

#[derive(Clone, Debug, Default)]
pub struct Visibility {
    cells: HashSet<Qrz>,
    /// Bumped on every replacement so a renderer can tell when to redraw fog.
    revision: u64,
}

impl Visibility {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cells(&self) -> &HashSet<Qrz> {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.set_visibility(HashSet::new());
    }
}

impl Fov for Visibility {
    fn is_visible(&self, qrz: Qrz) -> bool {
        self.cells.contains(&qrz)
    }

    fn set_visibility(&mut self, cells: HashSet<Qrz>) {
        self.cells = cells;
        self.revision += 1;
        trace!("fov revision {} with {} cells", self.revision, self.cells.len());
    }
}

impl FromIterator<Qrz> for Visibility {
    fn from_iter<I: IntoIterator<Item = Qrz>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect(), revision: 0 }
    }
}
