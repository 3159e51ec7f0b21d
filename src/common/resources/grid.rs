use log::{debug, warn};
use qrz::{Map, Qrz};
use tinyvec::ArrayVec;

use crate::common::{components::Cell, error::GameError};

/// The three cells every fresh grid leaves out: both poles of the q axis and
/// the centre.
pub fn poles(radius: i32) -> [Qrz; 3] {
    [Qrz::axial(-radius, 0), Qrz::axial(radius, 0), Qrz::ORIGIN]
}

/// Sparse hexagonal board of radius N.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    cells: Map<Cell>,
    radius: i32,
}

impl Grid {
    pub fn new(radius: i32) -> Self {
        let mut grid = Self::default();
        grid.fill(radius);
        grid
    }

    /// Rebuild as the full radius-N hexagon minus the poles.
    pub fn fill(&mut self, radius: i32) {
        self.cells = Qrz::hexagon(radius).map(|qrz| (qrz, Cell::default())).collect();
        for pole in poles(radius) {
            self.cells.remove(pole);
        }
        self.radius = radius;
        debug!("filled grid of radius {radius} with {} cells", self.cells.len());
    }

    /// Drop every cell farther than `radius` from the centre. Cells are never
    /// added back, so a request that does not shrink changes nothing.
    pub fn shrink(&mut self, radius: i32) -> bool {
        if radius >= self.radius {
            warn!("ignoring shrink from {} to {radius}", self.radius);
            return false;
        }
        self.cells.retain(|qrz, _| qrz.distance(&Qrz::ORIGIN) <= radius);
        self.radius = radius.max(0);
        debug!("shrank grid to radius {} with {} cells", self.radius, self.cells.len());
        true
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn get(&self, qrz: Qrz) -> Option<&Cell> {
        self.cells.get(qrz)
    }

    pub fn get_mut(&mut self, qrz: Qrz) -> Option<&mut Cell> {
        self.cells.get_mut(qrz)
    }

    /// Like `get`, but a missing cell is an error.
    pub fn cell(&self, qrz: Qrz) -> Result<&Cell, GameError> {
        self.cells.get(qrz).ok_or(GameError::UnknownHex(qrz))
    }

    pub fn cell_mut(&mut self, qrz: Qrz) -> Result<&mut Cell, GameError> {
        self.cells.get_mut(qrz).ok_or(GameError::UnknownHex(qrz))
    }

    pub fn contains(&self, qrz: Qrz) -> bool {
        self.cells.contains(qrz)
    }

    pub fn is_traversable(&self, qrz: Qrz) -> bool {
        self.cells.get(qrz).is_some_and(Cell::is_traversable)
    }

    pub fn set_obstacle(&mut self, qrz: Qrz, is_obstacle: bool) -> Result<(), GameError> {
        self.cell_mut(qrz)?.is_obstacle = is_obstacle;
        Ok(())
    }

    /// On-grid neighbours in direction order.
    pub fn neighbors(&self, qrz: Qrz) -> ArrayVec<[Qrz; 6]> {
        self.cells.neighbors(qrz)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Qrz, &Cell)> {
        self.cells.iter()
    }

    pub fn for_each_cell(&self, mut f: impl FnMut(Qrz, &Cell)) {
        for (qrz, cell) in self.cells.iter() {
            f(qrz, cell);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
