//! # Map: sparse hex tile storage
//!
//! `Map<T>` stores one value per hex coordinate. Iteration is ordered by
//! coordinate (q, then r) so anything walking the map, from a renderer to a
//! test, sees the same sequence every time.
//!
//! ```rust
//! use qrz::{Map, Qrz};
//!
//! let mut map: Map<u8> = Map::default();
//! map.insert(Qrz::axial(1, 0), 7);
//!
//! assert_eq!(map.get(Qrz::axial(1, 0)), Some(&7));
//! assert_eq!(map.neighbors(Qrz::ORIGIN).len(), 1);
//! ```

use std::collections::BTreeMap;

use derive_more::*;
use tinyvec::ArrayVec;

use crate::qrz::Qrz;

#[derive(Clone, Debug, IntoIterator, PartialEq)]
pub struct Map<T> {
    #[into_iterator(owned, ref, ref_mut)]
    tiles: BTreeMap<Qrz, T>,
}

impl<T> Default for Map<T> {
    fn default() -> Self {
        Self { tiles: BTreeMap::new() }
    }
}

impl<T> Map<T> {
    pub fn get(&self, qrz: Qrz) -> Option<&T> {
        self.tiles.get(&qrz)
    }

    pub fn get_mut(&mut self, qrz: Qrz) -> Option<&mut T> {
        self.tiles.get_mut(&qrz)
    }

    pub fn contains(&self, qrz: Qrz) -> bool {
        self.tiles.contains_key(&qrz)
    }

    pub fn insert(&mut self, qrz: Qrz, obj: T) -> Option<T> {
        self.tiles.insert(qrz, obj)
    }

    pub fn remove(&mut self, qrz: Qrz) -> Option<T> {
        self.tiles.remove(&qrz)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(Qrz, &T) -> bool) {
        self.tiles.retain(|&qrz, obj| keep(qrz, obj));
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Qrz, &T)> {
        self.tiles.iter().map(|(&qrz, obj)| (qrz, obj))
    }

    pub fn keys(&self) -> impl Iterator<Item = Qrz> + '_ {
        self.tiles.keys().copied()
    }

    /// Coordinates adjacent to `qrz` that hold a tile, in `DIRECTIONS` order.
    pub fn neighbors(&self, qrz: Qrz) -> ArrayVec<[Qrz; 6]> {
        qrz.neighbors().into_iter().filter(|&it| self.contains(it)).collect()
    }
}

impl<T> FromIterator<(Qrz, T)> for Map<T> {
    fn from_iter<I: IntoIterator<Item = (Qrz, T)>>(iter: I) -> Self {
        Self { tiles: iter.into_iter().collect() }
    }
}
