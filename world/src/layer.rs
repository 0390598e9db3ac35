use std::sync::Arc;

use glam::IVec2;

use crate::{in_submap, SUBMAP_SIZE};

const S: usize = SUBMAP_SIZE as usize;

type Row<T> = Arc<[T; S]>;

/// Persistent submap-sized 2D array.
///
/// Rows are individually reference counted, so cloning a layer is cheap and
/// writing a single cell copies one row plus the row index instead of the
/// whole layer. Unshared rows are written in place.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Layer<T> {
    rows: Arc<[Row<T>; S]>,
}

impl<T: Copy + PartialEq> Layer<T> {
    /// Layer where every cell has the same value.
    ///
    /// All rows start out as the same shared allocation.
    pub fn filled(value: T) -> Self {
        let row: Row<T> = Arc::new([value; S]);
        Layer {
            rows: Arc::new(std::array::from_fn(|_| row.clone())),
        }
    }

    /// Value at a local position, `None` when out of bounds.
    pub fn get(&self, p: IVec2) -> Option<T> {
        in_submap(p).then(|| self.rows[p.y as usize][p.x as usize])
    }

    /// Write a value, return whether the layer changed.
    ///
    /// Out of bounds writes and writes of the existing value do nothing.
    pub fn set(&mut self, p: IVec2, value: T) -> bool {
        match self.get(p) {
            None => false,
            Some(old) if old == value => false,
            Some(_) => {
                let rows = Arc::make_mut(&mut self.rows);
                let row = Arc::make_mut(&mut rows[p.y as usize]);
                row[p.x as usize] = value;
                true
            }
        }
    }

    /// If every cell holds the same value, return it.
    pub fn uniform(&self) -> Option<T> {
        let first = self.rows[0][0];
        self.iter().all(|(_, a)| a == first).then_some(first)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, T)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &a)| (IVec2::new(x as i32, y as i32), a))
        })
    }

    /// Whether both layers share the storage of row `y`.
    pub fn shares_row(&self, other: &Layer<T>, y: usize) -> bool {
        y < S && Arc::ptr_eq(&self.rows[y], &other.rows[y])
    }
}
