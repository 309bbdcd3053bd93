//! Square row-major cell storage shared by every pipeline stage.

use serde::{Deserialize, Serialize};

use crate::sample::GridCoordinate;

/// Fixed-size `side x side` array of cells, stored row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellArray<T> {
    side: usize,
    cells: Vec<T>,
}

impl<T> CellArray<T> {
    /// Build every cell with `init`, called in row-major order.
    pub fn from_fn(side: usize, mut init: impl FnMut(GridCoordinate) -> T) -> Self {
        let cells = (0..side * side)
            .map(|i| init(GridCoordinate::new(i / side, i % side)))
            .collect();
        Self { side, cells }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn get(&self, coord: GridCoordinate) -> Option<&T> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, coord: GridCoordinate) -> Option<&mut T> {
        self.index(coord).map(move |i| &mut self.cells[i])
    }

    /// Cell at `(row, col)` offset by `(dy, dx)`, if that stays on the grid.
    pub fn offset(&self, coord: GridCoordinate, dy: isize, dx: isize) -> Option<(GridCoordinate, &T)> {
        let row = coord.row.checked_add_signed(dy)?;
        let col = coord.col.checked_add_signed(dx)?;
        let target = GridCoordinate::new(row, col);
        self.get(target).map(|cell| (target, cell))
    }

    /// Cells with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoordinate, &T)> + '_ {
        let side = self.side;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (GridCoordinate::new(i / side, i % side), cell))
    }

    /// Transform every cell into a new array of the same shape.
    pub fn map<U>(self, mut f: impl FnMut(GridCoordinate, T) -> U) -> CellArray<U> {
        let side = self.side;
        let cells = self
            .cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| f(GridCoordinate::new(i / side, i % side), cell))
            .collect();
        CellArray { side, cells }
    }

    fn index(&self, coord: GridCoordinate) -> Option<usize> {
        if coord.row < self.side && coord.col < self.side {
            Some(coord.row * self.side + coord.col)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_row_major() {
        let array = CellArray::from_fn(3, |c| c.row * 10 + c.col);
        let values: Vec<_> = array.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 1, 2, 10, 11, 12, 20, 21, 22]);
    }

    #[test]
    fn offset_stays_in_bounds() {
        let array = CellArray::from_fn(3, |c| (c.row, c.col));
        let origin = GridCoordinate::new(0, 0);
        assert!(array.offset(origin, -1, 0).is_none());
        assert!(array.offset(origin, 0, 3).is_none());
        assert_eq!(
            array.offset(origin, 2, 1),
            Some((GridCoordinate::new(2, 1), &(2, 1)))
        );
    }

    #[test]
    fn map_preserves_shape_and_coordinates() {
        let array = CellArray::from_fn(2, |_| 1u32);
        let mapped = array.map(|c, v| v + (c.row * 2 + c.col) as u32);
        assert_eq!(mapped.side(), 2);
        assert_eq!(mapped.get(GridCoordinate::new(1, 1)), Some(&4));
        assert_eq!(mapped.get(GridCoordinate::new(2, 0)), None);
    }
}
