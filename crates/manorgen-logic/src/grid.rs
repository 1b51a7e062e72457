//! Grid of room assignments.
//!
//! A fixed-size 2D array of cells. Each cell is empty, the anchor of a
//! room (template footprint + door flags), or covered by the footprint of
//! a multi-cell room anchored elsewhere. The grid does no validation of
//! its own beyond a size cap; layout ingestion decides what gets assigned.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::direction::Direction;

/// Largest grid side on either axis.
pub const MAX_GRID_SIDE: u32 = 64;

/// Integer grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: i32,
    pub row: i32,
}

impl CellCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Coordinates one step across `dir`, without bounds checks.
    pub fn step(self, dir: Direction) -> CellCoord {
        let (dc, dr) = dir.offset();
        CellCoord::new(self.col + dc, self.row + dr)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// Room footprint in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub depth: u32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint { width: 1, depth: 1 };

    pub const fn new(width: u32, depth: u32) -> Self {
        Self { width, depth }
    }

    pub fn is_valid(&self) -> bool {
        self.width >= 1 && self.depth >= 1
    }

    /// Footprint extent along the edge on side `dir`, in cells.
    pub fn cells_along(&self, dir: Direction) -> u32 {
        match dir {
            Direction::North | Direction::South => self.width,
            Direction::East | Direction::West => self.depth,
        }
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Door flags for the four edges of a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorFlags {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl DoorFlags {
    pub fn get(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, dir: Direction, value: bool) {
        match dir {
            Direction::North => self.north = value,
            Direction::South => self.south = value,
            Direction::East => self.east = value,
            Direction::West => self.west = value,
        }
    }

    pub fn count(&self) -> usize {
        Direction::ALL.iter().filter(|&&d| self.get(d)).count()
    }
}

/// A room anchored on a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAssignment {
    /// Template name from the layout catalog.
    pub template: String,
    pub footprint: Footprint,
    pub doors: DoorFlags,
}

/// Contents of one grid cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Room(RoomAssignment),
    /// Spanned by the footprint of the room anchored at `anchor`.
    Covered { anchor: CellCoord },
}

/// The building grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cols: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// An empty grid. Sides above [`MAX_GRID_SIDE`] are clamped.
    pub fn new(cols: u32, rows: u32) -> Self {
        let (cols, rows) = (cols.min(MAX_GRID_SIDE), rows.min(MAX_GRID_SIDE));
        Self {
            cols,
            rows,
            cells: vec![Cell::Empty; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn in_bounds(&self, c: CellCoord) -> bool {
        c.col >= 0 && c.row >= 0 && (c.col as u32) < self.cols && (c.row as u32) < self.rows
    }

    fn index(&self, c: CellCoord) -> Option<usize> {
        if self.in_bounds(c) {
            Some(c.row as usize * self.cols as usize + c.col as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, c: CellCoord) -> Option<&Cell> {
        self.index(c).map(|i| &self.cells[i])
    }

    /// Mark `c` occupied with `template` and an empty door set. Returns
    /// false when `c` is out of bounds.
    pub fn assign(&mut self, c: CellCoord, template: &str, footprint: Footprint) -> bool {
        let Some(i) = self.index(c) else {
            return false;
        };
        self.cells[i] = Cell::Room(RoomAssignment {
            template: template.to_string(),
            footprint,
            doors: DoorFlags::default(),
        });
        true
    }

    /// Mark `c` as spanned by the room anchored at `anchor`.
    pub fn cover(&mut self, c: CellCoord, anchor: CellCoord) -> bool {
        let Some(i) = self.index(c) else {
            return false;
        };
        self.cells[i] = Cell::Covered { anchor };
        true
    }

    /// Adjacent coordinates across `dir`, or `None` when out of bounds.
    pub fn neighbor(&self, c: CellCoord, dir: Direction) -> Option<CellCoord> {
        let n = c.step(dir);
        self.in_bounds(n).then_some(n)
    }

    pub fn is_occupied(&self, c: CellCoord) -> bool {
        matches!(self.cell(c), Some(Cell::Room(_)))
    }

    /// True when the cell is empty (not a room and not covered).
    pub fn is_free(&self, c: CellCoord) -> bool {
        matches!(self.cell(c), Some(Cell::Empty))
    }

    /// Anchor of the room that owns `c`: `c` itself for an anchor cell, the
    /// covering room's anchor for a covered cell.
    pub fn owner(&self, c: CellCoord) -> Option<CellCoord> {
        match self.cell(c)? {
            Cell::Room(_) => Some(c),
            Cell::Covered { anchor } => Some(*anchor),
            Cell::Empty => None,
        }
    }

    pub fn room(&self, c: CellCoord) -> Option<&RoomAssignment> {
        match self.cell(c) {
            Some(Cell::Room(r)) => Some(r),
            _ => None,
        }
    }

    pub fn room_mut(&mut self, c: CellCoord) -> Option<&mut RoomAssignment> {
        let i = self.index(c)?;
        match &mut self.cells[i] {
            Cell::Room(r) => Some(r),
            _ => None,
        }
    }

    pub fn doors(&self, c: CellCoord) -> DoorFlags {
        self.room(c).map(|r| r.doors).unwrap_or_default()
    }

    /// Set one door flag. No effect on cells that are not rooms.
    pub fn set_door(&mut self, c: CellCoord, dir: Direction, value: bool) {
        if let Some(r) = self.room_mut(c) {
            r.doors.set(dir, value);
        }
    }

    pub fn clear_doors(&mut self) {
        for cell in &mut self.cells {
            if let Cell::Room(r) = cell {
                r.doors = DoorFlags::default();
            }
        }
    }

    /// Occupied cells in row-major order.
    pub fn occupied_cells(&self) -> Vec<CellCoord> {
        let mut out = Vec::new();
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                let c = CellCoord::new(col, row);
                if self.is_occupied(c) {
                    out.push(c);
                }
            }
        }
        out
    }

    pub fn room_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Room(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let g = Grid::new(8, 8);
        assert_eq!(g.room_count(), 0);
        assert!(g.occupied_cells().is_empty());
        assert!(g.is_free(CellCoord::new(0, 0)));
    }

    #[test]
    fn test_assign_marks_occupied_with_no_doors() {
        let mut g = Grid::new(8, 8);
        let c = CellCoord::new(3, 4);
        assert!(g.assign(c, "parlor", Footprint::UNIT));
        assert!(g.is_occupied(c));
        assert_eq!(g.doors(c), DoorFlags::default());
        assert_eq!(g.room(c).unwrap().template, "parlor");
    }

    #[test]
    fn test_assign_out_of_bounds() {
        let mut g = Grid::new(4, 4);
        assert!(!g.assign(CellCoord::new(4, 0), "x", Footprint::UNIT));
        assert!(!g.assign(CellCoord::new(-1, 0), "x", Footprint::UNIT));
        assert_eq!(g.room_count(), 0);
    }

    #[test]
    fn test_neighbor_bounds() {
        let g = Grid::new(4, 4);
        let corner = CellCoord::new(0, 0);
        assert_eq!(g.neighbor(corner, Direction::West), None);
        assert_eq!(g.neighbor(corner, Direction::South), None);
        assert_eq!(
            g.neighbor(corner, Direction::North),
            Some(CellCoord::new(0, 1))
        );
        assert_eq!(
            g.neighbor(corner, Direction::East),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(g.neighbor(CellCoord::new(3, 3), Direction::North), None);
    }

    #[test]
    fn test_covered_cell_is_not_occupied() {
        let mut g = Grid::new(4, 4);
        g.assign(CellCoord::new(0, 0), "hall", Footprint::new(2, 1));
        g.cover(CellCoord::new(1, 0), CellCoord::new(0, 0));
        assert!(!g.is_occupied(CellCoord::new(1, 0)));
        assert!(!g.is_free(CellCoord::new(1, 0)));
        assert_eq!(g.room_count(), 1);
    }

    #[test]
    fn test_owner_resolves_covered_cells() {
        let mut g = Grid::new(4, 4);
        let anchor = CellCoord::new(0, 0);
        g.assign(anchor, "hall", Footprint::new(2, 1));
        g.cover(CellCoord::new(1, 0), anchor);
        assert_eq!(g.owner(anchor), Some(anchor));
        assert_eq!(g.owner(CellCoord::new(1, 0)), Some(anchor));
        assert_eq!(g.owner(CellCoord::new(2, 0)), None);
        assert_eq!(g.owner(CellCoord::new(9, 9)), None);
    }

    #[test]
    fn test_oversized_grid_is_clamped() {
        let g = Grid::new(u32::MAX, 3);
        assert_eq!(g.cols(), MAX_GRID_SIDE);
        assert_eq!(g.rows(), 3);
        assert!(g.in_bounds(CellCoord::new(MAX_GRID_SIDE as i32 - 1, 2)));
        assert!(!g.in_bounds(CellCoord::new(MAX_GRID_SIDE as i32, 0)));
    }

    #[test]
    fn test_set_door_ignores_empty_cells() {
        let mut g = Grid::new(4, 4);
        g.set_door(CellCoord::new(1, 1), Direction::North, true);
        assert_eq!(g.doors(CellCoord::new(1, 1)).count(), 0);
    }

    #[test]
    fn test_occupied_cells_row_major() {
        let mut g = Grid::new(4, 4);
        g.assign(CellCoord::new(2, 1), "a", Footprint::UNIT);
        g.assign(CellCoord::new(0, 2), "b", Footprint::UNIT);
        g.assign(CellCoord::new(1, 1), "c", Footprint::UNIT);
        assert_eq!(
            g.occupied_cells(),
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
                CellCoord::new(0, 2)
            ]
        );
    }
}
