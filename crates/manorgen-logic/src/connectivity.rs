//! Door graph inference.
//!
//! One row-major pass over occupied cells. Each cell looks only east and
//! north; when that neighbor is occupied, both sides of the shared edge get
//! a door flag. Writes touch only the current cell and its immediate
//! neighbor, so the result does not depend on visiting order.

use crate::direction::Direction;
use crate::grid::Grid;

/// Derive symmetric door flags for every pair of orthogonally adjacent
/// rooms. Existing flags are cleared first, so the pass is idempotent.
/// Returns the number of doorways found.
pub fn resolve(grid: &mut Grid) -> usize {
    grid.clear_doors();
    let mut doorways = 0;
    for cell in grid.occupied_cells() {
        for dir in [Direction::East, Direction::North] {
            let Some(next) = grid.neighbor(cell, dir) else {
                continue;
            };
            if !grid.is_occupied(next) {
                continue;
            }
            grid.set_door(cell, dir, true);
            grid.set_door(next, dir.opposite(), true);
            doorways += 1;
        }
    }
    log::debug!(
        "Resolved {} doorways across {} rooms",
        doorways,
        grid.room_count()
    );
    doorways
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellCoord, Footprint};

    fn grid_with(cells: &[(i32, i32)]) -> Grid {
        let mut g = Grid::new(8, 8);
        for &(c, r) in cells {
            g.assign(CellCoord::new(c, r), "room", Footprint::UNIT);
        }
        g
    }

    #[test]
    fn test_l_shape_scenario() {
        let mut g = grid_with(&[(3, 3), (3, 4), (4, 4), (5, 4)]);
        assert_eq!(resolve(&mut g), 3);

        let flags = |c, r| g.doors(CellCoord::new(c, r));
        assert!(flags(3, 3).north);
        assert!(flags(3, 4).south);
        assert!(flags(3, 4).east);
        assert!(flags(4, 4).west);
        assert!(flags(4, 4).east);
        assert!(flags(5, 4).west);

        let total: usize = g.occupied_cells().iter().map(|&c| g.doors(c).count()).sum();
        assert_eq!(total, 6, "every other flag must stay false");
    }

    #[test]
    fn test_isolated_cell_has_no_doors() {
        let mut g = grid_with(&[(2, 2)]);
        assert_eq!(resolve(&mut g), 0);
        assert_eq!(g.doors(CellCoord::new(2, 2)).count(), 0);
    }

    #[test]
    fn test_diagonal_neighbors_do_not_connect() {
        let mut g = grid_with(&[(1, 1), (2, 2)]);
        assert_eq!(resolve(&mut g), 0);
    }

    #[test]
    fn test_resolve_twice_is_stable() {
        let mut g = grid_with(&[(0, 0), (1, 0), (1, 1)]);
        let first = resolve(&mut g);
        let snapshot = g.clone();
        let second = resolve(&mut g);
        assert_eq!(first, second);
        assert_eq!(g, snapshot);
    }

    #[test]
    fn test_edges_of_grid_never_get_doors() {
        let mut g = Grid::new(2, 1);
        g.assign(CellCoord::new(0, 0), "a", Footprint::UNIT);
        g.assign(CellCoord::new(1, 0), "b", Footprint::UNIT);
        resolve(&mut g);
        let a = g.doors(CellCoord::new(0, 0));
        let b = g.doors(CellCoord::new(1, 0));
        assert!(a.east && b.west);
        assert!(!a.west && !a.north && !a.south);
        assert!(!b.east && !b.north && !b.south);
    }

    #[test]
    fn test_covered_cells_block_doors() {
        let mut g = Grid::new(4, 4);
        g.assign(CellCoord::new(0, 0), "hall", Footprint::new(2, 1));
        g.cover(CellCoord::new(1, 0), CellCoord::new(0, 0));
        g.assign(CellCoord::new(2, 0), "study", Footprint::UNIT);
        assert_eq!(resolve(&mut g), 0);
    }
}
