//! Validation of a resolved building.
//!
//! Pure checks over the grid's door flags and the registered triggers.
//! Each check returns its own diagnostics so callers can run them
//! individually; [`validate_building`] runs them all.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::diagnostics::{categories, Diagnostic};
use crate::direction::Direction;
use crate::doors::{DoorKey, DoorTrigger};
use crate::grid::{CellCoord, Grid};

// ── Door flags ──────────────────────────────────────────────────────────

/// Every door flag between two rooms must be mirrored by the neighbor.
pub fn check_door_symmetry(grid: &Grid) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    for cell in grid.occupied_cells() {
        let flags = grid.doors(cell);
        for dir in Direction::ALL {
            if !flags.get(dir) {
                continue;
            }
            let other = cell.step(dir);
            if grid.is_occupied(other) && !grid.doors(other).get(dir.opposite()) {
                errors.push(Diagnostic::error(
                    categories::DOOR_SYMMETRY,
                    format!(
                        "Cell {} has a {} door but {} has no {} door",
                        cell,
                        dir,
                        other,
                        dir.opposite()
                    ),
                ));
            }
        }
    }
    errors
}

/// A door flag must lead to a room, never to an empty cell or off the grid.
pub fn check_phantom_doors(grid: &Grid) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    for cell in grid.occupied_cells() {
        let flags = grid.doors(cell);
        for dir in Direction::ALL {
            if flags.get(dir) && !grid.is_occupied(cell.step(dir)) {
                errors.push(Diagnostic::error(
                    categories::DOOR_SYMMETRY,
                    format!("Cell {} has a {} door into nothing", cell, dir),
                ));
            }
        }
    }
    errors
}

/// Two adjacent rooms must always share a doorway.
pub fn check_missing_doors(grid: &Grid) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    for (cell, dir) in adjacent_pairs(grid) {
        if !grid.doors(cell).get(dir) {
            errors.push(Diagnostic::error(
                categories::DOOR_SYMMETRY,
                format!("Cells {} and {} are adjacent but not connected", cell, cell.step(dir)),
            ));
        }
    }
    errors
}

// ── Triggers ────────────────────────────────────────────────────────────

/// One trigger per doorway: no more, no fewer, no duplicates.
pub fn check_doorway_count(grid: &Grid, triggers: &[DoorTrigger]) -> Vec<Diagnostic> {
    let mut errors = Vec::new();

    let expected: BTreeSet<DoorKey> = adjacent_pairs(grid)
        .into_iter()
        .map(|(cell, dir)| DoorKey::canonical(cell, dir))
        .collect();

    let mut seen = HashSet::new();
    for t in triggers {
        if !seen.insert(t.key) {
            errors.push(Diagnostic::error(
                categories::DOOR_COUNT,
                format!("Duplicate trigger {}", t.key),
            ));
        } else if !expected.contains(&t.key) {
            errors.push(Diagnostic::error(
                categories::DOOR_COUNT,
                format!("Trigger {} has no doorway", t.key),
            ));
        }
    }

    let missing = expected.iter().filter(|k| !seen.contains(*k)).count();
    if missing > 0 {
        errors.push(Diagnostic::error(
            categories::DOOR_COUNT,
            format!(
                "{} of {} doorways have no trigger",
                missing,
                expected.len()
            ),
        ));
    }
    errors
}

// ── Connectivity ────────────────────────────────────────────────────────

/// BFS over the door graph from the first room in row-major order.
/// Unreachable rooms are reported as a warning: a layout may contain
/// deliberately isolated rooms.
pub fn check_room_connectivity(grid: &Grid) -> Vec<Diagnostic> {
    let rooms = grid.occupied_cells();
    let Some(&start) = rooms.first() else {
        return Vec::new();
    };

    let mut visited: HashSet<CellCoord> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let flags = grid.doors(current);
        for dir in Direction::ALL {
            if !flags.get(dir) {
                continue;
            }
            let next = current.step(dir);
            if grid.is_occupied(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let unreached: Vec<CellCoord> = rooms
        .iter()
        .filter(|c| !visited.contains(*c))
        .copied()
        .collect();

    if unreached.is_empty() {
        return Vec::new();
    }
    vec![Diagnostic::warning(
        categories::CONNECTIVITY,
        format!(
            "{} of {} rooms unreachable from {} (e.g. {})",
            unreached.len(),
            rooms.len(),
            start,
            unreached[0]
        ),
    )]
}

// ── Master validation ───────────────────────────────────────────────────

/// Run every check and return the combined results.
pub fn validate_building(grid: &Grid, triggers: &[DoorTrigger]) -> Vec<Diagnostic> {
    let mut all = Vec::new();
    all.extend(check_door_symmetry(grid));
    all.extend(check_phantom_doors(grid));
    all.extend(check_missing_doors(grid));
    all.extend(check_doorway_count(grid, triggers));
    all.extend(check_room_connectivity(grid));
    all
}

/// Occupied (cell, direction) pairs whose east or north neighbor is also
/// occupied, each shared edge listed once.
fn adjacent_pairs(grid: &Grid) -> Vec<(CellCoord, Direction)> {
    let mut pairs = Vec::new();
    for cell in grid.occupied_cells() {
        for dir in [Direction::East, Direction::North] {
            if grid.is_occupied(cell.step(dir)) {
                pairs.push((cell, dir));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BuildConstants;
    use crate::diagnostics::Severity;
    use crate::grid::Footprint;
    use crate::{connectivity, doors};

    fn grid_with(cells: &[(i32, i32)]) -> Grid {
        let mut g = Grid::new(8, 8);
        for &(c, r) in cells {
            g.assign(CellCoord::new(c, r), "room", Footprint::UNIT);
        }
        g
    }

    fn resolved(cells: &[(i32, i32)]) -> (Grid, Vec<DoorTrigger>) {
        let mut g = grid_with(cells);
        connectivity::resolve(&mut g);
        let triggers = doors::register(&g, &BuildConstants::default());
        (g, triggers)
    }

    #[test]
    fn test_resolved_l_shape_is_clean() {
        let (g, triggers) = resolved(&[(3, 3), (3, 4), (4, 4), (5, 4)]);
        let errors = validate_building(&g, &triggers);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_asymmetric_flag_detected() {
        let (mut g, _) = resolved(&[(1, 1), (2, 1)]);
        g.set_door(CellCoord::new(2, 1), Direction::West, false);
        let errors = check_door_symmetry(&g);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, categories::DOOR_SYMMETRY);
        assert!(errors[0].message.contains("(1,1)"));
    }

    #[test]
    fn test_phantom_door_detected() {
        let mut g = grid_with(&[(0, 0)]);
        g.set_door(CellCoord::new(0, 0), Direction::South, true);
        g.set_door(CellCoord::new(0, 0), Direction::East, true);
        assert_eq!(check_phantom_doors(&g).len(), 2);
    }

    #[test]
    fn test_missing_door_detected() {
        let g = grid_with(&[(1, 1), (1, 2)]);
        assert_eq!(check_missing_doors(&g).len(), 1);
    }

    #[test]
    fn test_doorway_count_mismatch() {
        let (g, mut triggers) = resolved(&[(1, 1), (2, 1), (3, 1)]);
        assert!(check_doorway_count(&g, &triggers).is_empty());

        let dup = triggers[0].clone();
        triggers.push(dup);
        let errors = check_doorway_count(&g, &triggers);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Duplicate"));

        triggers.truncate(1);
        let errors = check_doorway_count(&g, &triggers);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("1 of 2"));
    }

    #[test]
    fn test_isolated_room_is_warning() {
        let (g, triggers) = resolved(&[(0, 0), (1, 0), (5, 5)]);
        let errors = validate_building(&g, &triggers);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, categories::CONNECTIVITY);
        assert_eq!(errors[0].severity, Severity::Warning);
        assert!(errors[0].message.contains("(5,5)"));
    }

    #[test]
    fn test_empty_grid_is_clean() {
        let g = Grid::new(4, 4);
        assert!(validate_building(&g, &[]).is_empty());
    }
}
