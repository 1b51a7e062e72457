//! Integration tests for the full building pipeline.
//!
//! Exercises: Layout → Grid → connectivity → GeometryCompiler
//! → door registry → spawn → validation
//!
//! All tests are pure logic, no scene and no rendering.

use manorgen_logic::compiler::{GeometryCompiler, PanelKind};
use manorgen_logic::connectivity;
use manorgen_logic::constants::{BuildConstants, EYE_HEIGHT};
use manorgen_logic::csg::BoxCarver;
use manorgen_logic::direction::Direction;
use manorgen_logic::doors::{self, DoorTrigger};
use manorgen_logic::grid::{CellCoord, Footprint, Grid};
use manorgen_logic::layout::{random_walk, Layout};
use manorgen_logic::spawn::{self, StartSpec};
use manorgen_logic::validation::validate_building;

// ── Helpers ────────────────────────────────────────────────────────────

fn l_shape() -> Grid {
    let mut g = Grid::new(8, 8);
    for (c, r) in [(3, 3), (3, 4), (4, 4), (5, 4)] {
        g.assign(CellCoord::new(c, r), "room", Footprint::UNIT);
    }
    g
}

fn adjacent_pairs(grid: &Grid) -> usize {
    grid.occupied_cells()
        .iter()
        .map(|&c| {
            [Direction::East, Direction::North]
                .iter()
                .filter(|&&d| grid.is_occupied(c.step(d)))
                .count()
        })
        .sum()
}

/// Resolve and register a grid, returning the triggers.
fn run_doors(grid: &mut Grid, constants: &BuildConstants) -> Vec<DoorTrigger> {
    connectivity::resolve(grid);
    doors::register(grid, constants)
}

// ── L-shape scenario ───────────────────────────────────────────────────

#[test]
fn test_l_shape_end_to_end() {
    let constants = BuildConstants::default();
    let mut grid = l_shape();
    let doorways = connectivity::resolve(&mut grid);
    assert_eq!(doorways, 3);

    let carver = BoxCarver;
    let compiler = GeometryCompiler::new(constants, &carver).unwrap();
    let geometry = compiler.compile(&grid);
    assert_eq!(geometry.rooms.len(), 4);
    assert!(geometry.diagnostics.is_empty());
    assert_eq!(geometry.opening_count(), 6);

    let room = geometry.room(CellCoord::new(4, 4)).unwrap();
    assert!(room.wall(Direction::West).has_opening);
    assert!(room.wall(Direction::East).has_opening);
    assert!(!room.wall(Direction::North).has_opening);
    assert!(!room.wall(Direction::South).has_opening);

    let triggers = doors::register(&grid, &constants);
    assert_eq!(triggers.len(), 3);

    let start = StartSpec {
        cell: Some(CellCoord::new(3, 3)),
        zone: None,
    };
    let pose = spawn::resolve(&grid, &constants, &start).unwrap();
    assert_eq!(pose.position.y, EYE_HEIGHT);
    assert_eq!(pose.position.x, 17.5);
    assert_eq!(pose.position.z, 17.5);

    assert!(validate_building(&grid, &triggers).is_empty());
}

#[test]
fn test_every_wall_is_closed() {
    let constants = BuildConstants::default();
    let mut grid = l_shape();
    connectivity::resolve(&mut grid);
    let carver = BoxCarver;
    let geometry = GeometryCompiler::new(constants, &carver)
        .unwrap()
        .compile(&grid);

    for room in &geometry.rooms {
        for panel in &room.walls {
            assert!(
                panel.mesh.is_closed(),
                "{:?} of {} is open",
                panel.kind,
                room.cell
            );
            assert!(!panel.mesh.has_degenerate_triangles());
        }
        assert!(!room.floor.mesh.has_degenerate_triangles());
    }
}

#[test]
fn test_ceiling_mirrors_floor() {
    let constants = BuildConstants::default();
    let mut grid = l_shape();
    connectivity::resolve(&mut grid);
    let carver = BoxCarver;
    let geometry = GeometryCompiler::new(constants, &carver)
        .unwrap()
        .compile(&grid);

    for room in &geometry.rooms {
        assert_eq!(room.floor.kind, PanelKind::Floor);
        assert_eq!(room.ceiling.kind, PanelKind::Ceiling);
        let (fmin, _) = room.floor.mesh.bounds().unwrap();
        let (cmin, _) = room.ceiling.mesh.bounds().unwrap();
        assert!((cmin.y - fmin.y - constants.wall_height).abs() < 1e-4);
    }
}

// ── Properties over random layouts ─────────────────────────────────────

#[test]
fn test_random_layouts_are_symmetric_and_connected() {
    let constants = BuildConstants::default();
    for seed in 0..40 {
        let layout = random_walk(seed, 20, 10, 10);
        let mut grid = layout.build_grid().unwrap().grid;
        let triggers = run_doors(&mut grid, &constants);

        let errors = validate_building(&grid, &triggers);
        assert!(errors.is_empty(), "seed {}: {:?}", seed, errors);
        assert_eq!(triggers.len(), adjacent_pairs(&grid), "seed {}", seed);

        for cell in grid.occupied_cells() {
            let flags = grid.doors(cell);
            for dir in Direction::ALL {
                let neighbor_occupied = grid.is_occupied(cell.step(dir));
                assert_eq!(flags.get(dir), neighbor_occupied, "seed {} {}", seed, cell);
            }
        }
    }
}

#[test]
fn test_openings_match_door_flags() {
    let constants = BuildConstants::default();
    let carver = BoxCarver;
    let compiler = GeometryCompiler::new(constants, &carver).unwrap();
    for seed in [3, 17, 99] {
        let layout = random_walk(seed, 12, 6, 6);
        let mut grid = layout.build_grid().unwrap().grid;
        let doorways = connectivity::resolve(&mut grid);
        let geometry = compiler.compile(&grid);

        assert!(geometry.diagnostics.is_empty());
        assert_eq!(geometry.opening_count(), doorways * 2);
        for room in &geometry.rooms {
            let flags = grid.doors(room.cell);
            for dir in Direction::ALL {
                assert_eq!(room.wall(dir).has_opening, flags.get(dir));
            }
        }
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let constants = BuildConstants::default();
    let run = || {
        let mut grid = Layout::manor().build_grid().unwrap().grid;
        let triggers = run_doors(&mut grid, &constants);
        let ids: Vec<String> = triggers.iter().map(|t| t.id()).collect();
        (grid, ids)
    };
    let (a_grid, a_ids) = run();
    let (b_grid, b_ids) = run();
    assert_eq!(a_ids, b_ids);
    assert_eq!(a_grid, b_grid);
}

// ── Built-in manor ─────────────────────────────────────────────────────

#[test]
fn test_manor_builds_cleanly() {
    let layout = Layout::manor();
    let built = layout.build_grid().unwrap();
    assert!(built.diagnostics.is_empty());

    let mut grid = built.grid;
    let triggers = run_doors(&mut grid, &layout.constants);
    assert!(validate_building(&grid, &triggers).is_empty());

    let carver = BoxCarver;
    let geometry = GeometryCompiler::new(layout.constants, &carver)
        .unwrap()
        .compile(&grid);
    assert_eq!(geometry.rooms.len(), layout.rooms.len());
    assert!(geometry.diagnostics.is_empty());

    let pose = spawn::resolve(&grid, &layout.constants, &layout.start).unwrap();
    assert_eq!(pose.position.y, EYE_HEIGHT);
}

#[test]
fn test_manor_spawn_in_living_room_annex() {
    let layout = Layout::manor();
    let grid = layout.build_grid().unwrap().grid;
    let start = StartSpec {
        cell: Some(CellCoord::new(3, 3)),
        zone: None,
    };
    let pose = spawn::resolve(&grid, &layout.constants, &start).unwrap();
    // Living room anchors at (2,3) and spans two cells east.
    let s = layout.constants.cell_size;
    assert_eq!(pose.position.x, 3.0 * s);
    assert_eq!(pose.position.z, 3.5 * s);
    assert_eq!(pose.position.y, EYE_HEIGHT);
}
