//! ManorGen Headless Harness
//!
//! Runs the building pipeline end to end and checks its invariants.
//! Runs entirely in-process, no window and no GPU.
//!
//! Usage:
//!   cargo run -p manorgen-simtest
//!   cargo run -p manorgen-simtest -- --verbose
//!   cargo run -p manorgen-simtest -- path/to/layout.json

use std::collections::HashSet;

use manorgen_logic::compiler::GeometryCompiler;
use manorgen_logic::connectivity;
use manorgen_logic::constants::EYE_HEIGHT;
use manorgen_logic::csg::BoxCarver;
use manorgen_logic::diagnostics::Severity;
use manorgen_logic::direction::Direction;
use manorgen_logic::doors;
use manorgen_logic::grid::Grid;
use manorgen_logic::layout::{random_walk, Layout};
use manorgen_logic::spawn;
use manorgen_logic::validation;
use manorgen_scene::{BuildingSession, SceneBackend, SceneGraph, SessionError};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let layout_path = args.iter().find(|a| !a.starts_with("--"));
    println!("=== ManorGen Building Harness ===\n");

    let mut results = Vec::new();

    // 1. Layout ingestion
    let layout = match load_layout(layout_path.map(String::as_str)) {
        Ok(layout) => layout,
        Err(detail) => {
            println!("  ✗ layout_load: {}", detail);
            std::process::exit(1);
        }
    };
    results.extend(validate_layout(&layout, verbose));

    // 2. Door flags over the layout and random layouts
    results.extend(validate_connectivity(&layout, verbose));

    // 3. Geometry closure and openings
    results.extend(validate_geometry(&layout, verbose));

    // 4. Door triggers
    results.extend(validate_doors(&layout, verbose));

    // 5. Spawn pose
    results.extend(validate_spawn(&layout, verbose));

    // 6. Session lifecycle
    results.extend(validate_session(&layout, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_layout(path: Option<&str>) -> Result<Layout, String> {
    let Some(path) = path else {
        return Ok(Layout::manor());
    };
    let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    Layout::from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

/// Grid with door flags resolved, ignoring skipped cells.
fn resolved_grid(layout: &Layout) -> Option<(Grid, usize)> {
    let mut grid = layout.build_grid().ok()?.grid;
    let doorways = connectivity::resolve(&mut grid);
    Some((grid, doorways))
}

// ── 1. Layout ───────────────────────────────────────────────────────────

fn validate_layout(layout: &Layout, verbose: bool) -> Vec<TestResult> {
    println!("--- Layout ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "layout_constants".into(),
        passed: layout.constants.validate().is_ok(),
        detail: format!("{:?}", layout.constants),
    });

    let built = match layout.build_grid() {
        Ok(b) => b,
        Err(e) => {
            results.push(TestResult {
                name: "layout_grid".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "layout_rooms".into(),
        passed: built.grid.room_count() > 0,
        detail: format!(
            "'{}': {} of {} placements on {}x{}",
            layout.name,
            built.grid.room_count(),
            layout.rooms.len(),
            layout.cols,
            layout.rows
        ),
    });

    results.push(TestResult {
        name: "layout_no_skips".into(),
        passed: built.diagnostics.is_empty(),
        detail: format!("{} cells skipped", built.diagnostics.len()),
    });
    if verbose {
        for d in &built.diagnostics {
            println!("    {}", d);
        }
    }

    let unused: Vec<&String> = layout
        .templates
        .keys()
        .filter(|name| {
            !layout
                .rooms
                .iter()
                .any(|r| r.template.as_deref() == Some(name.as_str()))
        })
        .collect();
    results.push(TestResult {
        name: "layout_templates_used".into(),
        passed: unused.is_empty(),
        detail: if unused.is_empty() {
            format!("all {} templates placed", layout.templates.len())
        } else {
            format!("unused templates: {:?}", unused)
        },
    });

    results
}

// ── 2. Connectivity ─────────────────────────────────────────────────────

fn validate_connectivity(layout: &Layout, verbose: bool) -> Vec<TestResult> {
    println!("--- Connectivity ---");
    let mut results = Vec::new();

    let Some((mut grid, doorways)) = resolved_grid(layout) else {
        return results;
    };

    let findings = validation::validate_building(&grid, &doors::register(&grid, &layout.constants));
    let errors = findings
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    results.push(TestResult {
        name: "connectivity_symmetry".into(),
        passed: errors == 0,
        detail: format!("{} doorways, {} errors", doorways, errors),
    });

    let unreachable = findings.len() - errors;
    results.push(TestResult {
        name: "connectivity_reachable".into(),
        passed: unreachable == 0,
        detail: findings
            .iter()
            .find(|d| d.severity == Severity::Warning)
            .map_or("every room reachable".to_string(), |d| d.message.clone()),
    });

    let before: Vec<_> = grid.occupied_cells().iter().map(|&c| grid.doors(c)).collect();
    connectivity::resolve(&mut grid);
    let after: Vec<_> = grid.occupied_cells().iter().map(|&c| grid.doors(c)).collect();
    results.push(TestResult {
        name: "connectivity_idempotent".into(),
        passed: before == after,
        detail: "second resolve leaves flags unchanged".into(),
    });

    // Seeded random layouts
    let mut bad_seeds = Vec::new();
    for seed in 0..100u64 {
        let walk = random_walk(seed, 24, 12, 12);
        let Some((grid, _)) = resolved_grid(&walk) else {
            bad_seeds.push(seed);
            continue;
        };
        let triggers = doors::register(&grid, &walk.constants);
        if !validation::validate_building(&grid, &triggers).is_empty() {
            bad_seeds.push(seed);
        }
    }
    if verbose && !bad_seeds.is_empty() {
        println!("    failing seeds: {:?}", bad_seeds);
    }
    results.push(TestResult {
        name: "connectivity_random_sweep".into(),
        passed: bad_seeds.is_empty(),
        detail: format!("100 seeds, {} failed", bad_seeds.len()),
    });

    results
}

// ── 3. Geometry ─────────────────────────────────────────────────────────

fn validate_geometry(layout: &Layout, _verbose: bool) -> Vec<TestResult> {
    println!("--- Geometry ---");
    let mut results = Vec::new();

    let Some((grid, doorways)) = resolved_grid(layout) else {
        return results;
    };
    let carver = BoxCarver;
    let compiler = match GeometryCompiler::new(layout.constants, &carver) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "geometry_compiler".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let geometry = compiler.compile(&grid);

    results.push(TestResult {
        name: "geometry_room_count".into(),
        passed: geometry.rooms.len() == grid.room_count(),
        detail: format!("{} rooms compiled", geometry.rooms.len()),
    });

    let panels: usize = geometry.rooms.iter().map(|r| r.panels().count()).sum();
    results.push(TestResult {
        name: "geometry_six_panels".into(),
        passed: panels == geometry.rooms.len() * 6,
        detail: format!("{} panels", panels),
    });

    let open_walls: Vec<String> = geometry
        .rooms
        .iter()
        .flat_map(|r| {
            r.walls
                .iter()
                .filter(|w| !w.mesh.is_closed())
                .map(move |w| format!("{} {:?}", r.cell, w.kind))
        })
        .collect();
    results.push(TestResult {
        name: "geometry_walls_closed".into(),
        passed: open_walls.is_empty(),
        detail: if open_walls.is_empty() {
            "every wall is a closed solid".into()
        } else {
            format!("open: {}", open_walls.join(", "))
        },
    });

    results.push(TestResult {
        name: "geometry_openings".into(),
        passed: geometry.opening_count() == doorways * 2 && geometry.diagnostics.is_empty(),
        detail: format!(
            "{} openings for {} doorways, {} fallbacks",
            geometry.opening_count(),
            doorways,
            geometry.diagnostics.len()
        ),
    });

    let mismatched = geometry
        .rooms
        .iter()
        .filter(|r| {
            Direction::ALL
                .iter()
                .any(|&d| r.wall(d).has_opening != grid.doors(r.cell).get(d))
        })
        .count();
    results.push(TestResult {
        name: "geometry_openings_follow_flags".into(),
        passed: mismatched == 0,
        detail: format!("{} rooms with mismatched openings", mismatched),
    });

    let height = layout.constants.wall_height;
    let ceilings_ok = geometry.rooms.iter().all(|r| {
        match (r.floor.mesh.bounds(), r.ceiling.mesh.bounds()) {
            (Some((f, _)), Some((c, _))) => (c.y - f.y - height).abs() < 1e-4,
            _ => false,
        }
    });
    results.push(TestResult {
        name: "geometry_ceiling_height".into(),
        passed: ceilings_ok,
        detail: format!("ceilings at {}", height),
    });

    results
}

// ── 4. Doors ────────────────────────────────────────────────────────────

fn validate_doors(layout: &Layout, verbose: bool) -> Vec<TestResult> {
    println!("--- Doors ---");
    let mut results = Vec::new();

    let Some((grid, doorways)) = resolved_grid(layout) else {
        return results;
    };
    let triggers = doors::register(&grid, &layout.constants);

    results.push(TestResult {
        name: "doors_one_per_doorway".into(),
        passed: triggers.len() == doorways,
        detail: format!("{} triggers, {} doorways", triggers.len(), doorways),
    });

    let ids: HashSet<String> = triggers.iter().map(|t| t.id()).collect();
    results.push(TestResult {
        name: "doors_unique_ids".into(),
        passed: ids.len() == triggers.len(),
        detail: format!("{} distinct ids", ids.len()),
    });

    let half = layout.constants.door_height / 2.0;
    let posed = triggers
        .iter()
        .all(|t| (t.position.y - half).abs() < 1e-5 && t.yaw == t.key.direction.yaw());
    results.push(TestResult {
        name: "doors_pose".into(),
        passed: posed,
        detail: format!("all triggers at y={} facing their direction", half),
    });

    if verbose {
        match serde_json::to_string_pretty(&triggers) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("    could not dump triggers: {}", e),
        }
    }

    results
}

// ── 5. Spawn ────────────────────────────────────────────────────────────

fn validate_spawn(layout: &Layout, _verbose: bool) -> Vec<TestResult> {
    println!("--- Spawn ---");
    let mut results = Vec::new();

    let Some((grid, _)) = resolved_grid(layout) else {
        return results;
    };

    match spawn::resolve(&grid, &layout.constants, &layout.start) {
        Ok(pose) => {
            let expected_y = if layout.start.zone.is_some() {
                pose.position.y
            } else {
                EYE_HEIGHT
            };
            results.push(TestResult {
                name: "spawn_pose".into(),
                passed: pose.position.is_finite() && pose.position.y == expected_y,
                detail: format!(
                    "({:.2}, {:.2}, {:.2}) yaw {:.2}",
                    pose.position.x, pose.position.y, pose.position.z, pose.yaw
                ),
            });
            let again = spawn::resolve(&grid, &layout.constants, &layout.start).ok();
            results.push(TestResult {
                name: "spawn_idempotent".into(),
                passed: again == Some(pose),
                detail: "same pose on second resolve".into(),
            });
        }
        Err(e) => results.push(TestResult {
            name: "spawn_pose".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    results
}

// ── 6. Session ──────────────────────────────────────────────────────────

fn validate_session(layout: &Layout, verbose: bool) -> Vec<TestResult> {
    println!("--- Session ---");
    let mut results = Vec::new();

    let mut scene = SceneGraph::new();
    let mut session = BuildingSession::new();

    let first = match session.generate(&mut scene, layout) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "session_generate".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "session_generate".into(),
        passed: scene.count_live_meshes() == first.rooms * 6
            && scene.count_triggers() == first.triggers,
        detail: format!(
            "{} meshes, {} triggers, {} nodes",
            scene.count_live_meshes(),
            scene.count_triggers(),
            scene.node_count()
        ),
    });
    if verbose {
        match serde_json::to_string_pretty(&first.diagnostics) {
            Ok(json) => println!("    diagnostics: {}", json),
            Err(e) => println!("    could not dump diagnostics: {}", e),
        }
    }

    let old_meshes: Vec<_> = scene.meshes().into_iter().map(|(id, _)| id).collect();
    let second = session.generate(&mut scene, layout);
    let stale = old_meshes.iter().filter(|id| scene.contains(**id)).count();
    results.push(TestResult {
        name: "session_regenerate".into(),
        passed: second.as_ref().ok() == Some(&first)
            && scene.roots().len() == 1
            && stale == 0,
        detail: format!(
            "{} roots, {} old meshes still alive",
            scene.roots().len(),
            stale
        ),
    });

    let root = session.root();
    scene.suspend();
    let refused = session.generate(&mut scene, layout);
    scene.resume();
    results.push(TestResult {
        name: "session_missing_context".into(),
        passed: matches!(refused, Err(SessionError::MissingContext))
            && root.is_some_and(|r| scene.contains(r)),
        detail: "generate without a scene keeps the current building".into(),
    });

    let disposed = session.dispose(&mut scene);
    results.push(TestResult {
        name: "session_dispose".into(),
        passed: disposed.is_ok() && scene.node_count() == 0,
        detail: format!("{} nodes left", scene.node_count()),
    });

    results
}
