//! Layout sources: room-to-cell assignments that feed the grid.
//!
//! A [`Layout`] is plain data (usually JSON). Turning it into a [`Grid`] is
//! lenient: a placement with no template, an unknown template, a bad
//! footprint, or a footprint that leaves the grid or overlaps another room
//! is skipped with a diagnostic and the rest of the layout still builds.
//!
//! ```
//! use manorgen_logic::layout::Layout;
//!
//! let layout = Layout::manor();
//! let built = layout.build_grid().unwrap();
//! assert!(built.diagnostics.is_empty());
//! assert!(built.grid.room_count() > 0);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::BuildConstants;
use crate::diagnostics::{categories, Diagnostic};
use crate::direction::Direction;
use crate::grid::{CellCoord, Footprint, Grid};
use crate::spawn::StartSpec;

pub use crate::grid::MAX_GRID_SIDE;

/// The hand-authored manor shipped with the game.
const MANOR_JSON: &str = include_str!("../../../data/manor_layout.json");

/// Layout problems that cannot be recovered per cell.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid size {cols}x{rows} is out of range (1..={max})")]
    InvalidGrid { cols: u32, rows: u32, max: u32 },
    #[error("malformed start zone: {0}")]
    MalformedStartZone(String),
}

/// One room placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPlacement {
    pub col: i32,
    pub row: i32,
    /// Template name; `None` marks a cell the author left unfinished.
    #[serde(default)]
    pub template: Option<String>,
}

/// A complete layout description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    #[serde(default)]
    pub constants: BuildConstants,
    /// Template catalog: name → footprint in cells.
    #[serde(default)]
    pub templates: BTreeMap<String, Footprint>,
    pub rooms: Vec<RoomPlacement>,
    #[serde(default)]
    pub start: StartSpec,
}

/// A grid built from a layout plus whatever was skipped on the way.
#[derive(Debug, Clone)]
pub struct LayoutGrid {
    pub grid: Grid,
    pub diagnostics: Vec<Diagnostic>,
}

impl Layout {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The built-in manor layout.
    pub fn manor() -> Self {
        // Covered by test_manor_parses_cleanly.
        serde_json::from_str(MANOR_JSON).expect("data/manor_layout.json is invalid")
    }

    /// Checks that must pass before a session tears anything down.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.cols == 0
            || self.rows == 0
            || self.cols > MAX_GRID_SIDE
            || self.rows > MAX_GRID_SIDE
        {
            return Err(LayoutError::InvalidGrid {
                cols: self.cols,
                rows: self.rows,
                max: MAX_GRID_SIDE,
            });
        }
        if let Some(zone) = &self.start.zone {
            zone.validate()?;
        }
        Ok(())
    }

    /// Assign every valid placement to a fresh grid.
    pub fn build_grid(&self) -> Result<LayoutGrid, LayoutError> {
        self.validate()?;
        let mut grid = Grid::new(self.cols, self.rows);
        let mut diagnostics = Vec::new();

        for placement in &self.rooms {
            let anchor = CellCoord::new(placement.col, placement.row);
            let skip = |diagnostics: &mut Vec<Diagnostic>, why: String| {
                let d = Diagnostic::warning(
                    categories::INVALID_LAYOUT,
                    format!("Skipping cell {}: {}", anchor, why),
                );
                d.emit();
                diagnostics.push(d);
            };

            let Some(name) = placement.template.as_deref() else {
                skip(&mut diagnostics, "no template".into());
                continue;
            };
            let Some(&footprint) = self.templates.get(name) else {
                skip(&mut diagnostics, format!("unknown template '{}'", name));
                continue;
            };
            if !footprint.is_valid() {
                skip(
                    &mut diagnostics,
                    format!(
                        "template '{}' has empty footprint {}x{}",
                        name, footprint.width, footprint.depth
                    ),
                );
                continue;
            }

            if !self.fits(anchor, footprint) {
                skip(
                    &mut diagnostics,
                    format!(
                        "footprint of '{}' ({}x{}) leaves the {}x{} grid",
                        name, footprint.width, footprint.depth, self.cols, self.rows
                    ),
                );
                continue;
            }
            let cells = footprint_cells(anchor, footprint);
            if let Some(taken) = cells.iter().find(|c| !grid.is_free(**c)) {
                skip(
                    &mut diagnostics,
                    format!("footprint of '{}' overlaps another room at {}", name, taken),
                );
                continue;
            }

            grid.assign(anchor, name, footprint);
            for &c in cells.iter().skip(1) {
                grid.cover(c, anchor);
            }
        }

        log::info!(
            "Layout '{}': {} rooms on a {}x{} grid ({} skipped)",
            self.name,
            grid.room_count(),
            self.cols,
            self.rows,
            diagnostics.len()
        );
        Ok(LayoutGrid { grid, diagnostics })
    }

    /// True when a footprint anchored at `anchor` lies inside the grid.
    fn fits(&self, anchor: CellCoord, footprint: Footprint) -> bool {
        let end_col = i64::from(anchor.col) + i64::from(footprint.width);
        let end_row = i64::from(anchor.row) + i64::from(footprint.depth);
        anchor.col >= 0
            && anchor.row >= 0
            && end_col <= i64::from(self.cols)
            && end_row <= i64::from(self.rows)
    }
}

/// Cells spanned by a footprint, anchor first. The footprint must already
/// fit the grid.
fn footprint_cells(anchor: CellCoord, footprint: Footprint) -> Vec<CellCoord> {
    let mut cells = Vec::with_capacity(footprint.width as usize * footprint.depth as usize);
    for dr in 0..footprint.depth as i32 {
        for dc in 0..footprint.width as i32 {
            cells.push(CellCoord::new(anchor.col + dc, anchor.row + dr));
        }
    }
    cells
}

/// Single-cell templates used by [`random_walk`].
const WALK_TEMPLATES: [&str; 6] = [
    "hallway",
    "bedroom",
    "kitchen",
    "bathroom",
    "study",
    "storage",
];

/// Generate a connected layout by a seeded random walk.
///
/// Starts at the grid centre and repeatedly grows from a random existing
/// room into a random free neighbor, so every room touches at least one
/// other. The same seed always yields the same layout. Sides above
/// [`MAX_GRID_SIDE`] are clamped.
pub fn random_walk(seed: u64, room_count: usize, cols: u32, rows: u32) -> Layout {
    let (cols, rows) = (cols.min(MAX_GRID_SIDE), rows.min(MAX_GRID_SIDE));
    let mut rng = StdRng::seed_from_u64(seed);
    let capacity = cols as usize * rows as usize;
    let target = room_count.min(capacity);

    let start = CellCoord::new(cols as i32 / 2, rows as i32 / 2);
    let mut placed: Vec<CellCoord> = Vec::with_capacity(target);
    let mut grid = Grid::new(cols, rows);
    if target > 0 {
        grid.assign(start, "foyer", Footprint::UNIT);
        placed.push(start);
    }

    let mut attempts = 0;
    while placed.len() < target && attempts < target * 64 {
        attempts += 1;
        let from = placed[rng.gen_range(0..placed.len())];
        let dir = Direction::ALL[rng.gen_range(0..4)];
        let Some(next) = grid.neighbor(from, dir) else {
            continue;
        };
        if !grid.is_free(next) {
            continue;
        }
        grid.assign(next, "room", Footprint::UNIT);
        placed.push(next);
    }

    let mut templates = BTreeMap::new();
    templates.insert("foyer".to_string(), Footprint::UNIT);
    for name in WALK_TEMPLATES {
        templates.insert(name.to_string(), Footprint::UNIT);
    }

    let rooms = placed
        .iter()
        .enumerate()
        .map(|(i, c)| RoomPlacement {
            col: c.col,
            row: c.row,
            template: Some(if i == 0 {
                "foyer".to_string()
            } else {
                WALK_TEMPLATES[rng.gen_range(0..WALK_TEMPLATES.len())].to_string()
            }),
        })
        .collect();

    Layout {
        name: format!("random-walk-{}", seed),
        cols,
        rows,
        constants: BuildConstants::default(),
        templates,
        rooms,
        start: StartSpec {
            cell: placed.first().copied(),
            zone: None,
        },
    }
}
