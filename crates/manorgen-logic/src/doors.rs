//! Door registry: one inert trigger per doorway.
//!
//! A doorway is the edge shared by two occupied cells. Both cells carry a
//! door flag for it, so triggers are keyed by the canonical side (the cell
//! whose flag points north or east) and each doorway yields exactly one
//! trigger. Triggers carry only pose and size; opening, animation and
//! blocking belong to the door-interaction system that consumes them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::compiler::{cell_origin, doorway_center_local};
use crate::constants::BuildConstants;
use crate::direction::Direction;
use crate::grid::{CellCoord, Grid};
use crate::mesh::Vec3;

/// Stable doorway identifier: the canonical cell and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorKey {
    pub cell: CellCoord,
    pub direction: Direction,
}

impl DoorKey {
    /// Canonicalize a door flag seen from either side.
    pub fn canonical(cell: CellCoord, direction: Direction) -> Self {
        if direction.is_canonical() {
            Self { cell, direction }
        } else {
            Self {
                cell: cell.step(direction),
                direction: direction.opposite(),
            }
        }
    }

    /// The cell on the far side of the doorway.
    pub fn other_cell(&self) -> CellCoord {
        self.cell.step(self.direction)
    }
}

impl fmt::Display for DoorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "door_{}_{}_{}",
            self.cell.col,
            self.cell.row,
            self.direction.short_name()
        )
    }
}

/// Invisible collider/trigger for one doorway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorTrigger {
    pub key: DoorKey,
    /// World position: doorway midpoint at half door height.
    pub position: Vec3,
    /// Facing yaw from the direction table.
    pub yaw: f32,
    /// Collider extents: door width, door height, wall thickness × 2.
    pub size: Vec3,
}

impl DoorTrigger {
    pub fn id(&self) -> String {
        self.key.to_string()
    }
}

/// Emit one trigger per doorway found in the grid's door flags.
pub fn register(grid: &Grid, constants: &BuildConstants) -> Vec<DoorTrigger> {
    let mut doorways: BTreeMap<DoorKey, DoorTrigger> = BTreeMap::new();

    for cell in grid.occupied_cells() {
        let flags = grid.doors(cell);
        for dir in Direction::ALL {
            if !flags.get(dir) {
                continue;
            }
            let key = DoorKey::canonical(cell, dir);
            if doorways.contains_key(&key) {
                continue;
            }
            let Some(anchor) = grid.room(key.cell) else {
                continue;
            };
            let local = doorway_center_local(anchor.footprint, key.direction, constants);
            let origin = cell_origin(key.cell, constants);
            doorways.insert(
                key,
                DoorTrigger {
                    key,
                    position: Vec3::new(
                        origin.x + local.x,
                        constants.door_height / 2.0,
                        origin.z + local.z,
                    ),
                    yaw: key.direction.yaw(),
                    size: Vec3::new(
                        constants.door_width,
                        constants.door_height,
                        constants.wall_thickness * 2.0,
                    ),
                },
            );
        }
    }

    log::debug!("Registered {} door triggers", doorways.len());
    doorways.into_values().collect()
}
