//! Geometry compiler: grid → per-room floor, ceiling and wall meshes.
//!
//! Room space has its origin at the anchor cell's minimum corner; the room
//! spans `footprint × cell_size` along +X and +Z and `wall_height` up.
//! Walls sit just inside the footprint edge (inset by their thickness), so
//! two neighbouring rooms each own one panel of a shared edge and both get
//! the same hole cut.
//!
//! Wall pipeline per edge:
//! 1. derive a [`WallPanelSpec`] from the door flags,
//! 2. no door: emit the solid box directly,
//! 3. door: hand the solid volume and a door-shaped cutter to a
//!    [`Subtract`] implementation; on failure fall back to the solid box
//!    and record a diagnostic.

use serde::Serialize;

use crate::constants::{BuildConstants, ConstantsError};
use crate::csg::{solid_box, Aabb, Subtract};
use crate::diagnostics::{categories, Diagnostic};
use crate::direction::{Axis, Direction};
use crate::grid::{CellCoord, Footprint, Grid, RoomAssignment};
use crate::mesh::{MeshData, Vec3};

/// What a panel is, for consumers that tag meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelKind {
    Floor,
    Ceiling,
    Wall(Direction),
}

/// Rendering/collision hints attached to every mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshTags {
    pub collidable: bool,
    pub receives_shadows: bool,
}

impl Default for MeshTags {
    fn default() -> Self {
        Self {
            collidable: true,
            receives_shadows: true,
        }
    }
}

/// A finished panel.
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub kind: PanelKind,
    pub mesh: MeshData,
    /// True when a doorway was cut into this panel.
    pub has_opening: bool,
    pub tags: MeshTags,
}

/// Ephemeral description of one wall before it is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPanelSpec {
    pub direction: Direction,
    pub span: f32,
    pub has_door: bool,
}

/// Geometry for one room. The fixed fields guarantee one floor, one
/// ceiling and exactly four walls regardless of door count.
#[derive(Debug, Clone, Serialize)]
pub struct RoomGeometry {
    pub cell: CellCoord,
    pub template: String,
    /// World position of the room node.
    pub origin: Vec3,
    pub floor: Panel,
    pub ceiling: Panel,
    /// Ordered as [`Direction::ALL`].
    pub walls: [Panel; 4],
}

impl RoomGeometry {
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        [&self.floor, &self.ceiling].into_iter().chain(self.walls.iter())
    }

    pub fn wall(&self, dir: Direction) -> &Panel {
        let i = Direction::ALL
            .iter()
            .position(|&d| d == dir)
            .unwrap_or_default();
        &self.walls[i]
    }
}

/// Output of one compile: every room plus recovered diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildingGeometry {
    pub rooms: Vec<RoomGeometry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildingGeometry {
    pub fn room(&self, cell: CellCoord) -> Option<&RoomGeometry> {
        self.rooms.iter().find(|r| r.cell == cell)
    }

    pub fn opening_count(&self) -> usize {
        self.rooms
            .iter()
            .flat_map(|r| r.walls.iter())
            .filter(|w| w.has_opening)
            .count()
    }
}

/// World origin of a cell's room node.
pub fn cell_origin(cell: CellCoord, constants: &BuildConstants) -> Vec3 {
    Vec3::new(
        cell.col as f32 * constants.cell_size,
        0.0,
        cell.row as f32 * constants.cell_size,
    )
}

/// Room size in world units (x extent, z extent).
pub fn room_extent(footprint: Footprint, constants: &BuildConstants) -> (f32, f32) {
    (
        footprint.width as f32 * constants.cell_size,
        footprint.depth as f32 * constants.cell_size,
    )
}

/// Room-local point on the edge line at the centre of the doorway on side
/// `dir`, at floor level.
///
/// Doors only ever connect through the anchor cell, so the doorway is
/// centred on the anchor cell's segment of the edge. For 1×1 rooms this is
/// the middle of the wall.
pub fn doorway_center_local(
    footprint: Footprint,
    dir: Direction,
    constants: &BuildConstants,
) -> Vec3 {
    let (w, d) = room_extent(footprint, constants);
    let mid = constants.cell_size / 2.0;
    match dir {
        Direction::North => Vec3::new(mid, 0.0, d),
        Direction::South => Vec3::new(mid, 0.0, 0.0),
        Direction::East => Vec3::new(w, 0.0, mid),
        Direction::West => Vec3::new(0.0, 0.0, mid),
    }
}

/// Wall specs for the four edges of a room, ordered as [`Direction::ALL`].
pub fn wall_specs(room: &RoomAssignment, constants: &BuildConstants) -> [WallPanelSpec; 4] {
    Direction::ALL.map(|dir| WallPanelSpec {
        direction: dir,
        span: room.footprint.cells_along(dir) as f32 * constants.cell_size,
        has_door: room.doors.get(dir),
    })
}

/// Compiles grids into building geometry.
pub struct GeometryCompiler<'a> {
    constants: BuildConstants,
    subtractor: &'a dyn Subtract,
}

impl<'a> GeometryCompiler<'a> {
    /// Fails when the constants would make door carving ill-defined.
    pub fn new(
        constants: BuildConstants,
        subtractor: &'a dyn Subtract,
    ) -> Result<Self, ConstantsError> {
        constants.validate()?;
        Ok(Self {
            constants,
            subtractor,
        })
    }

    pub fn constants(&self) -> &BuildConstants {
        &self.constants
    }

    /// Build geometry for every occupied cell in row-major order.
    pub fn compile(&self, grid: &Grid) -> BuildingGeometry {
        let mut out = BuildingGeometry::default();
        for cell in grid.occupied_cells() {
            let Some(room) = grid.room(cell) else {
                continue;
            };
            let geometry = self.compile_room(cell, room, &mut out.diagnostics);
            out.rooms.push(geometry);
        }
        log::info!(
            "Compiled {} rooms ({} door openings, {} diagnostics)",
            out.rooms.len(),
            out.opening_count(),
            out.diagnostics.len()
        );
        out
    }

    fn compile_room(
        &self,
        cell: CellCoord,
        room: &RoomAssignment,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> RoomGeometry {
        let c = &self.constants;
        let (w, d) = room_extent(room.footprint, c);

        let mut floor_mesh = MeshData::new();
        floor_mesh.push_quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, d),
            Vec3::new(w, 0.0, d),
            Vec3::new(w, 0.0, 0.0),
        );
        let ceiling_mesh = floor_mesh.flipped_copy(c.wall_height);

        let walls = wall_specs(room, c).map(|spec| {
            let (mesh, has_opening) = self.build_wall(cell, room.footprint, spec, diagnostics);
            Panel {
                kind: PanelKind::Wall(spec.direction),
                mesh,
                has_opening,
                tags: MeshTags::default(),
            }
        });

        RoomGeometry {
            cell,
            template: room.template.clone(),
            origin: cell_origin(cell, c),
            floor: Panel {
                kind: PanelKind::Floor,
                mesh: floor_mesh,
                has_opening: false,
                tags: MeshTags::default(),
            },
            ceiling: Panel {
                kind: PanelKind::Ceiling,
                mesh: ceiling_mesh,
                has_opening: false,
                tags: MeshTags::default(),
            },
            walls,
        }
    }

    fn build_wall(
        &self,
        cell: CellCoord,
        footprint: Footprint,
        spec: WallPanelSpec,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (MeshData, bool) {
        let solid = self.wall_volume(footprint, spec.direction);
        if !spec.has_door {
            return (solid_box(solid), false);
        }

        let cutter = self.door_cutter(footprint, spec.direction);
        match self.subtractor.subtract(solid, cutter) {
            Ok(mesh) => (mesh, true),
            Err(e) => {
                let diag = Diagnostic::warning(
                    categories::GEOMETRY_FAILURE,
                    format!(
                        "Room {} {} wall: door cut failed ({}), using solid panel",
                        cell, spec.direction, e
                    ),
                );
                diag.emit();
                diagnostics.push(diag);
                (solid_box(solid), false)
            }
        }
    }

    /// Solid wall volume in room space, inset from the edge line.
    fn wall_volume(&self, footprint: Footprint, dir: Direction) -> Aabb {
        let c = &self.constants;
        let (w, d) = room_extent(footprint, c);
        let t = c.wall_thickness;
        let h = c.wall_height;
        let (x0, x1, z0, z1) = match dir {
            Direction::North => (0.0, w, d - t, d),
            Direction::South => (0.0, w, 0.0, t),
            Direction::East => (w - t, w, 0.0, d),
            Direction::West => (0.0, t, 0.0, d),
        };
        Aabb::new(Vec3::new(x0, 0.0, z0), Vec3::new(x1, h, z1))
    }

    /// Door-shaped cutter: base on the floor, centred on the doorway,
    /// overshooting the wall by its own thickness on both faces.
    fn door_cutter(&self, footprint: Footprint, dir: Direction) -> Aabb {
        let c = &self.constants;
        let wall = self.wall_volume(footprint, dir);
        let center = doorway_center_local(footprint, dir, c);
        let half = c.door_width / 2.0;
        let pad = c.wall_thickness;
        let (x0, x1, z0, z1) = match dir.along() {
            Axis::X => (
                center.x - half,
                center.x + half,
                wall.min.z - pad,
                wall.max.z + pad,
            ),
            Axis::Z => (
                wall.min.x - pad,
                wall.max.x + pad,
                center.z - half,
                center.z + half,
            ),
        };
        Aabb::new(Vec3::new(x0, 0.0, z0), Vec3::new(x1, c.door_height, z1))
    }
}
