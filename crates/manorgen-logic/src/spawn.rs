//! Player spawn resolution.
//!
//! Priority: explicit start-zone override, then the designated start cell,
//! then a fixed default position. Pure and idempotent.

use serde::{Deserialize, Serialize};

use crate::compiler::{cell_origin, room_extent};
use crate::constants::{BuildConstants, DEFAULT_SPAWN_POSITION, EYE_HEIGHT};
use crate::direction::rotate_yaw;
use crate::grid::{CellCoord, Grid};
use crate::layout::LayoutError;
use crate::mesh::Vec3;

/// World-space player pose at session start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

/// Authored start zone: a local offset scaled and rotated into world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartZone {
    pub offset: Vec3,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

impl StartZone {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.offset.is_finite() || !self.yaw.is_finite() {
            return Err(LayoutError::MalformedStartZone(
                "offset and yaw must be finite".into(),
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(LayoutError::MalformedStartZone(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    pub fn world_position(&self) -> Vec3 {
        rotate_yaw(self.offset * self.scale, self.yaw)
    }
}

/// Where the player should start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StartSpec {
    #[serde(default)]
    pub cell: Option<CellCoord>,
    #[serde(default)]
    pub zone: Option<StartZone>,
}

/// Resolve the spawn pose. Only a malformed start zone is an error. A start
/// cell spanned by a multi-cell room spawns at that room's centre; an empty
/// one falls through to the default.
pub fn resolve(
    grid: &Grid,
    constants: &BuildConstants,
    start: &StartSpec,
) -> Result<SpawnPose, LayoutError> {
    if let Some(zone) = &start.zone {
        zone.validate()?;
        return Ok(SpawnPose {
            position: zone.world_position(),
            yaw: zone.yaw,
            pitch: 0.0,
        });
    }

    if let Some(cell) = start.cell {
        let owner = grid.owner(cell);
        if let Some((anchor, room)) = owner.and_then(|a| grid.room(a).map(|r| (a, r))) {
            let origin = cell_origin(anchor, constants);
            let (w, d) = room_extent(room.footprint, constants);
            return Ok(SpawnPose {
                position: Vec3::new(origin.x + w / 2.0, EYE_HEIGHT, origin.z + d / 2.0),
                yaw: 0.0,
                pitch: 0.0,
            });
        }
        log::warn!("Start cell {} is not a room, using default spawn", cell);
    }

    Ok(SpawnPose {
        position: DEFAULT_SPAWN_POSITION,
        yaw: 0.0,
        pitch: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Footprint;
    use std::f32::consts::FRAC_PI_2;

    fn grid() -> Grid {
        let mut g = Grid::new(8, 8);
        g.assign(CellCoord::new(3, 3), "foyer", Footprint::UNIT);
        g
    }

    #[test]
    fn test_zone_override_wins() {
        let start = StartSpec {
            cell: Some(CellCoord::new(3, 3)),
            zone: Some(StartZone {
                offset: Vec3::new(0.0, 1.0, 2.0),
                yaw: FRAC_PI_2,
                scale: 2.0,
            }),
        };
        let pose = resolve(&grid(), &BuildConstants::default(), &start).unwrap();
        assert!((pose.position.x - 4.0).abs() < 1e-5);
        assert!((pose.position.y - 2.0).abs() < 1e-5);
        assert!(pose.position.z.abs() < 1e-5);
        assert_eq!(pose.yaw, FRAC_PI_2);
        assert_eq!(pose.pitch, 0.0);
    }

    #[test]
    fn test_start_cell_center() {
        let start = StartSpec {
            cell: Some(CellCoord::new(3, 3)),
            zone: None,
        };
        let pose = resolve(&grid(), &BuildConstants::default(), &start).unwrap();
        assert_eq!(pose.position, Vec3::new(17.5, EYE_HEIGHT, 17.5));
        assert_eq!(pose.yaw, 0.0);
    }

    #[test]
    fn test_default_fallback() {
        let pose = resolve(&grid(), &BuildConstants::default(), &StartSpec::default()).unwrap();
        assert_eq!(pose.position, DEFAULT_SPAWN_POSITION);

        let empty_cell = StartSpec {
            cell: Some(CellCoord::new(0, 0)),
            zone: None,
        };
        let pose = resolve(&grid(), &BuildConstants::default(), &empty_cell).unwrap();
        assert_eq!(pose.position, DEFAULT_SPAWN_POSITION);
    }

    #[test]
    fn test_covered_start_cell_uses_room_center() {
        let mut g = grid();
        let anchor = CellCoord::new(0, 5);
        g.assign(anchor, "parlor", Footprint::new(2, 1));
        g.cover(CellCoord::new(1, 5), anchor);
        let start = StartSpec {
            cell: Some(CellCoord::new(1, 5)),
            zone: None,
        };
        let pose = resolve(&g, &BuildConstants::default(), &start).unwrap();
        assert_eq!(pose.position, Vec3::new(5.0, EYE_HEIGHT, 27.5));
    }

    #[test]
    fn test_malformed_zone_is_error() {
        let start = StartSpec {
            cell: None,
            zone: Some(StartZone {
                offset: Vec3::ZERO,
                yaw: 0.0,
                scale: 0.0,
            }),
        };
        assert!(matches!(
            resolve(&grid(), &BuildConstants::default(), &start),
            Err(LayoutError::MalformedStartZone(_))
        ));
    }

    #[test]
    fn test_idempotent() {
        let start = StartSpec {
            cell: Some(CellCoord::new(3, 3)),
            zone: None,
        };
        let c = BuildConstants::default();
        assert_eq!(
            resolve(&grid(), &c, &start).unwrap(),
            resolve(&grid(), &c, &start).unwrap()
        );
    }
}
