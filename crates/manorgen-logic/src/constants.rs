//! Building dimensions shared by the geometry compiler and the door
//! registry.
//!
//! All values are metres. The defaults match the hand-authored manor
//! layout in `data/manor_layout.json`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::Vec3;

/// Eye height used when spawning the player at a cell centre.
pub const EYE_HEIGHT: f32 = 1.6;

/// Last-resort spawn position when the layout names no start.
pub const DEFAULT_SPAWN_POSITION: Vec3 = Vec3::new(2.5, EYE_HEIGHT, 2.5);

/// Fixed numeric configuration for building generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConstants {
    /// Edge length of one grid cell.
    pub cell_size: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub door_width: f32,
    pub door_height: f32,
}

impl Default for BuildConstants {
    fn default() -> Self {
        Self {
            cell_size: 5.0,
            wall_height: 3.0,
            wall_thickness: 0.2,
            door_width: 1.2,
            door_height: 2.2,
        }
    }
}

/// A constant set that would make door carving ill-defined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstantsError {
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("door width {door_width} must be smaller than cell size {cell_size}")]
    DoorTooWide { door_width: f32, cell_size: f32 },
    #[error("door height {door_height} must be smaller than wall height {wall_height}")]
    DoorTooTall { door_height: f32, wall_height: f32 },
    #[error("wall thickness {wall_thickness} must be smaller than half the cell size {cell_size}")]
    WallTooThick { wall_thickness: f32, cell_size: f32 },
    #[error(
        "door width {door_width} plus two side walls of {wall_thickness} must be smaller than cell size {cell_size}"
    )]
    DoorBlockedBySideWalls {
        door_width: f32,
        wall_thickness: f32,
        cell_size: f32,
    },
}

impl BuildConstants {
    /// Check the invariants door carving relies on.
    pub fn validate(&self) -> Result<(), ConstantsError> {
        for (name, value) in [
            ("cellSize", self.cell_size),
            ("wallHeight", self.wall_height),
            ("wallThickness", self.wall_thickness),
            ("doorWidth", self.door_width),
            ("doorHeight", self.door_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConstantsError::NonPositive { name, value });
            }
        }
        if self.door_width >= self.cell_size {
            return Err(ConstantsError::DoorTooWide {
                door_width: self.door_width,
                cell_size: self.cell_size,
            });
        }
        if self.door_height >= self.wall_height {
            return Err(ConstantsError::DoorTooTall {
                door_height: self.door_height,
                wall_height: self.wall_height,
            });
        }
        // Opposite walls of a 1×1 room must not meet.
        if self.wall_thickness * 2.0 >= self.cell_size {
            return Err(ConstantsError::WallTooThick {
                wall_thickness: self.wall_thickness,
                cell_size: self.cell_size,
            });
        }
        // Side walls span the full edge, so a doorway must clear both of
        // them inside a single cell.
        if self.door_width + 2.0 * self.wall_thickness >= self.cell_size {
            return Err(ConstantsError::DoorBlockedBySideWalls {
                door_width: self.door_width,
                wall_thickness: self.wall_thickness,
                cell_size: self.cell_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(BuildConstants::default().validate(), Ok(()));
    }

    #[test]
    fn test_door_as_wide_as_cell_rejected() {
        let c = BuildConstants {
            door_width: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConstantsError::DoorTooWide { .. })
        ));
    }

    #[test]
    fn test_door_overlapping_side_walls_rejected() {
        let c = BuildConstants {
            door_width: 4.8,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConstantsError::DoorBlockedBySideWalls { .. })
        ));

        let just_fits = BuildConstants {
            door_width: 4.5,
            ..Default::default()
        };
        assert_eq!(just_fits.validate(), Ok(()));
    }

    #[test]
    fn test_door_as_tall_as_wall_rejected() {
        let c = BuildConstants {
            door_height: 3.0,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConstantsError::DoorTooTall { .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let c = BuildConstants {
            wall_thickness: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConstantsError::NonPositive {
                name: "wallThickness",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: BuildConstants = serde_json::from_str(r#"{ "cellSize": 4.0 }"#).unwrap();
        assert_eq!(c.cell_size, 4.0);
        assert_eq!(c.wall_height, 3.0);
    }
}
