//! Cardinal directions and the single orientation table shared by wall
//! carving and door placement.
//!
//! Conventions:
//! - `East` is `col + 1` and world +X.
//! - `North` is `row + 1` and world +Z.
//! - Yaw θ rotates local +Z onto `(sin θ, 0, cos θ)`, so north is 0,
//!   south is π, east is +π/2 and west is −π/2.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;

use crate::mesh::Vec3;

/// One of the four edges of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// Horizontal world axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

/// Orientation data for one direction. Every consumer reads from [`TABLE`].
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    /// Grid step `(dcol, drow)` to the neighbor across this edge.
    pub offset: (i32, i32),
    /// Outward unit normal of the edge.
    pub normal: Vec3,
    /// Yaw that turns local +Z onto `normal`.
    pub yaw: f32,
    /// Axis the edge runs along.
    pub along: Axis,
}

const TABLE: [Orientation; 4] = [
    // North
    Orientation {
        offset: (0, 1),
        normal: Vec3::new(0.0, 0.0, 1.0),
        yaw: 0.0,
        along: Axis::X,
    },
    // South
    Orientation {
        offset: (0, -1),
        normal: Vec3::new(0.0, 0.0, -1.0),
        yaw: PI,
        along: Axis::X,
    },
    // East
    Orientation {
        offset: (1, 0),
        normal: Vec3::new(1.0, 0.0, 0.0),
        yaw: FRAC_PI_2,
        along: Axis::Z,
    },
    // West
    Orientation {
        offset: (-1, 0),
        normal: Vec3::new(-1.0, 0.0, 0.0),
        yaw: -FRAC_PI_2,
        along: Axis::Z,
    },
];

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    pub fn orientation(self) -> &'static Orientation {
        &TABLE[self.index()]
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        self.orientation().offset
    }

    pub fn normal(self) -> Vec3 {
        self.orientation().normal
    }

    pub fn yaw(self) -> f32 {
        self.orientation().yaw
    }

    pub fn along(self) -> Axis {
        self.orientation().along
    }

    /// North and east are the directions the resolver walks; a doorway is
    /// keyed by the cell on its south/west side.
    pub fn is_canonical(self) -> bool {
        matches!(self, Direction::North | Direction::East)
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::South => "s",
            Direction::East => "e",
            Direction::West => "w",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Rotate a vector about +Y by `yaw` using the table's convention.
pub fn rotate_yaw(v: Vec3, yaw: f32) -> Vec3 {
    let (s, c) = yaw.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}
