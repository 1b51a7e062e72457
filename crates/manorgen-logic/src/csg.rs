//! Boolean subtraction of door-shaped cutters from wall panels.
//!
//! The compiler only needs one capability: take a solid panel volume and a
//! smaller cutter volume, and return a single closed mesh of
//! `panel − cutter`. [`Subtract`] is that seam. [`BoxCarver`] satisfies it
//! for axis-aligned boxes where the cutter pierces the panel through one
//! horizontal axis and stands on the panel's base, which is exactly the
//! doorway case.
//!
//! Both volumes are taken by value: they are consumed by the operation and
//! cannot outlive it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::direction::Axis;
use crate::mesh::{MeshData, Vec3};

/// Axis-aligned box volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn is_valid(&self) -> bool {
        let s = self.size();
        self.min.is_finite() && self.max.is_finite() && s.x > 0.0 && s.y > 0.0 && s.z > 0.0
    }

    fn range(&self, axis: Axis3) -> (f32, f32) {
        match axis {
            Axis3::X => (self.min.x, self.max.x),
            Axis3::Y => (self.min.y, self.max.y),
            Axis3::Z => (self.min.z, self.max.z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis3 {
    X,
    Y,
    Z,
}

impl From<Axis> for Axis3 {
    fn from(a: Axis) -> Self {
        match a {
            Axis::X => Axis3::X,
            Axis::Z => Axis3::Z,
        }
    }
}

/// Why a subtraction could not produce a closed panel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CsgError {
    #[error("source volume is empty or non-finite")]
    InvalidVolume,
    #[error("cutter does not pierce the panel through a horizontal axis")]
    DoesNotPierce,
    #[error("cutter ({lo:.3}..{hi:.3}) is not strictly inside the panel span ({span_lo:.3}..{span_hi:.3})")]
    NotContained {
        lo: f32,
        hi: f32,
        span_lo: f32,
        span_hi: f32,
    },
    #[error("cutter must stand on the panel base and stop below its top")]
    UnsupportedOpening,
    #[error("subtraction produced degenerate geometry")]
    Degenerate,
    #[error("subtraction produced a mesh with an open boundary")]
    OpenBoundary,
}

/// Boolean difference capability.
pub trait Subtract {
    /// Return `panel − cutter` as one closed mesh.
    fn subtract(&self, panel: Aabb, cutter: Aabb) -> Result<MeshData, CsgError>;
}

/// Box-minus-box carver for doorway notches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxCarver;

impl Subtract for BoxCarver {
    fn subtract(&self, panel: Aabb, cutter: Aabb) -> Result<MeshData, CsgError> {
        if !panel.is_valid() || !cutter.is_valid() {
            return Err(CsgError::InvalidVolume);
        }

        let pierce = [Axis::X, Axis::Z]
            .into_iter()
            .find(|&a| {
                let (p0, p1) = panel.range(a.into());
                let (c0, c1) = cutter.range(a.into());
                c0 <= p0 && c1 >= p1
            })
            .ok_or(CsgError::DoesNotPierce)?;
        let across = match pierce {
            Axis::X => Axis::Z,
            Axis::Z => Axis::X,
        };

        let (u0, u1) = panel.range(across.into());
        let (cu0, cu1) = cutter.range(across.into());
        if !(cu0 > u0 && cu1 < u1) {
            return Err(CsgError::NotContained {
                lo: cu0,
                hi: cu1,
                span_lo: u0,
                span_hi: u1,
            });
        }

        let (v0, v1) = panel.range(Axis3::Y);
        let (cv0, cv1) = cutter.range(Axis3::Y);
        if cv0 > v0 || cv1 >= v1 || cv1 <= v0 {
            return Err(CsgError::UnsupportedOpening);
        }

        let (w0, w1) = panel.range(pierce.into());
        let profile = Profile::notch(u0, u1, v0, v1, cu0, cu1, cv1);
        let mesh = profile.extrude(w0, w1, pierce);

        if mesh.has_degenerate_triangles() {
            return Err(CsgError::Degenerate);
        }
        if !mesh.is_closed() {
            return Err(CsgError::OpenBoundary);
        }
        Ok(mesh)
    }
}

/// Plain closed box mesh for panels that need no cut.
pub fn solid_box(volume: Aabb) -> MeshData {
    let (u0, u1) = volume.range(Axis3::X);
    let (v0, v1) = volume.range(Axis3::Y);
    let (w0, w1) = volume.range(Axis3::Z);
    Profile::rect(u0, u1, v0, v1).extrude(w0, w1, Axis::Z)
}

/// Planar outline in (u, v) with a fixed triangulation. `outline` is
/// counter-clockwise; `triangles` index into it, also counter-clockwise.
struct Profile {
    outline: Vec<(f32, f32)>,
    triangles: Vec<[usize; 3]>,
}

impl Profile {
    fn rect(u0: f32, u1: f32, v0: f32, v1: f32) -> Self {
        Self {
            outline: vec![(u0, v0), (u1, v0), (u1, v1), (u0, v1)],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    /// Rectangle with a notch rising from the base edge between `nl..nr`
    /// up to `nh`.
    ///
    /// ```text
    ///  7 ─────────────────── 6
    ///  │                     │
    ///  │     2 ─────── 3     │
    ///  │     │         │     │
    ///  0 ─── 1         4 ─── 5
    /// ```
    fn notch(u0: f32, u1: f32, v0: f32, v1: f32, nl: f32, nr: f32, nh: f32) -> Self {
        Self {
            outline: vec![
                (u0, v0),
                (nl, v0),
                (nl, nh),
                (nr, nh),
                (nr, v0),
                (u1, v0),
                (u1, v1),
                (u0, v1),
            ],
            triangles: vec![
                [0, 1, 2],
                [0, 2, 7],
                [7, 2, 3],
                [7, 3, 6],
                [3, 4, 5],
                [3, 5, 6],
            ],
        }
    }

    /// Sweep the outline from `w0` to `w1` along `depth` into a closed
    /// prism: two caps plus one side quad per outline edge.
    fn extrude(&self, w0: f32, w1: f32, depth: Axis) -> MeshData {
        // (u, v, w) → world. Depth along X swaps X and Z, which mirrors
        // the frame, so winding has to be reversed to stay outward.
        let to_world = |u: f32, v: f32, w: f32| match depth {
            Axis::Z => Vec3::new(u, v, w),
            Axis::X => Vec3::new(w, v, u),
        };
        let mirrored = depth == Axis::X;
        let mut mesh = MeshData::new();
        let mut tri = |a: Vec3, b: Vec3, c: Vec3| {
            if mirrored {
                mesh.push_triangle(a, c, b);
            } else {
                mesh.push_triangle(a, b, c);
            }
        };

        for t in &self.triangles {
            let (a, b, c) = (self.outline[t[0]], self.outline[t[1]], self.outline[t[2]]);
            // Back cap faces +w: counter-clockwise as authored.
            tri(
                to_world(a.0, a.1, w1),
                to_world(b.0, b.1, w1),
                to_world(c.0, c.1, w1),
            );
            // Front cap faces −w: reversed.
            tri(
                to_world(a.0, a.1, w0),
                to_world(c.0, c.1, w0),
                to_world(b.0, b.1, w0),
            );
        }

        let n = self.outline.len();
        for i in 0..n {
            let p = self.outline[i];
            let q = self.outline[(i + 1) % n];
            let a = to_world(p.0, p.1, w0);
            let b = to_world(q.0, q.1, w0);
            let c = to_world(q.0, q.1, w1);
            let d = to_world(p.0, p.1, w1);
            tri(a, b, c);
            tri(a, c, d);
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_along_x() -> Aabb {
        Aabb::new(Vec3::new(0.0, 0.0, 4.8), Vec3::new(5.0, 3.0, 5.0))
    }

    fn door_along_x() -> Aabb {
        Aabb::new(Vec3::new(1.9, 0.0, 4.6), Vec3::new(3.1, 2.2, 5.2))
    }

    fn outward(mesh: &MeshData, center: Vec3) -> bool {
        mesh.indices.chunks_exact(3).all(|t| {
            let a = mesh.positions[t[0] as usize];
            let b = mesh.positions[t[1] as usize];
            let c = mesh.positions[t[2] as usize];
            let n = (b - a).cross(c - a);
            let mid = (a + b + c) * (1.0 / 3.0);
            n.dot(mid - center) >= -1e-6
        })
    }

    #[test]
    fn test_solid_box_is_closed_and_outward() {
        let mesh = solid_box(wall_along_x());
        assert!(mesh.is_closed());
        assert_eq!(mesh.triangle_count(), 12);
        assert!(outward(&mesh, Vec3::new(2.5, 1.5, 4.9)));
    }

    #[test]
    fn test_door_cut_along_x_is_closed() {
        let mesh = BoxCarver
            .subtract(wall_along_x(), door_along_x())
            .expect("door cut");
        assert!(mesh.is_closed());
        // 6 triangles per cap, 8 side quads.
        assert_eq!(mesh.triangle_count(), 6 * 2 + 8 * 2);
    }

    #[test]
    fn test_door_cut_removes_door_area() {
        let mesh = BoxCarver
            .subtract(wall_along_x(), door_along_x())
            .unwrap();
        let solid = solid_box(wall_along_x());
        // Each cap loses 1.2 × 2.2; the notch adds two jamb faces and a
        // head face, each 0.2 deep, and removes the base strip under it.
        let cap_loss = 2.0 * 1.2 * 2.2;
        let notch_gain = 0.2 * (2.2 + 2.2 + 1.2) - 0.2 * 1.2;
        let expected = solid.surface_area() - cap_loss + notch_gain;
        assert!(
            (mesh.surface_area() - expected).abs() < 1e-3,
            "area {} expected {}",
            mesh.surface_area(),
            expected
        );
    }

    #[test]
    fn test_door_cut_along_z_is_closed() {
        let panel = Aabb::new(Vec3::new(4.8, 0.0, 0.0), Vec3::new(5.0, 3.0, 5.0));
        let cutter = Aabb::new(Vec3::new(4.6, 0.0, 1.9), Vec3::new(5.2, 2.2, 3.1));
        let mesh = BoxCarver.subtract(panel, cutter).unwrap();
        assert!(mesh.is_closed());
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, panel.min);
        assert_eq!(hi, panel.max);
    }

    #[test]
    fn test_cutter_wider_than_panel_rejected() {
        let cutter = Aabb::new(Vec3::new(-1.0, 0.0, 4.6), Vec3::new(6.0, 2.2, 5.2));
        assert!(matches!(
            BoxCarver.subtract(wall_along_x(), cutter),
            Err(CsgError::NotContained { .. })
        ));
    }

    #[test]
    fn test_cutter_taller_than_panel_rejected() {
        let cutter = Aabb::new(Vec3::new(1.9, 0.0, 4.6), Vec3::new(3.1, 3.0, 5.2));
        assert_eq!(
            BoxCarver.subtract(wall_along_x(), cutter),
            Err(CsgError::UnsupportedOpening)
        );
    }

    #[test]
    fn test_shallow_cutter_rejected() {
        let cutter = Aabb::new(Vec3::new(1.9, 0.0, 4.85), Vec3::new(3.1, 2.2, 4.95));
        assert_eq!(
            BoxCarver.subtract(wall_along_x(), cutter),
            Err(CsgError::DoesNotPierce)
        );
    }

    #[test]
    fn test_empty_volume_rejected() {
        let cutter = Aabb::new(Vec3::new(1.9, 0.0, 4.6), Vec3::new(1.9, 2.2, 5.2));
        assert_eq!(
            BoxCarver.subtract(wall_along_x(), cutter),
            Err(CsgError::InvalidVolume)
        );
    }
}
