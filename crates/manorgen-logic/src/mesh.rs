//! Engine-agnostic triangle meshes.
//!
//! `MeshData` is what the geometry compiler hands to a rendering backend:
//! flat-shaded triangle lists with per-vertex normals. Positions are in the
//! owning room's local space.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 3D vector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a flat triangle. Winding is counter-clockwise seen from the
    /// side the face normal points to.
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let normal = (b - a).cross(c - a).normalize();
        let base = self.positions.len() as u32;
        for p in [a, b, c] {
            self.positions.push(p);
            self.normals.push(normal);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Append a flat quad `a b c d` (counter-clockwise) as two triangles
    /// sharing four vertices.
    pub fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let normal = (b - a).cross(c - a).normalize();
        let base = self.positions.len() as u32;
        for p in [a, b, c, d] {
            self.positions.push(p);
            self.normals.push(normal);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Duplicate this mesh, lift it by `dy` and flip it: winding and
    /// normals are reversed so the copy faces the opposite way.
    pub fn flipped_copy(&self, dy: f32) -> MeshData {
        let positions = self
            .positions
            .iter()
            .map(|p| Vec3::new(p.x, p.y + dy, p.z))
            .collect();
        let normals = self.normals.iter().map(|n| -*n).collect();
        let indices = self
            .indices
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[2], t[1]])
            .collect();
        MeshData {
            positions,
            normals,
            indices,
        }
    }

    /// Sum of triangle areas.
    pub fn surface_area(&self) -> f32 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let a = self.positions[t[0] as usize];
                let b = self.positions[t[1] as usize];
                let c = self.positions[t[2] as usize];
                (b - a).cross(c - a).length() * 0.5
            })
            .sum()
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        let mut lo = first;
        let mut hi = first;
        for p in &self.positions {
            lo = Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z));
            hi = Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z));
        }
        Some((lo, hi))
    }

    /// True when any triangle has (near-)zero area.
    pub fn has_degenerate_triangles(&self) -> bool {
        self.indices.chunks_exact(3).any(|t| {
            let a = self.positions[t[0] as usize];
            let b = self.positions[t[1] as usize];
            let c = self.positions[t[2] as usize];
            (b - a).cross(c - a).length() <= 1e-9
        })
    }

    /// Closed-manifold check.
    ///
    /// Vertices are welded by position, then every directed edge must be
    /// matched exactly once by its reverse. Flat shading duplicates
    /// vertices per face, so index identity alone says nothing.
    pub fn is_closed(&self) -> bool {
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return false;
        }
        let mut weld: HashMap<[i64; 3], u32> = HashMap::new();
        let mut welded = Vec::with_capacity(self.positions.len());
        for p in &self.positions {
            let next = weld.len() as u32;
            let id = *weld.entry(quantize(*p)).or_insert(next);
            welded.push(id);
        }

        let mut edges: HashMap<(u32, u32), i32> = HashMap::new();
        for t in self.indices.chunks_exact(3) {
            let v = [
                welded[t[0] as usize],
                welded[t[1] as usize],
                welded[t[2] as usize],
            ];
            for i in 0..3 {
                let a = v[i];
                let b = v[(i + 1) % 3];
                if a == b {
                    return false;
                }
                *edges.entry((a, b)).or_insert(0) += 1;
            }
        }

        edges
            .iter()
            .all(|(&(a, b), &count)| count == 1 && edges.get(&(b, a)) == Some(&1))
    }
}

fn quantize(p: Vec3) -> [i64; 3] {
    const SCALE: f32 = 10_000.0;
    [
        (p.x * SCALE).round() as i64,
        (p.y * SCALE).round() as i64,
        (p.z * SCALE).round() as i64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> MeshData {
        let mut m = MeshData::new();
        m.push_quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        m
    }

    #[test]
    fn test_quad_normal_points_up() {
        let m = unit_quad();
        assert_eq!(m.triangle_count(), 2);
        for n in &m.normals {
            assert!((n.y - 1.0).abs() < 1e-6, "normal {:?}", n);
        }
    }

    #[test]
    fn test_flipped_copy_reverses_normals_and_lifts() {
        let floor = unit_quad();
        let ceiling = floor.flipped_copy(3.0);
        assert_eq!(ceiling.triangle_count(), floor.triangle_count());
        for (p, n) in ceiling.positions.iter().zip(&ceiling.normals) {
            assert_eq!(p.y, 3.0);
            assert!((n.y + 1.0).abs() < 1e-6);
        }
        // Winding follows the normal: recomputed face normal points down.
        let t = &ceiling.indices[0..3];
        let a = ceiling.positions[t[0] as usize];
        let b = ceiling.positions[t[1] as usize];
        let c = ceiling.positions[t[2] as usize];
        assert!((b - a).cross(c - a).y < 0.0);
    }

    #[test]
    fn test_open_quad_is_not_closed() {
        assert!(!unit_quad().is_closed());
        assert!(!MeshData::new().is_closed());
    }

    #[test]
    fn test_tetrahedron_is_closed() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        let d = Vec3::new(0.0, 0.0, 1.0);
        let mut m = MeshData::new();
        m.push_triangle(a, c, b);
        m.push_triangle(a, b, d);
        m.push_triangle(a, d, c);
        m.push_triangle(b, c, d);
        assert!(m.is_closed());
        assert!(!m.has_degenerate_triangles());
    }

    #[test]
    fn test_collinear_triangle_is_degenerate() {
        let mut m = unit_quad();
        assert!(!m.has_degenerate_triangles());
        m.push_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert!(m.has_degenerate_triangles());
    }

    #[test]
    fn test_bounds_and_area() {
        let m = unit_quad();
        let (lo, hi) = m.bounds().unwrap();
        assert_eq!(lo, Vec3::ZERO);
        assert_eq!(hi, Vec3::new(1.0, 0.0, 1.0));
        assert!((m.surface_area() - 1.0).abs() < 1e-6);
    }
}
