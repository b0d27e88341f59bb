// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle meshes for the visualization channel

use nalgebra::{Point3, Vector3};

/// Flat-shaded triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions
            .extend_from_slice(&[position.x as f32, position.y as f32, position.z as f32]);
        self.normals
            .extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Append another mesh, offsetting its indices
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Merge a batch of meshes, reserving once up front
    pub fn merge_all<'a>(&mut self, meshes: impl IntoIterator<Item = &'a Mesh>) {
        let meshes: Vec<&Mesh> = meshes.into_iter().collect();
        let positions: usize = meshes.iter().map(|m| m.positions.len()).sum();
        let indices: usize = meshes.iter().map(|m| m.indices.len()).sum();
        self.positions.reserve(positions);
        self.normals.reserve(positions);
        self.indices.reserve(indices);

        for mesh in meshes {
            self.merge(mesh);
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned bounds (min, max); the origin twice for an empty mesh
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
        for chunk in self.positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(chunk[axis]);
                max[axis] = max[axis].max(chunk[axis]);
            }
        }

        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: f64) -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(offset, 0.0, 0.0), Vector3::z());
        let b = mesh.add_vertex(Point3::new(offset + 1.0, 0.0, 0.0), Vector3::z());
        let c = mesh.add_vertex(Point3::new(offset, 1.0, 0.0), Vector3::z());
        mesh.add_triangle(a, b, c);
        mesh
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.bounds(), (Point3::origin(), Point3::origin()));
    }

    #[test]
    fn merge_offsets_indices() {
        let mut mesh = triangle(0.0);
        mesh.merge(&triangle(5.0));

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(&mesh.indices[3..], &[3, 4, 5]);
    }

    #[test]
    fn merge_all_and_bounds() {
        let parts = [triangle(0.0), triangle(10.0), Mesh::new()];
        let mut mesh = Mesh::new();
        mesh.merge_all(&parts);

        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(11.0, 1.0, 0.0));
    }
}
