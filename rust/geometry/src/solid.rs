// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed polyhedral solids
//!
//! Cutting solids are stitched from planar faces. Stitching welds corners
//! that coincide within a tolerance, drops repeated corners, rejects
//! degenerate faces and refuses shells that still have naked edges. A solid
//! that exists is therefore always closed and outward oriented.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::plane::Plane;
use crate::triangulation::{newell_vector, polygon_normal, triangulate_face};

/// Default welding tolerance for stitched corners (model units).
pub const WELD_TOLERANCE: f64 = 1e-6;

/// Planar face given as an outer loop plus optional hole loops.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub outer: Vec<Point3<f64>>,
    pub holes: Vec<Vec<Point3<f64>>>,
}

impl Face {
    pub fn new(outer: Vec<Point3<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Vec<Point3<f64>>, holes: Vec<Vec<Point3<f64>>>) -> Self {
        Self { outer, holes }
    }

    /// Same face with the opposite orientation.
    pub fn reversed(mut self) -> Self {
        self.outer.reverse();
        for hole in &mut self.holes {
            hole.reverse();
        }
        self
    }

    pub fn normal(&self) -> Vector3<f64> {
        polygon_normal(&self.outer)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct IndexedFace {
    outer: Vec<usize>,
    holes: Vec<Vec<usize>>,
}

impl IndexedFace {
    fn loops(&self) -> impl Iterator<Item = &Vec<usize>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    fn reverse(&mut self) {
        self.outer.reverse();
        for hole in &mut self.holes {
            hole.reverse();
        }
    }
}

/// Closed, outward-oriented polyhedral solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    vertices: Vec<Point3<f64>>,
    faces: Vec<IndexedFace>,
}

impl Solid {
    /// Stitch faces into a closed solid.
    ///
    /// Faces must share a consistent winding; the whole shell is flipped if
    /// it turns out to face inwards. Hole loops are rewound against their
    /// outer loop.
    pub fn from_faces(faces: Vec<Face>, tolerance: f64) -> Result<Self> {
        let mut vertices: Vec<Point3<f64>> = Vec::new();
        let mut indexed = Vec::with_capacity(faces.len());

        for (face_index, face) in faces.iter().enumerate() {
            let outer = weld_loop(&face.outer, &mut vertices, tolerance);
            if outer.len() < 3 {
                return Err(Error::DegenerateFace(format!(
                    "face {} has {} distinct corners",
                    face_index,
                    outer.len()
                )));
            }

            let outer_area = newell_vector(&resolve(&vertices, &outer));
            if outer_area.norm() * 0.5 < tolerance * tolerance {
                return Err(Error::DegenerateFace(format!("face {} has no area", face_index)));
            }

            let mut holes = Vec::with_capacity(face.holes.len());
            for hole in &face.holes {
                let mut welded = weld_loop(hole, &mut vertices, tolerance);
                if welded.len() < 3 {
                    return Err(Error::DegenerateFace(format!(
                        "hole in face {} has {} distinct corners",
                        face_index,
                        welded.len()
                    )));
                }
                if newell_vector(&resolve(&vertices, &welded)).dot(&outer_area) > 0.0 {
                    welded.reverse();
                }
                holes.push(welded);
            }

            indexed.push(IndexedFace { outer, holes });
        }

        let mut solid = Self {
            vertices,
            faces: indexed,
        };

        let naked = solid.naked_edge_count();
        if naked > 0 {
            return Err(Error::OpenShell(naked));
        }

        let volume = solid.signed_volume();
        if volume.abs() < tolerance * tolerance * tolerance {
            return Err(Error::degenerate("closed shell encloses no volume"));
        }
        if volume < 0.0 {
            for face in &mut solid.faces {
                face.reverse();
            }
        }

        Ok(solid)
    }

    /// Six-sided solid from a bottom and a top quadrilateral; `top[i]` sits
    /// over `bottom[i]`.
    pub fn hexahedron(bottom: [Point3<f64>; 4], top: [Point3<f64>; 4]) -> Result<Self> {
        Self::loft(&bottom, &top)
    }

    /// Ruled prism between two loops with matching corner counts.
    ///
    /// Side quads that are not planar are split into two triangles.
    pub fn loft(bottom: &[Point3<f64>], top: &[Point3<f64>]) -> Result<Self> {
        let n = bottom.len();
        if n < 3 || n != top.len() {
            return Err(Error::DegenerateFace(format!(
                "cannot loft loops of {} and {} corners",
                n,
                top.len()
            )));
        }

        let mut faces = Vec::with_capacity(n + 2);
        faces.push(Face::new(bottom.iter().rev().copied().collect()));
        faces.push(Face::new(top.to_vec()));

        for i in 0..n {
            let j = (i + 1) % n;
            let quad = [bottom[i], bottom[j], top[j], top[i]];
            if is_planar(&quad, WELD_TOLERANCE.max(1e-9 * span(&quad))) {
                faces.push(Face::new(quad.to_vec()));
            } else {
                faces.push(Face::new(vec![quad[0], quad[1], quad[2]]));
                faces.push(Face::new(vec![quad[0], quad[2], quad[3]]));
            }
        }

        Self::from_faces(faces, WELD_TOLERANCE)
    }

    /// Box spanning `[x0, x1] × [y0, y1] × [z0, z1]` in a plane's coordinates.
    pub fn oriented_box(plane: &Plane, x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Result<Self> {
        let corner = |u: f64, v: f64, w: f64| plane.point_at(u, v) + plane.normal * w;
        let ring = |w: f64| {
            [
                corner(x.0, y.0, w),
                corner(x.1, y.0, w),
                corner(x.1, y.1, w),
                corner(x.0, y.1, w),
            ]
        };
        Self::hexahedron(ring(z.0), ring(z.1))
    }

    /// Polygonal cylinder standing on `base` along its normal.
    pub fn cylinder(base: &Plane, radius: f64, height: f64, segments: usize) -> Result<Self> {
        if radius <= 0.0 || height.abs() <= 0.0 {
            return Err(Error::degenerate(format!(
                "cylinder needs positive radius and height (r={}, h={})",
                radius, height
            )));
        }

        let segments = segments.max(3);
        let bottom: Vec<Point3<f64>> = (0..segments)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / segments as f64;
                base.point_at(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        let top: Vec<Point3<f64>> = bottom.iter().map(|p| p + base.normal * height).collect();

        Self::loft(&bottom, &top)
    }

    /// Number of edges used by exactly one face loop.
    pub fn naked_edge_count(&self) -> usize {
        let mut uses: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for face in &self.faces {
            for lp in face.loops() {
                for i in 0..lp.len() {
                    let a = lp[i];
                    let b = lp[(i + 1) % lp.len()];
                    *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
                }
            }
        }
        uses.values().filter(|&&count| count == 1).count()
    }

    pub fn is_closed(&self) -> bool {
        self.naked_edge_count() == 0
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|face| {
                let area: Vector3<f64> = face
                    .loops()
                    .map(|lp| newell_vector(&resolve(&self.vertices, lp)))
                    .sum();
                self.vertices[face.outer[0]].coords.dot(&area) / 6.0
            })
            .sum()
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Faces with resolved corner positions, outward oriented.
    pub fn faces(&self) -> Vec<Face> {
        self.faces
            .iter()
            .map(|f| Face {
                outer: resolve(&self.vertices, &f.outer),
                holes: f.holes.iter().map(|h| resolve(&self.vertices, h)).collect(),
            })
            .collect()
    }

    pub fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        (min, max)
    }

    /// Flat-shaded triangle mesh of the boundary.
    pub fn to_mesh(&self) -> Result<Mesh> {
        let mut mesh = Mesh::new();
        for face in self.faces() {
            let normal = face.normal();
            let indices = triangulate_face(&face.outer, &face.holes)?;
            let base = mesh.vertex_count() as u32;
            for p in face.outer.iter().chain(face.holes.iter().flatten()) {
                mesh.add_vertex(*p, normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);
            }
        }
        Ok(mesh)
    }
}

/// Map a loop onto welded vertex indices, dropping repeated corners.
fn weld_loop(points: &[Point3<f64>], vertices: &mut Vec<Point3<f64>>, tolerance: f64) -> Vec<usize> {
    let mut indices: Vec<usize> = Vec::with_capacity(points.len());
    for p in points {
        let index = match vertices.iter().position(|v| (v - p).norm() <= tolerance) {
            Some(existing) => existing,
            None => {
                vertices.push(*p);
                vertices.len() - 1
            }
        };
        if indices.last() != Some(&index) {
            indices.push(index);
        }
    }
    while indices.len() > 1 && indices.first() == indices.last() {
        indices.pop();
    }
    indices
}

fn resolve(vertices: &[Point3<f64>], indices: &[usize]) -> Vec<Point3<f64>> {
    indices.iter().map(|&i| vertices[i]).collect()
}

fn span(points: &[Point3<f64>]) -> f64 {
    points
        .iter()
        .flat_map(|a| points.iter().map(move |b| (a - b).norm()))
        .fold(0.0, f64::max)
}

fn is_planar(quad: &[Point3<f64>; 4], tolerance: f64) -> bool {
    let n = (quad[1] - quad[0]).cross(&(quad[2] - quad[0]));
    let len = n.norm();
    if len < 1e-12 {
        return false;
    }
    ((quad[3] - quad[0]).dot(&n) / len).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Solid {
        Solid::oriented_box(&Plane::world_xy(), (0.0, 2.0), (0.0, 3.0), (0.0, 4.0)).unwrap()
    }

    #[test]
    fn box_is_closed_with_expected_volume() {
        let solid = unit_box();
        assert!(solid.is_closed());
        assert_eq!(solid.vertices().len(), 8);
        assert_eq!(solid.face_count(), 6);
        assert_relative_eq!(solid.volume(), 24.0, epsilon = 1e-9);

        let (min, max) = solid.bounding_box();
        assert_relative_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(max, Point3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn faces_point_outwards() {
        let solid = unit_box();
        let centre = Point3::new(1.0, 1.5, 2.0);
        for face in solid.faces() {
            assert!(face.normal().dot(&(face.outer[0] - centre)) > 0.0);
        }
    }

    #[test]
    fn inward_winding_is_flipped() {
        let bottom = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let top = bottom.map(|p| p + Vector3::z());
        let solid = Solid::hexahedron(bottom, top).unwrap();
        assert_relative_eq!(solid.volume(), 1.0, epsilon = 1e-9);
        for face in solid.faces() {
            assert!(face.normal().dot(&(face.outer[0] - Point3::new(0.5, 0.5, 0.5))) > 0.0);
        }
    }

    #[test]
    fn missing_face_is_open_shell() {
        let mut faces = unit_box().faces();
        faces.pop();
        assert_eq!(Solid::from_faces(faces, WELD_TOLERANCE), Err(Error::OpenShell(4)));
    }

    #[test]
    fn near_coincident_corners_are_welded() {
        let mut faces = unit_box().faces();
        faces[0].outer[0] += Vector3::new(1e-8, 0.0, 0.0);
        let solid = Solid::from_faces(faces, 1e-6).unwrap();
        assert_eq!(solid.vertices().len(), 8);
    }

    #[test]
    fn sliver_face_is_degenerate() {
        let faces = vec![Face::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ])];
        assert!(matches!(
            Solid::from_faces(faces, WELD_TOLERANCE),
            Err(Error::DegenerateFace(_))
        ));
    }

    #[test]
    fn cylinder_volume_approaches_circle() {
        let solid = Solid::cylinder(&Plane::world_xy(), 10.0, 5.0, 64).unwrap();
        assert!(solid.is_closed());
        let exact = std::f64::consts::PI * 100.0 * 5.0;
        assert!((solid.volume() - exact).abs() / exact < 0.01);
    }

    #[test]
    fn twisted_loft_stays_closed() {
        let bottom = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let top = [
            Point3::new(1.0, 0.0, 4.0),
            Point3::new(4.0, 1.0, 4.0),
            Point3::new(3.0, 4.0, 4.0),
            Point3::new(0.0, 3.0, 4.0),
        ];
        let solid = Solid::loft(&bottom, &top).unwrap();
        assert!(solid.is_closed());
        assert!(solid.face_count() > 6);
    }

    #[test]
    fn face_with_hole_subtracts_volume() {
        // 10×10×10 block with a 2×2×5 square pocket opening in the top face
        let outer_top = vec![
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(10.0, 10.0, 10.0),
            Point3::new(0.0, 10.0, 10.0),
        ];
        let pocket = |z: f64| {
            vec![
                Point3::new(4.0, 4.0, z),
                Point3::new(6.0, 4.0, z),
                Point3::new(6.0, 6.0, z),
                Point3::new(4.0, 6.0, z),
            ]
        };

        let mut faces: Vec<Face> = unit_box_sized(10.0)
            .faces()
            .into_iter()
            .filter(|f| f.normal().z < 0.5)
            .collect();
        faces.push(Face::with_holes(outer_top, vec![pocket(10.0)]));

        // Pocket walls face into the cavity
        let rim = pocket(10.0);
        let floor = pocket(5.0);
        for i in 0..4 {
            let j = (i + 1) % 4;
            faces.push(Face::new(vec![rim[i], rim[j], floor[j], floor[i]]));
        }
        faces.push(Face::new(floor));

        let solid = Solid::from_faces(faces, WELD_TOLERANCE).unwrap();
        assert_relative_eq!(solid.volume(), 1000.0 - 20.0, epsilon = 1e-9);

        let mesh = solid.to_mesh().unwrap();
        assert!(mesh.triangle_count() >= 5 * 2 + 8 + 4 * 2 + 2);
    }

    fn unit_box_sized(size: f64) -> Solid {
        Solid::oriented_box(&Plane::world_xy(), (0.0, size), (0.0, size), (0.0, size)).unwrap()
    }

    #[test]
    fn mesh_normals_match_faces() {
        let mesh = unit_box().to_mesh().unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 24);
    }
}
