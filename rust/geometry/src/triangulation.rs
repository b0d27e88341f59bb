// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for planar face loops. Faces are projected into
//! their own plane basis, triangulated in 2D and the triangles are rewound
//! so they follow the face normal.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};
use crate::plane::Plane;

/// Check if a polygon is convex (all cross products have same sign)
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current = if cross > 0.0 { 1 } else { -1 };
            if sign == 0 {
                sign = current;
            } else if sign != current {
                return false;
            }
        }
    }

    true
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // Convex outlines (box faces, dowel caps) fan out from the first corner
    if is_convex(points) {
        return Ok((1..n - 1).flat_map(|i| [0, i, i + 1]).collect());
    }

    let vertices: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer + all holes)
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    if holes.iter().all(|h| h.len() < 3) {
        return triangulate_polygon(outer);
    }

    let mut vertices: Vec<f64> = outer.iter().flat_map(|p| [p.x, p.y]).collect();
    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        if hole.len() < 3 {
            return Err(Error::TriangulationError(
                "Need at least 3 points in a hole".to_string(),
            ));
        }
        hole_indices.push(vertices.len() / 2);
        vertices.extend(hole.iter().flat_map(|p| [p.x, p.y]));
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Unnormalised Newell vector of a loop; its length is twice the loop area.
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Unit normal of a loop following its winding; world Z for degenerate loops.
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let normal = newell_vector(points);
    let len = normal.norm();
    if len > 1e-10 {
        normal / len
    } else {
        Vector3::z()
    }
}

/// Project points into a plane's (x, y) coordinates
pub fn project_to_plane(points: &[Point3<f64>], plane: &Plane) -> Vec<Point2<f64>> {
    points
        .iter()
        .map(|p| {
            let v = p - plane.origin;
            Point2::new(v.dot(&plane.x_axis), v.dot(&plane.y_axis))
        })
        .collect()
}

/// Triangulate a planar 3D face given by an outer loop and hole loops.
///
/// Returns indices into the concatenation of `outer` and every hole, wound
/// counter-clockwise about the outer loop's normal.
pub fn triangulate_face(outer: &[Point3<f64>], holes: &[Vec<Point3<f64>>]) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    let plane = Plane::from_normal(outer[0], polygon_normal(outer));
    let outer_2d = project_to_plane(outer, &plane);
    let holes_2d: Vec<Vec<Point2<f64>>> = holes.iter().map(|h| project_to_plane(h, &plane)).collect();

    let mut indices = triangulate_polygon_with_holes(&outer_2d, &holes_2d)?;

    let all: Vec<&Point2<f64>> = outer_2d.iter().chain(holes_2d.iter().flatten()).collect();
    for tri in indices.chunks_exact_mut(3) {
        let (a, b, c) = (all[tri[0]], all[tri[1]], all[tri[2]]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        if cross < 0.0 {
            tri.swap(1, 2);
        }
    }

    Ok(indices)
}
