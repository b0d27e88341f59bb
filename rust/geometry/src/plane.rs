// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Oriented planes and the plane arithmetic every joint is built from.
//!
//! A [`Plane`] carries a full right-handed frame (origin, x, y and normal), so
//! the same type doubles as the cross-section [`Frame`] of a beam: the frame's
//! normal is the centreline tangent, x is the width direction and y the
//! height direction.

use nalgebra::{Point3, Rotation3, Unit, Vector3};

use crate::error::{Error, Result};

/// Smallest |n_a · (n_b × n_c)| accepted for a three-plane intersection.
pub const DETERMINANT_TOLERANCE: f64 = 1e-6;

/// Smallest |direction · normal| accepted for a line-plane intersection.
pub const PARALLEL_TOLERANCE: f64 = 1e-9;

/// Oriented plane with a right-handed in-plane basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Point3<f64>,
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
    pub normal: Vector3<f64>,
}

/// Cross-section frame attached to a point on a centreline.
pub type Frame = Plane;

impl Plane {
    /// Create a plane from an origin and two in-plane directions.
    ///
    /// The basis is re-orthonormalised: x is kept, the normal is `x × y` and
    /// y is rebuilt as `normal × x`.
    pub fn new(origin: Point3<f64>, x_axis: Vector3<f64>, y_axis: Vector3<f64>) -> Self {
        let x_axis = x_axis.normalize();
        let normal = x_axis.cross(&y_axis).normalize();
        let y_axis = normal.cross(&x_axis);
        Self {
            origin,
            x_axis,
            y_axis,
            normal,
        }
    }

    /// Create a plane from a point and normal, picking a stable x axis.
    pub fn from_normal(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        let normal = normal.normalize();

        // Reference axis least parallel to the normal for a stable cross product
        let abs_x = normal.x.abs();
        let abs_y = normal.y.abs();
        let abs_z = normal.z.abs();
        let reference = if abs_x <= abs_y && abs_x <= abs_z {
            Vector3::x()
        } else if abs_y <= abs_z {
            Vector3::y()
        } else {
            Vector3::z()
        };

        let x_axis = reference.cross(&normal).normalize();
        let y_axis = normal.cross(&x_axis);
        Self {
            origin,
            x_axis,
            y_axis,
            normal,
        }
    }

    /// The world XY plane.
    pub fn world_xy() -> Self {
        Self {
            origin: Point3::origin(),
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            normal: Vector3::z(),
        }
    }

    /// Signed distance from a point to the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Check if a point lies on the normal side of the plane.
    #[inline]
    pub fn is_front(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) >= 0.0
    }

    /// Orthogonal projection of a point onto the plane.
    #[inline]
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Point at plane coordinates `(u, v)`.
    #[inline]
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + self.x_axis * u + self.y_axis * v
    }

    /// Copy moved along its own normal.
    #[inline]
    pub fn offset(&self, distance: f64) -> Self {
        self.translated(&(self.normal * distance))
    }

    /// Copy moved by a vector.
    #[inline]
    pub fn translated(&self, delta: &Vector3<f64>) -> Self {
        Self {
            origin: self.origin + *delta,
            ..*self
        }
    }

    /// Copy of the plane placed at `origin`.
    #[inline]
    pub fn with_origin(&self, origin: Point3<f64>) -> Self {
        Self { origin, ..*self }
    }

    /// Reverse the normal, keeping the basis right-handed (x and y swap).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: self.y_axis,
            y_axis: self.x_axis,
            normal: -self.normal,
        }
    }

    /// Rotate the whole frame by `angle` radians about an axis through `center`.
    pub fn rotated(&self, angle: f64, axis: &Vector3<f64>, center: &Point3<f64>) -> Self {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle);
        let origin = *center + rotation * (self.origin - *center);
        Self {
            origin,
            x_axis: rotation * self.x_axis,
            y_axis: rotation * self.y_axis,
            normal: rotation * self.normal,
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::world_xy()
    }
}

/// Line segment; intersection routines treat it as an infinite line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Line {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Line through `origin` along `direction` (end = origin + direction).
    pub fn from_direction(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            start: origin,
            end: origin + direction,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Point at normalized parameter `t` (0 = start, 1 = end).
    #[inline]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.start + self.direction() * t
    }
}

/// Intersect three planes in a single point.
///
/// Fails when the planes are (nearly) parallel or share a common line, i.e.
/// when the normals' triple product falls below [`DETERMINANT_TOLERANCE`].
pub fn intersect_three_planes(a: &Plane, b: &Plane, c: &Plane) -> Result<Point3<f64>> {
    let n1 = a.normal;
    let n2 = b.normal;
    let n3 = c.normal;

    let n23 = n2.cross(&n3);
    let det = n1.dot(&n23);
    if det.abs() < DETERMINANT_TOLERANCE {
        return Err(Error::degenerate(format!(
            "three-plane intersection is ill-conditioned (det = {:.3e})",
            det
        )));
    }

    let d1 = n1.dot(&a.origin.coords);
    let d2 = n2.dot(&b.origin.coords);
    let d3 = n3.dot(&c.origin.coords);

    let p = (n23 * d1 + n3.cross(&n1) * d2 + n1.cross(&n2) * d3) / det;
    Ok(Point3::from(p))
}

/// Intersect two planes in a line of unit length.
pub fn intersect_plane_plane(a: &Plane, b: &Plane) -> Result<Line> {
    let direction = a.normal.cross(&b.normal);
    let len = direction.norm();
    if len < DETERMINANT_TOLERANCE {
        return Err(Error::degenerate("planes are parallel"));
    }
    let direction = direction / len;
    let through = Plane::from_normal(a.origin, direction);
    let point = intersect_three_planes(a, b, &through)?;
    Ok(Line::from_direction(point, direction))
}

/// Intersect an infinite line with a plane.
///
/// Returns the line parameter (in units of the line's direction vector) and
/// the intersection point.
pub fn intersect_line_plane(line: &Line, plane: &Plane) -> Result<(f64, Point3<f64>)> {
    let direction = line.direction();
    let denom = direction.dot(&plane.normal);
    if denom.abs() < PARALLEL_TOLERANCE * direction.norm().max(1.0) {
        return Err(Error::degenerate("line is parallel to plane"));
    }
    let t = (plane.origin - line.start).dot(&plane.normal) / denom;
    Ok((t, line.point_at(t)))
}

/// Parameters of the closest points between two infinite lines
/// `p0 + s * d0` and `p1 + t * d1`, or `None` when they are parallel.
pub fn closest_points_between_lines(
    p0: &Point3<f64>,
    d0: &Vector3<f64>,
    p1: &Point3<f64>,
    d1: &Vector3<f64>,
) -> Option<(f64, f64)> {
    let a = d0.dot(d0);
    let b = d0.dot(d1);
    let c = d1.dot(d1);
    let w = *p0 - *p1;
    let d = d0.dot(&w);
    let e = d1.dot(&w);

    let denom = a * c - b * b;
    if denom <= 1e-12 * a * c || a == 0.0 || c == 0.0 {
        return None;
    }

    let s = (b * e - c * d) / denom;
    let t = (a * e - b * d) / denom;
    Some((s, t))
}

/// Linear interpolation between two points.
#[inline]
pub fn interpolate(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    *a + (*b - *a) * t
}
