// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Corner filleting for closed planar outlines

use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Replace every corner of a closed outline with a circular arc.
///
/// Each corner gets a tangent distance `radius / tan(θ/2)`, where θ is the
/// interior angle. Distances on a shared segment are scaled down until they
/// fit, so neighbouring arcs never overlap. Corners that are straight or
/// cannot be filleted are kept as-is. Each arc contributes `segments + 1`
/// points.
pub fn fillet_polygon(points: &[Point3<f64>], radius: f64, segments: usize) -> Vec<Point3<f64>> {
    let n = points.len();
    if n < 3 || radius <= 0.0 {
        return points.to_vec();
    }
    let segments = segments.max(1);

    // Per-corner tangent distance, clamped to the adjacent segments
    let mut tangent = vec![0.0f64; n];
    let mut corners: Vec<Option<(Vector3<f64>, Vector3<f64>, f64)>> = vec![None; n];

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let corner = points[i];
        let next = points[(i + 1) % n];

        let to_prev = prev - corner;
        let to_next = next - corner;
        let (in_len, out_len) = (to_prev.norm(), to_next.norm());
        if in_len < 1e-12 || out_len < 1e-12 {
            continue;
        }
        let to_prev = to_prev / in_len;
        let to_next = to_next / out_len;

        let theta = to_prev.dot(&to_next).clamp(-1.0, 1.0).acos();
        if theta <= 1e-8 || std::f64::consts::PI - theta <= 1e-8 {
            continue;
        }

        let half = 0.5 * theta;
        let t = (radius / half.tan()).min(in_len * 0.999).min(out_len * 0.999);
        if t <= 1e-12 {
            continue;
        }
        tangent[i] = t;
        corners[i] = Some((to_prev, to_next, half));
    }

    // Resolve overlaps on shared segments
    for _ in 0..(4 * n).max(8) {
        let mut changed = false;
        for i in 0..n {
            let j = (i + 1) % n;
            let seg_len = (points[j] - points[i]).norm();
            let sum = tangent[i] + tangent[j];
            if sum > seg_len * 0.999 && sum > 0.0 {
                let scale = seg_len * 0.999 / sum;
                tangent[i] *= scale;
                tangent[j] *= scale;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut out = Vec::with_capacity(n * (segments + 1));
    for i in 0..n {
        let corner = points[i];
        let Some((to_prev, to_next, half)) = corners[i] else {
            out.push(corner);
            continue;
        };

        let t = tangent[i];
        let start = corner + to_prev * t;
        let end = corner + to_next * t;
        let effective_radius = t * half.tan();
        let bisector = (to_prev + to_next).normalize();
        let centre = corner + bisector * (effective_radius / half.sin());

        let axis = Unit::new_normalize((start - centre).cross(&(end - centre)));
        let sweep = std::f64::consts::PI - 2.0 * half;
        for k in 0..=segments {
            let rotation = Rotation3::from_axis_angle(&axis, sweep * k as f64 / segments as f64);
            out.push(centre + rotation * (start - centre));
        }
    }

    out
}
