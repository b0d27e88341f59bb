// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Centreline curves and curve–curve intersection.
//!
//! The joint engine only needs a narrow slice of a curve kernel: evaluation,
//! tangents, arc length, closest point and a sampled representation that the
//! intersection scan walks segment by segment. [`LineCurve`] and [`Polyline`]
//! implement the trait exactly; other kernels can plug in their own curves.

use std::fmt::Debug;

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// Default number of spans used to sample curves that do not override
/// [`Curve::samples`].
pub const DEFAULT_SAMPLE_COUNT: usize = 64;

/// Parametric centreline curve.
pub trait Curve: Send + Sync + Debug {
    /// Parameter interval `(t0, t1)` with `t0 < t1`.
    fn domain(&self) -> (f64, f64);

    /// Point at parameter `t`.
    fn point_at(&self, t: f64) -> Point3<f64>;

    /// Unit tangent at parameter `t`.
    fn tangent_at(&self, t: f64) -> Vector3<f64>;

    /// Arc length between two parameters (order independent).
    fn length_between(&self, t0: f64, t1: f64) -> f64;

    /// Parameter of the curve point closest to `point`.
    fn closest_parameter(&self, point: &Point3<f64>) -> f64;

    /// Ordered `(parameter, point)` samples; consecutive samples are joined
    /// by straight spans for intersection.
    fn samples(&self) -> Vec<(f64, Point3<f64>)> {
        let (t0, t1) = self.domain();
        (0..=DEFAULT_SAMPLE_COUNT)
            .map(|i| {
                let t = t0 + (t1 - t0) * i as f64 / DEFAULT_SAMPLE_COUNT as f64;
                (t, self.point_at(t))
            })
            .collect()
    }

    fn length(&self) -> f64 {
        let (t0, t1) = self.domain();
        self.length_between(t0, t1)
    }

    fn mid_parameter(&self) -> f64 {
        let (t0, t1) = self.domain();
        0.5 * (t0 + t1)
    }

    fn start_point(&self) -> Point3<f64> {
        self.point_at(self.domain().0)
    }

    fn end_point(&self) -> Point3<f64> {
        self.point_at(self.domain().1)
    }
}

/// Straight centreline parameterised by arc length on `[0, length]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCurve {
    start: Point3<f64>,
    end: Point3<f64>,
    length: f64,
}

impl LineCurve {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        let length = (end - start).norm();
        if length < 1e-12 {
            return Err(Error::EmptyCurve("line has zero length".to_string()));
        }
        Ok(Self { start, end, length })
    }

    #[inline]
    fn unit(&self) -> Vector3<f64> {
        (self.end - self.start) / self.length
    }
}

impl Curve for LineCurve {
    fn domain(&self) -> (f64, f64) {
        (0.0, self.length)
    }

    fn point_at(&self, t: f64) -> Point3<f64> {
        self.start + self.unit() * t
    }

    fn tangent_at(&self, _t: f64) -> Vector3<f64> {
        self.unit()
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        (t1 - t0).abs()
    }

    fn closest_parameter(&self, point: &Point3<f64>) -> f64 {
        (point - self.start).dot(&self.unit()).clamp(0.0, self.length)
    }

    fn samples(&self) -> Vec<(f64, Point3<f64>)> {
        vec![(0.0, self.start), (self.length, self.end)]
    }
}

/// Polyline centreline; parameter `i + f` lies on segment `i` at fraction `f`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point3<f64>>,
}

impl Polyline {
    /// Build a polyline, dropping consecutive duplicate vertices.
    pub fn new(points: Vec<Point3<f64>>) -> Result<Self> {
        let mut cleaned: Vec<Point3<f64>> = Vec::with_capacity(points.len());
        for p in points {
            if cleaned.last().map_or(true, |last| (p - last).norm() > 1e-12) {
                cleaned.push(p);
            }
        }
        if cleaned.len() < 2 {
            return Err(Error::EmptyCurve(
                "polyline needs at least two distinct points".to_string(),
            ));
        }
        Ok(Self { points: cleaned })
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    #[inline]
    fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Segment index and fraction for a parameter, clamped to the domain.
    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.segment_count();
        let t = t.clamp(0.0, n as f64);
        let i = (t.floor() as usize).min(n - 1);
        (i, t - i as f64)
    }

    /// Arc length from the start to parameter `t`.
    fn arc_length_to(&self, t: f64) -> f64 {
        let (i, f) = self.locate(t);
        let full: f64 = self
            .points
            .windows(2)
            .take(i)
            .map(|w| (w[1] - w[0]).norm())
            .sum();
        full + (self.points[i + 1] - self.points[i]).norm() * f
    }
}

impl Curve for Polyline {
    fn domain(&self) -> (f64, f64) {
        (0.0, self.segment_count() as f64)
    }

    fn point_at(&self, t: f64) -> Point3<f64> {
        let (i, f) = self.locate(t);
        self.points[i] + (self.points[i + 1] - self.points[i]) * f
    }

    fn tangent_at(&self, t: f64) -> Vector3<f64> {
        let (i, _) = self.locate(t);
        (self.points[i + 1] - self.points[i]).normalize()
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        (self.arc_length_to(t1) - self.arc_length_to(t0)).abs()
    }

    fn closest_parameter(&self, point: &Point3<f64>) -> f64 {
        let mut best = (f64::MAX, 0.0);
        for (i, w) in self.points.windows(2).enumerate() {
            let d = w[1] - w[0];
            let f = ((point - w[0]).dot(&d) / d.norm_squared()).clamp(0.0, 1.0);
            let dist = (w[0] + d * f - point).norm_squared();
            if dist < best.0 {
                best = (dist, i as f64 + f);
            }
        }
        best.1
    }

    fn samples(&self) -> Vec<(f64, Point3<f64>)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, *p))
            .collect()
    }
}

/// Parameter spans of a region where two curves run together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub a: (f64, f64),
    pub b: (f64, f64),
}

/// One curve–curve intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveHit {
    pub parameter_a: f64,
    pub parameter_b: f64,
    pub point_a: Point3<f64>,
    pub point_b: Point3<f64>,
    /// Set when the curves run within tolerance over a span longer than the
    /// overlap tolerance; the hit parameters are then the span midpoints.
    pub overlap: Option<Overlap>,
}

impl CurveHit {
    /// Midpoint between the two hit points.
    pub fn position(&self) -> Point3<f64> {
        nalgebra::center(&self.point_a, &self.point_b)
    }
}

/// Intersect two curves with a search radius.
///
/// Every pair of sampled spans is tested; spans passing within `tolerance`
/// produce a hit. Parallel spans within `tolerance` that share more than
/// `overlap_tolerance` of length produce a single overlap hit. Hits closer
/// than `tolerance` on both curves are reported once.
pub fn intersect_curves(
    a: &dyn Curve,
    b: &dyn Curve,
    tolerance: f64,
    overlap_tolerance: f64,
) -> Vec<CurveHit> {
    let samples_a = a.samples();
    let samples_b = b.samples();
    let mut hits: Vec<CurveHit> = Vec::new();

    for span_a in samples_a.windows(2) {
        for span_b in samples_b.windows(2) {
            if let Some(hit) = intersect_spans(span_a, span_b, tolerance, overlap_tolerance) {
                let duplicate = hits.iter().any(|h| {
                    (h.point_a - hit.point_a).norm() < tolerance
                        && (h.point_b - hit.point_b).norm() < tolerance
                });
                if !duplicate {
                    hits.push(hit);
                }
            }
        }
    }

    hits
}

type Sample = (f64, Point3<f64>);

fn intersect_spans(
    span_a: &[Sample],
    span_b: &[Sample],
    tolerance: f64,
    overlap_tolerance: f64,
) -> Option<CurveHit> {
    let (ta0, p1) = span_a[0];
    let (ta1, q1) = span_a[1];
    let (tb0, p2) = span_b[0];
    let (tb1, q2) = span_b[1];

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    if a < 1e-24 || e < 1e-24 {
        return None;
    }

    let param_a = |s: f64| ta0 + (ta1 - ta0) * s;
    let param_b = |t: f64| tb0 + (tb1 - tb0) * t;

    let b = d1.dot(&d2);
    let denom = a * e - b * b;

    if denom <= 1e-12 * a * e {
        // Parallel spans: check line distance, then the shared extent
        let w = p2 - p1;
        let along = w.dot(&d1) / a;
        let offset = (w - d1 * along).norm();
        if offset > tolerance {
            return None;
        }

        let s0 = along;
        let s1 = (q2 - p1).dot(&d1) / a;
        let lo = s0.min(s1).max(0.0);
        let hi = s0.max(s1).min(1.0);
        let len_a = a.sqrt();

        if hi < lo && (lo - hi) * len_a > tolerance {
            return None;
        }

        let project_b = |s: f64| ((p1 + d1 * s - p2).dot(&d2) / e).clamp(0.0, 1.0);

        if hi > lo && (hi - lo) * len_a > overlap_tolerance {
            let (b_lo, b_hi) = {
                let u = project_b(lo);
                let v = project_b(hi);
                (u.min(v), u.max(v))
            };
            let s_mid = 0.5 * (lo + hi);
            let t_mid = 0.5 * (b_lo + b_hi);
            return Some(CurveHit {
                parameter_a: param_a(s_mid),
                parameter_b: param_b(t_mid),
                point_a: p1 + d1 * s_mid,
                point_b: p2 + d2 * t_mid,
                overlap: Some(Overlap {
                    a: (param_a(lo), param_a(hi)),
                    b: (param_b(b_lo), param_b(b_hi)),
                }),
            });
        }

        // Touching ends or a short shared run: report a single point hit
        let s_mid = (0.5 * (lo + hi)).clamp(0.0, 1.0);
        let t_mid = project_b(s_mid);
        return Some(CurveHit {
            parameter_a: param_a(s_mid),
            parameter_b: param_b(t_mid),
            point_a: p1 + d1 * s_mid,
            point_b: p2 + d2 * t_mid,
            overlap: None,
        });
    }

    let (s, t) = closest_span_parameters(&p1, &d1, &p2, &d2);
    let point_a = p1 + d1 * s;
    let point_b = p2 + d2 * t;
    if (point_a - point_b).norm() > tolerance {
        return None;
    }

    Some(CurveHit {
        parameter_a: param_a(s),
        parameter_b: param_b(t),
        point_a,
        point_b,
        overlap: None,
    })
}

/// Clamped closest-point parameters between two non-degenerate segments.
fn closest_span_parameters(
    p1: &Point3<f64>,
    d1: &Vector3<f64>,
    p2: &Point3<f64>,
    d2: &Vector3<f64>,
) -> (f64, f64) {
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);
    let c = d1.dot(&r);
    let b = d1.dot(d2);
    let denom = a * e - b * b;

    let mut s = if denom > 0.0 {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;

    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }

    (s, t)
}
