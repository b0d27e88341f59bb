// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Beams: a centreline plus an oriented rectangular cross-section.

use std::sync::Arc;

use joinery_geometry::{Curve, Frame, LineCurve, Point3, Vector3};

use crate::error::Result;

/// Structural beam read by the joint engine.
///
/// The cross-section frame at a parameter has its normal along the
/// centreline tangent, x along the projected `orientation` (the width
/// direction) and y completing a right-handed frame (the height direction).
#[derive(Debug, Clone)]
pub struct Beam {
    pub centreline: Arc<dyn Curve>,
    pub orientation: Vector3<f64>,
    pub width: f64,
    pub height: f64,
}

impl Beam {
    pub fn new(centreline: Arc<dyn Curve>, orientation: Vector3<f64>, width: f64, height: f64) -> Self {
        Self {
            centreline,
            orientation,
            width,
            height,
        }
    }

    /// Straight beam between two points.
    pub fn straight(
        start: Point3<f64>,
        end: Point3<f64>,
        orientation: Vector3<f64>,
        width: f64,
        height: f64,
    ) -> Result<Self> {
        let line = LineCurve::new(start, end)?;
        Ok(Self::new(Arc::new(line), orientation, width, height))
    }

    /// Cross-section frame at a centreline parameter.
    pub fn frame_at(&self, t: f64) -> Frame {
        let origin = self.centreline.point_at(t);
        let z = self.centreline.tangent_at(t);

        let x = [self.orientation, Vector3::z(), Vector3::x()]
            .iter()
            .map(|candidate| candidate - z * candidate.dot(&z))
            .find(|projected| projected.norm() > 1e-9)
            .unwrap_or_else(Vector3::y)
            .normalize();
        let y = z.cross(&x);

        Frame {
            origin,
            x_axis: x,
            y_axis: y,
            normal: z,
        }
    }

    /// Section dimension measured along a frame axis: width for x, height for y.
    pub fn dimension(&self, along_width: bool) -> f64 {
        if along_width {
            self.width
        } else {
            self.height
        }
    }

    /// Largest section dimension.
    pub fn max_dimension(&self) -> f64 {
        self.width.max(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_follows_orientation() {
        let beam = Beam::straight(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1000.0, 0.0, 0.0),
            Vector3::y(),
            100.0,
            200.0,
        )
        .unwrap();

        let frame = beam.frame_at(250.0);
        assert_relative_eq!(frame.origin, Point3::new(250.0, 0.0, 0.0));
        assert_relative_eq!(frame.normal, Vector3::x());
        assert_relative_eq!(frame.x_axis, Vector3::y());
        assert_relative_eq!(frame.y_axis, Vector3::z());
    }

    #[test]
    fn orientation_is_projected_off_the_tangent() {
        let beam = Beam::straight(
            Point3::origin(),
            Point3::new(0.0, 0.0, 10.0),
            Vector3::new(1.0, 0.0, 1.0),
            1.0,
            1.0,
        )
        .unwrap();

        let frame = beam.frame_at(0.0);
        assert_relative_eq!(frame.x_axis, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(frame.x_axis.cross(&frame.y_axis), frame.normal, epsilon = 1e-12);
    }

    #[test]
    fn parallel_orientation_falls_back() {
        let vertical = Beam::straight(
            Point3::origin(),
            Point3::new(0.0, 0.0, 5.0),
            Vector3::z(),
            1.0,
            1.0,
        )
        .unwrap();
        // World Z is parallel too, so world X is used
        assert_relative_eq!(vertical.frame_at(1.0).x_axis, Vector3::x(), epsilon = 1e-12);

        let horizontal = Beam::straight(
            Point3::origin(),
            Point3::new(5.0, 0.0, 0.0),
            Vector3::x(),
            1.0,
            1.0,
        )
        .unwrap();
        assert_relative_eq!(horizontal.frame_at(1.0).x_axis, Vector3::z(), epsilon = 1e-12);
    }
}
