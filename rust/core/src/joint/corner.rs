// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Corner joints between two beam ends meeting near perpendicular.

use joinery_geometry::{interpolate, Plane, Point3};

use super::{closest_axis, degenerate, dowel_row, end_to_end_parts, hexahedron_from_planes, part_frame, side_planes, trim_box};
use super::{Construction, Joint};
use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::{ConfigMap, CornerLapConfig, TrimConfig, VariantConfig};
use crate::error::Result;
use crate::part::JointPart;

/// Butt corner: part 0 runs through to the outside of part 1, part 1 stops
/// at the inner face of part 0.
#[derive(Debug, Clone)]
pub struct CornerJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: TrimConfig,
}

impl CornerJoint {
    pub const NAME: &'static str = "CornerJoint";

    pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
        Ok(Self {
            position: condition.position,
            parts: end_to_end_parts(Self::NAME, beams, condition)?,
            config: TrimConfig::default(),
        })
    }
}

impl Joint for CornerJoint {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> JointKind {
        JointKind::Corner
    }

    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn parts(&self) -> &[JointPart] {
        &self.parts
    }

    fn configure(&mut self, values: &ConfigMap) {
        self.config.apply(values, Self::NAME);
    }

    fn configuration(&self) -> ConfigMap {
        self.config.to_map()
    }

    fn construct(&self, beams: &[Beam]) -> Result<Construction> {
        let [a, b] = &self.parts;
        let (beam_a, fa) = part_frame(beams, a)?;
        let (beam_b, fb) = part_frame(beams, b)?;
        let added = self.config.added;

        // Face of B that A's end points at, and the face of A that B's end
        // points away from.
        let b_side = closest_axis(&fb, &a.direction);
        let outer_b = b_side.plane(&fb, b_side.half(beam_b));
        let a_side = closest_axis(&fa, &b.direction);
        let inner_a = a_side.plane(&fa, -a_side.half(beam_a));

        let mut construction = Construction::with_parts(2);
        construction.parts[0].push(trim_box(beam_a, &fa, &outer_b, &a.direction, added)?);
        construction.parts[1].push(trim_box(beam_b, &fb, &inner_a, &b.direction, added)?);
        construction.debug.planes.extend([outer_b, inner_a]);
        Ok(construction)
    }
}

/// Half-lapped corner: both beams run to the other's outer face, overlap at
/// the lap plane and are pinned by a dowel across the lap.
#[derive(Debug, Clone)]
pub struct CornerLapJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: CornerLapConfig,
}

impl CornerLapJoint {
    pub const NAME: &'static str = "CornerLapJoint";

    pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
        Ok(Self {
            position: condition.position,
            parts: end_to_end_parts(Self::NAME, beams, condition)?,
            config: CornerLapConfig::default(),
        })
    }
}

impl Joint for CornerLapJoint {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> JointKind {
        JointKind::Corner
    }

    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn parts(&self) -> &[JointPart] {
        &self.parts
    }

    fn configure(&mut self, values: &ConfigMap) {
        self.config.apply(values, Self::NAME);
    }

    fn configuration(&self) -> ConfigMap {
        self.config.to_map()
    }

    fn construct(&self, beams: &[Beam]) -> Result<Construction> {
        let [a, b] = &self.parts;
        let (beam_a, fa) = part_frame(beams, a)?;
        let (beam_b, fb) = part_frame(beams, b)?;
        let added = self.config.added;

        let axis = fa.normal.cross(&fb.normal);
        if axis.norm() < 1e-9 {
            return Err(degenerate("lapped corner beams are parallel"));
        }
        let mut n = axis.normalize();
        if (fb.origin - fa.origin).dot(&n) < 0.0 {
            n = -n;
        }

        let a_up = closest_axis(&fa, &n);
        let b_down = closest_axis(&fb, &-n);
        let depth_a = a_up.depth(beam_a);
        let depth_b = b_down.depth(beam_b);
        let lap_origin = interpolate(&fa.origin, &fb.origin, depth_a / (depth_a + depth_b));
        let lap = Plane::from_normal(lap_origin, n);

        // Each beam's faces along the other's grain
        let a_along = closest_axis(&fa, &b.direction);
        let b_along = closest_axis(&fb, &a.direction);
        let half_a = a_along.half(beam_a);
        let half_b = b_along.half(beam_b);
        let a_across = closest_axis(&fa, &fb.normal);
        let b_across = closest_axis(&fb, &fa.normal);

        let outer_a = a_along.plane(&fa, half_a);
        let outer_b = b_along.plane(&fb, half_b);

        let across_a = side_planes(&fa, &a_across, a_across.half(beam_a) + added);
        let lap_a = hexahedron_from_planes(
            [&b_along.plane(&fb, -half_b), &b_along.plane(&fb, half_b + added)],
            [&across_a[0], &across_a[1]],
            [&lap, &a_up.plane(&fa, 0.5 * depth_a + added)],
        )?;
        let across_b = side_planes(&fb, &b_across, b_across.half(beam_b) + added);
        let lap_b = hexahedron_from_planes(
            [&a_along.plane(&fa, -half_a), &a_along.plane(&fa, half_a + added)],
            [&across_b[0], &across_b[1]],
            [&lap, &b_down.plane(&fb, 0.5 * depth_b + added)],
        )?;

        let mut construction = Construction::with_parts(2);
        construction.parts[0].push(trim_box(beam_a, &fa, &outer_b, &a.direction, added)?);
        construction.parts[0].push(lap_a);
        construction.parts[1].push(trim_box(beam_b, &fb, &outer_a, &b.direction, added)?);
        construction.parts[1].push(lap_b);

        // Dowel row along A's grain, centred on the lap
        if self.config.dowel_diameter > 0.0 {
            let bores = dowel_row(
                &lap_origin,
                &n,
                &fa.normal,
                self.config.dowel_diameter,
                depth_a + depth_b + self.config.dowel_clearance,
                self.config.dowel_count,
                self.config.dowel_spacing,
            )?;
            construction.parts[0].extend(bores.iter().cloned());
            construction.parts[1].extend(bores);
        }

        construction.debug.planes.extend([lap, outer_a, outer_b]);
        construction.debug.points.push(lap_origin);
        Ok(construction)
    }
}
