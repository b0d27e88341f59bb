// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-lap joints, optionally with backcut relief on the notch walls.

use joinery_geometry::{interpolate, intersect_three_planes, Plane, Point3, Solid};

use super::{check_parts, closest_axis, degenerate, dowel_row, hexahedron_from_planes, part_frame, side_planes};
use super::{Construction, Joint};
use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::{Backcut, ConfigMap, CrossConfig, VariantConfig};
use crate::error::{Error, Result};
use crate::part::JointPart;

/// Two beams crossing in their middles, each notched to the lap plane.
///
/// The lap plane sits between the two centrelines, interpolated by the
/// beams' depths across the crossing, so stacked beams lap at their contact
/// face and coincident centrelines lap at the shared centre.
#[derive(Debug, Clone)]
pub struct CrossJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: CrossConfig,
}

impl CrossJoint {
    pub const NAME: &'static str = "CrossJoint";
    pub const BACKCUT_NAME: &'static str = "CrossBackcutJoint";
    pub const DOUBLE_BACKCUT_NAME: &'static str = "CrossDoubleBackcutJoint";

    pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
        Self::with_backcut(beams, condition, Backcut::None)
    }

    pub fn with_backcut(beams: &[Beam], condition: &JointCondition, backcut: Backcut) -> Result<Self> {
        let name = Self::name_for(backcut);
        check_parts(name, beams, condition, 2)?;
        let parts = [condition.parts[0], condition.parts[1]];
        if parts.iter().any(|p| p.case.is_at_end()) {
            return Err(Error::topology(name, "both parts must be AtMiddle"));
        }

        Ok(Self {
            position: condition.position,
            parts,
            config: CrossConfig::new(backcut),
        })
    }

    fn name_for(backcut: Backcut) -> &'static str {
        match backcut {
            Backcut::None => Self::NAME,
            Backcut::Single => Self::BACKCUT_NAME,
            Backcut::Double => Self::DOUBLE_BACKCUT_NAME,
        }
    }

    /// Notch between two wall planes, bounded across by `span`, from the lap
    /// plane out to `outer`. Backcut walls lean outwards towards `outer`.
    fn notch(&self, walls: [Plane; 2], span: [Plane; 2], lap: &Plane, outer: &Plane) -> Result<Solid> {
        if self.config.backcut == Backcut::None {
            return hexahedron_from_planes([&walls[0], &walls[1]], [&span[0], &span[1]], [lap, outer]);
        }

        let depth = lap.signed_distance(&outer.origin).abs();
        let taper = depth * self.config.taper_angle.to_radians().tan();
        let relieved = match self.config.backcut {
            Backcut::Double => [walls[0].offset(-taper), walls[1].offset(taper)],
            _ => [walls[0], walls[1].offset(taper)],
        };

        let ring = |w: &[Plane; 2], cap: &Plane| -> Result<[Point3<f64>; 4]> {
            Ok([
                intersect_three_planes(&w[0], &span[0], cap)?,
                intersect_three_planes(&w[1], &span[0], cap)?,
                intersect_three_planes(&w[1], &span[1], cap)?,
                intersect_three_planes(&w[0], &span[1], cap)?,
            ])
        };

        Ok(Solid::hexahedron(ring(&walls, lap)?, ring(&relieved, outer)?)?)
    }
}

impl Joint for CrossJoint {
    fn type_name(&self) -> &'static str {
        Self::name_for(self.config.backcut)
    }

    fn kind(&self) -> JointKind {
        JointKind::Cross
    }

    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn parts(&self) -> &[JointPart] {
        &self.parts
    }

    fn configure(&mut self, values: &ConfigMap) {
        let name = self.type_name();
        self.config.apply(values, name);
    }

    fn configuration(&self) -> ConfigMap {
        self.config.to_map()
    }

    fn construct(&self, beams: &[Beam]) -> Result<Construction> {
        let (beam_a, fa) = part_frame(beams, &self.parts[0])?;
        let (beam_b, fb) = part_frame(beams, &self.parts[1])?;
        let added = self.config.added;

        let axis = fa.normal.cross(&fb.normal);
        if axis.norm() < 1e-9 {
            return Err(degenerate("crossing beams are parallel"));
        }
        let mut n = axis.normalize();
        if (fb.origin - fa.origin).dot(&n) < 0.0 {
            n = -n;
        }

        // Depths across the crossing; A lies below the lap, B above
        let a_up = closest_axis(&fa, &n);
        let b_down = closest_axis(&fb, &-n);
        let depth_a = a_up.depth(beam_a);
        let depth_b = b_down.depth(beam_b);

        let lap_origin = interpolate(&fa.origin, &fb.origin, depth_a / (depth_a + depth_b));
        let lap = Plane::from_normal(lap_origin, n);

        // Faces of each beam seen across the other's grain
        let a_across = closest_axis(&fa, &fb.normal);
        let b_across = closest_axis(&fb, &fa.normal);
        let half_a = a_across.half(beam_a);
        let half_b = b_across.half(beam_b);

        let cutter_a = self.notch(
            side_planes(&fb, &b_across, half_b),
            side_planes(&fa, &a_across, half_a + added),
            &lap,
            &a_up.plane(&fa, 0.5 * depth_a + added),
        )?;
        let cutter_b = self.notch(
            side_planes(&fa, &a_across, half_a),
            side_planes(&fb, &b_across, half_b + added),
            &lap,
            &b_down.plane(&fb, 0.5 * depth_b + added),
        )?;

        let mut construction = Construction::with_parts(2);
        construction.parts[0].push(cutter_a);
        construction.parts[1].push(cutter_b);

        // Dowel row along A's grain through the lap centre
        if self.config.dowel_diameter > 0.0 {
            let bores = dowel_row(
                &lap_origin,
                &n,
                &fa.normal,
                self.config.dowel_diameter,
                depth_a + depth_b + 2.0 * added,
                self.config.dowel_count,
                self.config.dowel_spacing,
            )?;
            construction.parts[0].extend(bores.iter().cloned());
            construction.parts[1].extend(bores);
        }

        construction.debug.planes.push(lap);
        construction.debug.points.push(lap_origin);
        Ok(construction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DOWEL_COUNT, DOWEL_DIAMETER, DOWEL_SPACING, TAPER_ANGLE};
    use crate::condition::{detect_conditions, DetectionSettings};
    use approx::assert_relative_eq;
    use joinery_geometry::Vector3;

    /// Two 100 × 200 beams crossing at right angles, heights vertical.
    fn crossing(offset_z: f64) -> (Vec<Beam>, JointCondition) {
        let beams = vec![
            Beam::straight(
                Point3::new(-500.0, 0.0, 0.0),
                Point3::new(500.0, 0.0, 0.0),
                Vector3::y(),
                100.0,
                200.0,
            )
            .unwrap(),
            Beam::straight(
                Point3::new(0.0, -500.0, offset_z),
                Point3::new(0.0, 500.0, offset_z),
                Vector3::x(),
                100.0,
                200.0,
            )
            .unwrap(),
        ];
        let settings = DetectionSettings {
            search_radius: offset_z.abs() + 1.0,
            ..DetectionSettings::default()
        };
        let conditions = detect_conditions(&beams, &settings);
        assert_eq!(conditions.len(), 1);
        let condition = conditions.into_iter().next().unwrap();
        (beams, condition)
    }

    #[test]
    fn right_angle_cross_notches_half_depth() {
        let (beams, condition) = crossing(0.0);
        let joint = CrossJoint::new(&beams, &condition).unwrap();
        let construction = joint.construct(&beams).unwrap();

        assert_eq!(construction.parts.len(), 2);
        let a = &construction.parts[0][0];
        let b = &construction.parts[1][0];
        assert!(a.is_closed() && b.is_closed());

        // A loses the top half under B's footprint, B the bottom half
        let (min, max) = a.bounding_box();
        assert_relative_eq!(min, Point3::new(-50.0, -60.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(max, Point3::new(50.0, 60.0, 110.0), epsilon = 1e-9);

        let (min, max) = b.bounding_box();
        assert_relative_eq!(min, Point3::new(-60.0, -50.0, -110.0), epsilon = 1e-9);
        assert_relative_eq!(max, Point3::new(60.0, 50.0, 0.0), epsilon = 1e-9);

        assert_relative_eq!(construction.debug.planes[0].origin.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn stacked_beams_lap_at_their_contact_face() {
        // B rests 150 above A; depths weight the lap to A's top face
        let (beams, condition) = crossing(150.0);
        let construction = CrossJoint::new(&beams, &condition).unwrap().construct(&beams).unwrap();

        let lap_z = construction.debug.points[0].z;
        assert_relative_eq!(lap_z, 75.0, epsilon = 1e-9);
        let (min, _) = construction.parts[0][0].bounding_box();
        assert_relative_eq!(min.z, lap_z, epsilon = 1e-9);
    }

    #[test]
    fn construction_is_deterministic() {
        let (beams, condition) = crossing(0.0);
        let joint = CrossJoint::new(&beams, &condition).unwrap();
        let first = joint.construct(&beams).unwrap();
        let second = joint.construct(&beams).unwrap();

        for (p, q) in first.parts.iter().flatten().zip(second.parts.iter().flatten()) {
            for (u, v) in p.vertices().iter().zip(q.vertices()) {
                assert_relative_eq!(u, v, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn backcut_widens_the_notch_at_the_face() {
        let (beams, condition) = crossing(0.0);
        let mut joint = CrossJoint::with_backcut(&beams, &condition, Backcut::Double).unwrap();
        let values = [(TAPER_ANGLE.to_string(), 45.0)].into_iter().collect();
        joint.configure(&values);
        assert_eq!(joint.type_name(), "CrossDoubleBackcutJoint");

        let construction = joint.construct(&beams).unwrap();
        let a = &construction.parts[0][0];
        assert!(a.is_closed());

        // 110 deep at 45° leans each wall out by 110
        let (min, max) = a.bounding_box();
        assert_relative_eq!(min.x, -160.0, epsilon = 1e-9);
        assert_relative_eq!(max.x, 160.0, epsilon = 1e-9);
    }

    #[test]
    fn dowel_runs_through_both_parts() {
        let (beams, condition) = crossing(0.0);
        let mut joint = CrossJoint::new(&beams, &condition).unwrap();
        joint.configure(&[(DOWEL_DIAMETER.to_string(), 12.0)].into_iter().collect());

        let construction = joint.construct(&beams).unwrap();
        assert_eq!(construction.parts[0].len(), 2);
        assert_eq!(construction.parts[1].len(), 2);
        let (min, max) = construction.parts[0][1].bounding_box();
        assert_relative_eq!(max.z - min.z, 420.0, epsilon = 1e-9);
    }

    #[test]
    fn dowel_row_runs_along_the_first_beam() {
        let (beams, condition) = crossing(0.0);
        let mut joint = CrossJoint::new(&beams, &condition).unwrap();
        let values = [(DOWEL_DIAMETER, 12.0), (DOWEL_COUNT, 3.0), (DOWEL_SPACING, 30.0)];
        joint.configure(&values.iter().map(|(k, v)| (k.to_string(), *v)).collect());

        let construction = joint.construct(&beams).unwrap();
        assert_eq!(construction.parts[0].len(), 4);
        assert_eq!(construction.parts[1].len(), 4);
        for (bore, x) in construction.parts[0][1..].iter().zip([-30.0, 0.0, 30.0]) {
            let (min, max) = bore.bounding_box();
            let centre = nalgebra::center(&min, &max);
            assert_relative_eq!(centre.x, x, epsilon = 1e-9);
            assert_relative_eq!(centre.y, 0.0, epsilon = 1e-9);
            assert_relative_eq!(max.z - min.z, 420.0, epsilon = 1e-9);
        }

        joint.configure(&[(DOWEL_SPACING.to_string(), 8.0)].into_iter().collect());
        assert!(matches!(
            joint.construct(&beams),
            Err(Error::Geometry(joinery_geometry::Error::DegenerateGeometry(_)))
        ));
    }

    #[test]
    fn rejects_end_parts() {
        let (beams, mut condition) = crossing(0.0);
        condition.parts[0].case = crate::part::PartCase::AT_END1;
        assert!(matches!(
            CrossJoint::new(&beams, &condition),
            Err(Error::InvalidTopology { .. })
        ));
    }
}
