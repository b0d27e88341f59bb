// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tenon and mortise between a beam end and another beam's middle.

use joinery_geometry::{intersect_plane_plane, Plane, Point3, Solid};

use super::{check_parts, closest_axis, degenerate, hexahedron_from_planes, part_frame, side_planes, SideAxis};
use super::{Construction, Joint};
use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::{ConfigMap, TenonConfig, VariantConfig};
use crate::error::{Error, Result};
use crate::part::JointPart;

/// Tenon on the AtEnd beam, mortise pocket in the AtMiddle beam.
///
/// Part 0 is always the tenon, whatever the order in the condition.
#[derive(Debug, Clone)]
pub struct TenonJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: TenonConfig,
}

impl TenonJoint {
    pub const NAME: &'static str = "TenonJoint";
    pub const DOVETAIL_NAME: &'static str = "DovetailTenonJoint";

    pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
        Self::with_config(beams, condition, TenonConfig::default())
    }

    /// Tenon whose cheeks flare by the draft angle so it locks in the pocket.
    pub fn dovetail(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
        Self::with_config(beams, condition, TenonConfig::dovetail())
    }

    fn with_config(beams: &[Beam], condition: &JointCondition, config: TenonConfig) -> Result<Self> {
        let name = Self::name_for(&config);
        check_parts(name, beams, condition, 2)?;

        let [a, b] = [condition.parts[0], condition.parts[1]];
        let parts = match (a.case.is_at_end(), b.case.is_at_end()) {
            (true, false) => [a, b],
            (false, true) => [b, a],
            _ => {
                return Err(Error::topology(
                    name,
                    format!("needs one AtEnd and one AtMiddle part, got {} and {}", a.case, b.case),
                ))
            }
        };

        Ok(Self {
            position: condition.position,
            parts,
            config,
        })
    }

    fn name_for(config: &TenonConfig) -> &'static str {
        if config.dovetail {
            Self::DOVETAIL_NAME
        } else {
            Self::NAME
        }
    }

    pub fn tenon(&self) -> &JointPart {
        &self.parts[0]
    }

    pub fn mortise(&self) -> &JointPart {
        &self.parts[1]
    }

    /// Rotate both cheek planes about their line on the mortise face so the
    /// tenon widens with depth.
    fn draft(&self, cheeks: [Plane; 2], face: &Plane, face_axis: &SideAxis, depth: f64) -> Result<[Plane; 2]> {
        let angle = self.config.draft_angle.to_radians();
        let mut drafted = cheeks;

        for (i, cheek) in cheeks.iter().enumerate() {
            let pivot = intersect_plane_plane(cheek, face)?;
            let axis = pivot.direction();
            // Both cheeks face the same way; the tenon lies in front of the
            // first and behind the second.
            let inside = if i == 0 { 1.0 } else { -1.0 };
            let probe = pivot.start - face_axis.direction * depth;

            let candidate = cheek.rotated(angle, &axis, &pivot.start);
            drafted[i] = if inside * candidate.signed_distance(&probe) > 0.0 {
                candidate
            } else {
                cheek.rotated(-angle, &axis, &pivot.start)
            };
        }

        Ok(drafted)
    }
}

impl Joint for TenonJoint {
    fn type_name(&self) -> &'static str {
        Self::name_for(&self.config)
    }

    fn kind(&self) -> JointKind {
        JointKind::Tenon
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
        let (tenon, ft) = part_frame(beams, &self.parts[0])?;
        let (mortise, fm) = part_frame(beams, &self.parts[1])?;
        let config = &self.config;
        let added = config.added;

        // Mortise faces, all facing back towards the tenon beam
        let face_axis = closest_axis(&fm, &-self.parts[0].direction);
        let half_m = face_axis.half(mortise);
        if config.blind_offset >= 2.0 * half_m {
            return Err(degenerate(format!(
                "blind offset {} leaves no mortise in a {} deep beam",
                config.blind_offset,
                2.0 * half_m
            )));
        }
        let near = face_axis.plane(&fm, half_m);
        let far = face_axis.plane(&fm, -half_m);
        let blind = config.blind_offset > 0.0;
        let back = if blind {
            face_axis.plane(&fm, config.blind_offset - half_m)
        } else {
            far
        };

        // The tenon's long side runs along the mortise grain
        let long = closest_axis(&ft, &fm.normal);
        let thin = long.other(&ft);
        let half_long = long.half(tenon);
        let half_thin = thin.half(tenon);

        let thickness = if config.tenon_width > 0.0 {
            config.tenon_width
        } else {
            thin.depth(tenon) / 3.0
        };
        let tenon_half_long = half_long - config.inset;
        if thickness >= 2.0 * half_thin || tenon_half_long <= 0.0 {
            return Err(degenerate(format!(
                "tenon {} x {} does not fit a {} x {} section",
                thickness,
                2.0 * tenon_half_long,
                thin.depth(tenon),
                long.depth(tenon)
            )));
        }

        let mut cheeks = side_planes(&ft, &thin, 0.5 * thickness);
        if config.dovetail {
            cheeks = self.draft(cheeks, &near, &face_axis, 2.0 * half_m)?;
        }
        let outer_thin = side_planes(&ft, &thin, half_thin + added);
        let outer_long = side_planes(&ft, &long, half_long + added);
        let edges = side_planes(&ft, &long, tenon_half_long);

        let reach = 2.0 * half_m + tenon.width + tenon.height + added;
        let beyond = near.offset(-reach);

        let mut construction = Construction::with_parts(2);
        let tenon_cuts = &mut construction.parts[0];
        tenon_cuts.push(hexahedron_from_planes(
            [&outer_thin[0], &cheeks[0]],
            [&outer_long[0], &outer_long[1]],
            [&near, &back],
        )?);
        tenon_cuts.push(hexahedron_from_planes(
            [&cheeks[1], &outer_thin[1]],
            [&outer_long[0], &outer_long[1]],
            [&near, &back],
        )?);
        if config.inset > 0.0 {
            tenon_cuts.push(hexahedron_from_planes(
                [&cheeks[0], &cheeks[1]],
                [&outer_long[0], &edges[0]],
                [&near, &back],
            )?);
            tenon_cuts.push(hexahedron_from_planes(
                [&cheeks[0], &cheeks[1]],
                [&edges[1], &outer_long[1]],
                [&near, &back],
            )?);
        }
        tenon_cuts.push(hexahedron_from_planes(
            [&outer_thin[0], &outer_thin[1]],
            [&outer_long[0], &outer_long[1]],
            [&back, &beyond],
        )?);

        let entry = near.offset(added);
        let bottom = if blind { back } else { far.offset(-added) };
        let pocket: Solid = hexahedron_from_planes([&cheeks[0], &cheeks[1]], [&edges[0], &edges[1]], [&entry, &bottom])?;
        construction.parts[1].push(pocket);

        construction.debug.planes.extend([near, back]);
        construction.debug.planes.extend(cheeks);
        construction.debug.points.push(self.position);
        Ok(construction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BLIND_OFFSET, DRAFT_ANGLE, INSET};
    use crate::condition::{detect_conditions, DetectionSettings};
    use crate::part::PartCase;
    use approx::assert_relative_eq;
    use joinery_geometry::Vector3;

    /// Mortise beam 0 along X, tenon beam 1 ending on its centreline.
    fn tee() -> (Vec<Beam>, JointCondition) {
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
                Point3::new(0.0, -600.0, 0.0),
                Point3::origin(),
                Vector3::x(),
                100.0,
                200.0,
            )
            .unwrap(),
        ];
        let conditions = detect_conditions(&beams, &DetectionSettings::default());
        assert_eq!(conditions.len(), 1);
        let condition = conditions.into_iter().next().unwrap();
        (beams, condition)
    }

    fn configured(values: &[(&str, f64)], dovetail: bool) -> (Vec<Beam>, TenonJoint) {
        let (beams, condition) = tee();
        let mut joint = if dovetail {
            TenonJoint::dovetail(&beams, &condition).unwrap()
        } else {
            TenonJoint::new(&beams, &condition).unwrap()
        };
        joint.configure(&values.iter().map(|(k, v)| (k.to_string(), *v)).collect());
        (beams, joint)
    }

    #[test]
    fn tenon_part_comes_first() {
        let (beams, condition) = tee();
        let joint = TenonJoint::new(&beams, &condition).unwrap();
        assert_eq!(joint.tenon().element, 1);
        assert_eq!(joint.tenon().case, PartCase::AT_END1);
        assert_eq!(joint.mortise().element, 0);
    }

    #[test]
    fn through_mortise_pocket() {
        let (beams, joint) = configured(&[], false);
        let construction = joint.construct(&beams).unwrap();

        // two shoulders and the end trim
        assert_eq!(construction.parts[0].len(), 3);
        assert!(construction.parts.iter().flatten().all(Solid::is_closed));

        let pocket = &construction.parts[1][0];
        let (min, max) = pocket.bounding_box();
        assert_relative_eq!(min, Point3::new(-50.0, -60.0, -100.0 / 3.0), epsilon = 1e-9);
        assert_relative_eq!(max, Point3::new(50.0, 60.0, 100.0 / 3.0), epsilon = 1e-9);
        assert_relative_eq!(pocket.volume(), 800_000.0, epsilon = 1e-6);
    }

    #[test]
    fn blind_mortise_stops_short_of_the_far_face() {
        let (beams, joint) = configured(&[(BLIND_OFFSET, 20.0)], false);
        let construction = joint.construct(&beams).unwrap();

        let (min, max) = construction.parts[1][0].bounding_box();
        assert_relative_eq!(min.y, -60.0, epsilon = 1e-9);
        assert_relative_eq!(max.y, 30.0, epsilon = 1e-9);

        // end trim starts at the mortise bottom
        let (min, _) = construction.parts[0].last().unwrap().bounding_box();
        assert_relative_eq!(min.y, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn inset_narrows_the_tenon() {
        let (beams, joint) = configured(&[(INSET, 10.0)], false);
        let construction = joint.construct(&beams).unwrap();

        assert_eq!(construction.parts[0].len(), 5);
        let (min, max) = construction.parts[1][0].bounding_box();
        assert_relative_eq!(min.x, -40.0, epsilon = 1e-9);
        assert_relative_eq!(max.x, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn dovetail_widens_with_depth() {
        let (beams, joint) = configured(&[(DRAFT_ANGLE, 10.0)], true);
        assert_eq!(joint.type_name(), "DovetailTenonJoint");
        let construction = joint.construct(&beams).unwrap();

        let pocket = &construction.parts[1][0];
        assert!(pocket.is_closed());
        let (_, max) = pocket.bounding_box();
        assert_relative_eq!(max.z, 100.0 / 3.0 + 110.0 * 10f64.to_radians().tan(), epsilon = 1e-9);
    }

    #[test]
    fn draft_key_is_ignored_without_dovetail() {
        let (_, joint) = configured(&[(DRAFT_ANGLE, 25.0)], false);
        assert!(!joint.configuration().contains_key(DRAFT_ANGLE));
        assert_eq!(joint.config.draft_angle, 0.0);
    }

    #[test]
    fn oversized_blind_offset_fails() {
        let (beams, joint) = configured(&[(BLIND_OFFSET, 150.0)], false);
        assert_eq!(joint.construct(&beams).unwrap_err().status_code(), 1);
    }

    #[test]
    fn needs_mixed_cases() {
        let (beams, mut condition) = tee();
        for part in condition.parts.iter_mut() {
            part.case = PartCase::AT_MIDDLE;
        }
        assert!(matches!(
            TenonJoint::new(&beams, &condition),
            Err(Error::InvalidTopology { .. })
        ));
    }
}
