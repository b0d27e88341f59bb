// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mitred branch between two beam ends meeting at an oblique angle.

use joinery_geometry::{closest_points_between_lines, Line, Plane, Point3};

use super::{degenerate, end_to_end_parts, part_frame, trim_box};
use super::{Construction, Joint};
use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::{ConfigMap, TrimConfig, VariantConfig};
use crate::error::Result;
use crate::part::JointPart;

#[derive(Debug, Clone)]
pub struct BranchJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: TrimConfig,
}

impl BranchJoint {
    pub const NAME: &'static str = "BranchJoint";

    pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
        Ok(Self {
            position: condition.position,
            parts: end_to_end_parts(Self::NAME, beams, condition)?,
            config: TrimConfig::default(),
        })
    }
}

impl Joint for BranchJoint {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> JointKind {
        JointKind::Branch
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

        let bisector = a.direction - b.direction;
        if bisector.norm() < 1e-9 {
            return Err(degenerate("branch ends point the same way"));
        }

        // Mitre through the closest approach of the two axes
        let origin = match closest_points_between_lines(&fa.origin, &a.direction, &fb.origin, &b.direction) {
            Some((s, t)) => nalgebra::center(&(fa.origin + a.direction * s), &(fb.origin + b.direction * t)),
            None => nalgebra::center(&fa.origin, &fb.origin),
        };
        let mitre = Plane::from_normal(origin, bisector);

        let mut construction = Construction::with_parts(2);
        construction.parts[0].push(trim_box(beam_a, &fa, &mitre, &a.direction, self.config.added)?);
        construction.parts[1].push(trim_box(beam_b, &fb, &mitre, &b.direction, self.config.added)?);

        construction.debug.planes.push(mitre);
        construction.debug.lines.push(Line::from_direction(fa.origin, a.direction));
        construction.debug.lines.push(Line::from_direction(fb.origin, b.direction));
        Ok(construction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ClassificationThresholds};
    use crate::condition::{detect_conditions, DetectionSettings};
    use joinery_geometry::Vector3;

    fn branch() -> (Vec<Beam>, JointCondition) {
        let r = std::f64::consts::FRAC_1_SQRT_2 * 1000.0;
        let beams = vec![
            Beam::straight(Point3::new(-1000.0, 0.0, 0.0), Point3::origin(), Vector3::z(), 100.0, 200.0).unwrap(),
            Beam::straight(Point3::origin(), Point3::new(r, r, 0.0), Vector3::z(), 100.0, 200.0).unwrap(),
        ];
        let conditions = detect_conditions(&beams, &DetectionSettings::default());
        assert_eq!(conditions.len(), 1);
        let condition = conditions.into_iter().next().unwrap();
        (beams, condition)
    }

    #[test]
    fn oblique_ends_classify_as_branch() {
        let (_, condition) = branch();
        assert_eq!(
            classify(&condition, &ClassificationThresholds::default()).unwrap(),
            JointKind::Branch
        );
    }

    #[test]
    fn both_beams_stop_at_the_mitre() {
        let (beams, condition) = branch();
        let joint = BranchJoint::new(&beams, &condition).unwrap();
        let construction = joint.construct(&beams).unwrap();

        let mitre = construction.debug.planes[0];
        assert!(mitre.signed_distance(&Point3::origin()).abs() < 1e-9);

        // each cutter lies entirely on its own beam's far side of the mitre
        for (part, solids) in joint.parts().iter().zip(&construction.parts) {
            let side = mitre.normal.dot(&part.direction).signum();
            assert!(solids[0].is_closed());
            for v in solids[0].vertices() {
                assert!(side * mitre.signed_distance(v) > -1e-9);
            }
        }
    }
}
