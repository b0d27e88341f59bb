// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end splices between two nearly collinear beams
//!
//! Every splice works in a frame centred between the two end frames, with
//! its normal pointing from part 0 towards part 1. Profiles are given in
//! that frame as `(s, t)` pairs: `s` along the normal, `t` along the beam
//! height. Part 0 sits on the negative side.

use joinery_geometry::{fillet_polygon, Face, Plane, Point3, Solid, WELD_TOLERANCE};

use super::{degenerate, end_to_end_parts, part_frame, trim_box};
use super::{Construction, Joint};
use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::{BirdsmouthConfig, BlindTenonConfig, ConfigMap, SteppedSpliceConfig, TrimConfig, VariantConfig};
use crate::error::Result;
use crate::part::JointPart;

const FILLET_SEGMENTS: usize = 4;

/// Smallest band height of a stepped splice.
pub const MIN_STEP_HEIGHT: f64 = 1.0;

/// Splice frame and the section of part 0 measured in it.
struct SpliceSection {
    frame: Plane,
    width: f64,
    height: f64,
}

impl SpliceSection {
    fn new(beams: &[Beam], parts: &[JointPart; 2]) -> Result<Self> {
        let [a, b] = parts;
        let (beam_a, fa) = part_frame(beams, a)?;
        let (_, fb) = part_frame(beams, b)?;

        let axis = a.direction - b.direction;
        if axis.norm() < 1e-9 {
            return Err(degenerate("splice ends point the same way"));
        }
        let normal = axis.normalize();

        let project = |v: &joinery_geometry::Vector3<f64>| v - normal * v.dot(&normal);
        let (up, width, height) = if project(&fa.y_axis).norm() > 1e-6 {
            (project(&fa.y_axis), beam_a.width, beam_a.height)
        } else {
            (project(&fa.x_axis), beam_a.height, beam_a.width)
        };
        let up = up.normalize();
        let centre = nalgebra::center(&fa.origin, &fb.origin);

        Ok(Self {
            frame: Plane::new(centre, up.cross(&normal), up),
            width,
            height,
        })
    }

    fn at(&self, u: f64, s: f64, t: f64) -> Point3<f64> {
        self.frame.point_at(u, t) + self.frame.normal * s
    }

    /// Prism over an `(s, t)` profile, spanning `±half_width` across.
    fn prism(&self, profile: &[(f64, f64)], half_width: f64) -> Result<Solid> {
        let bottom: Vec<Point3<f64>> = profile.iter().map(|&(s, t)| self.at(-half_width, s, t)).collect();
        let top: Vec<Point3<f64>> = profile.iter().map(|&(s, t)| self.at(half_width, s, t)).collect();
        Ok(Solid::loft(&bottom, &top)?)
    }

    /// Distance that clears both beam ends from the splice plane.
    fn reach(&self, added: f64) -> f64 {
        2.0 * (self.width + self.height) + added
    }
}

macro_rules! splice_joint {
    ($ty:ident, $name:literal, $config:ty) => {
        impl $ty {
            pub const NAME: &'static str = $name;

            pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
                Ok(Self {
                    position: condition.position,
                    parts: end_to_end_parts(Self::NAME, beams, condition)?,
                    config: <$config>::default(),
                })
            }
        }

        impl Joint for $ty {
            fn type_name(&self) -> &'static str {
                Self::NAME
            }

            fn kind(&self) -> JointKind {
                JointKind::Splice
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
                self.build(beams)
            }
        }
    };
}

/// Both ends trimmed square at the plane halfway between them.
#[derive(Debug, Clone)]
pub struct SpliceJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: TrimConfig,
}

splice_joint!(SpliceJoint, "SpliceJoint", TrimConfig);

impl SpliceJoint {
    fn build(&self, beams: &[Beam]) -> Result<Construction> {
        let section = SpliceSection::new(beams, &self.parts)?;
        let cut = section.frame;

        let mut construction = Construction::with_parts(2);
        for (slot, part) in self.parts.iter().enumerate() {
            let (beam, frame) = part_frame(beams, part)?;
            construction.parts[slot].push(trim_box(beam, &frame, &cut, &part.direction, self.config.added)?);
        }
        construction.debug.planes.push(cut);
        Ok(construction)
    }
}

/// V-shaped tongue on part 0 seated in a matching notch in part 1.
#[derive(Debug, Clone)]
pub struct BirdsmouthSpliceJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: BirdsmouthConfig,
}

splice_joint!(BirdsmouthSpliceJoint, "BirdsmouthSpliceJoint", BirdsmouthConfig);

impl BirdsmouthSpliceJoint {
    fn build(&self, beams: &[Beam]) -> Result<Construction> {
        let section = SpliceSection::new(beams, &self.parts)?;
        let added = self.config.added;
        let half_angle = self.config.half_angle.to_radians();
        if !(half_angle > 0.0 && half_angle < std::f64::consts::FRAC_PI_2) {
            return Err(degenerate(format!("birdsmouth half angle {} out of range", self.config.half_angle)));
        }

        let half_height = 0.5 * section.height;
        let depth = half_height / half_angle.tan();
        let apex = 0.5 * depth;
        // Arm position along the splice axis at height t
        let arm = |t: f64| apex - t.abs() * depth / half_height;

        let far = section.reach(added);
        let rise = half_height + added;
        let half_width = 0.5 * section.width + added;
        if apex >= far || arm(rise) <= -far {
            return Err(degenerate(format!(
                "birdsmouth half angle {} notches {:.1} deep, beyond the {:.1} cutter reach",
                self.config.half_angle,
                apex - arm(rise),
                far
            )));
        }

        let mut construction = Construction::with_parts(2);
        construction.parts[0].push(section.prism(&[(apex, 0.0), (far, 0.0), (far, rise), (arm(rise), rise)], half_width)?);
        construction.parts[0].push(section.prism(&[(apex, 0.0), (arm(rise), -rise), (far, -rise), (far, 0.0)], half_width)?);
        construction.parts[1].push(section.prism(
            &[(-far, -rise), (arm(rise), -rise), (apex, 0.0), (arm(rise), rise), (-far, rise)],
            half_width,
        )?);

        construction.debug.planes.push(section.frame);
        construction.debug.points.push(section.at(0.0, apex, 0.0));
        Ok(construction)
    }
}

/// Staircase scarf: the section is split into height bands, each band cut
/// at its own riser, with optional square pins keyed across each tread.
#[derive(Debug, Clone)]
pub struct SteppedSpliceJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: SteppedSpliceConfig,
}

splice_joint!(SteppedSpliceJoint, "SteppedSpliceJoint", SteppedSpliceConfig);

impl SteppedSpliceJoint {
    /// Riser positions along the splice axis, lowest band first.
    ///
    /// Every band must be at least [`MIN_STEP_HEIGHT`] tall.
    fn risers(&self, height: f64) -> Result<Vec<f64>> {
        let steps = self.config.step_count.round();
        if !(1.0..=(height / MIN_STEP_HEIGHT).floor()).contains(&steps) {
            return Err(degenerate(format!(
                "{} steps do not fit a {} high section",
                self.config.step_count, height
            )));
        }
        let count = steps as usize;
        if count == 1 {
            return Ok(vec![0.0]);
        }
        let length = if self.config.step_length > 0.0 {
            self.config.step_length
        } else {
            height
        };
        Ok((0..count)
            .map(|j| -0.5 * length + j as f64 * length / (count - 1) as f64)
            .collect())
    }

    fn build(&self, beams: &[Beam]) -> Result<Construction> {
        let section = SpliceSection::new(beams, &self.parts)?;
        let added = self.config.added;
        let far = section.reach(added);
        let half_width = 0.5 * section.width + added;
        let across = (-half_width, half_width);

        let risers = self.risers(section.height)?;
        let count = risers.len();
        let band = section.height / count as f64;
        let floor = -0.5 * section.height;

        let mut construction = Construction::with_parts(2);
        for (j, &riser) in risers.iter().enumerate() {
            let low = if j == 0 { floor - added } else { floor + j as f64 * band };
            let high = if j + 1 == count {
                floor + section.height + added
            } else {
                floor + (j + 1) as f64 * band
            };
            construction.parts[0].push(Solid::oriented_box(&section.frame, across, (low, high), (riser, far))?);
            construction.parts[1].push(Solid::oriented_box(&section.frame, across, (low, high), (-far, riser))?);
        }

        let pin = self.config.pin_width;
        if pin > 0.0 {
            for (j, pair) in risers.windows(2).enumerate() {
                let tread = floor + (j + 1) as f64 * band;
                let middle = 0.5 * (pair[0] + pair[1]);
                let key = Solid::oriented_box(
                    &section.frame,
                    across,
                    (tread - 0.5 * pin, tread + 0.5 * pin),
                    (middle - 0.5 * pin, middle + 0.5 * pin),
                )?;
                construction.parts[0].push(key.clone());
                construction.parts[1].push(key);
            }
        }

        construction.debug.planes.push(section.frame);
        Ok(construction)
    }
}

/// Tapered, filleted tenon on part 0 housed in a blind pocket in part 1.
#[derive(Debug, Clone)]
pub struct BlindTenonSpliceJoint {
    position: Point3<f64>,
    parts: [JointPart; 2],
    pub config: BlindTenonConfig,
}

splice_joint!(BlindTenonSpliceJoint, "BlindTenonSpliceJoint", BlindTenonConfig);

impl BlindTenonSpliceJoint {
    fn outline(section: &SpliceSection, s: f64, half_width: f64, half_height: f64, radius: f64) -> Vec<Point3<f64>> {
        let corners = [
            section.at(-half_width, s, -half_height),
            section.at(half_width, s, -half_height),
            section.at(half_width, s, half_height),
            section.at(-half_width, s, half_height),
        ];
        fillet_polygon(&corners, radius, FILLET_SEGMENTS)
    }

    fn build(&self, beams: &[Beam]) -> Result<Construction> {
        let section = SpliceSection::new(beams, &self.parts)?;
        let config = &self.config;
        let added = config.added;

        let base = (0.5 * section.width - config.inset, 0.5 * section.height - config.inset);
        let tip = (base.0 - config.taper_offset, base.1 - config.taper_offset);
        if tip.0 <= 0.0 || tip.1 <= 0.0 || base.0 <= 0.0 || base.1 <= 0.0 || config.tenon_length <= 0.0 {
            return Err(degenerate(format!(
                "blind tenon tip {} x {} does not fit a {} x {} section",
                2.0 * tip.0,
                2.0 * tip.1,
                section.width,
                section.height
            )));
        }
        let radius = config.fillet_radius.min(tip.0).min(tip.1);

        let root = Self::outline(&section, 0.0, base.0, base.1, radius);
        let end = Self::outline(&section, config.tenon_length, tip.0, tip.1, radius);
        let tenon = Solid::loft(&root, &end)?;

        // Part 0 loses everything past the splice plane except the tenon
        let far = section.reach(added);
        let block = Solid::oriented_box(
            &section.frame,
            (-0.5 * section.width - added, 0.5 * section.width + added),
            (-0.5 * section.height - added, 0.5 * section.height + added),
            (0.0, far),
        )?;
        let mut faces = block.faces();
        let shoulder = faces[0].outer.clone();
        faces[0] = Face::with_holes(shoulder, vec![root]);
        faces.extend(tenon.faces().into_iter().skip(1).map(Face::reversed));
        let shoulders = Solid::from_faces(faces, WELD_TOLERANCE)?;

        let (beam_b, fb) = part_frame(beams, &self.parts[1])?;
        let mut construction = Construction::with_parts(2);
        construction.parts[0].push(shoulders);
        construction.parts[1].push(trim_box(beam_b, &fb, &section.frame, &self.parts[1].direction, added)?);
        construction.parts[1].push(tenon);

        construction.debug.planes.push(section.frame);
        Ok(construction)
    }
}
