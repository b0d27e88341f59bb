// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Three- and four-way junctions of beam ends
//!
//! The beams are ordered around the junction axis. Every adjacent pair is
//! separated by a dividing plane and each beam is trimmed against the planes
//! shared with its two neighbours only. A plate placeholder sits on the
//! junction axis, centred on the mean of the beam end points.

use joinery_geometry::{closest_points_between_lines, interpolate, Plane, Point3, Solid, Vector3};

use super::{beam_of, check_parts, closest_axis, degenerate, part_frame, trim_box};
use super::{Construction, Joint};
use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::{ConfigMap, JunctionConfig, VariantConfig};
use crate::error::{Error, Result};
use crate::part::JointPart;

const PLATE_SEGMENTS: usize = 32;

fn junction_parts(joint: &str, beams: &[Beam], condition: &JointCondition, count: usize) -> Result<Vec<JointPart>> {
    check_parts(joint, beams, condition, count)?;
    if let Some(part) = condition.parts.iter().find(|p| !p.case.is_at_end()) {
        return Err(Error::topology(
            joint,
            format!("beam {} meets the junction {}", part.element, part.case),
        ));
    }
    Ok(condition.parts.to_vec())
}

/// Axis of the junction: the largest cross product of any two directions.
fn junction_axis(parts: &[JointPart]) -> Result<Vector3<f64>> {
    let mut best = Vector3::zeros();
    for (i, a) in parts.iter().enumerate() {
        for b in &parts[i + 1..] {
            let cross = a.direction.cross(&b.direction);
            if cross.norm() > best.norm() {
                best = cross;
            }
        }
    }
    if best.norm() < 1e-9 {
        return Err(degenerate("junction beams are all parallel"));
    }
    Ok(best.normalize())
}

/// Part indices in angular order about `axis`.
fn angular_order(parts: &[JointPart], axis: &Vector3<f64>) -> Vec<usize> {
    let flatten = |v: &Vector3<f64>| v - axis * v.dot(axis);
    let reference = flatten(&parts[0].direction);
    let angles: Vec<f64> = parts
        .iter()
        .map(|p| {
            let d = flatten(&p.direction);
            axis.dot(&reference.cross(&d)).atan2(reference.dot(&d))
        })
        .collect();

    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|&i, &j| angles[i].total_cmp(&angles[j]).then(i.cmp(&j)));
    order
}

fn dividing_plane(beams: &[Beam], a: &JointPart, b: &JointPart) -> Result<Plane> {
    let (beam_a, fa) = part_frame(beams, a)?;
    let (beam_b, fb) = part_frame(beams, b)?;

    let side_a = closest_axis(&fa, &b.direction);
    let side_b = closest_axis(&fb, &a.direction);
    let mut normal = side_b.direction - side_a.direction;
    if normal.norm() < 1e-9 {
        normal = a.direction - b.direction;
    }
    if normal.norm() < 1e-9 {
        return Err(degenerate(format!(
            "beams {} and {} meet head on inside a junction",
            a.element, b.element
        )));
    }
    if normal.dot(&a.direction) < 0.0 {
        normal = -normal;
    }

    let (wa, wb) = (side_a.depth(beam_a), side_b.depth(beam_b));
    let origin = match closest_points_between_lines(&fa.origin, &a.direction, &fb.origin, &b.direction) {
        Some((s, t)) => interpolate(&(fa.origin + a.direction * s), &(fb.origin + b.direction * t), wa / (wa + wb)),
        None => nalgebra::center(&fa.origin, &fb.origin),
    };
    Ok(Plane::from_normal(origin, normal))
}

/// Mean of the part frame origins.
fn junction_centre(beams: &[Beam], parts: &[JointPart]) -> Result<Point3<f64>> {
    let mut sum = Vector3::zeros();
    for part in parts {
        sum += part_frame(beams, part)?.1.origin.coords;
    }
    Ok(Point3::from(sum / parts.len() as f64))
}

fn build_junction(beams: &[Beam], parts: &[JointPart], config: &JunctionConfig) -> Result<Construction> {
    let axis = junction_axis(parts)?;
    let order = angular_order(parts, &axis);
    let count = order.len();

    // planes[k] divides order[k] from order[k + 1]
    let planes = (0..count)
        .map(|k| dividing_plane(beams, &parts[order[k]], &parts[order[(k + 1) % count]]))
        .collect::<Result<Vec<Plane>>>()?;

    let mut construction = Construction::with_parts(count);
    for (k, &slot) in order.iter().enumerate() {
        let part = &parts[slot];
        let (beam, frame) = part_frame(beams, part)?;
        for plane in [&planes[(k + count - 1) % count], &planes[k]] {
            construction.parts[slot].push(trim_box(beam, &frame, plane, &part.direction, config.added)?);
        }
    }

    let diameter = if config.plate_diameter > 0.0 {
        config.plate_diameter
    } else {
        parts
            .iter()
            .map(|p| beam_of(beams, p).map(Beam::max_dimension))
            .collect::<Result<Vec<f64>>>()?
            .into_iter()
            .fold(0.0, f64::max)
    };
    let thickness = config.plate_thickness;
    let centre = junction_centre(beams, parts)?;
    let base = Plane::from_normal(centre - axis * (0.5 * thickness), axis);
    construction
        .junction
        .push(Solid::cylinder(&base, 0.5 * diameter, thickness, PLATE_SEGMENTS)?);

    construction.debug.planes.extend(planes);
    construction.debug.points.push(centre);
    Ok(construction)
}

macro_rules! junction_joint {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $kind:expr, $count:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            position: Point3<f64>,
            parts: Vec<JointPart>,
            pub config: JunctionConfig,
        }

        impl $ty {
            pub const NAME: &'static str = $name;

            pub fn new(beams: &[Beam], condition: &JointCondition) -> Result<Self> {
                Ok(Self {
                    position: condition.position,
                    parts: junction_parts(Self::NAME, beams, condition, $count)?,
                    config: JunctionConfig::default(),
                })
            }
        }

        impl Joint for $ty {
            fn type_name(&self) -> &'static str {
                Self::NAME
            }

            fn kind(&self) -> JointKind {
                $kind
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
                build_junction(beams, &self.parts, &self.config)
            }
        }
    };
}

junction_joint!(
    /// Three beam ends converging on one point.
    VBeamJoint,
    "VBeamJoint",
    JointKind::VBeam,
    3
);

junction_joint!(
    /// Four beam ends converging on one point.
    FourWayJoint,
    "FourWayJoint",
    JointKind::FourWay,
    4
);
