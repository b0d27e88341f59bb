// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joint contract and the plane arithmetic shared by every variant
//!
//! Each variant reads the frames of its beams at the stored part
//! parameters, picks the frame axes facing the other beams, offsets side
//! planes by half a section dimension plus clearance, and intersects triples
//! of planes into the corners of its cutting solids.

mod branch;
mod corner;
mod cross;
mod junction;
mod splice;
mod tenon;

pub use branch::BranchJoint;
pub use corner::{CornerJoint, CornerLapJoint};
pub use cross::CrossJoint;
pub use junction::{FourWayJoint, VBeamJoint};
pub use splice::{BirdsmouthSpliceJoint, BlindTenonSpliceJoint, SpliceJoint, SteppedSpliceJoint, MIN_STEP_HEIGHT};
pub use tenon::TenonJoint;

use std::fmt::Debug;

use joinery_geometry::{
    intersect_three_planes, Error as GeometryError, Frame, Line, Plane, Point3, Solid, Vector3,
};

use crate::beam::Beam;
use crate::condition::JointCondition;
use crate::config::ConfigMap;
use crate::classify::JointKind;
use crate::error::{Error, Result};
use crate::part::JointPart;

/// A configured joint between two to four beams.
///
/// `construct` is pure: it reads the beams and returns fresh geometry on
/// every call, so joints can be constructed in parallel.
pub trait Joint: Send + Sync + Debug {
    /// Registry name of the variant.
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> JointKind;

    fn position(&self) -> Point3<f64>;

    fn parts(&self) -> &[JointPart];

    /// Apply recognised overrides; unknown keys are ignored.
    fn configure(&mut self, values: &ConfigMap);

    /// Current configuration as a key/value map.
    fn configuration(&self) -> ConfigMap;

    fn construct(&self, beams: &[Beam]) -> Result<Construction>;
}

/// Auxiliary geometry for visualization tooling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugGeometry {
    pub planes: Vec<Plane>,
    pub points: Vec<Point3<f64>>,
    pub lines: Vec<Line>,
}

/// Result of constructing one joint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Construction {
    /// Cutting solids per part, in part order.
    pub parts: Vec<Vec<Solid>>,
    /// Shared geometry not owned by one beam (junction plates).
    pub junction: Vec<Solid>,
    pub debug: DebugGeometry,
}

impl Construction {
    pub fn with_parts(count: usize) -> Self {
        Self {
            parts: vec![Vec::new(); count],
            ..Self::default()
        }
    }

    pub fn solid_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum::<usize>() + self.junction.len()
    }
}

/// Frame axis facing a reference direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SideAxis {
    /// Frame x or y, signed to point along the reference.
    pub direction: Vector3<f64>,
    pub along_width: bool,
}

impl SideAxis {
    /// Full section dimension along this axis.
    pub fn depth(&self, beam: &Beam) -> f64 {
        beam.dimension(self.along_width)
    }

    pub fn half(&self, beam: &Beam) -> f64 {
        0.5 * self.depth(beam)
    }

    /// The other in-plane frame axis, unsigned.
    pub fn other(&self, frame: &Frame) -> SideAxis {
        SideAxis {
            direction: if self.along_width { frame.y_axis } else { frame.x_axis },
            along_width: !self.along_width,
        }
    }

    /// Face plane at `offset` along this axis, facing along it.
    pub fn plane(&self, frame: &Frame, offset: f64) -> Plane {
        Plane::from_normal(frame.origin + self.direction * offset, self.direction)
    }
}

/// Pick whichever of the frame's x and y axes is more aligned with
/// `reference`, signed to point along it.
pub(crate) fn closest_axis(frame: &Frame, reference: &Vector3<f64>) -> SideAxis {
    let dx = frame.x_axis.dot(reference);
    let dy = frame.y_axis.dot(reference);
    let (axis, dot, along_width) = if dx.abs() >= dy.abs() {
        (frame.x_axis, dx, true)
    } else {
        (frame.y_axis, dy, false)
    };
    SideAxis {
        direction: if dot < 0.0 { -axis } else { axis },
        along_width,
    }
}

/// Hexahedron bounded by three pairs of planes.
///
/// Corner `(i, j, k)` is the intersection of `a[i]`, `b[j]` and `c[k]`.
pub(crate) fn hexahedron_from_planes(a: [&Plane; 2], b: [&Plane; 2], c: [&Plane; 2]) -> Result<Solid> {
    let corner = |i: usize, j: usize, k: usize| intersect_three_planes(a[i], b[j], c[k]);
    let ring = |k: usize| -> Result<[Point3<f64>; 4]> {
        Ok([corner(0, 0, k)?, corner(1, 0, k)?, corner(1, 1, k)?, corner(0, 1, k)?])
    };
    Ok(Solid::hexahedron(ring(0)?, ring(1)?)?)
}

/// Pair of planes bounding a beam side at `±(half + added)` along `axis`.
pub(crate) fn side_planes(frame: &Frame, axis: &SideAxis, half: f64) -> [Plane; 2] {
    [axis.plane(frame, -half), axis.plane(frame, half)]
}

/// Cutter removing a beam's material beyond `cut` on the `direction` side.
///
/// The box spans the section plus `added` on every side and reaches far
/// enough past the cut to clear the beam end.
pub(crate) fn trim_box(
    beam: &Beam,
    frame: &Frame,
    cut: &Plane,
    direction: &Vector3<f64>,
    added: f64,
) -> Result<Solid> {
    let normal = if cut.normal.dot(direction) < 0.0 {
        -cut.normal
    } else {
        cut.normal
    };
    let near = Plane::from_normal(cut.origin, normal);
    let reach = 2.0 * (beam.width + beam.height) + added;
    let far = near.offset(reach);

    let width = SideAxis {
        direction: frame.x_axis,
        along_width: true,
    };
    let height = width.other(frame);
    let xs = side_planes(frame, &width, 0.5 * beam.width + added);
    let ys = side_planes(frame, &height, 0.5 * beam.height + added);

    hexahedron_from_planes([&xs[0], &xs[1]], [&ys[0], &ys[1]], [&near, &far])
}

/// Dowel bore centred on `centre`, running along `axis`.
pub(crate) fn dowel(centre: &Point3<f64>, axis: &Vector3<f64>, diameter: f64, length: f64) -> Result<Solid> {
    let axis = axis.normalize();
    let base = Plane::from_normal(centre - axis * (0.5 * length), axis);
    Ok(Solid::cylinder(&base, 0.5 * diameter, length, DOWEL_SEGMENTS)?)
}

pub(crate) const DOWEL_SEGMENTS: usize = 16;

/// Most bores in one dowel row.
pub const MAX_DOWEL_COUNT: usize = 16;

/// Row of `count` dowel bores through `centre`, spaced `spacing` apart along
/// `side` and each running along `axis`. The row is centred on `centre`.
pub(crate) fn dowel_row(
    centre: &Point3<f64>,
    axis: &Vector3<f64>,
    side: &Vector3<f64>,
    diameter: f64,
    length: f64,
    count: f64,
    spacing: f64,
) -> Result<Vec<Solid>> {
    let count = count.round();
    if !(1.0..=MAX_DOWEL_COUNT as f64).contains(&count) {
        return Err(degenerate(format!("dowel count {} outside 1..={}", count, MAX_DOWEL_COUNT)));
    }
    let count = count as usize;
    if count > 1 && spacing < diameter {
        return Err(degenerate(format!(
            "dowels {} across overlap at spacing {}",
            diameter, spacing
        )));
    }

    // side projected into the plane square to the bores
    let axis = axis.normalize();
    let side = side - axis * side.dot(&axis);
    if side.norm() < 1e-9 {
        return Err(degenerate("dowel row runs along the bores"));
    }
    let side = side.normalize();

    let middle = 0.5 * (count - 1) as f64;
    (0..count)
        .map(|i| dowel(&(centre + side * ((i as f64 - middle) * spacing)), &axis, diameter, length))
        .collect()
}

pub(crate) fn degenerate(message: impl Into<String>) -> Error {
    Error::Geometry(GeometryError::DegenerateGeometry(message.into()))
}

/// Look up the beam a part refers to.
pub(crate) fn beam_of<'a>(beams: &'a [Beam], part: &JointPart) -> Result<&'a Beam> {
    beams.get(part.element).ok_or(Error::BeamIndex {
        index: part.element,
        count: beams.len(),
    })
}

/// Frame of a part's beam at the part parameter.
pub(crate) fn part_frame<'a>(beams: &'a [Beam], part: &JointPart) -> Result<(&'a Beam, Frame)> {
    let beam = beam_of(beams, part)?;
    Ok((beam, beam.frame_at(part.parameter)))
}

/// Validate a condition's part count and every element index.
pub(crate) fn check_parts(
    joint: &str,
    beams: &[Beam],
    condition: &JointCondition,
    count: usize,
) -> Result<()> {
    if condition.parts.len() != count {
        return Err(Error::topology(
            joint,
            format!("expected {} parts, got {}", count, condition.parts.len()),
        ));
    }
    for part in &condition.parts {
        beam_of(beams, part)?;
    }
    Ok(())
}

/// Two-part joints with both parts AtEnd.
pub(crate) fn end_to_end_parts(
    joint: &str,
    beams: &[Beam],
    condition: &JointCondition,
) -> Result<[JointPart; 2]> {
    check_parts(joint, beams, condition, 2)?;
    let [a, b] = [condition.parts[0], condition.parts[1]];
    if !(a.case.is_at_end() && b.case.is_at_end()) {
        return Err(Error::topology(joint, format!("needs two AtEnd parts, got {} and {}", a.case, b.case)));
    }
    Ok([a, b])
}
