// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joint topology classification

use std::fmt;

use crate::condition::JointCondition;
use crate::error::{Error, Result};

/// Angle below which two AtEnd beams form a splice, in degrees.
pub const SPLICE_ANGLE_DEG: f64 = 15.0;
/// Minimum deviation from perpendicular for a branch, in degrees.
pub const BRANCH_ANGLE_DEG: f64 = 30.0;

/// Joint topology category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JointKind {
    Splice,
    Corner,
    Branch,
    Tenon,
    Cross,
    VBeam,
    FourWay,
}

impl JointKind {
    pub const ALL: [JointKind; 7] = [
        JointKind::Splice,
        JointKind::Corner,
        JointKind::Branch,
        JointKind::Tenon,
        JointKind::Cross,
        JointKind::VBeam,
        JointKind::FourWay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JointKind::Splice => "Splice",
            JointKind::Corner => "Corner",
            JointKind::Branch => "Branch",
            JointKind::Tenon => "Tenon",
            JointKind::Cross => "Cross",
            JointKind::VBeam => "VBeam",
            JointKind::FourWay => "FourWay",
        }
    }

    /// Number of parts a joint of this kind takes.
    pub fn part_count(&self) -> usize {
        match self {
            JointKind::VBeam => 3,
            JointKind::FourWay => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angle thresholds separating splice, branch and corner joints.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassificationThresholds {
    /// Degrees.
    pub splice_angle: f64,
    /// Degrees.
    pub branch_angle: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            splice_angle: SPLICE_ANGLE_DEG,
            branch_angle: BRANCH_ANGLE_DEG,
        }
    }
}

impl ClassificationThresholds {
    /// Category for two AtEnd parts whose directions have dot product `dot`.
    ///
    /// With `c = |dot|`: `c >= cos(splice_angle)` is a splice, otherwise
    /// `c >= sin(branch_angle)` is a branch, otherwise a corner. Both
    /// boundaries belong to the more parallel category.
    pub fn end_to_end(&self, dot: f64) -> JointKind {
        let c = dot.abs();
        if c >= self.splice_angle.to_radians().cos() {
            JointKind::Splice
        } else if c >= self.branch_angle.to_radians().sin() {
            JointKind::Branch
        } else {
            JointKind::Corner
        }
    }
}

/// Classify a merged condition by part count and case pair.
pub fn classify(condition: &JointCondition, thresholds: &ClassificationThresholds) -> Result<JointKind> {
    match condition.parts.as_slice() {
        [a, b] => Ok(match (a.case.is_at_end(), b.case.is_at_end()) {
            (true, true) => thresholds.end_to_end(a.direction.dot(&b.direction)),
            (false, false) => JointKind::Cross,
            _ => JointKind::Tenon,
        }),
        [_, _, _] => Ok(JointKind::VBeam),
        [_, _, _, _] => Ok(JointKind::FourWay),
        parts => Err(Error::UnresolvedCondition(parts.len())),
    }
}
