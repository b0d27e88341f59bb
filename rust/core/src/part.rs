// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Which end of a beam a joint touches, and whether it touches it at all.
//!
//! A [`PartCase`] is a two-bit mask: bit 0 selects End1 over End0 and bit 1
//! marks the intersection as lying within the end tolerance (AtEnd). A part
//! that is not AtEnd is AtMiddle, and its end bit is always cleared so that
//! End0/End1 only carries information for AtEnd parts.

use std::fmt;

use joinery_geometry::{Curve, Vector3};

/// Beam end nearest to a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BeamEnd {
    End0,
    End1,
}

/// Case bitmask of a joint part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartCase(u8);

impl PartCase {
    pub const END1: u8 = 0b01;
    pub const AT_END: u8 = 0b10;

    pub const AT_MIDDLE: PartCase = PartCase(0);
    pub const AT_END0: PartCase = PartCase(Self::AT_END);
    pub const AT_END1: PartCase = PartCase(Self::AT_END | Self::END1);

    /// Canonicalise raw bits; the end bit is dropped unless AtEnd is set.
    pub fn from_bits(bits: u8) -> Self {
        if bits & Self::AT_END != 0 {
            PartCase(bits & (Self::AT_END | Self::END1))
        } else {
            Self::AT_MIDDLE
        }
    }

    pub fn at_end(end: BeamEnd) -> Self {
        match end {
            BeamEnd::End0 => Self::AT_END0,
            BeamEnd::End1 => Self::AT_END1,
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_at_end(self) -> bool {
        self.0 & Self::AT_END != 0
    }

    #[inline]
    pub fn is_at_middle(self) -> bool {
        !self.is_at_end()
    }

    /// The beam end, defined only for AtEnd parts.
    pub fn end(self) -> Option<BeamEnd> {
        match self.0 {
            b if b == Self::AT_END0.0 => Some(BeamEnd::End0),
            b if b == Self::AT_END1.0 => Some(BeamEnd::End1),
            _ => None,
        }
    }
}

impl fmt::Display for PartCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(BeamEnd::End0) => write!(f, "AtEnd0"),
            Some(BeamEnd::End1) => write!(f, "AtEnd1"),
            None => write!(f, "AtMiddle"),
        }
    }
}

/// One beam's participation in a joint.
///
/// Geometry is not stored here; constructions return it per part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPart {
    /// Index of the beam in the structure.
    pub element: usize,
    pub case: PartCase,
    /// Centreline parameter of the joint on this beam.
    pub parameter: f64,
    /// Unit tangent at `parameter`, pointing away from the beam's midpoint.
    pub direction: Vector3<f64>,
}

impl JointPart {
    /// Classify a beam's participation at `parameter`.
    pub fn classify(element: usize, curve: &dyn Curve, parameter: f64, end_tolerance: f64) -> Self {
        let (case, direction) = classify_position(curve, parameter, end_tolerance);
        Self {
            element,
            case,
            parameter,
            direction,
        }
    }
}

/// Classify a centreline parameter as AtEnd0/AtEnd1/AtMiddle.
///
/// The nearer end is decided at the mid-parameter (an exact tie goes to
/// End0). The part is AtEnd when the arc length to that end is strictly
/// below `end_tolerance`. The returned direction is the unit tangent flipped
/// to point away from the curve's midpoint.
pub fn classify_position(curve: &dyn Curve, parameter: f64, end_tolerance: f64) -> (PartCase, Vector3<f64>) {
    let (t0, t1) = curve.domain();
    let mid = 0.5 * (t0 + t1);
    let tangent = curve.tangent_at(parameter);

    let (end, distance, direction) = if parameter > mid {
        (BeamEnd::End1, curve.length_between(parameter, t1), tangent)
    } else {
        (BeamEnd::End0, curve.length_between(t0, parameter), -tangent)
    };

    let case = if distance < end_tolerance {
        PartCase::at_end(end)
    } else {
        PartCase::AT_MIDDLE
    };

    (case, direction)
}
