// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for joint detection and construction
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while classifying or constructing joints
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A plane intersection or shell stitch failed.
    #[error(transparent)]
    Geometry(#[from] joinery_geometry::Error),

    /// A variant was handed a part count or case combination it cannot build.
    #[error("Invalid topology for {joint}: {reason}")]
    InvalidTopology { joint: String, reason: String },

    #[error("Unknown joint type: {0}")]
    UnknownJointType(String),

    /// A condition with a part count outside 2..=4.
    #[error("Unresolved condition with {0} parts")]
    UnresolvedCondition(usize),

    #[error("Beam index {index} out of range ({count} beams)")]
    BeamIndex { index: usize, count: usize },
}

impl Error {
    pub(crate) fn topology(joint: &str, reason: impl Into<String>) -> Self {
        Error::InvalidTopology {
            joint: joint.to_string(),
            reason: reason.into(),
        }
    }

    /// Non-zero status code reported for a failed construction.
    pub fn status_code(&self) -> i32 {
        use joinery_geometry::Error as GeometryError;

        match self {
            Error::Geometry(GeometryError::DegenerateGeometry(_)) => 1,
            Error::Geometry(GeometryError::DegenerateFace(_)) => 2,
            Error::Geometry(GeometryError::OpenShell(_)) => 3,
            Error::Geometry(GeometryError::EmptyCurve(_)) => 4,
            Error::Geometry(GeometryError::TriangulationError(_)) => 5,
            Error::InvalidTopology { .. } => 10,
            Error::UnknownJointType(_) => 11,
            Error::UnresolvedCondition(_) => 12,
            Error::BeamIndex { .. } => 13,
        }
    }
}
