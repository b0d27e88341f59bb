// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building joint geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Planes or lines are (nearly) parallel, so the requested intersection
    /// does not exist or is ill-conditioned.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A face has fewer than three distinct corners or no area.
    #[error("Degenerate face: {0}")]
    DegenerateFace(String),

    /// A stitched shell still has boundary edges.
    #[error("Shell is not closed: {0} naked edges remain")]
    OpenShell(usize),

    /// A curve has no usable span.
    #[error("Empty curve: {0}")]
    EmptyCurve(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),
}

impl Error {
    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }
}
