// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the solving pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] joinery_core::Error),

    #[error("Invalid solver configuration: {0}")]
    Config(String),

    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Joint index {index} out of range ({count} joints)")]
    JointIndex { index: usize, count: usize },
}

impl Error {
    /// Short machine-readable code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Core(_) => "JOINT_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Json(_) => "CONFIG_JSON_ERROR",
            Error::JointIndex { .. } => "JOINT_INDEX",
        }
    }
}
