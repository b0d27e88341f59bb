// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable outcome records of a solve.

use std::collections::BTreeMap;

use joinery_core::{JointCondition, JointKind};
use joinery_geometry::Point3;
use serde::{Deserialize, Serialize};

use crate::structure::JointEntry;

fn coords(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// A joint that could not be created or constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointFailure {
    /// Index into the merged condition list.
    pub condition: usize,
    /// Index into `Structure::joints`; `None` when creation failed.
    pub joint: Option<usize>,
    /// Variant name that was requested.
    pub variant: String,
    pub kind: JointKind,
    pub position: [f64; 3],
    pub elements: Vec<usize>,
    /// Non-zero status of the error.
    pub status: i32,
    pub message: String,
}

impl JointFailure {
    /// Failure to create a joint from a classified condition.
    pub(crate) fn creation(
        condition_index: usize,
        variant: &str,
        kind: JointKind,
        condition: &JointCondition,
        error: &joinery_core::Error,
    ) -> Self {
        Self {
            condition: condition_index,
            joint: None,
            variant: variant.to_string(),
            kind,
            position: coords(&condition.position),
            elements: condition.elements().collect(),
            status: error.status_code(),
            message: error.to_string(),
        }
    }

    /// Failure to construct a created joint.
    pub(crate) fn construction(joint_index: usize, entry: &JointEntry, error: &joinery_core::Error) -> Self {
        Self {
            condition: entry.condition,
            joint: Some(joint_index),
            variant: entry.joint.type_name().to_string(),
            kind: entry.joint.kind(),
            position: coords(&entry.joint.position()),
            elements: entry.joint.parts().iter().map(|p| p.element).collect(),
            status: error.status_code(),
            message: error.to_string(),
        }
    }
}

/// A merged condition that no joint category accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedCondition {
    pub condition: usize,
    pub position: [f64; 3],
    pub elements: Vec<usize>,
    pub status: i32,
    pub reason: String,
}

impl DroppedCondition {
    pub(crate) fn new(condition_index: usize, condition: &JointCondition, error: &joinery_core::Error) -> Self {
        Self {
            condition: condition_index,
            position: coords(&condition.position),
            elements: condition.elements().collect(),
            status: error.status_code(),
            reason: error.to_string(),
        }
    }
}

/// Counts and timings of one solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub beams: usize,
    /// Merged conditions found by detection.
    pub conditions: usize,
    /// Joints created, whether or not construction succeeded.
    pub joints: usize,
    pub constructed: usize,
    pub failed: usize,
    pub dropped: usize,
    /// Total cutting solids across all joints.
    pub solids: usize,
    /// Created joints per category name.
    pub kinds: BTreeMap<String, usize>,
    pub detect_time_ms: u64,
    pub construct_time_ms: u64,
    pub total_time_ms: u64,
}

impl SolveReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
