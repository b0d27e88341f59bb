// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Joinery Core
//!
//! Joint detection, classification and construction for timber frames.
//!
//! ## Overview
//!
//! - **Case model**: every beam taking part in a joint is classified as
//!   meeting it at one of its ends or somewhere along its middle
//! - **Detection**: centreline intersections and end proximity produce raw
//!   joint conditions, merged into clusters
//! - **Classification**: part count and case pair select a joint category
//! - **Construction**: each joint variant intersects offset planes of the
//!   participating beams into closed cutting solids
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use joinery_core::{classify, detect_conditions, Beam, DetectionSettings, JointRegistry};
//!
//! let beams = vec![
//!     Beam::straight(start_a, end_a, Vector3::z(), 100.0, 200.0)?,
//!     Beam::straight(start_b, end_b, Vector3::z(), 100.0, 200.0)?,
//! ];
//! let registry = JointRegistry::with_defaults();
//!
//! for condition in detect_conditions(&beams, &DetectionSettings::default()) {
//!     let kind = classify(&condition, &Default::default())?;
//!     let name = registry.default_for(kind).unwrap();
//!     let joint = registry.create(name, &beams, &condition)?;
//!     let construction = joint.construct(&beams)?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialization support for settings and joint categories

pub mod beam;
pub mod classify;
pub mod condition;
pub mod config;
pub mod error;
pub mod joint;
pub mod part;
pub mod registry;

pub use beam::Beam;
pub use classify::{classify, ClassificationThresholds, JointKind, BRANCH_ANGLE_DEG, SPLICE_ANGLE_DEG};
pub use condition::{
    detect_conditions, detect_end_clusters, detect_pairwise, merge_conditions, ConditionPart, DetectionSettings,
    JointCondition, PARALLEL_COSINE,
};
pub use config::{
    Backcut, BirdsmouthConfig, BlindTenonConfig, ConfigMap, CornerLapConfig, CrossConfig, JunctionConfig,
    SteppedSpliceConfig, TenonConfig, TrimConfig, VariantConfig, DEFAULT_ADDED,
};
pub use error::{Error, Result};
pub use joint::{
    BirdsmouthSpliceJoint, BlindTenonSpliceJoint, BranchJoint, Construction, CornerJoint, CornerLapJoint, CrossJoint,
    DebugGeometry, FourWayJoint, Joint, SpliceJoint, SteppedSpliceJoint, TenonJoint, VBeamJoint, MAX_DOWEL_COUNT,
    MIN_STEP_HEIGHT,
};
pub use part::{classify_position, BeamEnd, JointPart, PartCase};
pub use registry::{factory, JointFactory, JointRegistry};

pub use joinery_geometry as geometry;
