// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solver configuration loaded from defaults, environment variables or JSON.

use std::str::FromStr;

use joinery_core::{ClassificationThresholds, ConfigMap, DetectionSettings, JointKind};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Detection tolerances.
    pub detection: DetectionSettings,
    /// Splice/branch/corner angle thresholds.
    pub thresholds: ClassificationThresholds,
    /// Variant name per category; categories not listed use the registry
    /// default.
    pub variants: FxHashMap<JointKind, String>,
    /// Configuration overrides applied to every created joint.
    pub overrides: ConfigMap,
    /// Construct joints on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            detection: DetectionSettings::default(),
            thresholds: ClassificationThresholds::default(),
            variants: FxHashMap::default(),
            overrides: ConfigMap::default(),
            parallel: true,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

impl SolverConfig {
    /// Load configuration from `JOINERY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults for
    /// missing or unparsable values.
    ///
    /// Recognised keys: `JOINERY_SEARCH_RADIUS`, `JOINERY_OVERLAP_TOLERANCE`,
    /// `JOINERY_END_TOLERANCE`, `JOINERY_MERGE_DISTANCE`,
    /// `JOINERY_PARALLEL_COSINE`, `JOINERY_SPLICE_ANGLE`,
    /// `JOINERY_BRANCH_ANGLE`, `JOINERY_PARALLEL` and `JOINERY_ADDED`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let d = defaults.detection;
        let t = defaults.thresholds;

        let mut overrides = ConfigMap::default();
        if let Some(added) = lookup("JOINERY_ADDED").and_then(|v| v.trim().parse::<f64>().ok()) {
            overrides.insert(joinery_core::config::ADDED.to_string(), added);
        }

        Self {
            detection: DetectionSettings {
                search_radius: parse_or(&lookup, "JOINERY_SEARCH_RADIUS", d.search_radius),
                overlap_tolerance: parse_or(&lookup, "JOINERY_OVERLAP_TOLERANCE", d.overlap_tolerance),
                end_tolerance: parse_or(&lookup, "JOINERY_END_TOLERANCE", d.end_tolerance),
                merge_distance: parse_or(&lookup, "JOINERY_MERGE_DISTANCE", d.merge_distance),
                parallel_cosine: parse_or(&lookup, "JOINERY_PARALLEL_COSINE", d.parallel_cosine),
            },
            thresholds: ClassificationThresholds {
                splice_angle: parse_or(&lookup, "JOINERY_SPLICE_ANGLE", t.splice_angle),
                branch_angle: parse_or(&lookup, "JOINERY_BRANCH_ANGLE", t.branch_angle),
            },
            variants: FxHashMap::default(),
            overrides,
            parallel: parse_or(&lookup, "JOINERY_PARALLEL", defaults.parallel),
        }
    }

    /// Parse configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Shortcut for the classic `(merge_distance, end_tolerance,
    /// search_radius)` entry point.
    pub fn with_tolerances(merge_distance: f64, end_tolerance: f64, search_radius: f64) -> Self {
        let mut config = Self::default();
        config.detection.merge_distance = merge_distance;
        config.detection.end_tolerance = end_tolerance;
        config.detection.search_radius = search_radius;
        config
    }

    /// Reject negative or non-finite tolerances and out-of-range angles.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        for (name, value) in [
            ("search_radius", d.search_radius),
            ("overlap_tolerance", d.overlap_tolerance),
            ("end_tolerance", d.end_tolerance),
            ("merge_distance", d.merge_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{} must be a finite, non-negative distance, got {}", name, value)));
            }
        }
        if !(0.0..=1.0).contains(&d.parallel_cosine) {
            return Err(Error::Config(format!(
                "parallel_cosine must lie in [0, 1], got {}",
                d.parallel_cosine
            )));
        }
        let t = &self.thresholds;
        for (name, value) in [("splice_angle", t.splice_angle), ("branch_angle", t.branch_angle)] {
            if !(0.0..=90.0).contains(&value) {
                return Err(Error::Config(format!("{} must lie in [0, 90] degrees, got {}", name, value)));
            }
        }
        Ok(())
    }
}
