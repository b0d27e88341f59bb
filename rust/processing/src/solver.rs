// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structure-level solve: detection, classification, creation and
//! construction over a whole frame.

use std::collections::BTreeMap;
use std::time::Instant;

use joinery_core::{classify, detect_conditions, Beam, Error as CoreError, JointKind, JointRegistry};

use crate::config::SolverConfig;
use crate::error::Result;
use crate::structure::{construct_entries, JointEntry, Structure};
use crate::types::{DroppedCondition, JointFailure, SolveReport};

/// Everything a solve produces. Individual joint failures never abort the
/// solve; they are collected next to the successes.
#[derive(Debug)]
pub struct SolveOutput {
    pub structure: Structure,
    /// Creation and construction failures, ordered by condition.
    pub failures: Vec<JointFailure>,
    pub dropped: Vec<DroppedCondition>,
    pub report: SolveReport,
}

impl SolveOutput {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dropped.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    registry: JointRegistry,
}

impl Solver {
    /// Solver over the built-in joint variants.
    pub fn new(config: SolverConfig) -> Self {
        Self::with_registry(config, JointRegistry::with_defaults())
    }

    pub fn with_registry(config: SolverConfig, registry: JointRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn registry(&self) -> &JointRegistry {
        &self.registry
    }

    /// Mutable registry, for hosts registering their own variants.
    pub fn registry_mut(&mut self) -> &mut JointRegistry {
        &mut self.registry
    }

    fn variant_for(&self, kind: JointKind) -> Option<&str> {
        self.config
            .variants
            .get(&kind)
            .map(String::as_str)
            .or_else(|| self.registry.default_for(kind))
    }

    /// Solve a frame. Fails only on invalid configuration.
    pub fn solve(&self, beams: Vec<Beam>) -> Result<SolveOutput> {
        self.config.validate()?;
        let total_start = Instant::now();
        tracing::info!(beams = beams.len(), parallel = self.config.parallel, "Starting joint solve");

        // Detection and classification
        let detect_start = Instant::now();
        let conditions = detect_conditions(&beams, &self.config.detection);
        let detect_time = detect_start.elapsed();
        tracing::info!(
            conditions = conditions.len(),
            detect_time_ms = detect_time.as_millis() as u64,
            "Detection complete"
        );

        let mut structure = Structure::new(beams);
        let mut failures = Vec::new();
        let mut dropped = Vec::new();
        let mut kinds: BTreeMap<String, usize> = BTreeMap::new();

        for (index, condition) in conditions.iter().enumerate() {
            let kind = match classify(condition, &self.config.thresholds) {
                Ok(kind) => kind,
                Err(err) => {
                    tracing::warn!(
                        condition = index,
                        parts = condition.parts.len(),
                        x = condition.position.x,
                        y = condition.position.y,
                        z = condition.position.z,
                        "Dropping unresolved condition"
                    );
                    dropped.push(DroppedCondition::new(index, condition, &err));
                    continue;
                }
            };

            let Some(variant) = self.variant_for(kind) else {
                let err = CoreError::UnknownJointType(kind.as_str().to_string());
                tracing::warn!(condition = index, kind = kind.as_str(), "No joint variant for category");
                failures.push(JointFailure::creation(index, kind.as_str(), kind, condition, &err));
                continue;
            };

            match self.registry.create(variant, &structure.beams, condition) {
                Ok(mut joint) => {
                    if !self.config.overrides.is_empty() {
                        joint.configure(&self.config.overrides);
                    }
                    *kinds.entry(kind.as_str().to_string()).or_insert(0) += 1;
                    structure.joints.push(JointEntry::new(joint, index));
                }
                Err(err) => {
                    tracing::warn!(condition = index, variant, error = %err, "Joint creation failed");
                    failures.push(JointFailure::creation(index, variant, kind, condition, &err));
                }
            }
        }

        // Construction; joints only read the beams, so this phase runs in
        // parallel when enabled. Outcomes come back in joint order.
        let construct_start = Instant::now();
        let outcomes = construct_entries(&structure.beams, &structure.joints, self.config.parallel);
        let construct_time = construct_start.elapsed();

        let mut constructed = 0;
        let mut solids = 0;
        for (index, (entry, outcome)) in structure.joints.iter_mut().zip(outcomes).enumerate() {
            match outcome {
                Ok(construction) => {
                    tracing::debug!(
                        joint = index,
                        variant = entry.joint.type_name(),
                        solids = construction.solid_count(),
                        "Joint constructed"
                    );
                    constructed += 1;
                    solids += construction.solid_count();
                    entry.construction = Some(construction);
                }
                Err(err) => {
                    tracing::warn!(
                        joint = index,
                        variant = entry.joint.type_name(),
                        status = err.status_code(),
                        error = %err,
                        "Joint construction failed"
                    );
                    failures.push(JointFailure::construction(index, entry, &err));
                }
            }
        }
        failures.sort_by_key(|failure| failure.condition);

        let total_time = total_start.elapsed();
        tracing::info!(
            joints = structure.joints.len(),
            constructed,
            failed = failures.len(),
            dropped = dropped.len(),
            construct_time_ms = construct_time.as_millis() as u64,
            total_time_ms = total_time.as_millis() as u64,
            "Joint solve complete"
        );

        let report = SolveReport {
            beams: structure.beams.len(),
            conditions: conditions.len(),
            joints: structure.joints.len(),
            constructed,
            failed: failures.len(),
            dropped: dropped.len(),
            solids,
            kinds,
            detect_time_ms: detect_time.as_millis() as u64,
            construct_time_ms: construct_time.as_millis() as u64,
            total_time_ms: total_time.as_millis() as u64,
        };

        Ok(SolveOutput {
            structure,
            failures,
            dropped,
            report,
        })
    }
}

/// Solve with default settings and the given tolerances.
pub fn solve(beams: Vec<Beam>, merge_distance: f64, end_tolerance: f64, search_radius: f64) -> Result<SolveOutput> {
    Solver::new(SolverConfig::with_tolerances(merge_distance, end_tolerance, search_radius)).solve(beams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinery_core::geometry::{Point3, Vector3};

    fn beam(a: [f64; 3], b: [f64; 3]) -> Beam {
        Beam::straight(Point3::from(a), Point3::from(b), Vector3::z(), 100.0, 120.0).unwrap()
    }

    #[test]
    fn empty_frame_is_clean() {
        let output = solve(Vec::new(), 10.0, 10.0, 10.0).unwrap();
        assert!(output.is_clean());
        assert_eq!(output.report.joints, 0);
        assert!(output.structure.joints.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = SolverConfig::default();
        config.detection.search_radius = f64::NAN;
        let err = Solver::new(config).solve(vec![beam([0.0; 3], [1000.0, 0.0, 0.0])]).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn configured_variant_replaces_the_default() {
        let mut config = SolverConfig::default();
        config.variants.insert(JointKind::Cross, "CrossBackcutJoint".to_string());
        let beams = vec![
            beam([-500.0, 0.0, 0.0], [500.0, 0.0, 0.0]),
            beam([0.0, -500.0, 0.0], [0.0, 500.0, 0.0]),
        ];

        let output = Solver::new(config).solve(beams).unwrap();

        assert_eq!(output.structure.joints.len(), 1);
        assert_eq!(output.structure.joints[0].joint.type_name(), "CrossBackcutJoint");
        assert_eq!(output.report.kinds.get("Cross"), Some(&1));
    }
}
