// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joint condition detection and merging
//!
//! Detection runs in two passes: a pairwise curve–curve intersection scan
//! over every beam pair, and an endpoint-proximity pass that pairs beam ends
//! lying within the search radius. Both feed one stable merge that clusters
//! conditions closer than the merge distance.

use joinery_geometry::{intersect_curves, Curve, Point3};
use smallvec::SmallVec;

use crate::beam::Beam;
use crate::part::{JointPart, PartCase};

/// Tangent dot product above which two AtMiddle parts count as running
/// alongside each other.
pub const PARALLEL_COSINE: f64 = 0.95;

/// Minimal part record carried by a condition.
pub type ConditionPart = JointPart;

/// Raw, pre-classification record of beams meeting at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct JointCondition {
    pub position: Point3<f64>,
    pub parts: SmallVec<[ConditionPart; 4]>,
}

impl JointCondition {
    pub fn new(position: Point3<f64>, parts: impl IntoIterator<Item = ConditionPart>) -> Self {
        Self {
            position,
            parts: parts.into_iter().collect(),
        }
    }

    /// Add parts not already present, keyed by `(element, case)`.
    pub fn absorb(&mut self, parts: &[ConditionPart]) {
        for part in parts {
            let present = self
                .parts
                .iter()
                .any(|p| p.element == part.element && p.case == part.case);
            if !present {
                self.parts.push(*part);
            }
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = usize> + '_ {
        self.parts.iter().map(|p| p.element)
    }
}

/// Detection tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectionSettings {
    /// Near-miss distance for curve–curve and end–end hits.
    pub search_radius: f64,
    /// Minimum shared length for two parallel curves to report an overlap.
    pub overlap_tolerance: f64,
    /// Arc length from an end below which a part is AtEnd.
    pub end_tolerance: f64,
    /// Conditions closer than this are merged.
    pub merge_distance: f64,
    pub parallel_cosine: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            search_radius: 10.0,
            overlap_tolerance: 1.0,
            end_tolerance: 10.0,
            merge_distance: 10.0,
            parallel_cosine: PARALLEL_COSINE,
        }
    }
}

/// Intersect every beam pair's centrelines and classify both participants.
///
/// Two AtMiddle parts whose tangents are nearly parallel are demoted to
/// AtEnd0, so beams that merely run alongside each other never read as a
/// cross-lap.
pub fn detect_pairwise(beams: &[Beam], settings: &DetectionSettings) -> Vec<JointCondition> {
    let mut conditions = Vec::new();

    for (i, a) in beams.iter().enumerate() {
        for (j, b) in beams.iter().enumerate().skip(i + 1) {
            let hits = intersect_curves(
                a.centreline.as_ref(),
                b.centreline.as_ref(),
                settings.search_radius,
                settings.overlap_tolerance,
            );

            for hit in hits {
                let mut part_a = JointPart::classify(i, a.centreline.as_ref(), hit.parameter_a, settings.end_tolerance);
                let mut part_b = JointPart::classify(j, b.centreline.as_ref(), hit.parameter_b, settings.end_tolerance);

                if part_a.case.is_at_middle()
                    && part_b.case.is_at_middle()
                    && part_a.direction.dot(&part_b.direction).abs() > settings.parallel_cosine
                {
                    part_a.case = PartCase::AT_END0;
                    part_b.case = PartCase::AT_END0;
                }

                conditions.push(JointCondition::new(hit.position(), [part_a, part_b]));
            }
        }
    }

    conditions
}

/// Pair beam ends that lie within the search radius of each other.
///
/// Each pair yields a condition at the average of the two end points; a
/// three- or four-way junction surfaces as several such pairs that the merge
/// then clusters.
pub fn detect_end_clusters(beams: &[Beam], settings: &DetectionSettings) -> Vec<JointCondition> {
    let ends: Vec<(usize, f64, Point3<f64>)> = beams
        .iter()
        .enumerate()
        .flat_map(|(index, beam)| {
            let curve: &dyn Curve = beam.centreline.as_ref();
            let (t0, t1) = curve.domain();
            [(index, t0, curve.point_at(t0)), (index, t1, curve.point_at(t1))]
        })
        .collect();

    let mut conditions = Vec::new();
    for (k, &(ia, ta, pa)) in ends.iter().enumerate() {
        for &(ib, tb, pb) in ends.iter().skip(k + 1) {
            if ia == ib || (pa - pb).norm() >= settings.search_radius {
                continue;
            }
            let part_a = JointPart::classify(ia, beams[ia].centreline.as_ref(), ta, settings.end_tolerance);
            let part_b = JointPart::classify(ib, beams[ib].centreline.as_ref(), tb, settings.end_tolerance);
            conditions.push(JointCondition::new(nalgebra::center(&pa, &pb), [part_a, part_b]));
        }
    }

    conditions
}

/// Cluster conditions closer than `merge_distance`.
///
/// Conditions are visited in discovery order; each unabsorbed condition
/// absorbs every later one within `merge_distance` of its own (kept)
/// position, unioning parts by `(element, case)`. Passes repeat until
/// nothing changes, so merging an already merged list is a no-op.
pub fn merge_conditions(conditions: Vec<JointCondition>, merge_distance: f64) -> Vec<JointCondition> {
    let mut current = conditions;

    loop {
        let mut absorbed = vec![false; current.len()];
        let mut merged = Vec::with_capacity(current.len());
        let mut changed = false;

        for i in 0..current.len() {
            if absorbed[i] {
                continue;
            }
            let mut cluster = current[i].clone();
            for j in (i + 1)..current.len() {
                if absorbed[j] {
                    continue;
                }
                if (current[j].position - cluster.position).norm() < merge_distance {
                    cluster.absorb(&current[j].parts);
                    absorbed[j] = true;
                    changed = true;
                }
            }
            merged.push(cluster);
        }

        current = merged;
        if !changed {
            return current;
        }
    }
}

/// Full detection: pairwise hits, end clusters, then one merge.
pub fn detect_conditions(beams: &[Beam], settings: &DetectionSettings) -> Vec<JointCondition> {
    let mut conditions = detect_pairwise(beams, settings);
    conditions.extend(detect_end_clusters(beams, settings));
    let raw = conditions.len();

    let merged = merge_conditions(conditions, settings.merge_distance);
    tracing::debug!(beams = beams.len(), raw, merged = merged.len(), "Detected joint conditions");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinery_geometry::Vector3;

    fn beam(a: [f64; 3], b: [f64; 3]) -> Beam {
        Beam::straight(Point3::from(a), Point3::from(b), Vector3::z(), 100.0, 200.0).unwrap()
    }

    #[test]
    fn crossing_beams_meet_in_their_middles() {
        let beams = [
            beam([-500.0, 0.0, 0.0], [500.0, 0.0, 0.0]),
            beam([0.0, -500.0, 0.0], [0.0, 500.0, 0.0]),
        ];

        let conditions = detect_conditions(&beams, &DetectionSettings::default());
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].parts.len(), 2);
        assert!(conditions[0].parts.iter().all(|p| p.case.is_at_middle()));
    }

    #[test]
    fn parallel_middles_are_demoted() {
        let beams = [
            beam([0.0, 0.0, 0.0], [1000.0, 0.0, 0.0]),
            beam([200.0, 0.5, 0.0], [800.0, 0.5, 0.0]),
        ];

        let conditions = detect_pairwise(&beams, &DetectionSettings::default());
        assert_eq!(conditions.len(), 1);
        assert!(conditions[0].parts.iter().all(|p| p.case == PartCase::AT_END0));
    }

    #[test]
    fn three_ends_cluster_into_one_condition() {
        let beams = [
            beam([-1000.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            beam([0.0, 0.0, 0.0], [500.0, 866.0, 0.0]),
            beam([0.0, 0.0, 0.0], [500.0, -866.0, 0.0]),
        ];

        let conditions = detect_conditions(&beams, &DetectionSettings::default());
        assert_eq!(conditions.len(), 1);

        let mut elements: Vec<usize> = conditions[0].elements().collect();
        elements.sort_unstable();
        assert_eq!(elements, vec![0, 1, 2]);
        assert!(conditions[0].parts.iter().all(|p| p.case.is_at_end()));
    }

    #[test]
    fn merge_keeps_first_position_and_is_idempotent() {
        let part = |element, case| JointPart {
            element,
            case,
            parameter: 0.0,
            direction: Vector3::x(),
        };
        let conditions = vec![
            JointCondition::new(Point3::new(0.0, 0.0, 0.0), [part(0, PartCase::AT_END1), part(1, PartCase::AT_END0)]),
            JointCondition::new(Point3::new(3.0, 0.0, 0.0), [part(1, PartCase::AT_END0), part(2, PartCase::AT_END0)]),
            JointCondition::new(Point3::new(100.0, 0.0, 0.0), [part(3, PartCase::AT_MIDDLE), part(4, PartCase::AT_MIDDLE)]),
        ];

        let once = merge_conditions(conditions, 5.0);
        assert_eq!(once.len(), 2);
        assert_eq!(once[0].position, Point3::origin());
        assert_eq!(once[0].parts.len(), 3);

        let twice = merge_conditions(once.clone(), 5.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_distance_is_strict() {
        let part = JointPart {
            element: 0,
            case: PartCase::AT_MIDDLE,
            parameter: 0.0,
            direction: Vector3::x(),
        };
        let conditions = vec![
            JointCondition::new(Point3::origin(), [part]),
            JointCondition::new(Point3::new(5.0, 0.0, 0.0), [part]),
        ];
        assert_eq!(merge_conditions(conditions, 5.0).len(), 2);
    }
}
