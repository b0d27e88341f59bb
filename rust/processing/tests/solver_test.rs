// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end solves over small frames.

use approx::assert_relative_eq;
use joinery_core::config::{BLIND_OFFSET, INSET, STEP_COUNT};
use joinery_core::geometry::{Point3, Vector3};
use joinery_core::{Beam, ConfigMap, JointKind};
use joinery_processing::{solve, SolveOutput, SolveReport, Solver, SolverConfig};

fn beam(a: [f64; 3], b: [f64; 3], orientation: Vector3<f64>) -> Beam {
    Beam::straight(Point3::from(a), Point3::from(b), orientation, 100.0, 200.0).unwrap()
}

/// Two 100 × 200 beams crossing square in their middles.
fn crossing() -> Vec<Beam> {
    vec![
        beam([-500.0, 0.0, 0.0], [500.0, 0.0, 0.0], Vector3::y()),
        beam([0.0, -500.0, 0.0], [0.0, 500.0, 0.0], Vector3::x()),
    ]
}

/// Spokes of length 1000 ending at `centre`, at the given angles in degrees.
fn spokes(centre: [f64; 3], angles: &[f64]) -> Vec<Beam> {
    angles
        .iter()
        .map(|deg| {
            let r = deg.to_radians();
            let far = [centre[0] + 1000.0 * r.cos(), centre[1] + 1000.0 * r.sin(), centre[2]];
            beam(far, centre, Vector3::z())
        })
        .collect()
}

/// A corner at the origin, a tee mortise around (5000, 3000) and a three-way
/// junction at (0, 5000), far enough apart not to interact.
fn frame() -> Vec<Beam> {
    let mut beams = vec![
        beam([-1000.0, 0.0, 0.0], [0.0, 0.0, 0.0], Vector3::y()),
        beam([0.0, -1000.0, 0.0], [0.0, 0.0, 0.0], Vector3::x()),
        beam([4500.0, 3000.0, 0.0], [5500.0, 3000.0, 0.0], Vector3::y()),
        beam([5000.0, 2400.0, 0.0], [5000.0, 3000.0, 0.0], Vector3::x()),
    ];
    beams.extend(spokes([0.0, 5000.0, 0.0], &[180.0, 60.0, 300.0]));
    beams
}

fn overrides(values: &[(&str, f64)]) -> ConfigMap {
    values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn square_cross_laps_both_beams() {
    let output = solve(crossing(), 10.0, 10.0, 10.0).unwrap();

    assert!(output.is_clean());
    assert_eq!(output.structure.joints.len(), 1);
    let entry = &output.structure.joints[0];
    assert_eq!(entry.joint.kind(), JointKind::Cross);
    assert_eq!(entry.joint.type_name(), "CrossJoint");

    let a = output.structure.beam_geometry(0).unwrap();
    let b = output.structure.beam_geometry(1).unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert!(a[0].is_closed() && b[0].is_closed());

    // equal heights put the lap plane on the shared centreline
    let (min, max) = a[0].bounding_box();
    assert_relative_eq!(min, Point3::new(-50.0, -60.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(max, Point3::new(50.0, 60.0, 110.0), epsilon = 1e-9);
    let (min, max) = b[0].bounding_box();
    assert_relative_eq!(min, Point3::new(-60.0, -50.0, -110.0), epsilon = 1e-9);
    assert_relative_eq!(max, Point3::new(60.0, 50.0, 0.0), epsilon = 1e-9);
}

#[test]
fn collinear_ends_splice() {
    let beams = vec![
        beam([-1000.0, 0.0, 0.0], [0.0, 0.0, 0.0], Vector3::y()),
        beam([0.0, 0.0, 0.0], [1000.0, 0.0, 0.0], Vector3::y()),
    ];
    let output = solve(beams, 10.0, 10.0, 10.0).unwrap();

    assert!(output.is_clean());
    assert_eq!(output.report.kinds.get("Splice"), Some(&1));
    assert_eq!(output.structure.joints[0].joint.type_name(), "SpliceJoint");
}

#[test]
fn five_spokes_are_dropped_not_fatal() {
    let mut beams = spokes([0.0, 0.0, 0.0], &[0.0, 72.0, 144.0, 216.0, 288.0]);
    beams.push(beam([3000.0, 2500.0, 0.0], [3000.0, 3500.0, 0.0], Vector3::x()));
    beams.push(beam([2500.0, 3000.0, 0.0], [3500.0, 3000.0, 0.0], Vector3::y()));

    let output = solve(beams, 10.0, 10.0, 10.0).unwrap();

    assert_eq!(output.dropped.len(), 1);
    let dropped = &output.dropped[0];
    assert_eq!(dropped.status, 12);
    let mut elements = dropped.elements.clone();
    elements.sort_unstable();
    assert_eq!(elements, vec![0, 1, 2, 3, 4]);
    assert_relative_eq!(dropped.position[0], 0.0, epsilon = 1e-9);

    // the unrelated cross still solves
    assert_eq!(output.report.constructed, 1);
    assert_eq!(output.report.dropped, 1);
    assert!(output.failures.is_empty());
}

#[test]
fn frame_solves_every_category() {
    let output = solve(frame(), 10.0, 10.0, 10.0).unwrap();

    assert!(output.is_clean(), "failures: {:?}", output.failures);
    assert_eq!(output.report.beams, 7);
    assert_eq!(output.report.joints, 3);
    assert_eq!(output.report.constructed, 3);
    for kind in ["Corner", "Tenon", "VBeam"] {
        assert_eq!(output.report.kinds.get(kind), Some(&1), "{}", kind);
    }

    let structure = &output.structure;
    let geometry = structure.all_beam_geometry();
    assert_eq!(geometry.len(), 7);
    assert!(geometry.iter().all(|solids| !solids.is_empty()));
    assert!(geometry.iter().flatten().all(|solid| solid.is_closed()));
    assert_eq!(structure.junction_geometry().len(), 1);

    // each beam of this frame takes part in exactly one joint
    for beam in 0..7 {
        assert_eq!(structure.joints_of(beam).len(), 1);
        assert_eq!(structure.beam_geometry(beam).unwrap(), geometry[beam]);
    }

    let solids: usize = structure
        .joints
        .iter()
        .filter_map(|entry| entry.construction.as_ref())
        .map(|c| c.solid_count())
        .sum();
    assert_eq!(output.report.solids, solids);
}

#[test]
fn parallel_and_sequential_agree() {
    let sequential = Solver::new(SolverConfig {
        parallel: false,
        ..SolverConfig::default()
    })
    .solve(frame())
    .unwrap();
    let parallel = Solver::new(SolverConfig::default()).solve(frame()).unwrap();

    assert_eq!(sequential.structure.joints.len(), parallel.structure.joints.len());
    for (s, p) in sequential.structure.joints.iter().zip(&parallel.structure.joints) {
        assert_eq!(s.joint.type_name(), p.joint.type_name());
        assert_eq!(s.condition, p.condition);
        let (s, p) = (s.construction.as_ref().unwrap(), p.construction.as_ref().unwrap());
        for (u, v) in s.parts.iter().flatten().zip(p.parts.iter().flatten()) {
            for (a, b) in u.vertices().iter().zip(v.vertices()) {
                assert_relative_eq!(a, b, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn beam_order_does_not_change_categories() {
    let forward = solve(frame(), 10.0, 10.0, 10.0).unwrap();
    let mut reversed_beams = frame();
    reversed_beams.reverse();
    let reversed = solve(reversed_beams, 10.0, 10.0, 10.0).unwrap();

    assert_eq!(forward.report.kinds, reversed.report.kinds);

    // the tenon beam stays the tenon beam; reversal maps index i to 6 - i
    let tenon_beam = |output: &SolveOutput| {
        output
            .structure
            .joints
            .iter()
            .find(|entry| entry.joint.kind() == JointKind::Tenon)
            .map(|entry| entry.joint.parts()[0].element)
    };
    assert_eq!(tenon_beam(&forward), Some(3));
    assert_eq!(tenon_beam(&reversed), Some(6 - 3));
}

#[test]
fn oversized_blind_offset_fails_only_the_tenon() {
    let config = SolverConfig {
        overrides: overrides(&[(BLIND_OFFSET, 150.0)]),
        ..SolverConfig::default()
    };
    let mut output = Solver::new(config).solve(frame()).unwrap();

    assert_eq!(output.failures.len(), 1);
    let failure = &output.failures[0];
    assert_eq!(failure.kind, JointKind::Tenon);
    assert_eq!(failure.status, 1);
    assert_eq!(failure.variant, "TenonJoint");
    let index = failure.joint.unwrap();
    assert!(!output.structure.joints[index].is_constructed());
    assert_eq!(output.report.constructed, 2);
    assert_eq!(output.report.failed, 1);

    // a sensible offset repairs it in place
    output
        .structure
        .configure_joint(index, &overrides(&[(BLIND_OFFSET, 20.0)]))
        .unwrap();
    assert!(output.structure.joints[index].is_constructed());
    assert!(output.structure.reconstruct(true).is_empty());
}

#[test]
fn failing_reconfiguration_clears_the_geometry() {
    let mut output = solve(frame(), 10.0, 10.0, 10.0).unwrap();
    let index = output
        .structure
        .joints
        .iter()
        .position(|entry| entry.joint.kind() == JointKind::Tenon)
        .unwrap();

    let err = output
        .structure
        .configure_joint(index, &overrides(&[(BLIND_OFFSET, 150.0)]))
        .unwrap_err();
    assert_eq!(err.code(), "JOINT_ERROR");
    assert!(!output.structure.joints[index].is_constructed());

    let failures = output.structure.reconstruct(false);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].joint, Some(index));

    let err = output.structure.configure_joint(99, &ConfigMap::default()).unwrap_err();
    assert_eq!(err.code(), "JOINT_INDEX");
}

#[test]
fn unknown_variant_is_reported_per_joint() {
    let mut config = SolverConfig::default();
    config.variants.insert(JointKind::Cross, "ScarfJoint".to_string());
    let mut beams = crossing();
    beams.push(beam([3000.0, 0.0, 0.0], [4000.0, 0.0, 0.0], Vector3::y()));
    beams.push(beam([4000.0, 0.0, 0.0], [5000.0, 0.0, 0.0], Vector3::y()));

    let output = Solver::new(config).solve(beams).unwrap();

    assert_eq!(output.failures.len(), 1);
    let failure = &output.failures[0];
    assert_eq!(failure.status, 11);
    assert_eq!(failure.joint, None);
    assert_eq!(failure.variant, "ScarfJoint");
    assert_eq!(output.report.constructed, 1);
    assert_eq!(output.report.kinds.get("Splice"), Some(&1));
    assert_eq!(output.report.kinds.get("Cross"), None);
}

#[test]
fn unfit_step_counts_fail_the_splice_without_aborting() {
    let collinear = || {
        vec![
            beam([-1000.0, 0.0, 0.0], [0.0, 0.0, 0.0], Vector3::y()),
            beam([0.0, 0.0, 0.0], [1000.0, 0.0, 0.0], Vector3::y()),
        ]
    };
    let stepped = |count: f64| {
        let mut config = SolverConfig::default();
        config.variants.insert(JointKind::Splice, "SteppedSpliceJoint".to_string());
        config.overrides = overrides(&[(STEP_COUNT, count)]);
        config
    };

    // accepted as an override, but far more steps than the section holds
    let output = Solver::new(stepped(1.0e5)).solve(collinear()).unwrap();
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].status, 1);
    assert_eq!(output.report.constructed, 0);

    // out of range overrides are ignored and the default count builds
    let output = Solver::new(stepped(1.0e20)).solve(collinear()).unwrap();
    assert!(output.is_clean());
    assert_eq!(output.structure.beam_geometry(0).unwrap().len(), 2);
}

#[test]
fn inset_wider_than_the_splice_tenon_fails() {
    let mut config = SolverConfig::default();
    config.variants.insert(JointKind::Splice, "BlindTenonSpliceJoint".to_string());
    config.overrides = overrides(&[(INSET, 80.0)]);
    let beams = vec![
        beam([-1000.0, 0.0, 0.0], [0.0, 0.0, 0.0], Vector3::y()),
        beam([0.0, 0.0, 0.0], [1000.0, 0.0, 0.0], Vector3::y()),
    ];

    let output = Solver::new(config).solve(beams).unwrap();

    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].status, 1);
    assert!(output.structure.beam_geometry(0).unwrap().is_empty());
}

#[test]
fn beam_meshes_cover_their_solids() {
    let output = solve(crossing(), 10.0, 10.0, 10.0).unwrap();

    let mesh = output.structure.beam_mesh(0).unwrap();
    assert!(!mesh.is_empty());
    // a hexahedron triangulates into twelve triangles
    assert_eq!(mesh.triangle_count(), 12);

    let err = output.structure.beam_mesh(5).unwrap_err();
    assert_eq!(err.code(), "JOINT_ERROR");
}

#[test]
fn report_serialises() {
    let output = solve(frame(), 10.0, 10.0, 10.0).unwrap();
    let json = output.report.to_json().unwrap();

    assert!(json.contains("\"construct_time_ms\""));
    let parsed: SolveReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, output.report);
}
