use std::f32::consts::FRAC_1_SQRT_2;

use tectogen::adjacency::Adjacency;
use tectogen::elevation::smooth_boundaries;
use tectogen::plates::boundary::apply_boundary_interactions;
use tectogen::plates::{Craton, PlateType};
use tectogen::rng;

const AMPLITUDE: f32 = 100.0;

fn pair() -> (Adjacency, Vec<[f32; 3]>, Vec<u32>) {
    let adjacency = Adjacency::from_lists(&[vec![1], vec![0]]);
    let centers = vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    (adjacency, centers, vec![0, 1])
}

fn craton(seed_face: u32, plate_type: PlateType, motion: [f32; 3]) -> Craton {
    Craton {
        seed_face,
        plate_type,
        motion,
        base_elevation: plate_type.base_elevation(AMPLITUDE),
    }
}

#[test]
fn continent_overrides_ocean_when_converging() {
    let (adjacency, centers, assignment) = pair();
    // Each craton moves toward the other.
    let cratons = [
        craton(0, PlateType::Continental, [-FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0]),
        craton(1, PlateType::Oceanic, [FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0]),
    ];
    let mut elevation = vec![0.0; 2];
    let stats = apply_boundary_interactions(
        &adjacency,
        &centers,
        &assignment,
        &cratons,
        AMPLITUDE,
        0.1,
        &mut elevation,
        &mut rng::seeded(7),
    );
    assert_eq!(stats.converging, 2);
    assert!(elevation[0] > 0.0);
    assert!(elevation[1] < 0.0);
    assert!(elevation[0] > elevation[1].abs());
}

#[test]
fn separating_continents_rift() {
    let (adjacency, centers, assignment) = pair();
    let cratons = [
        craton(0, PlateType::Continental, [FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0]),
        craton(1, PlateType::Continental, [-FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0]),
    ];
    let mut elevation = vec![0.0; 2];
    let stats = apply_boundary_interactions(
        &adjacency,
        &centers,
        &assignment,
        &cratons,
        AMPLITUDE,
        0.1,
        &mut elevation,
        &mut rng::seeded(7),
    );
    assert_eq!(stats.diverging, 2);
    assert!(elevation.iter().all(|&e| e < 0.0));
}

#[test]
fn parallel_motion_is_a_small_shared_transform_offset() {
    let (adjacency, centers, assignment) = pair();
    let cratons = [
        craton(0, PlateType::Continental, [0.0, 0.0, 1.0]),
        craton(1, PlateType::Oceanic, [0.0, 0.0, 1.0]),
    ];
    let mut elevation = vec![0.0; 2];
    let stats = apply_boundary_interactions(
        &adjacency,
        &centers,
        &assignment,
        &cratons,
        AMPLITUDE,
        0.1,
        &mut elevation,
        &mut rng::seeded(7),
    );
    assert_eq!(stats.transform, 2);
    assert_eq!(elevation[0], elevation[1]);
    assert!(elevation[0].abs() <= 0.1 * AMPLITUDE);
}

#[test]
fn smoothing_spreads_a_boundary_into_a_ring() {
    // Star: face 0 in the middle, 1..=4 around it, 5 beyond 4.
    let adjacency = Adjacency::from_lists(&[
        vec![1, 2, 3, 4],
        vec![0],
        vec![0],
        vec![0],
        vec![0, 5],
        vec![4],
    ]);
    let mut elevation = vec![10.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let reached = smooth_boundaries(&adjacency, &mut elevation, 6, 0.5, 0.8 * AMPLITUDE);
    assert_eq!(reached, 5);
    for f in 1..=4 {
        assert!((elevation[f] - 5.0).abs() < 1e-6);
    }
    assert!((elevation[5] - 2.5).abs() < 1e-6);
}
