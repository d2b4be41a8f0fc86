use std::time::Instant;

use rand::Rng;
use serde::Serialize;

use crate::Timing;
use crate::adjacency::Adjacency;
use crate::config::Params;
use crate::elevation::{min_max, normalize_elevations, smooth_boundaries};
use crate::error::{Result, StructuralDefect};
use crate::plates::boundary::{BoundaryStats, apply_boundary_interactions};
use crate::plates::distance::craton_members;
use crate::plates::grow::{GrowthInput, grow_cratons};
use crate::plates::properties::{Craton, assign_motion_vectors, type_counts};
use crate::plates::seed::seed_cratons;
use crate::plates::slope::shape_interiors;
use crate::vec3::Vec3;

/// Engine output: per-face elevation (km, signed) and craton id, plus the cratons.
#[derive(Clone, Debug, Serialize)]
pub struct Tectonics {
    pub elevation: Vec<f32>,
    pub assignment: Vec<u32>,
    pub cratons: Vec<Craton>,
    pub boundary: BoundaryStats,
}

fn record(timings: &mut Vec<Timing>, name: &'static str, t: Instant) {
    timings.push(Timing {
        name,
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });
}

/// Run the tectonic elevation pipeline over a validated adjacency graph.
///
/// Stages, in order: seed cratons, grow them, assign motion, deposit boundary
/// interactions, smooth, shape interiors, normalize. The elevation buffer is
/// owned here and lent to one stage at a time. All randomness comes from `rng`,
/// so the same mesh, params and random source reproduce the same output.
pub fn simulate<R: Rng + ?Sized>(
    adjacency: &Adjacency,
    centers: &[Vec3],
    params: &Params,
    rng: &mut R,
    timings: &mut Vec<Timing>,
) -> Result<Tectonics> {
    params.validate()?;
    adjacency.validate()?;
    let n = adjacency.len();
    let amplitude = params.amplitude();

    let (_, components) = adjacency.components();
    if components > 1 {
        tracing::warn!(components, "adjacency graph is not connected");
    }

    // 1. Seed cratons
    let t = Instant::now();
    let count = params.craton_count_for(n);
    let seeds = seed_cratons(n, count, params.oceanic_fraction, rng)?;
    let base_elevation: Vec<f32> = seeds
        .iter()
        .map(|s| s.plate_type.base_elevation(amplitude))
        .collect();
    record(timings, "craton_seed", t);

    // 2. Grow
    let t = Instant::now();
    let seed_faces: Vec<u32> = seeds.iter().map(|s| s.face).collect();
    let mut elevation = vec![0.0f32; n];
    let input = GrowthInput {
        adjacency,
        centers,
        seed_faces: &seed_faces,
        base_elevation: &base_elevation,
        noise_seed: rng.random(),
        noise_scale: params.voronoi_noise,
    };
    let growth = grow_cratons(params.growth, &input, &mut elevation);
    record(timings, "craton_grow", t);
    if let Some(example) = growth.first_unassigned() {
        tracing::warn!(
            unassigned = growth.unassigned,
            example,
            neighbors = ?adjacency.neighbors(example as usize),
            "faces left unassigned after growth"
        );
        return Err(StructuralDefect::UnassignedFaces {
            count: growth.unassigned,
            example,
        }
        .into());
    }
    let assignment = growth.assignment;

    // 3. Motion
    let t = Instant::now();
    let motions = assign_motion_vectors(seeds.len(), rng);
    let cratons: Vec<Craton> = seeds
        .iter()
        .zip(motions)
        .zip(&base_elevation)
        .map(|((s, motion), &base)| Craton {
            seed_face: s.face,
            plate_type: s.plate_type,
            motion,
            base_elevation: base,
        })
        .collect();
    record(timings, "motion", t);
    let (oceanic, continental) = type_counts(&cratons);
    tracing::info!(
        cratons = cratons.len(),
        oceanic,
        continental,
        strategy = ?params.growth,
        "cratons grown"
    );

    // 4. Boundary interactions
    let t = Instant::now();
    let boundary = apply_boundary_interactions(
        adjacency,
        centers,
        &assignment,
        &cratons,
        amplitude,
        params.boundary_threshold,
        &mut elevation,
        rng,
    );
    record(timings, "boundaries", t);
    tracing::info!(
        converging = boundary.converging,
        diverging = boundary.diverging,
        transform = boundary.transform,
        degenerate = boundary.degenerate,
        "boundary interactions applied"
    );

    // 5. Smoothing
    let t = Instant::now();
    let reached = smooth_boundaries(
        adjacency,
        &mut elevation,
        params.smoothing_layers,
        params.smoothing_decay,
        params.peak_ratio * amplitude,
    );
    record(timings, "smoothing", t);
    tracing::debug!(reached, "boundary smoothing done");

    // 6. Interior slopes
    let t = Instant::now();
    let members = craton_members(&assignment, cratons.len());
    let salt: u64 = rng.random();
    shape_interiors(adjacency, &assignment, &cratons, &members, amplitude, salt, &mut elevation);
    record(timings, "slope", t);

    // 7. Normalize
    let t = Instant::now();
    normalize_elevations(&mut elevation, amplitude, params.normalize_bias);
    record(timings, "normalize", t);
    let (lo, hi) = min_max(&elevation);
    tracing::info!(min_km = lo, max_km = hi, amplitude_km = amplitude, "elevation normalized");

    Ok(Tectonics {
        elevation,
        assignment,
        cratons,
        boundary,
    })
}
