use rand::Rng;
use rayon::prelude::*;

use crate::adjacency::Adjacency;
use crate::rng::keyed;

use super::distance::edge_distances;
use super::properties::{Craton, PlateType};

// All magnitudes are fractions of the height amplitude.
const CONTINENT_BASE: f32 = 0.2;
const OCEAN_BASE: f32 = -0.25;
const OCEAN_SLOPE: f32 = 0.2;
const STRENGTH_MIN: f32 = 0.05;
const STRENGTH_MAX: f32 = 0.15;
const SIZE_SCALE_MIN: f32 = 0.4;
const SIZE_SCALE_MAX: f32 = 1.0;

/// Below this edge weight a continental face counts as the flat center.
const CENTER_FLATTEN: f32 = 0.05;
/// Above this edge weight a continental face counts as shoreline.
const SHORE_SOFTEN: f32 = 0.95;

const EXTREME_RATIO: f32 = 0.6;
const EXTREME_NUDGE: f32 = 0.01;
const NUDGE_HOPS: usize = 3;

/// Shape every craton's interior by distance from its edge.
///
/// Continental cratons rise toward their interior, oceanic ones deepen toward it.
/// Small cratons slope harder. Faces within three hops of an extreme mountain
/// (or trench) inside the same craton are nudged up (or down).
///
/// Reads the field as it stands on entry; cratons do not see each other's
/// changes, so they are processed in parallel. Per-craton randomness comes
/// from a stream keyed by `salt` and the craton's seed face.
pub fn shape_interiors(
    adjacency: &Adjacency,
    assignment: &[u32],
    cratons: &[Craton],
    members: &[Vec<u32>],
    amplitude: f32,
    salt: u64,
    elevation: &mut [f32],
) {
    let snapshot: &[f32] = elevation;
    let deltas: Vec<Vec<(u32, f32)>> = cratons
        .par_iter()
        .enumerate()
        .map(|(cid, craton)| {
            craton_deltas(
                adjacency,
                assignment,
                cid as u32,
                craton,
                &members[cid],
                amplitude,
                salt,
                snapshot,
            )
        })
        .collect();

    for (face, delta) in deltas.into_iter().flatten() {
        elevation[face as usize] += delta;
    }
}

fn craton_deltas(
    adjacency: &Adjacency,
    assignment: &[u32],
    cid: u32,
    craton: &Craton,
    faces: &[u32],
    amplitude: f32,
    salt: u64,
    elevation: &[f32],
) -> Vec<(u32, f32)> {
    if faces.is_empty() {
        return Vec::new();
    }

    let distances = edge_distances(adjacency, assignment, cid, faces);
    let max_dist = distances.iter().flatten().copied().max().unwrap_or(0).max(1) as f32;

    let size_scale = (1.0 / (faces.len() as f32).sqrt()).clamp(SIZE_SCALE_MIN, SIZE_SCALE_MAX);
    let mut rng = keyed(salt, craton.seed_face as u64);
    let strength = rng.random_range(STRENGTH_MIN..STRENGTH_MAX) * size_scale;

    let mut neighborhood = Neighborhood::new(faces.len());

    faces
        .iter()
        .enumerate()
        .map(|(i, &face)| {
            // Unreached faces sit deepest in the interior.
            let depth = distances[i].map_or(1.0, |d| d as f32 / max_dist);
            let closeness = 1.0 - depth;
            let edge_weight = closeness * closeness;

            let (base, mut slope) = match craton.plate_type {
                PlateType::Continental => {
                    let mut slope = strength * amplitude * (1.0 - edge_weight);
                    if edge_weight < CENTER_FLATTEN {
                        slope *= 0.5;
                    }
                    if edge_weight > SHORE_SOFTEN {
                        slope = slope.min(0.0);
                    }
                    (CONTINENT_BASE * amplitude, slope)
                }
                PlateType::Oceanic => (
                    OCEAN_BASE * amplitude,
                    -OCEAN_SLOPE * size_scale * amplitude * (1.0 - edge_weight),
                ),
            };

            slope += neighborhood.extreme_nudge(adjacency, assignment, cid, faces, i, elevation, amplitude);
            (face, base + slope)
        })
        .collect()
}

/// Scratch space for bounded BFS inside one craton, reused across faces.
struct Neighborhood {
    stamp: Vec<u32>,
    frontier: Vec<usize>,
    next: Vec<usize>,
}

impl Neighborhood {
    fn new(len: usize) -> Self {
        Self {
            stamp: vec![0; len],
            frontier: Vec::new(),
            next: Vec::new(),
        }
    }

    /// Sum of +/- nudges from extreme faces within `NUDGE_HOPS` of `faces[start]`.
    fn extreme_nudge(
        &mut self,
        adjacency: &Adjacency,
        assignment: &[u32],
        cid: u32,
        faces: &[u32],
        start: usize,
        elevation: &[f32],
        amplitude: f32,
    ) -> f32 {
        let mark = start as u32 + 1;
        let high = EXTREME_RATIO * amplitude;
        let low = -EXTREME_RATIO * amplitude;
        let mut nudge = 0.0;

        self.stamp[start] = mark;
        self.frontier.clear();
        self.frontier.push(start);
        for _ in 0..NUDGE_HOPS {
            self.next.clear();
            for &i in &self.frontier {
                for &nb in adjacency.neighbors(faces[i] as usize) {
                    if assignment[nb as usize] != cid {
                        continue;
                    }
                    let Ok(j) = faces.binary_search(&nb) else {
                        continue;
                    };
                    if self.stamp[j] == mark {
                        continue;
                    }
                    self.stamp[j] = mark;
                    let e = elevation[nb as usize];
                    if e >= high {
                        nudge += EXTREME_NUDGE * amplitude;
                    } else if e <= low {
                        nudge -= EXTREME_NUDGE * amplitude;
                    }
                    self.next.push(j);
                }
            }
            std::mem::swap(&mut self.frontier, &mut self.next);
        }

        nudge
    }
}
