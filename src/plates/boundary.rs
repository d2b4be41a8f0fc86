use rand::Rng;
use serde::Serialize;

use crate::adjacency::Adjacency;
use crate::rng::{normal, symmetric};
use crate::vec3::{self, Vec3};

use super::properties::{Craton, PlateType, UNASSIGNED};

/// Relative-motion class of an edge between faces in different cratons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Converging,
    Diverging,
    Transform,
}

// Deposits as fractions of the height amplitude.
const CC_CONVERGE: f32 = 1.2;
const CO_CONVERGE_CONTINENT: f32 = 1.4;
const CO_CONVERGE_OCEAN: f32 = -1.0;
const OO_CONVERGE: f32 = 0.1;
const CC_DIVERGE: f32 = -0.2;
const OO_DIVERGE: f32 = 0.1;
const MIXED_DIVERGE: f32 = -0.1;
const TRANSFORM_VARIATION: f32 = 0.05;

// Per-side deposit multiplier ~ N(mean, std).
const VARIATION_MEAN: f32 = 1.1;
const VARIATION_STD: f32 = 0.1;

/// Classify the edge from `center_a` (craton moving with `motion_a`) toward
/// `center_b`. Positive relative motion along the edge direction means the
/// plates separate. Returns `None` when the centers coincide.
pub fn classify(
    center_a: Vec3,
    center_b: Vec3,
    motion_a: Vec3,
    motion_b: Vec3,
    threshold: f32,
) -> Option<(Interaction, f32)> {
    let direction = vec3::normalize(vec3::sub(center_b, center_a))?;
    let relative = vec3::dot(vec3::sub(motion_b, motion_a), direction);
    let kind = if relative > threshold {
        Interaction::Diverging
    } else if relative < -threshold {
        Interaction::Converging
    } else {
        Interaction::Transform
    };
    Some((kind, relative))
}

/// Tally of classified pairs, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoundaryStats {
    pub converging: usize,
    pub diverging: usize,
    pub transform: usize,
    /// Pairs skipped because their face centers coincide.
    pub degenerate: usize,
}

impl BoundaryStats {
    pub fn total(&self) -> usize {
        self.converging + self.diverging + self.transform
    }

    fn count(&mut self, kind: Interaction) {
        match kind {
            Interaction::Converging => self.converging += 1,
            Interaction::Diverging => self.diverging += 1,
            Interaction::Transform => self.transform += 1,
        }
    }
}

/// Deposit boundary uplift and subsidence for every ordered pair of adjacent
/// faces owned by different cratons. Both faces of a pair are updated, and each
/// unordered pair is visited once from each side.
///
/// Oceanic-oceanic convergence scales its lift by `1 - |e| / amplitude` using the
/// value accumulated so far, so the result depends on visiting order. Order is
/// fixed (face index, then sorted neighbor index), which keeps runs reproducible.
///
/// Running this twice on the same field applies the deposits twice.
pub fn apply_boundary_interactions<R: Rng + ?Sized>(
    adjacency: &Adjacency,
    centers: &[Vec3],
    assignment: &[u32],
    cratons: &[Craton],
    amplitude: f32,
    threshold: f32,
    elevation: &mut [f32],
    rng: &mut R,
) -> BoundaryStats {
    let mut stats = BoundaryStats::default();
    let mut logged = 0usize;

    for face in 0..adjacency.len() {
        let ca = assignment[face];
        if ca == UNASSIGNED {
            continue;
        }
        let craton_a = &cratons[ca as usize];

        for &nb in adjacency.neighbors(face) {
            let nb = nb as usize;
            let cb = assignment[nb];
            if cb == UNASSIGNED || cb == ca {
                continue;
            }
            let craton_b = &cratons[cb as usize];

            let Some((kind, relative)) = classify(
                centers[face],
                centers[nb],
                craton_a.motion,
                craton_b.motion,
                threshold,
            ) else {
                stats.degenerate += 1;
                continue;
            };
            stats.count(kind);

            let (da, db) = deposit(
                kind,
                craton_a.plate_type,
                craton_b.plate_type,
                elevation[face],
                elevation[nb],
                amplitude,
                rng,
            );
            elevation[face] += da;
            elevation[nb] += db;

            if logged < 10 {
                tracing::debug!(
                    face,
                    neighbor = nb,
                    ?kind,
                    a = ?craton_a.plate_type,
                    b = ?craton_b.plate_type,
                    relative,
                    "boundary interaction"
                );
                logged += 1;
            }
        }
    }

    stats
}

/// Elevation deltas for the two sides of a classified pair.
fn deposit<R: Rng + ?Sized>(
    kind: Interaction,
    type_a: PlateType,
    type_b: PlateType,
    current_a: f32,
    current_b: f32,
    amplitude: f32,
    rng: &mut R,
) -> (f32, f32) {
    use PlateType::{Continental as C, Oceanic as O};

    if kind == Interaction::Transform {
        let jitter = symmetric(rng, TRANSFORM_VARIATION * amplitude);
        return (jitter, jitter);
    }

    let va = normal(rng, VARIATION_MEAN, VARIATION_STD);
    let vb = normal(rng, VARIATION_MEAN, VARIATION_STD);

    let (ra, rb) = match (kind, type_a, type_b) {
        (Interaction::Converging, C, C) => (CC_CONVERGE, CC_CONVERGE),
        (Interaction::Converging, C, O) => (CO_CONVERGE_CONTINENT, CO_CONVERGE_OCEAN),
        (Interaction::Converging, O, C) => (CO_CONVERGE_OCEAN, CO_CONVERGE_CONTINENT),
        (Interaction::Converging, O, O) => (
            OO_CONVERGE * saturation(current_a, amplitude),
            OO_CONVERGE * saturation(current_b, amplitude),
        ),
        (_, C, C) => (CC_DIVERGE, CC_DIVERGE),
        (_, O, O) => (OO_DIVERGE, OO_DIVERGE),
        _ => (MIXED_DIVERGE, MIXED_DIVERGE),
    };

    (ra * amplitude * va, rb * amplitude * vb)
}

/// Island-arc lift falls off as the face approaches the amplitude.
#[inline]
fn saturation(current: f32, amplitude: f32) -> f32 {
    1.0 - current.abs() / amplitude
}
