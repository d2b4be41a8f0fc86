use rayon::prelude::*;

use crate::adjacency::Adjacency;
use crate::noise::fbm3;
use crate::vec3::Vec3;

/// Layered spread of boundary elevation into the surrounding faces.
///
/// Every face with nonzero elevation is an active seed and keeps its value.
/// Each layer pushes the frontier's accumulated value one hop outward, scaled
/// by `decay`, into neighbors not yet reached; a face `L` hops from its seed
/// receives `seed * decay^L`. Influence chains through the layers: each ring
/// spreads what it received, not the unmodified input field, so the second and
/// later rings are nonzero too. Contributions from several frontier faces add up.
/// Faces whose own value exceeds `peak_cutoff` in magnitude do not spread, so
/// peaks and trenches stay sharp. Faces out of reach remain zero.
///
/// Returns the number of faces that received an influence.
pub fn smooth_boundaries(
    adjacency: &Adjacency,
    elevation: &mut [f32],
    layers: usize,
    decay: f32,
    peak_cutoff: f32,
) -> usize {
    let n = elevation.len();
    let mut influence = vec![0.0f32; n];
    let mut visited = vec![false; n];
    let mut queued = vec![false; n];

    let mut frontier: Vec<u32> = Vec::new();
    for (i, &e) in elevation.iter().enumerate() {
        if e != 0.0 {
            visited[i] = true;
            influence[i] = e;
            frontier.push(i as u32);
        }
    }

    let mut reached = 0usize;
    let mut next: Vec<u32> = Vec::new();
    for _layer in 1..=layers {
        if frontier.is_empty() {
            break;
        }
        next.clear();
        // Ring members are marked visited only after the whole ring has contributed.
        for &face in &frontier {
            let value = influence[face as usize];
            if value.abs() > peak_cutoff {
                continue;
            }
            let contribution = value * decay;
            for &nb in adjacency.neighbors(face as usize) {
                let nb = nb as usize;
                if visited[nb] {
                    continue;
                }
                if !queued[nb] {
                    queued[nb] = true;
                    next.push(nb as u32);
                }
                influence[nb] += contribution;
            }
        }
        for &f in &next {
            visited[f as usize] = true;
        }
        reached += next.len();
        std::mem::swap(&mut frontier, &mut next);
    }

    elevation.copy_from_slice(&influence);
    reached
}

/// Linearly rescale so the field spans `[-amplitude, amplitude]`, then add
/// `bias * amplitude` and clamp back into range. A constant field is left as is.
pub fn normalize_elevations(elevation: &mut [f32], amplitude: f32, bias: f32) {
    let (min, max) = min_max(elevation);
    if !(max > min) {
        return;
    }
    let range = max - min;
    let offset = bias * amplitude;
    elevation.par_iter_mut().for_each(|e| {
        let scaled = (2.0 * (*e - min) / range - 1.0).clamp(-1.0, 1.0);
        *e = (scaled * amplitude + offset).clamp(-amplitude, amplitude);
    });
}

pub fn min_max(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Fractal-noise elevation sampled at face centers, in `[-amplitude, amplitude]`.
/// The plate-free alternative to the tectonic pipeline.
pub fn noise_elevation(
    centers: &[Vec3],
    amplitude: f32,
    seed: u32,
    scale: f32,
    octaves: u32,
    persistence: f32,
) -> Vec<f32> {
    centers
        .par_iter()
        .map(|&c| {
            let n = fbm3(c, seed, octaves.max(1), scale, 2.0, persistence);
            (n * 2.0).clamp(-1.0, 1.0) * amplitude
        })
        .collect()
}
