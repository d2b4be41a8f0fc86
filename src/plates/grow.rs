use std::collections::VecDeque;

use rayon::prelude::*;

use crate::adjacency::Adjacency;
use crate::config::GrowthStrategy;
use crate::noise::fbm3;
use crate::vec3::{self, Vec3};

use super::properties::UNASSIGNED;

/// Noise sample frequency on the unit sphere for Voronoi boundary wiggle.
const VORONOI_NOISE_FREQ: f32 = 3.0;
/// How far each seed shifts its noise sample point, so every seed sees its own field.
const VORONOI_NOISE_SHIFT: f32 = 7.31;

/// Result of partitioning faces among cratons.
#[derive(Clone, Debug)]
pub struct Growth {
    /// Craton index per face, `UNASSIGNED` where growth never reached.
    pub assignment: Vec<u32>,
    pub unassigned: usize,
}

impl Growth {
    fn from_assignment(assignment: Vec<u32>) -> Self {
        let unassigned = assignment.iter().filter(|&&c| c == UNASSIGNED).count();
        Self { assignment, unassigned }
    }

    pub fn first_unassigned(&self) -> Option<u32> {
        self.assignment
            .iter()
            .position(|&c| c == UNASSIGNED)
            .map(|f| f as u32)
    }
}

/// Inputs shared by both growth strategies.
pub struct GrowthInput<'a> {
    pub adjacency: &'a Adjacency,
    pub centers: &'a [Vec3],
    pub seed_faces: &'a [u32],
    /// Base elevation per craton, written to every face the craton claims.
    pub base_elevation: &'a [f32],
    pub noise_seed: u32,
    pub noise_scale: f32,
}

/// Partition all faces among the craton seeds and deposit each craton's base
/// elevation on the faces it owns.
pub fn grow_cratons(strategy: GrowthStrategy, input: &GrowthInput, elevation: &mut [f32]) -> Growth {
    match strategy {
        GrowthStrategy::Bfs => grow_bfs(input, elevation),
        GrowthStrategy::Voronoi => grow_voronoi(input, elevation),
    }
}

/// Round-robin breadth-first growth: each pass pops one face from every non-empty
/// queue and claims its unclaimed neighbors. Regions stay contiguous and roughly
/// ordered by graph distance from their seed. Faces unreachable from any seed
/// stay `UNASSIGNED`.
pub fn grow_bfs(input: &GrowthInput, elevation: &mut [f32]) -> Growth {
    let n = input.adjacency.len();
    let mut assignment = vec![UNASSIGNED; n];
    let mut queues: Vec<VecDeque<u32>> = Vec::with_capacity(input.seed_faces.len());

    for (cid, &face) in input.seed_faces.iter().enumerate() {
        assignment[face as usize] = cid as u32;
        elevation[face as usize] = input.base_elevation[cid];
        queues.push(VecDeque::from([face]));
    }

    let mut live = queues.iter().filter(|q| !q.is_empty()).count();
    while live > 0 {
        for (cid, queue) in queues.iter_mut().enumerate() {
            let Some(face) = queue.pop_front() else {
                continue;
            };
            for &nb in input.adjacency.neighbors(face as usize) {
                let slot = &mut assignment[nb as usize];
                if *slot == UNASSIGNED {
                    *slot = cid as u32;
                    elevation[nb as usize] = input.base_elevation[cid];
                    queue.push_back(nb);
                }
            }
            if queue.is_empty() {
                live -= 1;
            }
        }
    }

    Growth::from_assignment(assignment)
}

/// Nearest-seed growth on the sphere. Each face goes to the seed maximizing
/// `dot(face, seed) + noise * noise_scale`, where the noise is a smooth field
/// sampled at the face position shifted per seed. Every face is assigned.
pub fn grow_voronoi(input: &GrowthInput, elevation: &mut [f32]) -> Growth {
    let seed_dirs: Vec<Vec3> = input
        .seed_faces
        .iter()
        .map(|&f| input.centers[f as usize])
        .collect();

    let assignment: Vec<u32> = input
        .centers
        .par_iter()
        .map(|&c| {
            let mut best = 0u32;
            let mut best_score = f32::NEG_INFINITY;
            for (cid, &s) in seed_dirs.iter().enumerate() {
                let score = vec3::dot(c, s) + voronoi_perturbation(c, s, input);
                if score > best_score {
                    best_score = score;
                    best = cid as u32;
                }
            }
            best
        })
        .collect();

    for (e, &cid) in elevation.iter_mut().zip(&assignment) {
        *e = input.base_elevation[cid as usize];
    }

    Growth::from_assignment(assignment)
}

#[inline]
fn voronoi_perturbation(face: Vec3, seed: Vec3, input: &GrowthInput) -> f32 {
    if input.noise_scale == 0.0 {
        return 0.0;
    }
    let p = vec3::add(
        vec3::scale(face, VORONOI_NOISE_FREQ),
        vec3::scale(seed, VORONOI_NOISE_SHIFT),
    );
    fbm3(p, input.noise_seed, 3, 1.0, 2.0, 0.5) * input.noise_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::plates::PlateType;

    fn fixture(depth: u32) -> (Adjacency, Vec<Vec3>) {
        let mesh = Mesh::icosphere(1.0, depth);
        let adj = Adjacency::from_faces(&mesh.faces, mesh.vertices.len());
        (adj, mesh.face_centers())
    }

    #[test]
    fn single_seed_claims_everything_at_base() {
        let (adj, centers) = fixture(3);
        let base = [PlateType::Continental.base_elevation(100.0)];
        for strategy in [GrowthStrategy::Bfs, GrowthStrategy::Voronoi] {
            let input = GrowthInput {
                adjacency: &adj,
                centers: &centers,
                seed_faces: &[7],
                base_elevation: &base,
                noise_seed: 11,
                noise_scale: 0.05,
            };
            let mut elevation = vec![0.0; adj.len()];
            let growth = grow_cratons(strategy, &input, &mut elevation);
            assert_eq!(growth.unassigned, 0, "{strategy:?}");
            assert!(growth.assignment.iter().all(|&c| c == 0), "{strategy:?}");
            assert!(elevation.iter().all(|&e| e == 10.0), "{strategy:?}");
        }
    }

    #[test]
    fn bfs_assigns_every_face_on_connected_mesh() {
        let (adj, centers) = fixture(2);
        let seeds = [0u32, 100, 200, 300];
        let base = [1.0, 2.0, 3.0, 4.0];
        let input = GrowthInput {
            adjacency: &adj,
            centers: &centers,
            seed_faces: &seeds,
            base_elevation: &base,
            noise_seed: 0,
            noise_scale: 0.0,
        };
        let mut elevation = vec![0.0; adj.len()];
        let growth = grow_bfs(&input, &mut elevation);
        assert_eq!(growth.unassigned, 0);
        for (f, &cid) in growth.assignment.iter().enumerate() {
            assert_eq!(elevation[f], base[cid as usize]);
        }
        for (cid, &s) in seeds.iter().enumerate() {
            assert_eq!(growth.assignment[s as usize], cid as u32);
        }
    }

    #[test]
    fn bfs_reports_unreachable_faces() {
        // Two disjoint pairs; only the first has a seed.
        let adj = Adjacency::from_lists(&[vec![1], vec![0], vec![3], vec![2]]);
        let centers = vec![[1.0, 0.0, 0.0]; 4];
        let input = GrowthInput {
            adjacency: &adj,
            centers: &centers,
            seed_faces: &[0],
            base_elevation: &[5.0],
            noise_seed: 0,
            noise_scale: 0.0,
        };
        let mut elevation = vec![0.0; 4];
        let growth = grow_bfs(&input, &mut elevation);
        assert_eq!(growth.unassigned, 2);
        assert_eq!(growth.first_unassigned(), Some(2));
        assert_eq!(elevation, vec![5.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn voronoi_without_noise_picks_angularly_nearest_seed() {
        let (adj, centers) = fixture(2);
        let seeds = [3u32, 77, 150, 290];
        let base = [0.0; 4];
        let input = GrowthInput {
            adjacency: &adj,
            centers: &centers,
            seed_faces: &seeds,
            base_elevation: &base,
            noise_seed: 9,
            noise_scale: 0.0,
        };
        let mut elevation = vec![0.0; adj.len()];
        let growth = grow_voronoi(&input, &mut elevation);
        assert_eq!(growth.unassigned, 0);
        for (f, &cid) in growth.assignment.iter().enumerate() {
            let own = vec3::dot(centers[f], centers[seeds[cid as usize] as usize]);
            for &s in &seeds {
                assert!(own >= vec3::dot(centers[f], centers[s as usize]));
            }
        }
    }

    #[test]
    fn voronoi_with_noise_still_covers_everything() {
        let (adj, centers) = fixture(3);
        let seeds: Vec<u32> = (0..12).map(|i| i * 100).collect();
        let base: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let input = GrowthInput {
            adjacency: &adj,
            centers: &centers,
            seed_faces: &seeds,
            base_elevation: &base,
            noise_seed: 1234,
            noise_scale: 0.05,
        };
        let mut elevation = vec![0.0; adj.len()];
        let growth = grow_cratons(GrowthStrategy::Voronoi, &input, &mut elevation);
        assert_eq!(growth.unassigned, 0);
        assert!(growth.assignment.iter().all(|&c| (c as usize) < seeds.len()));
    }
}
