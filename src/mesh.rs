use std::collections::HashMap;

use rayon::prelude::*;

use crate::vec3::{self, Vec3};

/// Triangle mesh approximating a sphere. Vertex positions are in km.
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Regular icosahedron inscribed in a sphere of `radius`.
    pub fn icosahedron(radius: f32) -> Self {
        let phi = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let raw: [Vec3; 12] = [
            [-1.0, phi, 0.0],
            [1.0, phi, 0.0],
            [-1.0, -phi, 0.0],
            [1.0, -phi, 0.0],
            [0.0, -1.0, phi],
            [0.0, 1.0, phi],
            [0.0, -1.0, -phi],
            [0.0, 1.0, -phi],
            [phi, 0.0, -1.0],
            [phi, 0.0, 1.0],
            [-phi, 0.0, -1.0],
            [-phi, 0.0, 1.0],
        ];
        let vertices = raw
            .iter()
            .map(|&v| project(v, radius))
            .collect();

        let faces = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        Self { vertices, faces }
    }

    /// Icosahedron subdivided `depth` times, each new vertex pushed out to the sphere.
    /// Face count is `20 * 4^depth`.
    pub fn icosphere(radius: f32, depth: u32) -> Self {
        let mut mesh = Self::icosahedron(radius);
        for _ in 0..depth {
            mesh = mesh.subdivide(radius);
        }
        mesh
    }

    fn subdivide(self, radius: f32) -> Self {
        let Self { mut vertices, faces } = self;
        // Shared edge midpoints keep the mesh watertight.
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3 / 2);
        let mut midpoint = |a: u32, b: u32| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let m = vec3::scale(
                    vec3::add(vertices[a as usize], vertices[b as usize]),
                    0.5,
                );
                vertices.push(project(m, radius));
                (vertices.len() - 1) as u32
            })
        };

        let mut out = Vec::with_capacity(faces.len() * 4);
        for [v0, v1, v2] in faces {
            let a = midpoint(v0, v1);
            let b = midpoint(v1, v2);
            let c = midpoint(v2, v0);
            out.push([v0, a, c]);
            out.push([v1, b, a]);
            out.push([v2, c, b]);
            out.push([a, b, c]);
        }

        Self { vertices, faces: out }
    }

    /// Latitude/longitude grid sphere; used for the optional ocean shell.
    pub fn uv_sphere(radius: f32, u_res: u32, v_res: u32) -> Self {
        let mut vertices = Vec::with_capacity((u_res * v_res) as usize);
        for i in 0..u_res {
            let u = std::f32::consts::TAU * i as f32 / (u_res - 1) as f32;
            for j in 0..v_res {
                let v = std::f32::consts::PI * j as f32 / (v_res - 1) as f32;
                vertices.push([
                    radius * u.cos() * v.sin(),
                    radius * u.sin() * v.sin(),
                    radius * v.cos(),
                ]);
            }
        }

        let mut faces = Vec::with_capacity(2 * ((u_res - 1) * (v_res - 1)) as usize);
        for i in 0..u_res - 1 {
            for j in 0..v_res - 1 {
                let a = i * v_res + j;
                let b = a + 1;
                let c = (i + 1) * v_res + j;
                let d = c + 1;
                faces.push([a, b, d]);
                faces.push([a, d, c]);
            }
        }

        Self { vertices, faces }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Mean of a face's vertex positions (not normalized).
    pub fn centroid(&self, face: usize) -> Vec3 {
        let [a, b, c] = self.faces[face];
        let sum = vec3::add(
            vec3::add(self.vertices[a as usize], self.vertices[b as usize]),
            self.vertices[c as usize],
        );
        vec3::scale(sum, 1.0 / 3.0)
    }

    /// Unit direction of each face centroid. Degenerate faces (centroid at the
    /// origin) get the zero vector, which downstream direction math skips.
    pub fn face_centers(&self) -> Vec<Vec3> {
        (0..self.faces.len())
            .into_par_iter()
            .map(|f| vec3::normalize(self.centroid(f)).unwrap_or([0.0; 3]))
            .collect()
    }
}

#[inline]
fn project(v: Vec3, radius: f32) -> Vec3 {
    vec3::scale(v, radius / vec3::length(v))
}

/// Closed-form counts and areas for an icosphere of given radius and depth.
#[derive(Clone, Debug, serde::Serialize)]
pub struct IcosphereStats {
    pub radius: f32,
    pub depth: u32,
    pub faces: u64,
    pub edges: u64,
    pub vertices: u64,
    pub surface_area: f64,
    pub mean_face_area: f64,
    pub approx_edge_length: f64,
}

impl IcosphereStats {
    pub fn new(radius: f32, depth: u32) -> Self {
        let k = 4u64.pow(depth);
        let faces = 20 * k;
        let surface_area = 4.0 * std::f64::consts::PI * (radius as f64).powi(2);
        let mean_face_area = surface_area / faces as f64;
        Self {
            radius,
            depth,
            faces,
            edges: 30 * k,
            vertices: 10 * k + 2,
            surface_area,
            mean_face_area,
            approx_edge_length: mean_face_area.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icosphere_counts_follow_euler() {
        for depth in 0..4 {
            let mesh = Mesh::icosphere(1.0, depth);
            let stats = IcosphereStats::new(1.0, depth);
            assert_eq!(mesh.faces.len() as u64, stats.faces);
            assert_eq!(mesh.vertices.len() as u64, stats.vertices);
        }
    }

    #[test]
    fn vertices_lie_on_sphere() {
        let mesh = Mesh::icosphere(6371.0, 3);
        for v in &mesh.vertices {
            assert!((vec3::length(*v) - 6371.0).abs() < 0.05);
        }
    }

    #[test]
    fn face_centers_are_unit() {
        let mesh = Mesh::icosphere(100.0, 2);
        for c in mesh.face_centers() {
            assert!((vec3::length(c) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn uv_sphere_face_count() {
        let mesh = Mesh::uv_sphere(1.0, 8, 5);
        assert_eq!(mesh.faces.len(), 2 * 7 * 4);
        assert_eq!(mesh.vertices.len(), 40);
    }
}
