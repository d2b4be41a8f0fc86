pub mod adjacency;
pub mod config;
pub mod elevation;
pub mod error;
pub mod export;
pub mod mesh;
pub mod noise;
pub mod plates;
pub mod render;
pub mod rng;
pub mod tectonic;
pub mod vec3;

use std::time::Instant;

use rand::Rng;

use adjacency::Adjacency;
use config::{ElevationMethod, Params};
use mesh::Mesh;
use plates::{BoundaryStats, Craton};
use vec3::Vec3;

pub use error::{Error, Result};

pub struct Planet {
    pub mesh: Mesh,
    pub adjacency: Adjacency,
    pub centers: Vec<Vec3>,
    pub amplitude: f32,
    /// Signed elevation per face, in km.
    pub elevation: Vec<f32>,
    /// Craton id per face. Empty for the noise method.
    pub assignment: Vec<u32>,
    pub cratons: Vec<Craton>,
    pub boundary: Option<BoundaryStats>,
    pub colors: Vec<render::Rgb>,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Build a planet from `params`, with randomness drawn from `params.seed`.
pub fn generate(params: &Params) -> Result<(Planet, Vec<Timing>)> {
    let mut rng = rng::seeded(params.seed);
    generate_with_rng(params, &mut rng)
}

pub fn generate_with_rng<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Result<(Planet, Vec<Timing>)> {
    params.validate()?;
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Mesh
    let t = Instant::now();
    let mesh = Mesh::icosphere(params.radius, params.subdivision_depth);
    let centers = mesh.face_centers();
    timings.push(Timing {
        name: "mesh",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Adjacency
    let t = Instant::now();
    let adjacency = Adjacency::from_faces(&mesh.faces, mesh.vertices.len());
    timings.push(Timing {
        name: "adjacency",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });
    tracing::info!(
        faces = mesh.face_count(),
        vertices = mesh.vertices.len(),
        adjacency_entries = adjacency.entry_count(),
        "mesh built"
    );

    // 3. Elevation
    let amplitude = params.amplitude();
    let (elevation, assignment, cratons, boundary) = match params.method {
        ElevationMethod::Tectonic => {
            let out = tectonic::simulate(&adjacency, &centers, params, rng, &mut timings)?;
            (out.elevation, out.assignment, out.cratons, Some(out.boundary))
        }
        ElevationMethod::Noise => {
            let t = Instant::now();
            let elevation = elevation::noise_elevation(
                &centers,
                amplitude,
                rng.random(),
                params.noise_scale,
                params.noise_octaves,
                params.noise_persistence,
            );
            timings.push(Timing {
                name: "noise",
                ms: t.elapsed().as_secs_f64() * 1000.0,
            });
            (elevation, Vec::new(), Vec::new(), None)
        }
    };

    // 4. Coloring
    let t = Instant::now();
    let colors = render::face_colors(&centers, &elevation, amplitude, params);
    timings.push(Timing {
        name: "coloring",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    let planet = Planet {
        mesh,
        adjacency,
        centers,
        amplitude,
        elevation,
        assignment,
        cratons,
        boundary,
        colors,
    };

    Ok((planet, timings))
}
