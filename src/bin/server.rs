use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use tectogen::config::{ElevationMethod, GrowthStrategy, Params};
use tectogen::elevation::min_max;
use tectogen::plates::BoundaryStats;
use tectogen::render;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    width: Option<usize>,
    radius: Option<f32>,
    subdivision_depth: Option<u32>,
    method: Option<String>,
    // Cratons
    craton_count: Option<usize>,
    oceanic_fraction: Option<f32>,
    growth: Option<String>,
    // Tuning
    height_amplitude_ratio: Option<f32>,
    boundary_threshold: Option<f32>,
    smoothing_layers: Option<usize>,
    smoothing_decay: Option<f32>,
    peak_ratio: Option<f32>,
    voronoi_noise: Option<f32>,
    normalize_bias: Option<f32>,
}

#[derive(Serialize)]
struct GenerateResponse {
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    stats: Stats,
    width: usize,
    height: usize,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct Stats {
    faces: usize,
    cratons: usize,
    oceanic: usize,
    continental: usize,
    amplitude_km: f32,
    min_elevation_km: f32,
    max_elevation_km: f32,
    boundary: Option<BoundaryStats>,
}

type ApiError = (StatusCode, String);

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, ApiError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("PNG encode failed: {e}")))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn build_params(req: &GenerateRequest) -> tectogen::Result<Params> {
    let d = Params::default();
    let method = match &req.method {
        Some(name) => name.parse::<ElevationMethod>()?,
        None => d.method,
    };
    let growth = match &req.growth {
        Some(name) => name.parse::<GrowthStrategy>()?,
        None => d.growth,
    };
    Ok(Params {
        seed: req.seed.unwrap_or(d.seed),
        radius: req.radius.unwrap_or(d.radius),
        // Keep interactive requests small by default.
        subdivision_depth: req.subdivision_depth.unwrap_or(4).min(7),
        method,
        craton_count: req.craton_count.or(d.craton_count),
        oceanic_fraction: req.oceanic_fraction.unwrap_or(d.oceanic_fraction),
        growth,
        height_amplitude_ratio: req.height_amplitude_ratio.unwrap_or(d.height_amplitude_ratio),
        boundary_threshold: req.boundary_threshold.unwrap_or(d.boundary_threshold),
        smoothing_layers: req.smoothing_layers.unwrap_or(d.smoothing_layers),
        smoothing_decay: req.smoothing_decay.unwrap_or(d.smoothing_decay),
        peak_ratio: req.peak_ratio.unwrap_or(d.peak_ratio),
        voronoi_noise: req.voronoi_noise.unwrap_or(d.voronoi_noise),
        normalize_bias: req.normalize_bias.unwrap_or(d.normalize_bias),
        ..d
    })
}

fn api_error(e: tectogen::Error) -> ApiError {
    match e {
        tectogen::Error::InvalidConfiguration(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn generate_handler(Json(req): Json<GenerateRequest>) -> Result<Json<GenerateResponse>, ApiError> {
    let width = req.width.unwrap_or(1024).clamp(16, 4096);
    let height = width / 2;
    let params = build_params(&req).map_err(api_error)?;

    let response = tokio::task::spawn_blocking(move || -> Result<GenerateResponse, ApiError> {
        let (planet, timings) = tectogen::generate(&params).map_err(api_error)?;

        let mut layers = vec![Layer {
            name: "elevation".into(),
            data_url: encode_png(
                &render::render_equirect(&planet.mesh, &planet.colors, width, height),
                width,
                height,
            )?,
        }];
        if !planet.assignment.is_empty() {
            let palette = render::craton_colors(&planet.adjacency, &planet.assignment);
            layers.push(Layer {
                name: "cratons".into(),
                data_url: encode_png(
                    &render::render_equirect(&planet.mesh, &palette, width, height),
                    width,
                    height,
                )?,
            });
        }

        let timing_entries = timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect();

        let oceanic = planet.cratons.iter().filter(|c| c.plate_type.is_oceanic()).count();
        let (lo, hi) = min_max(&planet.elevation);
        let stats = Stats {
            faces: planet.mesh.face_count(),
            cratons: planet.cratons.len(),
            oceanic,
            continental: planet.cratons.len() - oceanic,
            amplitude_km: planet.amplitude,
            min_elevation_km: lo,
            max_elevation_km: hi,
            boundary: planet.boundary,
        };

        Ok(GenerateResponse {
            layers,
            timings: timing_entries,
            stats,
            width,
            height,
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("generation task failed: {e}")))??;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> GenerateRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn unknown_strategy_is_a_bad_request() {
        let err = build_params(&request(r#"{"growth": "spiral"}"#)).map_err(api_error).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("spiral"));
    }

    #[test]
    fn overrides_are_applied() {
        let params = build_params(&request(r#"{"growth": "bfs", "method": "noise", "seed": 9}"#)).unwrap();
        assert_eq!(params.growth, GrowthStrategy::Bfs);
        assert_eq!(params.method, ElevationMethod::Noise);
        assert_eq!(params.seed, 9);
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("tectogen server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
