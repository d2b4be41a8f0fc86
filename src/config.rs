use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How faces are partitioned among craton seeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum GrowthStrategy {
    /// Round-robin breadth-first flood over the adjacency graph.
    Bfs,
    /// Nearest seed by angular distance, perturbed by coherent noise.
    Voronoi,
}

impl FromStr for GrowthStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Self::Bfs),
            "voronoi" => Ok(Self::Voronoi),
            other => Err(Error::config(format!(
                "unknown growth strategy '{other}' (expected 'bfs' or 'voronoi')"
            ))),
        }
    }
}

impl TryFrom<String> for GrowthStrategy {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Which generator fills the elevation field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ElevationMethod {
    Tectonic,
    Noise,
}

impl FromStr for ElevationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tectonic" => Ok(Self::Tectonic),
            "noise" | "perlin" => Ok(Self::Noise),
            other => Err(Error::config(format!(
                "unknown elevation method '{other}' (expected 'tectonic' or 'noise')"
            ))),
        }
    }
}

impl TryFrom<String> for ElevationMethod {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// All tunable parameters. Loadable from JSON, every field optional.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub seed: u64,

    // Planet geometry
    pub radius: f32,
    pub subdivision_depth: u32,

    // Elevation
    pub method: ElevationMethod,
    pub height_amplitude_ratio: f32,
    /// Absolute amplitude in km; overrides `radius * height_amplitude_ratio`.
    pub height_amplitude: Option<f32>,
    pub sea_level: f32,
    /// Fraction of the amplitude added after normalization.
    pub normalize_bias: f32,

    // Cratons
    pub craton_count: Option<usize>,
    pub craton_density: f32,
    pub craton_exponent: f32,
    pub craton_reference_radius: f32,
    pub craton_min_count: usize,
    pub oceanic_fraction: f32,
    pub growth: GrowthStrategy,

    // Tectonic tuning
    pub boundary_threshold: f32,
    pub smoothing_layers: usize,
    pub smoothing_decay: f32,
    pub peak_ratio: f32,
    pub voronoi_noise: f32,

    // Noise method
    pub noise_scale: f32,
    pub noise_octaves: u32,
    pub noise_persistence: f32,

    // Climate overlays
    pub polar_overlay: bool,
    pub tropical_overlay: bool,
    pub polar_latitude: f32,
    pub tropical_latitude: f32,
    pub polar_fade_range: f32,
    pub tropical_fade_range: f32,

    // Export
    pub posterize_levels: u32,
    pub y_up: bool,
    pub ocean: bool,
    pub ocean_u_resolution: u32,
    pub ocean_v_resolution: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seed: 42,
            radius: 25_500.0,
            subdivision_depth: 5,
            method: ElevationMethod::Tectonic,
            height_amplitude_ratio: 0.01,
            height_amplitude: None,
            sea_level: 0.0,
            normalize_bias: 0.0,
            craton_count: None,
            craton_density: 0.0001,
            craton_exponent: 1.5,
            craton_reference_radius: 6371.0,
            craton_min_count: 7,
            oceanic_fraction: 0.6,
            growth: GrowthStrategy::Voronoi,
            boundary_threshold: 0.1,
            smoothing_layers: 6,
            smoothing_decay: 0.07,
            peak_ratio: 0.8,
            voronoi_noise: 0.05,
            noise_scale: 2.0,
            noise_octaves: 3,
            noise_persistence: 0.5,
            polar_overlay: true,
            tropical_overlay: false,
            polar_latitude: 60.0,
            tropical_latitude: 13.5,
            polar_fade_range: 10.0,
            tropical_fade_range: 20.0,
            posterize_levels: 16,
            y_up: true,
            ocean: false,
            ocean_u_resolution: 128,
            ocean_v_resolution: 64,
        }
    }
}

impl Params {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate. Unknown strategy or method names are configuration
    /// errors, not JSON errors; malformed JSON stays `Error::Json`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if let Some(v) = value.get("growth") {
            named::<GrowthStrategy>(v, "growth")?;
        }
        if let Some(v) = value.get("method") {
            named::<ElevationMethod>(v, "method")?;
        }
        let params: Self = serde_json::from_value(value)?;
        params.validate()?;
        Ok(params)
    }

    /// Maximum elevation magnitude in km.
    pub fn amplitude(&self) -> f32 {
        self.height_amplitude
            .unwrap_or(self.radius * self.height_amplitude_ratio)
    }

    /// Craton count for a mesh with `total_faces` faces: the explicit count if set,
    /// otherwise scaled by face count and planet size relative to the reference radius.
    pub fn craton_count_for(&self, total_faces: usize) -> usize {
        if let Some(count) = self.craton_count {
            return count;
        }
        let base = total_faces as f64 * self.craton_density as f64;
        let scale = (self.radius as f64 / self.craton_reference_radius as f64)
            .powf(self.craton_exponent as f64);
        ((base * scale) as usize).max(self.craton_min_count)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0) {
            return Err(Error::config(format!("radius must be positive, got {}", self.radius)));
        }
        let amplitude = self.amplitude();
        if !(amplitude > 0.0) || !amplitude.is_finite() {
            return Err(Error::config(format!(
                "height amplitude must be positive, got {amplitude}"
            )));
        }
        if !(0.0..=1.0).contains(&self.oceanic_fraction) {
            return Err(Error::config(format!(
                "oceanic_fraction must lie in [0, 1], got {}",
                self.oceanic_fraction
            )));
        }
        if self.craton_count == Some(0) {
            return Err(Error::config("craton_count must be at least 1"));
        }
        if self.craton_count.is_none() && self.craton_min_count == 0 {
            return Err(Error::config("craton_min_count must be at least 1"));
        }
        if !(self.smoothing_decay > 0.0 && self.smoothing_decay < 1.0) {
            return Err(Error::config(format!(
                "smoothing_decay must lie in (0, 1), got {}",
                self.smoothing_decay
            )));
        }
        if !(self.peak_ratio > 0.0) {
            return Err(Error::config("peak_ratio must be positive"));
        }
        if !(self.boundary_threshold >= 0.0) {
            return Err(Error::config("boundary_threshold must be non-negative"));
        }
        if self.posterize_levels < 2 {
            return Err(Error::config("posterize_levels must be at least 2"));
        }
        if self.ocean_u_resolution < 3 || self.ocean_v_resolution < 2 {
            return Err(Error::config("ocean sphere resolution too small"));
        }
        if self.subdivision_depth > 9 {
            return Err(Error::config(format!(
                "subdivision_depth {} would exceed 5M faces",
                self.subdivision_depth
            )));
        }
        Ok(())
    }
}

fn named<T: FromStr<Err = Error>>(value: &serde_json::Value, field: &str) -> Result<T> {
    value
        .as_str()
        .ok_or_else(|| Error::config(format!("{field} must be a string, got {value}")))?
        .parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_parse() {
        assert_eq!("bfs".parse::<GrowthStrategy>().unwrap(), GrowthStrategy::Bfs);
        assert_eq!(" Voronoi ".parse::<GrowthStrategy>().unwrap(), GrowthStrategy::Voronoi);
        assert!(matches!(
            "flood".parse::<GrowthStrategy>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn craton_estimate_respects_minimum_and_override() {
        let mut p = Params::default();
        p.radius = 6371.0;
        assert_eq!(p.craton_count_for(20), 7);
        // 81920 faces * 1e-4 * (25500/6371)^1.5 ~= 65
        p.radius = 25_500.0;
        let n = p.craton_count_for(81_920);
        assert!((60..=70).contains(&n), "estimated {n}");
        p.craton_count = Some(3);
        assert_eq!(p.craton_count_for(81_920), 3);
    }

    #[test]
    fn rejects_non_positive_amplitude() {
        let p = Params {
            height_amplitude: Some(0.0),
            ..Params::default()
        };
        assert!(matches!(p.validate(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn json_fields_are_optional() {
        let p: Params = serde_json::from_str(r#"{"growth": "bfs", "seed": 7}"#).unwrap();
        assert_eq!(p.growth, GrowthStrategy::Bfs);
        assert_eq!(p.seed, 7);
        assert_eq!(p.smoothing_layers, 6);
    }

    #[test]
    fn unknown_names_in_json_are_configuration_errors() {
        for text in [
            r#"{"growth": "spiral"}"#,
            r#"{"method": "volcano"}"#,
            r#"{"growth": 3}"#,
        ] {
            let err = Params::from_json_str(text).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "{text}: {err}");
        }
        assert!(matches!(Params::from_json_str("{"), Err(Error::Json(_))));
    }

    #[test]
    fn config_file_with_unknown_strategy_is_rejected() {
        let path = std::env::temp_dir().join(format!("tectogen-params-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"growth": "spiral"}"#).unwrap();
        let result = Params::from_json_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn serde_accepts_what_from_str_accepts() {
        let p = Params::from_json_str(r#"{"growth": " Voronoi ", "method": "perlin"}"#).unwrap();
        assert_eq!(p.growth, GrowthStrategy::Voronoi);
        assert_eq!(p.method, ElevationMethod::Noise);
    }
}
