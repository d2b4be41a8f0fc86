use rand::Rng;
use serde::Serialize;

use crate::rng::standard_normal;
use crate::vec3::{self, Vec3};

/// Sentinel craton id for faces not yet claimed by growth.
pub const UNASSIGNED: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateType {
    Oceanic,
    Continental,
}

impl PlateType {
    pub fn is_oceanic(self) -> bool {
        self == Self::Oceanic
    }

    /// Elevation deposited on every face of a fresh craton of this type.
    pub fn base_elevation(self, amplitude: f32) -> f32 {
        match self {
            Self::Oceanic => -amplitude * 0.4,
            Self::Continental => amplitude * 0.1,
        }
    }
}

/// One rigid plate. Craton ids are indices into the craton list; the seed face
/// is the face the craton grew from.
#[derive(Clone, Debug, Serialize)]
pub struct Craton {
    pub seed_face: u32,
    pub plate_type: PlateType,
    pub motion: Vec3,
    pub base_elevation: f32,
}

/// Draws one unit motion direction per craton from an isotropic normal.
/// Near-zero draws are redrawn rather than normalized.
pub fn assign_motion_vectors<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| loop {
            let v = [
                standard_normal(rng),
                standard_normal(rng),
                standard_normal(rng),
            ];
            if vec3::length(v) > 1e-6 {
                if let Some(unit) = vec3::normalize(v) {
                    break unit;
                }
            }
        })
        .collect()
}

/// Per-type craton counts, for diagnostics.
pub fn type_counts(cratons: &[Craton]) -> (usize, usize) {
    let oceanic = cratons.iter().filter(|c| c.plate_type.is_oceanic()).count();
    (oceanic, cratons.len() - oceanic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn motion_vectors_are_unit_and_reproducible() {
        let a = assign_motion_vectors(32, &mut seeded(3));
        let b = assign_motion_vectors(32, &mut seeded(3));
        assert_eq!(a, b);
        for v in &a {
            assert!((vec3::length(*v) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn base_elevation_signs() {
        assert_eq!(PlateType::Oceanic.base_elevation(100.0), -40.0);
        assert_eq!(PlateType::Continental.base_elevation(100.0), 10.0);
    }
}
