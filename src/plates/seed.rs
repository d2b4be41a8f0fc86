use rand::Rng;
use rand::seq::index;

use crate::error::{Error, Result};

use super::properties::PlateType;

/// A chosen seed face and the plate type it will grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CratonSeed {
    pub face: u32,
    pub plate_type: PlateType,
}

/// Pick `count` distinct seed faces out of `total_faces`, then type each one:
/// oceanic when a uniform draw falls below `oceanic_fraction`.
///
/// `count` must leave room for growth, so `count >= total_faces` is rejected.
pub fn seed_cratons<R: Rng + ?Sized>(
    total_faces: usize,
    count: usize,
    oceanic_fraction: f32,
    rng: &mut R,
) -> Result<Vec<CratonSeed>> {
    if count == 0 {
        return Err(Error::config("craton count must be at least 1"));
    }
    if count >= total_faces {
        return Err(Error::config(format!(
            "craton count {count} must be smaller than the face count {total_faces}"
        )));
    }
    if u32::try_from(total_faces).is_err() {
        return Err(Error::config(format!("{total_faces} faces exceed the u32 index space")));
    }

    // All seed faces are drawn before any plate type.
    let faces = index::sample(rng, total_faces, count).into_vec();
    let seeds = faces
        .into_iter()
        .map(|face| {
            let plate_type = if rng.random::<f32>() < oceanic_fraction {
                PlateType::Oceanic
            } else {
                PlateType::Continental
            };
            CratonSeed {
                face: face as u32,
                plate_type,
            }
        })
        .collect();

    Ok(seeds)
}
