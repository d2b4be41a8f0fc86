/// Deterministic hashing (splitmix64/32) for noise lattices, plus draw helpers
/// over an injected `rand::Rng`. No stateful RNG in per-face inner loops.
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[inline]
pub fn splitmix32(mut x: u32) -> u32 {
    x = x.wrapping_add(0x9E3779B9);
    let mut z = x;
    z = (z ^ (z >> 16)).wrapping_mul(0x7FEB352D);
    z = (z ^ (z >> 15)).wrapping_mul(0x846CA68B);
    z ^ (z >> 16)
}

/// Hash of an integer lattice point in 3D.
#[inline]
pub fn hash3(ix: i32, iy: i32, iz: i32, seed: u32) -> u32 {
    let mut h = seed ^ 0x9E3779B9;
    h = splitmix32(h ^ (ix as u32).wrapping_mul(0x85EBCA6B));
    h = splitmix32(h ^ (iy as u32).wrapping_mul(0xC2B2AE35));
    h = splitmix32(h ^ (iz as u32).wrapping_mul(0x27D4EB2F));
    h
}

/// Default random source for a run.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream keyed by a run salt and a stable key (e.g. a craton's seed face).
pub fn keyed(salt: u64, key: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(splitmix64(salt ^ splitmix64(key)))
}

/// Standard normal draw (Box-Muller).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // 1 - u keeps the log argument in (0, 1]
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    ((-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()) as f32
}

pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
    mean + std_dev * standard_normal(rng)
}

/// Uniform draw in `[-half_width, +half_width]`.
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, half_width: f32) -> f32 {
    if half_width <= 0.0 {
        return 0.0;
    }
    rng.random_range(-half_width..=half_width)
}
