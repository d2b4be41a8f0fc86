use crate::rng::hash3;

#[inline]
fn smootherstep(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn grad(hash: u32, dx: f32, dy: f32, dz: f32) -> f32 {
    // 12 cube-edge gradients; 12..15 repeat a subset so the mask stays cheap.
    match hash & 15 {
        0 | 12 => dx + dy,
        1 | 13 => -dx + dy,
        2 => dx - dy,
        3 => -dx - dy,
        4 => dx + dz,
        5 => -dx + dz,
        6 => dx - dz,
        7 => -dx - dz,
        8 => dy + dz,
        9 | 14 => -dy + dz,
        10 => dy - dz,
        _ => -dy - dz,
    }
}

/// 3D gradient noise (Perlin-style), roughly in [-1, 1].
/// Sampled on the sphere so there is no seam or pole pinching.
pub fn gradient_noise3(p: [f32; 3], seed: u32) -> f32 {
    let ix = p[0].floor() as i32;
    let iy = p[1].floor() as i32;
    let iz = p[2].floor() as i32;
    let fx = p[0] - ix as f32;
    let fy = p[1] - iy as f32;
    let fz = p[2] - iz as f32;
    let sx = smootherstep(fx);
    let sy = smootherstep(fy);
    let sz = smootherstep(fz);

    let corner = |cx: i32, cy: i32, cz: i32| {
        grad(
            hash3(ix + cx, iy + cy, iz + cz, seed),
            fx - cx as f32,
            fy - cy as f32,
            fz - cz as f32,
        )
    };

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), sx);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), sx);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), sx);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), sx);
    let y0 = lerp(x00, x10, sy);
    let y1 = lerp(x01, x11, sy);
    lerp(y0, y1, sz)
}

/// Fractal Brownian Motion over 3D gradient noise, normalized by total amplitude.
pub fn fbm3(p: [f32; 3], seed: u32, octaves: u32, freq0: f32, lac: f32, gain: f32) -> f32 {
    let mut sum = 0.0;
    let mut amp = 1.0;
    let mut freq = freq0;
    let mut norm = 0.0;
    for i in 0..octaves {
        let q = [p[0] * freq, p[1] * freq, p[2] * freq];
        sum += gradient_noise3(q, seed.wrapping_add(i)) * amp;
        norm += amp;
        amp *= gain;
        freq *= lac;
    }
    if norm > 0.0 { sum / norm } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_zero_on_lattice_and_bounded() {
        assert_eq!(gradient_noise3([3.0, -2.0, 5.0], 11), 0.0);
        for i in 0..500 {
            let t = i as f32 * 0.173;
            let v = gradient_noise3([t, t * 0.7 + 1.3, -t * 1.9], 4);
            assert!(v.abs() <= 2.0, "noise {v} out of range");
        }
    }

    #[test]
    fn fbm_is_continuous() {
        let a = fbm3([0.5, 0.25, 0.125], 3, 4, 2.0, 2.0, 0.5);
        let b = fbm3([0.5001, 0.25, 0.125], 3, 4, 2.0, 2.0, 0.5);
        assert!((a - b).abs() < 0.01);
    }
}
