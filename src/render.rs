use rayon::prelude::*;

use crate::adjacency::Adjacency;
use crate::config::Params;
use crate::mesh::Mesh;
use crate::plates::distance::is_edge_face;
use crate::rng::splitmix32;
use crate::vec3::{self, Vec3};

pub type Rgb = [f32; 3];

const WHITE: Rgb = [1.0, 1.0, 1.0];
const TROPICAL_TINT: Rgb = [1.0, 0.85, 0.6];
const OCEAN_SHELL: Rgb = [0.7, 0.85, 1.0];
const OCEAN_SHELL_TROPICAL: Rgb = [1.0, 0.6, 0.0];
const ROCK: Rgb = [0.6, 0.6, 0.6];
const BARE_PEAK: Rgb = [0.85, 0.85, 0.85];

// Zone tops as fractions of the amplitude above sea level.
const GRASSLAND_TOP: f32 = 0.29;
const FOOTHILL_TOP: f32 = 0.42;
const MOUNTAIN_TOP: f32 = 0.58;

#[inline]
fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

#[inline]
fn clamp01(c: Rgb) -> Rgb {
    [c[0].clamp(0.0, 1.0), c[1].clamp(0.0, 1.0), c[2].clamp(0.0, 1.0)]
}

/// Base color of an elevation, before any latitude overlay.
pub fn elevation_color(elevation: f32, min_elevation: f32, sea_level: f32, amplitude: f32) -> Rgb {
    let grass_max = sea_level + amplitude * GRASSLAND_TOP;
    let foothill_max = sea_level + amplitude * FOOTHILL_TOP;
    let mountain_max = sea_level + amplitude * MOUNTAIN_TOP;

    if elevation < sea_level {
        // Deep water darkens toward the deepest face.
        let depth = if min_elevation != 0.0 {
            (elevation.abs() / min_elevation.abs()).min(1.0)
        } else {
            0.0
        };
        [0.0, 0.05 + 0.2 * (1.0 - depth), 0.3 + 0.5 * (1.0 - depth)]
    } else if elevation <= grass_max {
        let t = (elevation - sea_level) / (grass_max - sea_level);
        [0.3 * t, 0.6 + 0.3 * t, 0.2 * (1.0 - t)]
    } else if elevation <= foothill_max {
        let t = (elevation - grass_max) / (foothill_max - grass_max);
        [0.6 - 0.2 * t, 0.8 - 0.6 * t, 0.3 * t]
    } else if elevation <= mountain_max {
        let t = (elevation - foothill_max) / (mountain_max - foothill_max);
        mix(ROCK, BARE_PEAK, t)
    } else {
        let t = ((elevation - mountain_max) / (amplitude - (mountain_max - sea_level))).min(1.0);
        mix(BARE_PEAK, WHITE, t)
    }
}

/// Polar whitening, or tropical tint, by absolute latitude in degrees.
fn latitude_overlay(color: Rgb, latitude: f32, params: &Params, tropical: Rgb) -> Rgb {
    let lat = latitude.abs();
    if params.polar_overlay && lat >= params.polar_latitude {
        let fade = ((lat - params.polar_latitude) / params.polar_fade_range).min(1.0);
        mix(color, WHITE, fade)
    } else if params.tropical_overlay
        && lat <= params.tropical_latitude + params.tropical_fade_range
    {
        let fade = (1.0 - (lat - params.tropical_latitude) / params.tropical_fade_range).max(0.0);
        mix(color, tropical, fade)
    } else {
        color
    }
}

/// Per-face terrain colors from elevation (km) and face-center latitude.
pub fn face_colors(centers: &[Vec3], elevation: &[f32], amplitude: f32, params: &Params) -> Vec<Rgb> {
    let min_elevation = elevation.iter().copied().fold(f32::INFINITY, f32::min);
    centers
        .par_iter()
        .zip(elevation.par_iter())
        .map(|(&c, &e)| {
            let base = elevation_color(e, min_elevation, params.sea_level, amplitude);
            clamp01(latitude_overlay(base, vec3::latitude_deg(c), params, TROPICAL_TINT))
        })
        .collect()
}

/// Ocean shell colors: pale blue tinted by latitude only.
pub fn ocean_colors(mesh: &Mesh, params: &Params) -> Vec<Rgb> {
    let forced = Params {
        polar_overlay: true,
        tropical_overlay: true,
        ..params.clone()
    };
    (0..mesh.face_count())
        .map(|f| {
            let lat = vec3::latitude_deg(mesh.centroid(f));
            clamp01(latitude_overlay(OCEAN_SHELL, lat, &forced, OCEAN_SHELL_TROPICAL))
        })
        .collect()
}

/// Diagnostic palette: one hashed color per craton, craton edges in white.
pub fn craton_colors(adjacency: &Adjacency, assignment: &[u32]) -> Vec<Rgb> {
    (0..assignment.len())
        .into_par_iter()
        .map(|f| {
            if is_edge_face(adjacency, assignment, f) {
                return WHITE;
            }
            let h = splitmix32(assignment[f].wrapping_mul(7).wrapping_add(123));
            [
                ((h & 0xFF) as u8 | 60) as f32 / 255.0,
                (((h >> 8) & 0xFF) as u8 | 60) as f32 / 255.0,
                (((h >> 16) & 0xFF) as u8 | 60) as f32 / 255.0,
            ]
        })
        .collect()
}

#[inline]
pub fn to_rgba8(c: Rgb) -> [u8; 4] {
    [
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        255,
    ]
}

/// Equirectangular RGBA raster of per-face colors. Row 0 is the north pole,
/// column 0 is longitude -180. Triangles are filled in (lon, lat) space;
/// those straddling the antimeridian are drawn on both sides of the seam.
pub fn render_equirect(mesh: &Mesh, colors: &[Rgb], w: usize, h: usize) -> Vec<u8> {
    let mut rgba = vec![0u8; w * h * 4];
    let to_px = |(lon, lat): (f32, f32)| -> (f32, f32) {
        (
            (lon + std::f32::consts::PI) / std::f32::consts::TAU * w as f32,
            (std::f32::consts::FRAC_PI_2 - lat) / std::f32::consts::PI * h as f32,
        )
    };

    for (f, tri) in mesh.faces.iter().enumerate() {
        let color = to_rgba8(colors[f]);
        let mut ll = [(0.0f32, 0.0f32); 3];
        let mut polar = [false; 3];
        for k in 0..3 {
            let v = mesh.vertices[tri[k] as usize];
            let s = (v[2] / vec3::length(v)).clamp(-1.0, 1.0);
            polar[k] = s.abs() > 0.999_999;
            ll[k] = (vec3::longitude(v), s.asin());
        }
        unwrap_longitudes(&mut ll, &polar);

        for shape in polar_split(ll, &polar) {
            let pts = shape.map(to_px);
            fill_triangle(&mut rgba, w, h, pts, color);
            let min_x = pts.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
            let max_x = pts.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
            let shift = w as f32;
            if min_x < 0.0 {
                fill_triangle(&mut rgba, w, h, pts.map(|p| (p.0 + shift, p.1)), color);
            }
            if max_x > shift {
                fill_triangle(&mut rgba, w, h, pts.map(|p| (p.0 - shift, p.1)), color);
            }
        }
    }

    rgba
}

/// Make a triangle's longitudes contiguous (no jump across +/-pi).
fn unwrap_longitudes(ll: &mut [(f32, f32); 3], polar: &[bool; 3]) {
    use std::f32::consts::{PI, TAU};

    let Some(anchor) = (0..3).find(|&k| !polar[k]) else {
        return;
    };
    for k in 0..3 {
        if polar[k] {
            continue;
        }
        let d = ll[k].0 - ll[anchor].0;
        if d > PI {
            ll[k].0 -= TAU;
        } else if d < -PI {
            ll[k].0 += TAU;
        }
    }
}

/// A triangle touching a pole covers the whole top (or bottom) row between its
/// other two longitudes, so it is drawn as a quad reaching the pole row.
fn polar_split(ll: [(f32, f32); 3], polar: &[bool; 3]) -> Vec<[(f32, f32); 3]> {
    let Some(p) = (0..3).find(|&k| polar[k]) else {
        return vec![ll];
    };
    let a = ll[(p + 1) % 3];
    let b = ll[(p + 2) % 3];
    if polar[(p + 1) % 3] || polar[(p + 2) % 3] {
        return Vec::new();
    }
    let pole_lat = ll[p].1;
    vec![[a, b, (b.0, pole_lat)], [a, (b.0, pole_lat), (a.0, pole_lat)]]
}

fn fill_triangle(rgba: &mut [u8], w: usize, h: usize, p: [(f32, f32); 3], color: [u8; 4]) {
    let min_x = p.iter().map(|q| q.0).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
    let max_x = p.iter().map(|q| q.0).fold(f32::NEG_INFINITY, f32::max).ceil().min(w as f32 - 1.0) as i64;
    let min_y = p.iter().map(|q| q.1).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
    let max_y = p.iter().map(|q| q.1).fold(f32::NEG_INFINITY, f32::max).ceil().min(h as f32 - 1.0) as i64;
    if min_x > max_x || min_y > max_y {
        return;
    }

    let edge = |a: (f32, f32), b: (f32, f32), x: f32, y: f32| (b.0 - a.0) * (y - a.1) - (b.1 - a.1) * (x - a.0);
    let area = edge(p[0], p[1], p[2].0, p[2].1);
    if area == 0.0 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (sx, sy) = (x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(p[1], p[2], sx, sy) / area;
            let w1 = edge(p[2], p[0], sx, sy) / area;
            let w2 = edge(p[0], p[1], sx, sy) / area;
            // Small tolerance closes hairline gaps between neighbors.
            if w0 >= -0.02 && w1 >= -0.02 && w2 >= -0.02 {
                let i = (y as usize * w + x as usize) * 4;
                rgba[i..i + 4].copy_from_slice(&color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_follow_elevation() {
        let a = 100.0;
        let deep = elevation_color(-100.0, -100.0, 0.0, a);
        let shallow = elevation_color(-1.0, -100.0, 0.0, a);
        assert!(shallow[2] > deep[2]);
        let grass = elevation_color(10.0, -100.0, 0.0, a);
        assert!(grass[1] > grass[0]);
        let snow = elevation_color(100.0, -100.0, 0.0, a);
        assert!(snow.iter().all(|&c| (c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn poles_whiten() {
        let params = Params::default();
        let c = latitude_overlay([0.0, 0.5, 0.0], 89.0, &params, TROPICAL_TINT);
        assert!(c.iter().all(|&v| v > 0.9));
        let c = latitude_overlay([0.0, 0.5, 0.0], 10.0, &params, TROPICAL_TINT);
        assert_eq!(c, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn equirect_covers_the_sphere() {
        let mesh = Mesh::icosphere(1.0, 3);
        let colors = vec![[1.0, 0.0, 0.0]; mesh.faces.len()];
        let (w, h) = (128, 64);
        let rgba = render_equirect(&mesh, &colors, w, h);
        let painted = rgba.chunks(4).filter(|px| px[3] == 255).count();
        assert!(painted as f32 / (w * h) as f32 > 0.99, "painted {painted}");
    }
}
