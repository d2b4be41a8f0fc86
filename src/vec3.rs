//! Small helpers over `[f32; 3]`.

pub type Vec3 = [f32; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f32) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn length(a: Vec3) -> f32 {
    dot(a, a).sqrt()
}

/// Unit vector, or `None` when the input is (near) zero-length.
#[inline]
pub fn normalize(a: Vec3) -> Option<Vec3> {
    let len = length(a);
    if len > 1e-12 && len.is_finite() {
        Some(scale(a, 1.0 / len))
    } else {
        None
    }
}

/// Latitude in degrees of a direction, from its z component.
#[inline]
pub fn latitude_deg(a: Vec3) -> f32 {
    let len = length(a);
    if len == 0.0 {
        return 0.0;
    }
    (a[2] / len).clamp(-1.0, 1.0).asin().to_degrees()
}

/// Longitude in radians in (-pi, pi].
#[inline]
pub fn longitude(a: Vec3) -> f32 {
    a[1].atan2(a[0])
}
