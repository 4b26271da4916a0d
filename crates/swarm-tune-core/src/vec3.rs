//! Minimal helpers over `[f64; 3]`, the coordinate type used throughout.

pub type Vec3 = [f64; 3];

pub const ZERO: Vec3 = [0.0; 3];

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn norm_sq(a: Vec3) -> f64 {
    a[0] * a[0] + a[1] * a[1] + a[2] * a[2]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    norm_sq(a).sqrt()
}

/// `acc += v * s`
#[inline]
pub fn add_scaled(acc: &mut Vec3, v: Vec3, s: f64) {
    acc[0] += v[0] * s;
    acc[1] += v[1] * s;
    acc[2] += v[2] * s;
}

pub fn is_finite(a: Vec3) -> bool {
    a.iter().all(|c| c.is_finite())
}
