//! Scalar helpers shared by the vector and quaternion code.

/// Tolerance used by the approximate comparisons and degenerate-case checks.
pub const EPSILON: f32 = 0.000_001;

pub const DEG2RAD: f32 = std::f32::consts::PI / 180.0;
pub const RAD2DEG: f32 = 180.0 / std::f32::consts::PI;

/// Clamps `value` into `[min, max]`.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    let result = if value < min { min } else { value };
    if result > max {
        max
    } else {
        result
    }
}

/// Linear interpolation between `start` and `end`.
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + t * (end - start)
}

/// Maps `value` from `[start, end]` to `[0, 1]`.
#[inline]
pub fn normalize(value: f32, start: f32, end: f32) -> f32 {
    (value - start) / (end - start)
}

/// Maps `value` from `[in_start, in_end]` to `[out_start, out_end]`.
#[inline]
pub fn remap(value: f32, in_start: f32, in_end: f32, out_start: f32, out_end: f32) -> f32 {
    (value - in_start) / (in_end - in_start) * (out_end - out_start) + out_start
}

/// Wraps `value` into `[min, max)`.
#[inline]
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    value - (max - min) * ((value - min) / (max - min)).floor()
}

/// Relative comparison: `|a - b| <= EPSILON * max(1, |a|, |b|)`.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON * 1.0_f32.max(a.abs().max(b.abs()))
}
