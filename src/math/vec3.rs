use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};

use super::mat4::Mat4;
use super::vec4::Vec4;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    /// Right-handed: forward is -Z.
    pub const FORWARD: Self = Self::new(0.0, 0.0, -1.0);
    pub const BACK: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn rotate_x(&self, angle: f32) -> Self {
        let sin = angle.sin();
        let cos = angle.cos();
        Self {
            x: self.x,
            y: self.y * cos - self.z * sin,
            z: self.y * sin + self.z * cos,
        }
    }

    pub fn rotate_y(&self, angle: f32) -> Self {
        let sin = angle.sin();
        let cos = angle.cos();
        Self {
            x: self.x * cos + self.z * sin,
            y: self.y,
            z: -self.x * sin + self.z * cos,
        }
    }

    pub fn rotate_z(&self, angle: f32) -> Self {
        let sin = angle.sin();
        let cos = angle.cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
            z: self.z,
        }
    }

    /// Rotates around an arbitrary axis using the Euler-Rodrigues formula.
    ///
    /// The axis does not need to be normalized. A zero axis leaves the vector
    /// unchanged.
    pub fn rotate_by_axis(self, axis: Vec3, angle: f32) -> Self {
        let mut length = axis.length();
        if length == 0.0 {
            length = 1.0;
        }
        let axis = axis / length;

        let half = angle / 2.0;
        let w = axis * half.sin();
        let a = half.cos();

        let wv = w.cross(self);
        let wwv = w.cross(wv);

        self + wv * (2.0 * a) + wwv * 2.0
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(*self)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn scale(&self, scalar: f32) -> Self {
        *self * scalar
    }

    /// Returns the unit vector in the same direction.
    ///
    /// A zero-length vector is returned unchanged.
    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return *self;
        }
        *self * (1.0 / length)
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the cross product of two vectors.
    /// The resulting vector is perpendicular to both input vectors.
    pub fn cross(&self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Angle between two vectors in radians.
    ///
    /// Uses `atan2(|a x b|, a . b)`, which stays accurate near 0 and 180 degrees
    /// where `acos` of the normalized dot product loses precision.
    pub fn angle(self, other: Self) -> f32 {
        self.cross(other).length().atan2(self.dot(other))
    }

    /// Transforms the vector as a point (w = 1) without a perspective divide.
    pub fn transform(self, m: &Mat4) -> Self {
        (*m * Vec4::from_vec3(self, 1.0)).to_vec3()
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Component-wise addition of two vectors.
impl Add<Vec3> for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

/// Component-wise subtraction of two vectors.
impl Sub<Vec3> for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

/// Scalar multiplication of a vector.
impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

/// Component-wise multiplication of two vectors.
impl Mul<Vec3> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Self::Output {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

/// Scalar division of a vector.
impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

/// Component-wise division of two vectors.
impl Div<Vec3> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: Vec3) -> Self::Output {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

/// Negation of a vector.
impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Index<usize> for Vec3 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of range: {index}"),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 index out of range: {index}"),
        }
    }
}

impl AbsDiffEq for Vec3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Vec3 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn normalize_has_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(1e4, -2e4, 3e4),
        ] {
            assert_relative_eq!(v.normalize().length(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn cross_is_right_handed() {
        assert_relative_eq!(Vec3::RIGHT.cross(Vec3::UP), Vec3::BACK);
    }

    #[test]
    fn angle_is_stable_at_extremes() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(a.angle(a), 0.0);
        assert_relative_eq!(a.angle(-a), PI, epsilon = 1e-6);
        assert_relative_eq!(a.angle(Vec3::UP), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn rodrigues_matches_axis_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let by_axis = v.rotate_by_axis(Vec3::new(0.0, 5.0, 0.0), 0.7);
        assert_relative_eq!(by_axis, v.rotate_y(0.7), epsilon = 1e-5);
    }

    #[test]
    fn rodrigues_zero_axis_is_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.rotate_by_axis(Vec3::ZERO, 1.0), v);
    }

    #[test]
    fn transform_applies_translation() {
        let m = Mat4::translation(1.0, 2.0, 3.0);
        assert_relative_eq!(Vec3::ONE.transform(&m), Vec3::new(2.0, 3.0, 4.0));
    }
}
