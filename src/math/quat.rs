//! Rotation quaternion.
//!
//! `q` and `-q` describe the same rotation; use [`Quat::rotation_eq`] to
//! compare rotations rather than `==`.

use std::ops::{Add, Div, Mul, Neg, Sub};

use approx::{AbsDiffEq, RelativeEq};

use super::mat4::Mat4;
use super::scalar::{approx_eq, EPSILON};
use super::vec3::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn add_scalar(self, value: f32) -> Self {
        Self::new(self.x + value, self.y + value, self.z + value, self.w + value)
    }

    pub fn sub_scalar(self, value: f32) -> Self {
        Self::new(self.x - value, self.y - value, self.z - value, self.w - value)
    }

    pub fn scale(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar, self.w * scalar)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// A zero quaternion is returned unchanged.
    pub fn normalize(self) -> Self {
        let mut length = self.length();
        if length == 0.0 {
            length = 1.0;
        }
        self.scale(1.0 / length)
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse: conjugate divided by the squared length.
    pub fn invert(self) -> Self {
        let length_sq = self.dot(self);
        if length_sq == 0.0 {
            return self;
        }
        self.conjugate().scale(1.0 / length_sq)
    }

    pub fn lerp(self, other: Self, amount: f32) -> Self {
        self + (other - self).scale(amount)
    }

    pub fn nlerp(self, other: Self, amount: f32) -> Self {
        self.lerp(other, amount).normalize()
    }

    /// Spherical linear interpolation along the shortest arc.
    pub fn slerp(self, other: Self, amount: f32) -> Self {
        let mut other = other;
        let mut cos_half_theta = self.dot(other);

        if cos_half_theta < 0.0 {
            other = -other;
            cos_half_theta = -cos_half_theta;
        }

        if cos_half_theta >= 1.0 {
            return self;
        }
        if cos_half_theta > 0.95 {
            return self.nlerp(other, amount);
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        if sin_half_theta.abs() < EPSILON {
            return (self + other).scale(0.5);
        }

        let ratio_a = ((1.0 - amount) * half_theta).sin() / sin_half_theta;
        let ratio_b = (amount * half_theta).sin() / sin_half_theta;
        self.scale(ratio_a) + other.scale(ratio_b)
    }

    /// Cubic Hermite spline between `self` and `other` with the given
    /// tangents, as used by glTF cubic-spline animation channels.
    pub fn cubic_hermite_spline(
        self,
        out_tangent: Self,
        other: Self,
        in_tangent: Self,
        t: f32,
    ) -> Self {
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        (self.scale(h00) + out_tangent.scale(h10) + other.scale(h01) + in_tangent.scale(h11))
            .normalize()
    }

    /// Shortest rotation taking direction `from` onto direction `to`.
    pub fn from_to(from: Vec3, to: Vec3) -> Self {
        let from = from.normalize();
        let to = to.normalize();
        let cross = from.cross(to);
        let w = 1.0 + from.dot(to);

        if w < EPSILON {
            // Opposite directions: any axis orthogonal to `from` works.
            let mut axis = Vec3::RIGHT.cross(from);
            if axis.length() < EPSILON {
                axis = Vec3::UP.cross(from);
            }
            let axis = axis.normalize();
            return Self::new(axis.x, axis.y, axis.z, 0.0);
        }

        Self::new(cross.x, cross.y, cross.z, w).normalize()
    }

    /// Extracts the rotation of the upper 3x3 block.
    ///
    /// Branches on the largest of w, x, y, z to keep the square root
    /// argument well away from zero.
    pub fn from_mat4(m: &Mat4) -> Self {
        let (m00, m11, m22) = (m.get(0, 0), m.get(1, 1), m.get(2, 2));
        let candidates = [
            m00 + m11 + m22,
            m00 - m11 - m22,
            m11 - m00 - m22,
            m22 - m00 - m11,
        ];

        let mut biggest = 0;
        for (i, value) in candidates.iter().enumerate().skip(1) {
            if *value > candidates[biggest] {
                biggest = i;
            }
        }

        let value = (candidates[biggest] + 1.0).sqrt() * 0.5;
        let mult = 0.25 / value;

        let yz = m.get(2, 1) - m.get(1, 2);
        let zx = m.get(0, 2) - m.get(2, 0);
        let xy = m.get(1, 0) - m.get(0, 1);

        match biggest {
            0 => Self::new(yz * mult, zx * mult, xy * mult, value),
            1 => Self::new(
                value,
                (m.get(1, 0) + m.get(0, 1)) * mult,
                (m.get(0, 2) + m.get(2, 0)) * mult,
                yz * mult,
            ),
            2 => Self::new(
                (m.get(1, 0) + m.get(0, 1)) * mult,
                value,
                (m.get(2, 1) + m.get(1, 2)) * mult,
                zx * mult,
            ),
            _ => Self::new(
                (m.get(0, 2) + m.get(2, 0)) * mult,
                (m.get(2, 1) + m.get(1, 2)) * mult,
                value,
                xy * mult,
            ),
        }
    }

    pub fn to_mat4(self) -> Mat4 {
        Mat4::from_quat(self)
    }

    /// Rotation of `angle` radians around `axis`. A zero axis gives identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        if axis.length() == 0.0 {
            return Self::IDENTITY;
        }

        let axis = axis.normalize();
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos).normalize()
    }

    /// Returns `(axis, angle)`. The axis is +X when the angle is zero.
    pub fn to_axis_angle(self) -> (Vec3, f32) {
        let q = if self.w.abs() > 1.0 { self.normalize() } else { self };

        let angle = 2.0 * q.w.acos();
        let den = (1.0 - q.w * q.w).sqrt();

        let axis = if den > EPSILON {
            Vec3::new(q.x / den, q.y / den, q.z / den)
        } else {
            Vec3::RIGHT
        };

        (axis, angle)
    }

    /// Builds a rotation from Euler angles in radians: roll around X first,
    /// then pitch around Y, then yaw around Z.
    pub fn from_euler(roll: f32, pitch: f32, yaw: f32) -> Self {
        let (x1, x0) = (roll * 0.5).sin_cos();
        let (y1, y0) = (pitch * 0.5).sin_cos();
        let (z1, z0) = (yaw * 0.5).sin_cos();

        Self::new(
            x1 * y0 * z0 - x0 * y1 * z1,
            x0 * y1 * z0 + x1 * y0 * z1,
            x0 * y0 * z1 - x1 * y1 * z0,
            x0 * y0 * z0 + x1 * y1 * z1,
        )
    }

    /// Inverse of [`Quat::from_euler`]: returns `(roll, pitch, yaw)` as x, y, z.
    pub fn to_euler(self) -> Vec3 {
        let roll = (2.0 * (self.w * self.x + self.y * self.z))
            .atan2(1.0 - 2.0 * (self.x * self.x + self.y * self.y));

        let sin_pitch = (2.0 * (self.w * self.y - self.z * self.x)).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();

        let yaw = (2.0 * (self.w * self.z + self.x * self.y))
            .atan2(1.0 - 2.0 * (self.y * self.y + self.z * self.z));

        Vec3::new(roll, pitch, yaw)
    }

    /// Multiplies the quaternion, as a 4-vector, by a matrix.
    pub fn transform(self, m: &Mat4) -> Self {
        let row = |r: usize| {
            m.get(r, 0) * self.x + m.get(r, 1) * self.y + m.get(r, 2) * self.z + m.get(r, 3) * self.w
        };
        Self::new(row(0), row(1), row(2), row(3))
    }

    /// True when both quaternions describe the same rotation, i.e. they are
    /// component-wise equal within epsilon, up to sign.
    pub fn rotation_eq(self, other: Self) -> bool {
        let same = approx_eq(self.x, other.x)
            && approx_eq(self.y, other.y)
            && approx_eq(self.z, other.z)
            && approx_eq(self.w, other.w);
        let negated = approx_eq(self.x, -other.x)
            && approx_eq(self.y, -other.y)
            && approx_eq(self.z, -other.z)
            && approx_eq(self.w, -other.w);
        same || negated
    }

    /// Rotates a vector by a unit quaternion.
    pub fn rotate_vec3(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }
}

impl Add for Quat {
    type Output = Quat;

    fn add(self, rhs: Quat) -> Quat {
        Quat::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Quat {
    type Output = Quat;

    fn sub(self, rhs: Quat) -> Quat {
        Quat::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

/// Hamilton product. `q1 * q2` applies `q2` first, then `q1`.
impl Mul for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (rhs.x, rhs.y, rhs.z, rhs.w);

        Quat::new(
            ax * bw + aw * bx + ay * bz - az * by,
            ay * bw + aw * by + az * bx - ax * bz,
            az * bw + aw * bz + ax * by - ay * bx,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }
}

/// Component-wise division.
impl Div for Quat {
    type Output = Quat;

    fn div(self, rhs: Quat) -> Quat {
        Quat::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z, self.w / rhs.w)
    }
}

impl Neg for Quat {
    type Output = Quat;

    fn neg(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl AbsDiffEq for Quat {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
            && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

impl RelativeEq for Quat {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
            && self.w.relative_eq(&other.w, epsilon, max_relative)
    }
}
