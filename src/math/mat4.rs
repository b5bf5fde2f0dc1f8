//! 4x4 transformation matrix.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//! - Projections target OpenGL clip space (right-handed, NDC z in [-1, 1])
//!
//! # Example
//! ```ignore
//! let model = Mat4::translation(0.0, 1.0, 0.0) * Mat4::rotation_y(angle);
//! let clip = projection * view * model * Vec4::from(position);
//! ```

use std::ops::{Add, Mul, Sub};

use approx::{AbsDiffEq, RelativeEq};

use super::quat::Quat;
use super::vec3::Vec3;
use super::vec4::Vec4;

/// 4x4 matrix stored as `data[row][col]`.
///
/// Use [`Mat4::to_cols_array`] for the column-major layout GPU APIs expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self::new([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const ZERO: Self = Self::new([[0.0; 4]; 4]);

    /// Builds a matrix from rows.
    pub const fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Builds a matrix from 16 floats in column-major order.
    pub fn from_cols_array(cols: &[f32; 16]) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (col, chunk) in cols.chunks_exact(4).enumerate() {
            for (row, value) in chunk.iter().enumerate() {
                data[row][col] = *value;
            }
        }
        Mat4 { data }
    }

    /// Returns the 16 components in column-major order for upload.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = self.data[row][col];
            }
        }
        out
    }

    /// Creates a translation matrix.
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around +X when looking down the axis.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation of `angle` radians around an arbitrary axis.
    ///
    /// The axis is normalized first; a zero axis is used as-is, which yields
    /// a uniform `cos(angle)` scale on the diagonal.
    pub fn rotation_axis(axis: Vec3, angle: f32) -> Self {
        let Vec3 { x, y, z } = axis.normalize();
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;

        Mat4::new([
            [x * x * t + c, x * y * t - z * s, x * z * t + y * s, 0.0],
            [y * x * t + z * s, y * y * t + c, y * z * t - x * s, 0.0],
            [z * x * t - y * s, z * y * t + x * s, z * z * t + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotates around X, then Y, then Z: `Rz * Ry * Rx`.
    pub fn rotation_xyz(radians: Vec3) -> Self {
        Self::rotation_z(radians.z) * Self::rotation_y(radians.y) * Self::rotation_x(radians.x)
    }

    /// Rotates around Z, then Y, then X: `Rx * Ry * Rz`.
    pub fn rotation_zyx(radians: Vec3) -> Self {
        Self::rotation_x(radians.x) * Self::rotation_y(radians.y) * Self::rotation_z(radians.z)
    }

    /// Perspective projection for an off-center view volume.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fn_ = far - near;

        Mat4::new([
            [2.0 * near / rl, 0.0, (right + left) / rl, 0.0],
            [0.0, 2.0 * near / tb, (top + bottom) / tb, 0.0],
            [0.0, 0.0, -(far + near) / fn_, -2.0 * far * near / fn_],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Symmetric perspective projection.
    ///
    /// `fov_y` is the vertical field of view in radians. The frustum bounds are
    /// derived from the near plane and the viewport aspect ratio.
    pub fn perspective(fov_y: f32, width: f32, height: f32, near: f32, far: f32) -> Self {
        let top = near * (fov_y * 0.5).tan();
        let right = top * (width / height);
        Self::frustum(-right, right, -top, top, near, far)
    }

    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fn_ = far - near;

        Mat4::new([
            [2.0 / rl, 0.0, 0.0, -(right + left) / rl],
            [0.0, 2.0 / tb, 0.0, -(top + bottom) / tb],
            [0.0, 0.0, -2.0 / fn_, -(far + near) / fn_],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a right-handed view matrix.
    ///
    /// # Arguments
    ///
    /// * `eye` - The position of the camera.
    /// * `target` - The point the camera is looking at.
    /// * `up` - The approximate up direction of the camera.
    ///
    /// The camera looks down its local -Z. When `eye == target` or `up` is
    /// parallel to the view direction the basis degenerates but no NaN is
    /// produced.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let z = (eye - target).normalize();
        let x = up.cross(z).normalize();
        let y = z.cross(x);

        Self::new([
            [x.x, x.y, x.z, -x.dot(eye)],
            [y.x, y.y, y.z, -y.dot(eye)],
            [z.x, z.y, z.z, -z.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation matrix for a (unit) quaternion.
    pub fn from_quat(q: Quat) -> Self {
        let (x2, y2, z2) = (q.x * q.x, q.y * q.y, q.z * q.z);
        let (xy, xz, yz) = (q.x * q.y, q.x * q.z, q.y * q.z);
        let (wx, wy, wz) = (q.w * q.x, q.w * q.y, q.w * q.z);

        Mat4::new([
            [1.0 - 2.0 * (y2 + z2), 2.0 * (xy - wz), 2.0 * (xz + wy), 0.0],
            [2.0 * (xy + wz), 1.0 - 2.0 * (x2 + z2), 2.0 * (yz - wx), 0.0],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (x2 + y2), 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Returns `self * Mat4::translation(x, y, z)`.
    pub fn translate(&self, x: f32, y: f32, z: f32) -> Self {
        *self * Mat4::translation(x, y, z)
    }

    pub fn transpose(&self) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (row, values) in data.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.data[col][row];
            }
        }
        Mat4 { data }
    }

    /// Signed cofactor of the element at `[row][col]`.
    fn cofactor(&self, row: usize, col: usize) -> f32 {
        let mut minor = [[0.0f32; 3]; 3];
        let mut mr = 0;
        for r in (0..4).filter(|&r| r != row) {
            let mut mc = 0;
            for c in (0..4).filter(|&c| c != col) {
                minor[mr][mc] = self.data[r][c];
                mc += 1;
            }
            mr += 1;
        }

        let m = &minor;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

        if (row + col) % 2 == 0 {
            det
        } else {
            -det
        }
    }

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> f32 {
        (0..4).map(|col| self.data[0][col] * self.cofactor(0, col)).sum()
    }

    /// Computes the inverse of the matrix, if it exists.
    ///
    /// Returns `None` if the matrix is singular. `|det|` is compared with
    /// `f32::EPSILON` times Hadamard's bound (the smaller of the products of
    /// row and of column lengths), so the test does not depend on the
    /// matrix's overall scale.
    pub fn inverse(&self) -> Option<Mat4> {
        let det = self.determinant();
        let row_bound: f32 = (0..4).map(|row| self.row(row).length()).product();
        let col_bound: f32 = (0..4).map(|col| self.col(col).length()).product();
        if !det.is_finite() || det.abs() <= f32::EPSILON * row_bound.min(col_bound) {
            return None;
        }

        let inv_det = 1.0 / det;

        // Adjugate: transpose of the cofactor matrix.
        let mut data = [[0.0; 4]; 4];
        for (row, values) in data.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.cofactor(col, row) * inv_det;
            }
        }
        Some(Mat4 { data })
    }

    /// Transforms a point (w = 1) and divides by the resulting w.
    ///
    /// When w is zero the undivided xyz is returned.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let v = *self * Vec4::from_vec3(p, 1.0);
        v.perspective_divide().unwrap_or_else(|| v.to_vec3())
    }

    /// Transforms a direction (w = 0); translation is ignored.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(v, 0.0)).to_vec3()
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }

    /// Set element at [row][col].
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row][col] = value;
    }

    /// Row `row` as a vector.
    pub fn row(&self, row: usize) -> Vec4 {
        let [x, y, z, w] = self.data[row];
        Vec4::new(x, y, z, w)
    }

    /// Column `col` as a vector.
    pub fn col(&self, col: usize) -> Vec4 {
        Vec4::new(
            self.data[0][col],
            self.data[1][col],
            self.data[2][col],
            self.data[3][col],
        )
    }
}

impl Add<Mat4> for Mat4 {
    type Output = Mat4;

    fn add(mut self, rhs: Mat4) -> Self::Output {
        for (lhs_row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (a, b) in lhs_row.iter_mut().zip(rhs_row.iter()) {
                *a += *b;
            }
        }
        self
    }
}

impl Sub<Mat4> for Mat4 {
    type Output = Mat4;

    fn sub(mut self, rhs: Mat4) -> Self::Output {
        for (lhs_row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (a, b) in lhs_row.iter_mut().zip(rhs_row.iter()) {
                *a -= *b;
            }
        }
        self
    }
}

/// Matrix multiplication: `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for (row, values) in result.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.data[row][k] * rhs.data[k][col]).sum();
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: usize| {
            self.data[r][0] * v.x
                + self.data[r][1] * v.y
                + self.data[r][2] * v.z
                + self.data[r][3] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Mat4 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn translation_times_rotation_rotates_first() {
        let m = Mat4::translation(5.0, 0.0, 0.0) * Mat4::rotation_z(FRAC_PI_2);
        let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vec3::new(5.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn axis_rotations_match_vector_rotations() {
        let v = Vec3::new(0.3, -1.2, 2.5);
        let a = 0.8;
        assert_relative_eq!(Mat4::rotation_x(a).transform_vector(v), v.rotate_x(a), epsilon = 1e-6);
        assert_relative_eq!(Mat4::rotation_y(a).transform_vector(v), v.rotate_y(a), epsilon = 1e-6);
        assert_relative_eq!(Mat4::rotation_z(a).transform_vector(v), v.rotate_z(a), epsilon = 1e-6);
    }

    #[test]
    fn rotation_axis_matches_rodrigues() {
        let axis = Vec3::new(1.0, 2.0, -0.5);
        let v = Vec3::new(-3.0, 0.5, 1.0);
        let m = Mat4::rotation_axis(axis, 1.1);
        assert_relative_eq!(m.transform_vector(v), v.rotate_by_axis(axis, 1.1), epsilon = 1e-5);
    }

    #[test]
    fn rotation_orders_compose() {
        let r = Vec3::new(0.1, 0.2, 0.3);
        let xyz = Mat4::rotation_z(0.3) * Mat4::rotation_y(0.2) * Mat4::rotation_x(0.1);
        assert_relative_eq!(Mat4::rotation_xyz(r), xyz);
        let zyx = Mat4::rotation_x(0.1) * Mat4::rotation_y(0.2) * Mat4::rotation_z(0.3);
        assert_relative_eq!(Mat4::rotation_zyx(r), zyx);
    }

    #[test]
    fn inverse_times_self_is_identity() {
        let m = Mat4::translation(1.0, -2.0, 3.0)
            * Mat4::rotation_axis(Vec3::new(1.0, 1.0, 0.0), 0.7)
            * Mat4::scaling(2.0, 0.5, 3.0);
        let inv = m.inverse().expect("invertible");
        assert_relative_eq!(m * inv, Mat4::IDENTITY, epsilon = 1e-5);
        assert_relative_eq!(inv * m, Mat4::IDENTITY, epsilon = 1e-5);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Mat4::scaling(1.0, 0.0, 1.0).inverse().is_none());
        assert!(Mat4::ZERO.inverse().is_none());
    }

    #[test]
    fn small_uniform_scale_is_invertible() {
        let m = Mat4::scaling(0.001, 0.001, 0.001);
        let inv = m.inverse().expect("invertible");
        assert_relative_eq!(inv, Mat4::scaling(1000.0, 1000.0, 1000.0), epsilon = 1e-2);

        let tiny = Mat4::translation(1.0, 2.0, 3.0) * Mat4::scaling(1e-3, 2e-3, 5e-4);
        let inv = tiny.inverse().expect("invertible");
        assert_relative_eq!(tiny * inv, Mat4::IDENTITY, epsilon = 1e-4);
    }

    #[test]
    fn proportional_rows_have_no_inverse() {
        let mut m = Mat4::IDENTITY;
        for (col, value) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            m.set(0, col, value);
            m.set(1, col, value * 2.0);
        }
        assert!(m.inverse().is_none());
    }

    #[test]
    fn determinant_of_scale() {
        assert_relative_eq!(Mat4::scaling(2.0, 3.0, -4.0).determinant(), -24.0);
        assert_relative_eq!(Mat4::rotation_y(1.3).determinant(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn cols_array_is_column_major() {
        let m = Mat4::translation(7.0, 8.0, 9.0);
        let cols = m.to_cols_array();
        assert_eq!(&cols[12..15], &[7.0, 8.0, 9.0]);
        assert_eq!(Mat4::from_cols_array(&cols), m);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let p = Mat4::perspective(FRAC_PI_2, 800.0, 600.0, 0.1, 100.0);
        let near = p.transform_point(Vec3::new(0.0, 0.0, -0.1));
        let far = p.transform_point(Vec3::new(0.0, 0.0, -100.0));
        assert_relative_eq!(near.z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn orthographic_maps_box_to_cube() {
        let o = Mat4::orthographic(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
        assert_relative_eq!(
            o.transform_point(Vec3::new(2.0, -1.0, -10.0)),
            Vec3::new(1.0, -1.0, 1.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn look_at_moves_target_onto_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::UP);
        assert_relative_eq!(view.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn look_at_degenerate_has_no_nan() {
        let view = Mat4::look_at(Vec3::ONE, Vec3::ONE, Vec3::UP);
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn add_and_sub() {
        let m = Mat4::scaling(1.0, 2.0, 3.0);
        assert_eq!(m + m - m, m);
    }
}
