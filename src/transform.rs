//! Translation, rotation and scale of an object.
//!
//! Provides a [`Transform`] struct with a fluent API, conversion to a model
//! matrix and decomposition of an affine matrix back into its parts.

use crate::math::{Mat4, Quat, Vec3};

/// A 3D transform with translation, quaternion rotation, and scale.
///
/// Provides a fluent API where mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_translation_xyz(5.0, 2.0, 0.0)
///     .rotate_axis(Vec3::UP, 0.1)
///     .set_scale_uniform(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self
    }

    pub fn set_translation_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translation = Vec3::new(x, y, z);
        self
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.translation += delta;
        self
    }

    pub fn set_rotation(&mut self, rotation: Quat) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Applies an extra rotation after the current one.
    pub fn rotate(&mut self, delta: Quat) -> &mut Self {
        self.rotation = (delta * self.rotation).normalize();
        self
    }

    pub fn rotate_axis(&mut self, axis: Vec3, angle: f32) -> &mut Self {
        self.rotate(Quat::from_axis_angle(axis, angle))
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Model matrix: `Translation * Rotation * Scale`.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation.x, self.translation.y, self.translation.z)
            * self.rotation.to_mat4()
            * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Decomposes an affine matrix built as `T * R * S`.
    ///
    /// Scale is the length of each basis column, negated on all axes when the
    /// upper 3x3 determinant is negative. A matrix with zero determinant
    /// decomposes to an identity rotation.
    pub fn from_matrix(m: &Mat4) -> Self {
        let translation = m.col(3).to_vec3();
        let columns = [m.col(0).to_vec3(), m.col(1).to_vec3(), m.col(2).to_vec3()];

        let det = columns[0].dot(columns[1].cross(columns[2]));

        let mut scale = Vec3::new(columns[0].length(), columns[1].length(), columns[2].length());
        if det < 0.0 {
            scale = -scale;
        }

        if det.abs() < f32::EPSILON {
            return Self {
                translation,
                rotation: Quat::IDENTITY,
                scale,
            };
        }

        let mut rotation = Mat4::IDENTITY;
        for (col, basis) in columns.iter().enumerate() {
            let unit = *basis / scale[col];
            for row in 0..3 {
                rotation.set(row, col, unit[row]);
            }
        }

        Self {
            translation,
            rotation: Quat::from_mat4(&rotation).normalize(),
            scale,
        }
    }

    /// Inverse transpose of the rotation and scale part, for transforming
    /// normals under non-uniform scale.
    pub fn normal_matrix(&self) -> Mat4 {
        let rotation_scale =
            self.rotation.to_mat4() * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z);

        rotation_scale
            .inverse()
            .unwrap_or(Mat4::IDENTITY)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.to_matrix(), Mat4::identity());
    }

    #[test]
    fn fluent_api() {
        let mut t = Transform::new();
        t.set_translation_xyz(1.0, 2.0, 3.0)
            .translate(Vec3::new(1.0, 0.0, 0.0))
            .set_scale_uniform(2.0);

        assert_eq!(t.translation, Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::splat(2.0));
    }

    #[test]
    fn decompose_round_trip() {
        let mut t = Transform::new();
        t.set_translation_xyz(1.0, -2.0, 3.0)
            .rotate_axis(Vec3::new(1.0, 1.0, 0.0), 0.6)
            .set_scale(Vec3::new(2.0, 3.0, 0.5));

        let decomposed = Transform::from_matrix(&t.to_matrix());
        assert_relative_eq!(decomposed.translation, t.translation, epsilon = 1e-5);
        assert_relative_eq!(decomposed.scale, t.scale, epsilon = 1e-5);
        assert_relative_eq!(decomposed.to_matrix(), t.to_matrix(), epsilon = 1e-5);
    }

    #[test]
    fn decompose_negative_scale() {
        let mut t = Transform::new();
        t.rotate_axis(Vec3::UP, 0.4).set_scale_uniform(-2.0);

        let decomposed = Transform::from_matrix(&t.to_matrix());
        assert_relative_eq!(decomposed.scale, Vec3::splat(-2.0), epsilon = 1e-5);
        let q = decomposed.rotation;
        assert!(
            approx::relative_eq!(q, t.rotation, epsilon = 1e-5)
                || approx::relative_eq!(-q, t.rotation, epsilon = 1e-5)
        );
        assert_relative_eq!(decomposed.to_matrix(), t.to_matrix(), epsilon = 1e-5);
    }

    #[test]
    fn decompose_degenerate_gives_identity_rotation() {
        let decomposed = Transform::from_matrix(&Mat4::scaling(1.0, 0.0, 1.0));
        assert_eq!(decomposed.rotation, Quat::IDENTITY);
        assert_eq!(decomposed.scale, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = t.normal_matrix();
        assert_relative_eq!(n.get(0, 0), 0.5);
    }
}
