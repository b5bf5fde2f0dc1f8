//! Ray casting against planes and rectangles, used for mouse picking.

use crate::math::Vec3;

/// Below this `|direction . normal|` the ray is treated as parallel to a plane.
const PARALLEL_EPSILON: f32 = 0.000_001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray parameter where the ray meets the plane through `p1`, `p2`, `p3`.
    ///
    /// Negative values mean the plane is behind the origin. Returns `None`
    /// when the ray is parallel to the plane.
    pub fn parameter_of(&self, p1: Vec3, p2: Vec3, p3: Vec3) -> Option<f32> {
        let normal = (p2 - p1).cross(p3 - p1);
        let denom = self.direction.dot(normal);

        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        Some((p1 - self.origin).dot(normal) / denom)
    }
}

/// Intersection of `ray` with the plane through three points.
///
/// Points behind the ray origin are returned as well; use
/// [`Ray::parameter_of`] to tell them apart.
pub fn intersect_ray_with_plane(ray: &Ray, p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Vec3> {
    ray.parameter_of(p1, p2, p3).map(|t| ray.at(t))
}

/// True when `p` lies within the rectangle spanned by the consecutive corners
/// `a`, `b`, `c` (edges inclusive). `p` is assumed to be on the rectangle's
/// plane.
pub fn point_in_rectangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let ab = a - b;
    let bc = b - c;
    let ap = a - p;
    let bp = b - p;

    let ab_ap = ab.dot(ap);
    let bc_bp = bc.dot(bp);

    (0.0..=ab.dot(ab)).contains(&ab_ap) && (0.0..=bc.dot(bc)).contains(&bc_bp)
}
