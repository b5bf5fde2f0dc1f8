//! Triangle and line rasterization into a [`FrameBuffer`].
//!
//! Triangles use the edge function algorithm: every sample center in the
//! screen-space bounding box is tested against the three edges, and the
//! normalized edge values are the barycentric weights.
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! Attributes are interpolated perspective-correct: color/w, uv/w and 1/w are
//! linear in screen space, so each is interpolated and the result divided by
//! the interpolated 1/w.

use crate::colors;
use crate::geometry::Vertex;
use crate::math::{Mat4, Vec2, Vec4};
use crate::texture::Texture;

use super::framebuffer::FrameBuffer;

/// Vertices with clip-space w at or below this are behind the eye.
pub const CLIP_W_EPSILON: f32 = 1e-5;

/// A vertex in clip space, before the perspective divide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub position: Vec4,
    pub color: Vec4,
    pub uv: Vec2,
}

impl ClipVertex {
    pub fn transform(vertex: &Vertex, view_projection: &Mat4) -> Self {
        Self {
            position: *view_projection * Vec4::from_vec3(vertex.position, 1.0),
            color: vertex.color,
            uv: vertex.uv,
        }
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            color: self.color.lerp(other.color, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }

    /// Signed distances to the planes lines are clipped against: the near
    /// plane (`z >= -w`) and the eye plane (`w >= CLIP_W_EPSILON`).
    fn plane_distances(&self) -> [f32; 2] {
        let Vec4 { z, w, .. } = self.position;
        [z + w, w - CLIP_W_EPSILON]
    }
}

/// A vertex after projection to the render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    /// Sample-space position, origin top-left.
    pub position: Vec2,
    pub inv_w: f32,
    /// Color divided by w.
    pub color_over_w: Vec4,
    /// UV divided by w.
    pub uv_over_w: Vec2,
}

impl ScreenVertex {
    /// Projects `vertex` onto a `width` x `height` target. Returns `None` when
    /// the vertex lies on or behind the eye plane.
    pub fn project(vertex: &Vertex, view_projection: &Mat4, width: f32, height: f32) -> Option<Self> {
        let clip = ClipVertex::transform(vertex, view_projection);
        if clip.position.w <= CLIP_W_EPSILON {
            return None;
        }
        Some(Self::from_clip(&clip, width, height))
    }

    /// Perspective divide and viewport mapping. `clip.position.w` must be
    /// positive.
    fn from_clip(clip: &ClipVertex, width: f32, height: f32) -> Self {
        let inv_w = 1.0 / clip.position.w;
        let ndc = Vec2::new(clip.position.x * inv_w, clip.position.y * inv_w);
        Self {
            position: Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height),
            inv_w,
            color_over_w: clip.color * inv_w,
            uv_over_w: clip.uv * inv_w,
        }
    }

    /// Screen-space interpolation; every field is linear in screen space.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            inv_w: self.inv_w + t * (other.inv_w - self.inv_w),
            color_over_w: self.color_over_w.lerp(other.color_over_w, t),
            uv_over_w: self.uv_over_w.lerp(other.uv_over_w, t),
        }
    }

    fn color(&self) -> Vec4 {
        self.color_over_w / self.inv_w
    }

    fn uv(&self) -> Vec2 {
        self.uv_over_w / self.inv_w
    }
}

/// Clips a clip-space segment to the part in front of the near plane.
/// Returns `None` when nothing of it is visible.
pub fn clip_line(a: &ClipVertex, b: &ClipVertex) -> Option<(ClipVertex, ClipVertex)> {
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (da, db) in a.plane_distances().into_iter().zip(b.plane_distances()) {
        if da.is_nan() || db.is_nan() || (da < 0.0 && db < 0.0) {
            return None;
        }
        if da < 0.0 {
            t0 = t0.max(da / (da - db));
        } else if db < 0.0 {
            t1 = t1.min(da / (da - db));
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((a.lerp(b, t0), a.lerp(b, t1)))
}

/// Liang-Barsky: the parameter range of `a -> b` inside the rectangle
/// `min..=max`, or `None` if the segment misses it.
fn clip_segment_to_rect(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> Option<(f32, f32)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

#[inline]
fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

#[inline]
fn shade(color: Vec4, uv: Vec2, texture: Option<&Texture>) -> u32 {
    match texture {
        Some(texture) => colors::pack_color(color * colors::unpack_color(texture.sample(uv.x, uv.y))),
        None => colors::pack_color(color),
    }
}

/// Fills a triangle with depth testing. Both windings are drawn.
pub fn fill_triangle(buffer: &mut FrameBuffer, v: [ScreenVertex; 3], texture: Option<&Texture>) {
    let [p0, p1, p2] = [v[0].position, v[1].position, v[2].position];

    let area = edge_function(p0, p1, p2);
    if area.abs() < f32::EPSILON {
        return;
    }
    let inv_area = 1.0 / area;

    let min_x = (p0.x.min(p1.x).min(p2.x).floor() as i32).max(0);
    let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i32).min(buffer.width() as i32 - 1);
    let min_y = (p0.y.min(p1.y).min(p2.y).floor() as i32).max(0);
    let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i32).min(buffer.height() as i32 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let w0 = edge_function(p1, p2, p);
            let w1 = edge_function(p2, p0, p);
            let w2 = edge_function(p0, p1, p);

            let inside = if area > 0.0 {
                w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
            } else {
                w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
            };
            if !inside {
                continue;
            }

            let l = [w0 * inv_area, w1 * inv_area, w2 * inv_area];
            let inv_w = l[0] * v[0].inv_w + l[1] * v[1].inv_w + l[2] * v[2].inv_w;
            if inv_w <= 0.0 {
                continue;
            }
            let color = (v[0].color_over_w * l[0] + v[1].color_over_w * l[1] + v[2].color_over_w * l[2])
                / inv_w;
            let uv = (v[0].uv_over_w * l[0] + v[1].uv_over_w * l[1] + v[2].uv_over_w * l[2]) / inv_w;

            buffer.set_pixel_with_depth(x, y, inv_w, shade(color, uv, texture));
        }
    }
}

/// Draws a line with Bresenham's algorithm, interpolating 1/w for the depth
/// test. Each step stamps a `thickness` x `thickness` block so lines stay one
/// screen pixel wide after the supersample resolve.
///
/// The segment is first clipped to the target (plus the stamp margin), so
/// endpoints far off screen cost nothing.
pub fn draw_line(
    buffer: &mut FrameBuffer,
    a: ScreenVertex,
    b: ScreenVertex,
    texture: Option<&Texture>,
    thickness: u32,
) {
    let margin = thickness as f32 + 1.0;
    let min = Vec2::new(-margin, -margin);
    let max = Vec2::new(buffer.width() as f32 + margin, buffer.height() as f32 + margin);
    let Some((t0, t1)) = clip_segment_to_rect(a.position, b.position, min, max) else {
        return;
    };
    let (a, b) = (a.lerp(&b, t0), a.lerp(&b, t1));

    let (x0, y0) = (a.position.x.floor() as i64, a.position.y.floor() as i64);
    let (x1, y1) = (b.position.x.floor() as i64, b.position.y.floor() as i64);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let steps = dx.max(dy).max(1);
    let x_step = if x0 < x1 { 1 } else { -1 };
    let y_step = if y0 < y1 { 1 } else { -1 };

    let (color_a, color_b) = (a.color(), b.color());
    let (uv_a, uv_b) = (a.uv(), b.uv());
    let thickness = thickness as i64;
    let offset = thickness / 2;

    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);
    let mut step = 0;

    loop {
        let t = step as f32 / steps as f32;
        let inv_w = a.inv_w + t * (b.inv_w - a.inv_w);
        let color = shade(color_a.lerp(color_b, t), uv_a.lerp(uv_b, t), texture);

        for oy in 0..thickness {
            for ox in 0..thickness {
                let (px, py) = (x + ox - offset, y + oy - offset);
                buffer.set_pixel_with_depth(px as i32, py as i32, inv_w, color);
            }
        }

        if x == x1 && y == y1 {
            break;
        }
        step += 1;

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += x_step;
        }
        if e2 < dx {
            err += dx;
            y += y_step;
        }
    }
}

/// Projects a world-space segment, clipped to the part in front of the near
/// plane.
pub fn project_line(
    a: &Vertex,
    b: &Vertex,
    view_projection: &Mat4,
    width: f32,
    height: f32,
) -> Option<(ScreenVertex, ScreenVertex)> {
    let (a, b) = clip_line(
        &ClipVertex::transform(a, view_projection),
        &ClipVertex::transform(b, view_projection),
    )?;
    Some((
        ScreenVertex::from_clip(&a, width, height),
        ScreenVertex::from_clip(&b, width, height),
    ))
}

/// Projects a world-space triangle, skipping it if any vertex is behind the eye.
pub fn project_triangle(
    vertices: [&Vertex; 3],
    view_projection: &Mat4,
    width: f32,
    height: f32,
) -> Option<[ScreenVertex; 3]> {
    Some([
        ScreenVertex::project(vertices[0], view_projection, width, height)?,
        ScreenVertex::project(vertices[1], view_projection, width, height)?,
        ScreenVertex::project(vertices[2], view_projection, width, height)?,
    ])
}
