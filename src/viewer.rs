//! Per-frame context tying camera, input, geometry and textures together.
//!
//! A frame runs in a fixed order:
//!
//! 1. the window feeds events into [`Viewer::input_mut`]
//! 2. [`Viewer::update`] moves the camera and rebuilds matrices and the pick ray
//! 3. [`Viewer::begin_frame`] clears the batch, then scene code pushes geometry
//! 4. [`Viewer::render`] hands the published batch to a backend
//! 5. [`Viewer::end_frame`] rolls input state over to the next frame

use log::trace;

use crate::camera::{Camera, CameraController, CameraMode};
use crate::config::ViewerConfig;
use crate::geometry::GeometryBatch;
use crate::input::InputState;
use crate::intersect::Ray;
use crate::math::Mat4;
use crate::projection::{self, Projection};
use crate::render::RenderBackend;
use crate::texture::TextureRegistry;

pub struct Viewer {
    camera: Camera,
    controller: CameraController,
    input: InputState,
    batch: GeometryBatch,
    textures: TextureRegistry,
    projection: Projection,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    pick_ray: Option<Ray>,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        let (width, height) = (config.window.width, config.window.height);
        let camera = Camera::new(config.camera.position(), config.camera.yaw, config.camera.pitch);
        let projection = Projection::from_degrees(
            config.camera.fov_y,
            width as f32,
            height as f32,
            config.camera.z_near,
            config.camera.z_far,
        );

        Self {
            view_matrix: camera.view_matrix(),
            projection_matrix: projection.matrix(),
            camera,
            controller: CameraController::new(config.camera.speed, config.camera.sensitivity),
            input: InputState::new(width, height),
            batch: GeometryBatch::new(config.geometry.capacity()),
            textures: TextureRegistry::new(config.render.textures),
            projection,
            pick_ray: None,
        }
    }

    /// Camera update, then view/projection, then the pick ray in Select mode.
    pub fn update(&mut self, delta_time: f32) {
        self.controller
            .update(&mut self.camera, &mut self.input, delta_time);

        self.view_matrix = self.camera.view_matrix();
        self.projection_matrix = self.projection.matrix();

        self.pick_ray = match self.camera.mode() {
            CameraMode::Select => projection::pick_ray(
                self.input.mouse_position(),
                self.projection.viewport(),
                &self.projection_matrix,
                &self.view_matrix,
                self.camera.position(),
            ),
            CameraMode::Fly | CameraMode::Disabled => None,
        };
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width as f32, height as f32);
        self.projection_matrix = self.projection.matrix();
    }

    pub fn begin_frame(&mut self) {
        self.batch.begin_frame();
    }

    /// Publishes this frame's geometry to `backend`.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        let stats = self.batch.stats();
        trace!(
            "frame: {} vertices, {} triangle indices, {} line indices, {} dedup hits",
            stats.vertices,
            stats.triangle_indices,
            stats.line_indices,
            stats.dedup_hits
        );

        let view_projection = self.view_projection();
        backend.draw(&self.batch.frame(), &view_projection, &self.textures);
    }

    pub fn end_frame(&mut self) {
        self.input.begin_frame();
    }

    pub fn batch_mut(&mut self) -> &mut GeometryBatch {
        &mut self.batch
    }

    pub fn batch(&self) -> &GeometryBatch {
        &self.batch
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Ray under the pointer, available only in Select mode.
    pub fn pick_ray(&self) -> Option<Ray> {
        self.pick_ray
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::geometry::FrameGeometry;
    use crate::input::MouseButton;
    use crate::math::{Vec3, Vec4};
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct RecordingBackend {
        draws: usize,
        triangles: usize,
        lines: usize,
        view_projection: Mat4,
    }

    impl RenderBackend for RecordingBackend {
        fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
            Ok(())
        }

        fn draw(&mut self, frame: &FrameGeometry<'_>, view_projection: &Mat4, _: &TextureRegistry) {
            self.draws += 1;
            self.triangles = frame.triangle_count();
            self.lines = frame.line_count();
            self.view_projection = *view_projection;
        }

        fn frame_bytes(&self) -> &[u8] {
            &[]
        }

        fn size(&self) -> (u32, u32) {
            (0, 0)
        }
    }

    fn viewer() -> Viewer {
        Viewer::new(&ViewerConfig::default())
    }

    #[test]
    fn centered_pick_ray_follows_front() {
        let mut viewer = viewer();
        viewer.update(0.016);

        let ray = viewer.pick_ray().unwrap();
        assert_relative_eq!(ray.origin, viewer.camera().position(), epsilon = 1e-5);
        assert_relative_eq!(ray.direction, viewer.camera().front(), epsilon = 1e-4);
    }

    #[test]
    fn fly_mode_has_no_pick_ray() {
        let mut viewer = viewer();
        viewer.input_mut().process_mouse_button(MouseButton::Right, true);
        viewer.update(0.016);

        assert_eq!(viewer.camera().mode(), CameraMode::Fly);
        assert!(viewer.pick_ray().is_none());
    }

    #[test]
    fn render_publishes_batch_with_view_projection() {
        let mut viewer = viewer();
        let mut backend = RecordingBackend::default();
        viewer.update(0.016);

        viewer.begin_frame();
        viewer
            .batch_mut()
            .push_line(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0)
            .unwrap();
        viewer
            .batch_mut()
            .push_quad(Vec3::ZERO, Vec4::ONE, 1.0, 1.0, 0)
            .unwrap();
        viewer.render(&mut backend);

        assert_eq!(backend.draws, 1);
        assert_eq!(backend.triangles, 2);
        assert_eq!(backend.lines, 1);
        assert_relative_eq!(backend.view_projection, viewer.view_projection());

        viewer.end_frame();
        viewer.begin_frame();
        viewer.render(&mut backend);
        assert_eq!(backend.triangles, 0);
        assert_eq!(backend.lines, 0);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut viewer = viewer();
        viewer.resize(400, 400);
        assert_relative_eq!(viewer.projection().aspect_ratio(), 1.0);
        assert_relative_eq!(viewer.projection_matrix(), viewer.projection().matrix());
    }

    #[test]
    fn end_frame_rolls_input() {
        let mut viewer = viewer();
        viewer.input_mut().process_mouse_button(MouseButton::Left, true);
        assert!(viewer.input().is_mouse_pressed(MouseButton::Left));
        viewer.end_frame();
        assert!(!viewer.input().is_mouse_pressed(MouseButton::Left));
        assert!(viewer.input().is_mouse_down(MouseButton::Left));
    }
}
