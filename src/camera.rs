//! Free-fly camera with a select/fly mode machine.
//!
//! # Coordinate System
//!
//! Right-handed, +Y up. With yaw -90 degrees and pitch 0 the camera looks
//! down -Z.
//!
//! # Orientation
//!
//! Orientation is stored as yaw/pitch in **degrees**; the front/right/up basis
//! is recomputed whenever they change.
//!
//! - **Yaw**: rotation around world Y, measured from +X toward +Z
//! - **Pitch**: elevation above the horizon, clamped to [-89, 89]

use log::debug;

use crate::input::{InputState, Key, MouseButton};
use crate::math::{Mat4, Vec3};

pub const WORLD_UP: Vec3 = Vec3::UP;
pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 8.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.2;
pub const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Pointer is free; the scene can be picked with a mouse ray.
    Select,
    /// Look button held; WASD/QE move and the mouse turns the camera.
    Fly,
    /// Input is ignored until the mode is changed explicitly.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    yaw: f32,
    pitch: f32,
    mode: CameraMode,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), DEFAULT_YAW, DEFAULT_PITCH)
    }
}

impl Camera {
    /// Creates a camera in `Select` mode. Angles are in degrees.
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::FORWARD,
            up: WORLD_UP,
            right: Vec3::RIGHT,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            mode: CameraMode::Select,
        };
        camera.update_vectors();
        camera
    }

    /// Recomputes front, right and up from yaw and pitch.
    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());

        self.front = front.normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Adds yaw/pitch deltas in degrees. Pitch is clamped to [-89, 89].
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            debug!("camera mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }
}

// =============================================================================
// Camera Controller
// =============================================================================

/// Drives a [`Camera`] from [`InputState`].
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Movement speed in units per second.
    pub speed: f32,
    /// Mouse sensitivity in degrees per pixel.
    pub sensitivity: f32,
    /// Button that switches to fly mode while held.
    pub look_button: MouseButton,
    look_engaged: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED, DEFAULT_SENSITIVITY)
    }
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            look_button: MouseButton::Right,
            look_engaged: false,
        }
    }

    /// Updates mode, position and orientation for one frame.
    ///
    /// # Input Mapping (while the look button is held)
    /// - W/S: Move along front
    /// - A/D: Strafe along right
    /// - Q/E: Move along the camera's up axis
    /// - Mouse: Look around
    ///
    /// On the frame the look button goes down the previous pointer position
    /// is reset to the current one, so the camera does not jump.
    pub fn update(&mut self, camera: &mut Camera, input: &mut InputState, delta_time: f32) {
        if camera.mode() == CameraMode::Disabled {
            self.look_engaged = false;
            return;
        }

        if input.is_mouse_up(self.look_button) {
            self.look_engaged = false;
            camera.set_mode(CameraMode::Select);
            return;
        }

        if !self.look_engaged {
            input.sync_mouse_previous();
            self.look_engaged = true;
        }
        camera.set_mode(CameraMode::Fly);

        let step = self.speed * delta_time;
        let axes = [
            (Key::W, camera.front()),
            (Key::S, -camera.front()),
            (Key::D, camera.right()),
            (Key::A, -camera.right()),
            (Key::E, camera.up()),
            (Key::Q, -camera.up()),
        ];
        for (key, direction) in axes {
            if input.is_key_down(key) {
                camera.translate(direction * step);
            }
        }

        let current = input.mouse_position();
        let previous = input.previous_mouse_position();
        let x_offset = (current.x - previous.x) * self.sensitivity;
        let y_offset = (previous.y - current.y) * self.sensitivity;
        camera.rotate(x_offset, y_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fly_input() -> InputState {
        let mut input = InputState::new(800, 600);
        input.begin_frame();
        input.process_mouse_button(MouseButton::Right, true);
        input
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.mode(), CameraMode::Select);
        assert_relative_eq!(camera.front(), Vec3::FORWARD, epsilon = 1e-6);
        assert_relative_eq!(camera.right(), Vec3::RIGHT, epsilon = 1e-6);
        assert_relative_eq!(camera.up(), Vec3::UP, epsilon = 1e-6);
    }

    #[test]
    fn basis_is_orthonormal_after_rotation() {
        let mut camera = Camera::default();
        camera.rotate(37.0, 21.0);
        assert_relative_eq!(camera.front().length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.front().dot(camera.right()), 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.front().dot(camera.up()), 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right().dot(camera.up()), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn pitch_clamps_to_exactly_89() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = fly_input();
        controller.update(&mut camera, &mut input, 0.016);

        input.begin_frame();
        input.process_mouse_motion(400.0, -5000.0);
        controller.update(&mut camera, &mut input, 0.016);
        assert_eq!(camera.pitch(), 89.0);

        input.begin_frame();
        input.process_mouse_motion(400.0, 10000.0);
        controller.update(&mut camera, &mut input, 0.016);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn look_button_switches_modes() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = fly_input();

        controller.update(&mut camera, &mut input, 0.016);
        assert_eq!(camera.mode(), CameraMode::Fly);

        input.begin_frame();
        input.process_mouse_button(MouseButton::Right, false);
        controller.update(&mut camera, &mut input, 0.016);
        assert_eq!(camera.mode(), CameraMode::Select);
    }

    #[test]
    fn engaging_fly_does_not_jump() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = fly_input();
        // Pointer moved in the same frame the button went down.
        input.process_mouse_motion(700.0, 100.0);

        controller.update(&mut camera, &mut input, 0.016);
        assert_eq!(camera.yaw(), DEFAULT_YAW);
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
    }

    #[test]
    fn mouse_delta_turns_camera() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = fly_input();
        controller.update(&mut camera, &mut input, 0.016);

        input.begin_frame();
        input.process_mouse_motion(410.0, 295.0);
        controller.update(&mut camera, &mut input, 0.016);
        assert_relative_eq!(camera.yaw(), DEFAULT_YAW + 10.0 * DEFAULT_SENSITIVITY);
        assert_relative_eq!(camera.pitch(), 5.0 * DEFAULT_SENSITIVITY);
    }

    #[test]
    fn captured_pointer_keeps_turning_past_window_edge() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = fly_input();
        controller.update(&mut camera, &mut input, 0.016);

        // 10 frames of 100px each carry the virtual pointer 600px past the
        // right edge of the 800px window.
        for _ in 0..10 {
            input.begin_frame();
            input.process_mouse_relative(100.0, 0.0);
            controller.update(&mut camera, &mut input, 0.016);
        }
        assert!(input.mouse_position().x > 800.0);
        assert_relative_eq!(
            camera.yaw(),
            DEFAULT_YAW + 1000.0 * DEFAULT_SENSITIVITY,
            epsilon = 1e-3
        );
    }

    #[test]
    fn fly_moves_along_basis() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = fly_input();
        input.process_key(Key::W, true);

        controller.update(&mut camera, &mut input, 0.5);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);

        input.begin_frame();
        input.process_key(Key::W, false);
        input.process_key(Key::D, true);
        input.process_key(Key::E, true);
        controller.update(&mut camera, &mut input, 0.25);
        assert_relative_eq!(camera.position(), Vec3::new(2.0, 2.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn select_mode_does_not_move() {
        let mut camera = Camera::default();
        let mut controller = CameraController::default();
        let mut input = InputState::new(800, 600);
        input.process_key(Key::W, true);
        input.process_mouse_motion(0.0, 0.0);

        controller.update(&mut camera, &mut input, 1.0);
        assert_eq!(camera.mode(), CameraMode::Select);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.yaw(), DEFAULT_YAW);
    }

    #[test]
    fn disabled_ignores_input_until_set_explicitly() {
        let mut camera = Camera::default();
        camera.set_mode(CameraMode::Disabled);
        let mut controller = CameraController::default();
        let mut input = fly_input();
        input.process_key(Key::W, true);

        controller.update(&mut camera, &mut input, 1.0);
        assert_eq!(camera.mode(), CameraMode::Disabled);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));

        camera.set_mode(CameraMode::Select);
        input.begin_frame();
        controller.update(&mut camera, &mut input, 0.0);
        assert_eq!(camera.mode(), CameraMode::Fly);
    }

    #[test]
    fn view_matrix_places_origin_in_front() {
        let camera = Camera::default();
        let origin = camera.view_matrix().transform_point(Vec3::ZERO);
        assert_relative_eq!(origin, Vec3::new(0.0, 0.0, -3.0), epsilon = 1e-5);
    }
}
