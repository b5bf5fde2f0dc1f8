//! Per-frame keyboard and mouse snapshot.
//!
//! [`InputState`] keeps the current and the previous frame's state so that
//! edges (pressed / released this frame) can be queried. The window layer
//! feeds events in with the `process_*` methods; [`InputState::begin_frame`]
//! rolls current into previous before new events arrive.

use crate::math::Vec2;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    LeftShift,
    Escape,
}

impl Key {
    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of keys held down, one bit per [`Key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySet(u32);

impl KeySet {
    pub fn contains(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn set(&mut self, key: Key, down: bool) {
        if down {
            self.0 |= key.bit();
        } else {
            self.0 &= !key.bit();
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    /// Pointer position in window pixels, origin top-left.
    pub position: Vec2,
    buttons: u8,
}

impl MouseState {
    pub fn is_down(&self, button: MouseButton) -> bool {
        self.buttons & button.bit() != 0
    }

    pub fn set(&mut self, button: MouseButton, down: bool) {
        if down {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: KeySet,
    previous_keys: KeySet,
    mouse: MouseState,
    previous_mouse: MouseState,
}

impl InputState {
    /// Starts with nothing held and the pointer at the window center.
    pub fn new(width: u32, height: u32) -> Self {
        let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
        let mouse = MouseState {
            position: center,
            buttons: 0,
        };
        Self {
            keys: KeySet::default(),
            previous_keys: KeySet::default(),
            mouse,
            previous_mouse: mouse,
        }
    }

    /// Copies current state into previous. Call once per frame before events.
    pub fn begin_frame(&mut self) {
        self.previous_keys = self.keys;
        self.previous_mouse = self.mouse;
    }

    pub fn process_key(&mut self, key: Key, down: bool) {
        self.keys.set(key, down);
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, down: bool) {
        self.mouse.set(button, down);
    }

    pub fn process_mouse_motion(&mut self, x: f32, y: f32) {
        self.mouse.position = Vec2::new(x, y);
    }

    /// Moves the pointer by a relative offset. While the window holds the
    /// pointer captured the position is virtual and may leave the window.
    pub fn process_mouse_relative(&mut self, dx: f32, dy: f32) {
        self.mouse.position = self.mouse.position + Vec2::new(dx, dy);
    }

    /// Makes the previous pointer position equal the current one, so the
    /// next `mouse_delta` is zero.
    pub fn sync_mouse_previous(&mut self) {
        self.previous_mouse.position = self.mouse.position;
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(key)
    }

    pub fn is_key_up(&self, key: Key) -> bool {
        !self.keys.contains(key)
    }

    pub fn was_key_down(&self, key: Key) -> bool {
        self.previous_keys.contains(key)
    }

    pub fn was_key_up(&self, key: Key) -> bool {
        !self.previous_keys.contains(key)
    }

    /// Down this frame, up the previous one.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.is_key_down(key) && self.was_key_up(key)
    }

    pub fn is_key_released(&self, key: Key) -> bool {
        self.is_key_up(key) && self.was_key_down(key)
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse.is_down(button)
    }

    pub fn is_mouse_up(&self, button: MouseButton) -> bool {
        !self.mouse.is_down(button)
    }

    pub fn was_mouse_down(&self, button: MouseButton) -> bool {
        self.previous_mouse.is_down(button)
    }

    pub fn was_mouse_up(&self, button: MouseButton) -> bool {
        !self.previous_mouse.is_down(button)
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.is_mouse_down(button) && self.was_mouse_up(button)
    }

    pub fn is_mouse_released(&self, button: MouseButton) -> bool {
        self.is_mouse_up(button) && self.was_mouse_down(button)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse.position
    }

    pub fn previous_mouse_position(&self) -> Vec2 {
        self.previous_mouse.position
    }

    /// Pointer movement since the previous frame, in pixels (y down).
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse.position - self.previous_mouse.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_centered_and_idle() {
        let input = InputState::new(1280, 720);
        assert_eq!(input.mouse_position(), Vec2::new(640.0, 360.0));
        assert_eq!(input.previous_mouse_position(), Vec2::new(640.0, 360.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert!(input.is_key_up(Key::W));
    }

    #[test]
    fn key_edges() {
        let mut input = InputState::new(100, 100);

        input.process_key(Key::W, true);
        assert!(input.is_key_pressed(Key::W));
        assert!(input.is_key_down(Key::W));

        input.begin_frame();
        assert!(!input.is_key_pressed(Key::W));
        assert!(input.was_key_down(Key::W));

        input.begin_frame();
        input.process_key(Key::W, false);
        assert!(input.is_key_released(Key::W));
        assert!(!input.is_key_down(Key::S));
    }

    #[test]
    fn mouse_edges_and_delta() {
        let mut input = InputState::new(100, 100);
        input.begin_frame();
        input.process_mouse_button(MouseButton::Right, true);
        input.process_mouse_motion(60.0, 40.0);

        assert!(input.is_mouse_pressed(MouseButton::Right));
        assert!(input.is_mouse_up(MouseButton::Left));
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, -10.0));

        input.sync_mouse_previous();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.begin_frame();
        input.process_mouse_button(MouseButton::Right, false);
        assert!(input.is_mouse_released(MouseButton::Right));
        assert!(input.was_mouse_down(MouseButton::Right));
    }

    #[test]
    fn relative_motion_is_not_bounded_by_the_window() {
        let mut input = InputState::new(100, 100);
        for _ in 0..3 {
            input.begin_frame();
            input.process_mouse_relative(40.0, 0.0);
            input.process_mouse_relative(20.0, -5.0);
            assert_eq!(input.mouse_delta(), Vec2::new(60.0, -5.0));
        }
        assert_eq!(input.mouse_position(), Vec2::new(230.0, 35.0));
    }

    #[test]
    fn keys_are_independent() {
        let mut set = KeySet::default();
        set.set(Key::A, true);
        set.set(Key::Escape, true);
        set.set(Key::A, false);
        assert!(!set.contains(Key::A));
        assert!(set.contains(Key::Escape));
    }
}
