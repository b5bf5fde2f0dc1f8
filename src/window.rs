//! SDL2 window, frame pacing and event translation.

use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::error::{Error, Result};
use crate::input::{InputState, Key, MouseButton};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
}

pub struct FrameLimiter {
    previous_frame_time: u64,
    /// Milliseconds per frame; `None` when uncapped.
    frame_target: Option<u64>,
}

impl FrameLimiter {
    /// A `target_fps` of 0 disables waiting.
    pub fn new(window: &Window, target_fps: u32) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
            frame_target: (target_fps > 0).then(|| 1000 / target_fps as u64),
        }
    }

    /// Waits if necessary to hold the frame rate and returns the time since
    /// the previous call, in seconds.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> f32 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if let Some(target) = self.frame_target {
            if delta_time < target {
                std::thread::sleep(std::time::Duration::from_millis(target - delta_time));
                current_time = window.timer().ticks64();
                delta_time = current_time - self.previous_frame_time;
            }
        }

        self.previous_frame_time = current_time;
        delta_time as f32 / 1000.0
    }
}

fn map_key(scancode: Scancode) -> Option<Key> {
    Some(match scancode {
        Scancode::W => Key::W,
        Scancode::A => Key::A,
        Scancode::S => Key::S,
        Scancode::D => Key::D,
        Scancode::Q => Key::Q,
        Scancode::E => Key::E,
        Scancode::Space => Key::Space,
        Scancode::LShift => Key::LeftShift,
        Scancode::Escape => Key::Escape,
        _ => return None,
    })
}

fn map_button(button: SdlMouseButton) -> Option<MouseButton> {
    match button {
        SdlMouseButton::Left => Some(MouseButton::Left),
        SdlMouseButton::Middle => Some(MouseButton::Middle),
        SdlMouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Declared before `texture_creator` so it is dropped first.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    mouse: sdl2::mouse::MouseUtil,
    /// Pointer position when capture began; restored on release.
    capture_anchor: Option<(i32, i32)>,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(Error::Window)?;
        let video_subsystem = sdl_context.video().map_err(Error::Window)?;
        let timer_subsystem = sdl_context.timer().map_err(Error::Window)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump().map_err(Error::Window)?;
        let mouse = sdl_context.mouse();

        let texture = Self::create_texture(&texture_creator, width, height)?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            mouse,
            capture_anchor: None,
            width,
            height,
        })
    }

    fn create_texture(
        texture_creator: &sdl2::render::TextureCreator<sdl2::video::WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<sdl2::render::Texture<'static>> {
        // SAFETY: the creator is boxed and owned by `Window`, and the texture
        // field is dropped before it.
        let texture_creator: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator as *const _) };
        texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| Error::Window(e.to_string()))
    }

    /// Drains pending events into `input`. Returns `Quit` if the window was
    /// closed or Escape pressed, otherwise the last resize seen, if any.
    pub fn poll_events(&mut self, input: &mut InputState) -> WindowEvent {
        let mut result = WindowEvent::None;
        let captured = self.capture_anchor.is_some();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => result = WindowEvent::Quit,
                Event::KeyDown {
                    scancode: Some(scancode),
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = map_key(scancode) {
                        input.process_key(key, true);
                        if key == Key::Escape {
                            result = WindowEvent::Quit;
                        }
                    }
                }
                Event::KeyUp {
                    scancode: Some(scancode),
                    ..
                } => {
                    if let Some(key) = map_key(scancode) {
                        input.process_key(key, false);
                    }
                }
                Event::MouseButtonDown { mouse_btn, .. } => {
                    if let Some(button) = map_button(mouse_btn) {
                        input.process_mouse_button(button, true);
                    }
                }
                Event::MouseButtonUp { mouse_btn, .. } => {
                    if let Some(button) = map_button(mouse_btn) {
                        input.process_mouse_button(button, false);
                    }
                }
                Event::MouseMotion { xrel, yrel, .. } if captured => {
                    input.process_mouse_relative(xrel as f32, yrel as f32);
                }
                Event::MouseMotion { x, y, .. } => {
                    input.process_mouse_motion(x as f32, y as f32);
                }
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } if result != WindowEvent::Quit => {
                    result = WindowEvent::Resize(w.max(0) as u32, h.max(0) as u32);
                }
                _ => {}
            }
        }
        result
    }

    /// Hides and locks the pointer while `captured`, so mouse-look keeps
    /// reporting motion at the window edge. Motion is then fed to `input` as
    /// relative offsets. On release the pointer returns to where capture began.
    pub fn set_pointer_captured(&mut self, captured: bool, input: &mut InputState) {
        match (captured, self.capture_anchor) {
            (true, None) => {
                let position = input.mouse_position();
                self.capture_anchor = Some((position.x as i32, position.y as i32));
                self.mouse.set_relative_mouse_mode(true);
            }
            (false, Some((x, y))) => {
                self.capture_anchor = None;
                self.mouse.set_relative_mouse_mode(false);
                self.mouse.warp_mouse_in_window(self.canvas.window(), x, y);
                input.process_mouse_motion(x as f32, y as f32);
                input.sync_mouse_previous();
            }
            _ => {}
        }
    }

    /// Uploads an ARGB8888 frame of the window's size and shows it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<()> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| Error::Window(e.to_string()))?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))
            .map_err(Error::Window)?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.texture = Self::create_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
