use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use flyview::intersect::{intersect_ray_with_plane, point_in_rectangle, Ray};
use flyview::prelude::*;

const DEFAULT_CONFIG: &str = "flyview.toml";
const GRID_EXTENT: i32 = 8;

/// Upright panels in the XY plane: bottom-left corner, width, height.
const PANELS: [(Vec3, f32, f32); 2] = [
    (Vec3::new(2.0, 2.0, -2.0), 5.0, 5.0),
    (Vec3::new(-7.0, 2.0, -2.0), 5.0, 5.0),
];

struct DemoScene {
    red: TextureSlot,
    green: TextureSlot,
    blue: TextureSlot,
    gray: TextureSlot,
}

/// Capacity errors drop the primitive; the batch already warned once.
fn keep(result: flyview::Result<()>) {
    if let Err(e) = result {
        debug!("dropped primitive: {e}");
    }
}

/// Where `ray` enters the panel, if it hits the front of it.
fn panel_hit(ray: &Ray, (bottom_left, width, height): (Vec3, f32, f32)) -> Option<Vec3> {
    let right = bottom_left + Vec3::new(width, 0.0, 0.0);
    let top = bottom_left + Vec3::new(0.0, height, 0.0);
    let t = ray.parameter_of(bottom_left, right, top)?;
    let hit = ray.at(t);
    (t >= 0.0 && point_in_rectangle(hit, top, bottom_left, right)).then_some(hit)
}

impl DemoScene {
    fn new(textures: &mut TextureRegistry) -> flyview::Result<Self> {
        Ok(Self {
            red: textures.load_color(1.0, 0.0, 0.0, 1.0)?,
            green: textures.load_color(0.0, 1.0, 0.0, 1.0)?,
            blue: textures.load_color(0.0, 0.0, 1.0, 1.0)?,
            gray: textures.load_color(0.35, 0.35, 0.35, 1.0)?,
        })
    }

    fn build(&self, viewer: &mut Viewer) {
        let ray = viewer.pick_ray();
        let batch = viewer.batch_mut();
        let extent = GRID_EXTENT as f32;

        for i in -GRID_EXTENT..=GRID_EXTENT {
            if i == 0 {
                continue;
            }
            let offset = i as f32;
            let slot = self.gray.index();
            keep(batch.push_line(Vec3::new(-extent, 0.0, offset), Vec3::new(extent, 0.0, offset), slot));
            keep(batch.push_line(Vec3::new(offset, 0.0, -extent), Vec3::new(offset, 0.0, extent), slot));
        }

        keep(batch.push_line(Vec3::new(-extent, 0.0, 0.0), Vec3::new(extent, 0.0, 0.0), self.red.index()));
        keep(batch.push_line(Vec3::new(0.0, -extent, 0.0), Vec3::new(0.0, extent, 0.0), self.green.index()));
        keep(batch.push_line(Vec3::new(0.0, 0.0, -extent), Vec3::new(0.0, 0.0, extent), self.blue.index()));

        for (panel, slot) in PANELS.into_iter().zip([self.green, self.blue]) {
            let hovered = ray.and_then(|ray| panel_hit(&ray, panel)).is_some();
            let slot = if hovered { self.red } else { slot };
            let (bottom_left, width, height) = panel;
            keep(batch.push_quad(bottom_left, Vec4::ONE, width, height, slot.index()));
        }

        let ground = ray.and_then(|ray| {
            intersect_ray_with_plane(&ray, Vec3::ZERO, Vec3::RIGHT, Vec3::FORWARD)
                .filter(|hit| (*hit - ray.origin).dot(ray.direction) >= 0.0)
        });
        if let Some(hit) = ground {
            let slot = self.red.index();
            let dx = Vec3::new(0.25, 0.0, 0.0);
            let dz = Vec3::new(0.0, 0.0, 0.25);
            keep(batch.push_line(hit - dx, hit + dx, slot));
            keep(batch.push_line(hit - dz, hit + dz, slot));
        }
    }
}

fn load_config() -> flyview::Result<ViewerConfig> {
    if let Some(path) = std::env::args().nth(1) {
        return ViewerConfig::load(&PathBuf::from(path));
    }
    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        ViewerConfig::load(default_path)
    } else {
        info!("no {DEFAULT_CONFIG}, using defaults");
        Ok(ViewerConfig::default())
    }
}

fn run() -> flyview::Result<()> {
    let config = load_config()?;
    let (width, height) = (config.window.width, config.window.height);

    let mut window = Window::new(&config.window.title, width, height)?;
    let mut backend = SoftwareBackend::new(width, height, config.render.samples)?;
    let mut viewer = Viewer::new(&config);
    let scene = DemoScene::new(viewer.textures_mut())?;
    let mut limiter = FrameLimiter::new(&window, config.window.target_fps);

    loop {
        match window.poll_events(viewer.input_mut()) {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) => match backend.resize(w, h) {
                Ok(()) => {
                    window.resize(w, h)?;
                    viewer.resize(w, h);
                }
                Err(e) => warn!("ignoring resize to {w}x{h}: {e}"),
            },
            WindowEvent::None => {}
        }

        let delta_time = limiter.wait_and_get_delta(&window);
        viewer.update(delta_time);
        let flying = viewer.camera().mode() == CameraMode::Fly;
        window.set_pointer_captured(flying, viewer.input_mut());

        viewer.begin_frame();
        scene.build(&mut viewer);
        viewer.render(&mut backend);
        window.present(backend.frame_bytes())?;

        viewer.end_frame();
    }

    info!("shutting down");
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
