//! Lander - a rocket flight viewer with chase, ground and free cameras.

mod config;
mod controls;
mod events;
mod ui;
mod update;

use anyhow::Result;
use engine_core::Time;
use glam::Vec2;
use input::InputState;
use procgen::{generate_glow, generate_pad, generate_vehicle, FlatSite, PadConfig, TerrainConfig, TerrainData, VehicleConfig};
use renderer::{Renderer, SceneGeometry, SceneMeshes};
use sim::{
    FrameState, ParticlePool, LANDING_PAD_POSITION, LAUNCH_PAD_POSITION, PAD_RADIUS, PAD_THICKNESS,
    TERRAIN_BASE_HEIGHT, TERRAIN_HALF_EXTENT,
};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use config::ViewerConfig;

const TERRAIN_SEED: u64 = 0x1a2d_e5;
const GLOW_TEXTURE_SIZE: u32 = 64;
/// Level ground kept around each pad beyond its rim.
const PAD_CLEARANCE: f32 = 2.0;
const PAD_BLEND: f32 = 12.0;

/// Everything alive while the window exists.
pub struct State {
    time: Time,
    input: InputState,
    frame: FrameState,

    renderer: Renderer,
    meshes: SceneMeshes,

    /// Cursor moved since the last simulated frame.
    pointer_moved: bool,
    /// Surface has zero area; updates and rendering are skipped.
    minimized: bool,
    title: String,
    running: bool,
}

impl State {
    async fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        let glow = generate_glow(GLOW_TEXTURE_SIZE);
        let renderer = Renderer::new(window, config.vsync, &glow).await?;
        let meshes = SceneMeshes::upload(renderer.device(), &build_scene_geometry());

        let mut time = Time::new();
        time.set_fixed_rate(config.fixed_step_hz);

        let exhaust = match config.exhaust_seed {
            Some(seed) => ParticlePool::with_seed(seed),
            None => ParticlePool::new(),
        };
        let mut frame = FrameState::new(config.rig_settings(), exhaust);
        if config.start_split_screen {
            frame.toggle_split_screen();
        }

        let size = renderer.size;
        Ok(Self {
            time,
            input: InputState::new(),
            frame,
            renderer,
            meshes,
            pointer_moved: false,
            minimized: size.width == 0 || size.height == 0,
            title: String::new(),
            running: true,
        })
    }

    fn cursor(&self) -> Vec2 {
        self.input.mouse_position()
    }
}

/// Terrain, pad and vehicle meshes. The terrain is pressed flat under both pads.
fn build_scene_geometry() -> SceneGeometry {
    let flat_radius = PAD_RADIUS + PAD_CLEARANCE;
    let terrain = TerrainData::generate(TerrainConfig {
        size: TERRAIN_HALF_EXTENT * 2.0,
        seed: TERRAIN_SEED,
        base_height: TERRAIN_BASE_HEIGHT,
        flat_sites: vec![
            FlatSite::new(LAUNCH_PAD_POSITION, flat_radius, PAD_BLEND),
            FlatSite::new(LANDING_PAD_POSITION, flat_radius, PAD_BLEND),
        ],
        ..Default::default()
    });
    let pad = generate_pad(&PadConfig {
        radius: PAD_RADIUS,
        thickness: PAD_THICKNESS,
        ..Default::default()
    });
    let vehicle = generate_vehicle(&VehicleConfig::default());

    SceneGeometry {
        terrain: terrain.mesh,
        pad,
        vehicle,
    }
}

#[derive(Default)]
struct App {
    state: Option<State>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = ViewerConfig::load();
            let window_attrs = Window::default_attributes()
                .with_title("Lander")
                .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match pollster::block_on(State::new(window.clone(), config)) {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize viewer: {:#}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
                return;
            }
            event_loop.set_control_flow(if state.minimized {
                ControlFlow::Wait
            } else {
                ControlFlow::Poll
            });
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Lander controls:");
    println!("  WASD / E Q     move the free camera    Shift / Ctrl  faster / slower");
    println!("  Right click    toggle mouse look       C             cycle camera mode");
    println!("  F              launch / pause / resume R             reset flight");
    println!("  V              split-screen            Tab           switch viewport");
    println!("  Escape         quit");

    log::info!("Starting Lander");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
