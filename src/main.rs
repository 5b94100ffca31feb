//! Bouncing atoms simulation.
//!
//! A fixed set of circular atoms bounces inside the window, reflecting off
//! the walls and exchanging momentum in pairwise elastic collisions. The
//! scene is generated randomly or loaded from a file given as the only
//! command-line argument.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use atom_physics::{AtomStore, SimParams};
use atom_renderer::{AtomInstance, AtomRenderer};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const TICKS: u32 = 200;
const TICK_DELAY: Duration = Duration::from_millis(40);
const BACKGROUND: u32 = 0xFF_FFFF; // white, packed 24-bit RGB
const WINDOW_TITLE: &str = "Atoms";

/// Run phases after initialization; no transition skips a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Initial state rendered, waiting for the user's start signal.
    Armed,
    /// Tick loop in progress.
    Running { tick: u32 },
    /// All ticks done; the last frame stays up until the window closes.
    Finished,
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: AtomRenderer,
}

impl GpuState {
    async fn new(window: Arc<Window>, store: &AtomStore) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        log::info!("using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let params = store.params();
        let renderer = AtomRenderer::new(
            &device,
            &config,
            [params.width as f32, params.height as f32],
            BACKGROUND,
            store.len(),
        );

        Self {
            surface,
            device,
            queue,
            config,
            renderer,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(&mut self, store: &AtomStore) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let instances: Vec<AtomInstance> = store
            .atoms
            .iter()
            .map(|a| {
                AtomInstance::new(
                    a.top_left().as_vec2().to_array(),
                    a.diameter() as f32,
                    a.rgb(),
                )
            })
            .collect();

        self.renderer
            .render(&self.device, &self.queue, &view, &instances);
        output.present();
        Ok(())
    }
}

struct App {
    store: AtomStore,
    phase: Phase,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
}

impl App {
    /// The start gate: the first start signal moves Armed to Running.
    fn start(&mut self) {
        if self.phase == Phase::Armed {
            log::info!("start signal received, running {TICKS} ticks");
            self.phase = Phase::Running { tick: 0 };
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let params = self.store.params();
            let window_attributes = Window::default_attributes()
                .with_title(WINDOW_TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(params.width, params.height));

            let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
            self.window = Some(window.clone());
            self.gpu_state = Some(pollster::block_on(GpuState::new(window.clone(), &self.store)));
            // Show the initial scene while the start gate is armed.
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.start(),

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.start(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) else {
                    return;
                };

                if let Phase::Running { tick } = self.phase {
                    self.store.step();
                    window.set_title(&format!("{WINDOW_TITLE} - tick {}/{TICKS}", tick + 1));
                    self.phase = if tick + 1 == TICKS {
                        log::info!("run complete, close the window to exit");
                        Phase::Finished
                    } else {
                        Phase::Running { tick: tick + 1 }
                    };
                }

                match gpu_state.render(&self.store) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => gpu_state.resize(window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => log::error!("render error: {e:?}"),
                }

                if let Phase::Running { .. } = self.phase {
                    // Fixed real-time pacing between ticks.
                    std::thread::sleep(TICK_DELAY);
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

/// Random scene by default; a single path argument switches to record-load
/// mode, with the file's leading count governing the atom count.
fn build_store(params: SimParams) -> atom_physics::Result<AtomStore> {
    match env::args().nth(1) {
        Some(path) => {
            log::info!("loading initial state from {path}");
            let file = File::open(&path)?;
            AtomStore::from_records(params, BufReader::new(file))
        }
        None => AtomStore::random(params, params.default_count, None),
    }
}

fn main() -> ExitCode {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = SimParams::default();
    let store = match build_store(params) {
        Ok(store) => store,
        Err(err) => {
            log::error!("initialization failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = store.write_report(std::io::stdout().lock()) {
        log::error!("could not write initialization report: {err}");
        return ExitCode::FAILURE;
    }

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        store,
        phase: Phase::Armed,
        window: None,
        gpu_state: None,
    };

    event_loop.run_app(&mut app).unwrap();
    ExitCode::SUCCESS
}
