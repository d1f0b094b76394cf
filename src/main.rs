//! Pong FX entry point
//!
//! Creates the window, brings up the GPU and runs the frame loop:
//! input -> update -> draw, once per redraw.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use pong_fx::clock::FrameClock;
use pong_fx::input::{Key, KeyboardState};
use pong_fx::renderer::{Gpu, SurfaceErrorAction};
use pong_fx::{Game, Settings};

/// Everything that needs a live window
struct Running {
    window: Arc<Window>,
    gpu: Gpu,
    game: Game,
}

struct App {
    settings: Settings,
    running: Option<Running>,
    keys: KeyboardState,
    clock: FrameClock,
    /// Fatal error that stopped the loop
    error: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            running: None,
            keys: KeyboardState::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window)))
            .context("GPU initialization failed")?;
        let game = Game::new(&gpu, &self.settings).context("failed to load game resources")?;

        Ok(Running { window, gpu, game })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let dt = self.clock.tick();
        running.game.process_input(&self.keys, dt);
        running.game.update(dt);

        if let Err(e) = running.game.draw(&running.gpu, self.clock.elapsed()) {
            let message = e.to_string();
            if running.gpu.handle_surface_error(e) == SurfaceErrorAction::Fatal {
                self.fail(event_loop, anyhow::anyhow!("cannot acquire frame: {message}"));
                return;
            }
        }

        self.keys.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
                self.clock = FrameClock::new();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = Key::from_physical(event.physical_key) else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                if key == Key::Escape && pressed {
                    log::info!("Escape pressed, closing");
                    event_loop.exit();
                    return;
                }
                self.keys.set(key, pressed);
            }

            WindowEvent::Focused(false) => self.keys.clear(),

            WindowEvent::Resized(size) => {
                if let Some(running) = self.running.as_mut() {
                    running.gpu.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }
    }
}

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder
                .filter_level(log::LevelFilter::Info)
                .filter_module("wgpu_core", log::LevelFilter::Warn)
                .filter_module("wgpu_hal", log::LevelFilter::Warn)
                .filter_module("naga", log::LevelFilter::Warn);
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    init_logging();
    log::info!("Pong FX starting...");

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref());

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(settings);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
