#![cfg_attr(target_arch = "wasm32", allow(unused))]

use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;
#[cfg(not(target_arch = "wasm32"))]
use pollster::block_on;
#[cfg(not(target_arch = "wasm32"))]
use winit::application::ApplicationHandler;
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::PhysicalSize;
#[cfg(not(target_arch = "wasm32"))]
use winit::event::WindowEvent;
#[cfg(not(target_arch = "wasm32"))]
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
#[cfg(not(target_arch = "wasm32"))]
use winit::window::{Window, WindowId};

use seascape_runtime::{
    print_stage_summary, SceneConfig, Stage, StaticViewport, ViewportProvider,
};
#[cfg(not(target_arch = "wasm32"))]
use seascape_runtime::{
    AnimationDriver, FrameScheduler, NormalMap, Renderer, WindowViewport,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = match options.scene.as_deref() {
        Some(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {path}"))?;
            SceneConfig::from_xml(&xml).with_context(|| format!("failed to parse scene {path}"))?
        }
        None => SceneConfig::default(),
    };

    println!(
        "Loaded ocean scene (sun elevation {:.1}, azimuth {:.1})",
        config.sun.elevation, config.sun.azimuth
    );

    if options.summary_only {
        run_headless(&config)
    } else {
        match run_interactive(&config, options.frames) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                    );
                    run_headless(&config)
                } else {
                    Err(err)
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(config: &SceneConfig) -> Result<()> {
    let viewport = StaticViewport::new(1280, 720);
    let stage = Stage::build(config, viewport.viewport_size());
    print_stage_summary(&stage);
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn run_interactive(config: &SceneConfig, frames: Option<u64>) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config.clone(), frames);
    event_loop
        .run_app(&mut app)
        .map_err(|err| anyhow!("event loop error: {err}"))?;

    if let Some(err) = app.last_error.take() {
        return Err(err);
    }
    if app.window.is_none() {
        return Err(WindowInitError::from_error("window", "never created").into());
    }

    info!("rendered {} frames", app.driver.frames());
    Ok(())
}

/// Re-registers the frame callback through the window's repaint request.
#[cfg(not(target_arch = "wasm32"))]
struct WindowScheduler(Arc<Window>);

#[cfg(not(target_arch = "wasm32"))]
impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct App {
    config: SceneConfig,
    frame_limit: Option<u64>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    stage: Option<Stage>,
    driver: AnimationDriver,
    viewport: Arc<WindowViewport>,
    last_error: Option<anyhow::Error>,
}

#[cfg(not(target_arch = "wasm32"))]
impl App {
    fn new(config: SceneConfig, frame_limit: Option<u64>) -> Self {
        Self {
            config,
            frame_limit,
            window: None,
            renderer: None,
            stage: None,
            driver: AnimationDriver::new(),
            viewport: Arc::new(WindowViewport::new(1280, 720)),
            last_error: None,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Seascape Runtime")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let size = window.inner_size();
        self.viewport.update(size.width, size.height);

        let stage = Stage::build(&self.config, self.viewport.viewport_size());
        let normals = NormalMap::load(&stage.water.normal_map).with_context(|| {
            format!("failed to load water normal map {}", stage.water.normal_map)
        })?;
        let renderer = block_on(Renderer::new(Arc::clone(&window), &stage, &normals))?;

        // AnimationStarted: the first registration; every later one happens
        // inside the frame callback itself.
        self.driver.start(&mut WindowScheduler(Arc::clone(&window)));

        self.window = Some(window);
        self.stage = Some(stage);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer), Some(stage)) = (
            self.window.as_ref(),
            self.renderer.as_mut(),
            self.stage.as_ref(),
        ) else {
            return;
        };

        let mut scheduler = WindowScheduler(Arc::clone(window));
        let mut render_result = Ok(());
        let running = self.driver.frame(&mut scheduler, || {
            renderer.update_globals(stage);
            render_result = renderer.render();
        });
        if !running {
            return;
        }

        match render_result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.last_error = Some(anyhow!("GPU is out of memory"));
                event_loop.exit();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
            }
            Err(wgpu::SurfaceError::Other) => {
                info!("Surface reported an unknown error; retrying next frame");
            }
        }

        if let Some(limit) = self.frame_limit {
            if self.driver.frames() >= limit {
                self.driver.stop_handle().stop();
                event_loop.exit();
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.initialize(event_loop) {
            self.last_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self
            .window
            .as_ref()
            .is_some_and(|window| window.id() == window_id)
        {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.driver.stop_handle().stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.viewport.update(size.width, size.height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
                if let Some(stage) = self.stage.as_mut() {
                    let (width, height) = self.viewport.viewport_size();
                    stage.camera.set_aspect(width as f32 / height as f32);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.as_ref() {
                    let size = window.inner_size();
                    self.viewport.update(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    scene: Option<String>,
    summary_only: bool,
    frames: Option<u64>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut scene = None;
        let mut summary_only = false;
        let mut frames = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames expects a number"))?;
                    frames = Some(
                        value
                            .parse::<u64>()
                            .map_err(|err| anyhow!("invalid --frames value: {err}"))?,
                    );
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: seascape-runtime [scene.xml] [--summary-only] [--frames N]"
                    ));
                }
                other => {
                    if scene.replace(other.to_string()).is_some() {
                        return Err(anyhow!("only one scene file may be given"));
                    }
                }
            }
        }
        Ok(Self {
            scene,
            summary_only,
            frames,
        })
    }
}
