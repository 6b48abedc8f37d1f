//! Core modules for the Seascape ocean scene, rewritten in Rust.
//!
//! The crate exposes the pieces needed to bootstrap the scene: the sun
//! solver, the sky and water parameter sets, the stage assembly and the
//! frame driver. Platform integration stays behind the `render` module so
//! the scene logic remains testable on headless machines.

pub mod app;
pub mod driver;
pub mod render;
pub mod scene;
pub mod sky;
pub mod stage;
pub mod sun;
#[cfg(not(target_arch = "wasm32"))]
pub mod texture;
pub mod water;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{print_stage_summary, StaticViewport, ViewportProvider, WindowViewport};
pub use driver::{AnimationDriver, FrameScheduler, StopHandle};
pub use render::Renderer;
pub use scene::{CameraConfig, SceneConfig};
pub use sky::SkyDome;
pub use stage::{EnvironmentMap, HemisphereLight, NodeKind, PerspectiveCamera, Stage};
pub use sun::SunPosition;
#[cfg(not(target_arch = "wasm32"))]
pub use texture::{NormalMap, TextureError};
pub use water::WaterSurface;
