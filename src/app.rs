use std::sync::Arc;

use parking_lot::RwLock;

use crate::stage::Stage;

/// Provides viewport dimensions for camera setup.
pub trait ViewportProvider: Send + Sync {
    fn viewport_size(&self) -> (u32, u32);
}

/// Viewport that always reports the same resolution; used by headless runs.
#[derive(Debug, Clone, Copy)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}

/// Viewport backed by the live window size.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width, height)),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport_size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

pub fn print_stage_summary(stage: &Stage) {
    let nodes = stage.nodes();
    println!("Stage contains {} nodes", nodes.len());
    println!(
        " - water plane {:.0} x {:.0} (distortion {:.1}, speed {:.1})",
        stage.water.size, stage.water.size, stage.water.distortion_scale, stage.water.speed
    );
    println!(
        " - sky dome scale {:.0} (turbidity {:.1})",
        stage.sky.scale, stage.sky.turbidity
    );
    println!(" - hemisphere light intensity {:.1}", stage.light.intensity);
    let sun = stage.water.sun_direction;
    println!(
        " - sun direction ({:.3}, {:.3}, {:.3})",
        sun.x, sun.y, sun.z
    );
    match stage.environment() {
        Some(environment) => println!(
            " - environment map baked {}x{}",
            environment.width(),
            environment.height()
        ),
        None => println!(" - environment map missing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_viewport_reports_its_resolution() {
        let viewport = StaticViewport::new(1280, 720);
        assert_eq!(viewport.viewport_size(), (1280, 720));
    }

    #[test]
    fn window_viewport_updates_and_clamps_to_one() {
        let viewport = WindowViewport::new(800, 600);
        viewport.update(0, 0);
        assert_eq!(viewport.viewport_size(), (1, 1));
        viewport.update(1920, 1080);
        assert_eq!(viewport.viewport_size(), (1920, 1080));
    }

    #[test]
    fn arc_forwards_the_viewport() {
        let viewport: Arc<dyn ViewportProvider> = Arc::new(StaticViewport::new(64, 32));
        assert_eq!(viewport.viewport_size(), (64, 32));
    }
}
