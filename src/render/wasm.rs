use anyhow::{anyhow, Result};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::sky::tonemap;
use crate::stage::Stage;
use crate::sun::SunPosition;

/// Minimal renderer backed by a 2D canvas for WebAssembly builds: paints the
/// sky gradient from the radiance model and the water band from the water
/// parameter set.
pub struct Renderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    size: (u32, u32),
}

impl Renderer {
    /// Creates a renderer that draws into the provided HTML canvas element.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| anyhow!("failed to query canvas context: {err:?}"))?
            .ok_or_else(|| anyhow!("canvas does not support 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("failed to cast canvas context"))?;

        let size = (canvas.width(), canvas.height());
        Ok(Self {
            canvas,
            context,
            size,
        })
    }

    /// Updates the canvas dimensions to match the browser layout.
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 == 0 || new_size.1 == 0 {
            return;
        }
        self.size = new_size;
        self.canvas.set_width(new_size.0);
        self.canvas.set_height(new_size.1);
    }

    /// Paints the current stage: sky bands above the horizon, water below.
    pub fn render(&mut self, stage: &Stage) -> Result<(), wasm_bindgen::JsValue> {
        let width = self.size.0 as f64;
        let height = self.size.1 as f64;
        let horizon = height / 2.0;

        // Sample the dome along falling elevations toward the sun's azimuth.
        const BANDS: u32 = 48;
        let band_height = horizon / BANDS as f64;
        for band in 0..BANDS {
            let elevation = 60.0 * (1.0 - band as f32 / BANDS as f32);
            let direction = SunPosition::new(elevation, stage.sun.azimuth).direction();
            let [r, g, b] = tonemap(stage.sky.radiance(direction));
            self.context
                .set_fill_style(&format!("rgb({r}, {g}, {b})").into());
            self.context
                .fill_rect(0.0, band as f64 * band_height, width, band_height + 1.0);
        }

        let [r, g, b] = tonemap(stage.water.water_color);
        self.context
            .set_fill_style(&format!("rgb({r}, {g}, {b})").into());
        self.context.fill_rect(0.0, horizon, width, height - horizon);

        self.context.set_fill_style(&"white".into());
        let environment = stage
            .environment()
            .map(|env| format!("{}x{}", env.width(), env.height()))
            .unwrap_or_else(|| "missing".to_string());
        let summary = format!(
            "Nodes: {}  Sun: {:.1}/{:.1}  Env: {}",
            stage.nodes().len(),
            stage.sun.elevation,
            stage.sun.azimuth,
            environment,
        );
        let _ = self.context.fill_text(&summary, 10.0, 24.0);

        Ok(())
    }
}
