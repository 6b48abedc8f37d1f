#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::driver::{AnimationDriver, FrameScheduler};
use crate::render::Renderer;
use crate::scene::SceneConfig;
use crate::stage::Stage;

/// Schedules frames through the browser's repaint callback.
struct RafScheduler {
    window: web_sys::Window,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        if let Some(callback) = self.callback.borrow().as_ref() {
            let _ = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }
}

/// Builds the stage for the given canvas and starts the repaint loop.
#[wasm_bindgen]
pub fn run(canvas_id: String, scene_xml: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;
    let element = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?;
    let canvas: web_sys::HtmlCanvasElement = element
        .dyn_into()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;

    let config = match scene_xml {
        Some(xml) => SceneConfig::from_xml(&xml)
            .map_err(|err| JsValue::from_str(&format!("failed to parse scene XML: {err}")))?,
        None => SceneConfig::default(),
    };

    let viewport = (canvas.width().max(1), canvas.height().max(1));
    let stage = Rc::new(Stage::build(&config, viewport));
    let renderer = Rc::new(RefCell::new(Renderer::new(canvas).map_err(|err| {
        JsValue::from_str(&format!("renderer error: {err}"))
    })?));

    let driver = Rc::new(RefCell::new(AnimationDriver::new()));
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

    {
        let driver = Rc::clone(&driver);
        let stage = Rc::clone(&stage);
        let renderer = Rc::clone(&renderer);
        let window = window.clone();
        let callback_slot = Rc::clone(&callback);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let mut scheduler = RafScheduler {
                window: window.clone(),
                callback: Rc::clone(&callback_slot),
            };
            driver.borrow_mut().frame(&mut scheduler, || {
                if let Err(err) = renderer.borrow_mut().render(&stage) {
                    web_sys::console::error_1(&err);
                }
            });
        }) as Box<dyn FnMut()>));
    }

    // The callback owns its own registration slot and re-registers every
    // repaint; it lives for the lifetime of the page.
    let mut scheduler = RafScheduler { window, callback };
    driver.borrow().start(&mut scheduler);
    Ok(())
}
