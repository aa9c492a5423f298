//! Browser bindings: `<canvas>` 2D context as the surface, `requestAnimationFrame`
//! as the scheduler, window `resize` and document `visibilitychange` as inputs.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use super::{FrameScheduler, RainAnimation, RainField, RainSurface, pixel_extent};
use crate::config::RainSettings;
use crate::error::{Result, SiteError};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl RainSurface for CanvasSurface {
    fn paint_overlay(&mut self, color: &str, width: f64, height: f64) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn set_glyph_style(&mut self, color: &str, font: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(font);
    }

    fn draw_glyph(&mut self, glyph: char, x: f64, y: f64) {
        let mut buf = [0u8; 4];
        let _ = self.ctx.fill_text(glyph.encode_utf8(&mut buf), x, y);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` / `cancelAnimationFrame` pair. The callback is
/// installed after the animation exists, since it needs a handle back to it.
pub struct AnimationFrameScheduler {
    window: Window,
    callback: FrameCallback,
}

impl FrameScheduler for AnimationFrameScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> Option<i32> {
        let cb = self.callback.borrow();
        let f = cb.as_ref()?;
        match self.window.request_animation_frame(f.as_ref().unchecked_ref()) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        let _ = self.window.cancel_animation_frame(handle);
    }
}

pub type CanvasRain = RainAnimation<CanvasSurface, AnimationFrameScheduler>;

/// Size the canvas to the viewport and return its new pixel dimensions.
fn fit_to_window(win: &Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let width = pixel_extent(win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0));
    let height = pixel_extent(win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0));
    canvas.set_width(width);
    canvas.set_height(height);
    (width, height)
}

/// Start the rain on the canvas named by `settings.canvas_id` and hook up
/// resize and visibility handling. The returned handle keeps the loop alive;
/// dropping the last one cancels the pending frame and the listeners go quiet.
pub fn mount(win: &Window, doc: &Document, settings: &RainSettings) -> Result<Rc<RefCell<CanvasRain>>> {
    let selector = format!("#{}", settings.canvas_id);
    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(&settings.canvas_id)
        .ok_or_else(|| SiteError::MissingElement(selector.clone()))?
        .dyn_into()
        .map_err(|_| SiteError::MissingElement(format!("{} (not a canvas)", selector)))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| SiteError::Js("2d context unavailable".into()))?
        .dyn_into()
        .map_err(|_| SiteError::Js("2d context has unexpected type".into()))?;

    let (width, height) = fit_to_window(win, &canvas);
    let field = RainField::start(width, height, settings, ChaCha8Rng::from_entropy());
    log::info!(
        "rain: {} columns on {}x{} canvas",
        field.len(),
        width,
        height
    );

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let scheduler = AnimationFrameScheduler {
        window: win.clone(),
        callback: callback.clone(),
    };
    let rain = Rc::new(RefCell::new(RainAnimation::new(
        field,
        CanvasSurface::new(ctx),
        scheduler,
    )));

    {
        let weak = Rc::downgrade(&rain);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            if let Some(rain) = weak.upgrade() {
                rain.borrow_mut().on_frame();
            }
        }) as Box<dyn FnMut(f64)>));
    }

    // Resize: refit the canvas, then grow or shrink the columns.
    {
        let weak = Rc::downgrade(&rain);
        let win_resize = win.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(rain) = weak.upgrade() else {
                return;
            };
            let (w, h) = fit_to_window(&win_resize, &canvas);
            rain.borrow_mut().resize(w, h);
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Stop drawing while the tab is hidden.
    {
        let weak = Rc::downgrade(&rain);
        let doc_vis = doc.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(rain) = weak.upgrade() else {
                return;
            };
            let mut rain = rain.borrow_mut();
            if doc_vis.hidden() {
                rain.pause();
            } else {
                rain.resume();
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    rain.borrow_mut().start();
    Ok(rain)
}
