//! Scroll-driven effects: skill bars that fill when seen, timeline items that
//! fade in one after another, project-card glow, parallax layers and the
//! footer year.

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Window,
};

use crate::error::Result;

pub const SKILL_THRESHOLD: f64 = 0.5;
pub const SKILL_FILL_DELAY_MS: i32 = 300;
pub const TIMELINE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_PARALLAX_SPEED: f64 = 0.5;
pub const PROJECT_GLOW_OPACITY: &str = "0.1";
/// Year baked into the footer markup; replaced with the current one on load.
pub const FOOTER_YEAR_PLACEHOLDER: &str = "2025";

/// CSS width for a skill bar's `data-width` (percent). Missing or
/// unparsable values read as 0; the result is clamped to 0..=100.
pub fn skill_width(data_width: Option<&str>) -> String {
    let pct = data_width
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    format!("{}%", pct)
}

/// Staggered transition for the `index`-th timeline item (0.2 s apart).
pub fn timeline_transition(index: usize) -> String {
    let delay = (index as f64 * 2.0) / 10.0;
    format!(
        "opacity 0.5s ease {d}s, transform 0.5s ease {d}s",
        d = delay
    )
}

/// Vertical offset of a parallax layer for the given scroll position.
pub fn parallax_offset(scroll_y: f64, data_speed: Option<&str>) -> f64 {
    let speed = data_speed
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_PARALLAX_SPEED);
    -(scroll_y * speed)
}

pub fn footer_text(text: &str, year: u32) -> String {
    text.replacen(FOOTER_YEAR_PLACEHOLDER, &year.to_string(), 1)
}

fn html_elements(doc: &Document, selector: &str) -> Result<Vec<HtmlElement>> {
    let nodes = doc.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Observe `targets` and call `on_visible` for every entry that scrolls into view.
fn observe<F>(targets: &[HtmlElement], threshold: f64, mut on_visible: F) -> Result<()>
where
    F: FnMut(HtmlElement) + 'static,
{
    let callback = Closure::wrap(Box::new(move |entries: Array, _obs: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if !entry.is_intersecting() {
                continue;
            }
            if let Ok(el) = entry.target().dyn_into::<HtmlElement>() {
                on_visible(el);
            }
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for el in targets {
        observer.observe(el);
    }
    callback.forget();
    Ok(())
}

/// Skill bars restart from 0% each time they enter view, then fill to `data-width`.
pub fn attach_skill_bars(win: &Window, doc: &Document) -> Result<usize> {
    let bars = html_elements(doc, ".skill-progress")?;
    let win = win.clone();
    observe(&bars, SKILL_THRESHOLD, move |bar| {
        let width = skill_width(bar.get_attribute("data-width").as_deref());
        let _ = bar.style().set_property("width", "0%");
        let fill = Closure::once_into_js(move || {
            let _ = bar.style().set_property("width", &width);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            fill.unchecked_ref(),
            SKILL_FILL_DELAY_MS,
        );
    })?;
    Ok(bars.len())
}

pub fn attach_timeline(doc: &Document) -> Result<usize> {
    let items = html_elements(doc, ".timeline-item")?;
    for (i, item) in items.iter().enumerate() {
        let style = item.style();
        let _ = style.set_property("opacity", "0");
        let _ = style.set_property("transform", "translateY(30px)");
        let _ = style.set_property("transition", &timeline_transition(i));
    }
    observe(&items, TIMELINE_THRESHOLD, |item| {
        let style = item.style();
        let _ = style.set_property("opacity", "1");
        let _ = style.set_property("transform", "translateY(0)");
    })?;
    Ok(items.len())
}

pub fn attach_project_hover(doc: &Document) -> Result<usize> {
    let cards = html_elements(doc, ".project-card")?;
    for card in &cards {
        for (event, opacity) in [("mouseenter", PROJECT_GLOW_OPACITY), ("mouseleave", "0")] {
            let card_hover: Element = card.clone().into();
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                let glow = card_hover
                    .query_selector(".project-glow")
                    .ok()
                    .flatten()
                    .and_then(|g| g.dyn_into::<HtmlElement>().ok());
                if let Some(glow) = glow {
                    let _ = glow.style().set_property("opacity", opacity);
                }
            }) as Box<dyn FnMut(_)>);
            card.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
    }
    Ok(cards.len())
}

pub fn attach_parallax(win: &Window, doc: &Document) -> Result<()> {
    let win_scroll = win.clone();
    let doc_scroll = doc.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let scrolled = win_scroll.page_y_offset().unwrap_or(0.0);
        let Ok(layers) = html_elements(&doc_scroll, ".parallax") else {
            return;
        };
        for layer in layers {
            let y = parallax_offset(scrolled, layer.get_attribute("data-speed").as_deref());
            let _ = layer
                .style()
                .set_property("transform", &format!("translateY({}px)", y));
        }
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn finish_load(doc: &Document) {
    if let Some(body) = doc.body() {
        let _ = body.class_list().add_1("loaded");
    }
    if let Ok(Some(footer)) = doc.query_selector(".footer-copyright") {
        let year = js_sys::Date::new_0().get_full_year();
        footer.set_inner_html(&footer_text(&footer.inner_html(), year));
    }
}

/// Mark the body as loaded and refresh the footer year once the page has loaded.
pub fn attach_footer_year(win: &Window, doc: &Document) -> Result<()> {
    if doc.ready_state() == "complete" {
        finish_load(doc);
        return Ok(());
    }
    let doc_load = doc.clone();
    let closure = Closure::once_into_js(move || finish_load(&doc_load));
    win.add_event_listener_with_callback("load", closure.unchecked_ref())?;
    Ok(())
}
