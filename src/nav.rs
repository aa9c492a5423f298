//! Navigation glue: mobile menu, in-page smooth scrolling, active section
//! highlight and the back-to-top button.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Node, ScrollBehavior, ScrollToOptions, Window};

use crate::error::{Result, SiteError};

/// Space left above a section after scrolling to it (fixed header height).
pub const HEADER_OFFSET: f64 = 80.0;
/// A section counts as current once scrolled to within this many pixels of its top.
pub const SECTION_LEAD: f64 = 100.0;
pub const BACK_TO_TOP_THRESHOLD: f64 = 500.0;
pub const ACTIVE_LINK_COLOR: &str = "var(--primary-purple)";

/// Open/closed state of the mobile menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// `body.style.overflow` for this state; the page must not scroll under an open menu.
    pub fn body_overflow(self) -> &'static str {
        if self.open { "hidden" } else { "" }
    }
}

/// Selector for an in-page anchor href, or `None` for a bare `#`.
pub fn anchor_target(href: &str) -> Option<&str> {
    match href {
        "#" => None,
        h if h.starts_with('#') => Some(h),
        _ => None,
    }
}

pub fn scroll_target(offset_top: f64) -> f64 {
    (offset_top - HEADER_OFFSET).max(0.0)
}

/// Id of the last section whose top (less [`SECTION_LEAD`]) is above `scroll_y`.
pub fn active_section<'a>(scroll_y: f64, sections: &'a [(String, f64)]) -> Option<&'a str> {
    sections
        .iter()
        .filter(|(_, top)| scroll_y >= top - SECTION_LEAD)
        .map(|(id, _)| id.as_str())
        .next_back()
}

pub fn back_to_top_visible(scroll_y: f64) -> bool {
    scroll_y > BACK_TO_TOP_THRESHOLD
}

fn each_element(doc: &Document, selector: &str, mut f: impl FnMut(Element)) -> Result<()> {
    let nodes = doc.query_selector_all(selector)?;
    for i in 0..nodes.length() {
        if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            f(el);
        }
    }
    Ok(())
}

fn scroll_y(win: &Window) -> f64 {
    win.scroll_y().unwrap_or(0.0)
}

fn smooth_scroll_to(win: &Window, top: f64) {
    let opts = ScrollToOptions::new();
    opts.set_top(top);
    opts.set_behavior(ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&opts);
}

/// DOM side of [`MenuState`]: the toggle button, the menu and `<body>`.
#[derive(Clone)]
struct MenuDom {
    toggle: Element,
    menu: Element,
    body: Option<HtmlElement>,
}

impl MenuDom {
    fn find(doc: &Document) -> Option<MenuDom> {
        Some(MenuDom {
            toggle: doc.query_selector(".menu-toggle").ok()??,
            menu: doc.query_selector(".nav-menu").ok()??,
            body: doc.body(),
        })
    }

    fn render(&self, state: MenuState) {
        for el in [&self.toggle, &self.menu] {
            let _ = el.class_list().toggle_with_force("active", state.is_open());
        }
        if let Some(body) = &self.body {
            let _ = body.style().set_property("overflow", state.body_overflow());
        }
    }

    fn close(&self) {
        self.render(MenuState::default());
    }

    fn is_open(&self) -> bool {
        self.menu.class_list().contains("active")
    }
}

pub fn attach_mobile_menu(doc: &Document) -> Result<()> {
    let dom = MenuDom::find(doc)
        .ok_or_else(|| SiteError::MissingElement(".menu-toggle / .nav-menu".into()))?;

    {
        let dom_click = dom.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let mut state = MenuState { open: dom_click.is_open() };
            state.toggle();
            dom_click.render(state);
        }) as Box<dyn FnMut(_)>);
        dom.toggle
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Picking a link closes the menu.
    each_element(doc, ".nav-link", |link| {
        let dom_link = dom.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            dom_link.close();
        }) as Box<dyn FnMut(_)>);
        let _ = link.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    })?;

    // So does clicking anywhere outside the menu and its toggle.
    {
        let dom_outside = dom.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let target = evt.target().and_then(|t| t.dyn_into::<Node>().ok());
            let inside = [&dom_outside.menu, &dom_outside.toggle]
                .iter()
                .any(|el| el.contains(target.as_ref()));
            if !inside {
                dom_outside.close();
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

pub fn attach_smooth_scroll(win: &Window, doc: &Document) -> Result<()> {
    each_element(doc, "a[href^=\"#\"]", |anchor| {
        let win_click = win.clone();
        let doc_click = doc.clone();
        let anchor_click = anchor.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            evt.prevent_default();
            let href = anchor_click.get_attribute("href").unwrap_or_default();
            let Some(selector) = anchor_target(&href) else {
                return;
            };
            let Some(target) = doc_click
                .query_selector(selector)
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            if let Some(dom) = MenuDom::find(&doc_click) {
                dom.close();
            }
            smooth_scroll_to(&win_click, scroll_target(target.offset_top() as f64));
        }) as Box<dyn FnMut(_)>);
        let _ = anchor.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    })
}

/// Whether a nav link points at the current section. No link is active
/// above the first section, including bare `#` links.
pub fn is_active_link(href: Option<&str>, current: Option<&str>) -> bool {
    match (href.and_then(|h| h.strip_prefix('#')), current) {
        (Some(target), Some(id)) => target == id,
        _ => false,
    }
}

pub fn attach_active_nav(win: &Window, doc: &Document) -> Result<()> {
    let win_scroll = win.clone();
    let doc_scroll = doc.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let mut sections = Vec::new();
        let _ = each_element(&doc_scroll, "section", |el| {
            if let Ok(section) = el.dyn_into::<HtmlElement>() {
                sections.push((section.id(), section.offset_top() as f64));
            }
        });
        let current = active_section(scroll_y(&win_scroll), &sections);
        let _ = each_element(&doc_scroll, ".nav-link", |link| {
            let is_current = is_active_link(link.get_attribute("href").as_deref(), current);
            let _ = link.class_list().toggle_with_force("active", is_current);
            if let Ok(link) = link.dyn_into::<HtmlElement>() {
                let color = if is_current { ACTIVE_LINK_COLOR } else { "" };
                let _ = link.style().set_property("color", color);
            }
        });
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

const BACK_TO_TOP_STYLE: &str = "position: fixed; bottom: 30px; right: 30px; width: 50px; height: 50px; \
    background: var(--gradient-purple); color: white; border: none; border-radius: 50%; \
    font-size: 1.25rem; cursor: pointer; opacity: 0; visibility: hidden; transition: all 0.3s; \
    z-index: 1000; display: flex; align-items: center; justify-content: center; \
    box-shadow: var(--shadow-glow);";

fn set_styles(el: &HtmlElement, props: &[(&str, &str)]) {
    let style = el.style();
    for (name, value) in props {
        let _ = style.set_property(name, value);
    }
}

/// Create the floating back-to-top button and show it past [`BACK_TO_TOP_THRESHOLD`].
pub fn attach_back_to_top(win: &Window, doc: &Document) -> Result<()> {
    let body = doc.body().ok_or(SiteError::NoDocument)?;
    let button: HtmlElement = doc
        .create_element("button")?
        .dyn_into()
        .map_err(|_| SiteError::Js("created button is not an HtmlElement".into()))?;
    button.set_class_name("back-to-top");
    button.set_inner_html("<i class=\"fas fa-arrow-up\"></i>");
    button.set_attribute("aria-label", "Back to top")?;
    button.set_attribute("style", BACK_TO_TOP_STYLE)?;
    body.append_child(&button)?;

    {
        let win_scroll = win.clone();
        let btn = button.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            if back_to_top_visible(scroll_y(&win_scroll)) {
                set_styles(&btn, &[("opacity", "1"), ("visibility", "visible"), ("transform", "translateY(0)")]);
            } else {
                set_styles(&btn, &[("opacity", "0"), ("visibility", "hidden"), ("transform", "translateY(20px)")]);
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let win_click = win.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            smooth_scroll_to(&win_click, 0.0);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let btn = button.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            set_styles(&btn, &[("transform", "translateY(-5px)")]);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let win_leave = win.clone();
        let btn = button.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            if back_to_top_visible(scroll_y(&win_leave)) {
                set_styles(&btn, &[("transform", "translateY(0)")]);
            }
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<(String, f64)> {
        vec![
            ("home".to_string(), 0.0),
            ("about".to_string(), 800.0),
            ("projects".to_string(), 1600.0),
        ]
    }

    #[test]
    fn test_active_section_uses_lead() {
        let s = sections();
        assert_eq!(active_section(0.0, &s), Some("home"));
        assert_eq!(active_section(699.0, &s), Some("home"));
        assert_eq!(active_section(700.0, &s), Some("about"));
        assert_eq!(active_section(5000.0, &s), Some("projects"));
    }

    #[test]
    fn test_active_link_matching() {
        assert!(is_active_link(Some("#about"), Some("about")));
        assert!(!is_active_link(Some("#home"), Some("about")));
        assert!(!is_active_link(Some("about"), Some("about")));
        assert!(!is_active_link(Some("#"), None));
        assert!(!is_active_link(Some(""), None));
        assert!(!is_active_link(None, Some("about")));
    }

    #[test]
    fn test_active_section_none_above_first() {
        let s = vec![("intro".to_string(), 400.0)];
        assert_eq!(active_section(10.0, &s), None);
        assert_eq!(active_section(0.0, &[]), None);
    }

    #[test]
    fn test_back_to_top_threshold_is_exclusive() {
        assert!(!back_to_top_visible(500.0));
        assert!(back_to_top_visible(500.5));
    }

    #[test]
    fn test_anchor_targets() {
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target("#about"), Some("#about"));
        assert_eq!(anchor_target("/cv.pdf"), None);
    }

    #[test]
    fn test_scroll_target_leaves_header_room() {
        assert_eq!(scroll_target(880.0), 800.0);
        assert_eq!(scroll_target(20.0), 0.0);
    }

    #[test]
    fn test_menu_state_overflow() {
        let mut menu = MenuState::default();
        assert_eq!(menu.body_overflow(), "");
        assert!(menu.toggle());
        assert_eq!(menu.body_overflow(), "hidden");
        menu.close();
        assert!(!menu.is_open());
    }
}
