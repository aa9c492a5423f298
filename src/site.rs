//! One initialisation routine for the whole page, driven by [`SiteConfig`].
//!
//! Features are independent: one that cannot find its markup logs and is
//! skipped, and the rest still start.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Window, window};

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::rain::canvas::{self, CanvasRain};
use crate::storage::{KeyValueStore, LocalStore, MemoryStore};
use crate::theme::{self, SharedTheme};
use crate::typewriter::TerminalTyping;
use crate::{contact, nav, profile, reveal};

pub const TERMINAL_LINES: &str = ".terminal-body p";

/// Live page state returned to JS. Freeing it stops the rain.
#[wasm_bindgen]
pub struct SiteHandle {
    rain: Option<Rc<RefCell<CanvasRain>>>,
    typing: Option<TerminalTyping>,
    theme: Option<SharedTheme>,
    doc: Document,
}

#[wasm_bindgen]
impl SiteHandle {
    pub fn pause_rain(&self) {
        if let Some(rain) = &self.rain {
            rain.borrow_mut().pause();
        }
    }

    pub fn resume_rain(&self) {
        if let Some(rain) = &self.rain {
            rain.borrow_mut().resume();
        }
    }

    pub fn rain_columns(&self) -> usize {
        self.rain
            .as_ref()
            .map(|r| r.borrow().field().len())
            .unwrap_or(0)
    }

    pub fn pause_typing(&self) {
        if let Some(t) = &self.typing {
            t.pause();
        }
    }

    pub fn resume_typing(&self) {
        if let Some(t) = &self.typing {
            t.resume();
        }
    }

    pub fn cancel_typing(&self) {
        if let Some(t) = &self.typing {
            t.cancel();
        }
    }

    /// Flip the theme as if the toggle had been clicked. Returns the new theme name.
    pub fn toggle_theme(&self) -> Option<String> {
        let theme = self.theme.as_ref()?;
        let next = theme.borrow_mut().toggle();
        theme::apply(&self.doc, next);
        Some(next.as_str().to_string())
    }
}

/// Log a feature that failed to start. Missing markup is expected on pages
/// that leave a section out, so it only rates a debug line.
fn report(feature: &str, err: &SiteError) {
    match err {
        SiteError::MissingElement(_) => log::debug!("{} skipped: {}", feature, err),
        _ => log::warn!("{} failed: {}", feature, err),
    }
}

fn optional<T>(feature: &str, result: Result<T>) -> Option<T> {
    result.map_err(|e| report(feature, &e)).ok()
}

fn default_store(win: &Window) -> Rc<dyn KeyValueStore> {
    match LocalStore::from_window(win) {
        Some(store) => Rc::new(store),
        None => {
            log::warn!("localStorage unavailable; preferences will not persist");
            Rc::new(MemoryStore::new())
        }
    }
}

/// Start every feature enabled in `config` against the current document.
pub fn init(config: &SiteConfig, store: Option<Rc<dyn KeyValueStore>>) -> Result<SiteHandle> {
    config.validate()?;
    let win = window().ok_or(SiteError::NoWindow)?;
    let doc = win.document().ok_or(SiteError::NoDocument)?;
    let store = store.unwrap_or_else(|| default_store(&win));
    let f = config.features;

    let rain = if f.rain {
        optional("rain", canvas::mount(&win, &doc, &config.rain))
    } else {
        None
    };
    let theme = if f.theme_toggle {
        optional("theme toggle", theme::attach(&doc, store.clone()))
    } else {
        None
    };
    if f.mobile_menu {
        optional("mobile menu", nav::attach_mobile_menu(&doc));
    }
    if f.smooth_scroll {
        optional("smooth scroll", nav::attach_smooth_scroll(&win, &doc));
    }
    if f.form_validation {
        if let Some(false) = optional("contact form", contact::attach(&win, &doc)) {
            log::debug!("contact form skipped: no #contactForm");
        }
    }
    if f.skill_bars {
        optional("skill bars", reveal::attach_skill_bars(&win, &doc));
    }
    if f.back_to_top {
        optional("back to top", nav::attach_back_to_top(&win, &doc));
    }
    if f.profile_fallback {
        optional("profile fallback", profile::attach_fallback(&doc));
    }
    if f.profile_upload {
        optional("profile upload", profile::attach_upload(&doc, store.clone()));
    }
    let typing = if f.typewriter {
        optional(
            "typewriter",
            TerminalTyping::attach(&win, &doc, TERMINAL_LINES, config.typing),
        )
        .flatten()
    } else {
        None
    };
    if f.active_nav {
        optional("active nav", nav::attach_active_nav(&win, &doc));
    }
    if f.project_hover {
        optional("project hover", reveal::attach_project_hover(&doc));
    }
    if f.timeline {
        optional("timeline", reveal::attach_timeline(&doc));
    }
    if f.parallax {
        optional("parallax", reveal::attach_parallax(&win, &doc));
    }
    if f.footer_year {
        optional("footer year", reveal::attach_footer_year(&win, &doc));
    }

    log::info!(
        "site ready (rain: {}, typewriter: {}, theme: {})",
        rain.is_some(),
        typing.is_some(),
        theme.is_some()
    );
    Ok(SiteHandle {
        rain,
        typing,
        theme,
        doc,
    })
}
