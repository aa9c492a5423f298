//! Dark / light theme switch.
//!
//! The chosen theme is stored under [`THEME_KEY`] and applied as a
//! `data-theme` attribute on `<html>`. The icon inside `.theme-toggle` shows
//! the theme a click would switch *to*.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Document;

use crate::error::{Result, SiteError};
use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Theme> {
        match s {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn icon_class(self) -> &'static str {
        match self {
            Theme::Dark => "fas fa-sun",
            Theme::Light => "fas fa-moon",
        }
    }

    pub fn icon_title(self) -> &'static str {
        match self {
            Theme::Dark => "Switch to light mode",
            Theme::Light => "Switch to dark mode",
        }
    }
}

/// Current theme plus the store it is persisted to.
pub struct ThemeSwitch<S: KeyValueStore> {
    store: S,
    current: Theme,
}

impl<S: KeyValueStore> ThemeSwitch<S> {
    /// Restore the saved theme; unknown or missing values fall back to dark.
    pub fn load(store: S) -> Self {
        let current = store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default();
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn set(&mut self, theme: Theme) {
        self.current = theme;
        self.store.set(THEME_KEY, theme.as_str());
    }

    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.set(next);
        next
    }
}

/// Write `theme` to the document: `data-theme` on `<html>` and the toggle icon.
pub fn apply(doc: &Document, theme: Theme) {
    if let Some(root) = doc.document_element() {
        let _ = root.set_attribute("data-theme", theme.as_str());
    }
    if let Ok(Some(icon)) = doc.query_selector(".theme-toggle i") {
        icon.set_class_name(theme.icon_class());
        let _ = icon.set_attribute("title", theme.icon_title());
    }
}

pub type SharedTheme = Rc<RefCell<ThemeSwitch<Rc<dyn KeyValueStore>>>>;

/// Apply the saved theme and make `.theme-toggle` flip it on click.
pub fn attach(doc: &Document, store: Rc<dyn KeyValueStore>) -> Result<SharedTheme> {
    let mut switch = ThemeSwitch::load(store);
    let saved = switch.current();
    switch.set(saved);
    apply(doc, saved);
    let switch = Rc::new(RefCell::new(switch));

    let button = doc
        .query_selector(".theme-toggle")?
        .ok_or_else(|| SiteError::MissingElement(".theme-toggle".into()))?;
    let shared = switch.clone();
    let doc_click = doc.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        let next = shared.borrow_mut().toggle();
        apply(&doc_click, next);
        log::debug!("theme switched to {}", next.as_str());
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(switch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_to_dark_without_saved_value() {
        let switch = ThemeSwitch::load(MemoryStore::new());
        assert_eq!(switch.current(), Theme::Dark);
    }

    #[test]
    fn test_unknown_saved_value_falls_back_to_dark() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "sepia");
        assert_eq!(ThemeSwitch::load(store).current(), Theme::Dark);
    }

    #[test]
    fn test_toggle_persists() {
        let store = Rc::new(MemoryStore::new());
        let mut switch = ThemeSwitch::load(store.clone());
        assert_eq!(switch.toggle(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(ThemeSwitch::load(store.clone()).current(), Theme::Light);
        switch.toggle();
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_icon_points_at_other_theme() {
        assert_eq!(Theme::Dark.icon_class(), "fas fa-sun");
        assert_eq!(Theme::Dark.icon_title(), "Switch to light mode");
        assert_eq!(Theme::Light.icon_class(), "fas fa-moon");
        assert_eq!(Theme::Light.icon_title(), "Switch to dark mode");
    }
}
