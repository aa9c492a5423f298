//! Matrix Folio core crate.
//!
//! Client-side behaviour for a static portfolio page, compiled to wasm. The
//! page calls `start_site()` (or `start_site_with_config(json)`) once the DOM
//! is ready; every feature is wired from there.
//!
//! The browser-free parts (rain field, typewriter state machine, theme and
//! form logic, config) are plain Rust and tested on the host.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod contact;
pub mod error;
mod logger;
pub mod nav;
pub mod profile;
pub mod rain;
pub mod reveal;
pub mod site;
pub mod storage;
pub mod theme;
pub mod typewriter;

pub use config::{Features, RainSettings, SiteConfig, TypingSettings};
pub use error::{ConfigError, SiteError};
pub use site::SiteHandle;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init();
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start every feature with the default configuration and `localStorage`.
#[wasm_bindgen]
pub fn start_site() -> Result<SiteHandle, JsValue> {
    Ok(site::init(&SiteConfig::default(), None)?)
}

/// Like [`start_site`], with a (partial) JSON [`SiteConfig`].
#[wasm_bindgen]
pub fn start_site_with_config(json: &str) -> Result<SiteHandle, JsValue> {
    let config = SiteConfig::from_json(json).map_err(SiteError::from)?;
    Ok(site::init(&config, None)?)
}
