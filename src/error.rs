//! Error types for site initialisation.
//!
//! Nothing inside the rain animation or the typewriter can fail; errors only
//! surface while wiring features to the document or parsing a config.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Problems with a user-supplied [`crate::config::SiteConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("rain cell size must be greater than zero")]
    ZeroCellSize,

    #[error("rain alphabet must contain at least one glyph")]
    EmptyAlphabet,

    #[error("reset probability {0} is outside [0, 1]")]
    ResetProbability(f64),

    #[error("invalid config json: {0}")]
    Json(String),
}

/// Errors raised while attaching features to the page.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("missing element: {0}")]
    MissingElement(String),

    /// A web API call threw; the payload is the debug rendering of the JS value.
    #[error("javascript error: {0}")]
    Js(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("profile image must be a data:image/ url")]
    InvalidProfileImage,
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        match value.as_string() {
            Some(s) => SiteError::Js(s),
            None => SiteError::Js(format!("{:?}", value)),
        }
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;
