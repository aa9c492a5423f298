//! Site configuration.
//!
//! One object lists which optional features are enabled and carries the
//! tuning constants for the rain and typewriter. Every field has a default so
//! partial JSON from the page works:
//!
//! ```json
//! { "features": { "profile_upload": true }, "rain": { "cell_size": 16 } }
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub features: Features,
    pub rain: RainSettings,
    pub typing: TypingSettings,
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: SiteConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rain.validate()
    }
}

/// Feature switches. All on by default except profile upload, which needs
/// an extra `<input type=file>` in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Features {
    pub rain: bool,
    pub theme_toggle: bool,
    pub mobile_menu: bool,
    pub smooth_scroll: bool,
    pub form_validation: bool,
    pub skill_bars: bool,
    pub timeline: bool,
    pub back_to_top: bool,
    pub profile_fallback: bool,
    pub profile_upload: bool,
    pub typewriter: bool,
    pub active_nav: bool,
    pub project_hover: bool,
    pub parallax: bool,
    pub footer_year: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            rain: true,
            theme_toggle: true,
            mobile_menu: true,
            smooth_scroll: true,
            form_validation: true,
            skill_bars: true,
            timeline: true,
            back_to_top: true,
            profile_fallback: true,
            profile_upload: false,
            typewriter: true,
            active_nav: true,
            project_hover: true,
            parallax: true,
            footer_year: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RainSettings {
    /// Pixel width and height of one glyph slot.
    pub cell_size: u32,
    pub alphabet: String,
    /// Chance per frame that a stream past the bottom edge restarts at row 0.
    pub reset_probability: f64,
    pub overlay_color: String,
    pub glyph_color: String,
    pub font_family: String,
    /// Id of the `<canvas>` element the rain draws on.
    pub canvas_id: String,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            cell_size: 14,
            alphabet: "01".to_string(),
            reset_probability: 0.025,
            overlay_color: "rgba(10, 10, 26, 0.05)".to_string(),
            glyph_color: "#8a2be2".to_string(),
            font_family: "'Source Code Pro', monospace".to_string(),
            canvas_id: "matrixRain".to_string(),
        }
    }
}

impl RainSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.alphabet.chars().next().is_none() {
            return Err(ConfigError::EmptyAlphabet);
        }
        if !(0.0..=1.0).contains(&self.reset_probability) {
            return Err(ConfigError::ResetProbability(self.reset_probability));
        }
        Ok(())
    }

    /// CSS font shorthand for the glyphs, e.g. `14px 'Source Code Pro', monospace`.
    pub fn font(&self) -> String {
        format!("{}px {}", self.cell_size, self.font_family)
    }
}

/// Delays for the terminal typewriter, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypingSettings {
    pub start_delay_ms: u32,
    pub char_delay_ms: u32,
    pub line_delay_ms: u32,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            start_delay_ms: 1000,
            char_delay_ms: 30,
            line_delay_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg = SiteConfig::from_json("{}").unwrap();
        assert_eq!(cfg, SiteConfig::default());
        assert_eq!(cfg.rain.cell_size, 14);
        assert!(!cfg.features.profile_upload);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg = SiteConfig::from_json(
            r#"{"features":{"rain":false},"rain":{"reset_probability":0.25},"typing":{"char_delay_ms":10}}"#,
        )
        .unwrap();
        assert!(!cfg.features.rain);
        assert!(cfg.features.theme_toggle);
        assert_eq!(cfg.rain.reset_probability, 0.25);
        assert_eq!(cfg.rain.alphabet, "01");
        assert_eq!(cfg.typing.char_delay_ms, 10);
        assert_eq!(cfg.typing.line_delay_ms, 500);
    }

    #[test]
    fn rejects_invalid_rain_settings() {
        assert_eq!(
            SiteConfig::from_json(r#"{"rain":{"cell_size":0}}"#),
            Err(ConfigError::ZeroCellSize)
        );
        assert_eq!(
            SiteConfig::from_json(r#"{"rain":{"alphabet":""}}"#),
            Err(ConfigError::EmptyAlphabet)
        );
        assert_eq!(
            SiteConfig::from_json(r#"{"rain":{"reset_probability":1.5}}"#),
            Err(ConfigError::ResetProbability(1.5))
        );
        assert!(matches!(
            SiteConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn font_uses_cell_size() {
        let rain = RainSettings::default();
        assert_eq!(rain.font(), "14px 'Source Code Pro', monospace");
    }
}
