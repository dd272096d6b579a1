use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Smallest allowed globe radius, as a fraction of the smaller viewport side.
pub const MIN_SCALE_FACTOR: f64 = 0.1;

/// Colors used for the sphere, the countries and the highlight outline.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Fill of countries without a value.
    pub null_color: Color,
    pub border_color: Color,
    pub outer_border_color: Color,
    /// Ocean fill of the sphere.
    pub fill_color: Color,
    pub highlight_color: Color,
    /// Low end of the value scale when none is given.
    pub min_color: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            null_color: Color::rgb(0xcc, 0xcc, 0xbb),
            border_color: Color::rgb(0xee, 0xee, 0xee),
            outer_border_color: Color::rgb(0xbb, 0xbb, 0xdd),
            fill_color: Color::rgb(240, 248, 255),
            highlight_color: Color::rgb(0, 128, 0),
            min_color: Color::rgb(0xdd, 0xdd, 0xdd),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Topology object holding the country polygons.
    pub layer: String,
    /// Initial globe radius as a fraction of the smaller viewport side.
    pub scale_factor: f64,
    /// Zoom-out limit; never below [`MIN_SCALE_FACTOR`].
    pub min_scale_factor: f64,
    /// Duration of animated rotations.
    pub transition_ms: f64,
    /// Degrees of rotation per pixel of drag.
    pub drag_sensitivity: f64,
    pub palette: Palette,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            layer: formats::COUNTRIES_LAYER.to_string(),
            scale_factor: 1.0 / 2.2,
            min_scale_factor: MIN_SCALE_FACTOR,
            transition_ms: 1250.0,
            drag_sensitivity: 0.3,
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Json(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "config JSON parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GlobeConfig {
    /// Parses a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale_factor >= MIN_SCALE_FACTOR) {
            return Err(ConfigError::Invalid(format!(
                "min_scale_factor must be at least {MIN_SCALE_FACTOR}, got {}",
                self.min_scale_factor
            )));
        }
        if !(self.scale_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scale_factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if !(self.transition_ms >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "transition_ms must not be negative, got {}",
                self.transition_ms
            )));
        }
        if !self.drag_sensitivity.is_finite() {
            return Err(ConfigError::Invalid("drag_sensitivity must be finite".to_string()));
        }
        if self.layer.is_empty() {
            return Err(ConfigError::Invalid("layer must not be empty".to_string()));
        }
        Ok(())
    }
}
