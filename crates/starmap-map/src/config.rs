//! Map configuration.
//!
//! One explicit struct, handed to each subsystem when it is built or rebuilt.
//! Every field has a default, so a partial TOML file is valid:
//!
//! ```toml
//! chunk_size = 512.0
//!
//! [paths]
//! style = "dashed"
//! dash_length = 10.0
//! colour = "#9fb4ffff"
//!
//! [paths.scaling]
//! mode = "clamped"
//! min_scale = 0.5
//! max_scale = 2.0
//! ```

use std::path::Path;

use serde::Deserialize;
use starmap_engine::paint::Color;
use thiserror::Error;

/// Fallback when `paths.colour` does not parse.
pub const DEFAULT_PATH_COLOUR: &str = "#ffffffff";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level map configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Side length of a chunk in world units.
    ///
    /// Pick it so a chunk holds tens of objects: culling cost is per chunk,
    /// LOD cost is per object on reveal.
    pub chunk_size: f32,
    pub paths: PathConfig,
    pub markers: MarkerConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512.0,
            paths: PathConfig::default(),
            markers: MarkerConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&src)?;
        log::info!("loaded map config from {}", path.display());
        Ok(config)
    }

    /// Rejects values the subsystems cannot work with.
    ///
    /// Colours are not checked here; a bad colour string degrades to the
    /// default at use time instead of failing the whole load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: format!("must be a positive number, got {}", self.chunk_size),
            });
        }
        if !(self.paths.width.is_finite() && self.paths.width > 0.0) {
            return Err(ConfigError::Invalid {
                field: "paths.width",
                reason: format!("must be a positive number, got {}", self.paths.width),
            });
        }
        let s = &self.paths.scaling;
        if !(s.min_scale > 0.0 && s.min_scale <= s.max_scale && s.max_scale.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "paths.scaling",
                reason: format!(
                    "need 0 < min_scale <= max_scale, got {} / {}",
                    s.min_scale, s.max_scale
                ),
            });
        }
        Ok(())
    }

    /// Replaces every value [`validate`](Self::validate) would reject with
    /// its default, logging each replacement.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            log::warn!(
                "chunk_size {} is not usable, falling back to {}",
                self.chunk_size,
                defaults.chunk_size
            );
            self.chunk_size = defaults.chunk_size;
        }
        if !(self.paths.width.is_finite() && self.paths.width > 0.0) {
            log::warn!(
                "paths.width {} is not usable, falling back to {}",
                self.paths.width,
                defaults.paths.width
            );
            self.paths.width = defaults.paths.width;
        }
        let s = &self.paths.scaling;
        if !(s.min_scale > 0.0 && s.min_scale <= s.max_scale && s.max_scale.is_finite()) {
            log::warn!(
                "paths.scaling {} / {} is not usable, falling back to defaults",
                s.min_scale,
                s.max_scale
            );
            self.paths.scaling = defaults.paths.scaling;
        }
        self
    }
}

/// Visual style for looped (return) routes. Direct routes are always solid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Solid,
    #[default]
    Dashed,
}

/// How path width reacts to zoom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    /// Width follows the world scale only inside `[min_scale, max_scale]`.
    #[default]
    Clamped,
    /// Width is always in world units.
    Unscaled,
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    pub mode: ScalingMode,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self { mode: ScalingMode::Clamped, min_scale: 0.5, max_scale: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub style: PathStyle,
    /// Dash length in world units; clamped to [1, 16] when geometry is built.
    pub dash_length: f32,
    /// Full line width in world units.
    pub width: f32,
    /// `#rrggbb` / `#rrggbbaa`, used when the owner has no colour of its own.
    pub colour: String,
    /// Clamp shared-path alpha to [0, 1].
    ///
    /// The alpha grows by 0.1 per carrier without bound; whether large convoys
    /// should saturate is undecided, so the clamp can be switched off.
    pub clamp_alpha: bool,
    pub scaling: ScalingConfig,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            style: PathStyle::Dashed,
            dash_length: 10.0,
            width: 2.0,
            colour: DEFAULT_PATH_COLOUR.to_string(),
            clamp_alpha: true,
            scaling: ScalingConfig::default(),
        }
    }
}

impl PathConfig {
    /// Parsed path colour, falling back to [`DEFAULT_PATH_COLOUR`] with a warning.
    pub fn resolved_colour(&self) -> Color {
        parse_colour_or_default(&self.colour, "paths.colour")
    }
}

/// Marker sizes for the built-in star/mover draw pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub star_radius: f32,
    pub mover_radius: f32,
    pub star_colour: String,
    pub mover_colour: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            star_radius: 6.0,
            mover_radius: 3.0,
            star_colour: "#ffe9a8ff".to_string(),
            mover_colour: "#7fd4ffff".to_string(),
        }
    }
}

/// Parses `src`, or logs and returns the default colour.
pub fn parse_colour_or_default(src: &str, field: &str) -> Color {
    match Color::from_hex(src) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{field}: {e}; using {DEFAULT_PATH_COLOUR}");
            Color::white()
        }
    }
}
