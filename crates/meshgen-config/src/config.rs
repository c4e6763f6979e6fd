//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use meshgen_materials::{BlendMode, ColorGradient, ColorKey};
use meshgen_terrain::{BiasParameters, NoiseParameters};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// `<platform config dir>/meshgen`, or `./meshgen` when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meshgen")
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk dimensions.
    pub chunk: ChunkConfig,
    /// Fractal noise settings.
    pub noise: NoiseParameters,
    /// Height remapping curve.
    pub bias: BiasParameters,
    /// Height-to-color gradient.
    pub gradient: GradientConfig,
    /// Demo host settings.
    pub demo: DemoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Chunk dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkConfig {
    /// Cells along each side of the chunk.
    pub side_length: u32,
    /// World-space height of a fully raised column.
    pub height_scale: f64,
    /// Texture `[width, height]`. `None` uses `side_length + 1` on both axes.
    pub texture_size: Option<[u32; 2]>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            side_length: 100,
            height_scale: 50.0,
            texture_size: None,
        }
    }
}

/// Gradient keys as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GradientConfig {
    pub keys: Vec<ColorKey>,
    /// Interpolate between keys instead of stepping.
    pub linear: bool,
}

impl Default for GradientConfig {
    fn default() -> Self {
        let terrain = ColorGradient::terrain();
        Self {
            keys: terrain.keys().to_vec(),
            linear: terrain.mode() == BlendMode::Linear,
        }
    }
}

impl GradientConfig {
    /// Build the gradient these keys describe.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Gradient`] if the key list is empty or a time is out of range.
    pub fn to_gradient(&self) -> Result<ColorGradient, ConfigError> {
        let mode = if self.linear {
            BlendMode::Linear
        } else {
            BlendMode::Stepped
        };
        Ok(ColorGradient::new(self.keys.clone(), mode)?)
    }
}

/// Demo host settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Frames to generate, advancing the world offset each frame.
    pub frames: u32,
    /// World offset added per frame.
    pub offset_step: [f64; 3],
    /// Directory the PNG and buffer dumps are written to.
    pub output_dir: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 60,
            offset_step: [0.5, 0.0, 0.25],
            output_dir: PathBuf::from("meshgen-out"),
        }
    }
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
