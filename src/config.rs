//! Game configuration.
//!
//! Settings come from an INI file; anything missing keeps its default.
//!
//! ```ini
//! [game]
//! target_fps = 60
//! start_level = 1
//! max_frame_delta = 0.02
//!
//! [display]
//! cell_width = 25
//! cell_height = 50
//! ```

use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use log::info;

use crate::error::ConfigError;
use crate::physics::MAX_STEP;

const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_START_LEVEL: u32 = 1;
const DEFAULT_MAX_FRAME_DELTA: f32 = MAX_STEP;
const DEFAULT_CELL_WIDTH: f32 = 25.0;
const DEFAULT_CELL_HEIGHT: f32 = 50.0;
pub const DEFAULT_CONFIG_PATH: &str = "./platformer.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Frame-rate cap of the main loop.
    pub target_fps: u32,
    /// Level loaded at startup.
    pub start_level: u32,
    /// Upper bound on the simulated time step, in seconds.
    pub max_frame_delta: f32,
    /// World units covered by one terminal column.
    pub cell_width: f32,
    /// World units covered by one terminal row.
    pub cell_height: f32,
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            start_level: DEFAULT_START_LEVEL,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load from `config_path` if the file exists; otherwise keep defaults.
    pub fn load(&mut self) -> Result<(), ConfigError> {
        if !Path::new(&self.config_path).exists() {
            info!("No config file at {:?}, using defaults", self.config_path);
            return Ok(());
        }
        let mut ini = Ini::new();
        ini.load(&self.config_path).map_err(ConfigError::Load)?;
        self.apply(&ini)
    }

    /// Load from INI text.
    pub fn load_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(ConfigError::Load)?;
        self.apply(&ini)
    }

    fn apply(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        if let Some(fps) = ini.getuint("game", "target_fps").map_err(ConfigError::Load)? {
            self.target_fps = u32::try_from(fps).map_err(|_| ConfigError::Invalid {
                key: "target_fps",
                reason: format!("{} is too large", fps),
            })?;
        }
        if let Some(level) = ini.getuint("game", "start_level").map_err(ConfigError::Load)? {
            self.start_level = u32::try_from(level).map_err(|_| ConfigError::Invalid {
                key: "start_level",
                reason: format!("{} is too large", level),
            })?;
        }
        if let Some(delta) = ini.getfloat("game", "max_frame_delta").map_err(ConfigError::Load)? {
            self.max_frame_delta = delta as f32;
        }
        if let Some(width) = ini.getfloat("display", "cell_width").map_err(ConfigError::Load)? {
            self.cell_width = width as f32;
        }
        if let Some(height) = ini.getfloat("display", "cell_height").map_err(ConfigError::Load)? {
            self.cell_height = height as f32;
        }

        self.validate()?;
        info!(
            "Loaded config: fps={}, start_level={}, max_frame_delta={}, cell={}x{}",
            self.target_fps, self.start_level, self.max_frame_delta, self.cell_width, self.cell_height
        );
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid {
                key: "target_fps",
                reason: "must be positive".to_string(),
            });
        }
        if self.start_level == 0 {
            return Err(ConfigError::Invalid {
                key: "start_level",
                reason: "levels start at 1".to_string(),
            });
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.max_frame_delta) {
            return Err(ConfigError::Invalid {
                key: "max_frame_delta",
                reason: format!("{} is not a positive duration", self.max_frame_delta),
            });
        }
        if self.max_frame_delta > MAX_STEP {
            return Err(ConfigError::Invalid {
                key: "max_frame_delta",
                reason: format!("{} exceeds the {} s physics step", self.max_frame_delta, MAX_STEP),
            });
        }
        if !positive(self.cell_width) || !positive(self.cell_height) {
            return Err(ConfigError::Invalid {
                key: "cell_width/cell_height",
                reason: "cell sizes must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Frame budget derived from `target_fps`.
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}
