use anyhow::Result;
use homestead_world::{LevelSettings, WeatherSchedule};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/homestead.toml";

/// Simulation settings shared by every scenario run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Crops and fire pits get a random tick with odds 1 in this.
    pub random_tick_chance: u32,
    pub weather: WeatherConfig,
    /// Log every sync message the level publishes.
    pub trace_messages: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Follow the clear/rain schedule instead of staying clear.
    pub cycle: bool,
    pub clear_ticks: u64,
    pub rain_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        let settings = LevelSettings::default();
        Self {
            seed: settings.seed,
            random_tick_chance: settings.random_tick_chance,
            weather: WeatherConfig::default(),
            trace_messages: false,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            cycle: false,
            clear_ticks: 12_000,
            rain_ticks: 6_000,
        }
    }
}

impl SimConfig {
    /// Load from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_lenient(&contents, path),
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                SimConfig::default()
            }
        }
    }

    fn parse_lenient(contents: &str, path: &Path) -> Self {
        match toml::from_str::<SimConfig>(contents) {
            Ok(cfg) => cfg.sanitized(),
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                SimConfig::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if self.random_tick_chance == 0 {
            warn!("random_tick_chance must be at least 1, using 1");
            self.random_tick_chance = 1;
        }
        if self.weather.cycle && (self.weather.clear_ticks == 0 || self.weather.rain_ticks == 0) {
            warn!("weather cycle needs non-zero spell lengths, disabling it");
            self.weather.cycle = false;
        }
        self
    }

    /// Save to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn level_settings(&self) -> LevelSettings {
        LevelSettings {
            seed: self.seed,
            random_tick_chance: self.random_tick_chance,
            weather_schedule: self.weather.cycle.then_some(WeatherSchedule {
                clear_ticks: self.weather.clear_ticks,
                rain_ticks: self.weather.rain_ticks,
            }),
        }
    }
}
