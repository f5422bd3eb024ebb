//! Run configuration
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TICK_RATE;

/// How episodes are presented while they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Nothing beyond the per-generation summary
    None,
    /// Score/Gen/Alive line at every tick
    #[default]
    Hud,
    /// Character grid of the playfield written to stdout
    Ascii,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::None => "none",
            RenderMode::Hud => "hud",
            RenderMode::Ascii => "ascii",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Some(RenderMode::None),
            "hud" => Some(RenderMode::Hud),
            "ascii" | "grid" => Some(RenderMode::Ascii),
            _ => None,
        }
    }
}

/// Errors raised while loading or checking settings
#[derive(Debug)]
pub enum SettingsError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            }
            SettingsError::Parse(e) => write!(f, "malformed settings: {}", e),
            SettingsError::Invalid(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// Parameters of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Birds per generation
    pub population: usize,
    /// Generations to run before giving up
    pub generations: u32,
    /// Seed for pipes and breeding; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Ticks per second; 0 runs unpaced
    pub tick_rate: u32,
    /// Hard cap on ticks per episode; 0 means no cap
    pub max_ticks: u64,
    /// Stop once a generation's best fitness reaches this
    pub fitness_threshold: f32,
    /// Width of the pilots' hidden layer
    pub hidden_neurons: usize,
    /// Maximum per-weight mutation
    pub mutation_scale: f32,
    /// Pilots carried over unchanged each generation
    pub elite: usize,
    pub render: RenderMode,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            population: 50,
            generations: 50,
            seed: None,
            tick_rate: TICK_RATE,
            max_ticks: 0,
            fitness_threshold: 100.0,
            hidden_neurons: 6,
            mutation_scale: 0.5,
            elite: 2,
            render: RenderMode::Hud,
        }
    }
}

impl RunSettings {
    /// Read settings from a JSON file and validate them
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.population == 0 {
            return Err(SettingsError::Invalid("population must be at least 1".into()));
        }
        if self.hidden_neurons == 0 {
            return Err(SettingsError::Invalid(
                "hidden_neurons must be at least 1".into(),
            ));
        }
        if self.elite > self.population {
            return Err(SettingsError::Invalid(format!(
                "elite ({}) exceeds population ({})",
                self.elite, self.population
            )));
        }
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(SettingsError::Invalid(
                "mutation_scale must be a non-negative number".into(),
            ));
        }
        if self.fitness_threshold.is_nan() {
            return Err(SettingsError::Invalid("fitness_threshold is NaN".into()));
        }
        Ok(())
    }
}
