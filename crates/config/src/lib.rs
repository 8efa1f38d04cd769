//! Configuration models and loaders for the NEO impact calculator.
//!
//! Records here are plain data; turning them into engine types (and applying
//! defaults) is the job of the consuming crate.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Engine-wide settings. Every section is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub density_table: Option<DensityTableConfig>,
    pub effects: Option<EffectsSettings>,
    pub entry: Option<EntrySettings>,
}

/// Overrides for the material density table (kg/m³).
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DensityTableConfig {
    pub carbonaceous_kg_m3: Option<f64>,
    pub stony_kg_m3: Option<f64>,
    pub metallic_kg_m3: Option<f64>,
    pub default_kg_m3: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EffectsSettings {
    pub reference_distances_km: Option<Vec<f64>>,
    /// Ground material name: `default`, `sand` or `clay`.
    pub target: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EntrySettings {
    pub initial_altitude_m: Option<f64>,
    pub altitude_step_m: Option<f64>,
    pub initial_rate_m_s: Option<f64>,
    pub step_duration_s: Option<f64>,
    pub window_s: Option<f64>,
    pub rtol: Option<f64>,
    pub atol: Option<f64>,
    pub max_steps_per_call: Option<usize>,
}

/// A named asteroid to assess.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    pub diameter_min_km: f64,
    pub diameter_max_km: f64,
    /// Material class name; ignored when `density_kg_m3` is given.
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub density_kg_m3: Option<f64>,
    pub velocity_kmh: f64,
    pub distance_km: f64,
    #[serde(default)]
    pub mass_kg: Option<f64>,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no configuration records found in {0}")]
    Empty(PathBuf),
}

/// Load engine settings from a single YAML or TOML file.
pub fn load_engine_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let config = if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader(reader)?
    };
    debug!(path = %path.display(), "engine configuration loaded");
    Ok(config)
}

/// Load scenarios from a YAML list, a single TOML record, or a directory of TOML records.
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<ScenarioConfig>, ConfigError> {
    let path = path.as_ref();
    let scenarios: Vec<ScenarioConfig> = load_records(path)?;
    if scenarios.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }
    debug!(path = %path.display(), count = scenarios.len(), "scenarios loaded");
    Ok(scenarios)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
