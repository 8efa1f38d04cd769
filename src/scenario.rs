//! Conversion of configuration and feed records into engine inputs.

use neo_config::{EngineConfig, ScenarioConfig};
use neo_effects::{EffectsConfig, ImpactReport, TargetMaterial, impact_effects_with};
use neo_energy::{AsteroidProfile, DensitySource, DensityTable, EnergyError, MaterialClass};
use neo_entry::EntryConfig;
use neo_entry::ode::Tolerances;
use neo_feed::ProfileInputs;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown material class '{0}'")]
    UnknownMaterial(String),
    #[error("unknown target material '{0}'")]
    UnknownTarget(String),
    #[error("scenario '{name}': {source}")]
    Profile {
        name: String,
        #[source]
        source: EnergyError,
    },
    #[error("scenario '{name}': {source}")]
    Effects {
        name: String,
        #[source]
        source: neo_effects::EffectsError,
    },
}

impl ScenarioError {
    pub fn kind(&self) -> neo_core::ErrorKind {
        match self {
            ScenarioError::UnknownMaterial(_) | ScenarioError::UnknownTarget(_) => {
                neo_core::ErrorKind::InvalidInput
            }
            ScenarioError::Profile { source, .. } => source.kind(),
            ScenarioError::Effects { source, .. } => source.kind(),
        }
    }
}

/// Engine settings resolved against their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub density_table: DensityTable,
    pub effects: EffectsConfig,
    pub entry: EntryConfig,
}

impl EngineSettings {
    pub fn from_config(config: &EngineConfig) -> Result<Self, ScenarioError> {
        let mut settings = EngineSettings::default();

        if let Some(table) = &config.density_table {
            let defaults = &mut settings.density_table;
            defaults.carbonaceous_kg_m3 = table.carbonaceous_kg_m3.unwrap_or(defaults.carbonaceous_kg_m3);
            defaults.stony_kg_m3 = table.stony_kg_m3.unwrap_or(defaults.stony_kg_m3);
            defaults.metallic_kg_m3 = table.metallic_kg_m3.unwrap_or(defaults.metallic_kg_m3);
            defaults.default_kg_m3 = table.default_kg_m3.unwrap_or(defaults.default_kg_m3);
        }

        if let Some(effects) = &config.effects {
            if let Some(distances) = &effects.reference_distances_km {
                settings.effects.reference_distances_km = distances.clone();
            }
            if let Some(target) = &effects.target {
                settings.effects.target = parse_target(target)?;
            }
        }

        if let Some(entry) = &config.entry {
            let cfg = &mut settings.entry;
            cfg.initial_altitude_m = entry.initial_altitude_m.unwrap_or(cfg.initial_altitude_m);
            cfg.altitude_step_m = entry.altitude_step_m.unwrap_or(cfg.altitude_step_m);
            cfg.initial_rate_m_s = entry.initial_rate_m_s.unwrap_or(cfg.initial_rate_m_s);
            cfg.step_duration_s = entry
                .step_duration_s
                .unwrap_or(cfg.altitude_step_m / cfg.initial_rate_m_s.abs());
            cfg.window_s = entry.window_s.unwrap_or(cfg.window_s);
            cfg.tolerances = Tolerances::new(
                entry.rtol.unwrap_or(cfg.tolerances.rtol),
                entry.atol.unwrap_or(cfg.tolerances.atol),
            );
            cfg.max_steps_per_call = entry.max_steps_per_call.unwrap_or(cfg.max_steps_per_call);
        }

        Ok(settings)
    }
}

pub fn parse_material(name: &str) -> Result<MaterialClass, ScenarioError> {
    MaterialClass::parse(name).ok_or_else(|| ScenarioError::UnknownMaterial(name.to_string()))
}

pub fn parse_target(name: &str) -> Result<TargetMaterial, ScenarioError> {
    TargetMaterial::parse(name).ok_or_else(|| ScenarioError::UnknownTarget(name.to_string()))
}

/// Build a profile from a scenario record. An explicit density wins over the
/// material class; with neither the `default` class is used.
pub fn profile_from_config(
    scenario: &ScenarioConfig,
    table: &DensityTable,
) -> Result<AsteroidProfile, ScenarioError> {
    let density = match (scenario.density_kg_m3, &scenario.material) {
        (Some(kg_m3), _) => DensitySource::KgM3(kg_m3),
        (None, Some(material)) => DensitySource::Class(parse_material(material)?),
        (None, None) => DensitySource::Class(MaterialClass::Default),
    };

    let mut builder = AsteroidProfile::builder()
        .diameter_range_km(scenario.diameter_min_km, scenario.diameter_max_km)
        .density(density)
        .velocity_kmh(scenario.velocity_kmh)
        .distance_km(scenario.distance_km);
    if let Some(mass) = scenario.mass_kg {
        builder = builder.mass_kg(mass);
    }

    builder.build(table).map_err(|source| ScenarioError::Profile {
        name: scenario.name.clone(),
        source,
    })
}

/// Bulk density assumed for feed records when neither a class nor a density
/// is given (kg/m³).
pub const FEED_DEFAULT_DENSITY_KG_M3: f64 = 3_000.0;

/// Density for a feed record: an explicit density wins over a material class,
/// and with neither [`FEED_DEFAULT_DENSITY_KG_M3`] is used.
pub fn feed_density(
    material: Option<&str>,
    density_kg_m3: Option<f64>,
) -> Result<DensitySource, ScenarioError> {
    Ok(match (density_kg_m3, material) {
        (Some(kg_m3), _) => DensitySource::KgM3(kg_m3),
        (None, Some(name)) => DensitySource::Class(parse_material(name)?),
        (None, None) => DensitySource::KgM3(FEED_DEFAULT_DENSITY_KG_M3),
    })
}

/// Build a profile from feed quantities with the given density.
pub fn profile_from_feed(
    inputs: &ProfileInputs,
    density: DensitySource,
    table: &DensityTable,
) -> Result<AsteroidProfile, EnergyError> {
    AsteroidProfile::builder()
        .diameter_range_km(inputs.diameter_min_km, inputs.diameter_max_km)
        .density(density)
        .velocity_kmh(inputs.velocity_kmh)
        .distance_km(inputs.distance_km)
        .build(table)
}

/// Assess every scenario in order; the first failure stops the run.
pub fn assess_scenarios(
    scenarios: &[ScenarioConfig],
    settings: &EngineSettings,
) -> Result<Vec<(String, ImpactReport)>, ScenarioError> {
    scenarios
        .iter()
        .map(|scenario| {
            let profile = profile_from_config(scenario, &settings.density_table)?;
            let report = impact_effects_with(&profile, &settings.effects).map_err(|source| {
                ScenarioError::Effects {
                    name: scenario.name.clone(),
                    source,
                }
            })?;
            debug!(scenario = %scenario.name, "scenario assessed");
            Ok((scenario.name.clone(), report))
        })
        .collect()
}
