//! End-to-end impact assessment for a single asteroid profile.

use neo_core::is_positive_finite;
use neo_energy::{AsteroidProfile, ImpactEnergy};
use serde::Serialize;
use tracing::debug;

use crate::EffectsError;
use crate::blast::{DistanceEffect, air_burst_effects};
use crate::crater::{CraterEstimate, TargetMaterial, crater_diameter};
use crate::gravity::{GravitationalEffect, gravitational_effects};

/// Distances (km) at which airburst effects are reported unless overridden.
pub const DEFAULT_REFERENCE_DISTANCES_KM: [f64; 5] = [10.0, 50.0, 100.0, 500.0, 1000.0];

/// Caller-tunable parts of an impact assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsConfig {
    pub reference_distances_km: Vec<f64>,
    pub target: TargetMaterial,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            reference_distances_km: DEFAULT_REFERENCE_DISTANCES_KM.to_vec(),
            target: TargetMaterial::default(),
        }
    }
}

/// Profile quantities after mass derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedProperties {
    pub mass_kg: f64,
    pub diameter_km: f64,
    pub velocity_kmh: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub energy: ImpactEnergy,
    /// Sorted by ascending distance.
    pub effects_by_distance: Vec<DistanceEffect>,
    pub gravitational_effects: GravitationalEffect,
    pub crater: CraterEstimate,
    pub asteroid_properties: ResolvedProperties,
}

/// Assess a profile against the default reference distances and target.
pub fn impact_effects(profile: &AsteroidProfile) -> Result<ImpactReport, EffectsError> {
    impact_effects_with(profile, &EffectsConfig::default())
}

pub fn impact_effects_with(
    profile: &AsteroidProfile,
    config: &EffectsConfig,
) -> Result<ImpactReport, EffectsError> {
    let distances = normalized_distances(&config.reference_distances_km)?;

    let mass_kg = profile.mass_kg()?;
    let energy = ImpactEnergy::from_mass_velocity(mass_kg, profile.velocity_kmh())?;

    let effects_by_distance = distances
        .iter()
        .map(|&d| air_burst_effects(energy.kinetic_energy_j(), d))
        .collect::<Result<Vec<_>, _>>()?;

    let gravitational = gravitational_effects(mass_kg, profile.distance_km())?;

    let target_density = config.target.density_kg_m3();
    let crater = CraterEstimate {
        target: config.target,
        target_density_kg_m3: target_density,
        diameter_m: crater_diameter(
            mass_kg,
            profile.diameter_max_km(),
            energy.kinetic_energy_j(),
            profile.density_kg_m3(),
            target_density,
        )?,
    };

    debug!(
        mass_kg,
        energy_j = energy.kinetic_energy_j(),
        tnt_mt = energy.tnt_equivalent_mt(),
        distances = effects_by_distance.len(),
        "impact effects computed"
    );

    Ok(ImpactReport {
        energy,
        effects_by_distance,
        gravitational_effects: gravitational,
        crater,
        asteroid_properties: ResolvedProperties {
            mass_kg,
            diameter_km: profile.mean_diameter_km(),
            velocity_kmh: profile.velocity_kmh(),
            distance_km: profile.distance_km(),
        },
    })
}

/// Validate, sort ascending and de-duplicate the requested distances.
fn normalized_distances(requested: &[f64]) -> Result<Vec<f64>, EffectsError> {
    if requested.is_empty() {
        return Err(EffectsError::NoReferenceDistances);
    }
    if let Some(&bad) = requested.iter().find(|d| !is_positive_finite(**d)) {
        return Err(EffectsError::InvalidDistance(bad));
    }
    let mut distances = requested.to_vec();
    distances.sort_by(f64::total_cmp);
    distances.dedup();
    Ok(distances)
}
