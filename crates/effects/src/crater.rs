//! Transient crater size from an empirical gravity-regime scaling law.

use neo_core::constants::GRAVITATIONAL_CONSTANT;
use neo_core::units::km_to_m;
use neo_core::{is_non_negative_finite, is_positive_finite};
use serde::{Deserialize, Serialize};

use crate::{EffectsError, ensure_finite};

/// Ground material at the impact site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMaterial {
    /// Mean Earth density, used when nothing is known about the site.
    #[default]
    Default,
    Sand,
    Clay,
}

impl TargetMaterial {
    pub fn density_kg_m3(self) -> f64 {
        match self {
            TargetMaterial::Default => 5_513.0,
            TargetMaterial::Sand => 1_520.0,
            TargetMaterial::Clay => 1_200.0,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "d" | "default" => Some(TargetMaterial::Default),
            "s" | "sand" => Some(TargetMaterial::Sand),
            "c" | "clay" => Some(TargetMaterial::Clay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CraterEstimate {
    pub target: TargetMaterial,
    pub target_density_kg_m3: f64,
    pub diameter_m: f64,
}

/// Crater diameter (m).
///
/// `D = 0.07 · 1.3 · (g/G)^(1/6) · (E · ρ_impactor / ρ_target)^(1/3.4)` where
/// `g` is the surface gravity of the impactor, taken at half its maximum
/// diameter.
pub fn crater_diameter(
    mass_kg: f64,
    diameter_max_km: f64,
    energy_j: f64,
    impactor_density_kg_m3: f64,
    target_density_kg_m3: f64,
) -> Result<f64, EffectsError> {
    if !is_non_negative_finite(mass_kg) {
        return Err(EffectsError::InvalidMass(mass_kg));
    }
    if !is_non_negative_finite(energy_j) {
        return Err(EffectsError::InvalidEnergy(energy_j));
    }
    if !is_positive_finite(diameter_max_km) {
        return Err(neo_energy::EnergyError::InvalidDiameter(diameter_max_km).into());
    }
    if !is_positive_finite(impactor_density_kg_m3) {
        return Err(neo_energy::EnergyError::InvalidDensity(impactor_density_kg_m3).into());
    }
    if !is_positive_finite(target_density_kg_m3) {
        return Err(EffectsError::InvalidTargetDensity(target_density_kg_m3));
    }

    let radius_m = km_to_m(diameter_max_km) / 2.0;
    let surface_gravity = GRAVITATIONAL_CONSTANT * mass_kg / (radius_m * radius_m);
    let gravity_term = (surface_gravity / GRAVITATIONAL_CONSTANT).powf(1.0 / 6.0);
    let energy_term =
        (energy_j * impactor_density_kg_m3 / target_density_kg_m3).powf(1.0 / 3.4);

    ensure_finite("crater diameter", 0.07 * 1.3 * gravity_term * energy_term)
}
