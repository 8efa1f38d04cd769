//! Airburst overpressure and thermal flux at a given distance.

use std::f64::consts::PI;

use neo_core::units::km_to_m;
use neo_core::{is_non_negative_finite, is_positive_finite};
use neo_energy::tnt_equivalent;
use serde::Serialize;

use crate::{EffectsError, ensure_finite};
use crate::damage::DamageTier;

/// Blast and thermal estimate at one distance from the burst point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceEffect {
    pub distance_km: f64,
    pub overpressure_kpa: f64,
    pub thermal_radiation_kw_m2: f64,
    /// Radius of severe damage (km); depends on yield only.
    pub damage_radius_km: f64,
}

impl DistanceEffect {
    pub fn damage_tier(&self) -> DamageTier {
        DamageTier::from_overpressure(self.overpressure_kpa)
    }
}

/// Cube-root scaled airburst effects for `energy_j` observed at `distance_km`.
pub fn air_burst_effects(energy_j: f64, distance_km: f64) -> Result<DistanceEffect, EffectsError> {
    if !is_non_negative_finite(energy_j) {
        return Err(EffectsError::InvalidEnergy(energy_j));
    }
    // Both terms divide by the distance; zero would yield infinities.
    if !is_positive_finite(distance_km) {
        return Err(EffectsError::InvalidDistance(distance_km));
    }

    let distance_m = km_to_m(distance_km);
    let energy_mt = tnt_equivalent(energy_j);
    let yield_scale = energy_mt.powf(1.0 / 3.0);

    Ok(DistanceEffect {
        distance_km,
        overpressure_kpa: ensure_finite("overpressure", 100.0 * yield_scale / distance_m)?,
        thermal_radiation_kw_m2: ensure_finite(
            "thermal radiation",
            1000.0 * energy_mt / (4.0 * PI * (distance_m * distance_m)),
        )?,
        damage_radius_km: ensure_finite("damage radius", 0.28 * yield_scale)?,
    })
}
