//! Gravitational pull between the Earth and a passing body.

use neo_core::constants::{EARTH_MASS_KG, GRAVITATIONAL_CONSTANT};
use neo_core::units::km_to_m;
use neo_core::{is_non_negative_finite, is_positive_finite};
use serde::Serialize;

use crate::{EffectsError, ensure_finite};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GravitationalEffect {
    pub gravitational_force_n: f64,
    pub tidal_force_n: f64,
}

/// Newtonian attraction and tidal term at the closest-approach distance.
///
/// The tidal term multiplies by the Earth's mass squared, which is not
/// dimensionally a force. The expression is kept as-is until the physical
/// model is reviewed; see `tidal_force_uses_squared_earth_mass` in the tests.
pub fn gravitational_effects(
    mass_kg: f64,
    distance_km: f64,
) -> Result<GravitationalEffect, EffectsError> {
    if !is_non_negative_finite(mass_kg) {
        return Err(EffectsError::InvalidMass(mass_kg));
    }
    if !is_positive_finite(distance_km) {
        return Err(EffectsError::InvalidDistance(distance_km));
    }

    let distance_m = km_to_m(distance_km);
    let force = GRAVITATIONAL_CONSTANT * mass_kg * EARTH_MASS_KG / distance_m.powi(2);
    // Suspect: squared Earth mass.
    let tidal_force =
        2.0 * GRAVITATIONAL_CONSTANT * mass_kg * EARTH_MASS_KG * EARTH_MASS_KG / distance_m.powi(3);

    Ok(GravitationalEffect {
        gravitational_force_n: ensure_finite("gravitational force", force)?,
        tidal_force_n: ensure_finite("tidal force", tidal_force)?,
    })
}
