//! Effects of an impactor's energy release on its surroundings.
//!
//! The blast and thermal terms are empirical nuclear-weapons scaling laws
//! reused as a first-order asteroid airburst approximation. They are only
//! meaningful as order-of-magnitude estimates.

pub mod blast;
pub mod crater;
pub mod damage;
pub mod gravity;
pub mod impact;

pub use blast::{DistanceEffect, air_burst_effects};
pub use crater::{CraterEstimate, TargetMaterial, crater_diameter};
pub use damage::{DamageTier, damage_description};
pub use gravity::{GravitationalEffect, gravitational_effects};
pub use impact::{
    DEFAULT_REFERENCE_DISTANCES_KM, EffectsConfig, ImpactReport, ResolvedProperties,
    impact_effects, impact_effects_with,
};

use neo_core::ErrorKind;
use neo_energy::EnergyError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EffectsError {
    #[error("distance must be positive (got {0} km)")]
    InvalidDistance(f64),
    #[error("energy must be finite and non-negative (got {0} J)")]
    InvalidEnergy(f64),
    #[error("mass must be finite and non-negative (got {0} kg)")]
    InvalidMass(f64),
    #[error("target density must be positive (got {0} kg/m³)")]
    InvalidTargetDensity(f64),
    #[error("{0} is not finite for these inputs")]
    NonFinite(&'static str),
    #[error("at least one reference distance is required")]
    NoReferenceDistances,
    #[error(transparent)]
    Energy(#[from] EnergyError),
}

impl EffectsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EffectsError::Energy(inner) => inner.kind(),
            EffectsError::NonFinite(_) => ErrorKind::NumericalInstability,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Reject results that overflowed or divided by an underflowed term.
pub(crate) fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64, EffectsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EffectsError::NonFinite(quantity))
    }
}
