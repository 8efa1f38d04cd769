//! Mass and kinetic-energy calculations for spherical bodies, plus the
//! asteroid profile every downstream calculation consumes.

pub mod profile;

pub use profile::{AsteroidProfile, AsteroidProfileBuilder, DensitySource, DensityTable, MaterialClass};

use neo_core::constants::JOULES_PER_MEGATON_TNT;
use neo_core::geometry::sphere_volume_m3;
use neo_core::units::kmh_to_ms;
use neo_core::{ErrorKind, is_non_negative_finite, is_positive_finite};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EnergyError {
    #[error("diameter must be positive (got {0} km)")]
    InvalidDiameter(f64),
    #[error("minimum diameter {min_km} km exceeds maximum diameter {max_km} km")]
    InvalidDiameterRange { min_km: f64, max_km: f64 },
    #[error("density must be positive (got {0} kg/m³)")]
    InvalidDensity(f64),
    #[error("mass must be finite and non-negative (got {0} kg)")]
    InvalidMass(f64),
    #[error("velocity must be finite and non-negative (got {0} km/h)")]
    InvalidVelocity(f64),
    #[error("distance must be positive (got {0} km)")]
    InvalidDistance(f64),
    #[error("energy must be finite and non-negative (got {0} J)")]
    InvalidEnergy(f64),
    #[error("{0} is required before the profile can be built")]
    MissingPrecondition(&'static str),
}

impl EnergyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnergyError::MissingPrecondition(_) => ErrorKind::MissingPrecondition,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Kinetic energy of an impactor and its TNT equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactEnergy {
    kinetic_energy_j: f64,
    tnt_equivalent_mt: f64,
}

impl ImpactEnergy {
    pub fn from_mass_velocity(mass_kg: f64, velocity_kmh: f64) -> Result<Self, EnergyError> {
        let kinetic_energy_j = kinetic_energy(mass_kg, velocity_kmh)?;
        Ok(Self {
            kinetic_energy_j,
            tnt_equivalent_mt: tnt_equivalent(kinetic_energy_j),
        })
    }

    pub fn kinetic_energy_j(&self) -> f64 {
        self.kinetic_energy_j
    }

    pub fn tnt_equivalent_mt(&self) -> f64 {
        self.tnt_equivalent_mt
    }
}

/// Mass (kg) of a homogeneous sphere.
pub fn mass(diameter_km: f64, density_kg_m3: f64) -> Result<f64, EnergyError> {
    if !is_positive_finite(diameter_km) {
        return Err(EnergyError::InvalidDiameter(diameter_km));
    }
    if !is_positive_finite(density_kg_m3) {
        return Err(EnergyError::InvalidDensity(density_kg_m3));
    }
    Ok(sphere_volume_m3(diameter_km) * density_kg_m3)
}

/// Kinetic energy (J) for a mass in kg moving at a speed in km/h.
pub fn kinetic_energy(mass_kg: f64, velocity_kmh: f64) -> Result<f64, EnergyError> {
    if !is_non_negative_finite(mass_kg) {
        return Err(EnergyError::InvalidMass(mass_kg));
    }
    if !is_non_negative_finite(velocity_kmh) {
        return Err(EnergyError::InvalidVelocity(velocity_kmh));
    }
    let velocity_ms = kmh_to_ms(velocity_kmh);
    Ok(0.5 * mass_kg * velocity_ms * velocity_ms)
}

/// Convert joules to megatons of TNT.
#[inline]
pub fn tnt_equivalent(energy_j: f64) -> f64 {
    energy_j / JOULES_PER_MEGATON_TNT
}
