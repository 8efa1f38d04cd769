//! Two-layer standard atmosphere: a constant-lapse troposphere topped by an
//! isothermal lower stratosphere.
//!
//! Pressure follows the barometric formula in each layer and is converted to
//! density through the ideal gas law at the local temperature. The layers meet
//! at the tropopause (11 km), where the stratosphere is anchored at 22 632 Pa.

use neo_core::ErrorKind;
use neo_core::constants::G0;
use thiserror::Error;

/// Sea-level reference pressure (Pa).
pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;
/// Sea-level reference temperature (K).
pub const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;
/// Molar mass of dry air (kg/mol), i.e. 28.9644 g/mol.
pub const MOLAR_MASS_AIR_KG_MOL: f64 = 0.028_964_4;
/// Universal gas constant (J/(mol·K)).
pub const GAS_CONSTANT: f64 = 8.314_32;
/// Tropospheric temperature lapse rate (K/m).
pub const LAPSE_RATE_K_M: f64 = 0.0065;
/// Upper boundary of the troposphere (m). Altitudes equal to it are tropospheric.
pub const TROPOPAUSE_ALTITUDE_M: f64 = 11_000.0;
/// Stratosphere anchor pressure at the tropopause (Pa).
pub const TROPOPAUSE_PRESSURE_PA: f64 = 22_632.0;
/// Temperature lost across the troposphere (K).
pub const TROPOSPHERE_TEMPERATURE_DROP_K: f64 = 71.5;

#[derive(Debug, Error, PartialEq)]
pub enum AtmosphereError {
    #[error("altitude must be finite and non-negative (got {0} m)")]
    InvalidAltitude(f64),
}

impl AtmosphereError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtmosphereError::InvalidAltitude(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Reference values for the two-layer model.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardAtmosphere {
    pub sea_level_pressure_pa: f64,
    pub sea_level_temperature_k: f64,
    pub molar_mass_kg_mol: f64,
    pub gas_constant: f64,
    pub gravity_m_s2: f64,
    pub lapse_rate_k_m: f64,
    pub tropopause_altitude_m: f64,
    pub tropopause_pressure_pa: f64,
    pub troposphere_temperature_drop_k: f64,
}

impl Default for StandardAtmosphere {
    fn default() -> Self {
        Self {
            sea_level_pressure_pa: SEA_LEVEL_PRESSURE_PA,
            sea_level_temperature_k: SEA_LEVEL_TEMPERATURE_K,
            molar_mass_kg_mol: MOLAR_MASS_AIR_KG_MOL,
            gas_constant: GAS_CONSTANT,
            gravity_m_s2: G0,
            lapse_rate_k_m: LAPSE_RATE_K_M,
            tropopause_altitude_m: TROPOPAUSE_ALTITUDE_M,
            tropopause_pressure_pa: TROPOPAUSE_PRESSURE_PA,
            troposphere_temperature_drop_k: TROPOSPHERE_TEMPERATURE_DROP_K,
        }
    }
}

impl StandardAtmosphere {
    /// Air density (kg/m³) at the given geometric altitude.
    pub fn density(&self, altitude_m: f64) -> Result<f64, AtmosphereError> {
        check_altitude(altitude_m)?;
        Ok(if altitude_m <= self.tropopause_altitude_m {
            self.density_troposphere(altitude_m)
        } else {
            self.density_stratosphere(altitude_m)
        })
    }

    /// Static pressure (Pa) at the given altitude.
    pub fn pressure_pa(&self, altitude_m: f64) -> Result<f64, AtmosphereError> {
        check_altitude(altitude_m)?;
        Ok(if altitude_m <= self.tropopause_altitude_m {
            self.pressure_troposphere(altitude_m)
        } else {
            self.pressure_stratosphere(altitude_m)
        })
    }

    /// Air temperature (K) at the given altitude.
    pub fn temperature_k(&self, altitude_m: f64) -> Result<f64, AtmosphereError> {
        check_altitude(altitude_m)?;
        Ok(if altitude_m <= self.tropopause_altitude_m {
            self.sea_level_temperature_k - self.lapse_rate_k_m * altitude_m
        } else {
            self.stratosphere_temperature_k()
        })
    }

    /// Troposphere branch, evaluated without range selection.
    pub fn density_troposphere(&self, altitude_m: f64) -> f64 {
        let temperature = self.sea_level_temperature_k - self.lapse_rate_k_m * altitude_m;
        self.pressure_troposphere(altitude_m) * self.molar_mass_kg_mol
            / (self.gas_constant * temperature)
    }

    /// Stratosphere branch, evaluated without range selection.
    pub fn density_stratosphere(&self, altitude_m: f64) -> f64 {
        self.pressure_stratosphere(altitude_m) * self.molar_mass_kg_mol
            / (self.gas_constant * self.stratosphere_temperature_k())
    }

    fn pressure_troposphere(&self, altitude_m: f64) -> f64 {
        let ratio = 1.0 + (-self.lapse_rate_k_m / self.sea_level_temperature_k) * altitude_m;
        let exponent = self.gravity_m_s2 * self.molar_mass_kg_mol
            / (self.gas_constant * self.lapse_rate_k_m);
        self.sea_level_pressure_pa * ratio.powf(exponent)
    }

    fn pressure_stratosphere(&self, altitude_m: f64) -> f64 {
        let scale = self.gravity_m_s2 * self.molar_mass_kg_mol
            / (self.gas_constant * self.stratosphere_temperature_k());
        self.tropopause_pressure_pa * f64::exp(-scale * (altitude_m - self.tropopause_altitude_m))
    }

    fn stratosphere_temperature_k(&self) -> f64 {
        self.sea_level_temperature_k - self.troposphere_temperature_drop_k
    }
}

/// Density from the default model.
pub fn air_density(altitude_m: f64) -> Result<f64, AtmosphereError> {
    StandardAtmosphere::default().density(altitude_m)
}

fn check_altitude(altitude_m: f64) -> Result<(), AtmosphereError> {
    if neo_core::is_non_negative_finite(altitude_m) {
        Ok(())
    } else {
        Err(AtmosphereError::InvalidAltitude(altitude_m))
    }
}
