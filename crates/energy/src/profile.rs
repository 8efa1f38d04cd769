//! Asteroid profile construction and the material density table.

use serde::{Deserialize, Serialize};

use crate::{EnergyError, mass};
use neo_core::is_positive_finite;

/// Broad composition classes used to pick a bulk density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialClass {
    Carbonaceous,
    Stony,
    Metallic,
    Default,
}

impl MaterialClass {
    pub const ALL: [MaterialClass; 4] = [
        MaterialClass::Carbonaceous,
        MaterialClass::Stony,
        MaterialClass::Metallic,
        MaterialClass::Default,
    ];

    /// Parse a class from its name or single-letter code (C, S, M, D).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "c" | "carbonaceous" => Some(MaterialClass::Carbonaceous),
            "s" | "stony" => Some(MaterialClass::Stony),
            "m" | "metallic" => Some(MaterialClass::Metallic),
            "d" | "default" => Some(MaterialClass::Default),
            _ => None,
        }
    }
}

/// Bulk density (kg/m³) per material class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityTable {
    pub carbonaceous_kg_m3: f64,
    pub stony_kg_m3: f64,
    pub metallic_kg_m3: f64,
    pub default_kg_m3: f64,
}

impl Default for DensityTable {
    fn default() -> Self {
        Self {
            carbonaceous_kg_m3: 1_380.0,
            stony_kg_m3: 2_710.0,
            metallic_kg_m3: 5_320.0,
            default_kg_m3: 2_000.0,
        }
    }
}

impl DensityTable {
    pub fn density(&self, class: MaterialClass) -> f64 {
        match class {
            MaterialClass::Carbonaceous => self.carbonaceous_kg_m3,
            MaterialClass::Stony => self.stony_kg_m3,
            MaterialClass::Metallic => self.metallic_kg_m3,
            MaterialClass::Default => self.default_kg_m3,
        }
    }
}

/// Where a profile's density comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DensitySource {
    Class(MaterialClass),
    KgM3(f64),
}

impl DensitySource {
    fn resolve(self, table: &DensityTable) -> f64 {
        match self {
            DensitySource::Class(class) => table.density(class),
            DensitySource::KgM3(value) => value,
        }
    }
}

/// Physical description of a single body for one calculation.
///
/// Built through [`AsteroidProfile::builder`]; every field is validated once
/// and cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsteroidProfile {
    diameter_min_km: f64,
    diameter_max_km: f64,
    density_kg_m3: f64,
    material: Option<MaterialClass>,
    velocity_kmh: f64,
    distance_km: f64,
    mass_override_kg: Option<f64>,
}

impl AsteroidProfile {
    pub fn builder() -> AsteroidProfileBuilder {
        AsteroidProfileBuilder::default()
    }

    pub fn diameter_min_km(&self) -> f64 {
        self.diameter_min_km
    }

    pub fn diameter_max_km(&self) -> f64 {
        self.diameter_max_km
    }

    /// Midpoint of the diameter range; the size used for mass and cross-section.
    pub fn mean_diameter_km(&self) -> f64 {
        (self.diameter_min_km + self.diameter_max_km) / 2.0
    }

    pub fn density_kg_m3(&self) -> f64 {
        self.density_kg_m3
    }

    /// Material class the density came from, if it was resolved through a table.
    pub fn material(&self) -> Option<MaterialClass> {
        self.material
    }

    pub fn velocity_kmh(&self) -> f64 {
        self.velocity_kmh
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Mass in kg: the supplied override when positive, otherwise a sphere of
    /// the mean diameter.
    pub fn mass_kg(&self) -> Result<f64, EnergyError> {
        match self.mass_override_kg {
            Some(m) if m > 0.0 => Ok(m),
            _ => mass(self.mean_diameter_km(), self.density_kg_m3),
        }
    }
}

/// Collects caller input and validates it into an [`AsteroidProfile`].
#[derive(Debug, Clone, Default)]
pub struct AsteroidProfileBuilder {
    diameter_min_km: Option<f64>,
    diameter_max_km: Option<f64>,
    density: Option<DensitySource>,
    velocity_kmh: Option<f64>,
    distance_km: Option<f64>,
    mass_kg: Option<f64>,
}

impl AsteroidProfileBuilder {
    pub fn diameter_range_km(mut self, min_km: f64, max_km: f64) -> Self {
        self.diameter_min_km = Some(min_km);
        self.diameter_max_km = Some(max_km);
        self
    }

    /// Single known diameter; min and max collapse to the same value.
    pub fn diameter_km(self, diameter_km: f64) -> Self {
        self.diameter_range_km(diameter_km, diameter_km)
    }

    pub fn material(mut self, class: MaterialClass) -> Self {
        self.density = Some(DensitySource::Class(class));
        self
    }

    pub fn density_kg_m3(mut self, density: f64) -> Self {
        self.density = Some(DensitySource::KgM3(density));
        self
    }

    pub fn density(mut self, source: DensitySource) -> Self {
        self.density = Some(source);
        self
    }

    pub fn velocity_kmh(mut self, velocity_kmh: f64) -> Self {
        self.velocity_kmh = Some(velocity_kmh);
        self
    }

    pub fn distance_km(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    /// Known mass; non-positive values are ignored in favour of the derived mass.
    pub fn mass_kg(mut self, mass_kg: f64) -> Self {
        self.mass_kg = Some(mass_kg);
        self
    }

    pub fn build(self, table: &DensityTable) -> Result<AsteroidProfile, EnergyError> {
        let min_km = self
            .diameter_min_km
            .ok_or(EnergyError::MissingPrecondition("diameter"))?;
        let max_km = self
            .diameter_max_km
            .ok_or(EnergyError::MissingPrecondition("diameter"))?;
        let source = self
            .density
            .ok_or(EnergyError::MissingPrecondition("density"))?;
        let velocity_kmh = self
            .velocity_kmh
            .ok_or(EnergyError::MissingPrecondition("velocity"))?;
        let distance_km = self
            .distance_km
            .ok_or(EnergyError::MissingPrecondition("distance"))?;

        if !is_positive_finite(min_km) {
            return Err(EnergyError::InvalidDiameter(min_km));
        }
        if !is_positive_finite(max_km) {
            return Err(EnergyError::InvalidDiameter(max_km));
        }
        if min_km > max_km {
            return Err(EnergyError::InvalidDiameterRange { min_km, max_km });
        }

        let density_kg_m3 = source.resolve(table);
        if !is_positive_finite(density_kg_m3) {
            return Err(EnergyError::InvalidDensity(density_kg_m3));
        }
        if !neo_core::is_non_negative_finite(velocity_kmh) {
            return Err(EnergyError::InvalidVelocity(velocity_kmh));
        }
        if !is_positive_finite(distance_km) {
            return Err(EnergyError::InvalidDistance(distance_km));
        }
        if let Some(m) = self.mass_kg {
            if !m.is_finite() {
                return Err(EnergyError::InvalidMass(m));
            }
        }

        let material = match source {
            DensitySource::Class(class) => Some(class),
            DensitySource::KgM3(_) => None,
        };

        Ok(AsteroidProfile {
            diameter_min_km: min_km,
            diameter_max_km: max_km,
            density_kg_m3,
            material,
            velocity_kmh,
            distance_km,
            mass_override_kg: self.mass_kg,
        })
    }
}
