//! Core units, constants, and shared primitives for the NEO impact calculator workspace.

use std::fmt;

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Newtonian gravitational constant (m³ kg⁻¹ s⁻²).
    pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
    /// Mass of the Earth (kg), used by the close-approach gravity terms.
    pub const EARTH_MASS_KG: f64 = 5.972e24;
    /// Scaled Earth mass used by the entry descent model.
    ///
    /// Not an SI value and kept separate from [`EARTH_MASS_KG`].
    /// Which of the two the descent model should use is unresolved.
    pub const ENTRY_MODEL_EARTH_MASS: f64 = 5.972e4;
    /// Energy released by one megaton of TNT (J).
    pub const JOULES_PER_MEGATON_TNT: f64 = 4.184e15;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert kilometres per hour to metres per second.
    #[inline]
    pub fn kmh_to_ms(v: f64) -> f64 {
        v * (1_000.0 / 3_600.0)
    }

    /// Convert metres per second to kilometres per hour.
    #[inline]
    pub fn ms_to_kmh(v: f64) -> f64 {
        v * (3_600.0 / 1_000.0)
    }

    /// Convert g/cm³ to kg/m³.
    #[inline]
    pub fn g_cm3_to_kg_m3(v: f64) -> f64 {
        v * 1_000.0
    }
}

/// Sphere helpers shared by the mass and entry models.
pub mod geometry {
    use std::f64::consts::PI;

    /// Volume (m³) of a sphere with the given diameter in kilometres.
    #[inline]
    pub fn sphere_volume_m3(diameter_km: f64) -> f64 {
        let radius_m = diameter_km * 500.0;
        (4.0 / 3.0) * PI * radius_m.powi(3)
    }

    /// Frontal cross-section (m²) of a sphere recovered from its volume.
    #[inline]
    pub fn cross_section_from_volume(volume_m3: f64) -> f64 {
        PI * (3.0 * volume_m3 / (4.0 * PI)).powf(2.0 / 3.0)
    }
}

/// Broad classification shared by every error type in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An argument was out of range, non-finite, or inconsistent.
    InvalidInput,
    /// A numerical procedure diverged or produced non-finite state.
    NumericalInstability,
    /// A quantity was requested before the inputs it depends on were supplied.
    MissingPrecondition,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NumericalInstability => "numerical instability",
            ErrorKind::MissingPrecondition => "missing precondition",
        };
        f.write_str(label)
    }
}

/// Require a strictly positive, finite value.
#[inline]
pub fn is_positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Require a non-negative, finite value.
#[inline]
pub fn is_non_negative_finite(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
