//! Overpressure damage classification.

use std::fmt;

use serde::Serialize;

/// Blast severity, ordered from least to most destructive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageTier {
    Minor,
    LightDamage,
    ResidentialSevere,
    UnreinforcedCollapse,
    MostCollapse,
    ReinforcedSevere,
    CompleteDestruction,
}

/// Lower bounds (exclusive, kPa), most severe first.
const THRESHOLDS: [(f64, DamageTier); 6] = [
    (200.0, DamageTier::CompleteDestruction),
    (100.0, DamageTier::ReinforcedSevere),
    (50.0, DamageTier::MostCollapse),
    (30.0, DamageTier::UnreinforcedCollapse),
    (10.0, DamageTier::ResidentialSevere),
    (5.0, DamageTier::LightDamage),
];

impl DamageTier {
    /// First tier whose threshold the overpressure strictly exceeds.
    /// NaN compares false everywhere and lands on [`DamageTier::Minor`].
    pub fn from_overpressure(overpressure_kpa: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(threshold, _)| overpressure_kpa > *threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(DamageTier::Minor)
    }

    pub fn description(self) -> &'static str {
        match self {
            DamageTier::CompleteDestruction => "Complete destruction of buildings",
            DamageTier::ReinforcedSevere => "Severe damage to reinforced concrete buildings",
            DamageTier::MostCollapse => "Most buildings collapse",
            DamageTier::UnreinforcedCollapse => "Unreinforced buildings collapse",
            DamageTier::ResidentialSevere => "Residential buildings severely damaged",
            DamageTier::LightDamage => "Windows shatter, light building damage",
            DamageTier::Minor => "Minor damage",
        }
    }
}

impl fmt::Display for DamageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

pub fn damage_description(overpressure_kpa: f64) -> &'static str {
    DamageTier::from_overpressure(overpressure_kpa).description()
}
