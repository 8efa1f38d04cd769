use approx::assert_relative_eq;
use proptest::prelude::*;

use neo_impact_calculator::ErrorKind;
use neo_impact_calculator::energy::{
    AsteroidProfile, DensityTable, EnergyError, ImpactEnergy, MaterialClass, kinetic_energy, mass,
    tnt_equivalent,
};

#[test]
fn mass_scales_with_cube_of_diameter() {
    let one = mass(1.0, 3_000.0).unwrap();
    let two = mass(2.0, 3_000.0).unwrap();
    assert_relative_eq!(two, 8.0 * one, max_relative = 1e-12);

    let expected = 4.0 / 3.0 * std::f64::consts::PI * 500.0_f64.powi(3) * 3_000.0;
    assert_relative_eq!(one, expected, max_relative = 1e-12);
}

#[test]
fn mass_rejects_non_positive_inputs() {
    assert_eq!(mass(0.0, 3_000.0), Err(EnergyError::InvalidDiameter(0.0)));
    assert_eq!(mass(1.0, -5.0), Err(EnergyError::InvalidDensity(-5.0)));
    assert_eq!(mass(-1.0, 3_000.0).unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn kinetic_energy_converts_kmh() {
    // 36 km/h = 10 m/s
    assert_relative_eq!(kinetic_energy(2.0, 36.0).unwrap(), 100.0, max_relative = 1e-12);
    assert_eq!(kinetic_energy(1.0e12, 0.0).unwrap(), 0.0);
    assert!(kinetic_energy(1.0, -1.0).is_err());
    assert!(kinetic_energy(f64::NAN, 1.0).is_err());
}

#[test]
fn tnt_equivalent_is_exact_for_one_megaton() {
    assert_eq!(tnt_equivalent(4.184e15), 1.0);
    let energy = ImpactEnergy::from_mass_velocity(2.0, 36.0).unwrap();
    assert_eq!(energy.tnt_equivalent_mt(), tnt_equivalent(energy.kinetic_energy_j()));
}

#[test]
fn density_table_defaults() {
    let table = DensityTable::default();
    assert_eq!(table.density(MaterialClass::Carbonaceous), 1_380.0);
    assert_eq!(table.density(MaterialClass::Stony), 2_710.0);
    assert_eq!(table.density(MaterialClass::Metallic), 5_320.0);
    assert_eq!(table.density(MaterialClass::Default), 2_000.0);
    assert_eq!(MaterialClass::parse("M"), Some(MaterialClass::Metallic));
    assert_eq!(MaterialClass::parse(" stony "), Some(MaterialClass::Stony));
    assert_eq!(MaterialClass::parse("granite"), None);
}

#[test]
fn profile_builder_resolves_density_and_mass() {
    let table = DensityTable::default();
    let profile = AsteroidProfile::builder()
        .diameter_range_km(0.1, 0.3)
        .material(MaterialClass::Metallic)
        .velocity_kmh(50_000.0)
        .distance_km(1_000.0)
        .build(&table)
        .unwrap();

    assert_eq!(profile.density_kg_m3(), 5_320.0);
    assert_eq!(profile.material(), Some(MaterialClass::Metallic));
    assert_relative_eq!(profile.mean_diameter_km(), 0.2, max_relative = 1e-12);
    assert_eq!(
        profile.mass_kg().unwrap(),
        mass(profile.mean_diameter_km(), 5_320.0).unwrap()
    );
}

#[test]
fn non_positive_mass_override_falls_back_to_derived_mass() {
    let table = DensityTable::default();
    let base = AsteroidProfile::builder()
        .diameter_km(1.0)
        .density_kg_m3(3_000.0)
        .velocity_kmh(1.0)
        .distance_km(1.0);

    let derived = base.clone().mass_kg(0.0).build(&table).unwrap();
    assert_eq!(derived.mass_kg().unwrap(), mass(1.0, 3_000.0).unwrap());

    let given = base.mass_kg(42.0).build(&table).unwrap();
    assert_eq!(given.mass_kg().unwrap(), 42.0);
}

#[test]
fn profile_builder_reports_missing_and_invalid_fields() {
    let table = DensityTable::default();

    let missing = AsteroidProfile::builder()
        .velocity_kmh(1.0)
        .distance_km(1.0)
        .material(MaterialClass::Stony)
        .build(&table)
        .unwrap_err();
    assert_eq!(missing, EnergyError::MissingPrecondition("diameter"));
    assert_eq!(missing.kind(), ErrorKind::MissingPrecondition);

    let no_density = AsteroidProfile::builder()
        .diameter_km(1.0)
        .velocity_kmh(1.0)
        .distance_km(1.0)
        .build(&table)
        .unwrap_err();
    assert_eq!(no_density, EnergyError::MissingPrecondition("density"));

    let inverted = AsteroidProfile::builder()
        .diameter_range_km(0.5, 0.2)
        .material(MaterialClass::Stony)
        .velocity_kmh(1.0)
        .distance_km(1.0)
        .build(&table)
        .unwrap_err();
    assert_eq!(
        inverted,
        EnergyError::InvalidDiameterRange {
            min_km: 0.5,
            max_km: 0.2
        }
    );

    let zero_distance = AsteroidProfile::builder()
        .diameter_km(1.0)
        .material(MaterialClass::Stony)
        .velocity_kmh(1.0)
        .distance_km(0.0)
        .build(&table)
        .unwrap_err();
    assert_eq!(zero_distance, EnergyError::InvalidDistance(0.0));

    let bad_table = DensityTable {
        stony_kg_m3: 0.0,
        ..DensityTable::default()
    };
    let err = AsteroidProfile::builder()
        .diameter_km(1.0)
        .material(MaterialClass::Stony)
        .velocity_kmh(1.0)
        .distance_km(1.0)
        .build(&bad_table)
        .unwrap_err();
    assert_eq!(err, EnergyError::InvalidDensity(0.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_mass_increases_with_diameter_and_density(
        d in 1.0e-3f64..10.0,
        rho in 100.0f64..8_000.0,
        growth in 1.001f64..3.0,
    ) {
        let base = mass(d, rho).unwrap();
        prop_assert!(mass(d * growth, rho).unwrap() > base);
        prop_assert!(mass(d, rho * growth).unwrap() > base);
    }

    #[test]
    fn prop_kinetic_energy_increases_with_velocity(
        m in 1.0f64..1.0e13,
        v in 0.0f64..200_000.0,
        dv in 1.0f64..10_000.0,
    ) {
        let slow = kinetic_energy(m, v).unwrap();
        let fast = kinetic_energy(m, v + dv).unwrap();
        prop_assert!(slow >= 0.0);
        prop_assert!(fast > slow);
    }
}

#[test]
fn every_material_class_parses_by_name_and_has_a_density() {
    let table = DensityTable::default();
    for class in MaterialClass::ALL {
        let name = serde_json::to_value(class).unwrap();
        assert_eq!(MaterialClass::parse(name.as_str().unwrap()), Some(class));
        assert!(table.density(class) > 0.0);
    }
}
