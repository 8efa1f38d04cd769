use approx::assert_relative_eq;
use neo_impact_calculator::ErrorKind;
use neo_impact_calculator::atmosphere::{
    AtmosphereError, StandardAtmosphere, TROPOPAUSE_ALTITUDE_M, air_density,
};

#[test]
fn sea_level_density_matches_standard_value() {
    let rho = air_density(0.0).expect("sea level");
    assert_relative_eq!(rho, 1.225, max_relative = 1e-3);
}

#[test]
fn tropopause_uses_lower_branch_and_is_continuous() {
    let atm = StandardAtmosphere::default();
    let at_boundary = atm.density(TROPOPAUSE_ALTITUDE_M).unwrap();
    assert_eq!(at_boundary, atm.density_troposphere(TROPOPAUSE_ALTITUDE_M));

    let below = atm.density_troposphere(TROPOPAUSE_ALTITUDE_M);
    let above = atm.density_stratosphere(TROPOPAUSE_ALTITUDE_M);
    assert_relative_eq!(below, above, max_relative = 1e-4);
    assert_relative_eq!(below, 0.3639, max_relative = 1e-3);
}

#[test]
fn pressure_and_temperature_at_tropopause() {
    let atm = StandardAtmosphere::default();
    assert_relative_eq!(atm.pressure_pa(11_000.0).unwrap(), 22_632.0, max_relative = 1e-4);
    assert_relative_eq!(atm.temperature_k(11_000.0).unwrap(), 216.65, max_relative = 1e-12);
    assert_relative_eq!(atm.temperature_k(20_000.0).unwrap(), 216.65, max_relative = 1e-12);
}

#[test]
fn density_strictly_decreases_up_to_entry_altitude() {
    let atm = StandardAtmosphere::default();
    let mut previous = atm.density(0.0).unwrap();
    for step in 1..=500 {
        let h = step as f64 * 100.0;
        let rho = atm.density(h).unwrap();
        assert!(rho < previous, "density not decreasing at {h} m");
        assert!(rho > 0.0);
        previous = rho;
    }
}

#[test]
fn rejects_negative_and_non_finite_altitudes() {
    let atm = StandardAtmosphere::default();
    let err = atm.density(-1.0).unwrap_err();
    assert_eq!(err, AtmosphereError::InvalidAltitude(-1.0));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(atm.density(f64::NAN).is_err());
    assert!(atm.pressure_pa(f64::INFINITY).is_err());
}
