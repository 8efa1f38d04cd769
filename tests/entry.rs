use approx::assert_relative_eq;

use neo_impact_calculator::ErrorKind;
use neo_impact_calculator::atmosphere::StandardAtmosphere;
use neo_impact_calculator::constants::{ENTRY_MODEL_EARTH_MASS, GRAVITATIONAL_CONSTANT};
use neo_impact_calculator::energy::{AsteroidProfile, DensityTable};
use neo_impact_calculator::entry::{
    DescentCoefficients, EntryBody, EntryConfig, EntryError, MAX_ITERATIONS, reference_sweep,
    simulate_entry,
};
use neo_impact_calculator::geometry::sphere_volume_m3;

fn example_profile() -> AsteroidProfile {
    AsteroidProfile::builder()
        .diameter_range_km(0.15, 0.34)
        .density_kg_m3(3_000.0)
        .velocity_kmh(80_273.0)
        .distance_km(1_000_000.0)
        .build(&DensityTable::default())
        .expect("valid profile")
}

#[test]
fn default_run_steps_fifty_thousand_times_to_the_ground() {
    let config = EntryConfig::default();
    let trajectory =
        simulate_entry(&example_profile(), &config, &StandardAtmosphere::default()).unwrap();

    assert_eq!(trajectory.iterations(), 50_000);
    let samples = trajectory.samples();
    assert_eq!(samples.len(), 50_001);
    assert_eq!(samples[0].altitude_m, 50_000.0);
    assert_eq!(samples[0].velocity_m_s, 30.0);
    assert_eq!(samples[0].time_s, 0.0);
    assert_eq!(trajectory.final_state().unwrap().altitude_m, 0.0);

    for pair in samples.windows(2) {
        assert!(pair[1].altitude_m <= pair[0].altitude_m);
        assert!(pair[1].time_s > pair[0].time_s);
    }
    for sample in samples {
        assert!(sample.altitude_m >= 0.0);
        assert!(sample.velocity_m_s.is_finite());
        assert!(sample.displacement_m.is_finite());
    }

    let expected_time = 50_000.0 * config.step_duration_s;
    assert_relative_eq!(trajectory.final_state().unwrap().time_s, expected_time, max_relative = 1e-9);
    assert!(trajectory.peak_rate_m_s() >= 30.0);
    assert!(trajectory.solver_steps() >= 50_000);
}

#[test]
fn uneven_step_clamps_last_altitude_to_zero() {
    let config = EntryConfig {
        initial_altitude_m: 10.0,
        altitude_step_m: 3.0,
        ..EntryConfig::default()
    };
    let trajectory =
        simulate_entry(&example_profile(), &config, &StandardAtmosphere::default()).unwrap();
    let altitudes: Vec<f64> = trajectory.samples().iter().map(|s| s.altitude_m).collect();
    assert_eq!(trajectory.iterations(), 4);
    assert_eq!(altitudes, vec![10.0, 7.0, 4.0, 1.0, 0.0]);
}

#[test]
fn zero_initial_altitude_yields_single_sample() {
    let config = EntryConfig {
        initial_altitude_m: 0.0,
        ..EntryConfig::default()
    };
    let trajectory =
        simulate_entry(&example_profile(), &config, &StandardAtmosphere::default()).unwrap();
    assert_eq!(trajectory.iterations(), 0);
    assert_eq!(trajectory.samples().len(), 1);
}

#[test]
fn coefficients_follow_drag_and_gravity_terms() {
    let profile = example_profile();
    let body = EntryBody::from_profile(&profile).unwrap();
    let atmosphere = StandardAtmosphere::default();

    let volume = sphere_volume_m3(profile.mean_diameter_km());
    assert_relative_eq!(body.mass_kg, volume * 3_000.0, max_relative = 1e-12);
    let radius = profile.mean_diameter_km() * 500.0;
    assert_relative_eq!(body.cross_section_m2, std::f64::consts::PI * radius * radius, max_relative = 1e-9);

    let h = 8_000.0;
    let c = DescentCoefficients::at(&body, h, &atmosphere).unwrap();
    let rho = atmosphere.density(h).unwrap();
    assert_relative_eq!(c.drag, 0.5 * 0.9 * rho * body.cross_section_m2 / body.mass_kg, max_relative = 1e-12);
    assert_relative_eq!(
        c.gravity,
        body.mass_kg * GRAVITATIONAL_CONSTANT * ENTRY_MODEL_EARTH_MASS * h.sqrt(),
        max_relative = 1e-12
    );

    let ground = DescentCoefficients::at(&body, 0.0, &atmosphere).unwrap();
    assert_eq!(ground.gravity, 0.0);
    assert!(ground.drag > c.drag);
}

#[test]
fn reference_sweep_restarts_every_step() {
    let config = EntryConfig {
        initial_altitude_m: 5.0,
        ..EntryConfig::default()
    };
    let steps = reference_sweep(&example_profile(), &config, &StandardAtmosphere::default()).unwrap();

    let altitudes: Vec<f64> = steps.iter().map(|s| s.altitude_m).collect();
    assert_eq!(altitudes, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    for step in &steps {
        assert_eq!(step.times_s.first(), Some(&0.0));
        assert_eq!(step.times_s.last(), Some(&50.0));
        assert_eq!(step.rates_m_s[0], 30.0);
        assert_eq!(step.displacements_m[0], 0.0);
        assert_eq!(step.times_s.len(), step.rates_m_s.len());
        assert!(step.rates_m_s.iter().all(|v| v.is_finite()));
    }
    assert!(steps[0].coefficients.gravity > steps[4].coefficients.gravity);
}

#[test]
fn invalid_settings_are_rejected() {
    let profile = example_profile();
    let atmosphere = StandardAtmosphere::default();

    let zero_step = EntryConfig {
        altitude_step_m: 0.0,
        ..EntryConfig::default()
    };
    let err = simulate_entry(&profile, &zero_step, &atmosphere).unwrap_err();
    assert!(matches!(
        err,
        EntryError::InvalidConfig {
            field: "altitude_step_m",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let negative_start = EntryConfig {
        initial_altitude_m: -10.0,
        ..EntryConfig::default()
    };
    assert!(simulate_entry(&profile, &negative_start, &atmosphere).is_err());
}

#[test]
fn exhausted_solver_surfaces_as_instability() {
    let config = EntryConfig {
        initial_altitude_m: 10.0,
        step_duration_s: 500.0,
        max_steps_per_call: 2,
        ..EntryConfig::default()
    };
    let err = simulate_entry(&example_profile(), &config, &StandardAtmosphere::default())
        .unwrap_err();
    assert!(matches!(err, EntryError::Solver { altitude_m, .. } if altitude_m == 10.0));
    assert_eq!(err.kind(), ErrorKind::NumericalInstability);
}

#[test]
fn step_count_is_bounded_before_running() {
    let profile = example_profile();
    let atmosphere = StandardAtmosphere::default();

    for step in [1e-300, 1e-10, 1e-3] {
        let config = EntryConfig {
            altitude_step_m: step,
            ..EntryConfig::default()
        };
        let err = simulate_entry(&profile, &config, &atmosphere).unwrap_err();
        assert!(matches!(
            err,
            EntryError::InvalidConfig {
                field: "altitude_step_m",
                ..
            }
        ));
        assert!(reference_sweep(&profile, &config, &atmosphere).is_err());
    }

    let fine = EntryConfig {
        altitude_step_m: 0.01,
        ..EntryConfig::default()
    };
    assert!(fine.validate().is_ok());
    assert!(fine.iterations() <= MAX_ITERATIONS);
}
