//! First-order model of a body descending through the atmosphere.
//!
//! The descent is a damped linear oscillator `y1' = y2`, `y2' = -a·y2 - b·y1`
//! whose coefficients depend on altitude: `a` is a drag term scaled by the
//! local air density and `b` a gravity term growing with `√h`. Altitude is
//! stepped down at a fixed rate while the oscillator is advanced in time.

pub mod ode;

use neo_atmosphere::{AtmosphereError, StandardAtmosphere};
use neo_core::constants::{ENTRY_MODEL_EARTH_MASS, GRAVITATIONAL_CONSTANT};
use neo_core::geometry::{cross_section_from_volume, sphere_volume_m3};
use neo_core::{ErrorKind, is_non_negative_finite, is_positive_finite};
use neo_energy::{AsteroidProfile, EnergyError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use ode::{DormandPrince, OdeError, OdeSystem, Tolerances};

/// Drag coefficient of a sphere.
pub const DRAG_COEFFICIENT: f64 = 0.9;
pub const DEFAULT_INITIAL_ALTITUDE_M: f64 = 50_000.0;
pub const DEFAULT_ALTITUDE_STEP_M: f64 = 1.0;
pub const DEFAULT_INITIAL_RATE_M_S: f64 = 30.0;
/// Time window of each restarted integration in [`reference_sweep`].
pub const DEFAULT_WINDOW_S: f64 = 50.0;
/// Upper bound on altitude steps in one run.
pub const MAX_ITERATIONS: usize = 10_000_000;

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry setting `{field}` is out of range (got {value})")]
    InvalidConfig { field: &'static str, value: f64 },
    #[error("body mass must be positive (got {0} kg)")]
    InvalidMass(f64),
    #[error("non-finite entry state at altitude {altitude_m} m, t = {time_s} s")]
    NumericalInstability { altitude_m: f64, time_s: f64 },
    #[error("ODE solver failed at altitude {altitude_m} m: {source}")]
    Solver {
        altitude_m: f64,
        #[source]
        source: OdeError,
    },
    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
    #[error(transparent)]
    Energy(#[from] EnergyError),
}

impl EntryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EntryError::InvalidConfig { .. } | EntryError::InvalidMass(_) => {
                ErrorKind::InvalidInput
            }
            EntryError::NumericalInstability { .. } | EntryError::Solver { .. } => {
                ErrorKind::NumericalInstability
            }
            EntryError::Atmosphere(inner) => inner.kind(),
            EntryError::Energy(inner) => inner.kind(),
        }
    }
}

/// Settings for an entry run.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryConfig {
    pub initial_altitude_m: f64,
    pub altitude_step_m: f64,
    /// Initial oscillator position `y1`.
    pub initial_displacement_m: f64,
    /// Initial oscillator rate `y2`.
    pub initial_rate_m_s: f64,
    /// Simulated time spent on each altitude step by [`simulate_entry`].
    pub step_duration_s: f64,
    /// Integration window of each restart in [`reference_sweep`].
    pub window_s: f64,
    pub tolerances: Tolerances,
    pub max_steps_per_call: usize,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            initial_altitude_m: DEFAULT_INITIAL_ALTITUDE_M,
            altitude_step_m: DEFAULT_ALTITUDE_STEP_M,
            initial_displacement_m: 0.0,
            initial_rate_m_s: DEFAULT_INITIAL_RATE_M_S,
            step_duration_s: DEFAULT_ALTITUDE_STEP_M / DEFAULT_INITIAL_RATE_M_S,
            window_s: DEFAULT_WINDOW_S,
            tolerances: Tolerances::default(),
            max_steps_per_call: 100_000,
        }
    }
}

impl EntryConfig {
    pub fn validate(&self) -> Result<(), EntryError> {
        let checks = [
            ("initial_altitude_m", self.initial_altitude_m, is_non_negative_finite as fn(f64) -> bool),
            ("altitude_step_m", self.altitude_step_m, is_positive_finite),
            ("initial_displacement_m", self.initial_displacement_m, f64::is_finite),
            ("initial_rate_m_s", self.initial_rate_m_s, f64::is_finite),
            ("step_duration_s", self.step_duration_s, is_positive_finite),
            ("window_s", self.window_s, is_positive_finite),
            ("rtol", self.tolerances.rtol, is_positive_finite),
            ("atol", self.tolerances.atol, is_positive_finite),
        ];
        for (field, value, ok) in checks {
            if !ok(value) {
                return Err(EntryError::InvalidConfig { field, value });
            }
        }
        let steps = (self.initial_altitude_m / self.altitude_step_m).ceil();
        if !steps.is_finite() || steps > MAX_ITERATIONS as f64 {
            return Err(EntryError::InvalidConfig {
                field: "altitude_step_m",
                value: self.altitude_step_m,
            });
        }
        if self.max_steps_per_call == 0 {
            return Err(EntryError::InvalidConfig {
                field: "max_steps_per_call",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Number of altitude steps from the initial altitude down to zero.
    /// Bounded by [`MAX_ITERATIONS`] once [`EntryConfig::validate`] passes.
    pub fn iterations(&self) -> usize {
        (self.initial_altitude_m / self.altitude_step_m).ceil() as usize
    }

    /// Altitude at loop entry for iteration `k`; the last one ends at zero.
    fn altitude_at(&self, k: usize) -> f64 {
        if k >= self.iterations() {
            0.0
        } else {
            (self.initial_altitude_m - k as f64 * self.altitude_step_m).max(0.0)
        }
    }

    fn solver(&self) -> DormandPrince {
        DormandPrince::new(self.tolerances).with_max_steps(self.max_steps_per_call)
    }
}

/// Mass and frontal area of the descending body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryBody {
    pub mass_kg: f64,
    pub cross_section_m2: f64,
}

impl EntryBody {
    /// Sphere of the profile's mean diameter.
    pub fn from_profile(profile: &AsteroidProfile) -> Result<Self, EntryError> {
        let mass_kg = profile.mass_kg()?;
        if !is_positive_finite(mass_kg) {
            return Err(EntryError::InvalidMass(mass_kg));
        }
        let volume = sphere_volume_m3(profile.mean_diameter_km());
        Ok(Self {
            mass_kg,
            cross_section_m2: cross_section_from_volume(volume),
        })
    }
}

/// Oscillator coefficients at one altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescentCoefficients {
    /// `a`: damping from aerodynamic drag.
    pub drag: f64,
    /// `b`: restoring term from gravity.
    pub gravity: f64,
}

impl DescentCoefficients {
    pub fn at(
        body: &EntryBody,
        altitude_m: f64,
        atmosphere: &StandardAtmosphere,
    ) -> Result<Self, EntryError> {
        let density = atmosphere.density(altitude_m)?;
        Ok(Self {
            drag: 0.5 * DRAG_COEFFICIENT * density * body.cross_section_m2 / body.mass_kg,
            gravity: body.mass_kg
                * GRAVITATIONAL_CONSTANT
                * ENTRY_MODEL_EARTH_MASS
                * altitude_m.sqrt(),
        })
    }
}

struct DescentOscillator {
    coefficients: DescentCoefficients,
}

impl OdeSystem<2> for DescentOscillator {
    fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
        dydt[0] = y[1];
        dydt[1] = -self.coefficients.drag * y[1] - self.coefficients.gravity * y[0];
    }
}

/// One sample of a descent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryState {
    pub altitude_m: f64,
    pub velocity_m_s: f64,
    pub displacement_m: f64,
    pub time_s: f64,
}

/// Completed descent, from the initial altitude down to the ground.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryTrajectory {
    body: EntryBody,
    samples: Vec<EntryState>,
    iterations: usize,
    solver_steps: usize,
    rhs_evaluations: usize,
}

impl EntryTrajectory {
    pub fn body(&self) -> &EntryBody {
        &self.body
    }

    /// Initial state followed by one sample per altitude step.
    pub fn samples(&self) -> &[EntryState] {
        &self.samples
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn solver_steps(&self) -> usize {
        self.solver_steps
    }

    pub fn rhs_evaluations(&self) -> usize {
        self.rhs_evaluations
    }

    pub fn final_state(&self) -> Option<&EntryState> {
        self.samples.last()
    }

    pub fn peak_rate_m_s(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.velocity_m_s.abs())
            .fold(0.0, f64::max)
    }
}

/// Descend from the configured altitude to the ground as one continuous run.
///
/// The oscillator state and clock carry over from each altitude step to the
/// next, and every step advances time by `step_duration_s`. Compare
/// [`reference_sweep`], which restarts the oscillator at every altitude.
pub fn simulate_entry(
    profile: &AsteroidProfile,
    config: &EntryConfig,
    atmosphere: &StandardAtmosphere,
) -> Result<EntryTrajectory, EntryError> {
    config.validate()?;
    let body = EntryBody::from_profile(profile)?;
    let solver = config.solver();
    let iterations = config.iterations();

    debug!(
        mass_kg = body.mass_kg,
        cross_section_m2 = body.cross_section_m2,
        iterations,
        "entry simulation started"
    );

    let mut samples = Vec::new();
    let mut state = [config.initial_displacement_m, config.initial_rate_m_s];
    let mut time_s = 0.0;
    let mut step_hint = None;
    let mut solver_steps = 0;
    let mut rhs_evaluations = 0;

    samples.push(EntryState {
        altitude_m: config.altitude_at(0),
        velocity_m_s: state[1],
        displacement_m: state[0],
        time_s,
    });

    for k in 0..iterations {
        let altitude_m = config.altitude_at(k);
        let coefficients = DescentCoefficients::at(&body, altitude_m, atmosphere)?;
        let system = DescentOscillator { coefficients };

        let outcome = solver
            .integrate(&system, time_s, &state, time_s + config.step_duration_s, step_hint)
            .map_err(|source| instability(altitude_m, time_s, source))?;

        if !outcome.y.iter().all(|v| v.is_finite()) {
            warn!(altitude_m, time_s = outcome.t, "entry state became non-finite");
            return Err(EntryError::NumericalInstability {
                altitude_m,
                time_s: outcome.t,
            });
        }

        state = outcome.y;
        time_s = outcome.t;
        step_hint = Some(outcome.stats.next_step);
        solver_steps += outcome.stats.accepted + outcome.stats.rejected;
        rhs_evaluations += outcome.stats.evaluations;

        samples.push(EntryState {
            altitude_m: config.altitude_at(k + 1),
            velocity_m_s: state[1],
            displacement_m: state[0],
            time_s,
        });
    }

    debug!(iterations, solver_steps, time_s, "entry simulation finished");

    Ok(EntryTrajectory {
        body,
        samples,
        iterations,
        solver_steps,
        rhs_evaluations,
    })
}

/// Raw output of one restarted integration in a [`reference_sweep`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepStep {
    pub altitude_m: f64,
    pub coefficients: DescentCoefficients,
    pub times_s: Vec<f64>,
    pub displacements_m: Vec<f64>,
    pub rates_m_s: Vec<f64>,
}

/// Restart the oscillator from the initial state over `[0, window_s]` at every
/// altitude step and keep each raw trajectory.
///
/// Nothing carries over between steps, so consecutive results are unrelated
/// apart from the coefficients. Each call integrates `window_s` seconds per
/// metre of altitude; keep the initial altitude small.
pub fn reference_sweep(
    profile: &AsteroidProfile,
    config: &EntryConfig,
    atmosphere: &StandardAtmosphere,
) -> Result<Vec<SweepStep>, EntryError> {
    config.validate()?;
    let body = EntryBody::from_profile(profile)?;
    let solver = config.solver();
    let initial = [config.initial_displacement_m, config.initial_rate_m_s];
    let iterations = config.iterations();

    debug!(iterations, window_s = config.window_s, "reference sweep started");

    let mut steps = Vec::new();
    for k in 0..iterations {
        let altitude_m = config.altitude_at(k);
        let coefficients = DescentCoefficients::at(&body, altitude_m, atmosphere)?;
        let system = DescentOscillator { coefficients };

        let solution = solver
            .integrate_recorded(&system, 0.0, &initial, config.window_s, None)
            .map_err(|source| instability(altitude_m, 0.0, source))?;

        steps.push(SweepStep {
            altitude_m,
            coefficients,
            displacements_m: solution.y.iter().map(|y| y[0]).collect(),
            rates_m_s: solution.y.iter().map(|y| y[1]).collect(),
            times_s: solution.t,
        });
    }

    Ok(steps)
}

fn instability(altitude_m: f64, time_s: f64, source: OdeError) -> EntryError {
    warn!(altitude_m, time_s, error = %source, "entry integration failed");
    match source {
        OdeError::NonFinite { t } => EntryError::NumericalInstability {
            altitude_m,
            time_s: t,
        },
        other => EntryError::Solver {
            altitude_m,
            source: other,
        },
    }
}
