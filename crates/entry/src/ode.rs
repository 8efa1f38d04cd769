//! Embedded Dormand–Prince 5(4) integrator with adaptive step control.
//!
//! The fifth-order solution is propagated (local extrapolation) and the
//! embedded fourth-order solution only drives the error estimate. The last
//! stage of an accepted step is reused as the first stage of the next.

use thiserror::Error;

/// Right-hand side of `dy/dt = f(t, y)` for an `N`-dimensional state.
pub trait OdeSystem<const N: usize> {
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Mixed error tolerance: `atol + rtol * |y|` per component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerances {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rtol: 1.0e-3,
            atol: 1.0e-6,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OdeError {
    #[error("tolerances must be positive and finite (rtol = {rtol}, atol = {atol})")]
    InvalidTolerance { rtol: f64, atol: f64 },
    #[error("integration span [{t0}, {tf}] is not finite and forward")]
    InvalidSpan { t0: f64, tf: f64 },
    #[error("state became non-finite at t = {t}")]
    NonFinite { t: f64 },
    #[error("step size underflow at t = {t} (h = {h})")]
    StepSizeUnderflow { t: f64, h: f64 },
    #[error("step budget of {max_steps} exhausted at t = {t}")]
    StepBudgetExhausted { t: f64, max_steps: usize },
}

/// Counters describing one call to the integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
    /// Step size proposed for a continuation of the run.
    pub next_step: f64,
}

/// End state of an integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome<const N: usize> {
    pub t: f64,
    pub y: [f64; N],
    pub stats: Stats,
}

/// Every accepted point of an integration, starting with the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    pub t: Vec<f64>,
    pub y: Vec<[f64; N]>,
    pub stats: Stats,
}

// Butcher tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19_372.0 / 6_561.0;
const A52: f64 = -25_360.0 / 2_187.0;
const A53: f64 = 64_448.0 / 6_561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9_017.0 / 3_168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46_732.0 / 5_247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5_103.0 / 18_656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1_113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2_187.0 / 6_784.0;
const A76: f64 = 11.0 / 84.0;

// Fifth-order weights minus fourth-order weights.
const E1: f64 = 71.0 / 57_600.0;
const E3: f64 = -71.0 / 16_695.0;
const E4: f64 = 71.0 / 1_920.0;
const E5: f64 = -17_253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Adaptive Dormand–Prince stepper.
#[derive(Debug, Clone)]
pub struct DormandPrince {
    tolerances: Tolerances,
    max_steps: usize,
    safety: f64,
    min_factor: f64,
    max_factor: f64,
}

impl DormandPrince {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            max_steps: 100_000,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 10.0,
        }
    }

    /// Upper bound on accepted plus rejected steps per call.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Integrate from `t0` to `tf` and return only the final state.
    ///
    /// `first_step` seeds the step size, typically with `Stats::next_step` of a
    /// preceding call; `None` selects one automatically.
    pub fn integrate<const N: usize, S: OdeSystem<N>>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        first_step: Option<f64>,
    ) -> Result<Outcome<N>, OdeError> {
        let (t, y, stats) = self.run(system, t0, y0, tf, first_step, |_, _| {})?;
        Ok(Outcome { t, y, stats })
    }

    /// Integrate from `t0` to `tf`, recording every accepted step.
    pub fn integrate_recorded<const N: usize, S: OdeSystem<N>>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        first_step: Option<f64>,
    ) -> Result<Solution<N>, OdeError> {
        let mut ts = vec![t0];
        let mut ys = vec![*y0];
        let (_, _, stats) = self.run(system, t0, y0, tf, first_step, |t, y| {
            ts.push(t);
            ys.push(*y);
        })?;
        Ok(Solution {
            t: ts,
            y: ys,
            stats,
        })
    }

    fn run<const N: usize, S, F>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        first_step: Option<f64>,
        mut on_step: F,
    ) -> Result<(f64, [f64; N], Stats), OdeError>
    where
        S: OdeSystem<N>,
        F: FnMut(f64, &[f64; N]),
    {
        let Tolerances { rtol, atol } = self.tolerances;
        if !(rtol.is_finite() && rtol > 0.0 && atol.is_finite() && atol > 0.0) {
            return Err(OdeError::InvalidTolerance { rtol, atol });
        }
        if !(t0.is_finite() && tf.is_finite() && tf >= t0) {
            return Err(OdeError::InvalidSpan { t0, tf });
        }
        if !all_finite(y0) {
            return Err(OdeError::NonFinite { t: t0 });
        }

        let mut stats = Stats::default();
        let mut t = t0;
        let mut y = *y0;
        if tf == t0 {
            stats.next_step = first_step.unwrap_or(0.0);
            return Ok((t, y, stats));
        }

        let mut k1 = [0.0; N];
        system.rhs(t, &y, &mut k1);
        stats.evaluations += 1;
        if !all_finite(&k1) {
            return Err(OdeError::NonFinite { t });
        }

        let span = tf - t0;
        let mut h = match first_step {
            Some(h) if h.is_finite() && h > 0.0 => h,
            _ => self.initial_step(system, t, &y, &k1, &mut stats),
        }
        .min(span);

        let (mut k2, mut k3, mut k4, mut k5, mut k6, mut k7) =
            ([0.0; N], [0.0; N], [0.0; N], [0.0; N], [0.0; N], [0.0; N]);
        let mut stage = [0.0; N];
        let mut y_new = [0.0; N];

        while t < tf {
            if stats.accepted + stats.rejected >= self.max_steps {
                return Err(OdeError::StepBudgetExhausted {
                    t,
                    max_steps: self.max_steps,
                });
            }

            let min_step = 10.0 * f64::EPSILON * t.abs().max(span);
            let remaining = tf - t;
            // Never leave a sliver shorter than the minimum step.
            let last = h >= remaining - min_step;
            if last {
                h = remaining;
            }
            if h < min_step {
                return Err(OdeError::StepSizeUnderflow { t, h });
            }

            for i in 0..N {
                stage[i] = y[i] + h * A21 * k1[i];
            }
            system.rhs(t + C2 * h, &stage, &mut k2);
            for i in 0..N {
                stage[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
            }
            system.rhs(t + C3 * h, &stage, &mut k3);
            for i in 0..N {
                stage[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
            }
            system.rhs(t + C4 * h, &stage, &mut k4);
            for i in 0..N {
                stage[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
            }
            system.rhs(t + C5 * h, &stage, &mut k5);
            for i in 0..N {
                stage[i] = y[i]
                    + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
            }
            system.rhs(t + h, &stage, &mut k6);
            for i in 0..N {
                y_new[i] = y[i]
                    + h * (A71 * k1[i] + A73 * k3[i] + A74 * k4[i] + A75 * k5[i] + A76 * k6[i]);
            }
            system.rhs(t + h, &y_new, &mut k7);
            stats.evaluations += 6;

            if !all_finite(&y_new) || !all_finite(&k7) {
                return Err(OdeError::NonFinite { t: t + h });
            }

            let mut sum = 0.0;
            for i in 0..N {
                let err = h
                    * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i]
                        + E7 * k7[i]);
                let scale = atol + rtol * y[i].abs().max(y_new[i].abs());
                sum += (err / scale).powi(2);
            }
            let err_norm = (sum / N as f64).sqrt();

            if err_norm <= 1.0 {
                t = if last { tf } else { t + h };
                y = y_new;
                k1 = k7;
                stats.accepted += 1;
                on_step(t, &y);

                let factor = if err_norm == 0.0 {
                    self.max_factor
                } else {
                    (self.safety * err_norm.powf(ERROR_EXPONENT)).min(self.max_factor)
                };
                h *= factor;
            } else {
                stats.rejected += 1;
                h *= (self.safety * err_norm.powf(ERROR_EXPONENT)).max(self.min_factor);
            }
        }

        stats.next_step = h;
        Ok((t, y, stats))
    }

    /// Starting step estimate from the size of the state and its derivatives.
    fn initial_step<const N: usize, S: OdeSystem<N>>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        f0: &[f64; N],
        stats: &mut Stats,
    ) -> f64 {
        let Tolerances { rtol, atol } = self.tolerances;
        let scale: [f64; N] = std::array::from_fn(|i| atol + y0[i].abs() * rtol);

        let d0 = rms(std::array::from_fn::<f64, N, _>(|i| y0[i] / scale[i]));
        let d1 = rms(std::array::from_fn::<f64, N, _>(|i| f0[i] / scale[i]));
        let h0 = if d0 < 1.0e-5 || d1 < 1.0e-5 {
            1.0e-6
        } else {
            0.01 * d0 / d1
        };

        let y1: [f64; N] = std::array::from_fn(|i| y0[i] + h0 * f0[i]);
        let mut f1 = [0.0; N];
        system.rhs(t0 + h0, &y1, &mut f1);
        stats.evaluations += 1;

        let d2 = rms(std::array::from_fn::<f64, N, _>(|i| (f1[i] - f0[i]) / scale[i])) / h0;
        let h1 = if d1 <= 1.0e-15 && d2 <= 1.0e-15 {
            (h0 * 1.0e-3).max(1.0e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        let h = (100.0 * h0).min(h1);
        if h.is_finite() && h > 0.0 { h } else { 1.0e-6 }
    }
}

fn rms<const N: usize>(v: [f64; N]) -> f64 {
    (v.iter().map(|x| x * x).sum::<f64>() / N as f64).sqrt()
}

fn all_finite<const N: usize>(v: &[f64; N]) -> bool {
    v.iter().all(|x| x.is_finite())
}
