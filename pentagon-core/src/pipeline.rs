//! End-to-end solve: scene, bisection, closure check, formatting

use std::fmt;

use num_bigint::BigInt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SolverConfig;
use crate::error::{EvalError, PentagonError, Result};
use crate::numeric::{bisect, format_significant, Backend, BigFloatBackend, Bisection};
use crate::scene::Scene;
use crate::symbolic::Rational;

/// Extra backend precision on top of the bisection tolerance, so rounding in
/// the residual cannot move the located root by more than the tolerance
pub const GUARD_BITS: usize = 32;

/// Solved pentagon parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// `m*` rounded to `display_digits` significant digits
    pub m: String,
    /// Bisection halvings performed
    pub iterations: usize,
    /// `r(m*)`, for diagnostics
    pub residual: f64,
    pub display_digits: usize,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Result: {}", self.m)
    }
}

/// Build the scene and solve `r(m) = 0` at the configured precision
pub fn solve(config: &SolverConfig) -> Result<Solution> {
    config.validate()?;
    let scene = Scene::build()?;
    solve_scene(&scene, config)
}

/// Solve an already built scene
pub fn solve_scene(scene: &Scene, config: &SolverConfig) -> Result<Solution> {
    config.validate()?;
    let mut backend = BigFloatBackend::new(config.precision_bits + GUARD_BITS)?;
    let settings = Bisection::new(config.precision_bits, config.max_iterations);
    let (lo, hi) = config.bracket;
    let lo = backend.from_f64(lo);
    let hi = backend.from_f64(hi);

    debug!(
        precision_bits = config.precision_bits,
        guard_bits = GUARD_BITS,
        max_iterations = config.max_iterations,
        "solving residual"
    );
    let root = bisect(
        &mut backend,
        |b, m| scene.residual_at(b, m),
        lo,
        hi,
        &settings,
    )?;

    check_closure(scene, &mut backend, &root.value, config.precision_bits)?;

    let decimal = backend.to_decimal(&root.value);
    let m = format_significant(&decimal, config.display_digits).ok_or_else(|| {
        PentagonError::Evaluation(EvalError::Backend {
            reason: format!("unparsable decimal '{}'", decimal),
        })
    })?;
    let residual = backend.to_f64(&root.residual);
    info!(m = %m, iterations = root.iterations, residual, "pentagon closes");

    Ok(Solution {
        m,
        iterations: root.iterations,
        residual,
        display_digits: config.display_digits,
    })
}

/// Every closure coordinate must vanish at `m*` to within `2^-(bits/2)`
fn check_closure<B: Backend>(
    scene: &Scene,
    backend: &mut B,
    value: &B::Value,
    precision_bits: usize,
) -> Result<()> {
    let denom = num_traits::pow::pow(BigInt::from(2), precision_bits / 2);
    let tolerance = backend.rational(&Rational::new(BigInt::from(1), denom));
    let defect = scene.closure_defect_at(backend, value)?;

    for (coordinate, v) in defect.iter().enumerate() {
        let magnitude = backend.abs(v);
        if !backend.le(&magnitude, &tolerance) {
            let value = backend.to_f64(v);
            warn!(coordinate, value, "closure defect above tolerance");
            return Err(PentagonError::IncompleteClosure { coordinate, value });
        }
    }
    Ok(())
}
