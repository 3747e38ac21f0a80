//! Bracketed root finding by bisection

use std::cmp::Ordering;

use num_bigint::BigInt;
use tracing::{debug, trace};

use super::Backend;
use crate::error::{EvalError, PentagonError, Result};
use crate::symbolic::Rational;

/// Bisection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bisection {
    /// Stop once the bracket is at most `2^-tolerance_bits` wide
    pub tolerance_bits: usize,
    /// Hard cap on halvings
    pub max_iterations: usize,
}

impl Bisection {
    pub fn new(tolerance_bits: usize, max_iterations: usize) -> Self {
        Self {
            tolerance_bits,
            max_iterations,
        }
    }

    /// Absolute tolerance `2^-tolerance_bits` as an exact rational
    pub fn tolerance(&self) -> Rational {
        let denom = num_traits::pow::pow(BigInt::from(2), self.tolerance_bits);
        Rational::new(BigInt::from(1), denom)
    }
}

/// A located root
#[derive(Debug, Clone)]
pub struct Root<V> {
    pub value: V,
    /// Halvings performed
    pub iterations: usize,
    /// Residual at `value`
    pub residual: V,
}

/// Find a root of `f` on `[lo, hi]` by bisection.
///
/// `f(lo)` and `f(hi)` must have opposite signs, or one of them must be an
/// exact zero; otherwise this fails with [`PentagonError::NoSignChange`].
/// Returns as soon as a midpoint is an exact root, or when the bracket width
/// drops to the tolerance, in which case the bracket midpoint is returned.
pub fn bisect<B, F>(
    backend: &mut B,
    mut f: F,
    lo: B::Value,
    hi: B::Value,
    settings: &Bisection,
) -> Result<Root<B::Value>>
where
    B: Backend,
    F: FnMut(&mut B, &B::Value) -> Result<B::Value>,
{
    let f_lo = f(backend, &lo)?;
    let f_hi = f(backend, &hi)?;
    let s_lo = backend.sign(&f_lo).ok_or(EvalError::NotANumber)?;
    let s_hi = backend.sign(&f_hi).ok_or(EvalError::NotANumber)?;

    if s_lo == Ordering::Equal {
        return Ok(Root { value: lo, iterations: 0, residual: f_lo });
    }
    if s_hi == Ordering::Equal {
        return Ok(Root { value: hi, iterations: 0, residual: f_hi });
    }
    if s_lo == s_hi {
        return Err(PentagonError::NoSignChange {
            lo: backend.to_f64(&lo),
            hi: backend.to_f64(&hi),
            f_lo: backend.to_f64(&f_lo),
            f_hi: backend.to_f64(&f_hi),
        });
    }

    let half = backend.rational(&Rational::new(BigInt::from(1), BigInt::from(2)));
    let tolerance = backend.rational(&settings.tolerance());
    let (mut lo, mut hi) = (lo, hi);
    debug!(
        backend = backend.name(),
        lo = backend.to_f64(&lo),
        hi = backend.to_f64(&hi),
        tolerance_bits = settings.tolerance_bits,
        "starting bisection"
    );

    for iteration in 1..=settings.max_iterations {
        let sum = backend.add(&lo, &hi);
        let mid = backend.mul(&sum, &half);
        let f_mid = f(backend, &mid)?;
        let s_mid = backend.sign(&f_mid).ok_or(EvalError::NotANumber)?;
        trace!(iteration, mid = backend.to_f64(&mid), f_mid = backend.to_f64(&f_mid));

        if s_mid == Ordering::Equal {
            return Ok(Root { value: mid, iterations: iteration, residual: f_mid });
        }
        if s_mid == s_lo {
            lo = mid;
        } else {
            hi = mid;
        }

        let width = backend.sub(&hi, &lo);
        if backend.le(&width, &tolerance) {
            let sum = backend.add(&lo, &hi);
            let value = backend.mul(&sum, &half);
            let residual = f(backend, &value)?;
            debug!(iterations = iteration, "bisection converged");
            return Ok(Root { value, iterations: iteration, residual });
        }
    }

    let width = backend.sub(&hi, &lo);
    Err(PentagonError::NonConvergence {
        iterations: settings.max_iterations,
        width: backend.to_f64(&width),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{BigFloatBackend, F64Backend};
    use approx::assert_abs_diff_eq;

    fn square_minus_two<B: Backend>(b: &mut B, x: &B::Value) -> Result<B::Value> {
        let two = b.rational(&Rational::from_integer(BigInt::from(2)));
        let sq = b.mul(x, x);
        Ok(b.sub(&sq, &two))
    }

    #[test]
    fn test_finds_sqrt_two_f64() {
        let mut b = F64Backend::new();
        let root = bisect(&mut b, square_minus_two, 1.0, 2.0, &Bisection::new(40, 200)).unwrap();
        assert_abs_diff_eq!(root.value, 2f64.sqrt(), epsilon = 1e-11);
        assert!(root.iterations <= 41);
    }

    #[test]
    fn test_finds_sqrt_two_high_precision() {
        let mut b = BigFloatBackend::new(128).unwrap();
        let lo = b.from_f64(1.0);
        let hi = b.from_f64(2.0);
        let root = bisect(&mut b, square_minus_two, lo, hi, &Bisection::new(100, 400)).unwrap();
        let digits = crate::numeric::format_significant(&b.to_decimal(&root.value), 28).unwrap();
        assert_eq!(digits, "1.414213562373095048801688724");
    }

    #[test]
    fn test_no_sign_change() {
        let mut b = F64Backend::new();
        let err = bisect(&mut b, square_minus_two, 2.0, 3.0, &Bisection::new(40, 200)).unwrap_err();
        assert!(matches!(err, PentagonError::NoSignChange { .. }));
    }

    #[test]
    fn test_exact_endpoint_root() {
        let mut b = F64Backend::new();
        let f = |_: &mut F64Backend, x: &f64| Ok(x - 0.5);
        let root = bisect(&mut b, f, 0.5, 1.0, &Bisection::new(40, 200)).unwrap();
        assert_eq!(root.value, 0.5);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_iteration_budget() {
        let mut b = F64Backend::new();
        let err = bisect(&mut b, square_minus_two, 1.0, 2.0, &Bisection::new(40, 5)).unwrap_err();
        assert!(matches!(err, PentagonError::NonConvergence { iterations: 5, .. }));
    }

    #[test]
    fn test_errors_from_residual_propagate() {
        let mut b = F64Backend::new();
        let f = |b: &mut F64Backend, x: &f64| Ok(b.recip(&(x - 1.5))?);
        let err = bisect(&mut b, f, 1.0, 2.0, &Bisection::new(40, 200)).unwrap_err();
        assert!(matches!(err, PentagonError::Evaluation(EvalError::DivisionByZero)));
    }
}
