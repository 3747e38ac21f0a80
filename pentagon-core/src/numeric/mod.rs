//! Numeric backends and root finding
//!
//! Symbolic expressions are evaluated through the [`Backend`] trait, so the
//! same residual can be checked quickly in `f64` and solved at high
//! precision with [`BigFloatBackend`]. Each backend owns its own precision and
//! constant caches; nothing here is global.

use std::cmp::Ordering;
use std::fmt::Debug;

use num_traits::{Signed, ToPrimitive};

use crate::error::EvalError;
use crate::symbolic::Rational;

pub mod bisection;
pub mod format;
pub mod precise;

pub use bisection::{bisect, Bisection, Root};
pub use format::format_significant;
pub use precise::BigFloatBackend;

/// Arithmetic used to evaluate symbolic expressions
pub trait Backend {
    type Value: Clone + Debug;

    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Working precision in bits
    fn precision_bits(&self) -> usize;

    fn rational(&mut self, value: &Rational) -> Self::Value;
    fn from_f64(&mut self, value: f64) -> Self::Value;
    fn pi(&mut self) -> Self::Value;

    fn add(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn mul(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn neg(&mut self, a: &Self::Value) -> Self::Value;
    fn abs(&mut self, a: &Self::Value) -> Self::Value;

    /// `1 / a`, failing on an exact zero
    fn recip(&mut self, a: &Self::Value) -> Result<Self::Value, EvalError>;

    /// Principal square root, failing on negative input
    fn sqrt(&mut self, a: &Self::Value) -> Result<Self::Value, EvalError>;

    fn sin(&mut self, a: &Self::Value) -> Self::Value;
    fn cos(&mut self, a: &Self::Value) -> Self::Value;

    /// Sign of `a` relative to zero; `None` for NaN
    fn sign(&self, a: &Self::Value) -> Option<Ordering>;

    /// Lossy conversion for diagnostics
    fn to_f64(&self, a: &Self::Value) -> f64;

    /// Decimal rendering carrying every digit the backend holds
    fn to_decimal(&self, a: &Self::Value) -> String;

    /// `a <= b`
    fn le(&mut self, a: &Self::Value, b: &Self::Value) -> bool {
        let diff = self.sub(b, a);
        matches!(self.sign(&diff), Some(Ordering::Greater | Ordering::Equal))
    }

    /// `a ^ n` by repeated squaring
    fn powi(&mut self, a: &Self::Value, n: u64) -> Self::Value {
        let mut result = self.rational(&Rational::from_integer(1.into()));
        let mut base = a.clone();
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = self.mul(&result, &base);
            }
            n >>= 1;
            if n > 0 {
                base = self.mul(&base, &base);
            }
        }
        result
    }
}

/// Native double precision
#[derive(Debug, Clone, Copy, Default)]
pub struct F64Backend;

impl F64Backend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for F64Backend {
    type Value = f64;

    fn name(&self) -> &'static str {
        "f64"
    }

    fn precision_bits(&self) -> usize {
        f64::MANTISSA_DIGITS as usize
    }

    fn rational(&mut self, value: &Rational) -> f64 {
        value.to_f64().unwrap_or_else(|| {
            if value.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        })
    }

    fn from_f64(&mut self, value: f64) -> f64 {
        value
    }

    fn pi(&mut self) -> f64 {
        std::f64::consts::PI
    }

    fn add(&mut self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn sub(&mut self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn mul(&mut self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn neg(&mut self, a: &f64) -> f64 {
        -a
    }

    fn abs(&mut self, a: &f64) -> f64 {
        a.abs()
    }

    fn recip(&mut self, a: &f64) -> Result<f64, EvalError> {
        if *a == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(1.0 / a)
    }

    fn sqrt(&mut self, a: &f64) -> Result<f64, EvalError> {
        if *a < 0.0 {
            return Err(EvalError::NegativeRadicand { value: *a });
        }
        Ok(a.sqrt())
    }

    fn sin(&mut self, a: &f64) -> f64 {
        a.sin()
    }

    fn cos(&mut self, a: &f64) -> f64 {
        a.cos()
    }

    fn sign(&self, a: &f64) -> Option<Ordering> {
        a.partial_cmp(&0.0)
    }

    fn to_f64(&self, a: &f64) -> f64 {
        *a
    }

    fn to_decimal(&self, a: &f64) -> String {
        format!("{:e}", a)
    }
}
