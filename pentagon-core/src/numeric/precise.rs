//! Arbitrary-precision backend on `astro-float`

use std::cmp::Ordering;

use astro_float::{BigFloat, Consts, RoundingMode};
use num_bigint::{BigInt, Sign};

use super::Backend;
use crate::error::{EvalError, PentagonError, Result};
use crate::symbolic::Rational;

/// Binary floating point with an explicit working precision.
///
/// `astro-float` rounds the mantissa up to whole machine words, so the
/// effective precision is at least `precision_bits`.
pub struct BigFloatBackend {
    precision: usize,
    rounding: RoundingMode,
    consts: Consts,
}

impl BigFloatBackend {
    /// Create a backend working at `precision` bits
    pub fn new(precision: usize) -> Result<Self> {
        if precision == 0 {
            return Err(PentagonError::InvalidConfig {
                reason: "precision must be at least one bit".to_string(),
            });
        }
        let consts = Consts::new().map_err(|e| EvalError::Backend {
            reason: format!("failed to initialise constants cache: {:?}", e),
        })?;
        Ok(Self {
            precision,
            rounding: RoundingMode::ToEven,
            consts,
        })
    }

    fn integer(&self, n: &BigInt) -> BigFloat {
        let p = self.precision;
        let rm = self.rounding;
        let (sign, digits) = n.to_u32_digits();
        let radix = BigFloat::from_u64(1u64 << 32, p);
        let mut acc = BigFloat::from_u32(0, p);
        for digit in digits.iter().rev() {
            acc = acc.mul(&radix, p, rm).add(&BigFloat::from_u32(*digit, p), p, rm);
        }
        if sign == Sign::Minus {
            BigFloat::from_u32(0, p).sub(&acc, p, rm)
        } else {
            acc
        }
    }
}

impl std::fmt::Debug for BigFloatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigFloatBackend")
            .field("precision", &self.precision)
            .field("rounding", &self.rounding)
            .finish()
    }
}

impl Backend for BigFloatBackend {
    type Value = BigFloat;

    fn name(&self) -> &'static str {
        "astro-float"
    }

    fn precision_bits(&self) -> usize {
        self.precision
    }

    fn rational(&mut self, value: &Rational) -> BigFloat {
        let numer = self.integer(value.numer());
        if value.is_integer() {
            return numer;
        }
        let denom = self.integer(value.denom());
        numer.div(&denom, self.precision, self.rounding)
    }

    fn from_f64(&mut self, value: f64) -> BigFloat {
        BigFloat::from_f64(value, self.precision)
    }

    fn pi(&mut self) -> BigFloat {
        self.consts.pi(self.precision, self.rounding)
    }

    fn add(&mut self, a: &BigFloat, b: &BigFloat) -> BigFloat {
        a.add(b, self.precision, self.rounding)
    }

    fn sub(&mut self, a: &BigFloat, b: &BigFloat) -> BigFloat {
        a.sub(b, self.precision, self.rounding)
    }

    fn mul(&mut self, a: &BigFloat, b: &BigFloat) -> BigFloat {
        a.mul(b, self.precision, self.rounding)
    }

    fn neg(&mut self, a: &BigFloat) -> BigFloat {
        BigFloat::from_u32(0, self.precision).sub(a, self.precision, self.rounding)
    }

    fn abs(&mut self, a: &BigFloat) -> BigFloat {
        a.abs()
    }

    fn recip(&mut self, a: &BigFloat) -> std::result::Result<BigFloat, EvalError> {
        if a.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        let one = BigFloat::from_u32(1, self.precision);
        Ok(one.div(a, self.precision, self.rounding))
    }

    fn sqrt(&mut self, a: &BigFloat) -> std::result::Result<BigFloat, EvalError> {
        if a.is_nan() {
            return Err(EvalError::NotANumber);
        }
        if a.is_zero() {
            return Ok(BigFloat::from_u32(0, self.precision));
        }
        if a.is_negative() {
            return Err(EvalError::NegativeRadicand {
                value: self.to_f64(a),
            });
        }
        Ok(a.sqrt(self.precision, self.rounding))
    }

    fn sin(&mut self, a: &BigFloat) -> BigFloat {
        a.sin(self.precision, self.rounding, &mut self.consts)
    }

    fn cos(&mut self, a: &BigFloat) -> BigFloat {
        a.cos(self.precision, self.rounding, &mut self.consts)
    }

    fn sign(&self, a: &BigFloat) -> Option<Ordering> {
        if a.is_nan() {
            None
        } else if a.is_zero() {
            Some(Ordering::Equal)
        } else if a.is_negative() {
            Some(Ordering::Less)
        } else {
            Some(Ordering::Greater)
        }
    }

    fn to_f64(&self, a: &BigFloat) -> f64 {
        self.to_decimal(a).parse().unwrap_or(f64::NAN)
    }

    fn to_decimal(&self, a: &BigFloat) -> String {
        a.to_string()
    }
}
