//! Solver configuration

use serde::{Deserialize, Serialize};

use crate::error::{PentagonError, Result};

/// Default working precision in bits
pub const DEFAULT_PRECISION_BITS: usize = 95;

/// Default bisection bracket for `m`
pub const DEFAULT_BRACKET: (f64, f64) = (0.02, 0.9);

/// Environment variable overriding [`SolverConfig::precision_bits`]
pub const ENV_PRECISION_BITS: &str = "PENTAGON_PRECISION_BITS";
/// Environment variable overriding [`SolverConfig::display_digits`]
pub const ENV_DISPLAY_DIGITS: &str = "PENTAGON_DISPLAY_DIGITS";
/// Environment variable overriding [`SolverConfig::max_iterations`]
pub const ENV_MAX_ITERATIONS: &str = "PENTAGON_MAX_ITERATIONS";

/// Decimal digits worth printing at a given binary precision:
/// `round(bits · log10 2) − 1`
pub fn display_digits_for(precision_bits: usize) -> usize {
    let digits = (precision_bits as f64 * std::f64::consts::LOG10_2).round() as usize;
    digits.saturating_sub(1).max(1)
}

/// Configuration for one solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Working precision of the numeric backend, also the bisection tolerance
    /// exponent
    pub precision_bits: usize,

    /// Significant digits in the printed result
    pub display_digits: usize,

    /// Initial bracket `(lo, hi)` for `m`
    pub bracket: (f64, f64),

    /// Bisection iteration budget
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::with_precision(DEFAULT_PRECISION_BITS)
    }
}

impl SolverConfig {
    /// Config at `precision_bits`, with display digits and iteration budget
    /// derived from it
    pub fn with_precision(precision_bits: usize) -> Self {
        Self {
            precision_bits,
            display_digits: display_digits_for(precision_bits),
            bracket: DEFAULT_BRACKET,
            max_iterations: 4 * precision_bits,
        }
    }

    /// Set the bracket
    pub fn with_bracket(mut self, lo: f64, hi: f64) -> Self {
        self.bracket = (lo, hi);
        self
    }

    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the printed digit count
    pub fn with_display_digits(mut self, digits: usize) -> Self {
        self.display_digits = digits;
        self
    }

    /// Defaults overridden by `PENTAGON_*` environment variables.
    ///
    /// Unset or unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        let mut config = read(ENV_PRECISION_BITS)
            .map(Self::with_precision)
            .unwrap_or_default();
        if let Some(digits) = read(ENV_DISPLAY_DIGITS) {
            config.display_digits = digits;
        }
        if let Some(iterations) = read(ENV_MAX_ITERATIONS) {
            config.max_iterations = iterations;
        }
        config
    }

    /// Reject configurations the solver cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(PentagonError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        let (lo, hi) = self.bracket;

        if self.precision_bits == 0 {
            return invalid("precision_bits must be positive");
        }
        if self.display_digits == 0 {
            return invalid("display_digits must be positive");
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive");
        }
        if !lo.is_finite() || !hi.is_finite() {
            return invalid("bracket endpoints must be finite");
        }
        if lo >= hi {
            return invalid("bracket must satisfy lo < hi");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.precision_bits, 95);
        assert_eq!(config.display_digits, 28);
        assert_eq!(config.bracket, (0.02, 0.9));
        assert_eq!(config.max_iterations, 380);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_display_digits_follow_precision() {
        assert_eq!(display_digits_for(53), 15);
        assert_eq!(display_digits_for(128), 38);
        assert_eq!(display_digits_for(1), 1);
        assert_eq!(SolverConfig::with_precision(200).display_digits, 59);
    }

    #[test]
    fn test_validate_rejects_bad_bracket() {
        let err = SolverConfig::default().with_bracket(0.9, 0.02).validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");

        let err = SolverConfig::default()
            .with_bracket(0.02, f64::INFINITY)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("finite"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        assert!(SolverConfig::with_precision(0).validate().is_err());
        assert!(SolverConfig::default().with_max_iterations(0).validate().is_err());
        assert!(SolverConfig::default().with_display_digits(0).validate().is_err());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = SolverConfig::from_lookup(|key| match key {
            ENV_PRECISION_BITS => Some("128".to_string()),
            ENV_MAX_ITERATIONS => Some(" 1000 ".to_string()),
            _ => None,
        });
        assert_eq!(config.precision_bits, 128);
        assert_eq!(config.display_digits, 38);
        assert_eq!(config.max_iterations, 1000);
    }

    #[test]
    fn test_lookup_ignores_garbage() {
        let config = SolverConfig::from_lookup(|key| match key {
            ENV_DISPLAY_DIGITS => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = SolverConfig::with_precision(64);
        let json = serde_json::to_string(&config).unwrap();
        let back: SolverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
