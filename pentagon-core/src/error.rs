//! Error types for the pentagon solver
//!
//! Two layers:
//! - [`EvalError`] covers numeric evaluation of a symbolic expression
//!   (unbound symbols, division by zero, negative radicands).
//! - [`PentagonError`] covers the geometry and the solve itself, and wraps
//!   evaluation failures.
//!
//! Every variant maps to a stable error code via [`PentagonError::code`].

use thiserror::Error;

/// Result type alias for pentagon operations
pub type Result<T> = std::result::Result<T, PentagonError>;

/// Errors raised while evaluating a symbolic expression numerically
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Expression references a symbol with no bound value
    #[error("Unbound symbol '{name}'. Bind a value before evaluating.")]
    UnboundSymbol { name: String },

    /// A reciprocal of an exact zero was requested
    #[error("Division by zero during evaluation")]
    DivisionByZero,

    /// Square root of a negative value
    #[error("Square root of negative value {value}")]
    NegativeRadicand { value: f64 },

    /// Only integer and half-integer powers can be evaluated
    #[error("Unsupported fractional power {exponent}: only integer and half-integer exponents evaluate")]
    NonIntegerPower { exponent: String },

    /// A value came out as NaN
    #[error("Evaluation produced a value that is not a number")]
    NotANumber,

    /// The numeric backend failed internally
    #[error("Numeric backend error: {reason}")]
    Backend { reason: String },
}

/// Errors that can occur while building the scene or solving for `m`
#[derive(Error, Debug)]
pub enum PentagonError {
    // ═══════════════════════════════════════════════════════════════════════
    // Geometry errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Input to an isometry builder lies on the light cone or at infinity
    #[error("Degenerate geometry in {operation}: {reason}")]
    DegenerateGeometry {
        operation: &'static str,
        reason: String,
    },

    /// The solved parameter does not close every coordinate of the constraint
    #[error("Closure check failed: coordinate {coordinate} has defect {value:e} at the solved parameter")]
    IncompleteClosure { coordinate: usize, value: f64 },

    // ═══════════════════════════════════════════════════════════════════════
    // Solver errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Residual has the same sign at both bracket endpoints
    #[error("No sign change on bracket [{lo}, {hi}]: f(lo) = {f_lo:e}, f(hi) = {f_hi:e}")]
    NoSignChange {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },

    /// Bisection ran out of iterations before reaching the tolerance
    #[error("Bisection did not converge after {iterations} iterations (bracket width {width:e})")]
    NonConvergence { iterations: usize, width: f64 },

    // ═══════════════════════════════════════════════════════════════════════
    // Evaluation and configuration errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Numeric evaluation failed
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvalError),

    /// Solver configuration is unusable
    #[error("Invalid solver configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl PentagonError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            PentagonError::DegenerateGeometry { .. } => "DEGENERATE_GEOMETRY",
            PentagonError::IncompleteClosure { .. } => "INCOMPLETE_CLOSURE",
            PentagonError::NoSignChange { .. } => "NO_SIGN_CHANGE",
            PentagonError::NonConvergence { .. } => "NON_CONVERGENCE",
            PentagonError::Evaluation(_) => "EVALUATION_FAILED",
            PentagonError::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }

    /// Returns true if retrying with the same inputs might succeed.
    ///
    /// The computation is deterministic, so nothing here is recoverable by
    /// retrying; a different configuration is needed.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Returns true if the error comes from the fixed configuration rather
    /// than from the geometry or the arithmetic
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PentagonError::InvalidConfig { .. } | PentagonError::NoSignChange { .. }
        )
    }

    pub(crate) fn degenerate(operation: &'static str, reason: impl Into<String>) -> Self {
        PentagonError::DegenerateGeometry {
            operation,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = PentagonError::degenerate("reflect", "point lies on the light cone");
        assert_eq!(err.code(), "DEGENERATE_GEOMETRY");
        assert!(err.to_string().contains("reflect"));

        let err: PentagonError = EvalError::DivisionByZero.into();
        assert_eq!(err.code(), "EVALUATION_FAILED");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_no_sign_change_is_config_error() {
        let err = PentagonError::NoSignChange {
            lo: 0.02,
            hi: 0.03,
            f_lo: -1.0,
            f_hi: -0.5,
        };
        assert!(err.is_config_error());
        assert!(err.to_string().contains("0.02"));
    }
}
