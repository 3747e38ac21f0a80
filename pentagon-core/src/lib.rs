//! # Pentagon-Core
//!
//! Closure solver for a regular hyperbolic pentagon.
//!
//! Vertices live on the hyperboloid model of the hyperbolic plane, written as
//! homogeneous 4-vectors under the Minkowski form `diag(1, 1, 1, -1)`. The
//! library places three vertices at an unknown distance `m`, composes the
//! rotation by `2π/5` about one of them symbolically, and solves for the `m`
//! that makes the rotation carry one neighbour onto the other.
//!
//! ## Features
//!
//! - **Exact symbolic isometries**: reflections, translations and rotations
//!   as 4×4 matrices over rational-coefficient expressions
//! - **Canonical simplification**: like-term collection, radical folding and
//!   exact trigonometric values at rational multiples of π
//! - **Pluggable arithmetic**: one residual, evaluated in `f64` or at
//!   arbitrary precision
//!
//! ## Example
//!
//! ```rust,no_run
//! use pentagon_core::{solve, SolverConfig};
//!
//! let solution = solve(&SolverConfig::default()).unwrap();
//! assert_eq!(solution.to_string(), "Result: 0.6871214994450249282771314878");
//! ```

pub mod config;
pub mod error;
pub mod isometry;
pub mod minkowski;
pub mod numeric;
pub mod pipeline;
pub mod scene;
pub mod symbolic;

// Re-exports for convenience
pub use config::{SolverConfig, DEFAULT_BRACKET, DEFAULT_PRECISION_BITS};
pub use error::{EvalError, PentagonError, Result};
pub use isometry::{midpoint, midpoint_to_origin, reflect, rotate, translate};
pub use minkowski::{normalize, outer_product, simplify_matrix, simplify_vector, Matrix4, Minkowski, Vector4};
pub use numeric::{Backend, BigFloatBackend, F64Backend};
pub use pipeline::{solve, solve_scene, Solution};
pub use scene::Scene;
pub use symbolic::{simplify, Expr, Symbol};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_surface() {
        let space = Minkowski::default();
        let o = space.origin();
        assert_eq!(normalize(o).unwrap().simplify(), *o);
        assert!(reflect(&space, o).is_ok());
        assert_eq!(SolverConfig::default().precision_bits, DEFAULT_PRECISION_BITS);
        assert!(!VERSION.is_empty());
    }
}
