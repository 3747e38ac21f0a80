//! End-to-end tests for the pentagon closure solve.

use approx::assert_abs_diff_eq;
use pentagon_core::numeric::format_significant;
use pentagon_core::symbolic::Bindings;
use pentagon_core::{
    rotate, simplify_matrix, solve, Backend, BigFloatBackend, Expr, F64Backend, Matrix4, Scene,
    SolverConfig,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Golden {
    precision_bits: usize,
    display_digits: usize,
    output: String,
}

fn golden() -> Golden {
    let raw = include_str!("golden/result.json");
    serde_json::from_str(raw).expect("golden file parses")
}

// =============================================================================
// Residual
// =============================================================================

#[test]
fn test_residual_sign_change_f64() {
    let scene = Scene::build().unwrap();
    let mut backend = F64Backend::new();
    let lo = scene.residual_at(&mut backend, &0.02).unwrap();
    let hi = scene.residual_at(&mut backend, &0.9).unwrap();
    assert!(lo < 0.0, "r(0.02) = {lo}");
    assert!(hi > 0.0, "r(0.9) = {hi}");
}

#[test]
fn test_residual_sign_change_high_precision() {
    let scene = Scene::build().unwrap();
    let mut backend = BigFloatBackend::new(128).unwrap();
    let lo = backend.from_f64(0.02);
    let hi = backend.from_f64(0.9);
    let r_lo = scene.residual_at(&mut backend, &lo).unwrap();
    let r_hi = scene.residual_at(&mut backend, &hi).unwrap();
    assert_eq!(backend.sign(&r_lo), Some(std::cmp::Ordering::Less));
    assert_eq!(backend.sign(&r_hi), Some(std::cmp::Ordering::Greater));
}

#[test]
fn test_residual_matches_closure_defect() {
    let scene = Scene::build().unwrap();
    let mut backend = F64Backend::new();
    let r = scene.residual_at(&mut backend, &0.5).unwrap();
    let defect = scene.closure_defect_at(&mut backend, &0.5).unwrap();
    assert_abs_diff_eq!(r, defect[1], epsilon = 1e-14);
}

// =============================================================================
// Solve
// =============================================================================

#[test]
fn test_golden_output() {
    let golden = golden();
    let config = SolverConfig::default();
    assert_eq!(config.precision_bits, golden.precision_bits);
    assert_eq!(config.display_digits, golden.display_digits);

    let solution = solve(&config).unwrap();
    assert_eq!(solution.to_string(), golden.output);
}

#[test]
fn test_every_closure_coordinate_vanishes() {
    let scene = Scene::build().unwrap();
    let mut backend = BigFloatBackend::new(160).unwrap();
    // m* to 40 digits
    let digits = "6871214994450249282771314878291171369454/10000000000000000000000000000000000000000";
    let m = backend.rational(&digits.parse().unwrap());
    let defect = scene.closure_defect_at(&mut backend, &m).unwrap();
    for (i, v) in defect.iter().enumerate() {
        assert!(backend.to_f64(v).abs() < 1e-35, "coordinate {i}: {}", backend.to_decimal(v));
    }
}

#[test]
fn test_solution_serializes() {
    let solution = solve(&SolverConfig::with_precision(48)).unwrap();
    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json["display_digits"], 13);
    let m = json["m"].as_str().unwrap();
    assert_eq!(format_significant(m, 8).as_deref(), Some("0.6871215"));
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_composed_transform_is_simplified() {
    let scene = Scene::build().unwrap();
    let composed = scene.composed_transform();
    assert_eq!(&simplify_matrix(composed), composed);
}

#[test]
fn test_fifth_rotation_has_order_five() {
    let r = rotate(&(Expr::ratio(2, 5) * Expr::pi())).simplify();
    let r5 = (0..4).fold(r.clone(), |acc, _| &acc * &r);

    let mut backend = F64Backend::new();
    let values = r5.eval(&mut backend, &Bindings::new()).unwrap();
    let identity = Matrix4::identity().eval(&mut backend, &Bindings::new()).unwrap();
    for i in 0..4 {
        for j in 0..4 {
            assert_abs_diff_eq!(values[i][j], identity[i][j], epsilon = 1e-14);
        }
    }
}
