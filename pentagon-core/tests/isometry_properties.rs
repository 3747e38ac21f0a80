//! Property-based tests for the isometry builders.
//!
//! Points are drawn on a rational grid strictly inside the unit disk, so
//! every point is interior and no builder hits a degenerate case.

use pentagon_core::symbolic::Bindings;
use pentagon_core::{
    normalize, reflect, rotate, translate, Expr, F64Backend, Matrix4, Minkowski, Vector4,
};
use proptest::prelude::*;

const GRID: i64 = 100;

/// Grid point `(i/100, j/100)` with `i² + j² < 90²`
fn interior_point() -> impl Strategy<Value = (i64, i64)> {
    (-89i64..=89, -89i64..=89).prop_filter("inside the disk", |(i, j)| i * i + j * j < 90 * 90)
}

fn to_vector((i, j): (i64, i64)) -> Vector4 {
    Vector4::point(Expr::ratio(i, GRID), Expr::ratio(j, GRID), Expr::zero())
}

fn eval_matrix(m: &Matrix4) -> Vec<Vec<f64>> {
    m.eval(&mut F64Backend::new(), &Bindings::new()).unwrap()
}

fn eval_vector(v: &Vector4) -> Vec<f64> {
    v.eval(&mut F64Backend::new(), &Bindings::new()).unwrap()
}

// =============================================================================
// Reflections
// =============================================================================

proptest! {
    /// Rᵗ F R = F holds exactly for rational points
    #[test]
    fn prop_reflect_preserves_form(p in interior_point()) {
        let space = Minkowski::new();
        let r = reflect(&space, &to_vector(p)).unwrap();
        let pulled_back = (&(&r.transpose() * space.form()) * &r).simplify();
        prop_assert_eq!(&pulled_back, space.form());
    }

    /// Reflecting a point through itself fixes it up to sign
    #[test]
    fn prop_reflect_fixes_its_point(p in interior_point()) {
        let space = Minkowski::new();
        let v = to_vector(p);
        let image = normalize(&(&reflect(&space, &v).unwrap() * &v)).unwrap().simplify();
        prop_assert_eq!(image, v);
    }
}

// =============================================================================
// Translations and rotations
// =============================================================================

proptest! {
    /// normalize(translate(a, b) · a) = b
    #[test]
    fn prop_translate_takes_a_to_b(a in interior_point(), b in interior_point()) {
        prop_assume!(a != b);
        let space = Minkowski::new();
        let (va, vb) = (to_vector(a), to_vector(b));
        let t = translate(&space, &va, &vb).unwrap();
        let image = eval_vector(&normalize(&(&t * &va)).unwrap());
        let expected = eval_vector(&vb);
        for k in 0..4 {
            prop_assert!((image[k] - expected[k]).abs() < 1e-9, "{:?} vs {:?}", image, expected);
        }
    }

    /// Translations preserve the form, checked numerically
    #[test]
    fn prop_translate_preserves_form(a in interior_point(), b in interior_point()) {
        prop_assume!(a != b);
        let space = Minkowski::new();
        let t = translate(&space, &to_vector(a), &to_vector(b)).unwrap();
        let pulled_back = eval_matrix(&(&(&t.transpose() * space.form()) * &t));
        let form = eval_matrix(space.form());
        for i in 0..4 {
            for j in 0..4 {
                prop_assert!((pulled_back[i][j] - form[i][j]).abs() < 1e-8);
            }
        }
    }

    /// rotate(θ)⁵ = rotate(5θ)
    #[test]
    fn prop_rotation_power(k in -40i64..=40) {
        let theta = Expr::ratio(k, 8);
        let r = rotate(&theta);
        let r5 = (0..4).fold(r.clone(), |acc, _| &acc * &r);
        let direct = rotate(&(Expr::int(5) * &theta));
        let (lhs, rhs) = (eval_matrix(&r5), eval_matrix(&direct));
        for i in 0..4 {
            for j in 0..4 {
                prop_assert!((lhs[i][j] - rhs[i][j]).abs() < 1e-12);
            }
        }
    }
}
