//! Homogeneous vectors and 4×4 matrices over symbolic entries, and the
//! Minkowski bilinear form
//!
//! Points of the hyperboloid model are homogeneous 4-vectors `(x, y, z, w)`.
//! The last coordinate, not the first, is the time-like one, so the form is
//! `diag(1, 1, 1, -1)`. A vector with negative Minkowski norm is an interior
//! point; zero norm is an ideal point on the light cone.

use std::ops::{Add, Index, Mul, Sub};

use crate::error::{EvalError, PentagonError, Result};
use crate::numeric::Backend;
use crate::symbolic::{simplify, Bindings, Evaluator, Expr, Simplifier};

/// Column 4-vector of expressions
#[derive(Clone, Debug, PartialEq)]
pub struct Vector4([Expr; 4]);

impl Vector4 {
    pub fn new(x: Expr, y: Expr, z: Expr, w: Expr) -> Self {
        Self([x, y, z, w])
    }

    pub fn from_fn(f: impl FnMut(usize) -> Expr) -> Self {
        Self(std::array::from_fn(f))
    }

    /// A point with rational affine coordinates, `w = 1`
    pub fn point(x: Expr, y: Expr, z: Expr) -> Self {
        Self::new(x, y, z, Expr::one())
    }

    pub fn coords(&self) -> &[Expr; 4] {
        &self.0
    }

    pub fn x(&self) -> &Expr {
        &self.0[0]
    }

    pub fn y(&self) -> &Expr {
        &self.0[1]
    }

    pub fn z(&self) -> &Expr {
        &self.0[2]
    }

    /// Homogeneous coordinate
    pub fn w(&self) -> &Expr {
        &self.0[3]
    }

    pub fn map(&self, mut f: impl FnMut(&Expr) -> Expr) -> Self {
        Self::from_fn(|i| f(&self.0[i]))
    }

    pub fn scale(&self, k: &Expr) -> Self {
        self.map(|e| e * k)
    }

    pub fn divide(&self, k: &Expr) -> Self {
        let inv = k.recip();
        self.map(|e| e * &inv)
    }

    /// Simplify every coordinate
    pub fn simplify(&self) -> Self {
        simplify_vector(self)
    }

    /// Evaluate every coordinate with one shared evaluator
    pub fn eval<B: Backend>(
        &self,
        backend: &mut B,
        bindings: &Bindings<B::Value>,
    ) -> std::result::Result<Vec<B::Value>, EvalError> {
        let mut evaluator = Evaluator::new(backend, bindings);
        self.0.iter().map(|e| evaluator.eval(e)).collect()
    }
}

impl Index<usize> for Vector4 {
    type Output = Expr;

    fn index(&self, i: usize) -> &Expr {
        &self.0[i]
    }
}

impl Add for &Vector4 {
    type Output = Vector4;

    fn add(self, rhs: &Vector4) -> Vector4 {
        Vector4::from_fn(|i| &self.0[i] + &rhs.0[i])
    }
}

impl Sub for &Vector4 {
    type Output = Vector4;

    fn sub(self, rhs: &Vector4) -> Vector4 {
        Vector4::from_fn(|i| &self.0[i] - &rhs.0[i])
    }
}

/// Row-major 4×4 matrix of expressions
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix4([[Expr; 4]; 4]);

impl Matrix4 {
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> Expr) -> Self {
        Self(std::array::from_fn(|i| std::array::from_fn(|j| f(i, j))))
    }

    pub fn from_rows(rows: [[Expr; 4]; 4]) -> Self {
        Self(rows)
    }

    pub fn identity() -> Self {
        Self::from_fn(|i, j| if i == j { Expr::one() } else { Expr::zero() })
    }

    pub fn diagonal(entries: [i64; 4]) -> Self {
        Self::from_fn(|i, j| if i == j { Expr::int(entries[i]) } else { Expr::zero() })
    }

    pub fn get(&self, row: usize, col: usize) -> &Expr {
        &self.0[row][col]
    }

    pub fn rows(&self) -> &[[Expr; 4]; 4] {
        &self.0
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(|i, j| self.0[j][i].clone())
    }

    pub fn map(&self, mut f: impl FnMut(&Expr) -> Expr) -> Self {
        Self::from_fn(|i, j| f(&self.0[i][j]))
    }

    pub fn scale(&self, k: &Expr) -> Self {
        self.map(|e| e * k)
    }

    pub fn divide(&self, k: &Expr) -> Self {
        let inv = k.recip();
        self.map(|e| e * &inv)
    }

    /// Simplify every entry
    pub fn simplify(&self) -> Self {
        simplify_matrix(self)
    }

    /// `self · v`
    pub fn apply(&self, v: &Vector4) -> Vector4 {
        Vector4::from_fn(|i| {
            (0..4).fold(Expr::zero(), |acc, k| acc + &self.0[i][k] * &v.0[k])
        })
    }

    /// Evaluate every entry with one shared evaluator
    pub fn eval<B: Backend>(
        &self,
        backend: &mut B,
        bindings: &Bindings<B::Value>,
    ) -> std::result::Result<Vec<Vec<B::Value>>, EvalError> {
        let mut evaluator = Evaluator::new(backend, bindings);
        self.0
            .iter()
            .map(|row| {
                row.iter()
                    .map(|e| evaluator.eval(e))
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .collect()
    }
}

impl Index<(usize, usize)> for Matrix4 {
    type Output = Expr;

    fn index(&self, (row, col): (usize, usize)) -> &Expr {
        &self.0[row][col]
    }
}

impl Mul for &Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: &Matrix4) -> Matrix4 {
        Matrix4::from_fn(|i, j| {
            (0..4).fold(Expr::zero(), |acc, k| acc + &self.0[i][k] * &rhs.0[k][j])
        })
    }
}

impl Mul<&Vector4> for &Matrix4 {
    type Output = Vector4;

    fn mul(self, rhs: &Vector4) -> Vector4 {
        self.apply(rhs)
    }
}

impl Sub for &Matrix4 {
    type Output = Matrix4;

    fn sub(self, rhs: &Matrix4) -> Matrix4 {
        Matrix4::from_fn(|i, j| &self.0[i][j] - &rhs.0[i][j])
    }
}

impl Add for &Matrix4 {
    type Output = Matrix4;

    fn add(self, rhs: &Matrix4) -> Matrix4 {
        Matrix4::from_fn(|i, j| &self.0[i][j] + &rhs.0[i][j])
    }
}

/// Simplify every entry of `matrix`, sharing one cache across entries
pub fn simplify_matrix(matrix: &Matrix4) -> Matrix4 {
    let mut simplifier = Simplifier::new();
    matrix.map(|e| simplifier.run(e))
}

/// Simplify every coordinate of `vector`
pub fn simplify_vector(vector: &Vector4) -> Vector4 {
    let mut simplifier = Simplifier::new();
    vector.map(|e| simplifier.run(e))
}

/// `a · bᵗ`
pub fn outer_product(a: &Vector4, b: &Vector4) -> Matrix4 {
    Matrix4::from_fn(|i, j| &a.0[i] * &b.0[j])
}

/// Divide every coordinate by the homogeneous coordinate.
///
/// Fails when `w` simplifies to an exact zero. A `w` that only vanishes for
/// particular symbol values is caught later, at evaluation.
pub fn normalize(point: &Vector4) -> Result<Vector4> {
    let w = simplify(point.w());
    if w.is_zero() {
        return Err(PentagonError::degenerate(
            "normalize",
            "homogeneous coordinate is zero (point at infinity)",
        ));
    }
    Ok(point.divide(&w))
}

/// The Minkowski space: the fixed form and the origin of the hyperboloid
#[derive(Clone, Debug)]
pub struct Minkowski {
    form: Matrix4,
    origin: Vector4,
}

impl Default for Minkowski {
    fn default() -> Self {
        Self::new()
    }
}

impl Minkowski {
    pub fn new() -> Self {
        Self {
            form: Matrix4::diagonal([1, 1, 1, -1]),
            origin: Vector4::new(Expr::zero(), Expr::zero(), Expr::zero(), Expr::one()),
        }
    }

    /// `diag(1, 1, 1, -1)`
    pub fn form(&self) -> &Matrix4 {
        &self.form
    }

    /// `(0, 0, 0, 1)`
    pub fn origin(&self) -> &Vector4 {
        &self.origin
    }

    /// `aᵗ · F · b`, simplified
    pub fn inner_product(&self, a: &Vector4, b: &Vector4) -> Expr {
        let fb = self.form.apply(b);
        let sum = (0..4).fold(Expr::zero(), |acc, i| acc + &a.0[i] * &fb.0[i]);
        simplify(&sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::F64Backend;
    use crate::symbolic::{rational, Symbol};

    #[test]
    fn test_inner_product_of_origin() {
        let space = Minkowski::new();
        let o = space.origin();
        assert_eq!(space.inner_product(o, o).as_rational(), Some(&rational(-1, 1)));
    }

    #[test]
    fn test_inner_product_symbolic() {
        let space = Minkowski::new();
        let m = Symbol::new("m");
        let p = Vector4::point(Expr::zero(), Expr::symbol(&m), Expr::zero());
        let ip = space.inner_product(&p, &p);

        let expected = simplify(&(Expr::symbol(&m).powi(2) - Expr::one()));
        assert_eq!(ip, expected);
    }

    #[test]
    fn test_outer_product_shape() {
        let a = Vector4::new(Expr::int(1), Expr::int(2), Expr::int(3), Expr::int(4));
        let b = Vector4::new(Expr::int(5), Expr::int(6), Expr::int(7), Expr::int(8));
        let o = outer_product(&a, &b);
        assert_eq!(o.get(1, 2).as_rational(), Some(&rational(14, 1)));
        assert_eq!(o.get(3, 0).as_rational(), Some(&rational(20, 1)));
        assert_eq!(o.transpose().get(0, 3).as_rational(), Some(&rational(20, 1)));
    }

    #[test]
    fn test_normalize() {
        let p = Vector4::new(Expr::int(2), Expr::int(4), Expr::int(0), Expr::int(4));
        let n = normalize(&p).unwrap().simplify();
        assert_eq!(n.x().as_rational(), Some(&rational(1, 2)));
        assert!(n.w().is_one());

        let ideal = Vector4::new(Expr::int(1), Expr::int(0), Expr::int(0), Expr::int(0));
        let err = normalize(&ideal).unwrap_err();
        assert_eq!(err.code(), "DEGENERATE_GEOMETRY");
    }

    #[test]
    fn test_matrix_algebra() {
        let f = Minkowski::new().form().clone();
        // F · F = I
        assert_eq!((&f * &f).simplify(), Matrix4::identity());
        assert_eq!((&f - &f).simplify(), Matrix4::from_fn(|_, _| Expr::zero()));

        let v = Vector4::new(Expr::int(1), Expr::int(2), Expr::int(3), Expr::int(4));
        let fv = (&f * &v).simplify();
        assert_eq!(fv.divide(&Expr::int(2)).simplify().x().as_rational(), Some(&rational(1, 2)));
        assert_eq!(fv.w().as_rational(), Some(&rational(-4, 1)));

        let mut backend = F64Backend::new();
        let values = fv.eval(&mut backend, &Bindings::new()).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, -4.0]);
    }
}
