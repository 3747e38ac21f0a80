//! Isometries of the hyperboloid model as 4×4 matrices
//!
//! Every builder here returns a matrix that preserves the Minkowski form:
//! reflections and rotations by construction, translations as the product of
//! two reflections.

use tracing::trace;

use crate::error::{PentagonError, Result};
use crate::minkowski::{outer_product, Matrix4, Minkowski, Vector4};
use crate::symbolic::{simplify, Expr};

/// Reflection through `point`: `I − 2·(p·pᵗ·F) / ⟨p, p⟩`.
///
/// Fixes `point` up to sign and reverses its Minkowski-orthogonal
/// complement. Fails on light-cone input, where `⟨p, p⟩` is exactly zero.
pub fn reflect(space: &Minkowski, point: &Vector4) -> Result<Matrix4> {
    let norm = space.inner_product(point, point);
    if norm.is_zero() {
        return Err(PentagonError::degenerate(
            "reflect",
            "point lies on the light cone (zero Minkowski norm)",
        ));
    }
    let projector = &outer_product(point, point) * space.form();
    let scale = Expr::int(2) / norm;
    Ok(&Matrix4::identity() - &projector.scale(&scale))
}

/// Unnormalised hyperbolic midpoint of `a` and `b`:
/// `a·√(⟨b,b⟩⟨a,b⟩) + b·√(⟨a,a⟩⟨a,b⟩)`.
///
/// The weights are real for two interior points on the same sheet.
pub fn midpoint(space: &Minkowski, a: &Vector4, b: &Vector4) -> Vector4 {
    let ab = space.inner_product(a, b);
    let aa = space.inner_product(a, a);
    let bb = space.inner_product(b, b);
    let weight_a = simplify(&(&bb * &ab)).sqrt();
    let weight_b = simplify(&(&aa * &ab)).sqrt();
    &a.scale(&weight_a) + &b.scale(&weight_b)
}

/// Midpoint of `a` and the origin
pub fn midpoint_to_origin(space: &Minkowski, a: &Vector4) -> Vector4 {
    midpoint(space, a, space.origin())
}

/// Translation along the geodesic through `a` and `b`, taking `a` to `b`:
/// `reflect(midpoint(a, b)) · reflect(a)`.
pub fn translate(space: &Minkowski, a: &Vector4, b: &Vector4) -> Result<Matrix4> {
    let mid = midpoint(space, a, b);
    let first = reflect(space, a)?;
    let second = reflect(space, &mid)?;
    let t = &second * &first;
    trace!(nodes = t.rows().iter().flatten().map(Expr::node_count).sum::<usize>(), "translation built");
    Ok(t)
}

/// Rotation by `theta` radians in the x/y plane; z and w are fixed
pub fn rotate(theta: &Expr) -> Matrix4 {
    let (c, s) = (theta.cos(), theta.sin());
    let (zero, one) = (Expr::zero(), Expr::one());
    Matrix4::from_rows([
        [c.clone(), -&s, zero.clone(), zero.clone()],
        [s, c, zero.clone(), zero.clone()],
        [zero.clone(), zero.clone(), one.clone(), zero.clone()],
        [zero.clone(), zero.clone(), zero, one],
    ])
}
