//! The pentagon scene and its closure constraint
//!
//! Three vertices of a regular pentagon sit at distance `m` (in Klein
//! coordinates) from the origin: `north` on the y axis, `west` and `east` on
//! the x axis. Rotating by a fifth of a turn about `north` must carry `west`
//! onto `east`. Composing that rotation symbolically leaves a residual in `m`
//! alone, which vanishes exactly at the valid pentagon.

use tracing::debug;

use crate::error::Result;
use crate::isometry::{rotate, translate};
use crate::minkowski::{normalize, simplify_matrix, simplify_vector, Matrix4, Minkowski, Vector4};
use crate::numeric::Backend;
use crate::symbolic::{evaluate, simplify, Bindings, Expr, Symbol};

/// Number of pentagon vertices; the rotation about `north` is `2π / ROTATION_ORDER`
pub const ROTATION_ORDER: i64 = 5;

/// Coordinate of the predicted vertex that the scalar residual is read from
pub const RESIDUAL_COORDINATE: usize = 1;

/// Name of the unknown distance parameter
pub const PARAMETER_NAME: &str = "m";

/// Symbolic pentagon construction, built once and then only evaluated
#[derive(Debug, Clone)]
pub struct Scene {
    space: Minkowski,
    m: Symbol,
    north: Vector4,
    west: Vector4,
    east: Vector4,
    rotation_by_fifth: Matrix4,
    to_south: Matrix4,
    to_north: Matrix4,
    composed_transform: Matrix4,
    predicted_east: Vector4,
    closure_defect: Vector4,
    residual: Expr,
}

impl Scene {
    /// Build every isometry and reduce the closure constraint to a residual
    pub fn build() -> Result<Self> {
        let space = Minkowski::new();
        let m = Symbol::new(PARAMETER_NAME);
        let (zero, param) = (Expr::zero(), Expr::symbol(&m));

        let north = Vector4::point(zero.clone(), param.clone(), zero.clone());
        let west = Vector4::point(-&param, zero.clone(), zero.clone());
        let east = Vector4::point(param, zero.clone(), zero);

        let angle = Expr::ratio(2, ROTATION_ORDER) * Expr::pi();
        let rotation_by_fifth = rotate(&angle);
        let to_south = translate(&space, &north, space.origin())?;
        let to_north = translate(&space, space.origin(), &north)?;
        debug!(
            to_south_nodes = matrix_nodes(&to_south),
            to_north_nodes = matrix_nodes(&to_north),
            "translations built"
        );

        let composed_transform =
            simplify_matrix(&(&(&to_north * &rotation_by_fifth) * &to_south));
        debug!(nodes = matrix_nodes(&composed_transform), "composed transform simplified");

        let predicted_east = simplify_vector(&normalize(&(&composed_transform * &west))?);
        let closure_defect = simplify_vector(&(&predicted_east - &east));
        let residual = simplify(&closure_defect[RESIDUAL_COORDINATE]);
        debug!(
            nodes = residual.node_count(),
            depends_on_m = residual.contains_symbol(&m),
            "residual extracted"
        );

        Ok(Self {
            space,
            m,
            north,
            west,
            east,
            rotation_by_fifth,
            to_south,
            to_north,
            composed_transform,
            predicted_east,
            closure_defect,
            residual,
        })
    }

    pub fn space(&self) -> &Minkowski {
        &self.space
    }

    /// The unknown `m`
    pub fn parameter(&self) -> &Symbol {
        &self.m
    }

    pub fn north(&self) -> &Vector4 {
        &self.north
    }

    pub fn west(&self) -> &Vector4 {
        &self.west
    }

    pub fn east(&self) -> &Vector4 {
        &self.east
    }

    pub fn rotation_by_fifth(&self) -> &Matrix4 {
        &self.rotation_by_fifth
    }

    /// Translation taking `north` to the origin
    pub fn to_south(&self) -> &Matrix4 {
        &self.to_south
    }

    /// Translation taking the origin to `north`
    pub fn to_north(&self) -> &Matrix4 {
        &self.to_north
    }

    /// Rotation by a fifth of a turn about `north`, simplified
    pub fn composed_transform(&self) -> &Matrix4 {
        &self.composed_transform
    }

    /// Normalised image of `west` under the composed transform
    pub fn predicted_east(&self) -> &Vector4 {
        &self.predicted_east
    }

    /// `predicted_east − east`; every coordinate vanishes at the solution
    pub fn closure_defect(&self) -> &Vector4 {
        &self.closure_defect
    }

    /// Scalar residual `r(m)`
    pub fn residual(&self) -> &Expr {
        &self.residual
    }

    /// Evaluate `r(m)` at `m = value`
    pub fn residual_at<B: Backend>(&self, backend: &mut B, value: &B::Value) -> Result<B::Value> {
        let bindings = Bindings::single(&self.m, value.clone());
        Ok(evaluate(&self.residual, backend, &bindings)?)
    }

    /// Evaluate all four closure coordinates at `m = value`
    pub fn closure_defect_at<B: Backend>(
        &self,
        backend: &mut B,
        value: &B::Value,
    ) -> Result<Vec<B::Value>> {
        let bindings = Bindings::single(&self.m, value.clone());
        Ok(self.closure_defect.eval(backend, &bindings)?)
    }
}

fn matrix_nodes(matrix: &Matrix4) -> usize {
    matrix.rows().iter().flatten().map(Expr::node_count).sum()
}
