//! Numeric evaluation of expressions on any [`Backend`]

use std::collections::HashMap;

use num_traits::{Signed, ToPrimitive};

use super::{Expr, Node, Rational, Symbol};
use crate::error::EvalError;
use crate::numeric::Backend;

/// Values bound to symbols for one evaluation
#[derive(Debug, Clone)]
pub struct Bindings<V> {
    values: Vec<(Symbol, V)>,
}

impl<V> Default for Bindings<V> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<V> Bindings<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(symbol: &Symbol, value: V) -> Self {
        Self {
            values: vec![(symbol.clone(), value)],
        }
    }

    /// Bind `symbol`, replacing any previous value
    pub fn bind(&mut self, symbol: &Symbol, value: V) {
        match self.values.iter_mut().find(|(s, _)| s == symbol) {
            Some(slot) => slot.1 = value,
            None => self.values.push((symbol.clone(), value)),
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&V> {
        self.values.iter().find(|(s, _)| s == symbol).map(|(_, v)| v)
    }
}

/// Evaluates expressions against fixed bindings.
///
/// Every node is evaluated at most once per evaluator, so expressions that
/// share sub-expressions across matrix entries cost time linear in the DAG.
/// The cache holds a clone of each key to pin its address.
pub struct Evaluator<'a, B: Backend> {
    backend: &'a mut B,
    bindings: &'a Bindings<B::Value>,
    cache: HashMap<*const Node, (Expr, B::Value)>,
}

impl<'a, B: Backend> Evaluator<'a, B> {
    pub fn new(backend: &'a mut B, bindings: &'a Bindings<B::Value>) -> Self {
        Self {
            backend,
            bindings,
            cache: HashMap::new(),
        }
    }

    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<B::Value, EvalError> {
        if let Some((_, value)) = self.cache.get(&expr.as_ptr()) {
            return Ok(value.clone());
        }
        let value = match expr.node() {
            Node::Num(r) => self.backend.rational(r),
            Node::Sym(s) => self
                .bindings
                .get(s)
                .cloned()
                .ok_or_else(|| EvalError::UnboundSymbol {
                    name: s.name().to_string(),
                })?,
            Node::Pi => self.backend.pi(),
            Node::Add(terms) => {
                let mut acc = self.eval(&terms[0])?;
                for term in &terms[1..] {
                    let v = self.eval(term)?;
                    acc = self.backend.add(&acc, &v);
                }
                acc
            }
            Node::Mul(factors) => {
                let mut acc = self.eval(&factors[0])?;
                for factor in &factors[1..] {
                    let v = self.eval(factor)?;
                    acc = self.backend.mul(&acc, &v);
                }
                acc
            }
            Node::Pow(base, exponent) => {
                let base = self.eval(base)?;
                self.pow(&base, exponent)?
            }
            Node::Sin(arg) => {
                let v = self.eval(arg)?;
                self.backend.sin(&v)
            }
            Node::Cos(arg) => {
                let v = self.eval(arg)?;
                self.backend.cos(&v)
            }
        };
        if self.backend.sign(&value).is_none() {
            return Err(EvalError::NotANumber);
        }
        self.cache
            .insert(expr.as_ptr(), (expr.clone(), value.clone()));
        Ok(value)
    }

    /// `base ^ exponent` for integer or half-integer exponents
    fn pow(&mut self, base: &B::Value, exponent: &Rational) -> Result<B::Value, EvalError> {
        let unsupported = || EvalError::NonIntegerPower {
            exponent: exponent.to_string(),
        };
        let doubled = exponent * Rational::from_integer(2.into());
        if !doubled.is_integer() {
            return Err(unsupported());
        }
        let halves = doubled.to_integer();
        let steps = halves.magnitude().to_u64().ok_or_else(unsupported)?;

        let raised = if steps % 2 == 1 {
            let root = self.backend.sqrt(base)?;
            self.backend.powi(&root, steps)
        } else {
            self.backend.powi(base, steps / 2)
        };
        if halves.is_negative() {
            self.backend.recip(&raised)
        } else {
            Ok(raised)
        }
    }
}

/// Evaluate one expression with a fresh evaluator
pub fn evaluate<B: Backend>(
    expr: &Expr,
    backend: &mut B,
    bindings: &Bindings<B::Value>,
) -> Result<B::Value, EvalError> {
    Evaluator::new(backend, bindings).eval(expr)
}
