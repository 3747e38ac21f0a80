//! Canonical normal form for expressions
//!
//! [`simplify`] rewrites an expression bottom-up into a normal form:
//!
//! - sums are flat, with one term per distinct non-numeric part, rational
//!   coefficients collected and the constant term first
//! - products are flat, with one factor per distinct base, exponents
//!   collected (`x * x^-1 → 1`, `√x * √x → x`) and the rational coefficient
//!   first
//! - a product that is just `c * (a + b + ...)` is distributed
//! - exact powers of rationals are evaluated, perfect roots included
//! - `sin`/`cos` of rational multiples of π with small denominators become
//!   exact radicals
//!
//! Products of sums are never expanded, so expression size stays bounded by
//! the size of the input. The normal form is a projection:
//! `simplify(&simplify(x)) == simplify(x)`.

use std::collections::{BTreeMap, HashMap};

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::{rational, rational_powi, Expr, Node, Rational};

/// Simplify an expression into canonical form
pub fn simplify(expr: &Expr) -> Expr {
    Simplifier::default().run(expr)
}

/// Bottom-up simplifier with a per-run cache keyed by node identity.
///
/// The cache holds a clone of every key so a node address cannot be reused
/// while the simplifier is alive.
#[derive(Default)]
pub struct Simplifier {
    cache: HashMap<*const Node, (Expr, Expr)>,
}

impl Simplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, expr: &Expr) -> Expr {
        if let Some((_, done)) = self.cache.get(&expr.as_ptr()) {
            return done.clone();
        }
        let out = match expr.node() {
            Node::Num(_) | Node::Sym(_) | Node::Pi => expr.clone(),
            Node::Add(terms) => {
                let terms = terms.iter().map(|t| self.run(t)).collect();
                canonical_sum(terms)
            }
            Node::Mul(factors) => {
                let factors = factors
                    .iter()
                    .map(|f| (self.run(f), Rational::one()))
                    .collect();
                canonical_product(factors)
            }
            Node::Pow(base, exponent) => {
                canonical_product(vec![(self.run(base), exponent.clone())])
            }
            Node::Sin(arg) => canonical_sin(self.run(arg)),
            Node::Cos(arg) => canonical_cos(self.run(arg)),
        };
        self.cache
            .insert(expr.as_ptr(), (expr.clone(), out.clone()));
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sums
// ─────────────────────────────────────────────────────────────────────────────

/// Split a canonical term into its rational coefficient and the rest
fn split_coefficient(term: &Expr) -> (Rational, Option<Expr>) {
    match term.node() {
        Node::Num(c) => (c.clone(), None),
        Node::Mul(factors) => match factors[0].node() {
            Node::Num(c) => {
                let rest = if factors.len() == 2 {
                    factors[1].clone()
                } else {
                    Expr::from_node(Node::Mul(factors[1..].to_vec()))
                };
                (c.clone(), Some(rest))
            }
            _ => (Rational::one(), Some(term.clone())),
        },
        _ => (Rational::one(), Some(term.clone())),
    }
}

/// `coefficient * rest` for a canonical, coefficient-free `rest` that is not a sum
fn scale(rest: Expr, coefficient: Rational) -> Expr {
    if coefficient.is_one() {
        return rest;
    }
    let mut factors = vec![Expr::num(coefficient)];
    match rest.node() {
        Node::Mul(inner) => factors.extend(inner.iter().cloned()),
        _ => factors.push(rest),
    }
    Expr::from_node(Node::Mul(factors))
}

/// Combine canonical terms into a canonical sum
pub(crate) fn canonical_sum(terms: Vec<Expr>) -> Expr {
    let mut constant = Rational::zero();
    let mut collected: BTreeMap<Expr, Rational> = BTreeMap::new();
    let mut pending = terms;

    while let Some(term) = pending.pop() {
        if let Node::Add(inner) = term.node() {
            pending.extend(inner.iter().cloned());
            continue;
        }
        match split_coefficient(&term) {
            (c, None) => constant += c,
            (c, Some(rest)) => *collected.entry(rest).or_insert_with(Rational::zero) += c,
        }
    }

    let mut out = Vec::with_capacity(collected.len() + 1);
    if !constant.is_zero() {
        out.push(Expr::num(constant));
    }
    out.extend(
        collected
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(rest, c)| scale(rest, c)),
    );

    match out.len() {
        0 => Expr::zero(),
        1 => out.pop().unwrap_or_else(Expr::zero),
        _ => Expr::from_node(Node::Add(out)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Products and powers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ProductBuilder {
    coefficient: Option<Rational>,
    powers: BTreeMap<Expr, Rational>,
}

impl ProductBuilder {
    fn coefficient_mut(&mut self) -> &mut Rational {
        self.coefficient.get_or_insert_with(Rational::one)
    }

    /// Multiply in `base ^ exponent` for a canonical `base`
    fn absorb(&mut self, base: &Expr, exponent: Rational) {
        if exponent.is_zero() {
            return;
        }
        match base.node() {
            Node::Num(r) => self.absorb_rational(r, exponent),
            Node::Mul(factors) if exponent.is_integer() => {
                for factor in factors {
                    self.absorb(factor, exponent.clone());
                }
            }
            Node::Pow(inner, k) if exponent.is_integer() => {
                self.absorb(inner, k * &exponent);
            }
            _ => {
                *self
                    .powers
                    .entry(base.clone())
                    .or_insert_with(Rational::zero) += exponent;
            }
        }
    }

    fn absorb_rational(&mut self, r: &Rational, exponent: Rational) {
        if r.is_one() {
            return;
        }
        if r.is_zero() {
            if exponent.is_positive() {
                *self.coefficient_mut() = Rational::zero();
            } else {
                // 0^-n is left for evaluation to report
                *self
                    .powers
                    .entry(Expr::num(r.clone()))
                    .or_insert_with(Rational::zero) += exponent;
            }
            return;
        }

        let whole = exponent.floor();
        let fraction = &exponent - &whole;
        if let Some(value) = rational_powi(r, &whole) {
            *self.coefficient_mut() *= value;
        }
        if fraction.is_zero() {
            return;
        }
        match exact_root(r, &fraction) {
            Some(root) => *self.coefficient_mut() *= root,
            None => {
                *self
                    .powers
                    .entry(Expr::num(r.clone()))
                    .or_insert_with(Rational::zero) += fraction;
            }
        }
    }

    /// Re-absorb bases whose collected exponent allows further reduction
    fn normalize(&mut self) {
        loop {
            let reducible: Vec<Expr> = self
                .powers
                .iter()
                .filter(|(base, e)| is_reducible(base, e))
                .map(|(base, _)| base.clone())
                .collect();
            if reducible.is_empty() {
                break;
            }
            for base in reducible {
                if let Some(exponent) = self.powers.remove(&base) {
                    self.absorb(&base, exponent);
                }
            }
        }
    }

    fn build(mut self) -> Expr {
        self.normalize();
        let coefficient = self.coefficient.take().unwrap_or_else(Rational::one);
        if coefficient.is_zero() {
            return Expr::zero();
        }

        let mut factors: Vec<Expr> = self
            .powers
            .into_iter()
            .filter(|(_, e)| !e.is_zero())
            .map(|(base, e)| {
                if e.is_one() {
                    base
                } else {
                    Expr::from_node(Node::Pow(base, e))
                }
            })
            .collect();

        if factors.is_empty() {
            return Expr::num(coefficient);
        }
        if factors.len() == 1 {
            if coefficient.is_one() {
                return factors.pop().unwrap_or_else(Expr::one);
            }
            if let Node::Add(terms) = factors[0].node() {
                let scaled = terms
                    .iter()
                    .map(|t| {
                        canonical_product(vec![
                            (Expr::num(coefficient.clone()), Rational::one()),
                            (t.clone(), Rational::one()),
                        ])
                    })
                    .collect();
                return canonical_sum(scaled);
            }
        }
        if !coefficient.is_one() {
            factors.insert(0, Expr::num(coefficient));
        }
        Expr::from_node(Node::Mul(factors))
    }
}

fn is_reducible(base: &Expr, exponent: &Rational) -> bool {
    match base.node() {
        Node::Num(r) => {
            !r.is_zero() && (exponent >= &Rational::one() || exponent.is_negative())
        }
        Node::Mul(_) | Node::Pow(..) => exponent.is_integer(),
        _ => false,
    }
}

/// Exact `r ^ fraction` for `0 < fraction < 1`, when the root is rational
fn exact_root(r: &Rational, fraction: &Rational) -> Option<Rational> {
    if r.is_negative() {
        return None;
    }
    let degree = fraction.denom().to_u32()?;
    let power = fraction.numer().to_u32()?;
    let numer = integer_root(r.numer(), degree)?;
    let denom = integer_root(r.denom(), degree)?;
    Some(num_traits::pow::pow(Rational::new(numer, denom), power as usize))
}

fn integer_root(n: &BigInt, degree: u32) -> Option<BigInt> {
    let root = n.nth_root(degree);
    if num_traits::pow::pow(root.clone(), degree as usize) == *n {
        Some(root)
    } else {
        None
    }
}

/// Combine canonical `(base, exponent)` pairs into a canonical product
pub(crate) fn canonical_product(factors: Vec<(Expr, Rational)>) -> Expr {
    let mut builder = ProductBuilder::default();
    for (base, exponent) in factors {
        builder.absorb(&base, exponent);
    }
    builder.build()
}

// ─────────────────────────────────────────────────────────────────────────────
// Trigonometry
// ─────────────────────────────────────────────────────────────────────────────

/// `q` such that `arg == q * π`, if the argument has that shape
fn pi_multiple(arg: &Expr) -> Option<Rational> {
    match arg.node() {
        Node::Pi => Some(Rational::one()),
        Node::Mul(factors) if factors.len() == 2 => match (factors[0].node(), factors[1].node()) {
            (Node::Num(q), Node::Pi) => Some(q.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn sqrt_of(r: i64) -> Expr {
    canonical_product(vec![(Expr::int(r), rational(1, 2))])
}

/// `a + b·√5` built in canonical form
fn with_sqrt5(a: Rational, b: Rational) -> Expr {
    let radical = canonical_product(vec![
        (Expr::num(b), Rational::one()),
        (sqrt_of(5), Rational::one()),
    ]);
    canonical_sum(vec![Expr::num(a), radical])
}

/// Exact `cos(qπ)` for `q` in `[0, 1/2]`, when tabulated
fn cos_table(q: &Rational) -> Option<Expr> {
    let quarter = rational(1, 4);
    let value = if q.is_zero() {
        Expr::one()
    } else if *q == rational(1, 10) {
        // √(10 + 2√5) / 4
        let radicand = with_sqrt5(rational(10, 1), rational(2, 1));
        canonical_product(vec![
            (Expr::num(quarter), Rational::one()),
            (radicand, rational(1, 2)),
        ])
    } else if *q == rational(1, 6) {
        canonical_product(vec![
            (Expr::ratio(1, 2), Rational::one()),
            (sqrt_of(3), Rational::one()),
        ])
    } else if *q == rational(1, 5) {
        with_sqrt5(quarter.clone(), quarter)
    } else if *q == rational(1, 4) {
        canonical_product(vec![
            (Expr::ratio(1, 2), Rational::one()),
            (sqrt_of(2), Rational::one()),
        ])
    } else if *q == rational(3, 10) {
        // √(10 - 2√5) / 4
        let radicand = with_sqrt5(rational(10, 1), rational(-2, 1));
        canonical_product(vec![
            (Expr::num(quarter), Rational::one()),
            (radicand, rational(1, 2)),
        ])
    } else if *q == rational(1, 3) {
        Expr::ratio(1, 2)
    } else if *q == rational(2, 5) {
        with_sqrt5(-quarter.clone(), quarter)
    } else if *q == rational(1, 2) {
        Expr::zero()
    } else {
        return None;
    };
    Some(value)
}

/// Exact `cos(qπ)` for any rational `q`, when reducible to the table
fn exact_cos(q: &Rational) -> Option<Expr> {
    let two = Rational::from_integer(BigInt::from(2));
    let half = rational(1, 2);
    // reduce into [0, 2)
    let mut q = q - &two * (q / &two).floor();
    if q > Rational::one() {
        q = &two - &q;
    }
    if q > half {
        let reflected = cos_table(&(Rational::one() - &q))?;
        return Some(canonical_product(vec![
            (Expr::int(-1), Rational::one()),
            (reflected, Rational::one()),
        ]));
    }
    cos_table(&q)
}

pub(crate) fn canonical_cos(arg: Expr) -> Expr {
    if arg.is_zero() {
        return Expr::one();
    }
    if let Some(value) = pi_multiple(&arg).and_then(|q| exact_cos(&q)) {
        return value;
    }
    Expr::from_node(Node::Cos(arg))
}

pub(crate) fn canonical_sin(arg: Expr) -> Expr {
    if arg.is_zero() {
        return Expr::zero();
    }
    // sin(qπ) = cos((1/2 - q)π)
    if let Some(value) = pi_multiple(&arg).and_then(|q| exact_cos(&(rational(1, 2) - q))) {
        return value;
    }
    Expr::from_node(Node::Sin(arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Symbol;

    fn m() -> Expr {
        Expr::symbol(&Symbol::new("m"))
    }

    #[test]
    fn test_collects_like_terms() {
        let x = m();
        let e = &x + &x + &(Expr::int(3) * &x) - Expr::int(5) * &x;
        assert!(simplify(&e).is_zero());

        let e = Expr::int(2) + &x + Expr::int(3);
        let s = simplify(&e);
        assert_eq!(s, simplify(&(&x + &Expr::int(5))));
    }

    #[test]
    fn test_cancels_reciprocals_and_roots() {
        let x = m();
        let y = &x + &Expr::int(1);

        assert!(simplify(&(&y / &y)).is_one());
        assert_eq!(simplify(&(y.sqrt() * y.sqrt())), simplify(&y));
        assert_eq!(simplify(&Expr::int(5).sqrt().powi(2)).as_rational(), Some(&rational(5, 1)));
        assert_eq!(simplify(&Expr::ratio(9, 4).sqrt()).as_rational(), Some(&rational(3, 2)));
    }

    #[test]
    fn test_distributes_lone_coefficient() {
        let x = m();
        // -(m^2 - 1) becomes 1 - m^2
        let e = -(x.powi(2) - Expr::int(1));
        let expected = simplify(&(Expr::int(1) - x.powi(2)));
        assert_eq!(simplify(&e), expected);
        assert!(matches!(simplify(&e).node(), Node::Add(_)));
    }

    #[test]
    fn test_does_not_expand_products_of_sums() {
        let x = m();
        let a = &x + &Expr::int(1);
        let b = &x - &Expr::int(1);
        let s = simplify(&(&a * &b));
        assert!(matches!(s.node(), Node::Mul(_)));
    }

    #[test]
    fn test_exact_trig_values() {
        let pi = Expr::pi();
        assert_eq!(
            simplify(&(Expr::ratio(1, 3) * &pi).cos()).as_rational(),
            Some(&rational(1, 2))
        );
        assert_eq!(simplify(&pi.sin()), Expr::zero());
        assert_eq!(simplify(&pi.cos()).as_rational(), Some(&rational(-1, 1)));

        // cos(2π/5) = (√5 - 1) / 4
        let cos = simplify(&(Expr::ratio(2, 5) * &pi).cos());
        let expected = simplify(&((Expr::int(5).sqrt() - Expr::int(1)) / Expr::int(4)));
        assert_eq!(cos, expected);

        // sin(-π/2) = -1
        let sin = simplify(&(Expr::ratio(-1, 2) * &pi).sin());
        assert_eq!(sin.as_rational(), Some(&rational(-1, 1)));
    }

    #[test]
    fn test_unknown_trig_stays_symbolic() {
        let s = simplify(&(Expr::ratio(1, 7) * Expr::pi()).cos());
        assert!(matches!(s.node(), Node::Cos(_)));
        let s = simplify(&m().sin());
        assert!(matches!(s.node(), Node::Sin(_)));
    }

    #[test]
    fn test_idempotent_on_mixed_expression() {
        let x = m();
        let root = (Expr::int(1) - x.powi(2)).sqrt();
        let e = (&x * &root + Expr::int(2) * Expr::int(5).sqrt())
            / (Expr::int(8) + &root * &x.powi(2))
            - (Expr::ratio(2, 5) * Expr::pi()).sin() * &root;
        let once = simplify(&e);
        let twice = simplify(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zero_reciprocal_survives() {
        let e = Expr::int(3) * Expr::zero().recip();
        let s = simplify(&e);
        assert!(!s.is_zero());
        assert_eq!(simplify(&s), s);
    }
}
