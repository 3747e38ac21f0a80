//! Symbolic expressions over exact rationals
//!
//! An [`Expr`] is an immutable, reference-counted expression DAG. Cloning is
//! cheap and sub-expressions are shared freely between matrix entries, which
//! keeps composed isometries small even before simplification.
//!
//! Constructors and operators only do cheap local folding (`x + 0`, `x * 1`,
//! `x * 0`, rational constant arithmetic, flattening). The canonical normal
//! form lives in [`simplify`].

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

pub mod eval;
pub mod simplify;

pub use eval::{evaluate, Bindings, Evaluator};
pub use simplify::{simplify, Simplifier};

/// Exact rational coefficient type
pub type Rational = BigRational;

/// Build an exact rational `numer / denom`
pub fn rational(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

/// A named free variable
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expression node
///
/// Square roots are `Pow(x, 1/2)`; reciprocals are `Pow(x, -1)`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Node {
    /// Exact rational constant
    Num(Rational),
    /// Free variable
    Sym(Symbol),
    /// The constant π
    Pi,
    /// Sum of two or more terms
    Add(Vec<Expr>),
    /// Product of two or more factors
    Mul(Vec<Expr>),
    /// Power with an exact rational exponent
    Pow(Expr, Rational),
    Sin(Expr),
    Cos(Expr),
}

/// Shared handle to an expression node
#[derive(Clone)]
pub struct Expr(Rc<Node>);

impl Expr {
    pub fn from_node(node: Node) -> Self {
        Self(Rc::new(node))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Address of the shared node, used as a memoization key
    pub(crate) fn as_ptr(&self) -> *const Node {
        Rc::as_ptr(&self.0)
    }

    pub fn num(value: Rational) -> Self {
        Self::from_node(Node::Num(value))
    }

    pub fn int(value: i64) -> Self {
        Self::num(Rational::from_integer(BigInt::from(value)))
    }

    pub fn ratio(numer: i64, denom: i64) -> Self {
        Self::num(rational(numer, denom))
    }

    pub fn zero() -> Self {
        Self::int(0)
    }

    pub fn one() -> Self {
        Self::int(1)
    }

    pub fn symbol(symbol: &Symbol) -> Self {
        Self::from_node(Node::Sym(symbol.clone()))
    }

    pub fn pi() -> Self {
        Self::from_node(Node::Pi)
    }

    /// The exact value, if this is a rational constant
    pub fn as_rational(&self) -> Option<&Rational> {
        match self.node() {
            Node::Num(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_rational().is_some_and(Zero::is_zero)
    }

    pub fn is_one(&self) -> bool {
        self.as_rational().is_some_and(One::is_one)
    }

    /// `self ^ exponent`
    pub fn pow(&self, exponent: Rational) -> Self {
        if exponent.is_zero() {
            return Self::one();
        }
        if exponent.is_one() {
            return self.clone();
        }
        if let Some(base) = self.as_rational() {
            if exponent.is_integer() && !(base.is_zero() && exponent.is_negative()) {
                if let Some(value) = rational_powi(base, &exponent) {
                    return Self::num(value);
                }
            }
        }
        Self::from_node(Node::Pow(self.clone(), exponent))
    }

    pub fn powi(&self, exponent: i64) -> Self {
        self.pow(Rational::from_integer(BigInt::from(exponent)))
    }

    /// Principal square root
    pub fn sqrt(&self) -> Self {
        self.pow(rational(1, 2))
    }

    pub fn recip(&self) -> Self {
        self.powi(-1)
    }

    pub fn sin(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self::from_node(Node::Sin(self.clone()))
    }

    pub fn cos(&self) -> Self {
        if self.is_zero() {
            return Self::one();
        }
        Self::from_node(Node::Cos(self.clone()))
    }

    /// Returns true if `symbol` occurs anywhere in the expression
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        let mut seen = HashSet::new();
        self.any_node(&mut seen, &|node| matches!(node, Node::Sym(s) if s == symbol))
    }

    /// Number of distinct shared nodes in the DAG
    pub fn node_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.any_node(&mut seen, &|_| false);
        seen.len()
    }

    fn any_node(&self, seen: &mut HashSet<*const Node>, pred: &dyn Fn(&Node) -> bool) -> bool {
        if !seen.insert(self.as_ptr()) {
            return false;
        }
        if pred(self.node()) {
            return true;
        }
        match self.node() {
            Node::Num(_) | Node::Sym(_) | Node::Pi => false,
            Node::Add(children) | Node::Mul(children) => {
                children.iter().any(|c| c.any_node(seen, pred))
            }
            Node::Pow(base, _) => base.any_node(seen, pred),
            Node::Sin(arg) | Node::Cos(arg) => arg.any_node(seen, pred),
        }
    }

    fn add_expr(&self, rhs: &Expr) -> Expr {
        if self.is_zero() {
            return rhs.clone();
        }
        if rhs.is_zero() {
            return self.clone();
        }
        if let (Some(a), Some(b)) = (self.as_rational(), rhs.as_rational()) {
            return Expr::num(a + b);
        }
        let mut terms = Vec::new();
        for side in [self, rhs] {
            match side.node() {
                Node::Add(children) => terms.extend(children.iter().cloned()),
                _ => terms.push(side.clone()),
            }
        }
        Expr::from_node(Node::Add(terms))
    }

    fn mul_expr(&self, rhs: &Expr) -> Expr {
        if self.is_zero() || rhs.is_zero() {
            return Expr::zero();
        }
        if self.is_one() {
            return rhs.clone();
        }
        if rhs.is_one() {
            return self.clone();
        }
        if let (Some(a), Some(b)) = (self.as_rational(), rhs.as_rational()) {
            return Expr::num(a * b);
        }
        let mut factors = Vec::new();
        for side in [self, rhs] {
            match side.node() {
                Node::Mul(children) => factors.extend(children.iter().cloned()),
                _ => factors.push(side.clone()),
            }
        }
        Expr::from_node(Node::Mul(factors))
    }

    fn neg_expr(&self) -> Expr {
        match self.as_rational() {
            Some(r) => Expr::num(-r),
            None => Expr::int(-1).mul_expr(self),
        }
    }
}

/// Exact integer power of a rational; `None` for `0^-n`
pub(crate) fn rational_powi(base: &Rational, exponent: &Rational) -> Option<Rational> {
    let n = exponent.to_integer();
    let magnitude = n.magnitude().to_u32()?;
    if base.is_zero() && n.is_negative() {
        return None;
    }
    let raised = num_traits::pow::pow(base.clone(), magnitude as usize);
    if n.is_negative() {
        Some(raised.recip())
    } else {
        Some(raised)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Expr {}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        if Rc::ptr_eq(&self.0, &other.0) {
            Ordering::Equal
        } else {
            self.0.as_ref().cmp(other.0.as_ref())
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// Binding strength used to decide where parentheses go.
const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;

impl Expr {
    fn precedence(&self) -> u8 {
        match self.node() {
            Node::Add(_) => PREC_ADD,
            Node::Mul(_) => PREC_MUL,
            Node::Num(r) if r.is_negative() || !r.is_integer() => PREC_ADD,
            Node::Pow(_, e) if *e == rational(1, 2) => u8::MAX,
            Node::Pow(..) => PREC_POW,
            _ => u8::MAX,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        if self.precedence() <= parent {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Num(r) => write!(f, "{}", r),
            Node::Sym(s) => write!(f, "{}", s),
            Node::Pi => f.write_str("pi"),
            Node::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
            Node::Mul(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    factor.fmt_child(f, PREC_MUL - 1)?;
                }
                Ok(())
            }
            Node::Pow(base, e) if *e == rational(1, 2) => write!(f, "sqrt({})", base),
            Node::Pow(base, e) => {
                base.fmt_child(f, PREC_POW)?;
                if e.is_integer() && !e.is_negative() {
                    write!(f, "^{}", e)
                } else {
                    write!(f, "^({})", e)
                }
            }
            Node::Sin(arg) => write!(f, "sin({})", arg),
            Node::Cos(arg) => write!(f, "cos({})", arg),
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Expr::num(value)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::symbol(symbol)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $body:expr) => {
        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                let f: fn(&Expr, &Expr) -> Expr = $body;
                f(self, rhs)
            }
        }

        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                (&self).$method(rhs)
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                self.$method(&rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, |a, b| a.add_expr(b));
impl_binary_op!(Sub, sub, |a, b| a.add_expr(&b.neg_expr()));
impl_binary_op!(Mul, mul, |a, b| a.mul_expr(b));
impl_binary_op!(Div, div, |a, b| a.mul_expr(&b.recip()));

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.neg_expr()
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.neg_expr()
    }
}
