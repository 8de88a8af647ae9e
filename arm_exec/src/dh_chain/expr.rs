//! Symbolic expressions over joint variables and link constants
//!
//! Entries of a DH transform are held as small expression trees. Two passes are provided over
//! them:
//!
//! - `simplify` rewrites an expression into a canonical sum of products over symbols, `pi` and
//!   sine/cosine atoms, then applies exact trigonometric identities. Transcendental functions
//!   are never evaluated except at integer multiples of `pi/2`, so no numeric approximation is
//!   introduced.
//! - `eval` computes the numeric value of the expression given bindings for its symbols.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::iter::Peekable;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::{Chars, FromStr};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Numeric values for the free symbols of an expression.
pub type Bindings = HashMap<String, f64>;

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric constant.
    Const(f64),

    /// The constant pi, kept symbolic so that `sin(pi/2)` reduces exactly.
    Pi,

    /// A free symbol, such as `theta_1`.
    Sym(String),

    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
}

/// Coefficient type of the canonical form, ordered so that it can key maps.
type Coeff = OrderedFloat<f64>;

/// An indivisible factor of a canonical monomial.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Atom {
    Pi,
    Sym(String),
    Sin(Poly),
    Cos(Poly),
}

/// Product of atoms raised to positive integer powers.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Monomial(BTreeMap<Atom, u32>);

/// Canonical sum of products. Zero coefficients are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Poly(BTreeMap<Monomial, Coeff>);

/// Kind of trigonometric function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trig {
    Sin,
    Cos,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with expressions.
#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("Symbol `{0}` has no numeric binding")]
    UnboundSymbol(String),

    #[error("Cannot parse expression \"{0}\": {1}")]
    ParseError(String, String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Expr {
    /// A numeric constant.
    pub fn num(value: f64) -> Self {
        Expr::Const(value)
    }

    /// A free symbol.
    pub fn sym<S: Into<String>>(name: S) -> Self {
        Expr::Sym(name.into())
    }

    /// The fraction `num/den` of pi, e.g. `Expr::frac_pi(1, 2)` for a right angle.
    pub fn frac_pi(num: i32, den: i32) -> Self {
        Expr::Mul(
            Box::new(Expr::Const(num as f64 / den as f64)),
            Box::new(Expr::Pi),
        )
    }

    pub fn sin(self) -> Self {
        Expr::Sin(Box::new(self))
    }

    pub fn cos(self) -> Self {
        Expr::Cos(Box::new(self))
    }

    /// Return the simplified form of this expression.
    ///
    /// The result is algebraically identical to the input.
    pub fn simplify(&self) -> Expr {
        Poly::from_expr(self).reduce().to_expr()
    }

    /// True if both expressions reduce to the same canonical form.
    pub fn equivalent(&self, other: &Expr) -> bool {
        Poly::from_expr(self)
            .add(&Poly::from_expr(other).neg())
            .reduce()
            .is_zero()
    }

    /// True if the expression is identically zero once simplified.
    pub fn is_zero(&self) -> bool {
        Poly::from_expr(self).reduce().is_zero()
    }

    /// Replace symbols with the expressions given in `map`.
    ///
    /// Symbols not in the map are left free.
    pub fn subs(&self, map: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Const(_) | Expr::Pi => self.clone(),
            Expr::Sym(name) => match map.get(name) {
                Some(e) => e.clone(),
                None => self.clone(),
            },
            Expr::Neg(a) => Expr::Neg(Box::new(a.subs(map))),
            Expr::Add(a, b) => Expr::Add(Box::new(a.subs(map)), Box::new(b.subs(map))),
            Expr::Sub(a, b) => Expr::Sub(Box::new(a.subs(map)), Box::new(b.subs(map))),
            Expr::Mul(a, b) => Expr::Mul(Box::new(a.subs(map)), Box::new(b.subs(map))),
            Expr::Sin(a) => Expr::Sin(Box::new(a.subs(map))),
            Expr::Cos(a) => Expr::Cos(Box::new(a.subs(map))),
        }
    }

    /// Numerically evaluate the expression.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, ExprError> {
        Ok(match self {
            Expr::Const(c) => *c,
            Expr::Pi => std::f64::consts::PI,
            Expr::Sym(name) => match bindings.get(name) {
                Some(v) => *v,
                None => return Err(ExprError::UnboundSymbol(name.clone())),
            },
            Expr::Neg(a) => -a.eval(bindings)?,
            Expr::Add(a, b) => a.eval(bindings)? + b.eval(bindings)?,
            Expr::Sub(a, b) => a.eval(bindings)? - b.eval(bindings)?,
            Expr::Mul(a, b) => a.eval(bindings)? * b.eval(bindings)?,
            Expr::Sin(a) => a.eval(bindings)?.sin(),
            Expr::Cos(a) => a.eval(bindings)?.cos(),
        })
    }

    /// The names of all free symbols in the expression.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<String>) {
        match self {
            Expr::Const(_) | Expr::Pi => (),
            Expr::Sym(name) => {
                symbols.insert(name.clone());
            }
            Expr::Neg(a) | Expr::Sin(a) | Expr::Cos(a) => a.collect_symbols(symbols),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
                a.collect_symbols(symbols);
                b.collect_symbols(symbols);
            }
        }
    }

    /// Binding strength used when printing.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Neg(_) => 2,
            Expr::Const(c) if *c < 0.0 => 2,
            Expr::Mul(..) => 3,
            _ => 4,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        let wrap = self.precedence() < min_prec;
        if wrap {
            write!(f, "(")?;
        }

        match self {
            Expr::Const(c) => write!(f, "{}", c)?,
            Expr::Pi => write!(f, "pi")?,
            Expr::Sym(name) => write!(f, "{}", name)?,
            Expr::Neg(a) => {
                write!(f, "-")?;
                a.fmt_prec(f, 3)?;
            }
            Expr::Add(a, b) => {
                a.fmt_prec(f, 1)?;
                write!(f, " + ")?;
                b.fmt_prec(f, 1)?;
            }
            Expr::Sub(a, b) => {
                a.fmt_prec(f, 1)?;
                write!(f, " - ")?;
                b.fmt_prec(f, 3)?;
            }
            Expr::Mul(a, b) => {
                a.fmt_prec(f, 3)?;
                write!(f, "*")?;
                b.fmt_prec(f, 3)?;
            }
            Expr::Sin(a) => {
                write!(f, "sin(")?;
                a.fmt_prec(f, 0)?;
                write!(f, ")")?;
            }
            Expr::Cos(a) => {
                write!(f, "cos(")?;
                a.fmt_prec(f, 0)?;
                write!(f, ")")?;
            }
        }

        if wrap {
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::Const(0.0)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Parameter files may give either a plain number or an expression string.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(Expr::Const(n)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl FromStr for Expr {
    type Err = ExprError;

    /// Parse an expression such as `r_2*cos(theta_2) + pi/2`.
    ///
    /// Division is only accepted by a constant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            source: s,
            chars: s.chars().peekable(),
        };

        let expr = parser.parse_sum()?;

        parser.skip_whitespace();
        match parser.chars.peek().copied() {
            None => Ok(expr),
            Some(c) => Err(parser.error(format!("unexpected character '{}'", c))),
        }
    }
}

// ---------------------------------------------------------------------------
// PARSER
// ---------------------------------------------------------------------------

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn error<S: Into<String>>(&self, msg: S) -> ExprError {
        ExprError::ParseError(self.source.to_string(), msg.into())
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.chars.peek() == Some(&expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn parse_sum(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_product()?;

        loop {
            if self.eat('+') {
                lhs = lhs + self.parse_product()?;
            } else if self.eat('-') {
                lhs = lhs - self.parse_product()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_product(&mut self) -> Result<Expr, ExprError> {
        // A leading minus negates the whole product
        if self.eat('-') {
            return Ok(-self.parse_product()?);
        }

        let mut lhs = self.parse_unary()?;

        loop {
            if self.eat('*') {
                lhs = lhs * self.parse_unary()?;
            } else if self.eat('/') {
                let rhs = self.parse_unary()?;
                let divisor = match Poly::from_expr(&rhs).as_constant() {
                    Some(d) if d != 0.0 => d,
                    Some(_) => return Err(self.error("division by zero")),
                    None => return Err(self.error("can only divide by a constant")),
                };
                lhs = lhs * Expr::Const(1.0 / divisor);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat('-') {
            Ok(-self.parse_unary()?)
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();

        match self.chars.peek().copied() {
            Some('(') => {
                self.chars.next();
                let inner = self.parse_sum()?;
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        text.push(c);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                text.parse::<f64>()
                    .map(Expr::Const)
                    .map_err(|e| self.error(format!("invalid number {}: {}", text, e)))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        self.chars.next();
                    } else {
                        break;
                    }
                }

                match ident.as_str() {
                    "pi" => Ok(Expr::Pi),
                    "sin" | "cos" => {
                        if !self.eat('(') {
                            return Err(self.error(format!("expected '(' after {}", ident)));
                        }
                        let arg = self.parse_sum()?;
                        if !self.eat(')') {
                            return Err(self.error("expected ')'"));
                        }
                        Ok(if ident == "sin" { arg.sin() } else { arg.cos() })
                    }
                    _ => Ok(Expr::Sym(ident)),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }
}

// ---------------------------------------------------------------------------
// CANONICAL FORM
// ---------------------------------------------------------------------------

impl Monomial {
    fn unit() -> Self {
        Monomial::default()
    }

    fn of(atom: Atom) -> Self {
        let mut m = BTreeMap::new();
        m.insert(atom, 1);
        Monomial(m)
    }

    fn mul(&self, other: &Monomial) -> Monomial {
        let mut out = self.0.clone();
        for (atom, pow) in other.0.iter() {
            *out.entry(atom.clone()).or_insert(0) += pow;
        }
        Monomial(out)
    }

    fn power(&self, atom: &Atom) -> u32 {
        self.0.get(atom).copied().unwrap_or(0)
    }

    /// This monomial with one power of `atom` removed, or `None` if it has none.
    fn without(&self, atom: &Atom) -> Option<Monomial> {
        let mut out = self.0.clone();
        match out.get_mut(atom) {
            Some(p) if *p > 1 => *p -= 1,
            Some(_) => {
                out.remove(atom);
            }
            None => return None,
        }
        Some(Monomial(out))
    }

    fn with(&self, atom: &Atom) -> Monomial {
        let mut out = self.0.clone();
        *out.entry(atom.clone()).or_insert(0) += 1;
        Monomial(out)
    }

    /// True if the monomial involves anything other than pi.
    fn is_variable(&self) -> bool {
        self.0.keys().any(|a| *a != Atom::Pi)
    }
}

impl Poly {
    fn constant(value: f64) -> Poly {
        let mut p = Poly::default();
        p.add_term(Monomial::unit(), value);
        p
    }

    fn atom(atom: Atom) -> Poly {
        let mut p = Poly::default();
        p.add_term(Monomial::of(atom), 1.0);
        p
    }

    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    fn coeff(&self, mono: &Monomial) -> f64 {
        self.0.get(mono).map(|c| c.into_inner()).unwrap_or(0.0)
    }

    fn as_constant(&self) -> Option<f64> {
        match self.0.len() {
            0 => Some(0.0),
            1 => self.0.get(&Monomial::unit()).map(|c| c.into_inner()),
            _ => None,
        }
    }

    fn add_term(&mut self, mono: Monomial, coeff: f64) {
        let sum = self.coeff(&mono) + coeff;
        if sum == 0.0 {
            self.0.remove(&mono);
        } else {
            self.0.insert(mono, OrderedFloat(sum));
        }
    }

    fn add(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (mono, c) in other.0.iter() {
            out.add_term(mono.clone(), c.into_inner());
        }
        out
    }

    fn neg(&self) -> Poly {
        self.scale(-1.0)
    }

    fn scale(&self, factor: f64) -> Poly {
        let mut out = Poly::default();
        for (mono, c) in self.0.iter() {
            out.add_term(mono.clone(), c.into_inner() * factor);
        }
        out
    }

    fn mul(&self, other: &Poly) -> Poly {
        let mut out = Poly::default();
        for (ma, ca) in self.0.iter() {
            for (mb, cb) in other.0.iter() {
                out.add_term(ma.mul(mb), ca.into_inner() * cb.into_inner());
            }
        }
        out
    }

    fn from_expr(expr: &Expr) -> Poly {
        match expr {
            Expr::Const(c) => Poly::constant(*c),
            Expr::Pi => Poly::atom(Atom::Pi),
            Expr::Sym(name) => Poly::atom(Atom::Sym(name.clone())),
            Expr::Neg(a) => Poly::from_expr(a).neg(),
            Expr::Add(a, b) => Poly::from_expr(a).add(&Poly::from_expr(b)),
            Expr::Sub(a, b) => Poly::from_expr(a).add(&Poly::from_expr(b).neg()),
            Expr::Mul(a, b) => Poly::from_expr(a).mul(&Poly::from_expr(b)),
            Expr::Sin(a) => Poly::trig(Trig::Sin, Poly::from_expr(a)),
            Expr::Cos(a) => Poly::trig(Trig::Cos, Poly::from_expr(a)),
        }
    }

    /// Canonical sine or cosine of `arg`.
    ///
    /// Whole quarter turns of pi are removed from the argument, then the argument's sign is
    /// normalised so that its leading symbolic term is positive. A vanishing argument gives the
    /// exact value.
    fn trig(kind: Trig, arg: Poly) -> Poly {
        let pi_mono = Monomial::of(Atom::Pi);
        let pi_coeff = arg.coeff(&pi_mono);
        let quarter_turns = 2.0 * pi_coeff;

        let (kind, mut sign, mut arg) = if quarter_turns.fract() == 0.0 {
            let mut rest = arg.clone();
            rest.0.remove(&pi_mono);
            match (kind, (quarter_turns as i64).rem_euclid(4)) {
                (Trig::Sin, 0) => (Trig::Sin, 1.0, rest),
                (Trig::Sin, 1) => (Trig::Cos, 1.0, rest),
                (Trig::Sin, 2) => (Trig::Sin, -1.0, rest),
                (Trig::Sin, _) => (Trig::Cos, -1.0, rest),
                (Trig::Cos, 0) => (Trig::Cos, 1.0, rest),
                (Trig::Cos, 1) => (Trig::Sin, -1.0, rest),
                (Trig::Cos, 2) => (Trig::Cos, -1.0, rest),
                (Trig::Cos, _) => (Trig::Sin, 1.0, rest),
            }
        } else {
            (kind, 1.0, arg)
        };

        if arg.is_zero() {
            return match kind {
                Trig::Sin => Poly::default(),
                Trig::Cos => Poly::constant(sign),
            };
        }

        let leading = arg
            .0
            .iter()
            .find(|(m, _)| m.is_variable())
            .or_else(|| arg.0.iter().next())
            .map(|(_, c)| c.into_inner())
            .unwrap_or(0.0);

        if leading < 0.0 {
            arg = arg.neg();
            if kind == Trig::Sin {
                sign = -sign;
            }
        }

        let atom = match kind {
            Trig::Sin => Atom::Sin(arg),
            Trig::Cos => Atom::Cos(arg),
        };

        Poly::atom(atom).scale(sign)
    }

    /// Apply trigonometric identities until none match.
    ///
    /// Every rewrite merges two terms into one, so this terminates.
    fn reduce(mut self) -> Poly {
        while let Some(next) = self.rewrite_once() {
            self = next;
        }
        self
    }

    fn rewrite_once(&self) -> Option<Poly> {
        for (mono, c) in self.0.iter() {
            let c = c.into_inner();
            if let Some(p) = self.rewrite_pythagorean(mono, c) {
                return Some(p);
            }
            if let Some(p) = self.rewrite_angle_sum(mono, c) {
                return Some(p);
            }
        }
        None
    }

    /// `c*m*sin(a)^2 + c*m*cos(a)^2 = c*m`
    fn rewrite_pythagorean(&self, mono: &Monomial, c: f64) -> Option<Poly> {
        for atom in mono.0.keys() {
            let arg = match atom {
                Atom::Sin(arg) => arg,
                _ => continue,
            };
            if mono.power(atom) < 2 {
                continue;
            }

            let cos = Atom::Cos(arg.clone());
            let rest = mono.without(atom)?.without(atom)?;
            let partner = rest.with(&cos).with(&cos);

            if self.coeff(&partner) == c {
                let mut out = self.clone();
                out.0.remove(mono);
                out.0.remove(&partner);
                out.add_term(rest, c);
                return Some(out);
            }
        }
        None
    }

    /// Angle sum and difference identities:
    ///
    /// - `cos(a)cos(b) - sin(a)sin(b) = cos(a + b)`
    /// - `cos(a)cos(b) + sin(a)sin(b) = cos(a - b)`
    /// - `sin(a)cos(b) + cos(a)sin(b) = sin(a + b)`
    /// - `sin(a)cos(b) - cos(a)sin(b) = sin(a - b)`
    fn rewrite_angle_sum(&self, mono: &Monomial, c: f64) -> Option<Poly> {
        let atoms: Vec<&Atom> = mono.0.keys().collect();

        for (i, first) in atoms.iter().enumerate() {
            for second in atoms.iter().skip(i + 1) {
                let (kind, a, b) = match (first, second) {
                    (Atom::Cos(a), Atom::Cos(b)) => (Trig::Cos, a, b),
                    (Atom::Sin(a), Atom::Cos(b)) => (Trig::Sin, a, b),
                    (Atom::Cos(b), Atom::Sin(a)) => (Trig::Sin, a, b),
                    _ => continue,
                };

                let rest = mono.without(first)?.without(second)?;
                let partner = match kind {
                    Trig::Cos => rest
                        .with(&Atom::Sin(a.clone()))
                        .with(&Atom::Sin(b.clone())),
                    Trig::Sin => rest
                        .with(&Atom::Cos(a.clone()))
                        .with(&Atom::Sin(b.clone())),
                };
                if partner == *mono {
                    continue;
                }

                let partner_c = self.coeff(&partner);
                let angle = match (kind, partner_c) {
                    (Trig::Cos, pc) if pc == -c => a.add(b),
                    (Trig::Cos, pc) if pc == c => a.add(&b.neg()),
                    (Trig::Sin, pc) if pc == c => a.add(b),
                    (Trig::Sin, pc) if pc == -c => a.add(&b.neg()),
                    _ => continue,
                };

                let mut out = self.clone();
                out.0.remove(mono);
                out.0.remove(&partner);

                let mut rest_poly = Poly::default();
                rest_poly.add_term(rest, c);
                let replacement = rest_poly.mul(&Poly::trig(kind, angle));

                return Some(out.add(&replacement));
            }
        }
        None
    }

    fn to_expr(&self) -> Expr {
        let mut acc: Option<Expr> = None;

        for (mono, c) in self.0.iter() {
            let c = c.into_inner();
            let magnitude = mono.to_expr_scaled(c.abs());

            acc = Some(match acc {
                None if mono.0.is_empty() => Expr::Const(c),
                None if c < 0.0 => -magnitude,
                None => magnitude,
                Some(a) if c < 0.0 => a - magnitude,
                Some(a) => a + magnitude,
            });
        }

        acc.unwrap_or(Expr::Const(0.0))
    }
}

impl Monomial {
    /// Expression for `coeff * self`, omitting a unit coefficient.
    fn to_expr_scaled(&self, coeff: f64) -> Expr {
        let mut factors: Vec<Expr> = Vec::new();

        if coeff != 1.0 || self.0.is_empty() {
            factors.push(Expr::Const(coeff));
        }

        for (atom, pow) in self.0.iter() {
            let factor = match atom {
                Atom::Pi => Expr::Pi,
                Atom::Sym(name) => Expr::Sym(name.clone()),
                Atom::Sin(arg) => arg.to_expr().sin(),
                Atom::Cos(arg) => arg.to_expr().cos(),
            };
            for _ in 0..*pow {
                factors.push(factor.clone());
            }
        }

        let mut iter = factors.into_iter();
        let first = iter.next().unwrap_or(Expr::Const(1.0));
        iter.fold(first, |acc, f| acc * f)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn parse(s: &str) -> Expr {
        s.parse().unwrap()
    }

    #[test]
    fn test_exact_quarter_turns() {
        assert_eq!(Expr::frac_pi(1, 2).sin().simplify(), Expr::Const(1.0));
        assert!(Expr::frac_pi(1, 2).cos().simplify().is_zero());
        assert_eq!(Expr::Pi.cos().simplify(), Expr::Const(-1.0));
        assert!(parse("sin(pi)").is_zero());
        assert!(parse("sin(0)").is_zero());
        assert_eq!(parse("cos(0)").simplify(), Expr::Const(1.0));
    }

    #[test]
    fn test_shifted_arguments() {
        assert!(parse("sin(x + pi/2)").equivalent(&parse("cos(x)")));
        assert!(parse("cos(x + pi/2)").equivalent(&parse("-sin(x)")));
        assert!(parse("sin(x + pi)").equivalent(&parse("-sin(x)")));
        assert!(parse("cos(x - 3*pi/2)").equivalent(&parse("-sin(x)")));
    }

    #[test]
    fn test_symmetry() {
        assert!(parse("sin(-x)").equivalent(&parse("-sin(x)")));
        assert!(parse("cos(-x)").equivalent(&parse("cos(x)")));
        assert!(parse("cos(b - a)").equivalent(&parse("cos(a - b)")));
    }

    #[test]
    fn test_no_numeric_approximation() {
        // Only quarter turns of pi are evaluated
        let e = parse("sin(0.3)").simplify();
        assert_eq!(e, Expr::Const(0.3).sin());

        let e = parse("cos(pi/4)").simplify();
        assert!(!e.is_zero());
        assert_eq!(e.free_symbols().len(), 0);
    }

    #[test]
    fn test_pythagorean() {
        assert_eq!(parse("sin(x)*sin(x) + cos(x)*cos(x)").simplify(), Expr::Const(1.0));
        assert!(parse("r*sin(x)*sin(x) + r*cos(x)*cos(x)").equivalent(&parse("r")));
    }

    #[test]
    fn test_angle_sums() {
        let e = parse("cos(a)*cos(b) - sin(a)*sin(b)").simplify();
        assert_eq!(e, parse("cos(a + b)").simplify());

        let e = parse("sin(a)*cos(b) + cos(a)*sin(b)").simplify();
        assert_eq!(e, parse("sin(a + b)").simplify());

        assert!(parse("cos(a)*cos(b) + sin(a)*sin(b)").equivalent(&parse("cos(a - b)")));
        assert!(parse("sin(a)*cos(b) - cos(a)*sin(b)").equivalent(&parse("sin(a - b)")));

        // Common factors are carried through
        let e = parse("c*cos(a)*cos(b)*2 - 2*c*sin(a)*sin(b)").simplify();
        assert_eq!(e, parse("2*c*cos(a + b)").simplify());
    }

    #[test]
    fn test_simplify_preserves_value() {
        let e = parse("cos(t1)*(cos(t2)*cos(t3) - sin(t2)*sin(t3)) + cos(t1)*cos(t2)");
        let s = e.simplify();

        let mut b = Bindings::new();
        b.insert("t1".into(), 0.3);
        b.insert("t2".into(), -1.1);
        b.insert("t3".into(), 2.4);

        approx::assert_relative_eq!(e.eval(&b).unwrap(), s.eval(&b).unwrap(), epsilon = 1e-12);
        assert_eq!(s.to_string(), "cos(t1)*cos(t2) + cos(t1)*cos(t2 + t3)");
    }

    #[test]
    fn test_eval_unbound() {
        let e = parse("r_2*cos(theta_2)");
        let mut b = Bindings::new();
        b.insert("theta_2".into(), 0.0);

        assert_eq!(e.eval(&b), Err(ExprError::UnboundSymbol("r_2".into())));

        b.insert("r_2".into(), 2.0);
        assert_eq!(e.eval(&b), Ok(2.0));
    }

    #[test]
    fn test_subs() {
        let mut map = HashMap::new();
        map.insert("alpha_i".to_string(), Expr::frac_pi(1, 2));

        let e = parse("sin(theta_i)*cos(alpha_i)").subs(&map);
        assert!(e.is_zero());
        assert_eq!(e.free_symbols().into_iter().collect::<Vec<_>>(), vec!["theta_i"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("1 / x".parse::<Expr>(), Err(ExprError::ParseError(..))));
        assert!(matches!("sin x".parse::<Expr>(), Err(ExprError::ParseError(..))));
        assert!(matches!("(a + b".parse::<Expr>(), Err(ExprError::ParseError(..))));
        assert!(matches!("a $ b".parse::<Expr>(), Err(ExprError::ParseError(..))));
        assert!(matches!("1 / 0".parse::<Expr>(), Err(ExprError::ParseError(..))));

        // Input left over after a complete expression
        assert!(matches!("a b".parse::<Expr>(), Err(ExprError::ParseError(..))));
        assert!(matches!("theta_1)".parse::<Expr>(), Err(ExprError::ParseError(..))));
    }

    #[test]
    fn test_display() {
        assert_eq!(parse("-(a + b)*c").to_string(), "-(a + b)*c");
        assert_eq!(parse("a - (b - c)").to_string(), "a - (b - c)");
        assert_eq!(parse("2*-x").to_string(), "2*(-x)");
    }
}
