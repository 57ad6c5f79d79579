//! Sparse multilinear pseudo-Boolean polynomials.
//!
//! A [`Poly`] maps monomials ([`Term`]s) to coefficients ([`Coeff`]s). Every
//! mutation keeps the map canonical: set-equal monomials share one entry and
//! cancelled coefficients are removed immediately.
//!
//! Since every variable is Boolean, the multilinear form of a pseudo-Boolean
//! function is unique. Two polynomials are equal as maps exactly when they
//! agree on every 0/1 assignment, which is what makes structural equality a
//! sound semantic check (see [`Poly::is_boolean_valued`]).
//!
//! # Examples
//!
//! ```
//! use num_rational::BigRational;
//! use pcbo_rs::poly::Poly;
//! use pcbo_rs::types::assignment;
//!
//! let x = Poly::var("x");
//! let y = Poly::var("y");
//!
//! // (x + y)^2 = x + y + 2xy, because x^2 = x.
//! let p = (&x + &y).pow(2);
//! assert_eq!(p, &x + &y + Poly::from(2) * &x * &y);
//!
//! let value = p.value(&assignment([("x", 1), ("y", 1)])).unwrap();
//! assert_eq!(value, BigRational::from_integer(4.into()));
//! ```

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use log::debug;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::coeff::{Coeff, Symbol};
use crate::error::{Error, Result};
use crate::term::Term;
use crate::types::{Assignment, Var};

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Poly {
    terms: BTreeMap<Term, Coeff>,
}

// Constructors
impl Poly {
    pub fn zero() -> Self {
        Poly::default()
    }

    pub fn constant(c: impl Into<Coeff>) -> Self {
        Poly::monomial(Term::one(), c)
    }

    pub fn var(v: impl Into<Var>) -> Self {
        Poly::monomial(Term::var(v), Coeff::one())
    }

    pub fn monomial(term: Term, c: impl Into<Coeff>) -> Self {
        let mut p = Poly::zero();
        p.add_term(term, c.into());
        p
    }

    pub fn from_terms(terms: impl IntoIterator<Item = (Term, Coeff)>) -> Self {
        let mut p = Poly::zero();
        for (t, c) in terms {
            p.add_term(t, c);
        }
        p
    }

    /// Adds `c * term` in place, keeping the map canonical.
    pub fn add_term(&mut self, term: Term, c: Coeff) {
        if c.is_zero() {
            return;
        }
        match self.terms.entry(term) {
            Entry::Vacant(e) => {
                e.insert(c);
            }
            Entry::Occupied(mut e) => {
                *e.get_mut() += c;
                if e.get().is_zero() {
                    e.remove();
                }
            }
        }
    }
}

// Getters
impl Poly {
    pub fn terms(&self) -> impl Iterator<Item = (&Term, &Coeff)> {
        self.terms.iter()
    }

    pub fn coeff(&self, term: &Term) -> Coeff {
        self.terms.get(term).cloned().unwrap_or_default()
    }

    /// The coefficient of the empty monomial.
    pub fn offset(&self) -> Coeff {
        self.coeff(&Term::one())
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Size of the largest monomial, `0` for constants.
    pub fn degree(&self) -> usize {
        self.terms.keys().map(Term::degree).max().unwrap_or(0)
    }

    pub fn variables(&self) -> BTreeSet<Var> {
        self.terms.keys().flat_map(|t| t.vars().iter().cloned()).collect()
    }

    pub fn num_variables(&self) -> usize {
        self.variables().len()
    }

    /// All parameters occurring in any coefficient.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.terms.values().flat_map(|c| c.symbols()).collect()
    }

    pub fn is_numeric(&self) -> bool {
        self.terms.values().all(Coeff::is_number)
    }

    /// Fails with the first unresolved parameter, if any.
    pub fn check_numeric(&self) -> Result<()> {
        match self.symbols().into_iter().next() {
            Some(s) => Err(Error::UnresolvedParameter(s)),
            None => Ok(()),
        }
    }

    /// Lower and upper bounds on the achievable value.
    ///
    /// The bounds are the offset plus the sums of negative and positive
    /// coefficients respectively. They are tight for linear polynomials and
    /// safe (possibly loose) otherwise. Returns `None` for symbolic
    /// coefficients.
    pub fn bounds(&self) -> Option<(BigRational, BigRational)> {
        let mut lo = BigRational::zero();
        let mut hi = BigRational::zero();
        for (t, c) in &self.terms {
            let c = c.to_number()?;
            if t.is_constant() {
                lo += &c;
                hi += &c;
            } else if c.is_negative() {
                lo += &c;
            } else {
                hi += &c;
            }
        }
        Some((lo, hi))
    }
}

// Algebra
impl Poly {
    pub fn scale(&self, c: &Coeff) -> Poly {
        Poly::from_terms(self.terms.iter().map(|(t, d)| (t.clone(), d * c)))
    }

    pub fn pow(&self, exp: u32) -> Poly {
        let mut res = Poly::constant(1);
        for _ in 0..exp {
            res = &res * self;
        }
        res
    }

    /// Returns `true` iff the polynomial is 0/1-valued on every assignment.
    ///
    /// By uniqueness of the multilinear form this is exactly `p * p == p`.
    pub fn is_boolean_valued(&self) -> bool {
        &(self * self) == self
    }

    /// Evaluates at `assignment`, which must cover every variable.
    pub fn eval(&self, assignment: &Assignment) -> Result<Coeff> {
        let mut res = Coeff::zero();
        for (t, c) in &self.terms {
            if t.eval(assignment)? {
                res += c;
            }
        }
        Ok(res)
    }

    /// Numeric value at `assignment`.
    pub fn value(&self, assignment: &Assignment) -> Result<BigRational> {
        self.eval(assignment)?.try_number()
    }

    /// Replaces `v` with `replacement` and re-simplifies.
    ///
    /// The replacement must be 0/1-valued (a constant `0`/`1` or any
    /// polynomial `p` with `p * p == p`), otherwise the result would no
    /// longer be a function of Boolean variables.
    pub fn subs(&self, v: &Var, replacement: &Poly) -> Result<Poly> {
        if !replacement.is_boolean_valued() {
            return Err(Error::InvalidSubstitution {
                var: v.clone(),
                reason: format!("{} is not 0/1-valued", replacement),
            });
        }
        let mut res = Poly::zero();
        for (t, c) in &self.terms {
            if t.contains(v) {
                let rest = Poly::monomial(t.without(v), c.clone());
                res += &rest * replacement;
            } else {
                res.add_term(t.clone(), c.clone());
            }
        }
        debug!("subs({} <- {}): {} terms -> {} terms", v, replacement, self.num_terms(), res.num_terms());
        Ok(res)
    }

    /// Fixes `v` to a Boolean value.
    pub fn fix(&self, v: &Var, value: bool) -> Poly {
        let mut res = Poly::zero();
        for (t, c) in &self.terms {
            if t.contains(v) {
                if value {
                    res.add_term(t.without(v), c.clone());
                }
            } else {
                res.add_term(t.clone(), c.clone());
            }
        }
        res
    }

    /// Returns a new polynomial with `symbol` replaced by `value` in every
    /// coefficient.
    pub fn resolve(&self, symbol: &Symbol, value: &BigRational) -> Poly {
        Poly::from_terms(
            self.terms
                .iter()
                .map(|(t, c)| (t.clone(), c.substitute(symbol, value))),
        )
    }
}

impl From<Coeff> for Poly {
    fn from(c: Coeff) -> Self {
        Poly::constant(c)
    }
}

impl From<i64> for Poly {
    fn from(c: i64) -> Self {
        Poly::constant(c)
    }
}

impl From<i32> for Poly {
    fn from(c: i32) -> Self {
        Poly::constant(c)
    }
}

impl From<Var> for Poly {
    fn from(v: Var) -> Self {
        Poly::var(v)
    }
}

impl From<&Var> for Poly {
    fn from(v: &Var) -> Self {
        Poly::var(v.clone())
    }
}

impl From<Term> for Poly {
    fn from(t: Term) -> Self {
        Poly::monomial(t, Coeff::one())
    }
}

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, rhs: &Poly) {
        for (t, c) in &rhs.terms {
            self.add_term(t.clone(), c.clone());
        }
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, rhs: &Poly) {
        for (t, c) in &rhs.terms {
            self.add_term(t.clone(), -c);
        }
    }
}

impl MulAssign<&Poly> for Poly {
    fn mul_assign(&mut self, rhs: &Poly) {
        *self = &*self * rhs;
    }
}

impl MulAssign<&Coeff> for Poly {
    fn mul_assign(&mut self, rhs: &Coeff) {
        *self = self.scale(rhs);
    }
}

impl Add<&Poly> for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let mut res = self.clone();
        res += rhs;
        res
    }
}

impl Sub<&Poly> for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        let mut res = self.clone();
        res -= rhs;
        res
    }
}

impl Mul<&Poly> for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        let mut res = Poly::zero();
        for (ta, ca) in &self.terms {
            for (tb, cb) in &rhs.terms {
                res.add_term(ta.union(tb), ca * cb);
            }
        }
        res
    }
}

impl Mul<&Coeff> for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Coeff) -> Poly {
        self.scale(rhs)
    }
}

impl Mul<Coeff> for Poly {
    type Output = Poly;

    fn mul(self, rhs: Coeff) -> Poly {
        self.scale(&rhs)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        self.scale(&Coeff::from(-1))
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<Poly> for Poly {
            type Output = Poly;

            fn $method(self, rhs: Poly) -> Poly {
                (&self).$method(&rhs)
            }
        }

        impl $imp<&Poly> for Poly {
            type Output = Poly;

            fn $method(self, rhs: &Poly) -> Poly {
                (&self).$method(rhs)
            }
        }

        impl $imp<Poly> for &Poly {
            type Output = Poly;

            fn $method(self, rhs: Poly) -> Poly {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl AddAssign<Poly> for Poly {
    fn add_assign(&mut self, rhs: Poly) {
        *self += &rhs;
    }
}

impl SubAssign<Poly> for Poly {
    fn sub_assign(&mut self, rhs: Poly) {
        *self -= &rhs;
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (t, c)) in self.terms.iter().enumerate() {
            match c.to_number() {
                Some(n) => {
                    let sign = if n.is_negative() { "-" } else { "+" };
                    if i == 0 {
                        if n.is_negative() {
                            write!(f, "-")?;
                        }
                    } else {
                        write!(f, " {} ", sign)?;
                    }
                    let n = n.abs();
                    if t.is_constant() {
                        write!(f, "{}", n)?;
                    } else if n.is_one() {
                        write!(f, "{}", t)?;
                    } else {
                        write!(f, "{}*{}", n, t)?;
                    }
                }
                None => {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    if t.is_constant() {
                        write!(f, "({})", c)?;
                    } else {
                        write!(f, "({})*{}", c, t)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::assignment;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    #[test]
    fn test_add_cancels() {
        let x = Poly::var("x");
        let p = &x - &x;
        assert!(p.is_zero());
        assert_eq!(p.degree(), 0);
        assert_eq!(p.to_string(), "0");
    }

    #[test]
    fn test_mul_idempotent() {
        let x = Poly::var("x");
        let y = Poly::var("y");
        assert_eq!(&x * &x, x);
        let xy = &x * &y;
        assert_eq!(&xy * &x, xy);
        assert_eq!(xy.degree(), 2);
    }

    #[test]
    fn test_square_of_difference() {
        // (z - x)^2 = z + x - 2xz
        let x = Poly::var("x");
        let z = Poly::var("z");
        let p = (&z - &x).pow(2);
        let expected = &z + &x - Poly::from(2) * &x * &z;
        assert_eq!(p, expected);
    }

    #[test]
    fn test_eval_and_missing_variable() {
        let p = Poly::from(3) * Poly::var("x") * Poly::var("y") - Poly::var("x") + Poly::from(1);
        assert_eq!(p.value(&assignment([("x", 1), ("y", 1)])), Ok(rat(3)));
        assert_eq!(p.value(&assignment([("x", 1), ("y", 0)])), Ok(rat(0)));
        assert_eq!(p.value(&assignment([("x", 0), ("y", 0)])), Ok(rat(1)));
        assert_eq!(
            p.value(&assignment([("x", 1)])),
            Err(Error::MissingVariable(Var::name("y")))
        );
    }

    #[test]
    fn test_bounds() {
        let p = Poly::from(2) * Poly::var("a") - Poly::from(3) * Poly::var("b") + Poly::from(1);
        assert_eq!(p.bounds(), Some((rat(-2), rat(3))));
        let lam = Symbol::new("lam");
        let q = Poly::var("a") * Coeff::from(lam);
        assert_eq!(q.bounds(), None);
    }

    #[test]
    fn test_subs_with_polynomial() {
        // x*y with y <- (1 - z) is x - xz
        let x = Poly::var("x");
        let y = Poly::var("y");
        let z = Poly::var("z");
        let p = &x * &y;
        let q = p.subs(&Var::name("y"), &(Poly::from(1) - &z)).unwrap();
        assert_eq!(q, &x - &x * &z);
        // the receiver is untouched
        assert_eq!(p, &x * &y);
    }

    #[test]
    fn test_subs_resimplifies() {
        // x*y with y <- x*w is x*w
        let p = Poly::var("x") * Poly::var("y");
        let r = Poly::var("x") * Poly::var("w");
        let q = p.subs(&Var::name("y"), &r).unwrap();
        assert_eq!(q, r);
    }

    #[test]
    fn test_subs_constants() {
        let p = Poly::var("x") * Poly::var("y") + Poly::var("x");
        let y = Var::name("y");
        assert_eq!(p.subs(&y, &Poly::from(1)).unwrap(), Poly::from(2) * Poly::var("x"));
        assert_eq!(p.subs(&y, &Poly::zero()).unwrap(), Poly::var("x"));
        assert_eq!(p.fix(&y, true), Poly::from(2) * Poly::var("x"));
        assert_eq!(p.fix(&y, false), Poly::var("x"));
    }

    #[test]
    fn test_subs_rejects_non_boolean() {
        let p = Poly::var("x");
        let x = Var::name("x");
        let err = p.subs(&x, &Poly::from(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidSubstitution { .. }));
        let err = p.subs(&x, &(Poly::var("a") + Poly::var("b"))).unwrap_err();
        assert!(matches!(err, Error::InvalidSubstitution { .. }));
    }

    #[test]
    fn test_is_boolean_valued() {
        let a = Poly::var("a");
        let b = Poly::var("b");
        assert!((&a * &b).is_boolean_valued());
        assert!((Poly::from(1) - &a).is_boolean_valued());
        assert!((&a + &b - &a * &b).is_boolean_valued());
        assert!(!(&a + &b).is_boolean_valued());
        assert!(!(&a - &b).is_boolean_valued());
    }

    #[test]
    fn test_resolve_returns_new_instance() {
        let lam = Symbol::new("lam");
        let p = Poly::var("x") * Coeff::from(&lam) + Poly::from(1);
        assert!(!p.is_numeric());
        assert_eq!(p.check_numeric(), Err(Error::UnresolvedParameter(lam.clone())));

        let q = p.resolve(&lam, &rat(5));
        assert!(q.is_numeric());
        assert_eq!(q, Poly::from(5) * Poly::var("x") + Poly::from(1));
        assert!(!p.is_numeric());
    }

    #[test]
    fn test_display() {
        let p = Poly::from(2) * Poly::var("a") * Poly::var("b") - Poly::var("c") + Poly::from(3);
        assert_eq!(p.to_string(), "3 + 2*a*b - c");
        let lam = Symbol::new("lam");
        let q = Poly::var("a") * Coeff::from(lam);
        assert_eq!(q.to_string(), "(lam)*a");
    }
}
