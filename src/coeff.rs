//! Exact coefficients with optional symbolic parameters.
//!
//! A [`Coeff`] is a sparse polynomial over named [`Symbol`]s with exact
//! rational coefficients. In practice the only symbol is the penalty strength
//! `λ`, carried through constraint compilation and resolved to a number with
//! [`Coeff::substitute`] right before a numeric model is built.
//!
//! ```
//! use pcbo_rs::coeff::{Coeff, Symbol};
//!
//! let lam = Symbol::new("lam");
//! let c = Coeff::from(3) * Coeff::from(lam.clone()) + Coeff::from(1);
//! assert!(!c.is_number());
//!
//! let resolved = c.substitute(&lam, &Coeff::from(2).to_number().unwrap());
//! assert_eq!(resolved, Coeff::from(7));
//! ```

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};

/// A named free parameter.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exact coefficient: `Σ cₖ · Πₖ symbols`.
///
/// Keys are sorted symbol multisets (a repeated symbol is a power), the empty
/// key is the numeric part. Zero entries are never stored.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Coeff {
    terms: BTreeMap<Vec<Symbol>, BigRational>,
}

impl Coeff {
    pub fn number(value: BigRational) -> Self {
        let mut terms = BTreeMap::new();
        if !value.is_zero() {
            terms.insert(Vec::new(), value);
        }
        Coeff { terms }
    }

    pub fn integer(value: i64) -> Self {
        Coeff::number(BigRational::from_integer(BigInt::from(value)))
    }

    /// The number `numer / denom`.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn ratio(numer: i64, denom: i64) -> Self {
        Coeff::number(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn symbol(symbol: Symbol) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(vec![symbol], BigRational::one());
        Coeff { terms }
    }

    /// Returns `true` if no symbol occurs.
    pub fn is_number(&self) -> bool {
        self.terms.keys().all(|k| k.is_empty())
    }

    /// Returns the numeric value, if no symbol occurs.
    pub fn to_number(&self) -> Option<BigRational> {
        if self.is_number() {
            Some(self.constant_part())
        } else {
            None
        }
    }

    /// Returns the numeric value or the first unresolved symbol as an error.
    pub fn try_number(&self) -> Result<BigRational> {
        match self.symbols().into_iter().next() {
            Some(symbol) => Err(Error::UnresolvedParameter(symbol)),
            None => Ok(self.constant_part()),
        }
    }

    /// The symbol-free part of the coefficient.
    pub fn constant_part(&self) -> BigRational {
        self.terms.get(&Vec::new()).cloned().unwrap_or_else(BigRational::zero)
    }

    /// All symbols occurring in the coefficient.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.terms.keys().flatten().cloned().collect()
    }

    /// Replaces `symbol` with `value` everywhere.
    pub fn substitute(&self, symbol: &Symbol, value: &BigRational) -> Coeff {
        let mut res = Coeff::zero();
        for (key, c) in &self.terms {
            let power = key.iter().filter(|s| *s == symbol).count();
            if power == 0 {
                res.add_term(key.clone(), c.clone());
                continue;
            }
            let rest: Vec<Symbol> = key.iter().filter(|s| *s != symbol).cloned().collect();
            let factor = num_traits::pow(value.clone(), power);
            res.add_term(rest, c * factor);
        }
        res
    }

    /// Absolute value, defined only for numeric coefficients.
    pub fn abs(&self) -> Result<BigRational> {
        Ok(self.try_number()?.abs())
    }

    fn add_term(&mut self, key: Vec<Symbol>, c: BigRational) {
        if c.is_zero() {
            return;
        }
        match self.terms.entry(key) {
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

fn merge_keys(a: &[Symbol], b: &[Symbol]) -> Vec<Symbol> {
    let mut key: Vec<Symbol> = a.iter().chain(b).cloned().collect();
    key.sort();
    key
}

impl Zero for Coeff {
    fn zero() -> Self {
        Coeff::default()
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }
}

impl One for Coeff {
    fn one() -> Self {
        Coeff::integer(1)
    }
}

impl From<i64> for Coeff {
    fn from(value: i64) -> Self {
        Coeff::integer(value)
    }
}

impl From<i32> for Coeff {
    fn from(value: i32) -> Self {
        Coeff::integer(value as i64)
    }
}

impl From<BigInt> for Coeff {
    fn from(value: BigInt) -> Self {
        Coeff::number(BigRational::from_integer(value))
    }
}

impl From<BigRational> for Coeff {
    fn from(value: BigRational) -> Self {
        Coeff::number(value)
    }
}

impl From<&Coeff> for Coeff {
    fn from(c: &Coeff) -> Self {
        c.clone()
    }
}

impl From<Symbol> for Coeff {
    fn from(symbol: Symbol) -> Self {
        Coeff::symbol(symbol)
    }
}

impl From<&Symbol> for Coeff {
    fn from(symbol: &Symbol) -> Self {
        Coeff::symbol(symbol.clone())
    }
}

impl AddAssign<&Coeff> for Coeff {
    fn add_assign(&mut self, rhs: &Coeff) {
        for (k, c) in &rhs.terms {
            self.add_term(k.clone(), c.clone());
        }
    }
}

impl SubAssign<&Coeff> for Coeff {
    fn sub_assign(&mut self, rhs: &Coeff) {
        for (k, c) in &rhs.terms {
            self.add_term(k.clone(), -c);
        }
    }
}

impl MulAssign<&Coeff> for Coeff {
    fn mul_assign(&mut self, rhs: &Coeff) {
        *self = &*self * rhs;
    }
}

impl Add<&Coeff> for &Coeff {
    type Output = Coeff;

    fn add(self, rhs: &Coeff) -> Coeff {
        let mut res = self.clone();
        res += rhs;
        res
    }
}

impl Sub<&Coeff> for &Coeff {
    type Output = Coeff;

    fn sub(self, rhs: &Coeff) -> Coeff {
        let mut res = self.clone();
        res -= rhs;
        res
    }
}

impl Mul<&Coeff> for &Coeff {
    type Output = Coeff;

    fn mul(self, rhs: &Coeff) -> Coeff {
        let mut res = Coeff::zero();
        for (ka, ca) in &self.terms {
            for (kb, cb) in &rhs.terms {
                res.add_term(merge_keys(ka, kb), ca * cb);
            }
        }
        res
    }
}

impl Neg for &Coeff {
    type Output = Coeff;

    fn neg(self) -> Coeff {
        Coeff {
            terms: self.terms.iter().map(|(k, c)| (k.clone(), -c)).collect(),
        }
    }
}

impl Neg for Coeff {
    type Output = Coeff;

    fn neg(self) -> Coeff {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<Coeff> for Coeff {
            type Output = Coeff;

            fn $method(self, rhs: Coeff) -> Coeff {
                (&self).$method(&rhs)
            }
        }

        impl $imp<&Coeff> for Coeff {
            type Output = Coeff;

            fn $method(self, rhs: &Coeff) -> Coeff {
                (&self).$method(rhs)
            }
        }

        impl $imp<Coeff> for &Coeff {
            type Output = Coeff;

            fn $method(self, rhs: Coeff) -> Coeff {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl AddAssign<Coeff> for Coeff {
    fn add_assign(&mut self, rhs: Coeff) {
        *self += &rhs;
    }
}

impl SubAssign<Coeff> for Coeff {
    fn sub_assign(&mut self, rhs: Coeff) {
        *self -= &rhs;
    }
}

impl MulAssign<Coeff> for Coeff {
    fn mul_assign(&mut self, rhs: Coeff) {
        *self *= &rhs;
    }
}

impl fmt::Display for Coeff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        // Symbolic parts first, numeric part last: "2*lam + 1".
        let mut first = true;
        for (key, c) in self.terms.iter().rev() {
            let negative = c.is_negative();
            if first {
                if negative {
                    write!(f, "-")?;
                }
            } else if negative {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;

            let magnitude = c.abs();
            if key.is_empty() {
                write!(f, "{}", magnitude)?;
                continue;
            }
            if !magnitude.is_one() {
                write!(f, "{}*", magnitude)?;
            }
            let names: Vec<&str> = key.iter().map(|s| s.name()).collect();
            write!(f, "{}", names.join("*"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_numeric_arithmetic() {
        let a = Coeff::from(3);
        let b = Coeff::ratio(1, 2);
        assert_eq!(&a + &b, Coeff::ratio(7, 2));
        assert_eq!(&a - &b, Coeff::ratio(5, 2));
        assert_eq!(&a * &b, Coeff::ratio(3, 2));
        assert_eq!(-&a, Coeff::from(-3));
        assert!((&a - &a).is_zero());
    }

    #[test]
    #[should_panic]
    fn test_ratio_zero_denominator() {
        let _ = Coeff::ratio(1, 0);
    }

    #[test]
    fn test_symbolic_arithmetic() {
        let lam = Symbol::new("lam");
        let c = Coeff::from(2) * Coeff::from(&lam) + Coeff::from(1);
        assert!(!c.is_number());
        assert_eq!(c.to_number(), None);
        assert_eq!(c.constant_part(), rat(1, 1));
        assert_eq!(c.symbols().into_iter().collect::<Vec<_>>(), vec![lam.clone()]);

        let cancelled = &c - &(Coeff::from(2) * Coeff::from(&lam));
        assert!(cancelled.is_number());
        assert_eq!(cancelled, Coeff::from(1));
    }

    #[test]
    fn test_substitute_powers() {
        let lam = Symbol::new("lam");
        let l = Coeff::from(&lam);
        // lam^2 + 3 lam - 1 at lam = 2 is 9
        let c = &l * &l + Coeff::from(3) * &l - Coeff::from(1);
        assert_eq!(c.substitute(&lam, &rat(2, 1)), Coeff::from(9));
        // Substituting an unrelated symbol is a no-op.
        assert_eq!(c.substitute(&Symbol::new("mu"), &rat(5, 1)), c);
    }

    #[test]
    fn test_try_number() {
        let lam = Symbol::new("lam");
        assert_eq!(Coeff::from(4).try_number(), Ok(rat(4, 1)));
        assert_eq!(
            Coeff::from(&lam).try_number(),
            Err(Error::UnresolvedParameter(lam))
        );
        assert_eq!(Coeff::from(-4).abs(), Ok(rat(4, 1)));
    }

    #[test]
    fn test_display() {
        let lam = Symbol::new("lam");
        assert_eq!(Coeff::zero().to_string(), "0");
        assert_eq!(Coeff::ratio(-3, 2).to_string(), "-3/2");
        let c = Coeff::from(2) * Coeff::from(&lam) - Coeff::from(1);
        assert_eq!(c.to_string(), "2*lam - 1");
        assert_eq!(Coeff::from(&lam).to_string(), "lam");
    }
}
