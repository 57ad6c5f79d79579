//! Constraint records and value bounds.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::error::Result;
use crate::poly::Poly;
use crate::types::Assignment;

/// Relation of a constraint polynomial against zero.
///
/// The declaration order is the order in which constraint groups are listed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Relation {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    pub const ALL: [Relation; 5] = [Relation::Eq, Relation::Lt, Relation::Le, Relation::Gt, Relation::Ge];

    /// Checks `value ∘ 0`.
    pub fn holds(self, value: &BigRational) -> bool {
        match self {
            Relation::Eq => value.is_zero(),
            Relation::Lt => value.is_negative(),
            Relation::Le => !value.is_positive(),
            Relation::Gt => value.is_positive(),
            Relation::Ge => !value.is_negative(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Eq => "==",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded constraint `poly ∘ 0`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Constraint {
    pub poly: Poly,
    pub relation: Relation,
}

impl Constraint {
    pub fn new(poly: Poly, relation: Relation) -> Self {
        Self { poly, relation }
    }

    pub fn is_satisfied(&self, assignment: &Assignment) -> Result<bool> {
        let value = self.poly.value(assignment)?;
        Ok(self.relation.holds(&value))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.poly, self.relation)
    }
}

/// Inclusive bounds on the achievable value of a constraint polynomial.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Bounds {
    pub lo: BigRational,
    pub hi: BigRational,
}

impl Bounds {
    pub fn new(lo: impl Into<BigInt>, hi: impl Into<BigInt>) -> Self {
        Self {
            lo: BigRational::from_integer(lo.into()),
            hi: BigRational::from_integer(hi.into()),
        }
    }

    pub fn from_ratios(lo: BigRational, hi: BigRational) -> Self {
        Self { lo, hi }
    }

    /// Bounds of `-g` given bounds of `g`.
    pub fn negate(&self) -> Self {
        Self {
            lo: -&self.hi,
            hi: -&self.lo,
        }
    }

    /// Bounds of `g + c` given bounds of `g`.
    pub fn shift(&self, c: &BigRational) -> Self {
        Self {
            lo: &self.lo + c,
            hi: &self.hi + c,
        }
    }

    /// `true` if zero lies outside the bounds.
    pub fn excludes_zero(&self) -> bool {
        self.lo.is_positive() || self.hi.is_negative()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
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
    fn test_relation_holds() {
        let (neg, zero, pos) = (rat(-1), rat(0), rat(1));
        assert!(Relation::Eq.holds(&zero) && !Relation::Eq.holds(&pos));
        assert!(Relation::Lt.holds(&neg) && !Relation::Lt.holds(&zero));
        assert!(Relation::Le.holds(&neg) && Relation::Le.holds(&zero) && !Relation::Le.holds(&pos));
        assert!(Relation::Gt.holds(&pos) && !Relation::Gt.holds(&zero));
        assert!(Relation::Ge.holds(&pos) && Relation::Ge.holds(&zero) && !Relation::Ge.holds(&neg));
    }

    #[test]
    fn test_constraint_is_satisfied() {
        let c = Constraint::new(Poly::var("x") - Poly::var("y"), Relation::Eq);
        assert_eq!(c.is_satisfied(&assignment([("x", 1), ("y", 1)])), Ok(true));
        assert_eq!(c.is_satisfied(&assignment([("x", 1), ("y", 0)])), Ok(false));
        assert!(c.is_satisfied(&assignment([("x", 1)])).is_err());
        assert_eq!(c.to_string(), "x - y == 0");
    }

    #[test]
    fn test_bounds_arithmetic() {
        let b = Bounds::new(-2, 3);
        assert_eq!(b.negate(), Bounds::new(-3, 2));
        assert_eq!(b.shift(&rat(1)), Bounds::new(-1, 4));
        assert!(!b.excludes_zero());
        assert!(Bounds::new(1, 3).excludes_zero());
        assert!(Bounds::new(-3, -1).excludes_zero());
        assert_eq!(b.to_string(), "[-2, 3]");
    }
}
