//! Multilinear monomials.
//!
//! A [`Term`] is a product of distinct Boolean variables. Since `x * x = x`
//! for Boolean `x`, a monomial is a *set* of variables; it is stored as a
//! sorted, deduplicated vector so that set-equal monomials compare equal and
//! hash identically.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Assignment, Var};

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Term(Vec<Var>);

impl Term {
    /// The empty monomial, i.e. the constant `1`.
    pub fn one() -> Self {
        Term(Vec::new())
    }

    pub fn var(v: impl Into<Var>) -> Self {
        Term(vec![v.into()])
    }

    pub fn new<V: Into<Var>>(vars: impl IntoIterator<Item = V>) -> Self {
        let mut vars: Vec<Var> = vars.into_iter().map(Into::into).collect();
        vars.sort();
        vars.dedup();
        Term(vars)
    }

    pub fn degree(&self) -> usize {
        self.0.len()
    }

    pub fn is_constant(&self) -> bool {
        self.0.is_empty()
    }

    pub fn vars(&self) -> &[Var] {
        &self.0
    }

    pub fn contains(&self, v: &Var) -> bool {
        self.0.binary_search(v).is_ok()
    }

    /// Product of two monomials: the union of their variables.
    pub fn union(&self, other: &Term) -> Term {
        let mut vars = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                std::cmp::Ordering::Less => {
                    vars.push(self.0[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    vars.push(other.0[j].clone());
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    vars.push(self.0[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        vars.extend_from_slice(&self.0[i..]);
        vars.extend_from_slice(&other.0[j..]);
        Term(vars)
    }

    /// Monomial with `v` removed.
    pub fn without(&self, v: &Var) -> Term {
        Term(self.0.iter().filter(|&u| u != v).cloned().collect())
    }

    /// Replaces the pair `u * v` with `a`, if both occur.
    pub fn replace_pair(&self, u: &Var, v: &Var, a: &Var) -> Option<Term> {
        if !self.contains(u) || !self.contains(v) {
            return None;
        }
        let rest = self.0.iter().filter(|&w| w != u && w != v).cloned();
        Some(Term::new(rest.chain(std::iter::once(a.clone()))))
    }

    /// Value of the monomial under `assignment` (all variables true).
    pub fn eval(&self, assignment: &Assignment) -> Result<bool> {
        let mut value = true;
        for v in &self.0 {
            match assignment.get(v) {
                Some(&b) => value &= b,
                None => return Err(Error::MissingVariable(v.clone())),
            }
        }
        Ok(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "1");
        }
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}
