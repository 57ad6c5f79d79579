//! Quadratic unconstrained binary optimization models.
//!
//! A [`Qubo`] is a numeric quadratic polynomial over dense indices `0..N`,
//! stored as a tensor keyed by sorted index tuples:
//!
//! - `[]` is the offset,
//! - `[i]` is the linear coefficient of `x_i`,
//! - `[i, j]` with `i < j` is the coefficient of `x_i * x_j`.
//!
//! The [`VarMapping`] connecting indices to labels is built fresh on every
//! transform, in label order.
//!
//! ```
//! use pcbo_rs::poly::Poly;
//!
//! let p = Poly::var("a") * Poly::var("b") * Poly::var("c") - Poly::var("a");
//! let qubo = p.to_qubo()?;
//!
//! // one ancilla for a*b
//! assert_eq!(qubo.num_variables(), 4);
//! assert_eq!(qubo.ancillas().len(), 1);
//! assert!(qubo.degree() <= 2);
//! # Ok::<(), pcbo_rs::error::Error>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, info};
use num_rational::BigRational;
use num_traits::Zero;

use crate::coeff::Coeff;
use crate::error::{Error, Result};
use crate::mapping::VarMapping;
use crate::pcbo::Pcbo;
use crate::poly::Poly;
use crate::reduce::{Ancilla, ReductionConfig};
use crate::term::Term;
use crate::types::{Assignment, Var};

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Qubo {
    q: BTreeMap<Vec<usize>, BigRational>,
    mapping: VarMapping,
    ancillas: Vec<Ancilla>,
}

impl Qubo {
    /// Builds a model from a numeric polynomial of degree at most two.
    pub fn from_poly(poly: &Poly) -> Result<Qubo> {
        Self::build(poly, Vec::new(), BTreeSet::new())
    }

    /// `extra` variables get an index even if no term mentions them.
    fn build(poly: &Poly, ancillas: Vec<Ancilla>, mut extra: BTreeSet<Var>) -> Result<Qubo> {
        if poly.degree() > 2 {
            return Err(Error::DegreeTooHighForTransform { degree: poly.degree() });
        }
        extra.extend(poly.variables());
        let mapping = VarMapping::new(extra);
        let mut q = BTreeMap::new();
        for (t, c) in poly.terms() {
            let mut key: Vec<usize> = t.vars().iter().filter_map(|v| mapping.index(v)).collect();
            key.sort_unstable();
            q.insert(key, c.try_number()?);
        }
        Ok(Qubo { q, mapping, ancillas })
    }
}

// Getters
impl Qubo {
    pub fn mapping(&self) -> &VarMapping {
        &self.mapping
    }

    /// Ancillas introduced by quadratization, if any.
    pub fn ancillas(&self) -> &[Ancilla] {
        &self.ancillas
    }

    /// Variables in index order, ancillas included.
    pub fn variables(&self) -> &[Var] {
        self.mapping.vars()
    }

    pub fn num_variables(&self) -> usize {
        self.mapping.len()
    }

    pub fn num_terms(&self) -> usize {
        self.q.len()
    }

    pub fn degree(&self) -> usize {
        self.q.keys().map(Vec::len).max().unwrap_or(0)
    }

    pub fn offset(&self) -> BigRational {
        self.get(&[])
    }

    pub fn linear(&self, i: usize) -> BigRational {
        self.get(&[i])
    }

    /// Coefficient of `x_i * x_j`, in either index order.
    pub fn quadratic(&self, i: usize, j: usize) -> BigRational {
        if i == j {
            return self.linear(i);
        }
        self.get(&[i.min(j), i.max(j)])
    }

    fn get(&self, key: &[usize]) -> BigRational {
        self.q.get(key).cloned().unwrap_or_else(BigRational::zero)
    }

    /// Nonzero entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], &BigRational)> {
        self.q.iter().map(|(k, c)| (k.as_slice(), c))
    }
}

impl Qubo {
    /// Objective value at an index-ordered bit vector, offset included.
    pub fn value(&self, bits: &[bool]) -> Result<BigRational> {
        self.check_len(bits.len())?;
        Ok(self.value_unchecked(|i| bits[i]))
    }

    pub(crate) fn value_unchecked(&self, bit: impl Fn(usize) -> bool) -> BigRational {
        let mut res = BigRational::zero();
        for (k, c) in &self.q {
            if k.iter().all(|&i| bit(i)) {
                res += c;
            }
        }
        res
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.num_variables() {
            return Err(Error::InvalidSample(format!(
                "expected {} values, got {}",
                self.num_variables(),
                len
            )));
        }
        Ok(())
    }

    /// The model as a polynomial over the mapped labels.
    pub fn to_poly(&self) -> Poly {
        Poly::from_terms(self.q.iter().map(|(k, c)| {
            let vars = k.iter().filter_map(|&i| self.mapping.var(i)).cloned();
            (Term::new(vars), Coeff::from(c.clone()))
        }))
    }

    /// Maps an index-ordered sample back to labels, ancillas included.
    pub fn convert_solution(&self, bits: &[bool]) -> Result<Assignment> {
        self.mapping.to_assignment(bits)
    }

    /// Ancilla labels, for filtering them out of a converted solution.
    pub fn ancilla_vars(&self) -> Vec<Var> {
        self.ancillas.iter().map(|a| a.var.clone()).collect()
    }
}

impl fmt::Display for Qubo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (n, (k, c)) in self.q.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "(")?;
            for (m, i) in k.iter().enumerate() {
                if m > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", i)?;
            }
            write!(f, "): {}", c)?;
        }
        write!(f, "}}")
    }
}

impl Poly {
    /// Converts to a QUBO, quadratizing first if the degree exceeds two.
    pub fn to_qubo(&self) -> Result<Qubo> {
        self.to_qubo_with(&ReductionConfig::default())
    }

    pub fn to_qubo_with(&self, config: &ReductionConfig) -> Result<Qubo> {
        self.to_qubo_over(config, BTreeSet::new())
    }

    /// Converts to a QUBO whose mapping also covers `extra`.
    fn to_qubo_over(&self, config: &ReductionConfig, extra: BTreeSet<Var>) -> Result<Qubo> {
        self.check_numeric()?;
        let qubo = if self.degree() > 2 {
            let reduction = self.reduce(config, extra.clone())?;
            Qubo::build(&reduction.poly, reduction.ancillas, extra)?
        } else {
            Qubo::build(self, Vec::new(), extra)?
        };
        info!(
            "QUBO: {} variables ({} ancillas), {} terms",
            qubo.num_variables(),
            qubo.ancillas.len(),
            qubo.num_terms()
        );
        Ok(qubo)
    }
}

impl Pcbo {
    /// Converts the penalized objective to a QUBO.
    ///
    /// The mapping covers every PCBO variable, so constraint variables the
    /// penalty dropped still get an index (with zero coefficients) and
    /// [`Pcbo::convert_solution`] yields a full assignment.
    /// Any penalty parameter must be resolved first.
    pub fn to_qubo(&self) -> Result<Qubo> {
        self.to_qubo_with(&ReductionConfig::default())
    }

    pub fn to_qubo_with(&self, config: &ReductionConfig) -> Result<Qubo> {
        debug!("PCBO to QUBO: {} constraints", self.num_constraints());
        self.objective().to_qubo_over(config, self.variables())
    }
}
