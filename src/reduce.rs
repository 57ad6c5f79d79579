//! Quadratization: reducing pseudo-Boolean polynomials to degree two.
//!
//! A monomial `u*v*w` is rewritten as `a*w` with a fresh ancilla `a`, and the
//! penalty
//!
//! ```text
//! M * (u*v - 2*u*a - 2*v*a + 3*a)
//! ```
//!
//! is added. The penalty is zero when `a == u*v` and at least `M` otherwise,
//! so with `M` larger than the total weight of the rewritten monomials no
//! minimizer of the reduced polynomial has an inconsistent ancilla.
//! Minimizing over the ancillas therefore gives back the original function.
//!
//! Pairs are chosen greedily: the pair occurring in most monomials of degree
//! above two, with ties broken by the smallest pair in variable order. The
//! result is deterministic but not necessarily minimal in ancillas.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::coeff::Coeff;
use crate::error::Result;
use crate::poly::Poly;
use crate::term::Term;
use crate::types::Var;

#[derive(Debug, Clone)]
pub struct ReductionConfig {
    /// Fixed penalty strength for every ancilla (default: computed per pair)
    pub penalty: Option<BigRational>,
    /// Prefix for ancilla names (default: "_q")
    pub ancilla_prefix: String,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            penalty: None,
            ancilla_prefix: "_q".to_string(),
        }
    }
}

impl ReductionConfig {
    pub fn with_penalty(mut self, penalty: BigRational) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn with_ancilla_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ancilla_prefix = prefix.into();
        self
    }
}

/// Ancilla definition: the ancilla stands for `pair.0 AND pair.1`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ancilla {
    pub var: Var,
    pub pair: (Var, Var),
    pub penalty: BigRational,
}

impl fmt::Display for Ancilla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}*{} (M = {})", self.var, self.pair.0, self.pair.1, self.penalty)
    }
}

/// A quadratic polynomial together with the ancillas introduced for it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Reduction {
    pub poly: Poly,
    pub ancillas: Vec<Ancilla>,
}

impl Reduction {
    pub fn num_ancillas(&self) -> usize {
        self.ancillas.len()
    }

    pub fn ancilla_vars(&self) -> BTreeSet<Var> {
        self.ancillas.iter().map(|a| a.var.clone()).collect()
    }
}

impl Poly {
    /// Reduces to degree at most two with the default configuration.
    pub fn quadratize(&self) -> Result<Reduction> {
        self.quadratize_with(&ReductionConfig::default())
    }

    pub fn quadratize_with(&self, config: &ReductionConfig) -> Result<Reduction> {
        self.reduce(config, BTreeSet::new())
    }

    /// Quadratizes without naming an ancilla after any of `reserved`.
    pub(crate) fn reduce(&self, config: &ReductionConfig, mut reserved: BTreeSet<Var>) -> Result<Reduction> {
        self.check_numeric()?;

        let mut poly = self.clone();
        let mut ancillas = Vec::new();
        reserved.extend(poly.variables());
        let mut taken = reserved;
        let mut counter = 0usize;

        while let Some((u, v)) = most_common_pair(&poly) {
            let a = loop {
                let a = Var::name(format!("{}{}[{}*{}]", config.ancilla_prefix, counter, u, v));
                counter += 1;
                if taken.insert(a.clone()) {
                    break a;
                }
            };

            let mut reduced = Poly::zero();
            let mut weight = BigRational::zero();
            let mut replaced = 0usize;
            for (t, c) in poly.terms() {
                // Quadratic monomials keep the pair as is.
                let rewritten = if t.degree() > 2 { t.replace_pair(&u, &v, &a) } else { None };
                match rewritten {
                    Some(t2) => {
                        weight += c.abs()?;
                        replaced += 1;
                        reduced.add_term(t2, c.clone());
                    }
                    None => reduced.add_term(t.clone(), c.clone()),
                }
            }

            let penalty = match &config.penalty {
                Some(m) => m.clone(),
                None => weight + BigRational::one(),
            };
            debug!("ancilla {} for {}*{}: {} monomials, M = {}", a, u, v, replaced, penalty);

            let m = Coeff::from(penalty.clone());
            let minus_two = Coeff::integer(-2);
            reduced.add_term(Term::new([u.clone(), v.clone()]), m.clone());
            reduced.add_term(Term::new([u.clone(), a.clone()]), &minus_two * &m);
            reduced.add_term(Term::new([v.clone(), a.clone()]), &minus_two * &m);
            reduced.add_term(Term::var(a.clone()), &Coeff::integer(3) * &m);

            poly = reduced;
            ancillas.push(Ancilla {
                var: a,
                pair: (u, v),
                penalty,
            });
        }

        debug!(
            "quadratized: degree {} -> {}, {} ancillas",
            self.degree(),
            poly.degree(),
            ancillas.len()
        );
        Ok(Reduction { poly, ancillas })
    }
}

/// The pair of variables occurring together in most monomials of degree
/// above two, smallest pair first on ties.
fn most_common_pair(poly: &Poly) -> Option<(Var, Var)> {
    let mut counts: BTreeMap<(&Var, &Var), usize> = BTreeMap::new();
    for (t, _) in poly.terms() {
        if t.degree() <= 2 {
            continue;
        }
        let vars = t.vars();
        for i in 0..vars.len() {
            for j in (i + 1)..vars.len() {
                *counts.entry((&vars[i], &vars[j])).or_default() += 1;
            }
        }
    }

    let mut best: Option<((&Var, &Var), usize)> = None;
    for (pair, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((pair, count));
        }
    }
    best.map(|((u, v), _)| (u.clone(), v.clone()))
}
