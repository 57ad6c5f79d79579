//! Exhaustive minimization over all `2^n` assignments.
//!
//! Used as ground truth for small instances. The search is exponential, so
//! it refuses to run above a configurable number of variables.

use std::cmp::Ordering;

use log::debug;
use num_bigint::BigUint;
use num_rational::BigRational;

use crate::error::{Error, Result};
use crate::mapping::VarMapping;
use crate::pcbo::Pcbo;
use crate::poly::Poly;
use crate::qubo::Qubo;
use crate::quso::Quso;
use crate::types::Assignment;

#[derive(Debug, Clone)]
pub struct BruteForceConfig {
    /// Largest number of variables to enumerate (default: 24)
    pub max_variables: usize,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self { max_variables: 24 }
    }
}

impl BruteForceConfig {
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }
}

/// A minimum value and the first assignment reaching it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Solution {
    pub value: BigRational,
    pub assignment: Assignment,
}

/// A minimum value and every assignment reaching it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Solutions {
    pub value: BigRational,
    pub assignments: Vec<Assignment>,
}

/// Minimizers found by [`search`].
///
/// Masks are visited in increasing order, bit `i` standing for variable `i`.
/// With `all == false` only the first minimizer is kept, but `count` still
/// counts every one.
struct Minimum {
    value: Option<BigRational>,
    masks: Vec<u64>,
    count: u64,
}

fn check_size(num_vars: usize, config: &BruteForceConfig) -> Result<()> {
    if num_vars > config.max_variables || num_vars >= u64::BITS as usize {
        return Err(Error::IntractableSize {
            num_variables: num_vars,
            max_variables: config.max_variables,
        });
    }
    Ok(())
}

fn search(
    num_vars: usize,
    config: &BruteForceConfig,
    all: bool,
    mut value: impl FnMut(u64) -> BigRational,
) -> Result<Minimum> {
    check_size(num_vars, config)?;
    debug!("brute force over {} variables", num_vars);

    let mut min = Minimum {
        value: None,
        masks: Vec::new(),
        count: 0,
    };
    for mask in 0..(1u64 << num_vars) {
        let v = value(mask);
        match min.value.as_ref().map(|best| v.cmp(best)) {
            Some(Ordering::Greater) => {}
            Some(Ordering::Equal) => {
                min.count += 1;
                if all {
                    min.masks.push(mask);
                }
            }
            _ => {
                min.value = Some(v);
                min.masks.clear();
                min.masks.push(mask);
                min.count = 1;
            }
        }
    }
    debug!("brute force: {} minimizers", min.count);
    Ok(min)
}

/// A numeric polynomial flattened to `(term mask, coefficient)` pairs.
fn compile(poly: &Poly, mapping: &VarMapping) -> Result<Vec<(u64, BigRational)>> {
    poly.terms()
        .map(|(t, c)| {
            let mask = t
                .vars()
                .iter()
                .filter_map(|v| mapping.index(v))
                .fold(0u64, |m, i| m | (1 << i));
            Ok((mask, c.try_number()?))
        })
        .collect()
}

fn eval_compiled(terms: &[(u64, BigRational)], mask: u64) -> BigRational {
    let mut res = BigRational::default();
    for (t, c) in terms {
        if t & mask == *t {
            res += c;
        }
    }
    res
}

fn solutions(min: Minimum, mapping: &VarMapping) -> Solutions {
    Solutions {
        value: min.value.unwrap_or_default(),
        assignments: min.masks.iter().map(|&m| mapping.assignment_from_mask(m)).collect(),
    }
}

fn first(min: Minimum, mapping: &VarMapping) -> Solution {
    let mask = min.masks.first().copied().unwrap_or(0);
    Solution {
        value: min.value.unwrap_or_default(),
        assignment: mapping.assignment_from_mask(mask),
    }
}

/// Minimizes `poly` over every variable of `mapping`, which must cover the
/// polynomial's own variables.
fn minimize_poly(
    poly: &Poly,
    mapping: &VarMapping,
    config: &BruteForceConfig,
    all: bool,
) -> Result<Minimum> {
    poly.check_numeric()?;
    check_size(mapping.len(), config)?;
    let terms = compile(poly, mapping)?;
    search(mapping.len(), config, all, |mask| eval_compiled(&terms, mask))
}

impl Poly {
    /// Minimum value and the first minimizer, over the polynomial's own
    /// variables.
    pub fn solve_bruteforce(&self, config: &BruteForceConfig) -> Result<Solution> {
        let mapping = VarMapping::new(self.variables());
        Ok(first(minimize_poly(self, &mapping, config, false)?, &mapping))
    }

    /// Minimum value and every minimizer.
    pub fn solve_bruteforce_all(&self, config: &BruteForceConfig) -> Result<Solutions> {
        let mapping = VarMapping::new(self.variables());
        Ok(solutions(minimize_poly(self, &mapping, config, true)?, &mapping))
    }

    /// Number of minimizers.
    pub fn count_minimizers(&self, config: &BruteForceConfig) -> Result<BigUint> {
        let mapping = VarMapping::new(self.variables());
        Ok(BigUint::from(minimize_poly(self, &mapping, config, false)?.count))
    }
}

// Constraint variables that the penalty dropped (e.g. from an always
// satisfied inequality) are enumerated too, so that every returned
// assignment can be checked with `is_solution_valid`.
impl Pcbo {
    /// Minimizes the penalized objective.
    ///
    /// Penalties only steer the search: the returned assignment may violate
    /// constraints when `lam` is too small. Check it with
    /// [`Pcbo::is_solution_valid`].
    pub fn solve_bruteforce(&self, config: &BruteForceConfig) -> Result<Solution> {
        let mapping = VarMapping::new(self.variables());
        Ok(first(minimize_poly(self.objective(), &mapping, config, false)?, &mapping))
    }

    pub fn solve_bruteforce_all(&self, config: &BruteForceConfig) -> Result<Solutions> {
        let mapping = VarMapping::new(self.variables());
        Ok(solutions(minimize_poly(self.objective(), &mapping, config, true)?, &mapping))
    }

    pub fn count_minimizers(&self, config: &BruteForceConfig) -> Result<BigUint> {
        let mapping = VarMapping::new(self.variables());
        Ok(BigUint::from(
            minimize_poly(self.objective(), &mapping, config, false)?.count,
        ))
    }
}

impl Qubo {
    fn minimize(&self, config: &BruteForceConfig, all: bool) -> Result<Minimum> {
        search(self.num_variables(), config, all, |mask| {
            self.value_unchecked(|i| (mask >> i) & 1 == 1)
        })
    }

    pub fn solve_bruteforce(&self, config: &BruteForceConfig) -> Result<Solution> {
        Ok(first(self.minimize(config, false)?, self.mapping()))
    }

    pub fn solve_bruteforce_all(&self, config: &BruteForceConfig) -> Result<Solutions> {
        Ok(solutions(self.minimize(config, true)?, self.mapping()))
    }

    pub fn count_minimizers(&self, config: &BruteForceConfig) -> Result<BigUint> {
        Ok(BigUint::from(self.minimize(config, false)?.count))
    }
}

impl Quso {
    // Bit i set means spin i is +1.
    fn minimize(&self, config: &BruteForceConfig, all: bool) -> Result<Minimum> {
        search(self.num_variables(), config, all, |mask| {
            self.value_unchecked(|i| if (mask >> i) & 1 == 1 { 1 } else { -1 })
        })
    }

    pub fn solve_bruteforce(&self, config: &BruteForceConfig) -> Result<Solution> {
        Ok(first(self.minimize(config, false)?, self.mapping()))
    }

    pub fn solve_bruteforce_all(&self, config: &BruteForceConfig) -> Result<Solutions> {
        Ok(solutions(self.minimize(config, true)?, self.mapping()))
    }

    pub fn count_minimizers(&self, config: &BruteForceConfig) -> Result<BigUint> {
        Ok(BigUint::from(self.minimize(config, false)?.count))
    }
}
