//! Pseudo-Boolean constrained optimization instances.
//!
//! A [`Pcbo`] is an objective polynomial that also records the constraints
//! folded into it. Every `add_constraint_*` method does two things:
//!
//! 1. adds a penalty polynomial, scaled by `lam`, to the objective, so that
//!    minimizing the objective prefers assignments satisfying the constraint;
//! 2. records the raw constraint polynomial, so that validity can be checked
//!    later independently of the penalty strength.
//!
//! The methods return `&mut Pcbo` for chaining:
//!
//! ```
//! use pcbo_rs::pcbo::Pcbo;
//! use pcbo_rs::poly::Poly;
//! use pcbo_rs::types::assignment;
//!
//! let (a, b, z) = (Poly::var("a"), Poly::var("b"), Poly::var("z"));
//!
//! let mut h = Pcbo::from(&a + &b);
//! h.add_constraint_eq_or(&z, &a, &b, 2)?
//!     .add_constraint_eq_zero(&(Poly::from(1) - &z), 2, None)?;
//!
//! assert_eq!(h.num_constraints(), 2);
//! assert!(h.is_solution_valid(&assignment([("a", 1), ("b", 0), ("z", 1)]))?);
//! assert!(!h.is_solution_valid(&assignment([("a", 0), ("b", 0), ("z", 1)]))?);
//! # Ok::<(), pcbo_rs::error::Error>(())
//! ```
//!
//! # Penalty construction
//!
//! For `g == 0` with bounds `[lo, hi]` on `g`:
//!
//! - `lo >= 0`: `g` is never negative, so `lam * g` is minimal exactly at `g == 0`;
//! - `hi <= 0`: symmetrically, `-lam * g`;
//! - otherwise `lam * g^2`. The square is mandatory here: a linear penalty of
//!   indefinite sign would reward violations in one direction.
//!
//! For `g <= 0` binary slack variables `s` encoding every integer in
//! `[0, -lo]` are introduced and `lam * (g + s)^2` is added. The strict and
//! reversed relations are rewritten into this form, assuming an
//! integer-valued `g`.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::AddAssign;

use log::{debug, warn};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::coeff::{Coeff, Symbol};
use crate::constraint::{Bounds, Constraint, Relation};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::poly::Poly;
use crate::types::{Assignment, Var};

const SLACK_PREFIX: &str = "__s";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pcbo {
    objective: Poly,
    constraints: BTreeMap<Relation, Vec<Poly>>,
    slack: Vec<Var>,
}

impl From<Poly> for Pcbo {
    fn from(objective: Poly) -> Self {
        Pcbo {
            objective,
            ..Default::default()
        }
    }
}

impl From<&Poly> for Pcbo {
    fn from(objective: &Poly) -> Self {
        Pcbo::from(objective.clone())
    }
}

impl AddAssign<&Poly> for Pcbo {
    fn add_assign(&mut self, rhs: &Poly) {
        self.objective += rhs;
    }
}

impl AddAssign<Poly> for Pcbo {
    fn add_assign(&mut self, rhs: Poly) {
        self.objective += &rhs;
    }
}

// Getters
impl Pcbo {
    pub fn new() -> Self {
        Pcbo::default()
    }

    /// The penalized objective.
    pub fn objective(&self) -> &Poly {
        &self.objective
    }

    /// Recorded constraints, grouped by relation, in addition order.
    pub fn constraints(&self) -> &BTreeMap<Relation, Vec<Poly>> {
        &self.constraints
    }

    /// Recorded constraints with the given relation, in addition order.
    pub fn constraints_of(&self, relation: Relation) -> &[Poly] {
        self.constraints.get(&relation).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All recorded constraints as records.
    pub fn constraint_records(&self) -> Vec<Constraint> {
        self.constraints
            .iter()
            .flat_map(|(&r, ps)| ps.iter().map(move |p| Constraint::new(p.clone(), r)))
            .collect()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.values().map(Vec::len).sum()
    }

    /// Slack variables introduced by inequality constraints.
    pub fn slack_variables(&self) -> &[Var] {
        &self.slack
    }

    pub fn num_ancillas(&self) -> usize {
        self.slack.len()
    }

    /// Variables of the objective and of every recorded constraint.
    pub fn variables(&self) -> BTreeSet<Var> {
        let mut vars = self.objective.variables();
        for ps in self.constraints.values() {
            for p in ps {
                vars.extend(p.variables());
            }
        }
        vars.extend(self.slack.iter().cloned());
        vars
    }

    pub fn num_variables(&self) -> usize {
        self.variables().len()
    }

    pub fn num_terms(&self) -> usize {
        self.objective.num_terms()
    }

    pub fn degree(&self) -> usize {
        self.objective.degree()
    }
}

// Objective and validation
impl Pcbo {
    /// Adds `p` to the objective.
    pub fn add_objective(&mut self, p: &Poly) -> &mut Self {
        self.objective += p;
        self
    }

    /// Objective value at `assignment`.
    pub fn value(&self, assignment: &Assignment) -> Result<BigRational> {
        self.objective.value(assignment)
    }

    /// Checks every recorded constraint at `assignment`.
    ///
    /// All constraints are evaluated, so an assignment missing a constraint
    /// variable fails with [`Error::MissingVariable`] even when an earlier
    /// constraint is already violated.
    pub fn is_solution_valid(&self, assignment: &Assignment) -> Result<bool> {
        let mut valid = true;
        for (&relation, ps) in &self.constraints {
            for p in ps {
                let value = p.value(assignment)?;
                if !relation.holds(&value) {
                    debug!("violated: {} {} 0 (value {})", p, relation, value);
                    valid = false;
                }
            }
        }
        Ok(valid)
    }

    /// Restricts `solution` to this instance's variables.
    ///
    /// Use this on assignments recovered from a reduced model: ancillas
    /// introduced by quadratization are dropped, slack variables are kept.
    pub fn convert_solution(&self, solution: &Assignment) -> Assignment {
        let vars = self.variables();
        solution
            .iter()
            .filter(|(v, _)| vars.contains(v))
            .map(|(v, &b)| (v.clone(), b))
            .collect()
    }

    /// Returns a new instance with `symbol` replaced by `value` everywhere.
    ///
    /// The receiver keeps its parameters, so it can be resolved again with
    /// another value.
    pub fn resolve(&self, symbol: &Symbol, value: &BigRational) -> Pcbo {
        Pcbo {
            objective: self.objective.resolve(symbol, value),
            constraints: self
                .constraints
                .iter()
                .map(|(&r, ps)| (r, ps.iter().map(|p| p.resolve(symbol, value)).collect()))
                .collect(),
            slack: self.slack.clone(),
        }
    }

    /// [`Pcbo::resolve`] with an integer value.
    pub fn resolve_int(&self, symbol: &Symbol, value: i64) -> Pcbo {
        self.resolve(symbol, &BigRational::from_integer(value.into()))
    }
}

// Constraint compilation
impl Pcbo {
    fn record(&mut self, g: &Poly, relation: Relation) {
        debug!("record constraint: {} {} 0", g, relation);
        self.constraints.entry(relation).or_default().push(g.clone());
    }

    fn bounds_of(g: &Poly, bounds: Option<Bounds>) -> Result<Bounds> {
        match bounds {
            Some(b) => Ok(b),
            None => match g.bounds() {
                Some((lo, hi)) => Ok(Bounds::from_ratios(lo, hi)),
                None => Err(Error::UnboundedConstraint(format!(
                    "cannot bound {} with symbolic coefficients; pass explicit bounds",
                    g
                ))),
            },
        }
    }

    fn penalize_eq_zero(&mut self, g: &Poly, lam: &Coeff, bounds: &Bounds) {
        if bounds.excludes_zero() {
            warn!("constraint {} == 0 is unsatisfiable: value in {}", g, bounds);
        }
        if !bounds.lo.is_negative() {
            debug!("penalty for {} == 0: linear (nonnegative)", g);
            self.objective += g.scale(lam);
        } else if !bounds.hi.is_positive() {
            debug!("penalty for {} == 0: linear (nonpositive)", g);
            self.objective -= g.scale(lam);
        } else {
            debug!("penalty for {} == 0: squared", g);
            self.objective += g.pow(2).scale(lam);
        }
    }

    fn penalize_le_zero(&mut self, g: &Poly, lam: &Coeff, bounds: &Bounds) {
        if !bounds.hi.is_positive() {
            debug!("constraint {} <= 0 always holds: value in {}", g, bounds);
            return;
        }
        if bounds.lo.is_positive() {
            warn!("constraint {} <= 0 is unsatisfiable: value in {}", g, bounds);
            self.objective += g.scale(lam);
            return;
        }

        // g + s == 0 with s in [0, -lo].
        let max_slack = (-&bounds.lo).floor().to_integer();
        if max_slack.is_zero() {
            self.objective += g.scale(lam);
            return;
        }
        let slack = self.new_slack(&max_slack);
        debug!("slack for {} <= 0: {} (max {})", g, slack, max_slack);
        self.objective += (g + &slack).pow(2).scale(lam);
    }

    /// Introduces slack variables encoding every integer in `[0, max]`.
    ///
    /// Weights are `1, 2, 4, ...` with the last one trimmed so that the
    /// weights sum to exactly `max`.
    fn new_slack(&mut self, max: &BigInt) -> Poly {
        let num_bits = max.bits();
        let mut slack = Poly::zero();
        let mut total = BigInt::zero();
        for i in 0..num_bits {
            let weight = if i + 1 == num_bits {
                max - &total
            } else {
                BigInt::one() << i
            };
            total += &weight;
            let v = self.fresh_slack_var();
            slack += Poly::var(v) * Coeff::from(weight);
        }
        slack
    }

    fn fresh_slack_var(&mut self) -> Var {
        let taken = self.variables();
        let mut n = self.slack.len();
        loop {
            let v = Var::name(format!("{}{}", SLACK_PREFIX, n));
            if !taken.contains(&v) {
                self.slack.push(v.clone());
                return v;
            }
            n += 1;
        }
    }

    /// Enforces `g == 0`.
    ///
    /// `bounds` are used only to choose the penalty form; when absent they
    /// are computed from the coefficients.
    pub fn add_constraint_eq_zero(
        &mut self,
        g: &Poly,
        lam: impl Into<Coeff>,
        bounds: Option<Bounds>,
    ) -> Result<&mut Self> {
        let bounds = Self::bounds_of(g, bounds)?;
        self.penalize_eq_zero(g, &lam.into(), &bounds);
        self.record(g, Relation::Eq);
        Ok(self)
    }

    /// Enforces `g <= 0`.
    pub fn add_constraint_le_zero(
        &mut self,
        g: &Poly,
        lam: impl Into<Coeff>,
        bounds: Option<Bounds>,
    ) -> Result<&mut Self> {
        let bounds = Self::bounds_of(g, bounds)?;
        self.penalize_le_zero(g, &lam.into(), &bounds);
        self.record(g, Relation::Le);
        Ok(self)
    }

    /// Enforces `g < 0`, i.e. `g + 1 <= 0` for integer-valued `g`.
    pub fn add_constraint_lt_zero(
        &mut self,
        g: &Poly,
        lam: impl Into<Coeff>,
        bounds: Option<Bounds>,
    ) -> Result<&mut Self> {
        let bounds = Self::bounds_of(g, bounds)?;
        let one = BigRational::one();
        let shifted = g + &Poly::from(1);
        self.penalize_le_zero(&shifted, &lam.into(), &bounds.shift(&one));
        self.record(g, Relation::Lt);
        Ok(self)
    }

    /// Enforces `g >= 0`, i.e. `-g <= 0`.
    pub fn add_constraint_ge_zero(
        &mut self,
        g: &Poly,
        lam: impl Into<Coeff>,
        bounds: Option<Bounds>,
    ) -> Result<&mut Self> {
        let bounds = Self::bounds_of(g, bounds)?;
        self.penalize_le_zero(&-g, &lam.into(), &bounds.negate());
        self.record(g, Relation::Ge);
        Ok(self)
    }

    /// Enforces `g > 0`, i.e. `1 - g <= 0` for integer-valued `g`.
    pub fn add_constraint_gt_zero(
        &mut self,
        g: &Poly,
        lam: impl Into<Coeff>,
        bounds: Option<Bounds>,
    ) -> Result<&mut Self> {
        let bounds = Self::bounds_of(g, bounds)?;
        let one = BigRational::one();
        let flipped = Poly::from(1) - g;
        self.penalize_le_zero(&flipped, &lam.into(), &bounds.negate().shift(&one));
        self.record(g, Relation::Gt);
        Ok(self)
    }

    /// Enforces `target == gate`.
    ///
    /// Both sides are 0/1-valued, so `target - gate` lies in `[-1, 1]` and
    /// the squared penalty is used. Its degree is at most the gate degree
    /// plus one, which is why fault trees give every internal signal its own
    /// variable instead of nesting gate polynomials.
    pub fn add_constraint_eq_gate(
        &mut self,
        target: &Poly,
        gate: &Gate,
        lam: impl Into<Coeff>,
    ) -> Result<&mut Self> {
        let g = target - gate.to_poly();
        self.add_constraint_eq_zero(&g, lam, Some(Bounds::new(-1, 1)))
    }

    pub fn add_constraint_eq_not(&mut self, target: &Poly, a: &Poly, lam: impl Into<Coeff>) -> Result<&mut Self> {
        self.add_constraint_eq_gate(target, &Gate::not(a.clone()), lam)
    }

    pub fn add_constraint_eq_and(
        &mut self,
        target: &Poly,
        a: &Poly,
        b: &Poly,
        lam: impl Into<Coeff>,
    ) -> Result<&mut Self> {
        self.add_constraint_eq_gate(target, &Gate::and(a.clone(), b.clone()), lam)
    }

    pub fn add_constraint_eq_or(
        &mut self,
        target: &Poly,
        a: &Poly,
        b: &Poly,
        lam: impl Into<Coeff>,
    ) -> Result<&mut Self> {
        self.add_constraint_eq_gate(target, &Gate::or(a.clone(), b.clone()), lam)
    }

    pub fn add_constraint_eq_xor(
        &mut self,
        target: &Poly,
        a: &Poly,
        b: &Poly,
        lam: impl Into<Coeff>,
    ) -> Result<&mut Self> {
        self.add_constraint_eq_gate(target, &Gate::xor(a.clone(), b.clone()), lam)
    }

    pub fn add_constraint_eq_nand(
        &mut self,
        target: &Poly,
        a: &Poly,
        b: &Poly,
        lam: impl Into<Coeff>,
    ) -> Result<&mut Self> {
        self.add_constraint_eq_gate(target, &Gate::nandn(&[a.clone(), b.clone()]), lam)
    }

    pub fn add_constraint_eq_nor(
        &mut self,
        target: &Poly,
        a: &Poly,
        b: &Poly,
        lam: impl Into<Coeff>,
    ) -> Result<&mut Self> {
        self.add_constraint_eq_gate(target, &Gate::norn(&[a.clone(), b.clone()]), lam)
    }

    /// Enforces that `gate` evaluates to true.
    pub fn add_constraint_gate(&mut self, gate: &Gate, lam: impl Into<Coeff>) -> Result<&mut Self> {
        self.add_constraint_eq_gate(&Poly::from(1), gate, lam)
    }

    pub fn add_constraint_and(&mut self, a: &Poly, b: &Poly, lam: impl Into<Coeff>) -> Result<&mut Self> {
        self.add_constraint_gate(&Gate::and(a.clone(), b.clone()), lam)
    }

    pub fn add_constraint_or(&mut self, a: &Poly, b: &Poly, lam: impl Into<Coeff>) -> Result<&mut Self> {
        self.add_constraint_gate(&Gate::or(a.clone(), b.clone()), lam)
    }

    pub fn add_constraint_xor(&mut self, a: &Poly, b: &Poly, lam: impl Into<Coeff>) -> Result<&mut Self> {
        self.add_constraint_gate(&Gate::xor(a.clone(), b.clone()), lam)
    }

    pub fn add_constraint_not(&mut self, a: &Poly, lam: impl Into<Coeff>) -> Result<&mut Self> {
        self.add_constraint_gate(&Gate::not(a.clone()), lam)
    }
}
