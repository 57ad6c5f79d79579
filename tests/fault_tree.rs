//! End-to-end tests on a small fault tree.
//!
//! Basic events `e0..e3` feed three OR gates; the top event is the AND of two
//! of them and is forced to occur. Minimizing the number of failed basic
//! events finds the smallest cut set: `{e0}`.

use std::collections::BTreeSet;

use num_bigint::BigUint;
use num_rational::BigRational;
use pcbo_rs::bruteforce::BruteForceConfig;
use pcbo_rs::coeff::{Coeff, Symbol};
use pcbo_rs::constraint::Relation;
use pcbo_rs::pcbo::Pcbo;
use pcbo_rs::poly::Poly;
use pcbo_rs::sampler::{AnnealerConfig, ExhaustiveSampler, SimulatedAnnealer};
use pcbo_rs::types::{assignment, bool_to_spin, Assignment, Var};

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(n.into())
}

fn fault_tree(lam: impl Into<Coeff>) -> Pcbo {
    let lam = lam.into();
    let e: Vec<Poly> = (0..4).map(|i| Poly::var(format!("e{}", i))).collect();
    let z: Vec<Poly> = (0..3).map(|i| Poly::var(format!("z{}", i))).collect();

    let mut h = Pcbo::from(e.iter().fold(Poly::zero(), |acc, x| acc + x));
    h.add_constraint_eq_or(&z[0], &e[0], &e[3], &lam)
        .unwrap()
        .add_constraint_eq_or(&z[1], &e[2], &z[0], &lam)
        .unwrap()
        .add_constraint_eq_or(&z[2], &e[0], &e[1], &lam)
        .unwrap()
        .add_constraint_and(&z[1], &z[2], &lam)
        .unwrap();
    h
}

fn designed() -> Assignment {
    assignment([
        ("e0", 1),
        ("e1", 0),
        ("e2", 0),
        ("e3", 0),
        ("z0", 1),
        ("z1", 1),
        ("z2", 1),
    ])
}

fn all_zero() -> Assignment {
    assignment([
        ("e0", 0),
        ("e1", 0),
        ("e2", 0),
        ("e3", 0),
        ("z0", 0),
        ("z1", 0),
        ("z2", 0),
    ])
}

// ─── Constraint Tests ──────────────────────────────────────────────────────────

#[test]
fn constraints_are_recorded() {
    let h = fault_tree(1);
    assert_eq!(h.num_constraints(), 4);
    assert_eq!(h.constraints_of(Relation::Eq).len(), 4);
    assert_eq!(h.num_variables(), 7);
    assert_eq!(h.num_ancillas(), 0);
}

#[test]
fn designed_solution_valid_for_any_lambda() {
    let lam = Symbol::new("lam");
    let parametric = fault_tree(&lam);
    assert!(!parametric.objective().is_numeric());

    for value in 1..=6 {
        let h = parametric.resolve_int(&lam, value);
        assert!(h.is_solution_valid(&designed()).unwrap());
        assert!(!h.is_solution_valid(&all_zero()).unwrap());
        assert_eq!(h.value(&designed()).unwrap(), rat(1));
        assert_eq!(h.constraints(), parametric.constraints());
    }
}

#[test]
fn parametric_matches_numeric() {
    let lam = Symbol::new("lam");
    let resolved = fault_tree(&lam).resolve_int(&lam, 3);
    assert_eq!(resolved.objective(), fault_tree(3).objective());
}

// ─── Penalty Threshold Tests ───────────────────────────────────────────────────

#[test]
fn weak_penalty_admits_invalid_minimizer() {
    let h = fault_tree(1);
    let all = h.solve_bruteforce_all(&BruteForceConfig::default()).unwrap();
    assert_eq!(all.value, rat(1));
    assert!(all.assignments.contains(&all_zero()));
    assert!(all.assignments.contains(&designed()));
    assert!(all.assignments.iter().any(|s| !h.is_solution_valid(s).unwrap()));
}

#[test]
fn strong_penalty_unique_minimizer() {
    let h = fault_tree(2);
    let config = BruteForceConfig::default();
    let all = h.solve_bruteforce_all(&config).unwrap();
    assert_eq!(all.value, rat(1));
    assert_eq!(all.assignments, vec![designed()]);
    assert_eq!(h.count_minimizers(&config).unwrap(), BigUint::from(1u32));
    assert!(h.is_solution_valid(&all.assignments[0]).unwrap());
}

// ─── Quadratization Tests ──────────────────────────────────────────────────────

#[test]
fn quadratization_preserves_minimum_across_lambda() {
    let config = BruteForceConfig::default();
    for lam in 1..=4 {
        let h = fault_tree(lam);
        assert_eq!(h.degree(), 3);

        let qubo = h.to_qubo().unwrap();
        assert!(qubo.degree() <= 2);
        assert_eq!(qubo.ancillas().len(), 3);

        let expected = h.solve_bruteforce(&config).unwrap();
        let got = qubo.solve_bruteforce(&config).unwrap();
        assert_eq!(got.value, expected.value, "lam = {}", lam);
    }
}

#[test]
fn quartic_quadratization_across_lambda() {
    let lam = Symbol::new("lam");
    let v: Vec<Poly> = ["a", "b", "c", "d", "e"].iter().map(|&n| Poly::var(n)).collect();
    let z = Poly::var("z");

    let objective = Poly::from(-1) * &v[0] * &v[1] * &v[2] * &v[3] + Poly::from(2) * &v[1] * &v[2] * &v[3] * &v[4]
        - &v[0]
        - &v[4]
        + &z;
    let mut parametric = Pcbo::from(objective);
    parametric.add_constraint_eq_xor(&z, &v[0], &v[4], &lam).unwrap();
    assert_eq!(parametric.degree(), 4);

    for value in 1..=5 {
        let h = parametric.resolve_int(&lam, value);
        let qubo = h.to_qubo().unwrap();
        assert!(qubo.degree() <= 2);
        assert!(!qubo.ancillas().is_empty());
        assert_models_agree(&h);
    }
}

#[test]
fn qubo_solutions_map_back_to_valid_assignments() {
    let h = fault_tree(2);
    let qubo = h.to_qubo().unwrap();
    let config = BruteForceConfig::default();

    let all = qubo.solve_bruteforce_all(&config).unwrap();
    assert_eq!(all.value, rat(1));
    for s in &all.assignments {
        let restricted = h.convert_solution(s);
        assert_eq!(restricted, designed());
        assert!(h.is_solution_valid(&restricted).unwrap());
        assert_eq!(h.value(&restricted).unwrap(), all.value);
    }
}

/// Every QUBO minimizer, restricted to the PCBO variables, is a direct
/// minimizer with the same value and the same validity, and vice versa.
fn assert_models_agree(h: &Pcbo) {
    let config = BruteForceConfig::default();
    let direct = h.solve_bruteforce_all(&config).unwrap();
    let qubo = h.to_qubo().unwrap();
    let reduced = qubo.solve_bruteforce_all(&config).unwrap();
    assert_eq!(reduced.value, direct.value);

    let mut mapped = BTreeSet::new();
    for s in &reduced.assignments {
        let restricted = h.convert_solution(s);
        let matching = direct
            .assignments
            .iter()
            .find(|d| **d == restricted)
            .unwrap_or_else(|| panic!("{:?} is not a direct minimizer", restricted));
        assert_eq!(
            h.is_solution_valid(&restricted).unwrap(),
            h.is_solution_valid(matching).unwrap()
        );
        mapped.insert(restricted);
    }
    let direct: BTreeSet<Assignment> = direct.assignments.into_iter().collect();
    assert_eq!(mapped, direct);
}

#[test]
fn validity_agrees_between_models() {
    for lam in 1..=3 {
        assert_models_agree(&fault_tree(lam));
    }

    // weak penalty: both valid and invalid minimizers
    let h = fault_tree(1);
    let all = h.solve_bruteforce_all(&BruteForceConfig::default()).unwrap();
    let validity: Vec<bool> = all.assignments.iter().map(|s| h.is_solution_valid(s).unwrap()).collect();
    assert!(validity.contains(&true) && validity.contains(&false));
}

#[test]
fn constraint_only_variables_survive_the_qubo() {
    let (a, b) = (Poly::var("a"), Poly::var("b"));

    // -b <= 0 always holds and adds no penalty
    let mut h = Pcbo::from(&a);
    h.add_constraint_le_zero(&-&b, 2, None).unwrap();
    assert!(!h.objective().variables().contains(&Var::name("b")));
    let qubo = h.to_qubo().unwrap();
    assert_eq!(qubo.num_variables(), 2);
    let best = qubo.solve_bruteforce(&BruteForceConfig::default()).unwrap();
    let restricted = h.convert_solution(&best.assignment);
    assert_eq!(restricted, assignment([("a", 0), ("b", 0)]));
    assert!(h.is_solution_valid(&restricted).unwrap());
    assert_models_agree(&h);

    // the penalty b cancels the objective term -b
    let mut h = Pcbo::from(&a - &b);
    h.add_constraint_eq_zero(&b, 1, None).unwrap();
    assert_eq!(h.objective(), &a);
    let all = h.to_qubo().unwrap().solve_bruteforce_all(&BruteForceConfig::default()).unwrap();
    let validity: Vec<bool> = all
        .assignments
        .iter()
        .map(|s| h.is_solution_valid(&h.convert_solution(s)).unwrap())
        .collect();
    assert_eq!(validity, vec![true, false]);
    assert_models_agree(&h);
}

// ─── QUSO Tests ────────────────────────────────────────────────────────────────

#[test]
fn quso_matches_qubo_on_all_assignments() {
    let qubo = fault_tree(2).to_qubo().unwrap();
    let quso = qubo.to_quso();
    let n = qubo.num_variables();
    assert_eq!(quso.num_variables(), n);

    for mask in 0u32..(1 << n) {
        let bits: Vec<bool> = (0..n).map(|i| (mask >> i) & 1 == 1).collect();
        let spins: Vec<i8> = bits.iter().map(|&b| bool_to_spin(b)).collect();
        assert_eq!(quso.value(&spins).unwrap(), qubo.value(&bits).unwrap());
    }
}

// ─── Sampler Tests ─────────────────────────────────────────────────────────────

#[test]
fn exhaustive_sampler_recovers_designed_solution() {
    let h = fault_tree(2);
    let qubo = h.to_qubo().unwrap();
    let solution = qubo.solve_with(&mut ExhaustiveSampler::default(), 1).unwrap();
    assert_eq!(solution.value, rat(1));
    assert_eq!(h.convert_solution(&solution.assignment), designed());
}

#[test]
fn annealer_recovers_designed_solution() {
    let h = fault_tree(2);
    let qubo = h.to_qubo().unwrap();
    let mut sampler = SimulatedAnnealer::new(AnnealerConfig::default().with_seed(1));
    let solution = qubo.solve_with(&mut sampler, 20).unwrap();
    assert_eq!(solution.value, rat(1));
    assert!(h.is_solution_valid(&h.convert_solution(&solution.assignment)).unwrap());
}
