//! Boolean gates as multilinear polynomials.
//!
//! Inputs are polynomials that evaluate to 0/1 on every assignment. The
//! encodings below keep that property:
//!
//! ```text
//! NOT(a)    = 1 - a
//! AND(a, b) = a * b
//! OR(a, b)  = a + b - a * b
//! XOR(a, b) = a + b - 2 * a * b
//! ```
//!
//! N-ary AND is the product of all operands and N-ary OR is
//! `1 - Π(1 - aᵢ)`, which expands to the alternating-sign
//! inclusion-exclusion sum.

use crate::poly::Poly;

pub fn not(a: &Poly) -> Poly {
    Poly::from(1) - a
}

pub fn and(a: &Poly, b: &Poly) -> Poly {
    a * b
}

pub fn or(a: &Poly, b: &Poly) -> Poly {
    a + b - a * b
}

pub fn xor(a: &Poly, b: &Poly) -> Poly {
    a + b - Poly::from(2) * a * b
}

pub fn nand(a: &Poly, b: &Poly) -> Poly {
    not(&and(a, b))
}

pub fn nor(a: &Poly, b: &Poly) -> Poly {
    not(&or(a, b))
}

pub fn xnor(a: &Poly, b: &Poly) -> Poly {
    not(&xor(a, b))
}

pub fn and_all<'a>(inputs: impl IntoIterator<Item = &'a Poly>) -> Poly {
    inputs.into_iter().fold(Poly::from(1), |acc, x| and(&acc, x))
}

pub fn or_all<'a>(inputs: impl IntoIterator<Item = &'a Poly>) -> Poly {
    inputs.into_iter().fold(Poly::zero(), |acc, x| or(&acc, x))
}

pub fn xor_all<'a>(inputs: impl IntoIterator<Item = &'a Poly>) -> Poly {
    inputs.into_iter().fold(Poly::zero(), |acc, x| xor(&acc, x))
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BinaryType {
    And,
    Or,
    Xor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NaryType {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

/// A gate over polynomial-valued inputs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Gate {
    Not(Poly),
    Binary(BinaryType, [Poly; 2]),
    Nary(NaryType, Box<[Poly]>),
}

// Constructors
impl Gate {
    pub fn not(a: impl Into<Poly>) -> Gate {
        Gate::Not(a.into())
    }

    pub fn and(a: impl Into<Poly>, b: impl Into<Poly>) -> Gate {
        Gate::Binary(BinaryType::And, [a.into(), b.into()])
    }

    pub fn or(a: impl Into<Poly>, b: impl Into<Poly>) -> Gate {
        Gate::Binary(BinaryType::Or, [a.into(), b.into()])
    }

    pub fn xor(a: impl Into<Poly>, b: impl Into<Poly>) -> Gate {
        Gate::Binary(BinaryType::Xor, [a.into(), b.into()])
    }

    pub fn andn(inputs: &[Poly]) -> Gate {
        Gate::Nary(NaryType::And, inputs.into())
    }

    pub fn orn(inputs: &[Poly]) -> Gate {
        Gate::Nary(NaryType::Or, inputs.into())
    }

    pub fn xorn(inputs: &[Poly]) -> Gate {
        Gate::Nary(NaryType::Xor, inputs.into())
    }

    pub fn nandn(inputs: &[Poly]) -> Gate {
        Gate::Nary(NaryType::Nand, inputs.into())
    }

    pub fn norn(inputs: &[Poly]) -> Gate {
        Gate::Nary(NaryType::Nor, inputs.into())
    }

    pub fn xnorn(inputs: &[Poly]) -> Gate {
        Gate::Nary(NaryType::Xnor, inputs.into())
    }
}

// Getters
impl Gate {
    pub fn inputs(&self) -> &[Poly] {
        match self {
            Gate::Not(input) => std::slice::from_ref(input),
            Gate::Binary(_, inputs) => inputs,
            Gate::Nary(_, inputs) => inputs,
        }
    }

    /// The gate output as a polynomial in its inputs' variables.
    pub fn to_poly(&self) -> Poly {
        match self {
            Gate::Not(a) => not(a),
            Gate::Binary(BinaryType::And, [a, b]) => and(a, b),
            Gate::Binary(BinaryType::Or, [a, b]) => or(a, b),
            Gate::Binary(BinaryType::Xor, [a, b]) => xor(a, b),
            Gate::Nary(NaryType::And, inputs) => and_all(inputs.iter()),
            Gate::Nary(NaryType::Or, inputs) => or_all(inputs.iter()),
            Gate::Nary(NaryType::Xor, inputs) => xor_all(inputs.iter()),
            Gate::Nary(NaryType::Nand, inputs) => not(&and_all(inputs.iter())),
            Gate::Nary(NaryType::Nor, inputs) => not(&or_all(inputs.iter())),
            Gate::Nary(NaryType::Xnor, inputs) => not(&xor_all(inputs.iter())),
        }
    }
}

#[cfg(test)]
mod tests {
    use num_rational::BigRational;
    use test_log::test;

    use super::*;
    use crate::types::{assignment, Assignment};

    fn bit(p: &Poly, a: &Assignment) -> i64 {
        let v = p.value(a).unwrap();
        assert!(v.is_integer());
        let v = v.to_integer();
        assert!(v == 0.into() || v == 1.into(), "not a bit: {}", v);
        if v == 0.into() {
            0
        } else {
            1
        }
    }

    fn ab() -> (Poly, Poly) {
        (Poly::var("a"), Poly::var("b"))
    }

    #[test]
    fn test_truth_tables_binary() {
        let (a, b) = ab();
        for x in 0..2u8 {
            for y in 0..2u8 {
                let s = assignment([("a", x), ("b", y)]);
                let (x, y) = (x as i64, y as i64);
                assert_eq!(bit(&and(&a, &b), &s), x & y);
                assert_eq!(bit(&or(&a, &b), &s), x | y);
                assert_eq!(bit(&xor(&a, &b), &s), x ^ y);
                assert_eq!(bit(&nand(&a, &b), &s), 1 - (x & y));
                assert_eq!(bit(&nor(&a, &b), &s), 1 - (x | y));
                assert_eq!(bit(&xnor(&a, &b), &s), 1 - (x ^ y));
                assert_eq!(bit(&not(&a), &s), 1 - x);
            }
        }
    }

    #[test]
    fn test_truth_tables_nary() {
        let names = ["a", "b", "c", "d"];
        let inputs: Vec<Poly> = names.iter().map(|&n| Poly::var(n)).collect();
        let and_p = Gate::andn(&inputs).to_poly();
        let or_p = Gate::orn(&inputs).to_poly();
        let xor_p = Gate::xorn(&inputs).to_poly();
        let nor_p = Gate::norn(&inputs).to_poly();
        for mask in 0..16u8 {
            let s = assignment(names.iter().enumerate().map(|(i, &n)| (n, (mask >> i) & 1)));
            let ones = mask.count_ones() as i64;
            assert_eq!(bit(&and_p, &s), (ones == 4) as i64);
            assert_eq!(bit(&or_p, &s), (ones > 0) as i64);
            assert_eq!(bit(&xor_p, &s), ones % 2);
            assert_eq!(bit(&nor_p, &s), (ones == 0) as i64);
        }
    }

    #[test]
    fn test_or_expansion_alternates_signs() {
        let inputs: Vec<Poly> = ["a", "b", "c"].iter().map(|&n| Poly::var(n)).collect();
        let p = or_all(inputs.iter());
        // a + b + c - ab - ac - bc + abc
        assert_eq!(p.num_terms(), 7);
        assert_eq!(p.degree(), 3);
        assert!(p.is_boolean_valued());
    }

    #[test]
    fn test_composition_stays_boolean() {
        let (a, b) = ab();
        let c = Poly::var("c");
        let g = or(&and(&a, &not(&b)), &xor(&b, &c));
        assert!(g.is_boolean_valued());
        let one = BigRational::from_integer(1.into());
        let s = assignment([("a", 1), ("b", 0), ("c", 0)]);
        assert_eq!(g.value(&s).unwrap(), one);
    }

    #[test]
    fn test_gate_inputs() {
        let (a, b) = ab();
        let gate = Gate::and(a.clone(), b.clone());
        assert_eq!(gate.inputs(), &[a.clone(), b]);
        assert_eq!(Gate::not(a.clone()).inputs(), &[a]);
    }

    #[test]
    fn test_empty_nary() {
        assert_eq!(Gate::andn(&[]).to_poly(), Poly::from(1));
        assert_eq!(Gate::orn(&[]).to_poly(), Poly::zero());
        assert_eq!(Gate::nandn(&[]).to_poly(), Poly::zero());
        assert_eq!(Gate::xnorn(&[]).to_poly(), Poly::from(1));
    }
}
