//! Quadratic unconstrained spin optimization (Ising) models.
//!
//! Spins take values `-1` and `+1`. A [`Quso`] is derived from a [`Qubo`]
//! through `x = (1 + s) / 2`, which is exact in rational arithmetic, so both
//! models agree on corresponding assignments (`s = 2x - 1`).

use std::collections::BTreeMap;
use std::fmt;

use num_rational::BigRational;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::mapping::VarMapping;
use crate::poly::Poly;
use crate::qubo::Qubo;
use crate::types::{spin_to_bool, Assignment, Var};

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Quso {
    h: BTreeMap<usize, BigRational>,
    j: BTreeMap<(usize, usize), BigRational>,
    offset: BigRational,
    mapping: VarMapping,
}

fn accumulate<K: Ord>(map: &mut BTreeMap<K, BigRational>, key: K, value: BigRational) {
    let entry = map.entry(key).or_insert_with(BigRational::zero);
    *entry += value;
}

impl Qubo {
    pub fn to_quso(&self) -> Quso {
        let half = BigRational::new(1.into(), 2.into());
        let quarter = BigRational::new(1.into(), 4.into());

        let mut h = BTreeMap::new();
        let mut j = BTreeMap::new();
        let mut offset = BigRational::zero();
        for (k, c) in self.iter() {
            match *k {
                [] => offset += c,
                [i] => {
                    // c*x = c/2 + c/2*s
                    let c = c * &half;
                    offset += &c;
                    accumulate(&mut h, i, c);
                }
                [a, b] => {
                    // c*x*y = c/4 * (1 + s + t + s*t)
                    let c = c * &quarter;
                    offset += &c;
                    accumulate(&mut h, a, c.clone());
                    accumulate(&mut h, b, c.clone());
                    accumulate(&mut j, (a, b), c);
                }
                _ => unreachable!("QUBO keys have at most two indices"),
            }
        }
        h.retain(|_, c| !c.is_zero());
        j.retain(|_, c| !c.is_zero());

        Quso {
            h,
            j,
            offset,
            mapping: self.mapping().clone(),
        }
    }
}

impl Poly {
    /// Converts a polynomial of degree at most two to a QUSO.
    ///
    /// Unlike [`Poly::to_qubo`] this does not quadratize.
    pub fn to_quso(&self) -> Result<Quso> {
        if self.degree() > 2 {
            return Err(Error::DegreeTooHighForTransform { degree: self.degree() });
        }
        self.check_numeric()?;
        Ok(Qubo::from_poly(self)?.to_quso())
    }
}

impl Quso {
    pub fn mapping(&self) -> &VarMapping {
        &self.mapping
    }

    pub fn variables(&self) -> &[Var] {
        self.mapping.vars()
    }

    pub fn num_variables(&self) -> usize {
        self.mapping.len()
    }

    pub fn num_terms(&self) -> usize {
        self.h.len() + self.j.len() + usize::from(!self.offset.is_zero())
    }

    pub fn degree(&self) -> usize {
        if !self.j.is_empty() {
            2
        } else if !self.h.is_empty() {
            1
        } else {
            0
        }
    }

    pub fn offset(&self) -> &BigRational {
        &self.offset
    }

    pub fn h(&self) -> &BTreeMap<usize, BigRational> {
        &self.h
    }

    pub fn j(&self) -> &BTreeMap<(usize, usize), BigRational> {
        &self.j
    }

    pub fn field(&self, i: usize) -> BigRational {
        self.h.get(&i).cloned().unwrap_or_else(BigRational::zero)
    }

    /// Coupling between spins `i` and `j`, in either order.
    pub fn coupling(&self, i: usize, j: usize) -> BigRational {
        self.j
            .get(&(i.min(j), i.max(j)))
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// Energy at an index-ordered spin vector, offset included.
    pub fn value(&self, spins: &[i8]) -> Result<BigRational> {
        self.check_spins(spins)?;
        Ok(self.value_unchecked(|i| spins[i]))
    }

    pub(crate) fn value_unchecked(&self, spin: impl Fn(usize) -> i8) -> BigRational {
        let mut res = self.offset.clone();
        for (&i, c) in &self.h {
            if spin(i) > 0 {
                res += c;
            } else {
                res -= c;
            }
        }
        for (&(a, b), c) in &self.j {
            if spin(a) == spin(b) {
                res += c;
            } else {
                res -= c;
            }
        }
        res
    }

    fn check_spins(&self, spins: &[i8]) -> Result<()> {
        if spins.len() != self.num_variables() {
            return Err(Error::InvalidSample(format!(
                "expected {} spins, got {}",
                self.num_variables(),
                spins.len()
            )));
        }
        if let Some(s) = spins.iter().find(|&&s| s != 1 && s != -1) {
            return Err(Error::InvalidSample(format!("{} is not a spin", s)));
        }
        Ok(())
    }

    /// Maps an index-ordered spin sample back to labels (`+1` is true).
    pub fn convert_solution(&self, spins: &[i8]) -> Result<Assignment> {
        self.check_spins(spins)?;
        let bits: Vec<bool> = spins.iter().filter_map(|&s| spin_to_bool(s)).collect();
        self.mapping.to_assignment(&bits)
    }
}

impl fmt::Display for Quso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset: {}, h: {{", self.offset)?;
        for (n, (i, c)) in self.h.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", i, c)?;
        }
        write!(f, "}}, J: {{")?;
        for (n, ((a, b), c)) in self.j.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {}): {}", a, b, c)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::bool_to_spin;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    #[test]
    fn test_single_variable() {
        // x = (1 + s) / 2
        let quso = Poly::var("x").to_quso().unwrap();
        let half = BigRational::new(1.into(), 2.into());
        assert_eq!(quso.offset(), &half);
        assert_eq!(quso.field(0), half);
        assert!(quso.j().is_empty());
        assert_eq!(quso.value(&[1]).unwrap(), rat(1));
        assert_eq!(quso.value(&[-1]).unwrap(), rat(0));
    }

    #[test]
    fn test_matches_qubo_everywhere() {
        let (a, b, c) = (Poly::var("a"), Poly::var("b"), Poly::var("c"));
        let p = Poly::from(3) * &a * &b - Poly::from(5) * &a * &c + &b * &c - Poly::from(2) * &b + Poly::from(7);
        let qubo = p.to_qubo().unwrap();
        let quso = qubo.to_quso();
        assert_eq!(quso.num_variables(), 3);
        assert_eq!(quso.degree(), 2);
        for mask in 0..8u8 {
            let bits: Vec<bool> = (0..3).map(|i| (mask >> i) & 1 == 1).collect();
            let spins: Vec<i8> = bits.iter().map(|&b| bool_to_spin(b)).collect();
            assert_eq!(quso.value(&spins).unwrap(), qubo.value(&bits).unwrap());
            assert_eq!(quso.convert_solution(&spins).unwrap(), qubo.convert_solution(&bits).unwrap());
        }
    }

    #[test]
    fn test_coupling_symmetric() {
        let p = Poly::from(4) * Poly::var("a") * Poly::var("b");
        let quso = p.to_quso().unwrap();
        assert_eq!(quso.coupling(0, 1), rat(1));
        assert_eq!(quso.coupling(1, 0), rat(1));
        assert_eq!(quso.to_string(), "offset: 1, h: {0: 1, 1: 1}, J: {(0, 1): 1}");
    }

    #[test]
    fn test_high_degree_rejected() {
        let p = Poly::var("a") * Poly::var("b") * Poly::var("c");
        assert_eq!(p.to_quso().unwrap_err(), Error::DegreeTooHighForTransform { degree: 3 });
        // going through a QUBO quadratizes first
        assert!(p.to_qubo().is_ok());
    }

    #[test]
    fn test_malformed_spins() {
        let quso = (Poly::var("a") + Poly::var("b")).to_quso().unwrap();
        assert!(matches!(quso.value(&[1, 0]), Err(Error::InvalidSample(_))));
        assert!(matches!(quso.value(&[1]), Err(Error::InvalidSample(_))));
        assert!(matches!(quso.convert_solution(&[1, 2]), Err(Error::InvalidSample(_))));
    }
}
