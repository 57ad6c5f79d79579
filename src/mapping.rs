//! Bijections between variable labels and dense indices.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::types::{Assignment, Var};

/// A bijection `Var <-> 0..N`.
///
/// Indices follow the label order, so the same variable set always yields
/// the same mapping.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct VarMapping {
    to_index: BTreeMap<Var, usize>,
    to_var: Vec<Var>,
}

impl VarMapping {
    pub fn new(vars: impl IntoIterator<Item = Var>) -> Self {
        let to_var: Vec<Var> = vars.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let to_index = to_var.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();
        Self { to_index, to_var }
    }

    pub fn len(&self) -> usize {
        self.to_var.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_var.is_empty()
    }

    pub fn index(&self, v: &Var) -> Option<usize> {
        self.to_index.get(v).copied()
    }

    pub fn var(&self, index: usize) -> Option<&Var> {
        self.to_var.get(index)
    }

    /// Variables in index order.
    pub fn vars(&self) -> &[Var] {
        &self.to_var
    }

    /// Turns an index-ordered bit vector into an assignment.
    pub fn to_assignment(&self, bits: &[bool]) -> Result<Assignment> {
        if bits.len() != self.len() {
            return Err(Error::InvalidSample(format!(
                "expected {} values, got {}",
                self.len(),
                bits.len()
            )));
        }
        Ok(self.to_var.iter().cloned().zip(bits.iter().copied()).collect())
    }

    /// Turns an assignment into an index-ordered bit vector.
    pub fn to_bits(&self, assignment: &Assignment) -> Result<Vec<bool>> {
        self.to_var
            .iter()
            .map(|v| assignment.get(v).copied().ok_or_else(|| Error::MissingVariable(v.clone())))
            .collect()
    }

    /// Assignment where variable `i` takes bit `i` of `mask`.
    pub(crate) fn assignment_from_mask(&self, mask: u64) -> Assignment {
        self.to_var
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), (mask >> i) & 1 == 1))
            .collect()
    }
}
