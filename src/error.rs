//! Error type shared by all model operations.

use std::fmt;

use crate::coeff::Symbol;
use crate::types::Var;

/// Failures surfaced by polynomial, constraint and model operations.
///
/// Every operation in this crate is deterministic, so none of these errors is
/// worth retrying: the same inputs reproduce the same failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Evaluation on an assignment that does not cover a required variable.
    MissingVariable(Var),
    /// Substitution of a variable with something that is not 0/1-valued.
    InvalidSubstitution { var: Var, reason: String },
    /// A quadratic transform was requested on a polynomial of higher degree.
    DegreeTooHighForTransform { degree: usize },
    /// Exhaustive search over more variables than the configured ceiling.
    IntractableSize { num_variables: usize, max_variables: usize },
    /// A constraint was added without a usable bound on its value.
    UnboundedConstraint(String),
    /// A numeric operation met a coefficient that still depends on a parameter.
    UnresolvedParameter(Symbol),
    /// A sampler returned an assignment that does not fit the model.
    InvalidSample(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingVariable(v) => write!(f, "assignment is missing variable {}", v),
            Error::InvalidSubstitution { var, reason } => {
                write!(f, "invalid substitution for {}: {}", var, reason)
            }
            Error::DegreeTooHighForTransform { degree } => {
                write!(f, "polynomial has degree {}, but at most 2 is required", degree)
            }
            Error::IntractableSize {
                num_variables,
                max_variables,
            } => write!(
                f,
                "brute force over {} variables exceeds the limit of {}",
                num_variables, max_variables
            ),
            Error::UnboundedConstraint(msg) => write!(f, "unbounded constraint: {}", msg),
            Error::UnresolvedParameter(s) => write!(f, "coefficient depends on unresolved parameter {}", s),
            Error::InvalidSample(msg) => write!(f, "invalid sample: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
