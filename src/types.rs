//! Variable labels, assignments and spin helpers.
//!
//! Variables are opaque labels: either a name or a small integer. A variable
//! carries no state besides its label, so two variables with the same label
//! are the same variable in every polynomial they occur in.
use std::collections::BTreeMap;
use std::fmt;

/// A Boolean variable label.
///
/// Labels are totally ordered (indices before names, then by value). The
/// order is what keeps monomials canonical and mappings deterministic.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Var {
    Index(u32),
    Name(String),
}

impl Var {
    /// Creates a named variable.
    pub fn name(name: impl Into<String>) -> Self {
        Var::Name(name.into())
    }

    /// Creates an integer-labelled variable.
    pub fn index(index: u32) -> Self {
        Var::Index(index)
    }

    /// Returns the name, if this is a named variable.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Var::Name(name) => Some(name),
            Var::Index(_) => None,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Index(i) => write!(f, "x{}", i),
            Var::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Var::Name(name.to_string())
    }
}

impl From<String> for Var {
    fn from(name: String) -> Self {
        Var::Name(name)
    }
}

impl From<u32> for Var {
    fn from(index: u32) -> Self {
        Var::Index(index)
    }
}

/// A (possibly partial) assignment of Boolean values to variables.
pub type Assignment = BTreeMap<Var, bool>;

/// Builds an assignment from `(label, value)` pairs.
///
/// Values are interpreted as bits: `0` is false, anything else is true.
pub fn assignment<V, I>(pairs: I) -> Assignment
where
    V: Into<Var>,
    I: IntoIterator<Item = (V, u8)>,
{
    pairs.into_iter().map(|(v, b)| (v.into(), b != 0)).collect()
}

/// Maps a bit to a spin: `0 -> -1`, `1 -> +1`.
pub fn bool_to_spin(b: bool) -> i8 {
    if b {
        1
    } else {
        -1
    }
}

/// Maps a spin to a bit: `-1 -> 0`, `+1 -> 1`.
///
/// Returns `None` for values that are not spins.
pub fn spin_to_bool(s: i8) -> Option<bool> {
    match s {
        1 => Some(true),
        -1 => Some(false),
        _ => None,
    }
}
