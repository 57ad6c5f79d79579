//! # pcbo-rs: Pseudo-Boolean Constrained Optimization in Rust
//!
//! **`pcbo-rs`** turns constrained optimization problems over Boolean variables into
//! **QUBO** (quadratic unconstrained binary optimization) and **QUSO** (Ising) models,
//! the input format of quantum annealers and many classical heuristics.
//!
//! ## What is a PCBO?
//!
//! A pseudo-Boolean function maps 0/1 assignments to numbers. Since `x * x = x` for a Boolean `x`,
//! every such function has a **unique multilinear polynomial** form: a sum of coefficients times
//! products of distinct variables.
//! A PCBO (pseudo-Boolean constrained optimization) instance is such a polynomial to minimize,
//! together with constraints on other polynomials (`g == 0`, `g <= 0`, ...) and Boolean gates
//! (`z == a OR b`, ...).
//!
//! ## Pipeline
//!
//! 1. **Build** polynomials with ordinary arithmetic ([`poly::Poly`]) and gates ([`gate`]).
//! 2. **Compile constraints** into penalty terms, scaled by a penalty strength λ ([`pcbo::Pcbo`]).
//!    λ can be a number or a symbolic parameter, resolved later.
//! 3. **Quadratize** terms of degree above two with ancilla variables ([`reduce`]).
//! 4. **Transform** to a QUBO or QUSO over dense indices ([`qubo`], [`quso`]).
//! 5. **Solve** with brute force ([`bruteforce`]) or a sampler ([`sampler`]), then map the sample back
//!    to labels and **validate** it against the recorded constraints.
//!
//! ## Basic Usage
//!
//! ```rust
//! use num_rational::BigRational;
//! use pcbo_rs::bruteforce::BruteForceConfig;
//! use pcbo_rs::pcbo::Pcbo;
//! use pcbo_rs::poly::Poly;
//!
//! let (a, b, z) = (Poly::var("a"), Poly::var("b"), Poly::var("z"));
//!
//! // Minimize a + b subject to z == a AND b and z == 1.
//! let mut h = Pcbo::from(&a + &b);
//! h.add_constraint_eq_and(&z, &a, &b, 3)?
//!     .add_constraint_eq_zero(&(Poly::from(1) - &z), 3, None)?;
//!
//! let best = h.solve_bruteforce(&BruteForceConfig::default())?;
//! assert_eq!(best.value, BigRational::from_integer(2.into()));
//! assert!(h.is_solution_valid(&best.assignment)?);
//!
//! // The same problem as a QUBO.
//! let qubo = h.to_qubo()?;
//! let sample = qubo.solve_bruteforce(&BruteForceConfig::default())?;
//! assert_eq!(sample.value, best.value);
//! # Ok::<(), pcbo_rs::error::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`poly`]**: Multilinear polynomials with exact rational (or symbolic) coefficients.
//! - **[`pcbo`]**: The constraint compiler and validator.
//! - **[`reduce`]**: Greedy quadratization.
//! - **[`qubo`]** and **[`quso`]**: Quadratic models and solution mapping.
//! - **[`bruteforce`]** and **[`sampler`]**: Exact and heuristic minimization.

pub mod bruteforce;
pub mod coeff;
pub mod constraint;
pub mod error;
pub mod gate;
pub mod mapping;
pub mod pcbo;
pub mod poly;
pub mod qubo;
pub mod quso;
pub mod reduce;
pub mod sampler;
pub mod term;
pub mod types;
