//! Samplers: external minimizers of QUBO models.
//!
//! A [`Sampler`] receives a [`Qubo`] and returns its best bitstring together
//! with the *raw* energy, i.e. the QUBO value without the stored offset.
//! [`Qubo::solve_with`] adds the offset back and maps the bits to labels.
//!
//! Two samplers are provided:
//!
//! - [`ExhaustiveSampler`], exact, by enumeration;
//! - [`SimulatedAnnealer`], heuristic, by Metropolis updates on the spin form.

use log::{debug, info};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::bruteforce::{BruteForceConfig, Solution};
use crate::error::{Error, Result};
use crate::qubo::Qubo;
use crate::types::bool_to_spin;

/// Best bitstring found and its energy without the model offset.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Sample {
    pub bits: Vec<bool>,
    pub energy: BigRational,
}

pub trait Sampler {
    /// Returns the best of `num_reads` samples of `qubo`.
    fn sample(&mut self, qubo: &Qubo, num_reads: usize) -> Result<Sample>;
}

impl Qubo {
    /// Minimizes with an external sampler.
    ///
    /// The sampler's energy excludes the offset; it is added back here so the
    /// returned value is the true objective value.
    pub fn solve_with<S: Sampler + ?Sized>(&self, sampler: &mut S, num_reads: usize) -> Result<Solution> {
        let sample = sampler.sample(self, num_reads)?;
        let assignment = self.convert_solution(&sample.bits)?;
        let value = sample.energy + self.offset();
        info!("sampler result: value {}", value);
        Ok(Solution { value, assignment })
    }
}

/// Exact sampler backed by brute-force enumeration.
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSampler {
    config: BruteForceConfig,
}

impl ExhaustiveSampler {
    pub fn new(config: BruteForceConfig) -> Self {
        Self { config }
    }
}

impl Sampler for ExhaustiveSampler {
    fn sample(&mut self, qubo: &Qubo, _num_reads: usize) -> Result<Sample> {
        let best = qubo.solve_bruteforce(&self.config)?;
        let bits = qubo.mapping().to_bits(&best.assignment)?;
        Ok(Sample {
            bits,
            energy: best.value - qubo.offset(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnnealerConfig {
    /// Sweeps per read; one sweep is `n` proposed flips (default: 1000)
    pub num_sweeps: usize,
    /// Temperature of the first sweep (default: 10.0)
    pub initial_temperature: f64,
    /// Temperature of the last sweep (default: 0.05)
    pub final_temperature: f64,
    /// Seed for the random number generator (default: 0)
    pub seed: u64,
}

impl Default for AnnealerConfig {
    fn default() -> Self {
        Self {
            num_sweeps: 1000,
            initial_temperature: 10.0,
            final_temperature: 0.05,
            seed: 0,
        }
    }
}

impl AnnealerConfig {
    pub fn with_num_sweeps(mut self, num_sweeps: usize) -> Self {
        self.num_sweeps = num_sweeps;
        self
    }

    pub fn with_temperatures(mut self, initial: f64, last: f64) -> Self {
        self.initial_temperature = initial;
        self.final_temperature = last;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Simulated annealing on the spin form of a QUBO.
///
/// Each read starts from uniformly random spins and runs `num_sweeps` sweeps
/// under a geometric temperature schedule. A proposed flip of spin `i`
/// changes the energy by `dE = -2 * s_i * (h_i + Σ_j J_ij * s_j)` and is
/// accepted if `dE <= 0` or with probability `exp(-dE / T)`.
///
/// The search runs in `f64`. The returned energy is recomputed exactly.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealer {
    config: AnnealerConfig,
    rng: ChaCha8Rng,
}

impl SimulatedAnnealer {
    pub fn new(config: AnnealerConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &AnnealerConfig {
        &self.config
    }

    fn temperature(&self, sweep: usize) -> f64 {
        let AnnealerConfig {
            num_sweeps,
            initial_temperature: t0,
            final_temperature: t1,
            ..
        } = self.config;
        if num_sweeps <= 1 {
            return t1;
        }
        let frac = sweep as f64 / (num_sweeps - 1) as f64;
        t0 * (t1 / t0).powf(frac)
    }

    fn anneal(&mut self, model: &SpinModel) -> Vec<i8> {
        let n = model.h.len();
        let mut spins: Vec<i8> = (0..n).map(|_| bool_to_spin(self.rng.random_bool(0.5))).collect();
        for sweep in 0..self.config.num_sweeps {
            let t = self.temperature(sweep);
            for _ in 0..n {
                let i = self.rng.random_range(0..n);
                let de = model.flip_delta(&spins, i);
                if de <= 0.0 || self.rng.random::<f64>() < (-de / t).exp() {
                    spins[i] = -spins[i];
                }
            }
        }
        spins
    }
}

impl Default for SimulatedAnnealer {
    fn default() -> Self {
        Self::new(AnnealerConfig::default())
    }
}

/// Floating-point adjacency form of a QUSO.
struct SpinModel {
    h: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl SpinModel {
    fn new(qubo: &Qubo) -> Result<Self> {
        let quso = qubo.to_quso();
        let n = quso.num_variables();
        let to_f64 = |c: &BigRational| {
            c.to_f64()
                .ok_or_else(|| Error::InvalidSample(format!("coefficient {} does not fit in f64", c)))
        };

        let mut h = vec![0.0; n];
        for (&i, c) in quso.h() {
            h[i] = to_f64(c)?;
        }
        let mut neighbors = vec![Vec::new(); n];
        for (&(a, b), c) in quso.j() {
            let c = to_f64(c)?;
            neighbors[a].push((b, c));
            neighbors[b].push((a, c));
        }
        Ok(Self { h, neighbors })
    }

    fn flip_delta(&self, spins: &[i8], i: usize) -> f64 {
        let local = self.h[i]
            + self.neighbors[i]
                .iter()
                .map(|&(j, c)| c * spins[j] as f64)
                .sum::<f64>();
        -2.0 * spins[i] as f64 * local
    }
}

impl Sampler for SimulatedAnnealer {
    fn sample(&mut self, qubo: &Qubo, num_reads: usize) -> Result<Sample> {
        let model = SpinModel::new(qubo)?;
        let offset = qubo.offset();

        let mut best: Option<Sample> = None;
        for read in 0..num_reads.max(1) {
            let spins = self.anneal(&model);
            let bits: Vec<bool> = spins.iter().map(|&s| s > 0).collect();
            let energy = qubo.value(&bits)? - &offset;
            debug!("read {}: energy {}", read, energy);
            if best.as_ref().map_or(true, |b| energy < b.energy) {
                best = Some(Sample { bits, energy });
            }
        }
        best.ok_or_else(|| Error::InvalidSample("no reads".to_string()))
    }
}
