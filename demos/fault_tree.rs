//! Smallest cut set of a fault tree, as a penalized QUBO.
//!
//! Run with:
//! ```bash
//! cargo run --example fault_tree -- --lam 2 --sampler anneal --reads 20
//! ```

use clap::{Parser, ValueEnum};
use log::info;

use pcbo_rs::bruteforce::BruteForceConfig;
use pcbo_rs::coeff::Symbol;
use pcbo_rs::pcbo::Pcbo;
use pcbo_rs::poly::Poly;
use pcbo_rs::sampler::{AnnealerConfig, ExhaustiveSampler, Sampler, SimulatedAnnealer};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum SamplerKind {
    /// Enumerate every assignment.
    Brute,
    /// Simulated annealing.
    Anneal,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Penalty strength.
    #[arg(long, value_name = "INT", default_value = "2")]
    lam: i64,

    /// Sampler used on the QUBO.
    #[arg(long, value_enum, default_value = "brute")]
    sampler: SamplerKind,

    /// Number of sampler reads.
    #[arg(long, value_name = "INT", default_value = "10")]
    reads: usize,

    /// Annealing sweeps per read.
    #[arg(long, value_name = "INT", default_value = "1000")]
    sweeps: usize,

    /// Random seed for annealing.
    #[arg(long, value_name = "INT", default_value = "0")]
    seed: u64,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    // Basic events e0..e3, gates z0..z2:
    //   z0 = e0 OR e3
    //   z1 = e2 OR z0
    //   z2 = e0 OR e1
    //   top = z1 AND z2, forced to occur
    let e: Vec<Poly> = (0..4).map(|i| Poly::var(format!("e{}", i))).collect();
    let z: Vec<Poly> = (0..3).map(|i| Poly::var(format!("z{}", i))).collect();

    // Build once with a symbolic penalty, resolve per run.
    let lam = Symbol::new("lam");
    let mut h = Pcbo::from(e.iter().fold(Poly::zero(), |acc, x| acc + x));
    h.add_constraint_eq_or(&z[0], &e[0], &e[3], &lam)?
        .add_constraint_eq_or(&z[1], &e[2], &z[0], &lam)?
        .add_constraint_eq_or(&z[2], &e[0], &e[1], &lam)?
        .add_constraint_and(&z[1], &z[2], &lam)?;
    println!("H = {}", h.objective());
    for c in h.constraint_records() {
        println!("  s.t. {}", c);
    }

    let h = h.resolve_int(&lam, args.lam);
    info!(
        "PCBO: {} variables, {} terms, degree {}",
        h.num_variables(),
        h.objective().num_terms(),
        h.degree()
    );

    let qubo = h.to_qubo()?;
    for a in qubo.ancillas() {
        println!("ancilla {}", a);
    }
    println!("QUBO = {}", qubo);

    let mut sampler: Box<dyn Sampler> = match args.sampler {
        SamplerKind::Brute => Box::new(ExhaustiveSampler::new(BruteForceConfig::default())),
        SamplerKind::Anneal => Box::new(SimulatedAnnealer::new(
            AnnealerConfig::default()
                .with_num_sweeps(args.sweeps)
                .with_seed(args.seed),
        )),
    };

    let time_solve = std::time::Instant::now();
    let solution = qubo.solve_with(sampler.as_mut(), args.reads)?;
    let time_solve = time_solve.elapsed();

    let assignment = h.convert_solution(&solution.assignment);
    let valid = h.is_solution_valid(&assignment)?;
    println!("value = {}", solution.value);
    for (v, b) in &assignment {
        println!("  {} = {}", v, u8::from(*b));
    }
    println!("valid = {}", valid);
    println!("solved in {:.3} s", time_solve.as_secs_f64());

    if !valid {
        println!("Penalty too weak: try a larger --lam");
    }

    Ok(())
}
