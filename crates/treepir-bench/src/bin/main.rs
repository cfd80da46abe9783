//! treepir-bench binary: parallel tree-PIR benchmark
//!
//! Usage:
//!   treepir-bench [OPTIONS]
//!
//! Examples:
//!   treepir-bench                                    # Interactive menu
//!   treepir-bench --strategy per-layer -k 10         # One per-layer round over 2^10 leaves
//!   treepir-bench --strategy balanced -k 8 --rounds 5 --metrics
//!   treepir-bench --barrier heuristic --engine plain # Reproduce the sleep barrier without crypto

use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use treepir_bench::{metrics, run_menu, RoundController};
use treepir_core::{BarrierMode, BenchConfig, Strategy};
use treepir_engine::{LwePirEngine, PirEngine, PlainEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    /// LWE-based PIR
    Lwe,
    /// Non-private pass-through, orchestration overhead only
    Plain,
}

#[derive(Parser, Debug)]
#[command(name = "treepir-bench")]
#[command(about = "Benchmark PIR over a tree split into parallel partitions")]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bytes per item (overrides config)
    #[arg(long)]
    item_size: Option<usize>,

    /// Start barrier: latch or heuristic (overrides config)
    #[arg(long)]
    barrier: Option<BarrierMode>,

    /// LWE secret dimension (overrides config)
    #[arg(long)]
    lwe_dim: Option<usize>,

    /// PIR engine
    #[arg(long, value_enum, default_value = "lwe")]
    engine: EngineKind,

    /// Run without the menu: whole-tree, per-layer or balanced
    #[arg(long, requires = "size_exponent")]
    strategy: Option<Strategy>,

    /// Size exponent k for batch mode (2^k leaves)
    #[arg(short = 'k', long, requires = "strategy")]
    size_exponent: Option<u32>,

    /// Rounds to run in batch mode
    #[arg(long, default_value = "1")]
    rounds: usize,

    /// Print Prometheus metrics on exit
    #[arg(long)]
    metrics: bool,
}

impl Args {
    fn bench_config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::default(),
        };
        if let Some(item_size) = self.item_size {
            config = config.with_item_size(item_size);
        }
        if let Some(barrier) = self.barrier {
            config = config.with_barrier(barrier);
        }
        if let Some(lwe_dim) = self.lwe_dim {
            let params = config.pir_params.clone().with_lwe_dim(lwe_dim);
            config = config.with_pir_params(params);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("treepir_bench=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.bench_config()?;

    let prometheus = if args.metrics {
        Some(metrics::init_prometheus_recorder()?)
    } else {
        None
    };

    tracing::info!(
        engine = ?args.engine,
        item_size = config.item_size,
        barrier = %config.barrier,
        lwe_dim = config.pir_params.lwe_dim,
        "Benchmark configured"
    );

    let result = match args.engine {
        EngineKind::Lwe => run(LwePirEngine::new(config.pir_params.clone()), config, &args),
        EngineKind::Plain => run(PlainEngine, config, &args),
    };

    if let Some(handle) = prometheus {
        println!("\n=== Metrics ===");
        println!("{}", handle.render());
    }

    result
}

fn run<E: PirEngine>(engine: E, config: BenchConfig, args: &Args) -> anyhow::Result<()> {
    let controller = RoundController::new(engine, config)?;

    let (Some(strategy), Some(size_exponent)) = (args.strategy, args.size_exponent) else {
        let stdin = io::stdin();
        let stats = run_menu(&controller, stdin.lock(), io::stdout())?;
        tracing::info!(
            rounds = stats.rounds,
            failed = stats.failed_rounds,
            invalid_inputs = stats.invalid_inputs,
            "Menu closed"
        );
        return Ok(());
    };

    let mut failed = 0;
    for round in 1..=args.rounds {
        match controller.run_round(strategy, size_exponent) {
            Ok(report) => {
                println!("\n[Round {}/{}]", round, args.rounds);
                println!("{}", report.summary());
            }
            Err(e) => {
                failed += 1;
                eprintln!("Round {} failed: {}", round, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} rounds failed", failed, args.rounds);
    }
    Ok(())
}
