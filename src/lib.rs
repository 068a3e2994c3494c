// src/lib.rs

pub mod carrier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod harness;
pub mod logging;
pub mod report;
pub mod strategy;
pub mod task;
pub mod types;
pub mod wait;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{HarnessConfig, RawHarnessConfig, load_from_path};
use crate::engine::BatchOutcome;
use crate::harness::{Harness, HarnessOptions};
use crate::report::Reporter;
use crate::strategy::Strategy;
use crate::types::StrategyKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the harness (caller carrier + pools)
/// - one scenario, or all six in order with `--all`
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let mut harness = Harness::new(HarnessOptions {
        pool_sizes: cfg.pool_sizes(),
        wait_plan: cfg.wait_plan(),
        reporter: Reporter::Stderr,
    })?;

    let kinds: Vec<StrategyKind> = if args.all {
        StrategyKind::ALL.to_vec()
    } else {
        vec![cfg.strategy()]
    };
    info!(?kinds, "scenarios to run");

    for kind in kinds {
        run_scenario(&mut harness, &cfg, kind)?;
    }

    Ok(())
}

/// Defaults, then the optional config file, then CLI flags; validated once.
pub fn resolve_config(args: &CliArgs) -> Result<HarnessConfig> {
    let mut raw = match args.config {
        Some(ref path) => load_from_path(path)?,
        None => RawHarnessConfig::default(),
    };
    args.apply_to(&mut raw);
    Ok(HarnessConfig::try_from(raw)?)
}

/// Reset the caller's marker, run one batch, and report around it.
pub fn run_scenario(
    harness: &mut Harness,
    cfg: &HarnessConfig,
    kind: StrategyKind,
) -> Result<BatchOutcome> {
    let strategy = harness.strategy(kind);
    let tasks = cfg.tasks_for(kind);
    let reporter = harness.reporter();

    harness.set_ambient(cfg.initial_marker());
    reporter.scenario_started(&strategy, tasks);
    reporter.caller_marker(&harness.ambient());

    let outcome = harness.run_batch(tasks, strategy)?;
    reporter.batch_finished(&outcome);

    Ok(outcome)
}

/// Simple dry-run output: resolved config and the strategy table.
fn print_dry_run(cfg: &HarnessConfig) {
    let (min_units, max_units) = cfg.wait_bounds();
    let sizes = cfg.pool_sizes();

    println!("carrierlab dry-run");
    println!(
        "  tasks = {} (pooled scenarios: {})",
        cfg.tasks(),
        cfg.pooled_tasks()
    );
    println!("  strategy = {}", cfg.strategy());
    println!("  initial_marker = {}", cfg.initial_marker());
    println!("  pool.bounded_size = {}", sizes.bounded);
    println!("  pool.wide_size = {}", sizes.wide);
    println!("  wait = {min_units}..={max_units} units of {:?}", cfg.unit());
    if let Some(seed) = cfg.seed() {
        println!("  wait.seed = {seed}");
    }
    println!();

    println!("strategies:");
    for kind in StrategyKind::ALL {
        let strategy = Strategy::preset(kind, sizes);
        let marker = if kind == cfg.strategy() { "*" } else { " " };
        println!("  {marker} {strategy}");
    }

    debug!("dry-run complete (no execution)");
}
