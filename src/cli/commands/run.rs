use anyhow::Result;
use chrono::Utc;
use log::warn;
use std::sync::Arc;

use wfomc_sweep::{
    oracle_from_config,
    Catalog,
    Evaluator,
    FileCheckpointStore,
    Scheduler,
    SchedulerOptions,
    SweepConfig,
};

use crate::cli::ui;

/// Exit status after Ctrl-C, as a shell reports death by SIGINT
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Run the checkpointed sweep until the bound is reached, every property
/// stalls, or the process is interrupted.
pub async fn execute(catalog: Catalog, config: &SweepConfig) -> Result<()> {
    config.validate()?;
    ui::print_header("Weighted Model Count Sweep");

    let options = SchedulerOptions::from_config(config);
    ui::print_result("Properties", &catalog.len().to_string());
    ui::print_result("Workers", &options.workers.to_string());
    ui::print_result("Policy", &options.policy.to_string());
    ui::print_result("Output directory", &config.output_dir.display().to_string());

    let started = Utc::now();
    ui::print_result("Started", &started.format("%Y-%m-%d %H:%M:%S UTC").to_string());

    let evaluator = Arc::new(Evaluator::new(oracle_from_config(&config.oracle)?));
    let store = FileCheckpointStore::new(&config.output_dir);
    let scheduler = Scheduler::new(catalog, evaluator, store, options)?
        .with_observer(Arc::new(ui::ConsoleObserver));

    let summary = tokio::select! {
        summary = scheduler.run() => summary?,
        _ = tokio::signal::ctrl_c() => {
            // records are only written by the scheduling loop, which is gone
            // now, so every checkpoint ends on a complete line
            warn!("Interrupted; in-flight units are abandoned");
            ui::print_warning("Interrupted. Completed results are checkpointed; rerun to resume.");
            // returning would wait for the blocking oracle calls to finish
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    };

    let elapsed = Utc::now() - started;
    ui::print_result("Elapsed", &format!("{:.1}s", (elapsed.num_milliseconds() as f64) / 1000.0));
    ui::print_result("Units submitted", &summary.submitted.to_string());
    ui::print_result("Records appended", &summary.appended.to_string());
    for (name, next) in &summary.resume_points {
        println!("  {:<40} next n={}", name, next);
    }

    if summary.failures.is_empty() {
        ui::print_success("Sweep completed");
    } else {
        for failure in &summary.failures {
            ui::print_error(&format!("{} stalled at n={}: {}", failure.property, failure.n, failure.message));
        }
        ui::print_warning(&format!("{} properties stalled; rerun to retry them", summary.failures.len()));
    }
    Ok(())
}
