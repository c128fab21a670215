use anyhow::{ anyhow, Result };
use std::sync::Arc;

use wfomc_sweep::{ oracle_from_config, Catalog, Evaluator, SweepConfig };

use crate::cli::ui;

/// Evaluate a single unit; nothing is checkpointed
pub async fn execute(catalog: &Catalog, config: &SweepConfig, property: &str, n: u64) -> Result<()> {
    let spec = catalog
        .get(property)
        .cloned()
        .ok_or_else(|| anyhow!("Unknown property: {}", property))?;
    let evaluator = Arc::new(Evaluator::new(oracle_from_config(&config.oracle)?));

    let spinner = ui::spinner_with_message(&format!("Evaluating {} at n={}...", property, n));
    let task = tokio::task::spawn_blocking(move || evaluator.evaluate_time(&spec, n));
    let outcome = task.await?;
    spinner.finish_and_clear();

    let (value, duration) = outcome?;
    ui::print_result("Property", property);
    ui::print_result("n", &n.to_string());
    ui::print_result("Value", &value.to_string());
    ui::print_result("Duration", &format!("{:.3}s", duration.as_secs_f64()));
    Ok(())
}
