use anyhow::Result;

use wfomc_sweep::{ Catalog, CheckpointStore, FileCheckpointStore };

use crate::cli::ui;

/// Print where each property would resume
pub fn execute(catalog: &Catalog, store: &FileCheckpointStore) -> Result<()> {
    ui::print_header("Checkpoint Status");
    ui::print_result("Output directory", &store.dir().display().to_string());

    for spec in catalog.iter() {
        match store.read_all(spec.name()) {
            Ok(records) => match records.last() {
                Some(last) => println!(
                    "{:<40} next n={:<4} last {} ({:.3}s)",
                    spec.name(),
                    last.n + 1,
                    last.value,
                    last.duration_secs
                ),
                None => println!("{:<40} next n=0    no records", spec.name()),
            },
            Err(e) => ui::print_error(&format!("{}: {}", spec.name(), e)),
        }
    }

    Ok(())
}
