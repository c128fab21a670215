use anyhow::Result;
use std::path::{ Path, PathBuf };

use wfomc_sweep::{ Catalog, SweepConfig };

use crate::cli::OracleArgs;

pub mod eval;
pub mod list;
pub mod run;
pub mod status;

/// Configuration from `path` (or defaults), then the environment, then flags
pub fn load_config(path: Option<&Path>, output_dir: Option<&PathBuf>) -> Result<SweepConfig> {
    let mut config = match path {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::default(),
    };
    config.apply_env();
    if let Some(dir) = output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

pub fn apply_oracle_args(config: &mut SweepConfig, args: &OracleArgs) {
    if let Some(command) = &args.oracle_command {
        config.oracle.command = Some(command.clone());
        config.oracle.kind = wfomc_sweep::OracleKind::External;
    }
    if let Some(kind) = args.oracle {
        config.oracle.kind = kind;
    }
    if let Some(limit) = args.max_ground_atoms {
        config.oracle.max_ground_atoms = limit;
    }
}

/// Built-in catalog, narrowed to `names` when given
pub fn catalog_for(names: &[String]) -> Result<Catalog> {
    let catalog = Catalog::builtin()?;
    if names.is_empty() {
        Ok(catalog)
    } else {
        Ok(catalog.select(names)?)
    }
}
