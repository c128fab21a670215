use log::info;

use crate::implementations::config::{ ConfigError, OracleConfig, ORACLE_COMMAND_ENV };
use crate::implementations::external_oracle::ExternalOracle;
use crate::implementations::grounding_oracle::GroundingOracle;
use crate::models::common::OracleKind;
use crate::traits::counting_oracle::CountingOracle;

pub use crate::implementations::config::SweepConfig;

/// Oracle selected by `config`
pub fn oracle_from_config(config: &OracleConfig) -> Result<Box<dyn CountingOracle>, ConfigError> {
    match config.kind {
        OracleKind::Grounding => {
            info!("Using grounding oracle (max {} ground atoms)", config.max_ground_atoms);
            Ok(Box::new(GroundingOracle::new(config.max_ground_atoms)))
        }
        OracleKind::External => {
            let oracle = ExternalOracle::from_config(config)
                .ok_or_else(|| ConfigError::MissingOracleCommand(ORACLE_COMMAND_ENV.to_string()))?;
            info!("Using external oracle {}", oracle.name());
            Ok(Box::new(oracle))
        }
    }
}
