use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::{ Path, PathBuf };
use std::time::Duration;
use thiserror::Error;

use crate::models::common::{ DispatchPolicy, OracleKind };

/// Environment variable naming the external oracle program
pub const ORACLE_COMMAND_ENV: &str = "WFOMC_ORACLE_CMD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("External oracle selected but no command configured (set oracle.command or {0})")]
    MissingOracleCommand(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OracleConfig {
    /// Which oracle backs the evaluator
    pub kind: OracleKind,

    /// Program for the external oracle
    pub command: Option<String>,

    /// Extra arguments for the external oracle program
    pub args: Vec<String>,

    /// Stderr text that identifies the zero-polynomial fault
    pub zero_fault_marker: String,

    /// Refuse grounding queries with more ground atoms than this
    pub max_ground_atoms: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            kind: OracleKind::Grounding,
            command: None,
            args: Vec::new(),
            zero_fault_marker: "IndexError".to_string(),
            max_ground_atoms: 24,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SweepConfig {
    /// Directory holding one `<property>.out` checkpoint per property
    pub output_dir: PathBuf,

    /// Number of concurrent worker slots
    pub workers: usize,

    /// Exclusive upper bound on n; unbounded when absent
    pub max_n: Option<u64>,

    pub policy: DispatchPolicy,

    /// Per-unit wall-clock limit in seconds
    pub unit_timeout_secs: Option<f64>,

    /// Restrict the sweep to these catalog properties
    pub properties: Option<Vec<String>>,

    pub oracle: OracleConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            workers: 5,
            max_n: None,
            policy: DispatchPolicy::Resubmit,
            unit_timeout_secs: None,
            properties: None,
            oracle: OracleConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Load configuration from a YAML file. Not validated here: the
    /// environment and command line may still fill in missing values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: SweepConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill unset values from the environment
    pub fn apply_env(&mut self) {
        use log::debug;

        if self.oracle.command.is_none() {
            if let Ok(command) = std::env::var(ORACLE_COMMAND_ENV) {
                debug!("Using external oracle command from {}", ORACLE_COMMAND_ENV);
                self.oracle.command = Some(command);
                self.oracle.kind = OracleKind::External;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue("workers must be at least 1".to_string()));
        }
        if let Some(secs) = self.unit_timeout_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::InvalidValue(format!("unit_timeout_secs must be positive, got {}", secs)));
            }
        }
        if self.oracle.kind == OracleKind::External && self.oracle.command.is_none() {
            return Err(ConfigError::MissingOracleCommand(ORACLE_COMMAND_ENV.to_string()));
        }
        Ok(())
    }

    pub fn unit_timeout(&self) -> Option<Duration> {
        self.unit_timeout_secs.map(Duration::from_secs_f64)
    }
}
