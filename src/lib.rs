pub mod models;
pub mod traits;
pub mod errors;
pub mod config;
pub mod implementations;
#[cfg(test)]
pub mod tests;

// Re-export core components
pub use config::{ oracle_from_config, SweepConfig };
pub use errors::{ ErrorSeverity, OracleFault, RecoverableError, SweepError, SweepResult };
pub use implementations::evaluator::Evaluator;
pub use implementations::external_oracle::ExternalOracle;
pub use implementations::file_store::FileCheckpointStore;
pub use implementations::grounding_oracle::GroundingOracle;
pub use implementations::scheduler::{
    Scheduler,
    SchedulerOptions,
    SweepSummary,
    UnitFailure,
    DEFAULT_SWEEP_BOUND,
};
pub use models::{
    catalog::Catalog,
    common::{ DispatchPolicy, OracleKind },
    property::{ CardinalityConstraint, Divisor, PropertySpec, Weight, WeightMap },
    record::ResultRecord,
};
pub use traits::{ CheckpointStore, CountingOracle, LogObserver, OracleQuery, SweepObserver };
