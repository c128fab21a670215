pub mod checkpoint_store;
pub mod counting_oracle;
pub mod sweep_observer;

// Re-export traits
pub use checkpoint_store::CheckpointStore;
pub use counting_oracle::{CountingOracle, OracleQuery};
pub use sweep_observer::{LogObserver, SweepObserver};
