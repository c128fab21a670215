pub mod config;
pub mod evaluator;
pub mod external_oracle;
pub mod file_store;
pub mod formula;
pub mod grounding_oracle;
pub mod scheduler;
