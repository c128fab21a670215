pub mod catalog;
pub mod common;
pub mod property;
pub mod record;

// Re-export common model types
pub use catalog::Catalog;
pub use common::{DispatchPolicy, OracleKind};
pub use property::{CardinalityConstraint, Divisor, PropertySpec, PropertySpecBuilder, Weight, WeightMap};
pub use record::ResultRecord;
