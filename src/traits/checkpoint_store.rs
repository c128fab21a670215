use crate::errors::SweepResult;
use crate::models::record::ResultRecord;

/// Append-only, per-property record sequence.
///
/// For every property the stored indices are exactly `0..k`; the last record
/// is the only resumption marker.
pub trait CheckpointStore: Send + Sync {
    /// All records for `name` in order; empty when nothing was stored yet
    fn read_all(&self, name: &str) -> SweepResult<Vec<ResultRecord>>;

    /// Durably add `record` after the last one. Either the whole record is
    /// stored or nothing is.
    fn append(&self, name: &str, record: &ResultRecord) -> SweepResult<()>;

    /// First index with no record
    fn next_index(&self, name: &str) -> SweepResult<u64> {
        Ok(self
            .read_all(name)?
            .last()
            .map_or(0, |record| record.n + 1))
    }
}
