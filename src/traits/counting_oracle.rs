use num::rational::BigRational;

use crate::errors::OracleFault;
use crate::models::property::WeightMap;

/// One exact weighted model counting request
#[derive(Debug, Clone, Copy)]
pub struct OracleQuery<'a> {
    /// Whitespace-free formula; free variables are universally quantified
    pub formula: &'a str,
    /// Domain size the formula is counted over
    pub domain_size: u64,
    /// (symbol, exact number of true tuples), already scaled to `domain_size`
    pub cardinality_constraints: &'a [(String, u64)],
    pub weights: &'a WeightMap,
}

/// Trait for exact weighted model counters.
///
/// Implementations block until the count is known. A count whose weighted
/// polynomial is identically zero may be reported as
/// [`OracleFault::ZeroPolynomial`] instead of `Ok(0)`.
pub trait CountingOracle: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Compute the exact weighted count for `query`
    fn count(&self, query: &OracleQuery<'_>) -> Result<BigRational, OracleFault>;
}

impl<O: CountingOracle + ?Sized> CountingOracle for Box<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn count(&self, query: &OracleQuery<'_>) -> Result<BigRational, OracleFault> {
        (**self).count(query)
    }
}
