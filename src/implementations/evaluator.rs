use std::time::{ Duration, Instant };

use log::debug;
use num::bigint::{ BigInt, Sign };
use num::rational::BigRational;
use num::traits::Zero;

use crate::errors::{ OracleFault, RecoverableError, SweepError, SweepResult };
use crate::models::property::PropertySpec;
use crate::models::record::ResultRecord;
use crate::traits::counting_oracle::{ CountingOracle, OracleQuery };

/// Evaluates one (property, n) unit against a counting oracle
pub struct Evaluator<O> {
    oracle: O,
}

impl<O: CountingOracle> Evaluator<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Exact value of `spec` at index `n`: the oracle count at the scaled
    /// size divided by the property's divisor.
    pub fn evaluate(&self, spec: &PropertySpec, n: u64) -> SweepResult<BigRational> {
        let overflow = || SweepError::SizeOverflow { property: spec.name().to_string(), n };
        let size = spec.scaled_size(n).ok_or_else(overflow)?;
        let constraints = spec.scaled_constraints(size).ok_or_else(overflow)?;

        let query = OracleQuery {
            formula: spec.formula(),
            domain_size: size,
            cardinality_constraints: &constraints,
            weights: spec.weights(),
        };

        let raw = match self.oracle.count(&query) {
            Ok(count) => count,
            Err(fault) => self.recover(spec, n, fault)?,
        };

        let divisor = spec.divisor().apply(size);
        if divisor.sign() != Sign::Plus {
            return Err(SweepError::InvalidDivisor {
                property: spec.name().to_string(),
                size,
                value: divisor.to_string(),
            });
        }

        Ok(raw / BigRational::from_integer(divisor))
    }

    /// [`Self::evaluate`] plus the wall-clock time it took
    pub fn evaluate_time(&self, spec: &PropertySpec, n: u64) -> SweepResult<(BigRational, Duration)> {
        let start = Instant::now();
        let value = self.evaluate(spec, n)?;
        Ok((value, start.elapsed()))
    }

    pub fn evaluate_record(&self, spec: &PropertySpec, n: u64) -> SweepResult<ResultRecord> {
        let (value, duration) = self.evaluate_time(spec, n)?;
        Ok(ResultRecord::new(n, value, duration))
    }

    // Only the zero-polynomial fault is masked; everything else propagates.
    fn recover(&self, spec: &PropertySpec, n: u64, fault: OracleFault) -> SweepResult<BigRational> {
        if fault.is_recoverable() {
            debug!(
                "{} returned {} for {} at n={}; recovering: {}",
                self.oracle.name(),
                fault,
                spec.name(),
                n,
                fault.recovery_strategy().unwrap_or_default()
            );
            return Ok(BigRational::from_integer(BigInt::zero()));
        }
        Err(SweepError::Oracle { property: spec.name().to_string(), n, fault })
    }
}
