use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::Mutex;
use std::time::Duration;

use log::info;
use num::bigint::BigInt;
use num::rational::BigRational;

use crate::errors::OracleFault;
use crate::traits::counting_oracle::{ CountingOracle, OracleQuery };

// Setup function to initialize logging
pub fn setup() {
    if env_logger::builder().is_test(true).try_init().is_ok() {
        info!("Logger initialized");
    }
}

pub fn int(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

pub fn ratio(numer: i64, denom: i64) -> BigRational {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub formula: String,
    pub domain_size: u64,
    pub constraints: Vec<(String, u64)>,
}

type Behavior = dyn Fn(&OracleQuery<'_>) -> Result<BigRational, OracleFault> + Send + Sync;

/// Oracle whose answers come from a closure; records every query and the
/// peak number of concurrent calls.
pub struct ScriptedOracle {
    behavior: Box<Behavior>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(
        behavior: impl Fn(&OracleQuery<'_>) -> Result<BigRational, OracleFault> + Send + Sync + 'static
    ) -> Self {
        Self {
            behavior: Box::new(behavior),
            delay: None,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Always answers `value`
    pub fn constant(value: BigRational) -> Self {
        Self::new(move |_| Ok(value.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl CountingOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn count(&self, query: &OracleQuery<'_>) -> Result<BigRational, OracleFault> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            formula: query.formula.to_string(),
            domain_size: query.domain_size,
            constraints: query.cardinality_constraints.to_vec(),
        });

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let result = (self.behavior)(query);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
