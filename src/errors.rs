use std::path::PathBuf;
use thiserror::Error;

/// Faults reported by a counting oracle
#[derive(Debug, Error)]
pub enum OracleFault {
    /// Out-of-range indexing inside the oracle. Only raised when the weighted
    /// count is the zero polynomial, so the true answer is exactly zero.
    #[error("zero-polynomial indexing fault: {0}")]
    ZeroPolynomial(String),

    #[error("oracle failed: {0}")]
    Failed(String),

    #[error("oracle cannot answer this query: {0}")]
    Unsupported(String),

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Custom error types for the sweep system
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Invalid property definition: {0}")]
    InvalidProperty(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Duplicate property name in catalog: {0}")]
    DuplicateProperty(String),

    #[error("Oracle error for {property} at n={n}: {fault}")]
    Oracle { property: String, n: u64, fault: OracleFault },

    #[error("Size overflow for {property} at n={n}")]
    SizeOverflow { property: String, n: u64 },

    #[error("Divisor for {property} evaluated to non-positive value {value} at size {size}")]
    InvalidDivisor { property: String, size: u64, value: String },

    #[error("Checkpoint I/O error on {path}: {source}")]
    CheckpointIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt checkpoint {path} at line {line}: {message}")]
    CorruptCheckpoint { path: PathBuf, line: usize, message: String },

    #[error("Out-of-order append for {property}: expected n={expected}, got n={got}")]
    OutOfOrderAppend { property: String, expected: u64, got: u64 },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Evaluation of {property} at n={n} timed out after {seconds}s")]
    Timeout { property: String, n: u64, seconds: f64 },

    #[error("Worker for {property} at n={n} crashed: {message}")]
    WorkerCrashed { property: String, n: u64, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::implementations::config::ConfigError),
}

/// Result type specific to sweep operations
pub type SweepResult<T> = Result<T, SweepError>;

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Stops the whole process
    Fatal,
    /// Stops a single (property, n) unit
    Error,
    Warning,
}

/// Recoverable vs. non-recoverable errors
pub trait RecoverableError {
    fn is_recoverable(&self) -> bool;
    fn recovery_strategy(&self) -> Option<String>;
}

impl RecoverableError for OracleFault {
    fn is_recoverable(&self) -> bool {
        matches!(self, OracleFault::ZeroPolynomial(_))
    }

    fn recovery_strategy(&self) -> Option<String> {
        match self {
            OracleFault::ZeroPolynomial(_) => Some("substitute an exact zero count".to_string()),
            _ => None,
        }
    }
}

impl SweepError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SweepError::CheckpointIo { .. }
            | SweepError::CorruptCheckpoint { .. }
            | SweepError::OutOfOrderAppend { .. }
            | SweepError::Config(_) => ErrorSeverity::Fatal,
            SweepError::UnknownProperty(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SweepError::CheckpointIo { path: path.into(), source }
    }
}
