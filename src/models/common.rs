use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

/// Order in which ready (property, n) units are handed to free workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPolicy {
    /// One in-flight unit per property; a completed property rejoins the back
    /// of the queue with its next n.
    #[default]
    Resubmit,
    /// Lowest ready n first, ties broken by catalog position. Still one
    /// in-flight unit per property, so a slow property at a small n does not
    /// hold the others back; this is not a strict barrier between values of n.
    Sweep,
}

impl FromStr for DispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resubmit" | "self-resubmitting" => Ok(DispatchPolicy::Resubmit),
            "sweep" | "bounded-sweep" => Ok(DispatchPolicy::Sweep),
            _ => Err(format!("unknown dispatch policy '{}' (expected resubmit|sweep)", s)),
        }
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchPolicy::Resubmit => write!(f, "resubmit"),
            DispatchPolicy::Sweep => write!(f, "sweep"),
        }
    }
}

/// Which counting oracle backs the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Exhaustive in-process enumeration, only for tiny domains
    #[default]
    Grounding,
    /// Subprocess speaking the JSON request protocol
    External,
}

impl FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grounding" => Ok(OracleKind::Grounding),
            "external" => Ok(OracleKind::External),
            _ => Err(format!("unknown oracle kind '{}' (expected grounding|external)", s)),
        }
    }
}
