use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use num::rational::BigRational;

use crate::errors::{ SweepError, SweepResult };

/// One completed (property, n) computation as persisted in a checkpoint.
///
/// Line format is `n,value,duration`. `value` is the canonical rational form
/// (`a` or `a/b`, reduced), which never contains a comma, so `n` is read up to
/// the first comma and `duration` after the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub n: u64,
    pub value: BigRational,
    pub duration_secs: f64,
}

impl ResultRecord {
    pub fn new(n: u64, value: BigRational, duration: Duration) -> Self {
        Self { n, value, duration_secs: duration.as_secs_f64() }
    }

    /// Checkpoint line, without the trailing newline
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    pub fn parse_line(line: &str) -> SweepResult<Self> {
        line.parse()
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.n, self.value, self.duration_secs)
    }
}

impl FromStr for ResultRecord {
    type Err = SweepError;

    fn from_str(line: &str) -> SweepResult<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (n, rest) = line
            .split_once(',')
            .ok_or_else(|| SweepError::MalformedRecord(format!("missing fields in '{}'", line)))?;
        let (value, duration) = rest
            .rsplit_once(',')
            .ok_or_else(|| SweepError::MalformedRecord(format!("missing duration in '{}'", line)))?;
        if value.contains(',') {
            return Err(SweepError::MalformedRecord(format!("too many fields in '{}'", line)));
        }

        let n = n
            .trim()
            .parse::<u64>()
            .map_err(|e| SweepError::MalformedRecord(format!("bad index '{}': {}", n, e)))?;
        let value = parse_rational(value.trim())?;
        let duration_secs = duration
            .trim()
            .parse::<f64>()
            .map_err(|e| SweepError::MalformedRecord(format!("bad duration '{}': {}", duration, e)))?;
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(SweepError::MalformedRecord(format!("bad duration '{}'", duration)));
        }

        Ok(Self { n, value, duration_secs })
    }
}

/// Parse a canonical rational string (`a` or `a/b`)
pub fn parse_rational(text: &str) -> SweepResult<BigRational> {
    if text.is_empty() {
        return Err(SweepError::MalformedRecord("empty rational".to_string()));
    }
    // zero denominators are rejected before reaching `Ratio`
    if let Some((_, denom)) = text.split_once('/') {
        if denom.trim_start_matches(['+', '-']).chars().all(|c| c == '0') {
            return Err(SweepError::MalformedRecord(format!("zero denominator in '{}'", text)));
        }
    }
    BigRational::from_str(text).map_err(|e|
        SweepError::MalformedRecord(format!("bad rational '{}': {}", text, e))
    )
}
