use std::collections::BTreeMap;
use std::io::Write;
use std::process::{ Command, Stdio };
use std::thread;

use log::{ debug, warn };
use num::rational::BigRational;
use serde::Serialize;

use crate::errors::OracleFault;
use crate::implementations::config::OracleConfig;
use crate::models::record::parse_rational;
use crate::traits::counting_oracle::{ CountingOracle, OracleQuery };

/// JSON document written to the oracle's stdin
#[derive(Debug, Serialize)]
pub struct OracleRequest<'a> {
    pub formula: &'a str,
    pub domain_size: u64,
    pub cardinality_constraints: Vec<(&'a str, u64)>,
    /// symbol -> [positive, negative], both canonical rational strings
    pub weights: BTreeMap<&'a str, [String; 2]>,
}

impl<'a> OracleRequest<'a> {
    pub fn from_query(query: &OracleQuery<'a>) -> Self {
        Self {
            formula: query.formula,
            domain_size: query.domain_size,
            cardinality_constraints: query.cardinality_constraints
                .iter()
                .map(|(symbol, target)| (symbol.as_str(), *target))
                .collect(),
            weights: query.weights
                .iter()
                .map(|(symbol, w)| (symbol, [w.positive.to_string(), w.negative.to_string()]))
                .collect(),
        }
    }
}

/// Oracle backed by an external program.
///
/// One process per query: the request goes to stdin as JSON, and on success the
/// last non-empty stdout line holds the exact count. A failing run whose stderr
/// contains `zero_fault_marker` is the zero-polynomial defect.
#[derive(Debug, Clone)]
pub struct ExternalOracle {
    program: String,
    args: Vec<String>,
    zero_fault_marker: String,
}

impl ExternalOracle {
    pub fn new(program: impl Into<String>, args: Vec<String>, zero_fault_marker: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            zero_fault_marker: zero_fault_marker.into(),
        }
    }

    pub fn from_config(config: &OracleConfig) -> Option<Self> {
        config.command
            .as_ref()
            .map(|program| Self::new(program.clone(), config.args.clone(), config.zero_fault_marker.clone()))
    }

    /// Get the command to run for one query
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Interpret a finished oracle run
    pub fn parse_output(&self, stdout: &str, stderr: &str, success: bool) -> Result<BigRational, OracleFault> {
        if !success {
            if !self.zero_fault_marker.is_empty() && stderr.contains(self.zero_fault_marker.as_str()) {
                return Err(OracleFault::ZeroPolynomial(last_line(stderr).unwrap_or_default().to_string()));
            }
            let detail = last_line(stderr).unwrap_or("no diagnostic output");
            return Err(OracleFault::Failed(format!("{} exited unsuccessfully: {}", self.program, detail)));
        }

        let line = last_line(stdout).ok_or_else(|| {
            OracleFault::Failed(format!("{} produced no result", self.program))
        })?;
        parse_rational(line).map_err(|e| OracleFault::Failed(e.to_string()))
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
}

impl CountingOracle for ExternalOracle {
    fn name(&self) -> &str {
        &self.program
    }

    fn count(&self, query: &OracleQuery<'_>) -> Result<BigRational, OracleFault> {
        let request = serde_json::to_string(&OracleRequest::from_query(query))
            .map_err(|e| OracleFault::Failed(format!("could not encode request: {}", e)))?;

        debug!("Running {} at domain size {}", self.program, query.domain_size);
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| OracleFault::Unavailable(format!("{}: {}", self.program, e)))?;

        // fed from its own thread so a chatty oracle cannot fill the output
        // pipes while the request is still being written
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || stdin.write_all(request.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| OracleFault::Unavailable(format!("{}: {}", self.program, e)))?;

        match writer.map(|handle| handle.join()) {
            // the oracle may legitimately exit before reading all input
            Some(Ok(Err(e))) => warn!("Could not write request to {}: {}", self.program, e),
            Some(Err(_)) => warn!("Request writer for {} panicked", self.program),
            _ => {}
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        self.parse_output(&stdout, &stderr, output.status.success())
    }
}
