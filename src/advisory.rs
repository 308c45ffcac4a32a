//! Critical-advisory scanning over resolved coordinates
//!
//! This module only models the boundary: advisories in the OSV JSON shape, the
//! criticality rule, and a retrying scanner over an [`AdvisorySource`]. No
//! network client ships here; callers supply the source.

use crate::model::Coordinate;
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Score at or above which an advisory is critical
pub const CRITICAL_SCORE: f64 = 9.0;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);
const OSV_ECOSYSTEM: &str = "Maven";

fn numeric_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d+|\d+").expect("valid regex"))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeverityEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub score: Value,
}

/// One vulnerability record as returned by an OSV query
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Advisory {
    #[serde(default = "unknown_id")]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub severity: Vec<SeverityEntry>,
    #[serde(default)]
    pub database_specific: Option<Value>,
}

fn unknown_id() -> String {
    "UNKNOWN".to_string()
}

impl Advisory {
    /// True when a severity score reaches [`CRITICAL_SCORE`] or is labelled
    /// CRITICAL, checking the severity list before database-specific data
    pub fn is_critical(&self) -> bool {
        for entry in &self.severity {
            if parse_score(&entry.score).is_some_and(|s| s >= CRITICAL_SCORE) {
                return true;
            }
            if score_text(&entry.score).to_uppercase().contains("CRITICAL") {
                return true;
            }
        }

        let Some(db) = &self.database_specific else {
            return false;
        };
        if db
            .get("cvss")
            .and_then(|cvss| cvss.get("score"))
            .and_then(parse_score)
            .is_some_and(|s| s >= CRITICAL_SCORE)
        {
            return true;
        }
        db.get("severity")
            .map(|s| score_text(s).to_uppercase() == "CRITICAL")
            .unwrap_or(false)
    }
}

fn score_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First numeric token of a score; a CVSS vector such as `CVSS:3.1/...`
/// therefore yields its version number
fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_token().find(s)?.as_str().parse().ok(),
        _ => None,
    }
}

/// Request body for an OSV `query` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsvQuery {
    pub version: String,
    pub package: OsvPackage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsvPackage {
    pub name: String,
    pub ecosystem: String,
}

impl From<&Coordinate> for OsvQuery {
    fn from(coordinate: &Coordinate) -> Self {
        Self {
            version: coordinate.version.clone(),
            package: OsvPackage {
                name: format!("{}:{}", coordinate.group, coordinate.artifact),
                ecosystem: OSV_ECOSYSTEM.to_string(),
            },
        }
    }
}

/// Anything that can list advisories for a coordinate
pub trait AdvisorySource {
    fn query(&self, coordinate: &Coordinate) -> Result<Vec<Advisory>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalFinding {
    pub coordinate: Coordinate,
    pub advisory_id: String,
    pub summary: String,
}

/// Queries every coordinate and keeps critical advisories
pub struct CriticalScanner<S> {
    source: S,
    attempts: u32,
    backoff: Duration,
}

impl<S: AdvisorySource> CriticalScanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Base delay; attempt `n` waits `n * backoff` before retrying
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Findings are reported in input order. A coordinate whose query still
    /// fails after the last attempt aborts the scan.
    pub fn scan(&self, coordinates: &[Coordinate]) -> Result<Vec<CriticalFinding>> {
        let mut findings = Vec::new();
        for coordinate in coordinates {
            for advisory in self.query_with_retry(coordinate)? {
                if advisory.is_critical() {
                    debug!(coordinate = %coordinate, advisory = %advisory.id, "Critical advisory");
                    findings.push(CriticalFinding {
                        coordinate: coordinate.clone(),
                        advisory_id: advisory.id,
                        summary: advisory.summary,
                    });
                }
            }
        }
        Ok(findings)
    }

    fn query_with_retry(&self, coordinate: &Coordinate) -> Result<Vec<Advisory>> {
        let mut attempt = 1;
        loop {
            match self.source.query(coordinate) {
                Ok(advisories) => return Ok(advisories),
                Err(e) if attempt < self.attempts => {
                    warn!(
                        coordinate = %coordinate,
                        attempt,
                        error = %e,
                        "Advisory query failed, retrying"
                    );
                    thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.context(format!(
                        "Advisory query for {} failed after {} attempts",
                        coordinate, attempt
                    )))
                }
            }
        }
    }
}
