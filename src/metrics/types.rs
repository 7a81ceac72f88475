use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::args::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Response arrived with status >= 400.
    Status,
    Timeout,
    /// Connection refused, reset, DNS failure, body read error.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    #[must_use]
    pub const fn new(kind: FailureKind, message: String) -> Self {
        Self { kind, message }
    }

    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::Transport
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// One completed task invocation.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub name: &'static str,
    pub method: HttpMethod,
    pub start: Instant,
    pub response_time: Duration,
    pub status_code: u16,
    pub response_bytes: u64,
    pub failure: Option<Failure>,
}

impl Metrics {
    #[must_use]
    pub fn new(
        name: &'static str,
        method: HttpMethod,
        start: Instant,
        status_code: u16,
        response_bytes: u64,
        failure: Option<Failure>,
    ) -> Self {
        Self {
            name,
            method,
            start,
            response_time: start.elapsed(),
            status_code,
            response_bytes,
            failure,
        }
    }

    #[must_use]
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.response_time.as_millis()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Static facts about the run, echoed into the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub host: String,
    pub users: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub method: String,
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub avg_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub median_ms: u64,
    pub p90_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
    pub avg_bytes: u64,
    /// Requests per second, fixed point with two decimals.
    pub rps_x100: u64,
    /// Failures per second, fixed point with two decimals.
    pub failures_per_sec_x100: u64,
    /// HdrHistogram V2 serialization of response times (ms), base64.
    pub histogram_b64: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub method: String,
    pub name: String,
    pub kind: FailureKind,
    pub error: String,
    pub occurrences: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub host: String,
    pub users: usize,
    pub duration_ms: u64,
    pub endpoints: Vec<EndpointReport>,
    pub aggregated: EndpointReport,
    pub failures: Vec<FailureReport>,
    pub status_counts: BTreeMap<u16, u64>,
}

impl RunReport {
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.aggregated.failures > 0
    }
}
