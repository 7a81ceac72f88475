use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::Duration;

use crate::args::HttpMethod;
use crate::error::MetricsError;

use super::histogram::LatencyHistogram;
use super::types::{EndpointReport, FailureKind, FailureReport, Metrics, RunInfo, RunReport};

/// Row label used for the totals line.
const AGGREGATED_NAME: &str = "Aggregated";

type EndpointKey = (HttpMethod, &'static str);
type FailureKey = (HttpMethod, &'static str, FailureKind, String);

#[derive(Debug, Clone)]
pub struct EndpointStats {
    requests: u64,
    failures: u64,
    min_ms: Option<u64>,
    max_ms: u64,
    total_ms: u128,
    total_bytes: u64,
    histogram: LatencyHistogram,
}

impl EndpointStats {
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            requests: 0,
            failures: 0,
            min_ms: None,
            max_ms: 0,
            total_ms: 0,
            total_bytes: 0,
            histogram: LatencyHistogram::new()?,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the latency cannot be recorded in the histogram.
    pub fn record(&mut self, sample: &Metrics) -> Result<(), MetricsError> {
        let latency_ms = sample.latency_ms();
        self.requests = self.requests.saturating_add(1);
        if sample.is_failure() {
            self.failures = self.failures.saturating_add(1);
        }
        self.min_ms = Some(self.min_ms.map_or(latency_ms, |min| min.min(latency_ms)));
        self.max_ms = self.max_ms.max(latency_ms);
        self.total_ms = self.total_ms.saturating_add(u128::from(latency_ms));
        self.total_bytes = self.total_bytes.saturating_add(sample.response_bytes);
        self.histogram.record(latency_ms)
    }

    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    #[must_use]
    pub fn min_ms(&self) -> u64 {
        self.min_ms.unwrap_or(0)
    }

    #[must_use]
    pub const fn max_ms(&self) -> u64 {
        self.max_ms
    }

    #[must_use]
    pub fn avg_ms(&self) -> u64 {
        average(self.total_ms, self.requests)
    }

    #[must_use]
    pub fn percentile(&self, percentile: u8) -> u64 {
        self.histogram.percentile(percentile)
    }

    fn to_report(
        &self,
        method: &str,
        name: &str,
        duration: Duration,
    ) -> Result<EndpointReport, MetricsError> {
        Ok(EndpointReport {
            method: method.to_owned(),
            name: name.to_owned(),
            requests: self.requests,
            failures: self.failures,
            avg_ms: self.avg_ms(),
            min_ms: self.min_ms(),
            max_ms: self.max_ms,
            median_ms: self.percentile(50),
            p90_ms: self.percentile(90),
            p95_ms: self.percentile(95),
            p99_ms: self.percentile(99),
            avg_bytes: average(u128::from(self.total_bytes), self.requests),
            rps_x100: per_second_x100(self.requests, duration),
            failures_per_sec_x100: per_second_x100(self.failures, duration),
            histogram_b64: self.histogram.encode_base64()?,
        })
    }
}

/// Running statistics for a whole load run, grouped by `(method, name)`.
#[derive(Debug, Clone)]
pub struct StatsTable {
    endpoints: BTreeMap<EndpointKey, EndpointStats>,
    total: EndpointStats,
    failures: BTreeMap<FailureKey, u64>,
    status_counts: BTreeMap<u16, u64>,
}

impl StatsTable {
    /// # Errors
    ///
    /// Returns an error if the aggregate histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            endpoints: BTreeMap::new(),
            total: EndpointStats::new()?,
            failures: BTreeMap::new(),
            status_counts: BTreeMap::new(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the sample cannot be recorded in a histogram.
    pub fn record(&mut self, sample: &Metrics) -> Result<(), MetricsError> {
        let endpoint = match self.endpoints.entry((sample.method, sample.name)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(EndpointStats::new()?),
        };
        endpoint.record(sample)?;
        self.total.record(sample)?;

        if sample.status_code != 0 {
            let count = self.status_counts.entry(sample.status_code).or_insert(0);
            *count = count.saturating_add(1);
        }
        if let Some(failure) = sample.failure.as_ref() {
            let key = (
                sample.method,
                sample.name,
                failure.kind,
                failure.message.clone(),
            );
            let count = self.failures.entry(key).or_insert(0);
            *count = count.saturating_add(1);
        }
        Ok(())
    }

    #[must_use]
    pub const fn total(&self) -> &EndpointStats {
        &self.total
    }

    #[must_use]
    pub fn endpoint(&self, method: HttpMethod, name: &str) -> Option<&EndpointStats> {
        self.endpoints
            .iter()
            .find(|((key_method, key_name), _)| *key_method == method && *key_name == name)
            .map(|(_, stats)| stats)
    }

    #[must_use]
    pub fn status_count(&self, status: u16) -> u64 {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    /// Freezes the table into a serializable report.
    ///
    /// # Errors
    ///
    /// Returns an error if a histogram cannot be serialized.
    pub fn into_report(self, info: &RunInfo) -> Result<RunReport, MetricsError> {
        let mut endpoints = Vec::with_capacity(self.endpoints.len());
        for ((method, name), stats) in &self.endpoints {
            endpoints.push(stats.to_report(method.as_str(), name, info.duration)?);
        }
        let aggregated = self.total.to_report("", AGGREGATED_NAME, info.duration)?;

        let mut failures: Vec<FailureReport> = self
            .failures
            .into_iter()
            .map(|((method, name, kind, error), occurrences)| FailureReport {
                method: method.as_str().to_owned(),
                name: name.to_owned(),
                kind,
                error,
                occurrences,
            })
            .collect();
        failures.sort_by(|left, right| right.occurrences.cmp(&left.occurrences));

        Ok(RunReport {
            host: info.host.clone(),
            users: info.users,
            duration_ms: u64::try_from(info.duration.as_millis()).unwrap_or(u64::MAX),
            endpoints,
            aggregated,
            failures,
            status_counts: self.status_counts,
        })
    }
}

fn average(total: u128, count: u64) -> u64 {
    total
        .checked_div(u128::from(count))
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(0)
}

fn per_second_x100(count: u64, duration: Duration) -> u64 {
    let duration_ms = duration.as_millis().max(1);
    let scaled = u128::from(count)
        .saturating_mul(100_000)
        .checked_div(duration_ms)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
