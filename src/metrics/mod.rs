//! Per-endpoint request statistics, latency histograms, and the collector task.
mod collector;
mod histogram;
mod stats;
mod types;

#[cfg(test)]
mod tests;

pub use collector::{CollectorSettings, setup_metrics_collector};
pub use histogram::LatencyHistogram;
pub use stats::{EndpointStats, StatsTable};
pub use types::{
    EndpointReport, Failure, FailureKind, FailureReport, Metrics, RunInfo, RunReport,
};
