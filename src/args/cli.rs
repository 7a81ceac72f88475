use chrono::{DateTime, Utc};
use clap::Parser;
use std::time::Duration;

use super::parsers::{
    parse_amount, parse_bool_env, parse_duration_arg, parse_positive_u64, parse_positive_usize,
    parse_summary_timestamp, parse_wait_arg,
};
use super::types::{Amount, PositiveU64, PositiveUsize, TargetPreset, TaskKind};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator: virtual users hammer /payments-summary (or /payments) on a target host and report latency statistics."
)]
pub struct LoadArgs {
    /// Base URL of the target (e.g. http://localhost:9999)
    #[arg(long, conflicts_with = "target")]
    pub host: Option<String>,

    /// `RINHA_LOAD_HOST`, filled in after parsing. Ranks below `--target`.
    #[arg(skip)]
    pub env_host: Option<String>,

    /// Named target host (local = http://localhost:9999, remote = http://10.4.2.250:9999)
    #[arg(long, value_enum)]
    pub target: Option<TargetPreset>,

    /// Task each virtual user runs; repeat to mix tasks (picked uniformly per iteration)
    #[arg(long = "task", value_enum)]
    pub tasks: Vec<TaskKind>,

    /// Number of concurrent virtual users
    #[arg(long, short = 'u', default_value = "1", value_parser = parse_positive_usize)]
    pub users: PositiveUsize,

    /// Virtual users started per second during ramp-up
    #[arg(long = "spawn-rate", short = 'r', default_value = "1", value_parser = parse_positive_usize)]
    pub spawn_rate: PositiveUsize,

    /// Stop after this long (supports ms/s/m/h); runs until Ctrl+C when unset
    #[arg(long = "run-time", short = 't', value_parser = parse_duration_arg)]
    pub run_time: Option<Duration>,

    /// Stop after N total requests
    #[arg(long = "requests", value_parser = parse_positive_u64)]
    pub requests: Option<PositiveU64>,

    /// Override the pause after each task invocation (supports ms/s/m/h, 0 allowed)
    #[arg(long = "wait", value_parser = parse_wait_arg)]
    pub wait: Option<Duration>,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Amount sent by the payment task
    #[arg(long, default_value = "100", value_parser = parse_amount)]
    pub amount: Amount,

    /// Summary window start, sent as the `from` query parameter (RFC 3339)
    #[arg(long, value_parser = parse_summary_timestamp)]
    pub from: Option<DateTime<Utc>>,

    /// Summary window end, sent as the `to` query parameter (RFC 3339)
    #[arg(long, value_parser = parse_summary_timestamp)]
    pub to: Option<DateTime<Utc>>,

    /// Interval between progress log lines (supports ms/s/m/h)
    #[arg(long = "stats-interval", default_value = "2s", value_parser = parse_duration_arg)]
    pub stats_interval: Duration,

    /// Export the final statistics as JSON
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Export the final statistics as CSV
    #[arg(long = "export-csv")]
    pub export_csv: Option<String>,

    /// Process exit code when at least one request failed
    #[arg(long = "exit-code-on-error", default_value = "1")]
    pub exit_code_on_error: u8,

    /// Path to config file (TOML/JSON). Defaults to ./rinha-load.toml or ./rinha-load.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by RINHA_LOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
