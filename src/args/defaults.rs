use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("rinha-load/", env!("CARGO_PKG_VERSION"));

pub(crate) const LOCAL_HOST: &str = "http://localhost:9999";
pub(crate) const REMOTE_HOST: &str = "http://10.4.2.250:9999";

pub(crate) const PAYMENTS_SUMMARY_PATH: &str = "/payments-summary";
pub(crate) const PAYMENTS_PATH: &str = "/payments";

/// Pause after each `summary`/`payment` invocation.
pub(crate) const DEFAULT_WAIT: Duration = Duration::from_millis(100);
/// Pause after each `summary-slow` invocation.
pub(crate) const SLOW_SUMMARY_WAIT: Duration = Duration::from_secs(10);

/// Host fallback consulted after `--host` and `--target`.
pub(crate) const HOST_ENV: &str = "RINHA_LOAD_HOST";
