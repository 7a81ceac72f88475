use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{Amount, LoadArgs, PositiveU64, PositiveUsize, parsers::parse_timestamp_value};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Values given on the
/// command line or through an environment variable win over the file;
/// `RINHA_LOAD_HOST` (in `args.env_host`) pins the host the same way.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each
/// other.
pub fn apply_config(
    args: &mut LoadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.host.is_some() && config.target.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "host",
            right: "target",
        }));
    }

    let host_pinned = is_explicit(matches, "host")
        || is_explicit(matches, "target")
        || args.env_host.is_some();
    if !host_pinned {
        if let Some(host) = config.host.clone() {
            args.host = Some(host);
        }
        if let Some(target) = config.target {
            args.target = Some(target);
        }
    }

    if !is_explicit(matches, "tasks")
        && let Some(tasks) = config.tasks.clone()
    {
        args.tasks = tasks;
    }

    if !is_explicit(matches, "users")
        && let Some(users) = config.users
    {
        args.users = ensure_positive_usize(users, "users")?;
    }

    if !is_explicit(matches, "spawn_rate")
        && let Some(spawn_rate) = config.spawn_rate
    {
        args.spawn_rate = ensure_positive_usize(spawn_rate, "spawn_rate")?;
    }

    if !is_explicit(matches, "run_time")
        && let Some(run_time) = config.run_time.as_ref()
    {
        args.run_time = Some(to_duration(run_time, "run_time", false)?);
    }

    if !is_explicit(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = Some(ensure_positive_u64(requests, "requests")?);
    }

    if !is_explicit(matches, "wait")
        && let Some(wait) = config.wait.as_ref()
    {
        args.wait = Some(to_duration(wait, "wait", true)?);
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "timeout", false)?;
    }

    if !is_explicit(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(timeout, "connect_timeout", false)?;
    }

    if !is_explicit(matches, "amount")
        && let Some(amount) = config.amount
    {
        args.amount = Amount::try_from(amount).map_err(|err| invalid_field("amount", err))?;
    }

    if !is_explicit(matches, "from")
        && let Some(from) = config.from.as_deref()
    {
        args.from = Some(parse_timestamp_value(from).map_err(|err| invalid_field("from", err))?);
    }

    if !is_explicit(matches, "to")
        && let Some(to) = config.to.as_deref()
    {
        args.to = Some(parse_timestamp_value(to).map_err(|err| invalid_field("to", err))?);
    }

    if !is_explicit(matches, "stats_interval")
        && let Some(interval) = config.stats_interval.as_ref()
    {
        args.stats_interval = to_duration(interval, "stats_interval", false)?;
    }

    if !is_explicit(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_explicit(matches, "export_csv")
        && let Some(path) = config.export_csv.clone()
    {
        args.export_csv = Some(path);
    }

    if !is_explicit(matches, "exit_code_on_error")
        && let Some(code) = config.exit_code_on_error
    {
        args.exit_code_on_error = code;
    }

    if !is_explicit(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_explicit(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}

fn to_duration(
    value: &DurationValue,
    field: &'static str,
    allow_zero: bool,
) -> AppResult<std::time::Duration> {
    value
        .to_duration(allow_zero)
        .map_err(|err| invalid_field(field, err))
}

fn invalid_field(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}
