use std::time::Duration;

use chrono::{DateTime, Utc};

use super::defaults::HOST_ENV;
use super::types::{Amount, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_amount(s: &str) -> AppResult<Amount> {
    s.parse::<Amount>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Parses `<number>[ms|s|m|h]`; a bare number is seconds. Zero is rejected.
pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s, false).map_err(AppError::from)
}

/// Like [`parse_duration_arg`] but accepts `0` (no pause between requests).
pub(crate) fn parse_wait_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s, true).map_err(AppError::from)
}

pub(crate) fn parse_duration_value(s: &str, allow_zero: bool) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.is_zero() && !allow_zero {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}

/// Parses a summary window bound. Accepts RFC 3339 or a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp, read as UTC.
pub(crate) fn parse_summary_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    parse_timestamp_value(s).map_err(AppError::from)
}

pub(crate) fn parse_timestamp_value(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = s.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_parse| ValidationError::InvalidSummaryTimestamp {
            value: value.to_owned(),
        })
}

/// Non-empty `RINHA_LOAD_HOST`, trimmed.
#[must_use]
pub fn read_host_env() -> Option<String> {
    std::env::var(HOST_ENV)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
