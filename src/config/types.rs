use std::time::Duration;

use serde::Deserialize;

use crate::args::{TargetPreset, TaskKind, parsers::parse_duration_value};
use crate::error::ValidationError;

/// On-disk configuration. Every key mirrors a CLI flag (snake_case).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub target: Option<TargetPreset>,
    #[serde(alias = "task")]
    pub tasks: Option<Vec<TaskKind>>,
    pub users: Option<usize>,
    pub spawn_rate: Option<usize>,
    pub run_time: Option<DurationValue>,
    pub requests: Option<u64>,
    pub wait: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub amount: Option<f64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub stats_interval: Option<DurationValue>,
    pub export_json: Option<String>,
    pub export_csv: Option<String>,
    pub exit_code_on_error: Option<u8>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// Either whole seconds (`30`) or a suffixed string (`"500ms"`, `"2m"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, allow_zero: bool) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 && !allow_zero {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text, allow_zero),
        }
    }
}
