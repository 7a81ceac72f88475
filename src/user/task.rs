use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Request};
use serde::Serialize;
use uuid::Uuid;

use crate::args::{Amount, HttpMethod, TaskKind};
use crate::error::{HttpError, ValidationError};

use super::host::Host;

/// Optional `from`/`to` bounds appended to summary requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryWindow {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl SummaryWindow {
    /// # Errors
    ///
    /// Returns an error when both bounds are set and `from` is after `to`.
    pub fn new(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (from, to)
            && start > end
        {
            return Err(ValidationError::SummaryWindowInverted {
                from: format_timestamp(start),
                to: format_timestamp(end),
            });
        }
        Ok(Self { from, to })
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

#[derive(Debug, Serialize)]
struct PaymentBody {
    #[serde(rename = "correlationId")]
    correlation_id: Uuid,
    amount: Amount,
}

/// One unit of work a virtual user repeats: a single HTTP call followed by
/// a fixed pause.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    kind: TaskKind,
    wait: Duration,
    amount: Amount,
    window: SummaryWindow,
}

impl Task {
    /// Task with the kind's default pause.
    #[must_use]
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            wait: kind.default_wait(),
            amount: Amount::default(),
            window: SummaryWindow::default(),
        }
    }

    #[must_use]
    pub const fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub const fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub const fn with_window(mut self, window: SummaryWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Stats row name; the request path.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.path()
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.kind.method()
    }

    /// Pause after each invocation.
    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Builds the request for one invocation against `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be formed or the request cannot be
    /// built.
    pub fn build_request(&self, client: &Client, host: &Host) -> Result<Request, HttpError> {
        let mut url = host.endpoint(self.kind.path())?;
        let builder = match self.kind {
            TaskKind::Summary | TaskKind::SummarySlow => {
                if !self.window.is_empty() {
                    let mut query = url.query_pairs_mut();
                    if let Some(from) = self.window.from {
                        query.append_pair("from", &format_timestamp(from));
                    }
                    if let Some(to) = self.window.to {
                        query.append_pair("to", &format_timestamp(to));
                    }
                }
                client.request(self.method().into(), url)
            }
            TaskKind::Payment => {
                let body = PaymentBody {
                    correlation_id: Uuid::new_v4(),
                    amount: self.amount,
                };
                client.request(self.method().into(), url).json(&body)
            }
        };
        builder
            .build()
            .map_err(|err| HttpError::BuildRequestFailed { source: err })
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
