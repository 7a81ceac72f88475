use std::time::Duration;

use reqwest::Client;

use crate::{
    args::{DEFAULT_USER_AGENT, LoadArgs},
    error::{AppError, AppResult, HttpError},
};

/// Settings for the single client shared by every virtual user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientSettings {
    #[must_use]
    pub const fn from_args(args: &LoadArgs) -> Self {
        Self {
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
        }
    }
}

/// Builds the shared HTTP client. Connections are pooled and reused across
/// virtual users.
///
/// # Errors
///
/// Returns an error when the underlying client cannot be constructed.
pub fn build_client(settings: ClientSettings) -> AppResult<Client> {
    Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
