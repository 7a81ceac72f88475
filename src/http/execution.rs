use futures_util::StreamExt;
use reqwest::{Client, Request};

use crate::metrics::{Failure, FailureKind};

#[derive(Debug)]
pub struct RequestOutcome {
    /// Response status, `0` when no response was received.
    pub status: u16,
    pub response_bytes: u64,
    pub failure: Option<Failure>,
}

/// Sends `request` and drains the response body.
///
/// Never fails: transport errors, timeouts and error statuses (>= 400) are
/// reported through [`RequestOutcome::failure`].
pub async fn execute_request(client: &Client, request: Request) -> RequestOutcome {
    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(err) => {
            return RequestOutcome {
                status: 0,
                response_bytes: 0,
                failure: Some(Failure::from_reqwest(&err)),
            };
        }
    };

    let status = response.status();
    let code = status.as_u16();
    match drain_response_body(response).await {
        Ok(bytes) => {
            let failure = if status.is_client_error() || status.is_server_error() {
                Some(Failure::new(
                    FailureKind::Status,
                    format!("HTTP {}", status),
                ))
            } else {
                None
            };
            RequestOutcome {
                status: code,
                response_bytes: bytes,
                failure,
            }
        }
        Err(err) => RequestOutcome {
            status: code,
            response_bytes: 0,
            failure: Some(Failure::from_reqwest(&err)),
        },
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
