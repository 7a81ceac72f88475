//! HTTP client construction and request execution.
mod client;
mod execution;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{ClientSettings, build_client};
pub use execution::{RequestOutcome, execute_request};
