use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported scheme '{scheme}' in host '{host}'. Use http or https.")]
    UnsupportedScheme { host: String, scheme: String },
    #[error("Host '{host}' has no hostname.")]
    MissingHostname { host: String },
    #[error("Host '{host}' must not carry a query or fragment.")]
    HostHasQuery { host: String },
    #[error("Invalid request URL '{url}': {source}")]
    InvalidRequestUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}
