use std::fmt;

use url::Url;

use crate::error::HttpError;

/// Validated base URL every request is issued against.
///
/// Stored without a trailing slash; request URLs are built by appending the
/// task path, so a base path on the host (`http://gw/api`) is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    base: String,
}

impl Host {
    /// # Errors
    ///
    /// Returns an error unless `raw` is an absolute `http`/`https` URL with a
    /// hostname and without query or fragment.
    pub fn parse(raw: &str) -> Result<Self, HttpError> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|err| HttpError::InvalidHost {
            host: trimmed.to_owned(),
            source: err,
        })?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(HttpError::UnsupportedScheme {
                    host: trimmed.to_owned(),
                    scheme: scheme.to_owned(),
                });
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(HttpError::MissingHostname {
                host: trimmed.to_owned(),
            });
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(HttpError::HostHasQuery {
                host: trimmed.to_owned(),
            });
        }
        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// `{host}{path}` as a URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined string is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, HttpError> {
        let joined = format!("{}{}", self.base, path);
        Url::parse(&joined).map_err(|err| HttpError::InvalidRequestUrl {
            url: joined,
            source: err,
        })
    }
}

impl std::str::FromStr for Host {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Host::parse(s)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}
