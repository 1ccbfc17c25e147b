use std::fmt::Debug;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PATH: &str = "/chat";

/// Builder for [`HttpEndpointConfig`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HttpEndpointConfigBuilder {
    base_url: Option<String>,
    path: Option<String>,
    timeout: Option<Duration>,
}

impl HttpEndpointConfigBuilder {
    /// Creates a builder with every option left at its default.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the answering service, e.g.
    /// `https://chat.example.org`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the path queries are posted to. Defaults to `/chat`.
    #[inline]
    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Bounds each exchange. Without a timeout a request waits for as long
    /// as the server keeps the connection open.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HttpEndpointConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let path = self.path.unwrap_or_else(|| DEFAULT_PATH.to_string());

        let base_url = base_url.trim_end_matches('/').to_owned();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        HttpEndpointConfig {
            base_url,
            path,
            timeout: self.timeout,
        }
    }
}

impl Debug for HttpEndpointConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEndpointConfigBuilder")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configuration for [`HttpEndpoint`](crate::HttpEndpoint).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpEndpointConfig {
    pub(crate) base_url: String,
    pub(crate) path: String,
    pub(crate) timeout: Option<Duration>,
}

impl HttpEndpointConfig {
    /// Returns the full URL queries are posted to.
    #[inline]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// Returns the per-request timeout, if any.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpEndpointConfigBuilder::new().build();
        assert_eq!(config.url(), "http://127.0.0.1:5000/chat");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_url_joining() {
        let config = HttpEndpointConfigBuilder::new()
            .with_base_url("https://health.example.org/")
            .with_path("api/chat")
            .with_timeout(Duration::from_secs(30))
            .build();
        assert_eq!(config.url(), "https://health.example.org/api/chat");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }
}
