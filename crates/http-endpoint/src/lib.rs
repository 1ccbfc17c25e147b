//! An endpoint that talks to the answering service over HTTP.
//!
//! Every query is one `POST` with a JSON body. The reply body is decoded
//! as JSON whatever the status code is: the service reports its own
//! failures as `{"response": "..."}` with a 4xx/5xx status, and those
//! texts are meant to reach the user. Only an unreachable server or an
//! undecodable body counts as an error here.

#[macro_use]
extern crate tracing;

mod config;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use health_chat_endpoint::{
    ChatEndpoint, EndpointError, ErrorKind, QueryRequest, QueryResponse,
};
use reqwest::{Client, header};

pub use config::{HttpEndpointConfig, HttpEndpointConfigBuilder};

/// Error type for [`HttpEndpoint`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {}

impl EndpointError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// HTTP endpoint for the answering service.
#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    client: Client,
    config: Arc<HttpEndpointConfig>,
}

impl HttpEndpoint {
    /// Creates a new `HttpEndpoint` with the given configuration.
    pub fn new(config: HttpEndpointConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| {
            Error::new(format!("failed to create client: {err}"), ErrorKind::Other)
        })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Returns the configuration of this endpoint.
    #[inline]
    pub fn config(&self) -> &HttpEndpointConfig {
        &self.config
    }
}

impl ChatEndpoint for HttpEndpoint {
    type Error = Error;

    fn send_query(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static
    {
        let url = self.config.url();
        debug!("posting query to {url}");
        let resp_fut = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(req)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Transport));
                }
            };

            let status = resp.status();
            if !status.is_success() {
                warn!("endpoint answered with status {status}");
            }

            let body = match resp.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Transport));
                }
            };
            trace!("got a body of {} bytes", body.len());

            serde_json::from_slice::<QueryResponse>(&body).map_err(|err| {
                Error::new(
                    format!("invalid reply body (status {status}): {err}"),
                    ErrorKind::MalformedBody,
                )
            })
        }
    }
}
