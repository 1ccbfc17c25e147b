//! A public-health chat client.
//!
//! The crate wires the session from [`health_chat_core`] to the HTTP
//! endpoint, and ships a terminal front end for talking to the service
//! from a shell. You can also use it as a library to bring the same chat
//! into your own host app.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

#[cfg(feature = "cli")]
pub mod terminal;

use health_chat_core::SessionBuilder;
use health_chat_http_endpoint::{Error, HttpEndpoint, HttpEndpointConfig};

/// Re-exports of [`health_chat_core`] crate.
pub mod core {
    pub use health_chat_core::*;
}

/// Endpoint contract and the HTTP endpoint.
pub mod endpoint {
    pub use health_chat_endpoint::*;
    pub use health_chat_http_endpoint::{
        Error as HttpEndpointError, HttpEndpoint, HttpEndpointConfig,
        HttpEndpointConfigBuilder,
    };
}

/// Creates a session builder connected to the service described by
/// `config`.
pub fn connect(config: HttpEndpointConfig) -> Result<SessionBuilder, Error> {
    let endpoint = HttpEndpoint::new(config)?;
    debug!("connecting sessions to {}", endpoint.config().url());
    Ok(SessionBuilder::with_endpoint(endpoint))
}
