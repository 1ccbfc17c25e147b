//! The contract between a chat session and the remote answering service.
//!
//! The remote service is treated as an opaque request/response endpoint:
//! one JSON query goes out, one JSON reply comes back. This crate only
//! defines the shapes of those messages and the trait that endpoint
//! implementations adhere to. It doesn't define any behavior.
//!
//! Interpreting a reply (which field wins, what counts as a failure) is
//! the job of the session that owns the conversation, not the endpoint.

#![deny(missing_docs)]

mod endpoint;
mod error;
mod request;
mod response;

pub use endpoint::*;
pub use error::*;
pub use request::*;
pub use response::*;
