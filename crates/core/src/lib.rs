//! Core logic of a chat session: the transcript, how it is rendered, and
//! the controller that sends queries and merges the replies back in.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod endpoint_client;
mod error;
pub mod render;
mod session;
pub mod transcript;

pub use error::SessionClosedError;
pub use session::{
    CONNECTION_ERROR_TEXT, INPUT_PLACEHOLDER, RequestId, SendStatus, Session,
    SessionBuilder, SessionSnapshot, Trigger,
};
