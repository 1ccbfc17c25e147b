use std::error::Error;
use std::fmt;

use health_chat_endpoint::EndpointError;

/// Returned whenever a command is sent to a session that has been closed.
pub struct SessionClosedError;

impl fmt::Debug for SessionClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClosedError").finish()
    }
}

impl fmt::Display for SessionClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the session has been closed".fmt(f)
    }
}

impl Error for SessionClosedError {}

/// Why a reply could not be turned into a bot entry.
#[derive(Debug)]
pub(crate) enum ReplyError {
    /// The endpoint itself failed.
    Endpoint(Box<dyn EndpointError>),
    /// The body decoded, but has neither markup nor a text answer.
    MissingField,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::Endpoint(err) => {
                write!(f, "{} ({})", err, err.kind())
            }
            ReplyError::MissingField => {
                write!(f, "reply has neither `html` nor `response`")
            }
        }
    }
}

impl Error for ReplyError {}
