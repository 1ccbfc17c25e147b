use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The endpoint could not be reached, or the exchange was cut off.
    Transport,
    /// The endpoint answered, but the body is not the expected JSON.
    MalformedBody,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::MalformedBody => write!(f, "Malformed body"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
