use serde::{Deserialize, Serialize};

/// The JSON payload posted to the endpoint, `{"query": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The text the user submitted.
    pub query: String,
}

impl QueryRequest {
    /// Creates a request for the given query text.
    #[inline]
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
        }
    }
}
