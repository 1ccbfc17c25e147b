use serde::{Deserialize, Serialize};

/// A decoded reply body from the endpoint.
///
/// Both fields are optional on the wire. A reply may carry structured
/// markup in `html`, a plain-text answer in `response`, or both. Fields of
/// an unexpected type make the whole body malformed; unknown fields are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Pre-formatted markup for the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Plain-text answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl QueryResponse {
    /// Creates a plain-text reply.
    #[inline]
    pub fn text<S: Into<String>>(response: S) -> Self {
        Self {
            html: None,
            response: Some(response.into()),
        }
    }

    /// Creates a reply carrying markup.
    #[inline]
    pub fn markup<S: Into<String>>(html: S) -> Self {
        Self {
            html: Some(html.into()),
            response: None,
        }
    }

    /// Attaches a plain-text answer alongside the existing fields.
    #[inline]
    pub fn with_response<S: Into<String>>(mut self, response: S) -> Self {
        self.response = Some(response.into());
        self
    }
}
