use std::error::Error;

use crate::error::ErrorKind;
use crate::request::QueryRequest;
use crate::response::QueryResponse;

/// The error type for a chat endpoint.
pub trait EndpointError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents the remote answering service.
///
/// Every call to [`send_query`](ChatEndpoint::send_query) is a single,
/// independent exchange. Implementations must not retry on their own, and
/// the returned future must not borrow the endpoint, so that callers can
/// drive it on another task.
pub trait ChatEndpoint: Send + Sync {
    /// The error type that may be returned by the endpoint.
    type Error: EndpointError;

    /// Sends a query and resolves to the decoded reply body.
    fn send_query(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static;
}
