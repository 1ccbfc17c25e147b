use std::pin::Pin;
use std::sync::Arc;

use health_chat_endpoint::{
    ChatEndpoint, EndpointError, QueryRequest, QueryResponse,
};
use tracing::Instrument;

type SendQueryResult = Result<QueryResponse, Box<dyn EndpointError>>;
type BoxedSendQueryFuture =
    Pin<Box<dyn Future<Output = SendQueryResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(QueryRequest) -> BoxedSendQueryFuture + Send + Sync>;

/// A wrapper around a chat endpoint that provides a type-erased interface
/// for the session.
#[derive(Clone)]
pub struct EndpointClient {
    handler_fn: HandlerFn,
}

impl EndpointClient {
    #[inline]
    pub fn new<E: ChatEndpoint + 'static>(endpoint: E) -> Self {
        // Erase `E` so that the session doesn't need a generic parameter.
        let handler_fn: HandlerFn =
            Arc::new(move |req: QueryRequest| -> BoxedSendQueryFuture {
                let fut = endpoint.send_query(&req);
                Box::pin(
                    async move {
                        trace!("sending query: {:?}", req);
                        match fut.await {
                            Ok(resp) => {
                                trace!("got a reply: {:?}", resp);
                                Ok(resp)
                            }
                            Err(err) => {
                                debug!("endpoint failed: {err:?}");
                                Err(Box::new(err) as Box<dyn EndpointError>)
                            }
                        }
                    }
                    .instrument(trace_span!("endpoint client req")),
                )
            });
        Self { handler_fn }
    }

    /// Sends a query and returns the decoded reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future abandons the
    /// exchange and nothing is reported.
    #[inline]
    pub async fn send_query(&self, req: QueryRequest) -> SendQueryResult {
        (self.handler_fn)(req).await
    }
}
