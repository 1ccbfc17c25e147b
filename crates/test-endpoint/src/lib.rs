//! A local fake endpoint for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};

use health_chat_endpoint::{
    ChatEndpoint, EndpointError, ErrorKind, QueryRequest, QueryResponse,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl EndpointError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Inner {
    script: VecDeque<PresetStep>,
    received: Vec<QueryRequest>,
}

/// A local fake endpoint for testing purpose.
///
/// Before sending queries, you need to set up the script, which is how the
/// endpoint should answer. Steps are consumed in the order the queries
/// arrive, one step per query. If the script runs out, the query fails with
/// a transport error, just like an unreachable server.
///
/// Clones share the same script and the same record of received queries.
#[derive(Clone, Default)]
pub struct TestEndpoint {
    inner: Arc<Mutex<Inner>>,
}

impl TestEndpoint {
    /// Appends a step to the script.
    #[inline]
    pub fn add_step(&self, step: PresetStep) {
        self.lock().script.push_back(step);
    }

    /// Appends a step that answers with `reply` immediately.
    #[inline]
    pub fn add_reply(&self, reply: PresetReply) {
        self.add_step(PresetStep::new(reply));
    }

    /// Returns all queries received so far, in arrival order.
    pub fn received(&self) -> Vec<QueryRequest> {
        self.lock().received.clone()
    }

    /// Returns the number of steps not played yet.
    pub fn remaining_steps(&self) -> usize {
        self.lock().script.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the script from the others.
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Debug for TestEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("TestEndpoint")
            .field("remaining_steps", &inner.script.len())
            .field("received", &inner.received.len())
            .finish()
    }
}

impl ChatEndpoint for TestEndpoint {
    type Error = crate::Error;

    fn send_query(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static
    {
        let step = {
            let mut inner = self.lock();
            inner.received.push(req.clone());
            inner.script.pop_front()
        };

        async move {
            let Some(step) = step else {
                return Err(Error {
                    message: "no more steps".to_owned(),
                    kind: ErrorKind::Transport,
                });
            };

            if let Some(gate) = step.gate {
                gate.await.ok();
            }
            if let Some(delay) = step.delay {
                sleep(delay).await;
            }

            match step.reply {
                PresetReply::Body(resp) => Ok(resp),
                PresetReply::Raw(body) => {
                    serde_json::from_str::<QueryResponse>(&body).map_err(|err| Error {
                        message: format!("{err}"),
                        kind: ErrorKind::MalformedBody,
                    })
                }
                PresetReply::Failure(kind) => Err(Error {
                    message: "scripted failure".to_owned(),
                    kind,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_script_order() {
        let endpoint = TestEndpoint::default();
        endpoint.add_reply(PresetReply::text("first"));
        endpoint.add_reply(PresetReply::markup("<p>second</p>"));

        let resp = endpoint
            .send_query(&QueryRequest::new("a"))
            .await
            .unwrap();
        assert_eq!(resp, QueryResponse::text("first"));

        let resp = endpoint
            .send_query(&QueryRequest::new("b"))
            .await
            .unwrap();
        assert_eq!(resp, QueryResponse::markup("<p>second</p>"));

        assert_eq!(
            endpoint.received(),
            vec![QueryRequest::new("a"), QueryRequest::new("b")]
        );
        assert_eq!(endpoint.remaining_steps(), 0);
    }

    #[tokio::test]
    async fn test_failures() {
        let endpoint = TestEndpoint::default();
        endpoint.add_reply(PresetReply::Raw("<html>oops".to_owned()));
        endpoint.add_reply(PresetReply::Failure(ErrorKind::Other));

        let err = endpoint
            .send_query(&QueryRequest::new("a"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedBody);

        let err = endpoint
            .send_query(&QueryRequest::new("b"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        // The script is exhausted now.
        let err = endpoint
            .send_query(&QueryRequest::new("c"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_held_step() {
        let endpoint = TestEndpoint::default();
        let (step, gate) =
            PresetStep::new(PresetReply::text("later")).held();
        endpoint.add_step(step);

        let mut fut = Box::pin(endpoint.send_query(&QueryRequest::new("a")));
        assert!(
            timeout(Duration::from_millis(20), &mut fut).await.is_err(),
            "held step must not resolve before release"
        );

        gate.release();
        let resp = fut.await.unwrap();
        assert_eq!(resp.response.as_deref(), Some("later"));
    }
}
