use std::time::Duration;

use health_chat_endpoint::{ErrorKind, QueryResponse};
use tokio::sync::oneshot;

/// What the fake endpoint answers for one scripted step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresetReply {
    /// A well-formed reply body.
    Body(QueryResponse),
    /// A raw body that is decoded as JSON when the step is played, so
    /// malformed payloads go through the same path as real ones.
    Raw(String),
    /// The exchange fails with an error of the given kind.
    Failure(ErrorKind),
}

impl PresetReply {
    /// A plain-text reply, `{"response": ...}`.
    #[inline]
    pub fn text<S: Into<String>>(response: S) -> Self {
        PresetReply::Body(QueryResponse::text(response))
    }

    /// A markup reply, `{"html": ...}`.
    #[inline]
    pub fn markup<S: Into<String>>(html: S) -> Self {
        PresetReply::Body(QueryResponse::markup(html))
    }
}

/// One step of the script: a reply plus how and when it is delivered.
#[derive(Debug)]
pub struct PresetStep {
    pub(crate) reply: PresetReply,
    pub(crate) delay: Option<Duration>,
    pub(crate) gate: Option<oneshot::Receiver<()>>,
}

impl PresetStep {
    /// Creates a step that answers immediately.
    #[inline]
    pub fn new(reply: PresetReply) -> Self {
        Self {
            reply,
            delay: None,
            gate: None,
        }
    }

    /// Delays the reply by `delay` once the request arrives.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds the reply until the returned gate is released (or dropped).
    #[inline]
    pub fn held(mut self) -> (Self, ReplyGate) {
        let (tx, rx) = oneshot::channel();
        self.gate = Some(rx);
        (self, ReplyGate(tx))
    }
}

/// Releases a held step.
#[derive(Debug)]
pub struct ReplyGate(oneshot::Sender<()>);

impl ReplyGate {
    /// Lets the held reply through.
    #[inline]
    pub fn release(self) {
        self.0.send(()).ok();
    }
}
