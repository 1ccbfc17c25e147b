mod builder;
mod mailbox;
mod state;

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::Instrument;

use crate::error::SessionClosedError;
use crate::render::RenderDescriptor;
use crate::transcript::Transcript;
pub use builder::SessionBuilder;
use mailbox::{Mailbox, MailboxParts, run_session};
pub use state::CONNECTION_ERROR_TEXT;
use state::{Render, SendInput, SessionState, SetInput, TakeSnapshot};

/// Hint shown in an empty input box.
pub const INPUT_PLACEHOLDER: &str =
    "Ask me about diseases, prevention, awareness...";

/// Identifies one accepted send within a session.
///
/// Ids are handed out in send order, starting from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Returns the sequence number of this request.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What started a send.
///
/// Every trigger runs the same operation; the trigger only shows up in
/// logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The send button was activated.
    Button,
    /// Enter was pressed in the input box.
    Enter,
}

/// The immediate result of a send.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendStatus {
    /// The input was empty or whitespace-only. Nothing happened.
    Ignored,
    /// The query went out to the endpoint.
    Dispatched(RequestId),
    /// Another request is still in flight; this query goes out after it.
    Queued(RequestId),
}

impl SendStatus {
    /// Returns the id of the accepted request, if any.
    #[inline]
    pub fn request_id(self) -> Option<RequestId> {
        match self {
            SendStatus::Ignored => None,
            SendStatus::Dispatched(id) | SendStatus::Queued(id) => Some(id),
        }
    }
}

/// A copy of the session's observable state at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The transcript, greeting included.
    pub transcript: Transcript,
    /// The not-yet-submitted input.
    pub input: String,
}

/// A chat session: a transcript, an input box, and a connection to the
/// answering service.
///
/// The session state lives in its own task and is changed only by the
/// commands sent through this handle, one at a time, in the order they
/// were issued. Handles are cheap to clone and all refer to the same
/// session.
///
/// Each accepted send appends a user entry right away and exactly one bot
/// entry once its request settles, with the answer or with
/// [`CONNECTION_ERROR_TEXT`]. Requests are sent one at a time, so bot
/// entries always come back in send order.
#[derive(Clone)]
pub struct Session {
    mailbox: Arc<Mailbox>,
}

impl Session {
    fn spawn_from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            endpoint_client,
            greeting,
            markup_policy,
            on_entry,
            on_idle,
        } = builder;

        let state = SessionState {
            endpoint_client,
            transcript: Transcript::seeded(greeting),
            input: String::new(),
            markup_policy,
            in_flight: None,
            pending_queries: Default::default(),
            running_requests: Default::default(),
            next_request_id: 1,
            on_entry,
            on_idle,
        };

        let MailboxParts {
            mailbox,
            cmd_rx,
            close_rx,
        } = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_session(Arc::downgrade(&mailbox), state, cmd_rx, close_rx)
                .instrument(trace_span!("session")),
        );
        Self { mailbox }
    }

    /// Replaces the content of the input box.
    #[inline]
    pub fn set_input<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), SessionClosedError> {
        self.mailbox.send(SetInput(text.into()))
    }

    /// Sends the current input, as if the send button was activated.
    ///
    /// See [`send_from`](Self::send_from).
    #[inline]
    pub async fn send(&self) -> Result<SendStatus, SessionClosedError> {
        self.send_from(Trigger::Button).await
    }

    /// Sends the current input.
    ///
    /// This resolves as soon as the session has accepted or ignored the
    /// input, without waiting for the endpoint. By then, an accepted input
    /// is already in the transcript as a user entry and the input box is
    /// empty. Endpoint failures are never reported here; they end up in
    /// the transcript.
    pub async fn send_from(
        &self,
        trigger: Trigger,
    ) -> Result<SendStatus, SessionClosedError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.mailbox.send(SendInput { trigger, reply_tx })?;
        reply_rx.await.map_err(|_| SessionClosedError)
    }

    /// Returns a copy of the transcript and the input box.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionClosedError> {
        let (tx, rx) = oneshot::channel();
        self.mailbox.send(TakeSnapshot(tx))?;
        rx.await.map_err(|_| SessionClosedError)
    }

    /// Renders the current transcript with the session's markup policy.
    pub async fn render(
        &self,
    ) -> Result<Vec<RenderDescriptor>, SessionClosedError> {
        let (tx, rx) = oneshot::channel();
        self.mailbox.send(Render(tx))?;
        rx.await.map_err(|_| SessionClosedError)
    }

    /// Closes the session.
    ///
    /// Requests still in flight are aborted and their outcome is never
    /// applied. Every later call on any handle fails with
    /// [`SessionClosedError`].
    #[inline]
    pub fn close(&self) {
        self.mailbox.close();
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
