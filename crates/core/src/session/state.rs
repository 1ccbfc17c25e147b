use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Debug};
use std::sync::Arc;

use health_chat_endpoint::{EndpointError, QueryRequest, QueryResponse};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::mailbox::{Command, Mailbox};
use super::{RequestId, SendStatus, SessionSnapshot, Trigger};
use crate::endpoint_client::EndpointClient;
use crate::error::ReplyError;
use crate::render::{MarkupPolicy, RenderDescriptor};
use crate::transcript::{Content, Entry, Transcript};

/// The text shown in place of an answer whenever a request fails.
pub const CONNECTION_ERROR_TEXT: &str = "Error: Could not connect to server.";

pub(crate) struct SessionState {
    pub(super) endpoint_client: EndpointClient,
    pub(super) transcript: Transcript,
    pub(super) input: String,
    pub(super) markup_policy: MarkupPolicy,
    pub(super) in_flight: Option<RequestId>,
    pub(super) pending_queries: VecDeque<(RequestId, String)>,
    pub(super) running_requests: HashMap<RequestId, JoinHandle<()>>,
    pub(super) next_request_id: u64,

    pub(super) on_entry: Option<Box<dyn Fn(&Entry) + Send + Sync>>,
    pub(super) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl SessionState {
    fn send(&mut self, trigger: Trigger, mailbox: &Arc<Mailbox>) -> SendStatus {
        let query = self.input.trim();
        if query.is_empty() {
            // Nothing to send; the buffer is left exactly as it is.
            debug!("ignoring empty input from {trigger:?}");
            return SendStatus::Ignored;
        }
        let query = query.to_owned();

        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        debug!("accepted request {id} from {trigger:?}");

        self.append(Entry::user(query.clone()));
        self.input.clear();

        if self.in_flight.is_some() {
            // Replies must land in send order, so only one request may be
            // outstanding. This one goes out when the current one settles.
            self.pending_queries.push_back((id, query));
            return SendStatus::Queued(id);
        }
        self.dispatch(id, query, mailbox);
        SendStatus::Dispatched(id)
    }

    fn dispatch(&mut self, id: RequestId, query: String, mailbox: &Arc<Mailbox>) {
        self.in_flight = Some(id);

        let endpoint_client = self.endpoint_client.clone();
        let mailbox = Arc::clone(mailbox);
        let task = tokio::spawn(
            async move {
                let outcome =
                    endpoint_client.send_query(QueryRequest::new(query)).await;
                mailbox.send(QueryFinished { id, outcome }).ok();
            }
            .instrument(debug_span!("request", id = id.0)),
        );
        self.running_requests.insert(id, task);
    }

    fn finish(
        &mut self,
        id: RequestId,
        outcome: Result<QueryResponse, Box<dyn EndpointError>>,
        mailbox: &Arc<Mailbox>,
    ) {
        self.running_requests.remove(&id);
        if self.in_flight != Some(id) {
            error!("request {id} settled but is not in flight, discarding");
            return;
        }
        self.in_flight = None;

        let content = match outcome
            .map_err(ReplyError::Endpoint)
            .and_then(interpret_reply)
        {
            Ok(content) => content,
            Err(err) => {
                warn!("request {id} failed: {err}");
                Content::PlainText(CONNECTION_ERROR_TEXT.to_owned())
            }
        };
        self.append(Entry::bot(content));

        self.process_next_query(mailbox);
    }

    fn process_next_query(&mut self, mailbox: &Arc<Mailbox>) {
        if let Some((id, query)) = self.pending_queries.pop_front() {
            self.dispatch(id, query, mailbox);
        } else if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    fn append(&mut self, entry: Entry) {
        if let Some(on_entry) = &self.on_entry {
            on_entry(&entry);
        }
        self.transcript.append(entry);
    }

    pub(super) fn abort_running_requests(&mut self) {
        for (id, task) in self.running_requests.drain() {
            debug!("aborting request {id}");
            task.abort();
        }
        self.pending_queries.clear();
        self.in_flight = None;
    }
}

/// Turns a decoded reply into the content of a bot entry.
///
/// Non-empty markup wins over the text answer. A reply with neither is a
/// failure rather than an empty bubble.
fn interpret_reply(resp: QueryResponse) -> Result<Content, ReplyError> {
    match resp {
        QueryResponse {
            html: Some(html), ..
        } if !html.is_empty() => Ok(Content::Markup(html)),
        QueryResponse {
            response: Some(text),
            ..
        } => Ok(Content::PlainText(text)),
        _ => Err(ReplyError::MissingField),
    }
}

#[derive(Debug)]
pub(super) struct SetInput(pub String);

impl Command for SetInput {
    fn handle(self: Box<Self>, state: &mut SessionState, _mailbox: &Arc<Mailbox>) {
        state.input = self.0;
    }
}

#[derive(Debug)]
pub(super) struct SendInput {
    pub trigger: Trigger,
    pub reply_tx: oneshot::Sender<SendStatus>,
}

impl Command for SendInput {
    fn handle(self: Box<Self>, state: &mut SessionState, mailbox: &Arc<Mailbox>) {
        let status = state.send(self.trigger, mailbox);
        self.reply_tx.send(status).ok();
    }
}

#[derive(Debug)]
pub(super) struct TakeSnapshot(pub oneshot::Sender<SessionSnapshot>);

impl Command for TakeSnapshot {
    fn handle(self: Box<Self>, state: &mut SessionState, _mailbox: &Arc<Mailbox>) {
        self.0
            .send(SessionSnapshot {
                transcript: state.transcript.clone(),
                input: state.input.clone(),
            })
            .ok();
    }
}

#[derive(Debug)]
pub(super) struct Render(pub oneshot::Sender<Vec<RenderDescriptor>>);

impl Command for Render {
    fn handle(self: Box<Self>, state: &mut SessionState, _mailbox: &Arc<Mailbox>) {
        self.0.send(state.transcript.render(state.markup_policy)).ok();
    }
}

struct QueryFinished {
    id: RequestId,
    outcome: Result<QueryResponse, Box<dyn EndpointError>>,
}

impl Debug for QueryFinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryFinished")
            .field("id", &self.id)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl Command for QueryFinished {
    fn handle(self: Box<Self>, state: &mut SessionState, mailbox: &Arc<Mailbox>) {
        let QueryFinished { id, outcome } = *self;
        state.finish(id, outcome, mailbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_wins_over_text() {
        let resp = QueryResponse::markup("<b>Wash hands</b>").with_response("ignored");
        assert_eq!(
            interpret_reply(resp).unwrap(),
            Content::Markup("<b>Wash hands</b>".to_owned())
        );
    }

    #[test]
    fn test_empty_markup_falls_back_to_text() {
        let resp = QueryResponse::markup("").with_response("Drink clean water.");
        assert_eq!(
            interpret_reply(resp).unwrap(),
            Content::PlainText("Drink clean water.".to_owned())
        );
    }

    #[test]
    fn test_empty_text_is_still_an_answer() {
        let resp = QueryResponse::text("");
        assert_eq!(
            interpret_reply(resp).unwrap(),
            Content::PlainText(String::new())
        );
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            interpret_reply(QueryResponse::default()),
            Err(ReplyError::MissingField)
        ));
        assert!(matches!(
            interpret_reply(QueryResponse::markup("")),
            Err(ReplyError::MissingField)
        ));
    }
}
