use health_chat_endpoint::ChatEndpoint;

use super::Session;
use crate::endpoint_client::EndpointClient;
use crate::render::MarkupPolicy;
use crate::transcript::{Entry, GREETING};

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(super) endpoint_client: EndpointClient,
    pub(super) greeting: String,
    pub(super) markup_policy: MarkupPolicy,
    pub(super) on_entry: Option<Box<dyn Fn(&Entry) + Send + Sync>>,
    pub(super) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl SessionBuilder {
    /// Creates a new builder that talks to the specified endpoint.
    #[inline]
    pub fn with_endpoint<E: ChatEndpoint + 'static>(endpoint: E) -> Self {
        Self {
            endpoint_client: EndpointClient::new(endpoint),
            greeting: GREETING.to_owned(),
            markup_policy: MarkupPolicy::default(),
            on_entry: None,
            on_idle: None,
        }
    }

    /// Sets the greeting the transcript starts with.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, greeting: S) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets how markup replies are treated when rendering.
    #[inline]
    pub fn with_markup_policy(mut self, policy: MarkupPolicy) -> Self {
        self.markup_policy = policy;
        self
    }

    /// Attaches a callback to be invoked for every appended entry.
    ///
    /// The greeting is part of the initial transcript and is not reported.
    #[inline]
    pub fn on_entry(
        mut self,
        on_entry: impl Fn(&Entry) + Send + Sync + 'static,
    ) -> Self {
        self.on_entry = Some(Box::new(on_entry));
        self
    }

    /// Attaches a callback to be invoked when the last outstanding request
    /// has settled.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the session and starts its task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[inline]
    pub fn build(self) -> Session {
        Session::spawn_from_builder(self)
    }
}
