//! Session controller: one in-flight generation per conversation.
//!
//! Starting a new exchange always cancels the previous one first; there is
//! no queueing of concurrent generations. Cancellation is cooperative and
//! swallowed silently, since it is always operator-initiated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use agent_api::client::CancellationSignal;
use agent_api::payload::{ChatRequest, WireMessage};
use agent_api::{AgentApiClient, ApiError};
use serde_json::Value;
use transcript::{rehydrate_all, Message, PersistedMessage};

use crate::error::ChatError;
use crate::session::SessionIdentity;
use crate::state::{ChatState, Phase};

/// Result of one append/regenerate exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Set exactly once, on the exchange that created the chat server-side.
    pub created_chat_id: Option<String>,
}

pub struct ChatClient {
    api: AgentApiClient,
    state: ChatState,
    session: SessionIdentity,
    chat_id: Option<String>,
    model: Option<String>,
    active_cancel: Option<CancellationSignal>,
    last_error: Option<String>,
}

impl ChatClient {
    #[must_use]
    pub fn new(api: AgentApiClient, session: SessionIdentity) -> Self {
        Self {
            api,
            state: ChatState::new(),
            session,
            chat_id: None,
            model: None,
            active_cancel: None,
            last_error: None,
        }
    }

    /// Open a past conversation from its persisted records.
    #[must_use]
    pub fn open(
        api: AgentApiClient,
        session: SessionIdentity,
        chat_id: impl Into<String>,
        records: Vec<PersistedMessage>,
    ) -> Self {
        let mut client = Self::new(api, session);
        client.chat_id = Some(chat_id.into());
        client.state = ChatState::from_messages(rehydrate_all(records));
        client
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn set_model(&mut self, model: Option<String>) {
        self.model = model;
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    #[must_use]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    #[must_use]
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Cancellation handle for stopping the in-flight generation from
    /// another task.
    #[must_use]
    pub fn cancel_handle(&self) -> Option<CancellationSignal> {
        self.active_cancel.clone()
    }

    /// Submit user input and stream the response into the transcript.
    pub async fn append(&mut self, text: impl Into<String>) -> Result<AppendOutcome, ChatError> {
        self.append_with_attachments(text, Vec::new()).await
    }

    pub async fn append_with_attachments(
        &mut self,
        text: impl Into<String>,
        attachments: Vec<Value>,
    ) -> Result<AppendOutcome, ChatError> {
        self.cancel_active();
        self.state.begin_exchange(text, attachments);

        let request = self.build_request();
        let cancel: CancellationSignal = Arc::new(AtomicBool::new(false));
        self.active_cancel = Some(Arc::clone(&cancel));

        let api = &self.api;
        let state = &mut self.state;
        let result = api
            .stream_with_handler(&request, Some(&cancel), |event| state.apply(event))
            .await;

        self.active_cancel = None;
        match result {
            Ok(finish) => {
                self.state.finalize_complete();

                let mut outcome = AppendOutcome::default();
                if let Some(chat_id) = finish.and_then(|finish| finish.chat_id) {
                    if self.chat_id.is_none() {
                        outcome.created_chat_id = Some(chat_id.clone());
                        self.chat_id = Some(chat_id);
                    }
                }
                Ok(outcome)
            }
            Err(ApiError::Cancelled) => {
                tracing::debug!("generation cancelled by operator");
                self.state.finalize_stopped();
                Ok(AppendOutcome::default())
            }
            Err(error) => {
                let error = match error {
                    ApiError::Unauthorized(message) => ChatError::Credential(message),
                    other => ChatError::Api(other),
                };
                let text = error.to_string();
                self.state.finalize_error(&text);
                self.last_error = Some(text);
                Err(error)
            }
        }
    }

    /// Cancel the in-flight generation, keeping everything received so far.
    pub fn stop(&mut self) {
        self.cancel_active();
    }

    /// Discard the targeted assistant response (default: the last one) and
    /// re-issue generation for its preceding user input.
    pub async fn regenerate(
        &mut self,
        target: Option<&str>,
    ) -> Result<AppendOutcome, ChatError> {
        self.cancel_active();
        let (text, attachments) = self.state.truncate_for_regenerate(target)?;
        self.append_with_attachments(text, attachments).await
    }

    fn cancel_active(&mut self) {
        if let Some(cancel) = self.active_cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
        if self.state.phase() == Phase::Generating {
            self.state.finalize_stopped();
        }
    }

    fn build_request(&self) -> ChatRequest {
        let messages = self
            .state
            .history()
            .into_iter()
            .map(|(role, content)| WireMessage::new(role.as_str(), content))
            .collect();

        let mut request = ChatRequest::new(messages, self.session.id());
        if let Some(chat_id) = &self.chat_id {
            request = request.with_chat_id(chat_id);
        }
        if let Some(model) = &self.model {
            request = request.with_model(model);
        }
        request
    }
}
