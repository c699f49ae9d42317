//! Pure conversation state: the transcript and the in-flight exchange.
//!
//! No I/O lives here. The controller drives this state from the network
//! side; tests drive it directly with decoded events.

use agent_api::events::StreamEvent;
use serde_json::Value;
use transcript::{apply_event, reduce, Message, MessageStatus, Role};

use crate::error::ChatError;

/// Placeholder shown when a generation is stopped before any text arrived.
pub const STOPPED_PLACEHOLDER: &str = "Generation stopped.";
/// Fallback content applied when the request fails before any text arrived.
pub const FAILURE_PLACEHOLDER: &str = "Something went wrong while answering. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Generating,
}

/// Transcript plus the identity of the single active assistant message.
///
/// Exactly one message is ever active; events for it are applied in arrival
/// order and a finalized message is never mutated again.
#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    active_id: Option<String>,
    phase: Phase,
}

impl ChatState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed state from a rehydrated transcript.
    #[must_use]
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            active_id: None,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn active_message(&self) -> Option<&Message> {
        let id = self.active_id.as_deref()?;
        self.messages.iter().find(|message| message.id == id)
    }

    fn active_message_mut(&mut self) -> Option<&mut Message> {
        let id = self.active_id.as_deref()?;
        self.messages.iter_mut().find(|message| message.id == id)
    }

    /// Commit the user turn and an empty assistant placeholder; returns the
    /// placeholder's id.
    pub fn begin_exchange(
        &mut self,
        text: impl Into<String>,
        attachments: Vec<Value>,
    ) -> String {
        let mut user = Message::user(text);
        user.metadata.attachments = attachments;
        self.messages.push(user);

        let assistant = Message::assistant_placeholder();
        let id = assistant.id.clone();
        self.messages.push(assistant);
        self.active_id = Some(id.clone());
        self.phase = Phase::Generating;
        id
    }

    /// Fold one decoded event into the active message. Events arriving with
    /// no active message (after stop) are dropped.
    pub fn apply(&mut self, event: StreamEvent) {
        if let Some(message) = self.active_message_mut() {
            apply_event(message, event);
        }
    }

    /// Message history for the outbound request, excluding the still-empty
    /// active placeholder.
    #[must_use]
    pub fn history(&self) -> Vec<(Role, String)> {
        self.messages
            .iter()
            .filter(|message| Some(message.id.as_str()) != self.active_id.as_deref())
            .map(|message| (message.role, message.content.clone()))
            .collect()
    }

    /// Finalize the active message after a stop: received content stays
    /// untouched, open steps complete, and an empty message gets the
    /// stopped placeholder.
    pub fn finalize_stopped(&mut self) {
        if let Some(message) = self.take_active() {
            reduce::complete_open_steps(message);
            if message.content.is_empty() {
                message.content = STOPPED_PLACEHOLDER.to_string();
            }
            message.status = MessageStatus::Complete;
            reduce::sync_queue_metadata(message);
        }
        self.phase = Phase::Idle;
    }

    /// Finalize the active message after a request failure.
    pub fn finalize_error(&mut self, error_text: &str) {
        if let Some(message) = self.take_active() {
            reduce::complete_open_steps(message);
            if message.content.is_empty() {
                message.content = FAILURE_PLACEHOLDER.to_string();
            }
            message
                .metadata
                .extra
                .insert("error".to_string(), Value::String(error_text.to_string()));
            message.status = MessageStatus::Error;
            reduce::sync_queue_metadata(message);
        }
        self.phase = Phase::Idle;
    }

    /// Finalize a stream that ended normally. The `finish` event usually did
    /// the work already; this covers streams that end without one.
    pub fn finalize_complete(&mut self) {
        if let Some(message) = self.take_active() {
            if message.status == MessageStatus::Streaming {
                reduce::complete_open_steps(message);
                message.status = MessageStatus::Complete;
                reduce::sync_queue_metadata(message);
            }
        }
        self.phase = Phase::Idle;
    }

    fn take_active(&mut self) -> Option<&mut Message> {
        let id = self.active_id.take()?;
        self.phase = Phase::Idle;
        self.messages.iter_mut().find(|message| message.id == id)
    }

    /// Locate the regeneration target, capture the preceding user turn, and
    /// truncate the transcript so `begin_exchange` can recreate it.
    pub fn truncate_for_regenerate(
        &mut self,
        target: Option<&str>,
    ) -> Result<(String, Vec<Value>), ChatError> {
        let target_index = match target {
            Some(id) => self
                .messages
                .iter()
                .position(|message| message.id == id)
                .ok_or_else(|| ChatError::UnknownMessage(id.to_string()))?,
            None => self
                .messages
                .iter()
                .rposition(|message| message.role == Role::Assistant)
                .ok_or(ChatError::NothingToRegenerate)?,
        };

        let user_index = self.messages[..target_index]
            .iter()
            .rposition(|message| message.role == Role::User)
            .ok_or(ChatError::MissingUserTurn)?;

        let user = &self.messages[user_index];
        let text = user.content.clone();
        let attachments = user.metadata.attachments.clone();

        self.messages.truncate(user_index);
        Ok((text, attachments))
    }
}
