//! Conversation transcript model shared by live streaming and rehydration.
//!
//! A transcript is an ordered sequence of messages. During a live session the
//! reducer folds decoded stream events into the single in-flight assistant
//! message; when a past conversation is opened, the rehydrator rebuilds an
//! equivalent final state from persisted records without replaying events.
//! Both paths must converge on the same shape.

pub mod extract;
pub mod message;
pub mod reduce;
pub mod rehydrate;

pub use message::{
    Citation, Message, MessageMetadata, MessageStatus, PersistedStep, Role, SourceLink, StepKind,
    StepStatus, ThoughtStep,
};
pub use reduce::apply_event;
pub use rehydrate::{rehydrate, rehydrate_all, PersistedMessage};
