//! Reconstructs live-equivalent messages from persisted records.
//!
//! A historical view has no notion of "in progress": every recorded step is
//! surfaced as completed, whatever status the store captured mid-stream.

use serde::Deserialize;
use uuid::Uuid;

use crate::message::{
    Message, MessageMetadata, MessageStatus, PersistedStep, Role, StepKind, StepStatus,
    ThoughtStep,
};

/// Persisted message record as returned by the store read path.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistedMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

/// Rebuild one message from its persisted record.
pub fn rehydrate(record: PersistedMessage) -> Message {
    let PersistedMessage {
        role,
        content,
        metadata,
    } = record;

    let mut steps: Vec<ThoughtStep> = metadata.queue_steps.iter().map(completed_step).collect();
    if steps.is_empty() && !metadata.thinking_steps.is_empty() {
        // Older records carry narration only under the thinking-steps view.
        steps = metadata
            .thinking_steps
            .iter()
            .enumerate()
            .map(|(index, thought)| ThoughtStep::narration(format!("thought-{index}"), thought))
            .collect();
    }

    Message {
        id: Uuid::new_v4().to_string(),
        role,
        content,
        raw_content: String::new(),
        narration_stream: String::new(),
        reasoning: metadata.reasoning.clone(),
        sources: metadata.sources.clone(),
        steps,
        evaluation: metadata.evaluation.clone(),
        metadata,
        status: MessageStatus::Complete,
    }
}

/// Rebuild an ordered transcript from persisted records.
pub fn rehydrate_all(records: Vec<PersistedMessage>) -> Vec<Message> {
    records.into_iter().map(rehydrate).collect()
}

fn completed_step(step: &PersistedStep) -> ThoughtStep {
    ThoughtStep {
        id: step.id.clone(),
        kind: step.kind.unwrap_or(StepKind::Pipeline),
        label: step.label.clone(),
        status: StepStatus::Completed,
        input: step.input.clone(),
        output: step.output.clone(),
        attached_sources: None,
    }
}
