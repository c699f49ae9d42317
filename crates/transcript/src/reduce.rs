//! Applies decoded stream events to the in-flight assistant message.
//!
//! Events arrive strictly in order for a single active message; every arm
//! here must tolerate partial state (a result before its call, an update for
//! an unknown id) by doing nothing rather than failing.

use agent_api::events::{QueueItem, SourcePayload, StreamEvent};
use serde_json::Value;

use crate::extract;
use crate::message::{
    Citation, Message, MessageStatus, PersistedStep, StepKind, StepStatus, ThoughtStep,
};

/// Static display-name table keyed by tool identifier.
const TOOL_LABELS: &[(&str, &str)] = &[
    ("retrieve_context", "Searching your notes"),
    ("web_search", "Searching the web"),
    ("read_note", "Reading a note"),
    ("list_notes", "Listing notes"),
];

/// Tool identifiers whose steps receive attached sources.
const SEARCH_TOOLS: &[&str] = &["retrieve_context", "web_search"];

/// Reserved id for the single retry-notice pipeline step.
pub const RETRY_STEP_ID: &str = "retry";
const RETRY_STEP_LABEL: &str = "Retrying…";

/// Resolve a tool identifier to its display label, falling back to the raw
/// identifier when unmapped.
#[must_use]
pub fn tool_label(tool_id: &str) -> &str {
    TOOL_LABELS
        .iter()
        .find(|(id, _)| *id == tool_id)
        .map(|(_, label)| *label)
        .unwrap_or(tool_id)
}

fn is_search_label(label: &str) -> bool {
    SEARCH_TOOLS.iter().any(|id| tool_label(id) == label)
}

/// Fold one event into the active assistant message.
pub fn apply_event(message: &mut Message, event: StreamEvent) {
    match event {
        StreamEvent::TextDelta { delta } => {
            message.raw_content.push_str(&delta);
            rederive(message);
        }
        StreamEvent::ReasoningDelta { delta } => {
            message.narration_stream.push_str(&delta);
            rederive(message);
        }
        StreamEvent::Sources { sources } => apply_sources(message, sources),
        StreamEvent::ToolCall {
            tool_id,
            tool_name,
            tool_input,
        } => apply_tool_call(message, tool_id, &tool_name, tool_input),
        StreamEvent::ToolResult {
            tool_id,
            tool_name,
            tool_output,
        } => apply_tool_result(message, tool_id.as_deref(), tool_name.as_deref(), tool_output),
        StreamEvent::QueueInit { steps } => apply_queue_init(message, steps),
        StreamEvent::QueueAdd { step } => {
            message.steps.push(pipeline_step(step));
            sync_queue_metadata(message);
        }
        StreamEvent::QueueUpdate { id, status } => apply_queue_update(message, &id, status),
        StreamEvent::ChainOfThought { thoughts } => apply_chain_of_thought(message, thoughts),
        StreamEvent::ConceptsDetected { concepts } => {
            for concept in concepts {
                if !message.metadata.detected_concepts.contains(&concept) {
                    message.metadata.detected_concepts.push(concept);
                }
            }
        }
        StreamEvent::Status { status, .. } => apply_status(message, &status),
        StreamEvent::Evaluation { evaluation } => {
            message.evaluation = Some(evaluation.clone());
            message.metadata.evaluation = Some(evaluation);
        }
        StreamEvent::Finish {
            chat_id,
            trace_id,
            session_id,
        } => apply_finish(message, chat_id, trace_id, session_id),
    }
}

/// Re-derive `content` and `reasoning` from the full raw buffer.
///
/// The displayed reasoning is the dedicated narration channel followed by
/// the most recently extracted span; neither channel is ever concatenated
/// with its own previous extraction, so re-scanning cannot duplicate text.
fn rederive(message: &mut Message) {
    let extraction = extract::split_narration(&message.raw_content);
    message.content = extraction.display;

    let mut reasoning = String::new();
    if !message.narration_stream.is_empty() {
        reasoning.push_str(&message.narration_stream);
    }
    if let Some(narration) = extraction.narration {
        if !reasoning.is_empty() {
            reasoning.push('\n');
        }
        reasoning.push_str(&narration);
    }

    message.reasoning = if reasoning.is_empty() {
        None
    } else {
        Some(reasoning)
    };
    message.metadata.reasoning = message.reasoning.clone();
}

fn apply_sources(message: &mut Message, payloads: Vec<SourcePayload>) {
    let citations: Vec<Citation> = payloads
        .into_iter()
        .enumerate()
        .map(|(index, payload)| Citation::from_payload(index, payload))
        .collect();

    if let Some(step) = message
        .steps
        .iter_mut()
        .rev()
        .find(|step| step.kind == StepKind::Tool && is_search_label(&step.label))
    {
        step.attached_sources = Some(citations.iter().map(Citation::link).collect());
    }

    message.metadata.sources = citations.clone();
    message.sources = citations;
}

fn apply_tool_call(message: &mut Message, tool_id: String, tool_name: &str, input: Option<Value>) {
    let label = tool_label(tool_name).to_string();
    message.steps.push(ThoughtStep::tool(tool_id, label, input));
    sync_queue_metadata(message);
}

fn apply_tool_result(
    message: &mut Message,
    tool_id: Option<&str>,
    tool_name: Option<&str>,
    output: Option<Value>,
) {
    let by_id = tool_id.and_then(|id| {
        message
            .steps
            .iter()
            .position(|step| step.kind == StepKind::Tool && step.id == id)
    });
    let index = by_id.or_else(|| {
        let label = tool_label(tool_name?);
        message
            .steps
            .iter()
            .rposition(|step| step.kind == StepKind::Tool && step.label == label)
    });

    let Some(index) = index else {
        tracing::debug!(?tool_id, "dropping tool result without a matching step");
        return;
    };

    let step = &mut message.steps[index];
    step.output = output;
    step.status = StepStatus::Completed;
    sync_queue_metadata(message);
}

fn pipeline_step(item: QueueItem) -> ThoughtStep {
    let status = item
        .status
        .as_deref()
        .map(StepStatus::from_wire)
        .unwrap_or(StepStatus::Pending);
    ThoughtStep::pipeline(item.id, item.label, status)
}

fn apply_queue_init(message: &mut Message, items: Vec<QueueItem>) {
    let prefix = message
        .steps
        .iter()
        .take_while(|step| step.kind == StepKind::Pipeline)
        .count();
    let fresh: Vec<ThoughtStep> = items.into_iter().map(pipeline_step).collect();
    message.steps.splice(0..prefix, fresh);
    sync_queue_metadata(message);
}

fn apply_queue_update(message: &mut Message, id: &str, status: Option<String>) {
    let Some(step) = message
        .steps
        .iter_mut()
        .find(|step| step.kind == StepKind::Pipeline && step.id == id)
    else {
        tracing::debug!(id, "dropping queue update for an unknown step");
        return;
    };

    if let Some(status) = status.as_deref() {
        step.status = StepStatus::from_wire(status);
    }
    sync_queue_metadata(message);
}

fn apply_chain_of_thought(message: &mut Message, thoughts: Vec<String>) {
    let mut count = message
        .steps
        .iter()
        .filter(|step| step.kind == StepKind::Narration)
        .count();
    for thought in &thoughts {
        message
            .steps
            .push(ThoughtStep::narration(format!("thought-{count}"), thought));
        count += 1;
    }
    message.metadata.thinking_steps.extend(thoughts);
    sync_queue_metadata(message);
}

fn apply_status(message: &mut Message, status: &str) {
    if status != "retrying" {
        return;
    }
    if message.steps.iter().any(|step| step.id == RETRY_STEP_ID) {
        return;
    }

    message.steps.push(ThoughtStep::pipeline(
        RETRY_STEP_ID,
        RETRY_STEP_LABEL,
        StepStatus::Processing,
    ));
    sync_queue_metadata(message);
}

fn apply_finish(
    message: &mut Message,
    chat_id: Option<String>,
    trace_id: Option<String>,
    session_id: Option<String>,
) {
    if chat_id.is_some() {
        message.metadata.chat_id = chat_id;
    }
    if trace_id.is_some() {
        message.metadata.trace_id = trace_id;
    }
    if session_id.is_some() {
        message.metadata.session_id = session_id;
    }

    complete_open_steps(message);
    message.status = MessageStatus::Complete;
    sync_queue_metadata(message);
}

/// Mark every non-terminal step completed.
pub fn complete_open_steps(message: &mut Message) {
    for step in &mut message.steps {
        if !step.status.is_terminal() {
            step.status = StepStatus::Completed;
        }
    }
}

/// Mirror the step timeline into `metadata.queue_steps` for persistence.
pub fn sync_queue_metadata(message: &mut Message) {
    message.metadata.queue_steps = message.steps.iter().map(PersistedStep::from).collect();
}
