use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One citation object as carried by a `sources` event.
///
/// Everything is optional on the wire; the transcript layer defaults the id
/// deterministically when absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourcePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        rename = "sourceRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One processing-queue item as carried by `queue-init` / `queue-add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Raw wire status; the transcript layer folds `waiting` into `pending`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Identifiers carried by the terminal `finish` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishInfo {
    pub chat_id: Option<String>,
    pub trace_id: Option<String>,
    pub session_id: Option<String>,
}

/// Stream event decoded from one frame payload.
///
/// Closed union keyed by the wire `type` discriminator. Anything that fails
/// to parse, or whose `type` is unrecognized, never reaches the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "text-delta")]
    TextDelta {
        #[serde(default)]
        delta: String,
    },
    #[serde(rename = "reasoning-delta")]
    ReasoningDelta {
        #[serde(default)]
        delta: String,
    },
    #[serde(rename = "sources")]
    Sources {
        #[serde(default)]
        sources: Vec<SourcePayload>,
    },
    #[serde(rename = "tool-call")]
    ToolCall {
        #[serde(rename = "toolId")]
        tool_id: String,
        #[serde(default, rename = "toolName")]
        tool_name: String,
        #[serde(default, rename = "toolInput", skip_serializing_if = "Option::is_none")]
        tool_input: Option<Value>,
    },
    #[serde(rename = "tool-result")]
    ToolResult {
        #[serde(default, rename = "toolId", skip_serializing_if = "Option::is_none")]
        tool_id: Option<String>,
        #[serde(default, rename = "toolName", skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        #[serde(
            default,
            rename = "toolOutput",
            skip_serializing_if = "Option::is_none"
        )]
        tool_output: Option<Value>,
    },
    #[serde(rename = "queue-init")]
    QueueInit {
        #[serde(default)]
        steps: Vec<QueueItem>,
    },
    #[serde(rename = "queue-add")]
    QueueAdd { step: QueueItem },
    #[serde(rename = "queue-update")]
    QueueUpdate {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
    #[serde(rename = "chain-of-thought")]
    ChainOfThought {
        #[serde(default)]
        thoughts: Vec<String>,
    },
    #[serde(rename = "concepts-detected")]
    ConceptsDetected {
        #[serde(default)]
        concepts: Vec<String>,
    },
    #[serde(rename = "status")]
    Status {
        #[serde(default)]
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename = "evaluation")]
    Evaluation {
        #[serde(default)]
        evaluation: Value,
    },
    #[serde(rename = "finish")]
    Finish {
        #[serde(default, rename = "chatId", skip_serializing_if = "Option::is_none")]
        chat_id: Option<String>,
        #[serde(default, rename = "traceId", skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        #[serde(
            default,
            rename = "sessionId",
            skip_serializing_if = "Option::is_none"
        )]
        session_id: Option<String>,
    },
}

/// Decode one frame payload into a typed event.
///
/// Malformed JSON and unrecognized `type` values are logged and skipped;
/// decoding never terminates the stream.
pub fn decode_frame(payload: &str) -> Option<StreamEvent> {
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(error) => {
            tracing::debug!(%error, "dropping undecodable frame payload");
            None
        }
    }
}
