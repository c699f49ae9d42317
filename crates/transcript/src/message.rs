use agent_api::events::SourcePayload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Streaming,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Pipeline,
    Tool,
    Narration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
}

impl StepStatus {
    /// Map a wire status string; `waiting` folds into `pending`, everything
    /// the model cannot represent also lands on `pending`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "waiting" | "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Reduced `{title, url}` view of a citation, attached to search tool steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One entry of a message's ordered step timeline.
///
/// Steps are appended in arrival order and never reordered; pipeline and
/// tool steps are updated by id, narration steps are pure appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtStep {
    pub id: String,
    pub kind: StepKind,
    pub label: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_sources: Option<Vec<SourceLink>>,
}

impl ThoughtStep {
    #[must_use]
    pub fn pipeline(id: impl Into<String>, label: impl Into<String>, status: StepStatus) -> Self {
        Self {
            id: id.into(),
            kind: StepKind::Pipeline,
            label: label.into(),
            status,
            input: None,
            output: None,
            attached_sources: None,
        }
    }

    #[must_use]
    pub fn tool(id: impl Into<String>, label: impl Into<String>, input: Option<Value>) -> Self {
        Self {
            id: id.into(),
            kind: StepKind::Tool,
            label: label.into(),
            status: StepStatus::Processing,
            input,
            output: None,
            attached_sources: None,
        }
    }

    #[must_use]
    pub fn narration(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: StepKind::Narration,
            label: label.into(),
            status: StepStatus::Completed,
            input: None,
            output: None,
            attached_sources: None,
        }
    }
}

/// Normalized citation attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
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

impl Citation {
    /// Normalize one wire citation; ids default deterministically by index.
    #[must_use]
    pub fn from_payload(index: usize, payload: SourcePayload) -> Self {
        let id = payload
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("src-{index}"));

        Self {
            id,
            title: payload.title,
            source_ref: payload.source_ref,
            page: payload.page,
            description: payload.description,
            content: payload.content,
            url: payload.url,
        }
    }

    #[must_use]
    pub fn link(&self) -> SourceLink {
        SourceLink {
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// Step record as persisted under `metadata.queue_steps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStep {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StepKind>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl From<&ThoughtStep> for PersistedStep {
    fn from(step: &ThoughtStep) -> Self {
        Self {
            id: step.id.clone(),
            kind: Some(step.kind),
            label: step.label.clone(),
            status: Some(step.status.as_wire().to_string()),
            input: step.input.clone(),
            output: step.output.clone(),
        }
    }
}

/// Message metadata mirrored for persistence.
///
/// Tolerant by construction: every field defaults, and unknown keys survive
/// a load/store round trip through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queue_steps: Vec<PersistedStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thinking_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detected_concepts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One transcript entry.
///
/// `raw_content` is the source of truth for assistant text; `content` and
/// the extracted part of `reasoning` are re-derived from it on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_content: String,
    /// Narration fed by the dedicated `reasoning-delta` channel, distinct
    /// from narration extracted out of `raw_content`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub narration_stream: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ThoughtStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Value>,
    #[serde(default)]
    pub metadata: MessageMetadata,
    pub status: MessageStatus,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into(), MessageStatus::Complete)
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into(), MessageStatus::Complete)
    }

    /// Empty assistant message committed when a generation starts.
    #[must_use]
    pub fn assistant_placeholder() -> Self {
        Self::with_role(Role::Assistant, String::new(), MessageStatus::Streaming)
    }

    fn with_role(role: Role, content: String, status: MessageStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            raw_content: String::new(),
            narration_stream: String::new(),
            reasoning: None,
            sources: Vec::new(),
            steps: Vec::new(),
            evaluation: None,
            metadata: MessageMetadata::default(),
            status,
        }
    }

    #[must_use]
    pub fn step_mut(&mut self, id: &str) -> Option<&mut ThoughtStep> {
        self.steps.iter_mut().find(|step| step.id == id)
    }
}
