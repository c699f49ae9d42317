//! Transport-only client primitives for the agent chat service.
//!
//! This crate owns request building, SSE frame reading, event decoding, and
//! streaming for the chat endpoint only. It intentionally contains no
//! transcript state and no rendering coupling: decoded events are handed to
//! the caller in arrival order and everything else is the caller's concern.
//!
//! Frame reading and event decoding are deliberately split: the reader
//! yields raw `data:` payloads and never fails, while the decoder tolerates
//! malformed or unrecognized payloads by dropping them.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;

pub use client::AgentApiClient;
pub use client::CancellationSignal;
pub use client::StreamResult;
pub use config::AgentApiConfig;
pub use error::ApiError;
pub use events::{decode_frame, FinishInfo, StreamEvent};
pub use payload::{ChatRequest, WireMessage};
pub use sse::FrameReader;
pub use url::normalize_chat_url;
