//! Conversation client for the agent chat service.
//!
//! Owns the single in-flight generation per conversation: submitting user
//! input, folding the streamed response into the transcript as it arrives,
//! stop/regenerate semantics, and rehydration of persisted conversations.
//!
//! Rendering, authentication, persistence storage, and the agent backend are
//! external collaborators; this crate speaks to them only at their
//! boundaries (a bearer credential in, decoded events through, message
//! records back out).

pub mod controller;
pub mod error;
pub mod session;
pub mod state;

pub use controller::{AppendOutcome, ChatClient};
pub use error::ChatError;
pub use session::SessionIdentity;
pub use state::{ChatState, Phase};
