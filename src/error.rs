use agent_api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("agent credential is not configured correctly: {0}")]
    Credential(String),

    #[error("unknown message id '{0}'")]
    UnknownMessage(String),

    #[error("transcript has no assistant message to regenerate")]
    NothingToRegenerate,

    #[error("no user message precedes the regeneration target")]
    MissingUserTurn,

    #[error(transparent)]
    Api(#[from] ApiError),
}
