/// Default base URL for agent service requests.
pub const DEFAULT_AGENT_BASE_URL: &str = "http://localhost:8149/api";

/// Normalize a base URL to the chat stream endpoint.
///
/// Normalization rules:
/// 1) keep `/chat/stream` unchanged
/// 2) append `/stream` when the path ends in `/chat`
/// 3) append `/chat/stream` otherwise
pub fn normalize_chat_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_AGENT_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/chat/stream") {
        return trimmed.to_string();
    }
    if trimmed.ends_with("/chat") {
        return format!("{trimmed}/stream");
    }
    format!("{trimmed}/chat/stream")
}
