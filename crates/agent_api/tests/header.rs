use agent_api::config::AgentApiConfig;
use agent_api::error::ApiError;
use agent_api::headers::{
    build_headers, HEADER_ACCEPT, HEADER_AUTHORIZATION, HEADER_SESSION_ID, HEADER_USER_ID,
};

// Unsigned token with payload {"user_id":"user-42"}.
const TOKEN_WITH_USER_ID: &str = "eyJhbGciOiJub25lIn0.eyJ1c2VyX2lkIjoidXNlci00MiJ9.sig";
// Unsigned token with payload {"sub":"subject-7"}.
const TOKEN_WITH_SUB: &str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJzdWJqZWN0LTcifQ.sig";

#[test]
fn bearer_and_stream_headers_are_always_present() {
    let config = AgentApiConfig::new("opaque-token");
    let headers = build_headers(&config, None).expect("headers build");

    assert_eq!(
        headers.get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer opaque-token")
    );
    assert_eq!(
        headers.get(HEADER_ACCEPT).map(String::as_str),
        Some("text/event-stream")
    );
}

#[test]
fn missing_access_token_is_rejected() {
    let config = AgentApiConfig::new("   ");
    assert!(matches!(
        build_headers(&config, None),
        Err(ApiError::MissingAccessToken)
    ));
}

#[test]
fn user_identity_comes_from_token_claims() {
    let config = AgentApiConfig::new(TOKEN_WITH_USER_ID);
    let headers = build_headers(&config, None).expect("headers build");
    assert_eq!(
        headers.get(HEADER_USER_ID).map(String::as_str),
        Some("user-42")
    );

    let config = AgentApiConfig::new(TOKEN_WITH_SUB);
    let headers = build_headers(&config, None).expect("headers build");
    assert_eq!(
        headers.get(HEADER_USER_ID).map(String::as_str),
        Some("subject-7")
    );
}

#[test]
fn explicit_user_id_overrides_token_claims() {
    let config = AgentApiConfig::new(TOKEN_WITH_USER_ID).with_user_id("override-1");
    let headers = build_headers(&config, None).expect("headers build");
    assert_eq!(
        headers.get(HEADER_USER_ID).map(String::as_str),
        Some("override-1")
    );
}

#[test]
fn opaque_token_omits_user_identity_header() {
    let config = AgentApiConfig::new("not-a-jwt");
    let headers = build_headers(&config, None).expect("headers build");
    assert!(!headers.contains_key(HEADER_USER_ID));
}

#[test]
fn session_id_header_is_added_when_configured() {
    let config = AgentApiConfig::new("opaque-token").with_session_id("sess-1");
    let headers = build_headers(&config, None).expect("headers build");
    assert_eq!(
        headers.get(HEADER_SESSION_ID).map(String::as_str),
        Some("sess-1")
    );
}

#[test]
fn explicit_user_agent_wins_over_config() {
    let config = AgentApiConfig::new("opaque-token").with_user_agent("configured/1.0");
    let headers = build_headers(&config, Some("explicit/2.0")).expect("headers build");
    assert_eq!(
        headers.get("User-Agent").map(String::as_str),
        Some("explicit/2.0")
    );
}
