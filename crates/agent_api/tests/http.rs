use agent_api::{AgentApiClient, AgentApiConfig, ApiError, ChatRequest, WireMessage};

fn client() -> AgentApiClient {
    let config = AgentApiConfig::new("opaque-token")
        .with_base_url("https://agent.example.com/api");
    AgentApiClient::new(config).expect("client builds")
}

#[test]
fn endpoint_is_normalized_from_the_configured_base() {
    assert_eq!(
        client().normalized_endpoint(),
        "https://agent.example.com/api/chat/stream"
    );
}

#[test]
fn empty_history_is_rejected_before_sending() {
    let request = ChatRequest::new(Vec::new(), "sess-1");
    assert!(matches!(
        client().build_request(&request),
        Err(ApiError::InvalidRequestPayload(_))
    ));
}

#[test]
fn blank_session_id_is_rejected_before_sending() {
    let request = ChatRequest::new(vec![WireMessage::new("user", "hi")], "  ");
    assert!(matches!(
        client().build_request(&request),
        Err(ApiError::InvalidRequestPayload(_))
    ));
}

#[test]
fn well_formed_request_builds() {
    let request = ChatRequest::new(vec![WireMessage::new("user", "hi")], "sess-1");
    assert!(client().build_request(&request).is_ok());
}
