use agent_api::events::{QueueItem, StreamEvent};
use agent_api::decode_frame;
use serde_json::json;

#[test]
fn decodes_text_and_reasoning_deltas() {
    assert_eq!(
        decode_frame(r#"{"type":"text-delta","delta":"Hello"}"#),
        Some(StreamEvent::TextDelta {
            delta: "Hello".to_string(),
        })
    );
    assert_eq!(
        decode_frame(r#"{"type":"reasoning-delta","delta":"hmm"}"#),
        Some(StreamEvent::ReasoningDelta {
            delta: "hmm".to_string(),
        })
    );
}

#[test]
fn decodes_tool_call_and_result() {
    let call = decode_frame(
        r#"{"type":"tool-call","toolId":"t1","toolName":"retrieve_context","toolInput":{"query":"q"}}"#,
    );
    assert_eq!(
        call,
        Some(StreamEvent::ToolCall {
            tool_id: "t1".to_string(),
            tool_name: "retrieve_context".to_string(),
            tool_input: Some(json!({"query": "q"})),
        })
    );

    let result = decode_frame(r#"{"type":"tool-result","toolId":"t1","toolOutput":[1,2]}"#);
    assert_eq!(
        result,
        Some(StreamEvent::ToolResult {
            tool_id: Some("t1".to_string()),
            tool_name: None,
            tool_output: Some(json!([1, 2])),
        })
    );
}

#[test]
fn decodes_queue_events() {
    let init = decode_frame(
        r#"{"type":"queue-init","steps":[{"id":"a","label":"Retrieving","status":"waiting"},{"id":"b","label":"Formatting"}]}"#,
    );
    assert_eq!(
        init,
        Some(StreamEvent::QueueInit {
            steps: vec![
                QueueItem {
                    id: "a".to_string(),
                    label: "Retrieving".to_string(),
                    status: Some("waiting".to_string()),
                },
                QueueItem {
                    id: "b".to_string(),
                    label: "Formatting".to_string(),
                    status: None,
                },
            ],
        })
    );

    assert_eq!(
        decode_frame(r#"{"type":"queue-update","id":"a","status":"completed"}"#),
        Some(StreamEvent::QueueUpdate {
            id: "a".to_string(),
            status: Some("completed".to_string()),
        })
    );
}

#[test]
fn decodes_finish_identifiers() {
    let finish = decode_frame(
        r#"{"type":"finish","chatId":"chat-3","traceId":"trace-5","sessionId":"sess-1"}"#,
    );
    assert_eq!(
        finish,
        Some(StreamEvent::Finish {
            chat_id: Some("chat-3".to_string()),
            trace_id: Some("trace-5".to_string()),
            session_id: Some("sess-1".to_string()),
        })
    );
}

#[test]
fn decodes_remaining_event_kinds() {
    assert!(matches!(
        decode_frame(r#"{"type":"sources","sources":[{"title":"Doc"}]}"#),
        Some(StreamEvent::Sources { .. })
    ));
    assert!(matches!(
        decode_frame(r#"{"type":"chain-of-thought","thoughts":["a","b"]}"#),
        Some(StreamEvent::ChainOfThought { .. })
    ));
    assert!(matches!(
        decode_frame(r#"{"type":"concepts-detected","concepts":["rust"]}"#),
        Some(StreamEvent::ConceptsDetected { .. })
    ));
    assert!(matches!(
        decode_frame(r#"{"type":"status","status":"retrying"}"#),
        Some(StreamEvent::Status { .. })
    ));
    assert!(matches!(
        decode_frame(r#"{"type":"evaluation","evaluation":{"score":0.9}}"#),
        Some(StreamEvent::Evaluation { .. })
    ));
}

#[test]
fn malformed_and_unknown_payloads_are_skipped() {
    assert_eq!(decode_frame("{broken-json"), None);
    assert_eq!(decode_frame(r#"{"type":"mystery-event","foo":"bar"}"#), None);
    assert_eq!(decode_frame(r#"{"delta":"no type"}"#), None);
}

#[test]
fn missing_optional_fields_default() {
    assert_eq!(
        decode_frame(r#"{"type":"text-delta"}"#),
        Some(StreamEvent::TextDelta {
            delta: String::new(),
        })
    );
    assert_eq!(
        decode_frame(r#"{"type":"finish"}"#),
        Some(StreamEvent::Finish {
            chat_id: None,
            trace_id: None,
            session_id: None,
        })
    );
}
