use agent_chat::state::ChatState;
use agent_chat::ChatError;
use serde_json::json;
use transcript::{Message, MessageStatus, Role};

fn completed_assistant(content: &str) -> Message {
    let mut message = Message::assistant_placeholder();
    message.content = content.to_string();
    message.status = MessageStatus::Complete;
    message
}

fn seeded_state() -> ChatState {
    let mut first_user = Message::user("First question");
    first_user.metadata.attachments = vec![json!({"note": "n-1"})];

    ChatState::from_messages(vec![
        first_user,
        completed_assistant("First answer"),
        Message::user("Second question"),
        completed_assistant("Second answer"),
    ])
}

#[test]
fn default_target_reissues_the_last_user_turn() {
    let mut state = seeded_state();
    let (text, attachments) = state
        .truncate_for_regenerate(None)
        .expect("regeneration target resolves");

    assert_eq!(text, "Second question");
    assert!(attachments.is_empty());
    // Truncated before the re-issued user turn so append recreates it.
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.messages()[1].content, "First answer");
}

#[test]
fn explicit_target_captures_its_preceding_user_turn() {
    let mut state = seeded_state();
    let target_id = state.messages()[1].id.clone();

    let (text, attachments) = state
        .truncate_for_regenerate(Some(&target_id))
        .expect("regeneration target resolves");

    assert_eq!(text, "First question");
    assert_eq!(attachments, vec![json!({"note": "n-1"})]);
    assert!(state.messages().is_empty());
}

#[test]
fn unknown_target_is_rejected_without_truncating() {
    let mut state = seeded_state();
    let error = state
        .truncate_for_regenerate(Some("no-such-id"))
        .expect_err("unknown id is rejected");

    assert!(matches!(error, ChatError::UnknownMessage(_)));
    assert_eq!(state.messages().len(), 4);
}

#[test]
fn transcript_without_assistant_cannot_regenerate() {
    let mut state = ChatState::from_messages(vec![Message::user("Only question")]);
    let error = state
        .truncate_for_regenerate(None)
        .expect_err("nothing to regenerate");

    assert!(matches!(error, ChatError::NothingToRegenerate));
}

#[test]
fn assistant_without_preceding_user_turn_is_rejected() {
    let mut state = ChatState::from_messages(vec![
        Message::system("Be brief."),
        completed_assistant("Unprompted answer"),
    ]);
    let error = state
        .truncate_for_regenerate(None)
        .expect_err("no user turn to re-issue");

    assert!(matches!(error, ChatError::MissingUserTurn));
    assert_eq!(state.messages().len(), 2);
}

#[test]
fn regenerated_turn_flows_back_through_begin_exchange() {
    let mut state = seeded_state();
    let (text, attachments) = state
        .truncate_for_regenerate(None)
        .expect("regeneration target resolves");
    state.begin_exchange(text, attachments);

    assert_eq!(state.messages().len(), 4);
    assert_eq!(state.messages()[2].role, Role::User);
    assert_eq!(state.messages()[2].content, "Second question");
    assert_eq!(state.messages()[3].role, Role::Assistant);
    assert_eq!(state.messages()[3].status, MessageStatus::Streaming);
}
