use kaleido_llm::{Content, Message, ToolCall};

#[test]
fn test_content_from_str() {
    let content: Content = "Test".into();
    assert_eq!(content.as_text(), "Test");
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("rules").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi").role(), "assistant");
}

#[test]
fn test_message_text() {
    assert_eq!(Message::human("I need a laptop").text(), Some("I need a laptop"));
    assert_eq!(Message::ai_with_tools(vec![]).text(), None);
}

#[test]
fn test_message_serialization_is_role_tagged() {
    let json = serde_json::to_string(&Message::human("Hello")).unwrap();
    assert!(json.contains("\"role\":\"user\""));

    let json = serde_json::to_string(&Message::ai("Response")).unwrap();
    assert!(json.contains("\"role\":\"assistant\""));
}

#[test]
fn test_transcript_roundtrip_with_tool_calls() {
    let transcript = vec![
        Message::system("rules"),
        Message::human("I need a laptop"),
        Message::ai_with_tools(vec![ToolCall::new("call_1", "structured_response", r#"{"valid":false}"#)]),
        Message::ai("{\"valid\":false}"),
    ];

    let json = serde_json::to_string(&transcript).unwrap();
    let restored: Vec<Message> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, transcript);
}

#[test]
fn test_tool_call_parse_arguments() {
    #[derive(serde::Deserialize)]
    struct Args {
        valid: bool,
    }

    let call = ToolCall::new("call_1", "structured_response", r#"{"valid":true}"#);
    let args: Args = call.parse_arguments().unwrap();
    assert!(args.valid);
}
