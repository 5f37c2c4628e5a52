use super::*;
use crate::llm::ChatRole;

fn test_config() -> GroqConfig {
    GroqConfig {
        api_key: "gsk_test".to_string(),
        ..GroqConfig::default()
    }
}

#[test]
fn rejects_missing_api_key() {
    let config = GroqConfig::default();
    assert!(GroqClient::new(&config).is_err());
}

#[test]
fn completions_url_strips_trailing_slash() {
    let config = GroqConfig {
        base_url: "https://api.groq.com/openai/v1/".to_string(),
        ..test_config()
    };
    let client = GroqClient::new(&config).expect("should create client");
    assert_eq!(
        client.completions_url(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
}

#[test]
fn chat_request_serialization() {
    let messages = vec![
        ChatMessage::system("persona"),
        ChatMessage::user("question"),
    ];
    let request = ChatRequest {
        model: "llama-3.1-8b-instant",
        messages: &messages,
        max_tokens: 256,
        temperature: 0.0,
    };

    let json = serde_json::to_value(&request).expect("should serialize");
    assert_eq!(json["model"], "llama-3.1-8b-instant");
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][0]["content"], "persona");
    assert_eq!(json["messages"][1]["role"], "user");
}

#[test]
fn chat_response_parsing() {
    let body = r#"{
        "id": "chatcmpl-123",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "The answer."}}
        ]
    }"#;
    let response: ChatResponse = serde_json::from_str(body).expect("should parse");
    assert_eq!(response.choices[0].message.content, "The answer.");
}

#[test]
fn message_constructors_set_roles() {
    assert_eq!(ChatMessage::system("s").role, ChatRole::System);
    assert_eq!(ChatMessage::user("u").role, ChatRole::User);
    assert_eq!(ChatMessage::assistant("a").role, ChatRole::Assistant);
}
