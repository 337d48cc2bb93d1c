//! LLM provider tests with mocked network responses
//!
//! Each provider is pointed at a wiremock server and checked for the chat
//! request it sends and the text it extracts from the reply.

use serde_json::json;
use switchboard::llm::Provider;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// Create a mock OpenAI chat completion response
fn mock_openai_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

/// Create a mock Ollama chat completion response
fn mock_ollama_chat(content: &str) -> serde_json::Value {
    json!({
        "model": "llama3.2",
        "created_at": "2024-01-01T00:00:00Z",
        "message": {"role": "assistant", "content": content},
        "done": true
    })
}

// ============= OpenAI =============

#[cfg(feature = "openai")]
#[tokio::test]
async fn test_openai_generate_with_system() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-4-turbo",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "What is 2+2?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_openai_completion("4")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: mock_server.uri(),
        model: "gpt-4-turbo".to_string(),
        temperature: 0.1,
    }
    .create_client()
    .await
    .unwrap();

    let answer = client
        .generate_with_system("Be brief.", "What is 2+2?")
        .await
        .unwrap();
    assert_eq!(answer, "4");
    assert_eq!(client.model_name(), "gpt-4-turbo");
}

#[cfg(feature = "openai")]
#[tokio::test]
async fn test_openai_history_roles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "Hi!"},
                {"role": "user", "content": "again"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_openai_completion("Hi again!")))
        .mount(&mock_server)
        .await;

    let client = Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: mock_server.uri(),
        model: "gpt-4-turbo".to_string(),
        temperature: 0.1,
    }
    .create_client()
    .await
    .unwrap();

    let history = [
        ("user".to_string(), "hello".to_string()),
        ("assistant".to_string(), "Hi!".to_string()),
        ("user".to_string(), "again".to_string()),
    ];
    assert_eq!(client.generate_with_history(&history).await.unwrap(), "Hi again!");
}

#[cfg(feature = "openai")]
#[tokio::test]
async fn test_openai_error_is_llm_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Invalid model",
                "type": "invalid_request_error",
                "param": null,
                "code": "model_not_found"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = Provider::OpenAI {
        api_key: "sk-test".to_string(),
        api_base: mock_server.uri(),
        model: "no-such-model".to_string(),
        temperature: 0.1,
    }
    .create_client()
    .await
    .unwrap();

    let err = client.generate("hello").await.unwrap_err();
    assert!(matches!(err, switchboard::AppError::LLM(_)));
    assert!(err.to_string().contains("Invalid model"));
}

// ============= Ollama =============

#[cfg(feature = "ollama")]
#[tokio::test]
async fn test_ollama_generate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "llama3.2"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_ollama_chat("Hello! How can I help you?")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Provider::Ollama {
        base_url: mock_server.uri(),
        model: "llama3.2".to_string(),
    }
    .create_client()
    .await
    .unwrap();

    assert_eq!(
        client.generate("Hello").await.unwrap(),
        "Hello! How can I help you?"
    );
}

#[cfg(feature = "ollama")]
#[tokio::test]
async fn test_ollama_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&mock_server)
        .await;

    let client = Provider::Ollama {
        base_url: mock_server.uri(),
        model: "llama3.2".to_string(),
    }
    .create_client()
    .await
    .unwrap();

    let err = client.generate("Hello").await.unwrap_err();
    assert!(err.to_string().starts_with("LLM error: Ollama error"));
}

#[test]
fn test_mock_payloads_are_objects() {
    assert!(mock_openai_completion("x").is_object());
    assert!(mock_ollama_chat("x").is_object());
}
