//! Sessions driven through the Anthropic provider against a mock server.

use augment::prelude::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_registry() -> Arc<ToolRegistry> {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(ToolFn::new(
        "get_weather",
        "Current weather for a city",
        json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        |input: serde_json::Value| async move {
            Ok::<_, ToolError>(ToolOutput::text(format!(
                "Sunny in {}",
                input["city"].as_str().unwrap_or("?")
            )))
        },
    )));
    registry
}

#[tokio::test]
async fn tool_loop_over_http() {
    let server = MockServer::start().await;

    // Mounted first, answers once: the tool request.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "model": "claude-3-7-sonnet-latest",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {"city": "Paris"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 40, "output_tokens": 15}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({"tools": [{"name": "get_weather"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_2",
            "model": "claude-3-7-sonnet-latest",
            "role": "assistant",
            "content": [{"type": "text", "text": "It is sunny in Paris."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 70, "output_tokens": 9}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Anthropic::new("test-key").base_url(server.uri());
    let orchestrator = TurnOrchestrator::new(provider).with_tools(weather_registry());
    let mut session = Session::new(orchestrator);

    let outcome = session
        .generate_with("Weather in Paris?", RequestParams::default())
        .await
        .unwrap();

    assert_eq!(outcome.termination, Termination::Completed);
    assert_eq!(outcome.text(), "Checking.\nIt is sunny in Paris.");
    assert_eq!(outcome.usage.input_tokens, 110);
    assert_eq!(outcome.usage.output_tokens, 24);

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let result = &second["messages"][2]["content"][0];
    assert_eq!(result["type"], "tool_result");
    assert_eq!(result["tool_use_id"], "toolu_1");
    assert_eq!(result["content"][0]["text"], "Sunny in Paris");
}

#[tokio::test]
async fn overloaded_api_becomes_synthetic_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(529)
                .set_body_json(json!({"error": {"type": "overloaded_error"}})),
        )
        .mount(&server)
        .await;

    let provider = Anthropic::new("test-key").base_url(server.uri());
    let mut session = Session::new(TurnOrchestrator::new(provider));

    let text = session.generate_text("Hi").await.unwrap();

    assert_eq!(
        text,
        r#"Error during generation: Error code: 529 - {"error":{"type":"overloaded_error"}}"#
    );
    assert_eq!(session.history().conversation().len(), 2);
}

#[tokio::test]
async fn rejected_key_ends_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let provider = Anthropic::new("bad-key").base_url(server.uri());
    let mut session = Session::new(TurnOrchestrator::new(provider));

    let err = session.generate("Hi").await.unwrap_err();
    assert!(matches!(err, SessionError::Auth(_)), "got {err:?}");
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn permission_denied_becomes_synthetic_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "type": "error",
            "error": {"type": "permission_error", "message": "no access"}
        })))
        .mount(&server)
        .await;

    let provider = Anthropic::new("test-key").base_url(server.uri());
    let mut session = Session::new(TurnOrchestrator::new(provider));

    let text = session.generate_text("Hi").await.unwrap();

    assert!(
        text.starts_with("Error during generation: Error code: 403 - {"),
        "{text}"
    );
    assert!(text.contains("permission_error"), "{text}");
    assert_eq!(session.history().conversation().len(), 2);
}
