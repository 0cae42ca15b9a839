mod fixtures;

use biblia_llm_api::{ChatProvider, Fragment, GeminiClient, ProviderError, SessionConfig};
use biblia_types::{HistoryEntry, Role};
use fixtures::GeminiMockServer;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn session_config(history: Vec<HistoryEntry>) -> SessionConfig {
    SessionConfig {
        system_instruction: "You are Biblia AI.".to_string(),
        temperature: 0.3,
        history,
    }
}

async fn collect(stream: biblia_llm_api::FragmentStream) -> Vec<Result<Fragment, ProviderError>> {
    stream.collect().await
}

#[tokio::test]
async fn test_stream_yields_fragments_in_order() {
    let server = GeminiMockServer::new().await;
    server.mock_stream_success(&["In the beginning", " was the Word"]).await;

    let client = GeminiClient::new(server.config());
    let mut session = client.create_session(session_config(vec![])).await.unwrap();
    let results = collect(session.send_stream("John 1:1?").await.unwrap()).await;

    let texts: Vec<String> = results.into_iter().map(|r| r.unwrap().text).collect();
    assert_eq!(texts, vec!["In the beginning", " was the Word"]);
}

#[tokio::test]
async fn test_stream_request_carries_instruction_history_and_temperature() {
    let server = GeminiMockServer::new().await;
    server.mock_stream_success(&["ok"]).await;

    let client = GeminiClient::new(server.config());
    let history = vec![
        HistoryEntry::new(Role::User, "Who was Ruth?"),
        HistoryEntry::new(Role::Assistant, "A Moabite woman."),
    ];
    let mut session = client.create_session(session_config(history)).await.unwrap();
    collect(session.send_stream("And Naomi?").await.unwrap()).await;

    let bodies = server.request_bodies().await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are Biblia AI.");
    assert_eq!(
        body["contents"],
        json!([
            {"role": "user", "parts": [{"text": "Who was Ruth?"}]},
            {"role": "model", "parts": [{"text": "A Moabite woman."}]},
            {"role": "user", "parts": [{"text": "And Naomi?"}]}
        ])
    );
    let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.3).abs() < 1e-6);
}

#[tokio::test]
async fn test_completed_exchange_is_appended_to_history() {
    let server = GeminiMockServer::new().await;
    server.mock_stream_success(&["Grace ", "and peace"]).await;

    let client = GeminiClient::new(server.config());
    let mut session = client.create_session(session_config(vec![])).await.unwrap();
    collect(session.send_stream("Greet me like Paul").await.unwrap()).await;
    collect(session.send_stream("Again").await.unwrap()).await;

    assert_eq!(
        session.history(),
        vec![
            HistoryEntry::new(Role::User, "Greet me like Paul"),
            HistoryEntry::new(Role::Assistant, "Grace and peace"),
            HistoryEntry::new(Role::User, "Again"),
            HistoryEntry::new(Role::Assistant, "Grace and peace"),
        ]
    );

    let bodies = server.request_bodies().await;
    assert_eq!(bodies[1]["contents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_overloaded_status_is_reported_with_code() {
    let server = GeminiMockServer::new().await;
    server
        .mock_stream_error(503, "The model is overloaded. Please try again later.", "UNAVAILABLE")
        .await;

    let client = GeminiClient::new(server.config());
    let mut session = client.create_session(session_config(vec![])).await.unwrap();
    let err = match session.send_stream("hello").await {
        Ok(_) => panic!("expected the send to fail"),
        Err(e) => e,
    };

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("overloaded"));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_error_event_mid_stream_keeps_history_clean() {
    let server = GeminiMockServer::new().await;
    let mut body = GeminiMockServer::sse_body(&["Blessed are"]);
    body.push_str("data: {\"error\":{\"code\":500,\"message\":\"Internal error\",\"status\":\"INTERNAL\"}}\r\n\r\n");
    server.mock_stream_raw(body).await;

    let client = GeminiClient::new(server.config());
    let mut session = client.create_session(session_config(vec![])).await.unwrap();
    let results = collect(session.send_stream("Beatitudes").await.unwrap()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().text, "Blessed are");
    assert_eq!(
        results[1].as_ref().unwrap_err(),
        &ProviderError::api(500, "Internal error [INTERNAL]")
    );
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_trailing_event_without_newline_is_parsed() {
    let server = GeminiMockServer::new().await;
    let body = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Amen\"}]}}]}".to_string();
    server.mock_stream_raw(body).await;

    let client = GeminiClient::new(server.config());
    let mut session = client.create_session(session_config(vec![])).await.unwrap();
    let results = collect(session.send_stream("Close in prayer").await.unwrap()).await;

    assert_eq!(results, vec![Ok(Fragment::new("Amen"))]);
}

#[tokio::test]
async fn test_generate_once_returns_text() {
    let server = GeminiMockServer::new().await;
    server
        .mock_generate(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "- Asked about "}, {"text": "John 3:16"}]},
                "finishReason": "STOP"
            }]
        }))
        .await;

    let client = GeminiClient::new(server.config());
    let text = client.generate_once("Summarize").await.unwrap();
    assert_eq!(text.as_deref(), Some("- Asked about John 3:16"));

    let bodies = server.request_bodies().await;
    assert_eq!(bodies[0]["contents"][0]["parts"][0]["text"], "Summarize");
    assert!(bodies[0].get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_generate_once_without_candidates_is_none() {
    let server = GeminiMockServer::new().await;
    server.mock_generate(json!({"promptFeedback": {"blockReason": "OTHER"}})).await;

    let client = GeminiClient::new(server.config());
    assert_eq!(client.generate_once("Summarize").await.unwrap(), None);
}

#[tokio::test]
async fn test_generate_once_propagates_auth_error() {
    let server = GeminiMockServer::new().await;
    server.mock_generate_error(401, "API key not valid.").await;

    let client = GeminiClient::new(server.config());
    let err = tokio_test::assert_err!(client.generate_once("Summarize").await);
    assert_eq!(err, ProviderError::api(401, "API key not valid."));
}

#[tokio::test]
async fn test_request_log_dir_receives_request_and_error_logs() {
    let server = GeminiMockServer::new().await;
    server.mock_generate_error(400, "Invalid argument").await;
    let logs = TempDir::new().unwrap();

    let client = GeminiClient::new(server.config().with_request_log_dir(Some(logs.path().to_path_buf())));
    let _ = client.generate_once("Summarize").await;

    let mut names: Vec<String> = std::fs::read_dir(logs.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("req-"));
    assert!(names[1].starts_with("resp-"));
}

#[tokio::test]
async fn test_reply_without_text_is_not_replayed_as_context() {
    let server = GeminiMockServer::new().await;
    server
        .mock_stream_raw("data: {\"candidates\":[{\"finishReason\":\"SAFETY\"}]}\r\n\r\n".to_string())
        .await;

    let client = GeminiClient::new(server.config());
    let mut session = client.create_session(session_config(vec![])).await.unwrap();

    let first = collect(session.send_stream("q1").await.unwrap()).await;
    assert!(first.iter().all(|r| r.as_ref().unwrap().text.is_empty()));
    assert!(session.history().is_empty());

    collect(session.send_stream("q2").await.unwrap()).await;

    let bodies = server.request_bodies().await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["contents"], json!([{"role": "user", "parts": [{"text": "q2"}]}]));
    assert!(session.history().is_empty());
}
