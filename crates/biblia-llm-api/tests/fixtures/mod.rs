use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use biblia_llm_api::GeminiConfig;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-2.5-flash";

/// Mock Gemini endpoint for exercising the REST client
pub struct GeminiMockServer {
    server: MockServer,
}

impl GeminiMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> GeminiConfig {
        GeminiConfig::new(TEST_API_KEY)
            .with_base_url(&format!("{}/v1beta", self.server.uri()))
            .expect("mock server uri is a valid http url")
    }

    fn stream_path() -> String {
        format!("/v1beta/models/{}:streamGenerateContent", TEST_MODEL)
    }

    fn generate_path() -> String {
        format!("/v1beta/models/{}:generateContent", TEST_MODEL)
    }

    /// SSE body with one event per text fragment, the last one marked STOP
    pub fn sse_body(fragments: &[&str]) -> String {
        let mut body = String::new();
        for (index, text) in fragments.iter().enumerate() {
            let mut candidate = json!({
                "content": {"role": "model", "parts": [{"text": text}]}
            });
            if index + 1 == fragments.len() {
                candidate["finishReason"] = json!("STOP");
            }
            body.push_str(&format!("data: {}\r\n\r\n", json!({"candidates": [candidate]})));
        }
        body
    }

    /// Mock a successful streamed reply
    pub async fn mock_stream_success(&self, fragments: &[&str]) {
        self.mock_stream_raw(Self::sse_body(fragments)).await;
    }

    /// Mock a streamed reply with an arbitrary SSE body
    pub async fn mock_stream_raw(&self, body: String) {
        Mock::given(method("POST"))
            .and(path(Self::stream_path()))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&self.server)
            .await;
    }

    /// Mock an error status on the streaming endpoint
    pub async fn mock_stream_error(&self, status: u16, message: &str, status_text: &str) {
        Mock::given(method("POST"))
            .and(path(Self::stream_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "code": status,
                    "message": message,
                    "status": status_text
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a one-shot generation returning the given candidates payload
    pub async fn mock_generate(&self, response: Value) {
        Mock::given(method("POST"))
            .and(path(Self::generate_path()))
            .and(header("x-goog-api-key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Mock an error status on the one-shot endpoint
    pub async fn mock_generate_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(Self::generate_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": message}
            })))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far, in arrival order
    pub async fn request_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("request body is JSON"))
            .collect()
    }
}
