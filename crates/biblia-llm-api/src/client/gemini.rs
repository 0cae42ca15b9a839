use async_stream::stream;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use biblia_logging::{log_request, log_request_to_file, log_response_to_file, log_stream_chunk, log_timestamp};
use biblia_types::{HistoryEntry, Role};

use crate::client::{ChatProvider, ChatSession, Fragment, FragmentStream, ProviderError, SessionConfig};
use crate::config::GeminiConfig;

// ============================================================================
// Wire format
// ============================================================================

/// A single turn in Gemini's `contents` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    /// Gemini calls the assistant side of a conversation `model`
    pub fn from_history(entry: &HistoryEntry) -> Self {
        Self::text(Some(wire_role(entry.role)), &entry.content)
    }

    fn joined_text(&self) -> String {
        self.parts.iter().filter_map(|part| part.text.as_deref()).collect()
    }

    fn to_history(&self) -> Option<HistoryEntry> {
        let role = match self.role.as_deref() {
            Some("user") => Role::User,
            Some("model") => Role::Assistant,
            _ => return None,
        };
        Some(HistoryEntry::new(role, self.joined_text()))
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GenerateContentResponse {
    fn first_candidate_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(Content::joined_text)
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<String> {
        self.candidates.first().and_then(|candidate| candidate.finish_reason.clone())
    }
}

/// Turn a Gemini error body (`{"error": {"code", "message", "status"}}`) into
/// a readable message, falling back to the raw body.
fn extract_api_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let error = &json["error"];
    match (error["message"].as_str(), error["status"].as_str()) {
        (Some(message), Some(status)) => format!("{} [{}]", message, status),
        (Some(message), None) => message.to_string(),
        _ => body.trim().to_string(),
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gemini REST client. Cheap to clone; holds no conversation state.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, self.config.model
        )
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, self.config.model)
    }

    /// POST a request body and return the response once its status is known
    /// to be a success.
    async fn post(&self, url: &str, request: &GenerateContentRequest<'_>) -> Result<reqwest::Response, ProviderError> {
        let body = serde_json::to_value(request).map_err(|e| ProviderError::Decode(e.to_string()))?;
        let timestamp = log_timestamp();

        log_request(url, &body);
        if let Some(dir) = &self.config.request_log_dir {
            if let Err(e) = log_request_to_file(dir, url, &self.config.model, &self.config.api_key, &body, timestamp) {
                log::warn!("Could not write request log: {:#}", e);
            }
        }

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        if let Some(dir) = &self.config.request_log_dir {
            if let Err(e) = log_response_to_file(dir, status.as_u16(), &error_body, &self.config.model, timestamp) {
                log::warn!("Could not write response log: {:#}", e);
            }
        }

        Err(ProviderError::api(status.as_u16(), extract_api_error_message(&error_body)))
    }

    /// Parse a single SSE line; returns `None` for lines that carry no event
    fn parse_sse_line(line: &str) -> Option<Result<Fragment, ProviderError>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let data = line.strip_prefix("data:")?.trim_start();

        if data.is_empty() || data == "[DONE]" {
            return None;
        }

        let json: serde_json::Value = match serde_json::from_str(data) {
            Ok(json) => json,
            Err(e) => return Some(Err(ProviderError::Decode(format!("{}: {}", e, data)))),
        };

        if json.get("error").is_some() {
            let status = json["error"]["code"].as_u64().and_then(|code| u16::try_from(code).ok());
            let message = extract_api_error_message(data);
            return Some(Err(match status {
                Some(status) => ProviderError::api(status, message),
                None => ProviderError::Stream(message),
            }));
        }

        match serde_json::from_value::<GenerateContentResponse>(json) {
            Ok(response) => Some(Ok(Fragment {
                text: response.first_candidate_text(),
                finish_reason: response.finish_reason(),
            })),
            Err(e) => Some(Err(ProviderError::Decode(format!("{}: {}", e, data)))),
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn create_session(&self, config: SessionConfig) -> Result<Box<dyn ChatSession>, ProviderError> {
        log::debug!(
            "Opening Gemini session on {} with {} history turns",
            self.config.model,
            config.history.len()
        );

        let history = config.history.iter().map(Content::from_history).collect();
        Ok(Box::new(GeminiSession {
            client: self.clone(),
            system_instruction: config.system_instruction,
            temperature: config.temperature,
            history: Arc::new(Mutex::new(history)),
        }))
    }

    async fn generate_once(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let contents = [Content::text(Some("user"), prompt)];
        let request = GenerateContentRequest {
            contents: &contents,
            system_instruction: None,
            generation_config: None,
        };

        let response = self.post(&self.generate_url(), &request).await?;
        let response: GenerateContentResponse = response.json().await?;

        let text = response.first_candidate_text();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

// ============================================================================
// Session
// ============================================================================

/// Conversation against Gemini. The API itself is stateless, so the session
/// keeps the turns and replays them with every request.
pub struct GeminiSession {
    client: GeminiClient,
    system_instruction: String,
    temperature: f32,
    history: Arc<Mutex<Vec<Content>>>,
}

fn lock_history(history: &Mutex<Vec<Content>>) -> MutexGuard<'_, Vec<Content>> {
    history.lock().unwrap_or_else(|poisoned| {
        log::warn!("Session history lock was poisoned; recovering its contents");
        poisoned.into_inner()
    })
}

impl GeminiSession {
    fn snapshot(&self) -> Vec<Content> {
        lock_history(&self.history).clone()
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send_stream(&mut self, message: &str) -> Result<FragmentStream, ProviderError> {
        let user_turn = Content::text(Some("user"), message);
        let mut contents = self.snapshot();
        contents.push(user_turn.clone());

        let request = GenerateContentRequest {
            contents: &contents,
            system_instruction: Some(Content::text(None, &self.system_instruction)),
            generation_config: Some(GenerationConfig {
                temperature: self.temperature,
            }),
        };

        let response = self.client.post(&self.client.stream_url(), &request).await?;
        let history = Arc::clone(&self.history);
        let mut byte_stream = response.bytes_stream();

        let stream = stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut reply = String::new();
            let mut chunk_counter = 0;
            let mut failed = false;

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        failed = true;
                        yield Err(ProviderError::Stream(e.to_string()));
                        break 'read;
                    }
                };
                buffer.extend_from_slice(&chunk);

                // Only decode complete lines so multi-byte characters split
                // across network chunks survive intact
                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let raw: Vec<u8> = buffer.drain(..=newline).collect();
                    let line = String::from_utf8_lossy(&raw);

                    chunk_counter += 1;
                    log_stream_chunk(chunk_counter, &line);

                    match GeminiClient::parse_sse_line(&line) {
                        Some(Ok(fragment)) => {
                            reply.push_str(&fragment.text);
                            yield Ok(fragment);
                        }
                        Some(Err(e)) => {
                            failed = true;
                            yield Err(e);
                            break 'read;
                        }
                        None => {}
                    }
                }
            }

            if !failed && !buffer.is_empty() {
                let line = String::from_utf8_lossy(&buffer).into_owned();
                match GeminiClient::parse_sse_line(&line) {
                    Some(Ok(fragment)) => {
                        reply.push_str(&fragment.text);
                        yield Ok(fragment);
                    }
                    Some(Err(e)) => {
                        failed = true;
                        yield Err(e);
                    }
                    None => {}
                }
            }

            // Only completed exchanges with text become part of the
            // conversation; Gemini rejects empty parts in later requests
            if !failed {
                if reply.trim().is_empty() {
                    log::warn!("Reply had no text; leaving the exchange out of the session history");
                } else {
                    let mut turns = lock_history(&history);
                    turns.push(user_turn);
                    turns.push(Content::text(Some("model"), &reply));
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.snapshot().iter().filter_map(Content::to_history).collect()
    }
}
