use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{mask_secret, safe_truncate};

/// Milliseconds since the epoch, used to pair request and response log files
pub fn log_timestamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn file_safe_model(model: &str) -> String {
    model.replace(['/', ':'], "-")
}

/// Log an outgoing request at debug level (console output via the `log` facade)
pub fn log_request(url: &str, body: &serde_json::Value) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let json = serde_json::to_string_pretty(body).unwrap_or_else(|e| format!("<unserializable: {}>", e));
    log::debug!("POST {} ({} bytes)\n{}", url, json.len(), safe_truncate(&json, 5000));
}

/// Log HTTP request to file for persistent debugging
///
/// Returns the path of the written file. The API key is masked.
pub fn log_request_to_file(
    logs_dir: &Path,
    url: &str,
    model: &str,
    api_key: &str,
    body: &serde_json::Value,
    timestamp: u128,
) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let filename = format!("req-{}-{}.json.txt", timestamp, file_safe_model(model));
    let file_path = logs_dir.join(filename);

    let mut log_content = String::new();
    log_content.push_str("HTTP REQUEST LOG (GEMINI)\n");
    log_content.push_str("=========================\n\n");
    log_content.push_str(&format!("Timestamp: {}\n", timestamp));
    log_content.push_str(&format!("Model: {}\n", model));
    log_content.push_str(&format!("URL: {}\n\n", url));

    log_content.push_str("Headers:\n");
    log_content.push_str("  Content-Type: application/json\n");
    log_content.push_str(&format!("  x-goog-api-key: {}\n\n", mask_secret(api_key)));

    log_content.push_str("Request Body:\n");
    match serde_json::to_string_pretty(body) {
        Ok(json) => {
            log_content.push_str(&json);
            log_content.push('\n');
        }
        Err(e) => {
            log_content.push_str(&format!("Error serializing request: {}\n", e));
        }
    }

    fs::write(&file_path, log_content)
        .with_context(|| format!("Failed to write request log to {}", file_path.display()))?;

    log::debug!("Request logged to: {}", file_path.display());

    Ok(file_path)
}

/// Log an error response body to file, paired with its request by timestamp
pub fn log_response_to_file(
    logs_dir: &Path,
    status: u16,
    body: &str,
    model: &str,
    request_timestamp: u128,
) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let filename = format!("resp-{}-{}.txt", request_timestamp, file_safe_model(model));
    let file_path = logs_dir.join(filename);

    let mut log_content = String::new();
    log_content.push_str("HTTP RESPONSE LOG\n");
    log_content.push_str("=================\n\n");
    log_content.push_str(&format!("Timestamp: {}\n", request_timestamp));
    log_content.push_str(&format!("Model: {}\n", model));
    log_content.push_str(&format!("Status: {}\n\n", status));

    log_content.push_str("Response Body:\n");
    // Try to pretty-print JSON, fall back to raw text
    match serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
    {
        Some(pretty) => log_content.push_str(&pretty),
        None => log_content.push_str(body),
    }
    log_content.push('\n');

    fs::write(&file_path, log_content)
        .with_context(|| format!("Failed to write response log to {}", file_path.display()))?;

    Ok(file_path)
}

/// Log a raw streaming event at trace level
pub fn log_stream_chunk(chunk_num: usize, data: &str) {
    log::trace!(
        "Stream chunk #{}: {}",
        chunk_num,
        if data.chars().count() > 200 {
            format!("{} ({} bytes)", safe_truncate(data, 200), data.len())
        } else {
            data.to_string()
        }
    );
}
