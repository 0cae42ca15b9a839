//! Core types and structures for biblia
//!
//! This crate provides the foundational types used across all biblia crates:
//! locally stored chat messages, the supported Bible translations and the
//! minimal history entries handed to a model provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for a streamed chat request
pub const MAX_RETRIES: u32 = 3;

/// Base backoff delay in milliseconds; doubled on every retry (2s, 4s, 8s)
pub const BASE_RETRY_DELAY_MS: u64 = 2000;

/// Sampling temperature for chat sessions. Kept low so quotations stay close
/// to the source text.
pub const CHAT_TEMPERATURE: f32 = 0.3;

// ============================================================================
// Translations
// ============================================================================

/// Bible translations the assistant can be asked to quote from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BibleVersion {
    #[serde(rename = "KJV")]
    Kjv,
    #[serde(rename = "NKJV")]
    Nkjv,
    #[serde(rename = "NIV")]
    Niv,
    #[default]
    #[serde(rename = "ESV")]
    Esv,
    #[serde(rename = "NASB")]
    Nasb,
    #[serde(rename = "NLT")]
    Nlt,
}

impl BibleVersion {
    pub const ALL: [BibleVersion; 6] = [
        BibleVersion::Kjv,
        BibleVersion::Nkjv,
        BibleVersion::Niv,
        BibleVersion::Esv,
        BibleVersion::Nasb,
        BibleVersion::Nlt,
    ];

    /// Short code used in prompts and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            BibleVersion::Kjv => "KJV",
            BibleVersion::Nkjv => "NKJV",
            BibleVersion::Niv => "NIV",
            BibleVersion::Esv => "ESV",
            BibleVersion::Nasb => "NASB",
            BibleVersion::Nlt => "NLT",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BibleVersion::Kjv => "King James Version",
            BibleVersion::Nkjv => "New King James Version",
            BibleVersion::Niv => "New International Version",
            BibleVersion::Esv => "English Standard Version",
            BibleVersion::Nasb => "New American Standard Bible",
            BibleVersion::Nlt => "New Living Translation",
        }
    }
}

impl fmt::Display for BibleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown Bible translation '{0}' (expected one of KJV, NKJV, NIV, ESV, NASB, NLT)")]
pub struct ParseVersionError(pub String);

impl FromStr for BibleVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BibleVersion::ALL
            .into_iter()
            .find(|version| version.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseVersionError(s.to_string()))
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Helper function to deserialize string or null values
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Delivery state of a locally stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Queued locally, not yet delivered to the model
    Pending,
    #[default]
    Sent,
    Error,
}

/// A chat message as stored by the front-end.
///
/// Messages that are still streaming or still pending are not finalized
/// conversational turns and must never be sent to a provider as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub role: Role,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub content: String,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            is_streaming: false,
            status: MessageStatus::Sent,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.is_streaming = true;
        self
    }

    /// Whether the message is a finished turn that may be shown to a model
    pub fn is_finalized(&self) -> bool {
        !self.is_streaming && self.status != MessageStatus::Pending
    }
}

/// Minimal role/content pair accepted by a provider as conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
