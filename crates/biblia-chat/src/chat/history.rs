use biblia_types::{HistoryEntry, Message};

/// Whether a stored message is a finished turn with something to say.
///
/// Streaming replies, queued (pending) messages and blank content never
/// reach the provider.
pub fn is_context_message(message: &Message) -> bool {
    message.is_finalized() && !message.content.trim().is_empty()
}

/// Convert stored messages into the role/content pairs a provider accepts
/// as conversation context, keeping their order
pub fn format_history(messages: &[Message]) -> Vec<HistoryEntry> {
    messages
        .iter()
        .filter(|message| is_context_message(message))
        .map(|message| HistoryEntry::new(message.role, message.content.clone()))
        .collect()
}
