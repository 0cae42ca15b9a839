use std::fmt;
use uuid::Uuid;

use biblia_llm_api::{ChatProvider, ChatSession, ProviderError, SessionConfig};
use biblia_types::{BibleVersion, HistoryEntry, Message, CHAT_TEMPERATURE};

use crate::chat::history::format_history;
use crate::chat::prompt::system_instruction;

/// An open conversation together with the translation it was opened for.
///
/// Handles are never reconfigured in place: switching translation or
/// replaying history means opening a new one.
pub struct SessionHandle {
    id: Uuid,
    translation: BibleVersion,
    session: Box<dyn ChatSession>,
}

impl SessionHandle {
    pub fn new(translation: BibleVersion, session: Box<dyn ChatSession>) -> Self {
        Self {
            id: Uuid::new_v4(),
            translation,
            session,
        }
    }

    /// Unique per opened session
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn translation(&self) -> BibleVersion {
        self.translation
    }

    /// Turns the provider session currently holds
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.session.history()
    }

    pub(crate) fn session_mut(&mut self) -> &mut dyn ChatSession {
        self.session.as_mut()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("translation", &self.translation)
            .finish_non_exhaustive()
    }
}

/// Open a fresh Biblia AI session for `translation`, seeded with the
/// finalized turns of `history`. Provider errors are returned unchanged.
pub async fn create_session(
    provider: &dyn ChatProvider,
    translation: BibleVersion,
    history: &[Message],
) -> Result<SessionHandle, ProviderError> {
    let config = SessionConfig {
        system_instruction: system_instruction(translation),
        temperature: CHAT_TEMPERATURE,
        history: format_history(history),
    };

    log::debug!(
        "Creating {} session with {} of {} stored messages as context",
        translation,
        config.history.len(),
        history.len()
    );

    let session = provider.create_session(config).await?;
    let handle = SessionHandle::new(translation, session);
    log::info!("Opened chat session {} ({})", handle.id(), translation.display_name());

    Ok(handle)
}
