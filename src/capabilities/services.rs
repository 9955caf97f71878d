//! Shared collaborators handed to capabilities at construction time.

use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::{ChatModel, LlmError, OpenAiChat};

/// Collaborators injected into every capability constructor.
///
/// A capability clones what it needs out of here when it is built and owns
/// that handle from then on; nothing is created lazily on first use.
#[derive(Clone)]
pub struct Services {
    /// Process-wide settings.
    pub settings: Arc<Settings>,
    /// Chat model used by language-model capabilities.
    pub chat: Arc<dyn ChatModel>,
}

impl Services {
    /// Build services from settings, wiring an OpenAI-compatible chat client.
    pub fn from_settings(settings: Settings) -> Result<Self, LlmError> {
        let chat = OpenAiChat::from_settings(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            chat: Arc::new(chat),
        })
    }

    /// Build services around an explicit chat model.
    pub fn with_chat(settings: Settings, chat: Arc<dyn ChatModel>) -> Self {
        Self {
            settings: Arc::new(settings),
            chat,
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("settings", &self.settings)
            .field("chat", &self.chat.model())
            .finish()
    }
}
