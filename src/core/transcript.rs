// src/core/transcript.rs — Conversation transcript and its on-disk store
//
// Each conversation is written to `<dir>/<conversation_id>.json` as a
// pretty-printed array of `{role, content}` objects. Every persist rewrites
// the whole file; nothing is appended.

use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::infra::errors::ConvoError;
use crate::provider::{Message, Role};

/// Generate a fresh conversation identifier (`conversation_<unix-millis>`).
pub fn new_conversation_id() -> String {
    format!("conversation_{}", Utc::now().timestamp_millis())
}

/// Ordered message history. Stored roles alternate user/assistant, starting
/// with the user's question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(initial_question: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(initial_question)],
        }
    }

    /// Role the next appended message must carry.
    pub fn expected_role(&self) -> Role {
        match self.messages.last().map(|m| m.role) {
            Some(Role::User) => Role::Assistant,
            _ => Role::User,
        }
    }

    pub fn push(&mut self, message: Message) -> Result<(), ConvoError> {
        let expected = self.expected_role();
        if message.role != expected {
            return Err(ConvoError::TranscriptOrder {
                expected,
                found: message.role,
            });
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Copy of the messages for building a request.
    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

/// Writes transcripts under a single directory, one file per conversation.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.dir.join(format!("{conversation_id}.json"))
    }

    /// Write the full transcript, replacing whatever was there before.
    pub async fn persist(
        &self,
        conversation_id: &str,
        transcript: &Transcript,
    ) -> Result<PathBuf, ConvoError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(conversation_id);
        let json = serde_json::to_string_pretty(transcript.messages())?;
        tokio::fs::write(&path, json).await?;

        tracing::debug!(
            path = %path.display(),
            messages = transcript.len(),
            "transcript persisted"
        );
        Ok(path)
    }

    /// Read a persisted conversation back as a list of messages.
    pub async fn load(&self, conversation_id: &str) -> Result<Vec<Message>, ConvoError> {
        let content = tokio::fs::read_to_string(self.path_for(conversation_id)).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
