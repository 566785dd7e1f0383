// src/core/turn.rs — One completion request per conversational role

use std::sync::Arc;

use crate::core::transcript::Transcript;
use crate::infra::config::{Config, ConversationConfig};
use crate::infra::errors::ConvoError;
use crate::provider::{ChatRequest, Message, ModelProvider, TokenUsage};

/// Reply text plus the usage the service reported for it.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub usage: TokenUsage,
}

/// Prompts and response caps for the two roles.
#[derive(Debug, Clone)]
pub struct TurnPrompts {
    pub responder_instructions: String,
    pub follow_up_prompt: String,
    pub responder_max_tokens: u32,
    pub follow_up_max_tokens: u32,
}

impl From<&ConversationConfig> for TurnPrompts {
    fn from(c: &ConversationConfig) -> Self {
        Self {
            responder_instructions: c.responder_instructions.clone(),
            follow_up_prompt: c.follow_up_prompt.clone(),
            responder_max_tokens: c.responder_max_tokens,
            follow_up_max_tokens: c.follow_up_max_tokens,
        }
    }
}

impl Default for TurnPrompts {
    fn default() -> Self {
        Self::from(&ConversationConfig::default())
    }
}

/// Issues responder and follow-up requests. No retries: any failure is
/// returned to the caller as-is.
pub struct TurnExecutor {
    provider: Arc<dyn ModelProvider>,
    model: String,
    prompts: TurnPrompts,
}

impl TurnExecutor {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        prompts: TurnPrompts,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts,
        }
    }

    pub fn from_config(provider: Arc<dyn ModelProvider>, config: &Config) -> Self {
        Self::new(
            provider,
            config.model.name.clone(),
            TurnPrompts::from(&config.conversation),
        )
    }

    pub fn prompts(&self) -> &TurnPrompts {
        &self.prompts
    }

    pub fn responder_request(&self, transcript: &Transcript) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: transcript.to_vec(),
            max_tokens: Some(self.prompts.responder_max_tokens),
            system: Some(self.prompts.responder_instructions.clone()),
        }
    }

    pub fn follow_up_request(&self, transcript: &Transcript) -> ChatRequest {
        let mut messages = transcript.to_vec();
        messages.push(Message::user(self.prompts.follow_up_prompt.clone()));
        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.prompts.follow_up_max_tokens),
            system: None,
        }
    }

    pub async fn ask_responder(&self, transcript: &Transcript) -> Result<TurnReply, ConvoError> {
        self.send(self.responder_request(transcript)).await
    }

    pub async fn ask_follow_up(&self, transcript: &Transcript) -> Result<TurnReply, ConvoError> {
        self.send(self.follow_up_request(transcript)).await
    }

    async fn send(&self, request: ChatRequest) -> Result<TurnReply, ConvoError> {
        tracing::debug!(
            provider = self.provider.id(),
            model = %request.model,
            messages = request.messages.len(),
            "requesting completion"
        );
        let response = self.provider.chat(request).await?;
        Ok(TurnReply {
            text: response.content,
            usage: response.usage,
        })
    }
}
