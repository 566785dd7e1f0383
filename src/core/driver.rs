// src/core/driver.rs — Conversation loop: responder and follow-up turns

use std::path::PathBuf;
use std::sync::Arc;

use super::transcript::{new_conversation_id, Transcript, TranscriptStore};
use super::turn::TurnExecutor;
use super::usage::{CallKind, Pricing, UsageAccumulator, UsageSnapshot};
use crate::infra::config::Config;
use crate::infra::errors::ConvoError;
use crate::infra::paths;
use crate::provider::{Message, ModelProvider};
use crate::util::preview_words;

/// Events emitted while a conversation is being built.
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    Started {
        conversation_id: String,
        responder_instructions: String,
        follow_up_prompt: String,
        initial_question: String,
    },
    Usage {
        kind: CallKind,
        /// 1-based responder turn the call belongs to.
        turn: u32,
        snapshot: UsageSnapshot,
    },
    Reply {
        turn: u32,
        preview: String,
    },
    FollowUp {
        turn: u32,
        preview: String,
    },
    Persisted {
        path: PathBuf,
        messages: usize,
    },
    Failed {
        message: String,
    },
    Finished {
        responder_turns: u32,
        messages: usize,
        estimated_cost: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    /// Turn budget N. The run makes `max(N - 1, 1)` responder calls.
    pub turns: u32,
    pub preview_words: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            turns: 10,
            preview_words: 10,
        }
    }
}

impl DriverSettings {
    pub fn responder_turns(&self) -> u32 {
        self.turns.saturating_sub(1).max(1)
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    Aborted(ConvoError),
}

/// Final state of a run. The transcript on disk matches `transcript` as of
/// the last successful persist.
#[derive(Debug)]
pub struct RunReport {
    pub conversation_id: String,
    pub transcript: Transcript,
    pub usage: UsageSnapshot,
    pub responder_turns: u32,
    pub path: Option<PathBuf>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }
}

/// Run state threaded through the loop.
struct RunState {
    transcript: Transcript,
    usage: UsageAccumulator,
    responder_turns: u32,
    path: Option<PathBuf>,
}

/// Drives one conversation from the initial question to the turn budget.
pub struct ConversationDriver {
    executor: TurnExecutor,
    store: TranscriptStore,
    pricing: Pricing,
    settings: DriverSettings,
    on_progress: Option<Box<dyn Fn(ConversationEvent) + Send + Sync>>,
}

impl ConversationDriver {
    pub fn new(
        executor: TurnExecutor,
        store: TranscriptStore,
        pricing: Pricing,
        settings: DriverSettings,
    ) -> Self {
        Self {
            executor,
            store,
            pricing,
            settings,
            on_progress: None,
        }
    }

    pub fn from_config(provider: Arc<dyn ModelProvider>, config: &Config) -> Self {
        Self::new(
            TurnExecutor::from_config(provider, config),
            TranscriptStore::new(paths::conversations_dir(&config.storage.conversations_dir)),
            config.pricing(),
            DriverSettings {
                turns: config.conversation.turns,
                preview_words: config.conversation.preview_words,
            },
        )
    }

    /// Set a callback for real-time progress events.
    pub fn with_progress(mut self, cb: impl Fn(ConversationEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: ConversationEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    /// Build a conversation under a freshly generated identifier.
    pub async fn run(&self, initial_question: &str) -> RunReport {
        self.run_with_id(new_conversation_id(), initial_question).await
    }

    /// Build a conversation. Any failure stops the loop; whatever was
    /// persisted before it stays on disk.
    pub async fn run_with_id(&self, conversation_id: String, initial_question: &str) -> RunReport {
        let prompts = self.executor.prompts();
        self.emit(ConversationEvent::Started {
            conversation_id: conversation_id.clone(),
            responder_instructions: prompts.responder_instructions.clone(),
            follow_up_prompt: prompts.follow_up_prompt.clone(),
            initial_question: initial_question.to_string(),
        });

        let mut state = RunState {
            transcript: Transcript::new(initial_question),
            usage: UsageAccumulator::new(self.pricing),
            responder_turns: 0,
            path: None,
        };

        let outcome = match self.drive(&conversation_id, &mut state).await {
            Ok(()) => {
                self.emit(ConversationEvent::Finished {
                    responder_turns: state.responder_turns,
                    messages: state.transcript.len(),
                    estimated_cost: state.usage.estimated_cost(),
                });
                RunOutcome::Completed
            }
            Err(e) => {
                tracing::error!(
                    conversation = %conversation_id,
                    completed_turns = state.responder_turns,
                    "conversation aborted: {}",
                    e
                );
                self.emit(ConversationEvent::Failed {
                    message: e.to_string(),
                });
                RunOutcome::Aborted(e)
            }
        };

        RunReport {
            conversation_id,
            usage: state.usage.current(),
            transcript: state.transcript,
            responder_turns: state.responder_turns,
            path: state.path,
            outcome,
        }
    }

    async fn drive(&self, conversation_id: &str, state: &mut RunState) -> Result<(), ConvoError> {
        let total = self.settings.responder_turns();

        for i in 0..total {
            let turn = i + 1;

            let reply = self.executor.ask_responder(&state.transcript).await?;
            let preview = preview_words(&reply.text, self.settings.preview_words);
            state.transcript.push(Message::assistant(reply.text))?;
            let snapshot = state.usage.record(CallKind::Responder, &reply.usage);
            self.emit(ConversationEvent::Usage {
                kind: CallKind::Responder,
                turn,
                snapshot,
            });
            self.persist(conversation_id, state).await?;
            state.responder_turns = turn;
            self.emit(ConversationEvent::Reply { turn, preview });

            // No follow-up after the last responder turn
            if turn < total {
                let question = self.executor.ask_follow_up(&state.transcript).await?;
                let preview = preview_words(&question.text, self.settings.preview_words);
                state.transcript.push(Message::user(question.text))?;
                let snapshot = state.usage.record(CallKind::FollowUp, &question.usage);
                self.emit(ConversationEvent::Usage {
                    kind: CallKind::FollowUp,
                    turn,
                    snapshot,
                });
                self.persist(conversation_id, state).await?;
                self.emit(ConversationEvent::FollowUp { turn, preview });
            }
        }

        Ok(())
    }

    async fn persist(&self, conversation_id: &str, state: &mut RunState) -> Result<(), ConvoError> {
        let path = self.store.persist(conversation_id, &state.transcript).await?;
        self.emit(ConversationEvent::Persisted {
            path: path.clone(),
            messages: state.transcript.len(),
        });
        state.path = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responder_turns_from_budget() {
        let s = |turns| DriverSettings {
            turns,
            preview_words: 10,
        };
        assert_eq!(s(10).responder_turns(), 9);
        assert_eq!(s(2).responder_turns(), 1);
        assert_eq!(s(1).responder_turns(), 1);
        assert_eq!(s(0).responder_turns(), 1);
    }

    #[test]
    fn test_default_settings() {
        let s = DriverSettings::default();
        assert_eq!(s.turns, 10);
        assert_eq!(s.preview_words, 10);
    }
}
