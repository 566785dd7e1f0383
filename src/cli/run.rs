// src/cli/run.rs — Default command: build one conversation

use std::sync::Arc;
use std::time::Duration;

use crate::core::driver::{ConversationDriver, RunOutcome, RunReport};
use crate::infra::config::Config;
use crate::infra::errors::ConvoError;
use crate::provider::openai::OpenAIProvider;
use crate::provider::ModelProvider;

/// Build the completion provider from config and the environment.
pub fn build_provider(config: &Config) -> Result<Arc<dyn ModelProvider>, ConvoError> {
    let api_key = config.api_key()?;
    let mut provider = OpenAIProvider::with_base_url(api_key, config.model.base_url.clone());
    if let Some(secs) = config.model.timeout_secs {
        provider = provider.with_timeout(Duration::from_secs(secs))?;
    }
    Ok(Arc::new(provider))
}

/// Run one conversation with the given provider.
pub async fn run_with_provider(
    provider: Arc<dyn ModelProvider>,
    config: &Config,
    quiet: bool,
) -> RunReport {
    let mut driver = ConversationDriver::from_config(provider, config);
    if !quiet {
        driver = driver.with_progress(super::progress::terminal_progress());
    }

    tracing::info!(
        model = %config.model.name,
        turns = config.conversation.turns,
        dir = %driver.store().dir().display(),
        "starting conversation"
    );

    let report = driver.run(&config.conversation.initial_question).await;

    match (&report.outcome, &report.path) {
        (RunOutcome::Completed, Some(path)) => {
            tracing::info!(
                conversation = %report.conversation_id,
                messages = report.transcript.len(),
                "transcript written to {}",
                path.display()
            );
        }
        (RunOutcome::Completed, None) => {}
        (RunOutcome::Aborted(_), path) => {
            tracing::warn!(
                conversation = %report.conversation_id,
                persisted = ?path,
                "conversation ended early after {} response(s)",
                report.responder_turns
            );
        }
    }

    report
}

/// Resolve the provider, then run. Startup errors (missing key, bad client
/// config) are returned; conversation failures are reported in the `RunReport`.
pub async fn run_conversation(config: &Config, quiet: bool) -> anyhow::Result<RunReport> {
    let provider = build_provider(config)?;
    Ok(run_with_provider(provider, config, quiet).await)
}
