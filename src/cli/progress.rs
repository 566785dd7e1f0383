// src/cli/progress.rs — Terminal renderer for conversation events

use crossterm::style::{ContentStyle, Stylize};
use std::io::IsTerminal;

use crate::core::driver::ConversationEvent;

fn paint(text: impl Into<String>, style: ContentStyle, styled: bool) -> String {
    let text = text.into();
    if styled {
        style.apply(text).to_string()
    } else {
        text
    }
}

fn dim() -> ContentStyle {
    ContentStyle::new().dim()
}

fn label() -> ContentStyle {
    ContentStyle::new().green()
}

/// Render one event as console text. `None` for events that only go to the log.
pub fn format_event(event: &ConversationEvent, styled: bool) -> Option<String> {
    match event {
        ConversationEvent::Started {
            conversation_id,
            responder_instructions,
            follow_up_prompt,
            initial_question,
        } => {
            let header = [
                format!("Starting a new conversation ({conversation_id}) with system instructions..."),
                format!("System instruction for the answering agent: {responder_instructions}"),
                format!("Follow-Up prompt for the questioning agent: {follow_up_prompt}"),
            ];
            let header: Vec<String> = header.into_iter().map(|l| paint(l, dim(), styled)).collect();
            Some(format!(
                "{}\n\n{}{}\n",
                header.join("\n"),
                paint("Initial Question: ", label(), styled),
                initial_question,
            ))
        }
        ConversationEvent::Usage {
            kind,
            turn,
            snapshot,
        } => Some(paint(
            format!("{kind} {turn}: {}", snapshot.summary()),
            dim(),
            styled,
        )),
        ConversationEvent::Reply { preview, .. } => Some(format!(
            "\n{}{}\n",
            paint("Assistant's response: ", label(), styled),
            preview
        )),
        ConversationEvent::FollowUp { preview, .. } => Some(format!(
            "\n{}{}\n",
            paint("Follow-up question: ", label(), styled),
            preview
        )),
        ConversationEvent::Persisted { .. } => None,
        ConversationEvent::Failed { message } => Some(format!(
            "{} {}",
            paint("Conversation aborted:", ContentStyle::new().red().bold(), styled),
            message
        )),
        ConversationEvent::Finished {
            responder_turns,
            messages,
            estimated_cost,
        } => Some(paint(
            format!(
                "Conversation complete: {responder_turns} responses, {messages} messages, \
                 estimated total cost ${estimated_cost:.4}"
            ),
            dim(),
            styled,
        )),
    }
}

/// Build a progress callback that prints events to the terminal.
///
/// Failures go to stderr; everything else to stdout. Styling is only applied
/// when the stream is a terminal.
pub fn terminal_progress() -> impl Fn(ConversationEvent) + Send + Sync + 'static {
    move |event| {
        if matches!(event, ConversationEvent::Failed { .. }) {
            if let Some(line) = format_event(&event, std::io::stderr().is_terminal()) {
                eprintln!("{line}");
            }
        } else if let Some(line) = format_event(&event, std::io::stdout().is_terminal()) {
            println!("{line}");
        }
    }
}
