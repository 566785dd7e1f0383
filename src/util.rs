// src/util.rs — Shared utility functions

/// First `max_words` space-separated words of `text`, with `...` appended
/// when anything was cut.
///
/// Splits on single spaces, so runs of spaces count as empty words. An empty
/// input yields an empty preview.
pub fn preview_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    let shown = words
        .iter()
        .take(max_words)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > max_words {
        format!("{shown}...")
    } else {
        shown
    }
}
