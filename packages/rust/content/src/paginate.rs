//! Sentence splitting and greedy page packing.

use std::sync::LazyLock;

use regex::Regex;

use crate::cleanup::collapse_whitespace;

/// Terminal punctuation, optional closing quotes/brackets, then whitespace.
///
/// Requiring whitespace keeps decimals like `3.5` and URLs intact.
static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("valid regex"));

/// Split prose into trimmed sentences. A trailing fragment without terminal
/// punctuation counts as a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = collapse_whitespace(text);
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in BOUNDARY_RE.find_iter(&text) {
        let sentence = text[start..boundary.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = boundary.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Pack whole sentences into pages of at most `max_chars` characters.
///
/// Pages never end mid-sentence. A sentence longer than `max_chars` becomes
/// a page of its own. Empty input yields no pages.
pub fn paginate(text: &str, max_chars: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let len = sentence.chars().count();

        if current.is_empty() {
            current = sentence;
            current_len = len;
        } else if current_len + 1 + len <= max_chars {
            current.push(' ');
            current.push_str(&sentence);
            current_len += 1 + len;
        } else {
            pages.push(std::mem::replace(&mut current, sentence));
            current_len = len;
        }
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}
