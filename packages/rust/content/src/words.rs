//! Stop-word list shared by keyword derivation and chart fallback.

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "been", "before", "being", "between", "both", "but", "by", "can", "could", "did", "do",
    "does", "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
    "he", "her", "here", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "just", "key", "may", "more", "most", "much", "must", "no", "not", "now", "of", "on", "once",
    "one", "only", "or", "other", "our", "out", "over", "overview", "own", "same", "she",
    "should", "slide", "so", "some", "such", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "why", "will",
    "with", "would", "you", "your",
];

/// True for common function words and slide boilerplate vocabulary.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word.to_lowercase().as_str())
}

/// Lowercased alphabetic words of at least three letters that are not stop words.
pub fn content_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() >= 3 && !is_stop_word(w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_stop_words_and_short_tokens() {
        assert_eq!(
            content_words("The Queen's role in 3 colonies, and why it matters"),
            vec!["queen's", "role", "colonies", "matters"]
        );
        assert!(is_stop_word("The"));
        assert!(!is_stop_word("larva"));
    }
}
