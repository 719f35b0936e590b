//! Prompt intent classification.

/// Whether a prompt asks for something that needs rigorous sourcing.
///
/// True when any configured intent phrase appears as whole words in the
/// prompt, case-insensitively. A trailing plural `s` on the prompt word is
/// tolerated, so `"reports"` matches `"report"` but `"reporting"` does not.
pub fn is_rigorous<S: AsRef<str>>(prompt: &str, intents: &[S]) -> bool {
    let lowered = prompt.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    intents.iter().any(|intent| {
        let phrase: Vec<String> = intent
            .as_ref()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        !phrase.is_empty()
            && words.windows(phrase.len()).any(|window| {
                window
                    .iter()
                    .zip(&phrase)
                    .all(|(word, expected)| word_matches(word, expected))
            })
    })
}

fn word_matches(word: &str, expected: &str) -> bool {
    word == expected || word.strip_suffix('s') == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefwright_shared::HarvestConfig;

    fn intents() -> Vec<String> {
        HarvestConfig::default().rigorous_intents
    }

    #[test]
    fn report_prompts_are_rigorous() {
        assert!(is_rigorous("ant life cycle report", &intents()));
        assert!(is_rigorous("An ANALYSIS of volcano eruptions", &intents()));
        assert!(is_rigorous("two reports on coral", &intents()));
    }

    #[test]
    fn multi_word_intents_need_every_word() {
        assert!(is_rigorous("literature review: bee decline", &intents()));
        assert!(!is_rigorous("review the literature on bees", &["literature review"]));
    }

    #[test]
    fn casual_prompts_are_not() {
        assert!(!is_rigorous("fun slides about ants for kids", &intents()));
        assert!(!is_rigorous("reporting tools", &["report"]));
        assert!(!is_rigorous("anything", &[] as &[&str]));
    }
}
