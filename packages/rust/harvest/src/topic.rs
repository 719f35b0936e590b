//! Prompt → topic reduction and first-pass query generation.

/// Words that describe the deliverable or are grammatical filler, not the subject.
const NOISE_WORDS: &[&str] = &[
    "a", "an", "the", "of", "on", "about", "for", "to", "in", "into", "and", "or", "with", "by",
    "me", "my", "our", "us", "i", "we", "please", "need", "want", "would", "like", "can", "you",
    "make", "create", "build", "generate", "write", "prepare", "produce", "give", "draft",
    "deck", "slides", "slide", "slideshow", "presentation", "report", "analysis", "research",
    "study", "overview", "document", "doc", "paper", "brief", "briefing", "whitepaper",
    "summary", "pdf", "spreadsheet", "webpage", "page",
];

/// The subject of a request, stripped of deliverable words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    phrase: String,
    terms: Vec<String>,
}

impl Topic {
    /// Reduce a free-text prompt to its subject.
    ///
    /// `"ant life cycle report"` becomes phrase `"ant life cycle"` with terms
    /// `["ant", "life", "cycle"]`. A prompt made only of noise words keeps
    /// its own lowercased text as the phrase.
    pub fn from_prompt(prompt: &str) -> Self {
        let lowered = prompt.to_lowercase();
        let words: Vec<String> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
            .map(|w| w.trim_matches(|c: char| c == '-' || c == '\''))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        let terms: Vec<String> = words
            .iter()
            .filter(|w| !NOISE_WORDS.contains(&w.as_str()))
            .cloned()
            .collect();

        if terms.is_empty() {
            return Self {
                phrase: words.join(" "),
                terms: words,
            };
        }

        Self {
            phrase: terms.join(" "),
            terms,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// True when any term equals `keyword`, ignoring a plural `s`.
    pub fn mentions(&self, keyword: &str) -> bool {
        let keyword = fold(&keyword.to_lowercase()).to_string();
        self.terms.iter().any(|t| fold(t) == keyword)
    }
}

/// Queries issued before any harvest round.
pub fn initial_queries(topic: &Topic) -> Vec<String> {
    let phrase = topic.phrase();
    vec![
        phrase.to_string(),
        format!("{phrase} overview"),
        format!("{phrase} facts and statistics"),
    ]
}

pub(crate) fn fold(word: &str) -> &str {
    if word.len() > 3 {
        word.strip_suffix('s').unwrap_or(word)
    } else {
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_deliverable_words() {
        let topic = Topic::from_prompt("ant life cycle report");
        assert_eq!(topic.phrase(), "ant life cycle");
        assert_eq!(topic.terms(), ["ant", "life", "cycle"]);
    }

    #[test]
    fn handles_conversational_prompts() {
        let topic = Topic::from_prompt("Please make me a slide deck about Volcanoes, for my class!");
        assert_eq!(topic.phrase(), "volcanoes class");
    }

    #[test]
    fn noise_only_prompt_keeps_text() {
        let topic = Topic::from_prompt("Research Report");
        assert_eq!(topic.phrase(), "research report");
        assert_eq!(topic.terms().len(), 2);
    }

    #[test]
    fn mentions_folds_plurals() {
        let topic = Topic::from_prompt("ants and bees");
        assert!(topic.mentions("ant"));
        assert!(topic.mentions("Bees"));
        assert!(!topic.mentions("wasp"));
    }

    #[test]
    fn initial_queries_use_phrase() {
        let topic = Topic::from_prompt("coral reef analysis");
        assert_eq!(
            initial_queries(&topic),
            vec![
                "coral reef".to_string(),
                "coral reef overview".to_string(),
                "coral reef facts and statistics".to_string(),
            ]
        );
    }
}
