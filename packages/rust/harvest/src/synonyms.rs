//! Domain synonym and related-term table used by the synonym round.

use crate::topic::{Topic, fold};

/// Maximum number of substituted queries produced per topic.
const MAX_SYNONYM_QUERIES: usize = 6;

/// `(term, related terms)`; terms are matched plural-insensitively.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("ant", &["formicidae", "myrmecology", "ant colony", "eusocial insect"]),
    ("bee", &["apis mellifera", "honeybee", "pollinator"]),
    ("butterfly", &["lepidoptera", "monarch butterfly"]),
    ("insect", &["entomology", "arthropod"]),
    ("life", &["biology", "development"]),
    ("cycle", &["metamorphosis", "developmental stages", "life history"]),
    ("climate", &["global warming", "greenhouse effect", "climate science"]),
    ("ocean", &["marine science", "oceanography"]),
    ("volcano", &["volcanology", "eruption", "magma"]),
    ("planet", &["planetary science", "astronomy"]),
    ("solar", &["heliophysics", "astronomy"]),
    ("body", &["anatomy", "physiology"]),
    ("plant", &["botany", "flora"]),
    ("dinosaur", &["paleontology", "fossil record"]),
    ("disease", &["epidemiology", "pathology"]),
    ("economy", &["economics", "macroeconomics"]),
    ("energy", &["renewable energy", "power generation"]),
];

/// Related terms for a single word, if the table knows it.
pub fn related_terms(word: &str) -> &'static [&'static str] {
    let folded = fold(&word.to_lowercase()).to_string();
    SYNONYMS
        .iter()
        .find(|(term, _)| fold(term) == folded)
        .map(|(_, related)| *related)
        .unwrap_or(&[])
}

/// Queries built by substituting each topic term with its related terms.
///
/// Falls back to generic definition/glossary queries when no term is known.
pub fn synonym_queries(topic: &Topic) -> Vec<String> {
    let terms = topic.terms();
    let mut queries: Vec<String> = Vec::new();

    'terms: for (position, term) in terms.iter().enumerate() {
        for related in related_terms(term) {
            let query = terms
                .iter()
                .enumerate()
                .map(|(i, t)| if i == position { *related } else { t.as_str() })
                .collect::<Vec<_>>()
                .join(" ");
            if !queries.contains(&query) {
                queries.push(query);
            }
            if queries.len() >= MAX_SYNONYM_QUERIES {
                break 'terms;
            }
        }
    }

    if queries.is_empty() {
        let phrase = topic.phrase();
        queries.push(format!("{phrase} definition"));
        queries.push(format!("{phrase} glossary"));
    }

    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_terms_fold_plurals() {
        assert_eq!(related_terms("Ants"), related_terms("ant"));
        assert!(related_terms("ant").contains(&"formicidae"));
        assert!(related_terms("spreadsheet").is_empty());
    }

    #[test]
    fn substitutes_one_term_at_a_time() {
        let topic = Topic::from_prompt("ant life cycle report");
        let queries = synonym_queries(&topic);
        assert_eq!(queries.len(), MAX_SYNONYM_QUERIES);
        assert_eq!(queries[0], "formicidae life cycle");
        assert!(queries.contains(&"myrmecology life cycle".to_string()));
    }

    #[test]
    fn unknown_topics_use_generic_queries() {
        let topic = Topic::from_prompt("widget pricing");
        assert_eq!(
            synonym_queries(&topic),
            vec![
                "widget pricing definition".to_string(),
                "widget pricing glossary".to_string(),
            ]
        );
    }
}
