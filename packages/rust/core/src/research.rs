//! Research-context synthesis from vetted sources.

use futures::stream::{self, StreamExt};
use tracing::{debug, instrument};

use briefwright_content::{paginate, strip_formatting, truncate_chars};
use briefwright_harvest::PageTextFetcher;
use briefwright_shared::{ContentConfig, VettedSource};

/// Limits for one context build.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// How many vetted sources to read, from the front of the set.
    pub max_sources: usize,
    /// Characters kept per source.
    pub chars_per_source: usize,
    /// Concurrent page fetches.
    pub concurrency: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::from(&ContentConfig::default())
    }
}

impl From<&ContentConfig> for ContextOptions {
    fn from(config: &ContentConfig) -> Self {
        Self {
            max_sources: config.context_sources,
            chars_per_source: config.context_chars_per_source,
            concurrency: 3,
        }
    }
}

/// Fetch the leading sources and fold them into a numbered context block.
///
/// Each entry reads `[n] title (url)` followed by the first page of the
/// cleaned page text. Sources whose text comes back empty keep their
/// header line so citations stay numbered in vetted order.
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn synthesize_context(
    fetcher: &dyn PageTextFetcher,
    sources: &[VettedSource],
    options: &ContextOptions,
) -> String {
    let chosen = &sources[..sources.len().min(options.max_sources)];
    let limit = options.chars_per_source;

    let excerpts: Vec<String> = stream::iter(chosen)
        .map(|source| async move {
            let text = strip_formatting(&fetcher.fetch_text(&source.url).await);
            let first_page = paginate(&text, limit).into_iter().next().unwrap_or_default();
            // a single overlong sentence fills its own page
            let excerpt = truncate_chars(&first_page, limit);
            if excerpt.is_empty() {
                debug!(url = %source.url, "no usable text from source");
            }
            excerpt
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    chosen
        .iter()
        .zip(excerpts)
        .enumerate()
        .map(|(i, (source, excerpt))| {
            let title = if source.title.is_empty() {
                source.url.as_str()
            } else {
                source.title.as_str()
            };
            let header = format!("[{}] {} ({})", i + 1, title, source.url);
            if excerpt.is_empty() {
                header
            } else {
                format!("{header}\n{excerpt}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use briefwright_shared::Admission;

    use super::*;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageTextFetcher for MapFetcher {
        async fn fetch_text(&self, url: &str) -> String {
            self.0.get(url).cloned().unwrap_or_default()
        }
    }

    fn source(url: &str, title: &str) -> VettedSource {
        VettedSource {
            url: url.into(),
            title: title.into(),
            snippet: String::new(),
            score: 0.8,
            admission: Admission::Scored,
        }
    }

    #[tokio::test]
    async fn numbered_blocks_in_vetted_order() {
        let fetcher = MapFetcher(HashMap::from([
            ("https://a.edu/ants".to_string(), "Ants live in colonies.".to_string()),
            ("https://b.gov/ants".to_string(), "<p>Queens lay eggs.</p>".to_string()),
        ]));
        let sources = vec![
            source("https://a.edu/ants", "Ant colonies"),
            source("https://b.gov/ants", "Ant queens"),
            source("https://c.org/ants", ""),
        ];

        let context = synthesize_context(&fetcher, &sources, &ContextOptions::default()).await;
        assert_eq!(
            context,
            "[1] Ant colonies (https://a.edu/ants)\nAnts live in colonies.\n\n\
             [2] Ant queens (https://b.gov/ants)\nQueens lay eggs.\n\n\
             [3] https://c.org/ants (https://c.org/ants)"
        );
    }

    #[tokio::test]
    async fn caps_sources_and_characters() {
        let long = "Workers forage for food. ".repeat(40);
        let fetcher = MapFetcher(HashMap::from([("https://a.edu/1".to_string(), long)]));
        let sources: Vec<_> = (1..=5)
            .map(|i| source(&format!("https://a.edu/{i}"), "Ants"))
            .collect();
        let options = ContextOptions {
            max_sources: 2,
            chars_per_source: 100,
            concurrency: 2,
        };

        let context = synthesize_context(&fetcher, &sources, &options).await;
        assert!(context.starts_with("[1] Ants (https://a.edu/1)\n"));
        assert!(context.contains("[2] Ants"));
        assert!(!context.contains("[3]"));
        let excerpt = context.lines().nth(1).unwrap_or_default();
        assert!(excerpt.chars().count() <= 100);
    }
}
