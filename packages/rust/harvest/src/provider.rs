//! Search and page-text collaborators, plus their HTTP implementations.

use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use briefwright_shared::{BriefwrightError, CandidateSource, Result, build_client, public_target};

/// Pages larger than this are skipped (5 MB).
const MAX_PAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "svg",
];

static CONTENT_ROOTS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["main", "article", "body"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// A web search backend. An empty result list is a valid answer.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CandidateSource>>;
}

/// Fetches the visible text of a page. Returns an empty string on any failure.
#[async_trait]
pub trait PageTextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> String;
}

// ---------------------------------------------------------------------------
// HttpSearchProvider
// ---------------------------------------------------------------------------

/// Queries a JSON search endpoint with `?q=<query>&num=<n>`.
///
/// The response may be a bare array or an object holding the hits under
/// `results`, `items` or `organic`; each hit needs `url` (or `link`) and may
/// carry `title` and `snippet` (or `description`).
#[derive(Debug, Clone)]
pub struct HttpSearchProvider {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    max_results: usize,
}

impl HttpSearchProvider {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            BriefwrightError::validation(format!("invalid search endpoint {endpoint}: {e}"))
        })?;
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint,
            api_key: None,
            max_results: 8,
        })
    }

    /// Send `Authorization: Bearer <key>` with every query.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    #[instrument(skip_all, fields(query = %query))]
    async fn search(&self, query: &str) -> Result<Vec<CandidateSource>> {
        let num = self.max_results.to_string();
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("num", num.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BriefwrightError::Network(format!("search {query:?}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefwrightError::Network(format!(
                "search {query:?}: HTTP {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BriefwrightError::parse(format!("search {query:?}: {e}")))?;

        let mut results = parse_search_results(&body);
        results.truncate(self.max_results);
        debug!(count = results.len(), "search results");
        Ok(results)
    }
}

fn parse_search_results(body: &Value) -> Vec<CandidateSource> {
    let items: &[Value] = match body {
        Value::Array(items) => items,
        Value::Object(map) => ["results", "items", "organic"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let url = string_field(item, &["url", "link"])?;
            Some(CandidateSource::new(
                url,
                string_field(item, &["title"]).unwrap_or_default(),
                string_field(item, &["snippet", "description"]).unwrap_or_default(),
            ))
        })
        .collect()
}

fn string_field<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// HttpPageFetcher
// ---------------------------------------------------------------------------

/// Fetches HTML and reduces it to visible prose.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    /// Permit loopback/private hosts (mock servers in tests).
    allow_private: bool,
}

impl HttpPageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            allow_private: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn allow_private(mut self) -> Self {
        self.allow_private = true;
        self
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let parsed = if self.allow_private {
            Url::parse(url).map_err(|e| BriefwrightError::validation(format!("{url}: {e}")))?
        } else {
            public_target(url)?
        };

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| BriefwrightError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefwrightError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_PAGE_SIZE {
                return Err(BriefwrightError::validation(format!(
                    "{url}: page too large ({len} bytes)"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| BriefwrightError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(visible_text(&body))
    }
}

#[async_trait]
impl PageTextFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(%url, error = %e, "page text unavailable");
                String::new()
            }
        }
    }
}

/// Text of the first `main`, `article` or `body` element, minus chrome and scripts.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Some(root) = CONTENT_ROOTS
        .iter()
        .find_map(|selector| doc.select(selector).next())
    else {
        return String::new();
    };

    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parses_bare_arrays_and_wrapped_lists() {
        let bare = serde_json::json!([
            {"url": "https://a.edu/x", "title": "A", "snippet": "alpha"},
            {"title": "no url"},
        ]);
        let parsed = parse_search_results(&bare);
        assert_eq!(parsed, vec![CandidateSource::new("https://a.edu/x", "A", "alpha")]);

        let wrapped = serde_json::json!({
            "organic": [{"link": "https://b.gov/y", "description": "beta"}]
        });
        let parsed = parse_search_results(&wrapped);
        assert_eq!(parsed, vec![CandidateSource::new("https://b.gov/y", "", "beta")]);

        assert!(parse_search_results(&serde_json::json!({"unexpected": true})).is_empty());
        assert!(parse_search_results(&serde_json::json!("text")).is_empty());
    }

    #[test]
    fn visible_text_skips_chrome() {
        let html = r#"<html><body>
            <nav>Home | About</nav>
            <main><h1>Ant colonies</h1><script>var x = 1;</script>
            <p>Workers   forage
            for food.</p><aside>Ads</aside></main>
            <footer>Copyright</footer>
        </body></html>"#;
        assert_eq!(visible_text(html), "Ant colonies Workers forage for food.");
    }

    #[test]
    fn visible_text_falls_back_to_body() {
        let html = "<html><body><header>Site</header><p>Plain page.</p></body></html>";
        assert_eq!(visible_text(html), "Plain page.");
    }

    #[tokio::test]
    async fn search_sends_query_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "ant colony"))
            .and(query_param("num", "2"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"url": "https://a.edu/1", "title": "One"},
                    {"url": "https://a.edu/2", "title": "Two"},
                    {"url": "https://a.edu/3", "title": "Three"},
                ]
            })))
            .mount(&server)
            .await;

        let provider = HttpSearchProvider::new(&format!("{}/search", server.uri()), 5)
            .unwrap()
            .with_api_key(Some("secret".into()))
            .with_max_results(2);
        let results = provider.search("ant colony").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "Two");
    }

    #[tokio::test]
    async fn search_http_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = HttpSearchProvider::new(&server.uri(), 5).unwrap();
        assert!(provider.search("anything").await.is_err());
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(HttpSearchProvider::new("not a url", 5).is_err());
    }

    #[tokio::test]
    async fn fetcher_returns_visible_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ants"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><article><p>Queens lay eggs.</p></article></body></html>"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(5).unwrap().allow_private();
        let text = fetcher.fetch_text(&format!("{}/ants", server.uri())).await;
        assert_eq!(text, "Queens lay eggs.");
    }

    #[tokio::test]
    async fn fetcher_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(5).unwrap().allow_private();
        assert_eq!(fetcher.fetch_text(&format!("{}/missing", server.uri())).await, "");
        assert_eq!(fetcher.fetch_text("not a url").await, "");
    }

    #[tokio::test]
    async fn fetcher_refuses_private_hosts_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>secret</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(5).unwrap();
        assert_eq!(fetcher.fetch_text(&server.uri()).await, "");
    }
}
