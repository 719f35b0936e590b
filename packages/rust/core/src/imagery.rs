//! Slide image annotation by keyword.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use briefwright_shared::{BriefwrightError, Result, SlideUnit, build_client};

/// Fields that may hold the image URL in an image-service response.
const URL_KEYS: &[&str] = &["url", "image_url", "imageUrl", "image", "src"];

/// Looks up an illustrative image for a keyword.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// `Ok(None)` means the service knows no image for this keyword.
    async fn lookup(&self, keyword: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// HttpImageProvider
// ---------------------------------------------------------------------------

/// Queries a JSON image endpoint with `?q=<keyword>`.
///
/// Accepts `{"url": ..}` (or `image_url`, `image`, `src`), a
/// `{"results": [..]}` list of such objects, or a bare array.
#[derive(Debug, Clone)]
pub struct HttpImageProvider {
    client: Client,
    endpoint: Url,
}

impl HttpImageProvider {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            BriefwrightError::validation(format!("invalid image endpoint {endpoint}: {e}"))
        })?;
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint,
        })
    }
}

#[async_trait]
impl ImageProvider for HttpImageProvider {
    async fn lookup(&self, keyword: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", keyword)])
            .send()
            .await
            .map_err(|e| BriefwrightError::Network(format!("image {keyword:?}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BriefwrightError::Network(format!(
                "image {keyword:?}: HTTP {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BriefwrightError::parse(format!("image {keyword:?}: {e}")))?;
        Ok(image_url(&body))
    }
}

fn image_url(body: &Value) -> Option<String> {
    match body {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| s.starts_with("http")),
        Value::Array(items) => items.iter().find_map(image_url),
        Value::Object(map) => URL_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(image_url)
            .or_else(|| map.get("results").and_then(image_url)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// BoundedCache
// ---------------------------------------------------------------------------

/// Fixed-capacity map that evicts the oldest inserted key when full.
#[derive(Debug, Clone)]
pub(crate) struct BoundedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub(crate) fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), value).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// ImageAnnotator
// ---------------------------------------------------------------------------

/// Sets `image_url` on slides, memoizing lookups per keyword.
pub struct ImageAnnotator {
    provider: Arc<dyn ImageProvider>,
    cache: BoundedCache<String, Option<String>>,
}

impl ImageAnnotator {
    pub fn new(provider: Arc<dyn ImageProvider>, cache_capacity: usize) -> Self {
        Self {
            provider,
            cache: BoundedCache::new(cache_capacity),
        }
    }

    /// Annotate every non-filler slide with a keyword. Failed lookups leave
    /// `image_url` empty and are not cached. Returns the number annotated.
    #[instrument(skip_all, fields(slides = slides.len()))]
    pub async fn annotate(&mut self, slides: &mut [SlideUnit]) -> usize {
        let mut annotated = 0;

        for slide in slides.iter_mut().filter(|s| !s.is_filler) {
            let keyword = slide.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                continue;
            }

            let found = match self.cache.get(&keyword) {
                Some(hit) => hit.clone(),
                None => match self.provider.lookup(&keyword).await {
                    Ok(found) => {
                        self.cache.insert(keyword.clone(), found.clone());
                        found
                    }
                    Err(e) => {
                        warn!(%keyword, error = %e, "image lookup failed");
                        None
                    }
                },
            };

            if found.is_none() {
                debug!(slide = slide.index, %keyword, "no image");
            } else {
                annotated += 1;
            }
            slide.image_url = found;
        }

        annotated
    }
}
