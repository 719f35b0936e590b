//! Application configuration for briefwright.
//!
//! User config lives at `~/.briefwright/briefwright.toml`.
//! CLI flags override config file values, which override defaults.
//! The vetting defaults double as the built-in allow/block/authority tables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BriefwrightError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "briefwright.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".briefwright";

// ---------------------------------------------------------------------------
// Config structs (matching briefwright.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vetting: VettingConfig,

    #[serde(default)]
    pub harvest: HarvestConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub charts: ChartsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub images: ImagesConfig,
}

/// One authority bonus rule: URLs containing `pattern` gain `bonus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityRule {
    pub pattern: String,
    pub bonus: f64,
}

impl AuthorityRule {
    fn new(pattern: &str, bonus: f64) -> Self {
        Self {
            pattern: pattern.into(),
            bonus,
        }
    }
}

/// `[vetting]` section: static source admission policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettingConfig {
    /// Substrings that admit a URL outright (unless blocklisted).
    #[serde(default = "default_allowlist")]
    pub allowlist: Vec<String>,

    /// Substrings that reject a URL regardless of anything else.
    #[serde(default = "default_blocklist")]
    pub blocklist: Vec<String>,

    /// Additive authority bonuses.
    #[serde(default = "default_authority")]
    pub authority: Vec<AuthorityRule>,

    /// Title/snippet keywords that earn the topical bonus.
    #[serde(default = "default_topical_keywords")]
    pub topical_keywords: Vec<String>,

    #[serde(default = "default_min_score")]
    pub min_score: f64,

    #[serde(default = "default_topical_bonus")]
    pub topical_bonus: f64,

    #[serde(default = "default_pdf_bonus")]
    pub pdf_bonus: f64,
}

impl Default for VettingConfig {
    fn default() -> Self {
        Self {
            allowlist: default_allowlist(),
            blocklist: default_blocklist(),
            authority: default_authority(),
            topical_keywords: default_topical_keywords(),
            min_score: default_min_score(),
            topical_bonus: default_topical_bonus(),
            pdf_bonus: default_pdf_bonus(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_allowlist() -> Vec<String> {
    strings(&[
        "ncbi.nlm.nih.gov",
        "doi.org/",
        "britannica.com",
        "si.edu",
        "nasa.gov",
        "who.int",
        "nature.com",
        "noaa.gov",
        "usgs.gov",
        "extension.",
    ])
}

fn default_blocklist() -> Vec<String> {
    strings(&[
        "pinterest.",
        "quora.com",
        "reddit.com",
        "facebook.com",
        "instagram.com",
        "tiktok.com",
        "twitter.com",
        "youtube.com",
        "answers.com",
        "coursehero.com",
        "chegg.com",
        "studocu.com",
        "scribd.com",
        "slideshare.net",
        "brainly.",
        "wikihow.com",
        "amazon.",
        "ebay.",
        "etsy.com",
    ])
}

fn default_authority() -> Vec<AuthorityRule> {
    vec![
        // Academic
        AuthorityRule::new(".edu", 0.6),
        AuthorityRule::new(".ac.uk", 0.55),
        AuthorityRule::new("arxiv.org", 0.5),
        AuthorityRule::new("jstor.org", 0.55),
        AuthorityRule::new("sciencedirect.com", 0.5),
        AuthorityRule::new("springer.com", 0.5),
        AuthorityRule::new("wiley.com", 0.5),
        // Government / intergovernmental
        AuthorityRule::new(".gov", 0.6),
        AuthorityRule::new("who.int", 0.6),
        AuthorityRule::new("un.org", 0.5),
        // Museums
        AuthorityRule::new("museum", 0.5),
        AuthorityRule::new("nhm.ac.uk", 0.5),
        // Peer-review aggregators
        AuthorityRule::new("doi.org", 0.6),
        AuthorityRule::new("pubmed", 0.55),
        AuthorityRule::new("scholar.google", 0.4),
        AuthorityRule::new("researchgate.net", 0.35),
        AuthorityRule::new("semanticscholar.org", 0.45),
        // Encyclopedias / media
        AuthorityRule::new("britannica.com", 0.5),
        AuthorityRule::new("nationalgeographic.com", 0.45),
        AuthorityRule::new("bbc.co.uk", 0.35),
        AuthorityRule::new("reuters.com", 0.35),
        AuthorityRule::new("apnews.com", 0.35),
        AuthorityRule::new(".org", 0.15),
    ]
}

fn default_topical_keywords() -> Vec<String> {
    strings(&[
        "study",
        "research",
        "journal",
        "analysis",
        "survey",
        "review",
        "report",
        "data",
        "university",
        "published",
    ])
}

fn default_min_score() -> f64 {
    0.55
}
fn default_topical_bonus() -> f64 {
    0.10
}
fn default_pdf_bonus() -> f64 {
    0.05
}

/// `[harvest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Minimum vetted sources for a rigorous-sourcing task.
    #[serde(default = "default_min_required")]
    pub min_required: usize,

    /// Results requested per search query.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Concurrent outbound requests within one round.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Prompt phrases that mark a task as requiring rigorous sourcing.
    #[serde(default = "default_rigorous_intents")]
    pub rigorous_intents: Vec<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            min_required: default_min_required(),
            results_per_query: default_results_per_query(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            rigorous_intents: default_rigorous_intents(),
        }
    }
}

fn default_min_required() -> usize {
    10
}
fn default_results_per_query() -> usize {
    8
}
fn default_concurrency() -> usize {
    3
}
fn default_timeout_secs() -> u64 {
    12
}
fn default_rigorous_intents() -> Vec<String> {
    strings(&[
        "report",
        "analysis",
        "research",
        "study",
        "whitepaper",
        "literature review",
        "case study",
        "evaluation",
    ])
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_min_slides")]
    pub min_slides: usize,

    #[serde(default = "default_subtitle_max_chars")]
    pub subtitle_max_chars: usize,

    #[serde(default = "default_bullet_max_chars")]
    pub bullet_max_chars: usize,

    #[serde(default = "default_page_max_chars")]
    pub page_max_chars: usize,

    /// How many vetted sources feed the research context.
    #[serde(default = "default_context_sources")]
    pub context_sources: usize,

    #[serde(default = "default_context_chars_per_source")]
    pub context_chars_per_source: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_slides: default_min_slides(),
            subtitle_max_chars: default_subtitle_max_chars(),
            bullet_max_chars: default_bullet_max_chars(),
            page_max_chars: default_page_max_chars(),
            context_sources: default_context_sources(),
            context_chars_per_source: default_context_chars_per_source(),
        }
    }
}

fn default_min_slides() -> usize {
    10
}
fn default_subtitle_max_chars() -> usize {
    160
}
fn default_bullet_max_chars() -> usize {
    120
}
fn default_page_max_chars() -> usize {
    750
}
fn default_context_sources() -> usize {
    6
}
fn default_context_chars_per_source() -> usize {
    1500
}

/// `[charts]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Admission cap per document.
    #[serde(default = "default_max_charts")]
    pub max_charts: usize,

    /// Minimum two-category split imbalance, in percentage points.
    #[serde(default = "default_min_imbalance_pct")]
    pub min_imbalance_pct: f64,

    /// Cap on numeric pairs mined per call.
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,

    /// Categories in a keyword-frequency fallback chart.
    #[serde(default = "default_fallback_keywords")]
    pub fallback_keywords: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            max_charts: default_max_charts(),
            min_imbalance_pct: default_min_imbalance_pct(),
            max_pairs: default_max_pairs(),
            fallback_keywords: default_fallback_keywords(),
        }
    }
}

fn default_max_charts() -> usize {
    4
}
fn default_min_imbalance_pct() -> f64 {
    12.0
}
fn default_max_pairs() -> usize {
    8
}
fn default_fallback_keywords() -> usize {
    5
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// JSON search endpoint; `None` disables live search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_search_key_env(),
        }
    }
}

fn default_search_key_env() -> String {
    "BRIEFWRIGHT_SEARCH_KEY".into()
}

/// `[images]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Keyword lookups memoized per task.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    64
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.briefwright/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BriefwrightError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.briefwright/briefwright.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BriefwrightError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BriefwrightError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_file_path()?)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| BriefwrightError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BriefwrightError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| BriefwrightError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

/// Reject values that would make the pipeline meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if !(0.0..=1.0).contains(&config.vetting.min_score) {
        return Err(BriefwrightError::config(format!(
            "vetting.min_score must be within [0, 1], got {}",
            config.vetting.min_score
        )));
    }
    if config.harvest.concurrency == 0 {
        return Err(BriefwrightError::config("harvest.concurrency must be at least 1"));
    }
    if config.harvest.min_required == 0 {
        return Err(BriefwrightError::config("harvest.min_required must be at least 1"));
    }
    if config.content.bullet_max_chars == 0 || config.content.page_max_chars == 0 {
        return Err(BriefwrightError::config(
            "content character limits must be positive",
        ));
    }
    Ok(())
}

/// Read the search API key from the env var named in the config, if set.
pub fn search_api_key(config: &AppConfig) -> Option<String> {
    std::env::var(&config.search.api_key_env)
        .ok()
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("min_score"));
        assert!(toml_str.contains("BRIEFWRIGHT_SEARCH_KEY"));
        assert!(toml_str.contains("pinterest."));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.harvest.min_required, 10);
        assert_eq!(parsed.charts.max_pairs, 8);
        assert_eq!(parsed.vetting.authority, config.vetting.authority);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[vetting]
blocklist = ["example-spam.com"]

[harvest]
min_required = 4

[[vetting.authority]]
pattern = ".edu"
bonus = 0.7
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.vetting.blocklist, vec!["example-spam.com".to_string()]);
        assert_eq!(config.vetting.authority.len(), 1);
        assert!(!config.vetting.allowlist.is_empty());
        assert_eq!(config.harvest.min_required, 4);
        assert_eq!(config.harvest.concurrency, 3);
        assert_eq!(config.content.min_slides, 10);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.vetting.min_score = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.harvest.concurrency = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.harvest.min_required = 0;
        assert!(validate_config(&config).is_err());

        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("bw-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("briefwright.toml");
        std::fs::write(&path, "[charts]\nmax_charts = 2\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.charts.max_charts, 2);
        assert_eq!(config.charts.min_imbalance_pct, 12.0);

        std::fs::write(&path, "[charts\nbroken").expect("write");
        assert!(load_config_from(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn init_config_at_writes_loadable_defaults() {
        let dir = std::env::temp_dir().join(format!("bw-init-test-{}", uuid::Uuid::now_v7()));
        let path = dir.join("nested").join("custom.toml");

        let written = init_config_at(&path).expect("init");
        assert_eq!(written, path);
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.harvest.min_required, 10);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_search_key_is_none() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.search.api_key_env = "BW_TEST_NONEXISTENT_KEY_12345".into();
        assert!(search_api_key(&config).is_none());
    }
}
