//! Immutable admission policy tables, injected into the vetter at construction.

use briefwright_shared::{AuthorityRule, VettingConfig};

/// Static allow/block/authority policy used by [`crate::SourceVetter`].
#[derive(Debug, Clone)]
pub struct VettingPolicy {
    /// Lowercased substrings that admit a URL outright.
    pub allowlist: Vec<String>,
    /// Lowercased substrings that reject a URL outright.
    pub blocklist: Vec<String>,
    pub authority: Vec<AuthorityRule>,
    /// Lowercased keywords that earn the topical bonus.
    pub topical_keywords: Vec<String>,
    pub min_score: f64,
    pub topical_bonus: f64,
    pub pdf_bonus: f64,
}

impl From<&VettingConfig> for VettingPolicy {
    fn from(config: &VettingConfig) -> Self {
        Self {
            allowlist: lowercase_all(&config.allowlist),
            blocklist: lowercase_all(&config.blocklist),
            authority: config
                .authority
                .iter()
                .map(|rule| AuthorityRule {
                    pattern: rule.pattern.trim().to_lowercase(),
                    bonus: rule.bonus,
                })
                .filter(|rule| !rule.pattern.is_empty())
                .collect(),
            topical_keywords: lowercase_all(&config.topical_keywords),
            min_score: config.min_score,
            topical_bonus: config.topical_bonus,
            pdf_bonus: config.pdf_bonus,
        }
    }
}

impl Default for VettingPolicy {
    fn default() -> Self {
        Self::from(&VettingConfig::default())
    }
}

impl VettingPolicy {
    /// First blocklist entry contained in `url` (already lowercased).
    pub(crate) fn blocked_by(&self, url: &str) -> Option<&str> {
        self.blocklist
            .iter()
            .find(|p| url.contains(p.as_str()))
            .map(String::as_str)
    }

    pub(crate) fn allowed_by(&self, url: &str) -> Option<&str> {
        self.allowlist
            .iter()
            .find(|p| url.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Sum of every authority rule matching the URL.
    ///
    /// Dot-prefixed patterns (`.edu`, `.ac.uk`) are domain suffixes and only
    /// match the host; everything else matches anywhere in the URL.
    pub(crate) fn authority_bonus(&self, host: &str, url: &str) -> f64 {
        self.authority
            .iter()
            .filter(|rule| {
                if rule.pattern.starts_with('.') {
                    host.ends_with(rule.pattern.as_str())
                        || host.contains(&format!("{}.", rule.pattern))
                } else {
                    url.contains(rule.pattern.as_str())
                }
            })
            .map(|rule| rule.bonus)
            .sum()
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_lowercases_and_drops_blank_entries() {
        let config = VettingConfig {
            allowlist: vec!["  NCBI.nlm.nih.gov ".into(), "".into()],
            blocklist: vec!["Pinterest.".into()],
            ..VettingConfig::default()
        };
        let policy = VettingPolicy::from(&config);
        assert_eq!(policy.allowlist, vec!["ncbi.nlm.nih.gov".to_string()]);
        assert_eq!(policy.blocked_by("https://www.pinterest.com/x"), Some("pinterest."));
    }

    #[test]
    fn dot_patterns_match_host_suffix_only() {
        let policy = VettingPolicy::default();
        assert!(policy.authority_bonus("www.cornell.edu", "https://www.cornell.edu/x") >= 0.6);
        // ".edu" inside a path or a longer label is not an academic domain
        assert_eq!(
            policy.authority_bonus("education-news.biz", "https://education-news.biz/a.edu"),
            0.0
        );
        // ".edu.au" style second-level domains still count
        assert!(policy.authority_bonus("www.unimelb.edu.au", "https://www.unimelb.edu.au/") > 0.0);
    }
}
