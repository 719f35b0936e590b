//! URL canonicalization for source deduplication.

use tracing::debug;
use url::Url;

/// Query parameters that only carry tracking/referral state.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "yclid", "igshid", "mc_cid", "mc_eid", "_hsenc",
    "_hsmi", "ref", "ref_src", "referrer", "spm",
];

/// Canonicalize a URL for deduplication.
///
/// Strips embedded whitespace and line breaks, drops the fragment, removes
/// tracking parameters (`utm_*` and friends) and trailing path slashes.
/// Scheme and host come out lowercased. Unparseable input is returned
/// trimmed instead of failing. Idempotent.
pub fn normalize_url(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let Ok(mut parsed) = Url::parse(&compact) else {
        let trimmed = raw.trim();
        debug!(url = %trimmed, "unparseable URL kept as-is");
        return trimmed.to_string();
    };

    parsed.set_fragment(None);

    if parsed.query().is_some() {
        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    if !parsed.cannot_be_a_base() {
        let path = parsed.path().to_string();
        if path.len() > 1 && path.ends_with('/') {
            parsed.set_path(path.trim_end_matches('/'));
        }
    }

    parsed.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}
