//! Source vetting: scoring and admission of search results.
//!
//! A [`SourceVetter`] is a pure function of its [`VettingPolicy`] (plus an
//! optional set of task topic terms). The blocklist always wins, the
//! allowlist short-circuits scoring, and everything else must reach the
//! policy's minimum score. Admitted sources are collected in a task-scoped
//! [`VettedSet`] keyed by [`normalize_url`].

mod normalize;
mod policy;

use std::collections::HashSet;

use tracing::{debug, trace};
use url::Url;

use briefwright_shared::{Admission, CandidateSource, VettedSource};

pub use normalize::normalize_url;
pub use policy::VettingPolicy;

// ---------------------------------------------------------------------------
// SourceVetter
// ---------------------------------------------------------------------------

/// Scores and filters candidate sources against a static policy.
#[derive(Debug, Clone)]
pub struct SourceVetter {
    policy: VettingPolicy,
    /// Extra lowercased keywords from the task prompt.
    topic_terms: Vec<String>,
}

impl SourceVetter {
    pub fn new(policy: VettingPolicy) -> Self {
        Self {
            policy,
            topic_terms: Vec::new(),
        }
    }

    /// Add task topic terms; a title or snippet mentioning one earns the topical bonus.
    pub fn with_topic_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.topic_terms.extend(
            terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    pub fn policy(&self) -> &VettingPolicy {
        &self.policy
    }

    /// Score a source in `[0, 1]`. Any blocklisted URL scores exactly 0.
    pub fn score_source(&self, url: &str, title: &str, snippet: &str) -> f64 {
        let lowered = policy_key(url);
        if self.policy.blocked_by(&lowered).is_some() {
            return 0.0;
        }

        let host = Url::parse(&lowered)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        let mut score = self.policy.authority_bonus(&host, &lowered);

        if self.is_topical(title, snippet) {
            score += self.policy.topical_bonus;
        }

        if looks_like_pdf(&lowered) {
            score += self.policy.pdf_bonus;
        }

        score.clamp(0.0, 1.0)
    }

    /// Blocklist ⇒ false; allowlist ⇒ true; else score at or above the minimum.
    pub fn is_vetted(&self, url: &str, title: &str, snippet: &str) -> bool {
        self.decide(url, title, snippet).is_some()
    }

    /// Vet a candidate, producing a normalized [`VettedSource`] on success.
    pub fn vet(&self, candidate: &CandidateSource) -> Option<VettedSource> {
        let url = normalize_url(&candidate.url);
        if url.is_empty() {
            return None;
        }
        let (admission, score) = self.decide(&candidate.url, &candidate.title, &candidate.snippet)?;
        Some(VettedSource {
            url,
            title: candidate.title.trim().to_string(),
            snippet: candidate.snippet.trim().to_string(),
            score,
            admission,
        })
    }

    /// Admit a curated reference unless it is blocklisted.
    pub fn vet_curated(&self, candidate: &CandidateSource) -> Option<VettedSource> {
        let url = normalize_url(&candidate.url);
        if url.is_empty() || self.policy.blocked_by(&policy_key(&url)).is_some() {
            return None;
        }
        Some(VettedSource {
            url,
            title: candidate.title.trim().to_string(),
            snippet: candidate.snippet.trim().to_string(),
            score: self.score_source(&candidate.url, &candidate.title, &candidate.snippet),
            admission: Admission::Curated,
        })
    }

    fn decide(&self, url: &str, title: &str, snippet: &str) -> Option<(Admission, f64)> {
        let lowered = policy_key(url);

        if let Some(pattern) = self.policy.blocked_by(&lowered) {
            trace!(%url, pattern, "blocklisted");
            return None;
        }

        let score = self.score_source(url, title, snippet);

        if let Some(pattern) = self.policy.allowed_by(&lowered) {
            trace!(%url, pattern, "allowlisted");
            return Some((Admission::Allowlisted, score));
        }

        if score >= self.policy.min_score {
            Some((Admission::Scored, score))
        } else {
            trace!(%url, score, min = self.policy.min_score, "below minimum score");
            None
        }
    }

    fn is_topical(&self, title: &str, snippet: &str) -> bool {
        let text = format!("{title} {snippet}").to_lowercase();
        let tokens: HashSet<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(stem)
            .collect();

        self.policy
            .topical_keywords
            .iter()
            .chain(self.topic_terms.iter())
            .any(|kw| {
                if kw.contains(' ') {
                    text.contains(kw.as_str())
                } else {
                    tokens.contains(stem(kw))
                }
            })
    }
}

impl Default for SourceVetter {
    fn default() -> Self {
        Self::new(VettingPolicy::default())
    }
}

/// The form policy patterns are matched against: the normalized URL,
/// lowercased and without whitespace, so a pattern sees exactly what gets stored.
fn policy_key(url: &str) -> String {
    normalize_url(url)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Crude plural folding so "ants" matches "ant".
fn stem(word: &str) -> &str {
    if word.len() > 3 {
        word.strip_suffix('s').unwrap_or(word)
    } else {
        word
    }
}

fn looks_like_pdf(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.ends_with(".pdf") || path.contains("/pdf/") || url.contains("format=pdf")
}

// ---------------------------------------------------------------------------
// VettedSet
// ---------------------------------------------------------------------------

/// How a candidate should be vetted when offered to a [`VettedSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetMode {
    /// Full policy: blocklist, allowlist, then score.
    Standard,
    /// Curated references: only the blocklist applies.
    CuratedBypass,
}

/// Result of offering a candidate to a [`VettedSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The normalized URL was already examined in this task.
    Duplicate,
    Rejected,
    Admitted,
}

/// Task-scoped, insertion-ordered set of vetted sources.
///
/// No two entries share a normalized URL. Every URL ever offered is
/// remembered so a rejected source is not re-vetted in later rounds.
#[derive(Debug, Clone, Default)]
pub struct VettedSet {
    sources: Vec<VettedSource>,
    urls: HashSet<String>,
    examined: HashSet<String>,
}

impl VettedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether a URL (in any equivalent form) has been admitted.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(&normalize_url(url))
    }

    pub fn sources(&self) -> &[VettedSource] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<VettedSource> {
        self.sources
    }

    /// Insert an already vetted source. Returns `false` on a duplicate URL.
    pub fn insert(&mut self, mut source: VettedSource) -> bool {
        source.url = normalize_url(&source.url);
        self.examined.insert(source.url.clone());
        if !self.urls.insert(source.url.clone()) {
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Vet `candidate` unless its normalized URL was seen before, recording the outcome.
    pub fn offer(
        &mut self,
        vetter: &SourceVetter,
        candidate: &CandidateSource,
        mode: VetMode,
    ) -> Verdict {
        let normalized = normalize_url(&candidate.url);
        if !self.examined.insert(normalized.clone()) {
            return Verdict::Duplicate;
        }

        let vetted = match mode {
            VetMode::Standard => vetter.vet(candidate),
            VetMode::CuratedBypass => vetter.vet_curated(candidate),
        };

        match vetted {
            Some(source) => {
                if self.insert(source) {
                    Verdict::Admitted
                } else {
                    Verdict::Duplicate
                }
            }
            None => {
                debug!(url = %normalized, "candidate rejected");
                Verdict::Rejected
            }
        }
    }
}
