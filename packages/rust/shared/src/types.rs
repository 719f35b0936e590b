//! Core domain types shared by every briefwright crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TaskId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one content-build task (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new time-sortable task identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A raw search hit, exactly as a search collaborator returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSource {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

impl CandidateSource {
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// How a vetted source got past the vetter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    /// Matched an allowlist entry.
    Allowlisted,
    /// Scored at or above the policy minimum.
    Scored,
    /// Curated seed reference admitted without scoring.
    Curated,
}

/// A candidate that passed vetting. `url` is always the normalized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VettedSource {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Policy score at admission time, in `[0, 1]`.
    pub score: f64,
    pub admission: Admission,
}

// ---------------------------------------------------------------------------
// Harvest rounds
// ---------------------------------------------------------------------------

/// Identifies one of the fixed, ordered harvest rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoundTag {
    #[serde(rename = "R0_seeds")]
    Seeds,
    #[serde(rename = "R1_topical")]
    Topical,
    #[serde(rename = "R2_scholar")]
    Scholar,
    #[serde(rename = "R3_extension")]
    Extension,
    #[serde(rename = "R4_synonyms")]
    Synonyms,
}

impl RoundTag {
    /// All rounds in execution order.
    pub const ALL: [RoundTag; 5] = [
        RoundTag::Seeds,
        RoundTag::Topical,
        RoundTag::Scholar,
        RoundTag::Extension,
        RoundTag::Synonyms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeds => "R0_seeds",
            Self::Topical => "R1_topical",
            Self::Scholar => "R2_scholar",
            Self::Extension => "R3_extension",
            Self::Synonyms => "R4_synonyms",
        }
    }
}

impl std::fmt::Display for RoundTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only log entry for one executed harvest round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestRoundRecord {
    pub round: RoundTag,
    /// Queries issued (seed URLs for R0).
    pub queries: Vec<String>,
    /// Newly vetted sources contributed by this round.
    pub added_count: usize,
    /// Vetted-set size after the round.
    pub cumulative_vetted_count: usize,
}

// ---------------------------------------------------------------------------
// Outline (external collaborator output)
// ---------------------------------------------------------------------------

/// Outline returned by the external outline generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    #[serde(default)]
    pub slides: Vec<RawSlide>,
    /// URLs the generator cited.
    #[serde(default)]
    pub sources: Vec<String>,
}

/// One unnormalized slide as produced by the outline generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSlide {
    #[serde(default)]
    pub title: String,
    /// Body prose; may carry markup and boilerplate.
    #[serde(default, alias = "content")]
    pub body: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Chart-like object in any of the accepted raw shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<serde_json::Value>,
    /// Remote CSV/JSON endpoint holding label/value rows for this slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Slide units and charts
// ---------------------------------------------------------------------------

/// A normalized slide. Titles are unique within a document and `bullets`
/// always holds between 3 and 6 entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideUnit {
    pub index: usize,
    pub title: String,
    /// First one or two body sentences, at most 160 characters.
    pub subtitle: String,
    /// Full cleaned body prose.
    pub notes: String,
    pub bullets: Vec<String>,
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// True for padding units appended to reach the minimum slide count.
    #[serde(default)]
    pub is_filler: bool,
}

/// A label/value pair mined from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericPair {
    /// At most 30 characters.
    pub label: String,
    pub value: f64,
    pub is_percentage: bool,
}

/// Supported categorical chart kinds. Anything else is coerced to the nearest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Column,
    Pie,
    Doughnut,
}

/// Canonical categorical chart. `labels.len() == values.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Scale- and order-invariant dedup fingerprint.
    pub signature: String,
}

// ---------------------------------------------------------------------------
// ContentPackage
// ---------------------------------------------------------------------------

/// Sourcing outcome attached to every package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcingSummary {
    /// Vetted sources when the threshold was decided.
    pub achieved: usize,
    pub required: usize,
    /// Outline citations admitted after the threshold decision.
    #[serde(default)]
    pub cited: usize,
    /// Whether the task was classified as requiring rigorous sourcing.
    pub rigorous: bool,
}

/// The renderer-agnostic output of one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPackage {
    pub task_id: TaskId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub slides: Vec<SlideUnit>,
    /// Admitted charts, in slide order.
    pub charts: Vec<ChartSpec>,
    pub sources: Vec<VettedSource>,
    pub harvest_log: Vec<HarvestRoundRecord>,
    pub sourcing: SourcingSummary,
}
