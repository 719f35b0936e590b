//! End-to-end build: prompt → vetted sources → outline → slides → gated charts.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use briefwright_charts::{ChartGate, HttpTabularSource, TabularSource, gate_document};
use briefwright_content::{NormalizerOptions, normalize_document_traced};
use briefwright_harvest::{
    HarvestCoordinator, HarvestOptions, HttpPageFetcher, HttpSearchProvider, PageTextFetcher,
    SearchProvider, Topic,
};
use briefwright_shared::{
    AppConfig, CandidateSource, ContentPackage, Result, SlideUnit, SourcingSummary, TaskId,
    search_api_key,
};
use briefwright_vetting::{SourceVetter, VetMode, Verdict, VettedSet, VettingPolicy};

use crate::imagery::{HttpImageProvider, ImageAnnotator, ImageProvider};
use crate::intent::is_rigorous;
use crate::outline::OutlineGenerator;
use crate::research::{ContextOptions, synthesize_context};
use crate::seeding::seed_charts;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// External services one build talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub search: Arc<dyn SearchProvider>,
    pub pages: Arc<dyn PageTextFetcher>,
    pub outline: Arc<dyn OutlineGenerator>,
    pub tabular: Arc<dyn TabularSource>,
    /// `None` skips image annotation.
    pub images: Option<Arc<dyn ImageProvider>>,
}

impl Collaborators {
    /// HTTP collaborators built from configuration, around a caller-supplied
    /// outline generator. Without a search endpoint every search comes back
    /// empty.
    pub fn from_config(config: &AppConfig, outline: Arc<dyn OutlineGenerator>) -> Result<Self> {
        let timeout = config.harvest.timeout_secs;

        let search: Arc<dyn SearchProvider> = match &config.search.endpoint {
            Some(endpoint) => Arc::new(
                HttpSearchProvider::new(endpoint, timeout)?
                    .with_api_key(search_api_key(config))
                    .with_max_results(config.harvest.results_per_query),
            ),
            None => Arc::new(OfflineSearch),
        };

        let images: Option<Arc<dyn ImageProvider>> = match &config.images.endpoint {
            Some(endpoint) => Some(Arc::new(HttpImageProvider::new(endpoint, timeout)?)),
            None => None,
        };

        Ok(Self {
            search,
            pages: Arc::new(HttpPageFetcher::new(timeout)?),
            outline,
            tabular: Arc::new(HttpTabularSource::new(timeout)?),
            images,
        })
    }
}

/// Stand-in search backend when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSearch;

#[async_trait]
impl SearchProvider for OfflineSearch {
    async fn search(&self, query: &str) -> Result<Vec<CandidateSource>> {
        debug!(%query, "no search endpoint configured");
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called whenever the vetted-source count changes stage.
    fn sources(&self, achieved: usize, required: usize);
    /// Called when the package is complete.
    fn done(&self, package: &ContentPackage);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn sources(&self, _achieved: usize, _required: usize) {}
    fn done(&self, _package: &ContentPackage) {}
}

// ---------------------------------------------------------------------------
// build_package
// ---------------------------------------------------------------------------

/// Run the full build for one prompt.
///
/// 1. Classify the prompt and derive its topic
/// 2. First-pass search, vetted into a task-scoped set
/// 3. Harvest rounds (rigorous tasks only); a shortfall aborts here
/// 4. Research context from the leading vetted sources
/// 5. Outline generation; cited URLs are vetted into the set
/// 6. Slide normalization and chart seeding
/// 7. Chart gating, then image annotation
#[instrument(skip_all, fields(prompt = %prompt))]
pub async fn build_package(
    prompt: &str,
    config: &AppConfig,
    collaborators: &Collaborators,
    progress: &dyn ProgressReporter,
) -> Result<ContentPackage> {
    let start = Instant::now();
    let task_id = TaskId::new();

    // --- Phase 1: Classification ---
    progress.phase("Classifying request");
    let topic = Topic::from_prompt(prompt);
    let rigorous = is_rigorous(prompt, &config.harvest.rigorous_intents);
    info!(%task_id, topic = %topic.phrase(), rigorous, "starting build");

    let vetter =
        SourceVetter::new(VettingPolicy::from(&config.vetting)).with_topic_terms(topic.terms());
    let coordinator = HarvestCoordinator::new(
        collaborators.search.clone(),
        HarvestOptions::from(&config.harvest),
    );
    let required = coordinator.options().min_required;
    let mut vetted = VettedSet::new();

    // --- Phase 2: First pass ---
    progress.phase("Searching");
    coordinator.first_pass(&vetter, &topic, &mut vetted).await;
    progress.sources(vetted.len(), required);

    // --- Phase 3: Harvest rounds ---
    progress.phase("Harvesting sources");
    let outcome = coordinator
        .harvest(&vetter, &topic, &mut vetted, rigorous)
        .await?;
    progress.sources(outcome.achieved, required);

    // --- Phase 4: Research context ---
    progress.phase("Reading sources");
    let context_options = ContextOptions {
        concurrency: config.harvest.concurrency,
        ..ContextOptions::from(&config.content)
    };
    let context =
        synthesize_context(collaborators.pages.as_ref(), vetted.sources(), &context_options).await;

    // --- Phase 5: Outline ---
    progress.phase("Generating outline");
    let outline = collaborators.outline.generate(prompt, &context).await?;

    let cited = outline
        .sources
        .iter()
        .filter(|url| {
            let candidate = CandidateSource::new(url.as_str(), "", "");
            vetted.offer(&vetter, &candidate, VetMode::Standard) == Verdict::Admitted
        })
        .count();
    debug!(cited, listed = outline.sources.len(), "outline citations vetted");

    // --- Phase 6: Slides and chart candidates ---
    progress.phase("Normalizing content");
    let mut traced =
        normalize_document_traced(&outline.slides, &NormalizerOptions::from(&config.content));

    progress.phase("Seeding charts");
    seed_charts(
        &outline.slides,
        &mut traced,
        collaborators.tabular.as_ref(),
        config.charts.max_pairs,
    )
    .await;
    let mut slides: Vec<SlideUnit> = traced.into_iter().map(|(_, unit)| unit).collect();

    // --- Phase 7: Gating and images ---
    progress.phase("Gating charts");
    let charts = gate_document(&ChartGate::from(&config.charts), &mut slides);

    if let Some(images) = &collaborators.images {
        progress.phase("Annotating images");
        let mut annotator = ImageAnnotator::new(images.clone(), config.images.cache_capacity);
        annotator.annotate(&mut slides).await;
    }

    let title = match outline.title.trim() {
        "" => topic.phrase().to_string(),
        t => t.to_string(),
    };
    let package = ContentPackage {
        task_id,
        title,
        created_at: chrono::Utc::now(),
        slides,
        charts,
        sources: vetted.into_sources(),
        harvest_log: outcome.records,
        sourcing: SourcingSummary {
            achieved: outcome.achieved,
            required,
            cited,
            rigorous,
        },
    };

    progress.done(&package);

    info!(
        task_id = %package.task_id,
        slides = package.slides.len(),
        charts = package.charts.len(),
        sources = package.sources.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "build complete"
    );

    Ok(package)
}
