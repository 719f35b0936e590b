//! The harvest coordinator: first-pass search plus bounded supplementary rounds.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use briefwright_shared::{CandidateSource, HarvestConfig, HarvestRoundRecord, Result, ThresholdFailure};
use briefwright_vetting::{SourceVetter, VetMode, VettedSet, Verdict};

use crate::provider::SearchProvider;
use crate::rounds::{RoundDescriptor, RoundSource, standard_rounds};
use crate::seeds::SeedCatalog;
use crate::topic::{Topic, initial_queries};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Runtime knobs for one coordinator.
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Vetted-source count a rigorous task must reach.
    pub min_required: usize,
    /// Hits kept per query.
    pub results_per_query: usize,
    /// Concurrent search requests within one round.
    pub concurrency: usize,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::from(&HarvestConfig::default())
    }
}

impl From<&HarvestConfig> for HarvestOptions {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            min_required: config.min_required,
            results_per_query: config.results_per_query,
            concurrency: config.concurrency.max(1),
        }
    }
}

/// Round log and final count of a successful harvest.
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub records: Vec<HarvestRoundRecord>,
    pub achieved: usize,
    pub required: usize,
}

// ---------------------------------------------------------------------------
// HarvestCoordinator
// ---------------------------------------------------------------------------

pub struct HarvestCoordinator {
    search: Arc<dyn SearchProvider>,
    seeds: SeedCatalog,
    rounds: Vec<RoundDescriptor>,
    options: HarvestOptions,
}

impl HarvestCoordinator {
    /// A coordinator using the built-in seed catalog and the standard rounds.
    pub fn new(search: Arc<dyn SearchProvider>, options: HarvestOptions) -> Self {
        Self {
            search,
            seeds: SeedCatalog::builtin(),
            rounds: standard_rounds(),
            options,
        }
    }

    pub fn with_seeds(mut self, seeds: SeedCatalog) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn options(&self) -> &HarvestOptions {
        &self.options
    }

    /// Search the initial query set and vet every hit into `vetted`.
    ///
    /// Not a harvest round: nothing is logged in the round record.
    /// Returns the number of newly admitted sources.
    #[instrument(skip_all, fields(topic = %topic.phrase()))]
    pub async fn first_pass(
        &self,
        vetter: &SourceVetter,
        topic: &Topic,
        vetted: &mut VettedSet,
    ) -> usize {
        let candidates = self.run_queries(&initial_queries(topic)).await;
        let added = offer_all(vetter, vetted, &candidates, VetMode::Standard);
        info!(added, cumulative = vetted.len(), "first pass complete");
        added
    }

    /// Run rounds in order until `vetted` reaches the minimum.
    ///
    /// Non-rigorous tasks run no rounds and never fail. A rigorous task
    /// still short after the last round yields a [`ThresholdFailure`].
    #[instrument(skip_all, fields(topic = %topic.phrase(), rigorous = rigorous))]
    pub async fn harvest(
        &self,
        vetter: &SourceVetter,
        topic: &Topic,
        vetted: &mut VettedSet,
        rigorous: bool,
    ) -> Result<HarvestOutcome> {
        let required = self.options.min_required;
        let mut records: Vec<HarvestRoundRecord> = Vec::new();

        if !rigorous {
            debug!(achieved = vetted.len(), "sourcing not rigorous, skipping rounds");
            return Ok(HarvestOutcome {
                records,
                achieved: vetted.len(),
                required,
            });
        }

        for round in &self.rounds {
            if vetted.len() >= required {
                break;
            }

            let (queries, candidates) = match round.source {
                RoundSource::Seeds => {
                    let seeds = self.seeds.matching(topic);
                    let urls = seeds.iter().map(|s| s.url.clone()).collect();
                    (urls, seeds)
                }
                RoundSource::Queries(build) => {
                    let queries = build(topic);
                    let candidates = self.run_queries(&queries).await;
                    (queries, candidates)
                }
            };

            let added = offer_all(vetter, vetted, &candidates, round.mode);
            info!(
                round = %round.tag,
                added,
                cumulative = vetted.len(),
                "harvest round complete"
            );

            records.push(HarvestRoundRecord {
                round: round.tag,
                queries,
                added_count: added,
                cumulative_vetted_count: vetted.len(),
            });
        }

        if vetted.len() < required {
            let failure = ThresholdFailure {
                achieved: vetted.len(),
                required,
                rounds_completed: records.iter().map(|r| r.round).collect(),
            };
            warn!(error = %failure, "harvest exhausted");
            return Err(failure.into());
        }

        Ok(HarvestOutcome {
            records,
            achieved: vetted.len(),
            required,
        })
    }

    /// Issue queries with bounded parallelism; results keep query order.
    async fn run_queries(&self, queries: &[String]) -> Vec<CandidateSource> {
        let limit = self.options.results_per_query;
        let batches: Vec<Vec<CandidateSource>> = stream::iter(queries)
            .map(|query| async move {
                match self.search.search(query).await {
                    Ok(mut hits) => {
                        if hits.is_empty() {
                            debug!(%query, "search returned nothing");
                        }
                        hits.truncate(limit);
                        hits
                    }
                    Err(e) => {
                        warn!(%query, error = %e, "search failed");
                        Vec::new()
                    }
                }
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        batches.into_iter().flatten().collect()
    }
}

fn offer_all(
    vetter: &SourceVetter,
    vetted: &mut VettedSet,
    candidates: &[CandidateSource],
    mode: VetMode,
) -> usize {
    candidates
        .iter()
        .filter(|candidate| vetted.offer(vetter, candidate, mode) == Verdict::Admitted)
        .count()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use briefwright_shared::{BriefwrightError, RoundTag};

    use super::*;
    use crate::rounds::{extension_queries, scholar_queries, topical_queries};
    use crate::synonyms::synonym_queries;

    /// Answers from a fixed query → hits table and records every query.
    #[derive(Default)]
    struct TableSearch {
        table: HashMap<String, Vec<CandidateSource>>,
        calls: Mutex<Vec<String>>,
    }

    impl TableSearch {
        fn with(mut self, query: &str, urls: &[&str]) -> Self {
            let hits = urls
                .iter()
                .map(|u| CandidateSource::new(*u, "Ant development", "Life cycle of the ant"))
                .collect();
            self.table.insert(query.to_string(), hits);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for TableSearch {
        async fn search(&self, query: &str) -> Result<Vec<CandidateSource>> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(self.table.get(query).cloned().unwrap_or_default())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, query: &str) -> Result<Vec<CandidateSource>> {
            Err(BriefwrightError::Network(format!("{query}: timed out")))
        }
    }

    fn options(min_required: usize) -> HarvestOptions {
        HarvestOptions {
            min_required,
            ..HarvestOptions::default()
        }
    }

    #[tokio::test]
    async fn empty_search_runs_every_round_once_then_fails() {
        let search = Arc::new(TableSearch::default());
        let coordinator =
            HarvestCoordinator::new(search.clone(), options(10)).with_seeds(SeedCatalog::empty());
        let topic = Topic::from_prompt("widget pricing report");
        let vetter = SourceVetter::default();
        let mut vetted = VettedSet::new();

        let err = coordinator
            .harvest(&vetter, &topic, &mut vetted, true)
            .await
            .unwrap_err();

        let failure = err.as_threshold().expect("threshold failure");
        assert_eq!(failure.achieved, 0);
        assert_eq!(failure.required, 10);
        assert_eq!(failure.rounds_completed, RoundTag::ALL.to_vec());

        let message = err.to_string();
        for tag in RoundTag::ALL {
            assert!(message.contains(tag.as_str()), "{message}");
        }

        let expected_calls = topical_queries(&topic).len()
            + scholar_queries(&topic).len()
            + extension_queries(&topic).len()
            + synonym_queries(&topic).len();
        assert_eq!(search.calls().len(), expected_calls);
    }

    #[tokio::test]
    async fn ant_report_falls_short_after_all_rounds() {
        let search = Arc::new(TableSearch::default().with(
            "ant life cycle",
            &[
                "https://entomology.ucdavis.edu/ants",
                "https://www.ento.ncsu.edu/ant-life",
                "https://bugs.umn.edu/ant-stages",
            ],
        ));
        let coordinator = HarvestCoordinator::new(search, options(10));
        let topic = Topic::from_prompt("ant life cycle report");
        let vetter = SourceVetter::default().with_topic_terms(topic.terms());
        let mut vetted = VettedSet::new();

        assert_eq!(coordinator.first_pass(&vetter, &topic, &mut vetted).await, 3);

        let err = coordinator
            .harvest(&vetter, &topic, &mut vetted, true)
            .await
            .unwrap_err();
        let failure = err.as_threshold().expect("threshold failure");
        // three first-pass hits plus five curated ant references
        assert_eq!(failure.achieved, 8);
        assert_eq!(failure.required, 10);
        assert_eq!(failure.rounds_completed, RoundTag::ALL.to_vec());
    }

    #[tokio::test]
    async fn ant_report_stops_once_threshold_is_met() {
        let search = Arc::new(
            TableSearch::default()
                .with(
                    "ant life cycle",
                    &[
                        "https://entomology.ucdavis.edu/ants",
                        "https://www.ento.ncsu.edu/ant-life",
                        "https://bugs.umn.edu/ant-stages",
                    ],
                )
                .with(
                    "ant life cycle research",
                    &["https://www.usda.gov/ants", "https://www.fws.gov/ants"],
                ),
        );
        let coordinator = HarvestCoordinator::new(search.clone(), options(10));
        let topic = Topic::from_prompt("ant life cycle report");
        let vetter = SourceVetter::default().with_topic_terms(topic.terms());
        let mut vetted = VettedSet::new();

        coordinator.first_pass(&vetter, &topic, &mut vetted).await;
        let outcome = coordinator
            .harvest(&vetter, &topic, &mut vetted, true)
            .await
            .unwrap();

        assert_eq!(outcome.achieved, 10);
        let rounds: Vec<RoundTag> = outcome.records.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![RoundTag::Seeds, RoundTag::Topical]);
        assert_eq!(outcome.records[0].added_count, 5);
        assert_eq!(outcome.records[0].cumulative_vetted_count, 8);
        assert_eq!(outcome.records[1].added_count, 2);
        assert!(!search.calls().iter().any(|q| q.contains("site:")));
    }

    #[tokio::test]
    async fn no_rounds_when_already_sufficient() {
        let search = Arc::new(TableSearch::default());
        let coordinator = HarvestCoordinator::new(search.clone(), options(1));
        let topic = Topic::from_prompt("ant report");
        let vetter = SourceVetter::default();
        let mut vetted = VettedSet::new();
        vetted.offer(
            &vetter,
            &CandidateSource::new("https://www.nasa.gov/ants", "", ""),
            VetMode::Standard,
        );

        let outcome = coordinator
            .harvest(&vetter, &topic, &mut vetted, true)
            .await
            .unwrap();
        assert!(outcome.records.is_empty());
        assert!(search.calls().is_empty());
    }

    #[tokio::test]
    async fn non_rigorous_tasks_never_fail() {
        let coordinator = HarvestCoordinator::new(Arc::new(TableSearch::default()), options(10));
        let topic = Topic::from_prompt("ant facts for kids");
        let mut vetted = VettedSet::new();

        let outcome = coordinator
            .harvest(&SourceVetter::default(), &topic, &mut vetted, false)
            .await
            .unwrap();
        assert_eq!(outcome.achieved, 0);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn search_errors_degrade_to_empty_rounds() {
        let coordinator = HarvestCoordinator::new(Arc::new(FailingSearch), options(3))
            .with_seeds(SeedCatalog::empty());
        let topic = Topic::from_prompt("volcano report");
        let mut vetted = VettedSet::new();
        let vetter = SourceVetter::default();

        assert_eq!(coordinator.first_pass(&vetter, &topic, &mut vetted).await, 0);
        let err = coordinator
            .harvest(&vetter, &topic, &mut vetted, true)
            .await
            .unwrap_err();
        assert_eq!(err.as_threshold().map(|f| f.rounds_completed.len()), Some(5));
    }
}
