//! Research harvesting: search collaborators, topic queries and the round-based
//! [`HarvestCoordinator`].
//!
//! A task first runs [`HarvestCoordinator::first_pass`] over its initial
//! queries. If the task needs rigorous sourcing and the vetted set is still
//! short, [`HarvestCoordinator::harvest`] walks the fixed rounds
//! (`R0_seeds` → `R4_synonyms`), stopping as soon as the minimum is met and
//! failing closed with a `ThresholdFailure` when every round is spent.

mod coordinator;
mod provider;
mod rounds;
mod seeds;
mod synonyms;
mod topic;

pub use coordinator::{HarvestCoordinator, HarvestOptions, HarvestOutcome};
pub use provider::{
    HttpPageFetcher, HttpSearchProvider, PageTextFetcher, SearchProvider, visible_text,
};
pub use rounds::{
    RoundDescriptor, RoundSource, extension_queries, scholar_queries, standard_rounds,
    topical_queries,
};
pub use seeds::{SeedCatalog, SeedReference};
pub use synonyms::{related_terms, synonym_queries};
pub use topic::{Topic, initial_queries};
