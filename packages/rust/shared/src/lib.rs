//! Shared types, error model, and configuration for briefwright.
//!
//! This crate is the foundation depended on by all other briefwright crates.
//! It provides:
//! - [`BriefwrightError`]: the unified error type, including [`ThresholdFailure`]
//! - Domain types ([`CandidateSource`], [`SlideUnit`], [`ChartSpec`], [`ContentPackage`], ...)
//! - Configuration ([`AppConfig`] and its sections, config loading)
//! - The HTTP client builder and private-target guard ([`build_client`], [`public_target`])

pub mod config;
pub mod error;
pub mod http;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AuthorityRule, ChartsConfig, ContentConfig, HarvestConfig, ImagesConfig,
    SearchConfig, VettingConfig, config_dir, config_file_path, init_config, init_config_at,
    load_config, load_config_from, search_api_key, validate_config,
};
pub use error::{BriefwrightError, Result, ThresholdFailure};
pub use http::{MAX_REDIRECTS, build_client, is_private_target, public_target};
pub use types::{
    Admission, CandidateSource, ChartKind, ChartSpec, ContentPackage, HarvestRoundRecord,
    NumericPair, Outline, RawSlide, RoundTag, SlideUnit, SourcingSummary, TaskId, VettedSource,
};
