//! Pipeline orchestration for briefwright.
//!
//! This crate ties vetting, harvesting, content normalization and chart
//! gating into one end-to-end build ([`build_package`]), and owns the
//! collaborator seams that only the pipeline needs: the outline generator
//! and the image provider.

pub mod imagery;
pub mod intent;
pub mod outline;
pub mod pipeline;
pub mod research;
pub mod seeding;

pub use imagery::{HttpImageProvider, ImageAnnotator, ImageProvider};
pub use intent::is_rigorous;
pub use outline::{OutlineGenerator, StaticOutline};
pub use pipeline::{
    Collaborators, OfflineSearch, ProgressReporter, SilentProgress, build_package,
};
pub use research::{ContextOptions, synthesize_context};
pub use seeding::seed_charts;
