//! The outline-generator seam.
//!
//! Prose generation is external. The pipeline only needs something that turns
//! a prompt plus research context into an [`Outline`]; [`StaticOutline`]
//! serves a pre-written one, which is how the CLI runs.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use briefwright_shared::{BriefwrightError, Outline, Result};

/// Produces a slide outline for a prompt.
#[async_trait]
pub trait OutlineGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, context: &str) -> Result<Outline>;
}

/// Returns the same outline for every prompt.
#[derive(Debug, Clone)]
pub struct StaticOutline {
    outline: Outline,
}

impl StaticOutline {
    pub fn new(outline: Outline) -> Self {
        Self { outline }
    }

    /// Parse an outline from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let outline: Outline = serde_json::from_str(json)
            .map_err(|e| BriefwrightError::parse(format!("invalid outline JSON: {e}")))?;
        Ok(Self::new(outline))
    }

    /// Load an outline from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| BriefwrightError::io(path, e))?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl OutlineGenerator for StaticOutline {
    async fn generate(&self, prompt: &str, context: &str) -> Result<Outline> {
        debug!(%prompt, context_chars = context.len(), "serving static outline");
        if self.outline.slides.is_empty() && self.outline.title.trim().is_empty() {
            return Err(BriefwrightError::Collaborator(
                "outline has neither a title nor slides".into(),
            ));
        }
        Ok(self.outline.clone())
    }
}
