//! Per-document chart admission.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use briefwright_shared::{ChartSpec, ChartsConfig, SlideUnit};

use crate::fallback::derive_fallback;
use crate::spec::signature;

/// At least two labels and values, and at least one positive value.
pub fn has_usable_data(spec: &ChartSpec) -> bool {
    spec.labels.len() >= 2 && spec.values.len() >= 2 && spec.values.iter().any(|v| *v > 0.0)
}

/// Whether a spec says something worth drawing.
///
/// Three or more categories always qualify. Two categories qualify only while
/// the document's two-category slot is free and the split is at least
/// `min_imbalance_pct` percentage points away from even.
pub fn is_meaningful(spec: &ChartSpec, allow_two_category: bool, min_imbalance_pct: f64) -> bool {
    match category_count(spec) {
        n if n >= 3 => true,
        2 => allow_two_category && imbalance_pct(spec.values[0], spec.values[1]) >= min_imbalance_pct,
        _ => false,
    }
}

fn category_count(spec: &ChartSpec) -> usize {
    spec.labels.len().min(spec.values.len())
}

/// `|share_a - share_b|` in percentage points: 60/40 → 20, 51/49 → 2.
fn imbalance_pct(a: f64, b: f64) -> f64 {
    let total = a.abs() + b.abs();
    if total <= 0.0 {
        return 0.0;
    }
    (a.abs() - b.abs()).abs() / total * 100.0
}

// ---------------------------------------------------------------------------
// DocumentChartState
// ---------------------------------------------------------------------------

/// Admission bookkeeping for one document build. Only [`ChartGate::admit`]
/// mutates it.
#[derive(Debug, Clone, Default)]
pub struct DocumentChartState {
    admitted_count: usize,
    seen_signatures: HashSet<String>,
    has_two_category_chart: bool,
}

impl DocumentChartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admitted_count(&self) -> usize {
        self.admitted_count
    }

    pub fn has_two_category_chart(&self) -> bool {
        self.has_two_category_chart
    }

    pub fn has_seen(&self, signature: &str) -> bool {
        self.seen_signatures.contains(signature)
    }
}

// ---------------------------------------------------------------------------
// ChartGate
// ---------------------------------------------------------------------------

/// Chart admission policy for a document.
#[derive(Debug, Clone)]
pub struct ChartGate {
    pub max_charts: usize,
    pub min_imbalance_pct: f64,
    /// Pair cap when mining fallback data.
    pub max_pairs: usize,
    /// Categories in a keyword-frequency fallback chart.
    pub fallback_keywords: usize,
}

impl Default for ChartGate {
    fn default() -> Self {
        Self::from(&ChartsConfig::default())
    }
}

impl From<&ChartsConfig> for ChartGate {
    fn from(config: &ChartsConfig) -> Self {
        Self {
            max_charts: config.max_charts,
            min_imbalance_pct: config.min_imbalance_pct,
            max_pairs: config.max_pairs,
            fallback_keywords: config.fallback_keywords,
        }
    }
}

impl ChartGate {
    /// Admit `spec` into the document, updating `state` on success.
    pub fn admit(&self, spec: &ChartSpec, state: &mut DocumentChartState) -> bool {
        if state.admitted_count >= self.max_charts {
            debug!(title = %spec.title, max = self.max_charts, "chart cap reached");
            return false;
        }
        if !has_usable_data(spec) {
            debug!(title = %spec.title, "chart has no usable data");
            return false;
        }

        let two_category = category_count(spec) == 2;
        if two_category && state.has_two_category_chart {
            debug!(title = %spec.title, "second two-category chart");
            return false;
        }
        if !is_meaningful(spec, !state.has_two_category_chart, self.min_imbalance_pct) {
            debug!(title = %spec.title, "chart not meaningful");
            return false;
        }

        let sig = signature(spec);
        if state.seen_signatures.contains(&sig) {
            debug!(title = %spec.title, signature = %sig, "duplicate chart data");
            return false;
        }

        state.admitted_count += 1;
        state.seen_signatures.insert(sig);
        if two_category {
            state.has_two_category_chart = true;
        }
        true
    }
}

/// Gate every slide chart of a document in slide order.
///
/// Rejected charts are removed from their slides. If nothing was admitted,
/// a fallback chart is derived from the document text and, when it passes
/// the same gate, attached to its anchor slide (the first slide a mined pair
/// came from, else the first non-filler slide). Returns the admitted specs
/// in slide order.
#[instrument(skip_all, fields(slides = slides.len()))]
pub fn gate_document(gate: &ChartGate, slides: &mut [SlideUnit]) -> Vec<ChartSpec> {
    let mut state = DocumentChartState::new();

    for slide in slides.iter_mut() {
        let Some(spec) = slide.chart.take() else {
            continue;
        };
        if gate.admit(&spec, &mut state) {
            slide.chart = Some(spec);
        } else {
            debug!(slide = slide.index, title = %spec.title, "chart rejected");
        }
    }

    if state.admitted_count() == 0 {
        if let Some(candidate) = derive_fallback(slides, gate.max_pairs, gate.fallback_keywords) {
            let anchor = candidate
                .anchor
                .or_else(|| slides.iter().position(|s| !s.is_filler))
                .unwrap_or(0);

            if gate.admit(&candidate.spec, &mut state) {
                if let Some(slide) = slides.get_mut(anchor) {
                    info!(slide = slide.index, title = %candidate.spec.title, "fallback chart admitted");
                    slide.chart = Some(candidate.spec);
                }
            } else {
                debug!(title = %candidate.spec.title, "fallback chart rejected");
            }
        }
    }

    slides.iter().filter_map(|s| s.chart.clone()).collect()
}
