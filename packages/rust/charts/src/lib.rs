//! Chart data: numeric mining, shape normalization and per-document gating.
//!
//! - [`parse_pairs`] / [`extract_from_slide`] mine label/value pairs from prose.
//! - [`RawChartSpec`] + [`normalize_chart_spec`] coerce chart-like input into
//!   a canonical [`ChartSpec`](briefwright_shared::ChartSpec).
//! - [`ChartGate`] decides admission against a [`DocumentChartState`];
//!   [`gate_document`] runs it across a whole document, including fallback
//!   synthesis when nothing qualifies.
//!
//! None of these fail on malformed input. They degrade to "no chart" and log.

mod fallback;
mod gate;
mod numeric;
mod spec;
mod tabular;

pub use fallback::{FallbackCandidate, derive_fallback};
pub use gate::{ChartGate, DocumentChartState, gate_document, has_usable_data, is_meaningful};
pub use numeric::{DEFAULT_MAX_PAIRS, MAX_LABEL_CHARS, extract_from_slide, parse_pairs};
pub use spec::{
    DataPoint, RawChartSpec, coerce_kind, normalize_chart_spec, signature, signature_of,
};
pub use tabular::{HttpTabularSource, TabularSource, parse_table};
