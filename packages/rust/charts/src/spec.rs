//! Raw chart shapes and their normalization into [`ChartSpec`].
//!
//! Outline generators, remote tables and the text miner all describe charts
//! differently. Every input is first resolved into one [`RawChartSpec`]
//! variant, then [`normalize_chart_spec`] coerces it into the canonical
//! categorical form. Nothing here fails: malformed input becomes a two-slot
//! placeholder that never passes [`crate::has_usable_data`].

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use briefwright_shared::{ChartKind, ChartSpec, NumericPair};

use crate::numeric::MAX_LABEL_CHARS;

const DEFAULT_TITLE: &str = "Chart";

const KIND_KEYS: &[&str] = &["type", "kind", "chartType", "chart_type"];
const TITLE_KEYS: &[&str] = &["title", "name", "caption"];
const SERIES_KEYS: &[&str] = &["data", "series", "rows", "points", "items"];
const LABEL_KEYS: &[&str] = &["label", "name", "category", "key", "x"];
const VALUE_KEYS: &[&str] = &["value", "y", "count", "amount", "total"];

/// One labelled value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Every chart-like input shape that can be normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum RawChartSpec {
    /// Parallel `labels` / `values` arrays (also Chart.js `datasets[0].data`).
    /// Lengths may disagree; extra entries are dropped.
    Explicit {
        kind: Option<String>,
        title: Option<String>,
        labels: Vec<String>,
        values: Vec<Option<f64>>,
    },
    /// An object mapping label to value.
    Keyed {
        kind: Option<String>,
        title: Option<String>,
        points: Vec<DataPoint>,
    },
    /// A list of `{label, value}` records or `[label, value]` tuples.
    Series {
        kind: Option<String>,
        title: Option<String>,
        points: Vec<DataPoint>,
    },
    /// Pairs mined from prose.
    Pairs {
        title: Option<String>,
        pairs: Vec<NumericPair>,
    },
    Unrecognized,
}

impl RawChartSpec {
    /// Resolve an arbitrary JSON value into a raw shape.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::Series {
                kind: None,
                title: None,
                points: points_from_array(items),
            },
            Value::Object(map) => from_object(map),
            _ => Self::Unrecognized,
        }
    }

    /// Fill in `title` when the shape carries none.
    pub fn or_title(mut self, fallback: impl Into<String>) -> Self {
        match &mut self {
            Self::Explicit { title, .. }
            | Self::Keyed { title, .. }
            | Self::Series { title, .. }
            | Self::Pairs { title, .. } => {
                if title.as_deref().is_none_or(|t| t.trim().is_empty()) {
                    *title = Some(fallback.into());
                }
            }
            Self::Unrecognized => {}
        }
        self
    }

    /// The labelled values this shape carries, before cleaning.
    pub fn points(&self) -> Vec<DataPoint> {
        match self {
            Self::Explicit { labels, values, .. } => labels
                .iter()
                .zip(values)
                .filter_map(|(label, value)| value.map(|v| DataPoint::new(label.clone(), v)))
                .collect(),
            Self::Keyed { points, .. } | Self::Series { points, .. } => points.clone(),
            Self::Pairs { pairs, .. } => pairs
                .iter()
                .map(|p| DataPoint::new(p.label.clone(), p.value))
                .collect(),
            Self::Unrecognized => Vec::new(),
        }
    }

    fn kind(&self) -> Option<&str> {
        match self {
            Self::Explicit { kind, .. } | Self::Keyed { kind, .. } | Self::Series { kind, .. } => {
                kind.as_deref()
            }
            Self::Pairs { .. } | Self::Unrecognized => None,
        }
    }

    fn title(&self) -> Option<&str> {
        match self {
            Self::Explicit { title, .. }
            | Self::Keyed { title, .. }
            | Self::Series { title, .. }
            | Self::Pairs { title, .. } => title.as_deref(),
            Self::Unrecognized => None,
        }
    }
}

fn from_object(map: &Map<String, Value>) -> RawChartSpec {
    let kind = first_str(map, KIND_KEYS);
    let title = first_str(map, TITLE_KEYS);

    if let Some(labels) = map.get("labels").and_then(Value::as_array) {
        let values = map
            .get("values")
            .or_else(|| map.get("data"))
            .and_then(Value::as_array)
            .or_else(|| {
                map.get("datasets")
                    .and_then(Value::as_array)
                    .and_then(|sets| sets.first())
                    .and_then(|set| set.get("data"))
                    .and_then(Value::as_array)
            });

        return RawChartSpec::Explicit {
            kind,
            title,
            labels: labels.iter().map(label_text).collect(),
            values: values
                .map(|vals| vals.iter().map(number).collect())
                .unwrap_or_default(),
        };
    }

    if let Some(data) = SERIES_KEYS.iter().find_map(|key| map.get(*key)) {
        return match data {
            Value::Array(items) => RawChartSpec::Series {
                kind,
                title,
                points: points_from_array(items),
            },
            Value::Object(inner) => RawChartSpec::Keyed {
                kind,
                title,
                points: points_from_map(inner),
            },
            _ => RawChartSpec::Unrecognized,
        };
    }

    // A bare `{ "label": number, ... }` object
    let points = points_from_map(map);
    if points.is_empty() {
        RawChartSpec::Unrecognized
    } else {
        RawChartSpec::Keyed {
            kind,
            title,
            points,
        }
    }
}

fn points_from_array(items: &[Value]) -> Vec<DataPoint> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(record) => {
                let label = LABEL_KEYS.iter().find_map(|k| record.get(*k)).map(label_text)?;
                let value = VALUE_KEYS.iter().find_map(|k| record.get(*k)).and_then(number)?;
                Some(DataPoint::new(label, value))
            }
            Value::Array(tuple) if tuple.len() >= 2 => {
                Some(DataPoint::new(label_text(&tuple[0]), number(&tuple[1])?))
            }
            _ => None,
        })
        .collect()
}

fn points_from_map(map: &Map<String, Value>) -> Vec<DataPoint> {
    map.iter()
        .filter(|(key, _)| !KIND_KEYS.contains(&key.as_str()) && !TITLE_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| number(value).map(|v| DataPoint::new(key.clone(), v)))
        .collect()
}

fn first_str(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Numbers, or strings like `"1,200"` and `"45%"`.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .replace(',', "")
            .trim()
            .parse()
            .ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Map a free-form chart type name to the nearest supported kind.
pub fn coerce_kind(name: Option<&str>) -> ChartKind {
    let Some(name) = name else {
        return ChartKind::Bar;
    };
    let name = name.to_ascii_lowercase();
    if name.contains("doughnut") || name.contains("donut") || name.contains("ring") {
        ChartKind::Doughnut
    } else if name.contains("pie") || name.contains("polar") {
        ChartKind::Pie
    } else if name.contains("column") || name.contains("histogram") || name.contains("vertical") {
        ChartKind::Column
    } else {
        // line, area, radar, scatter and anything unknown plot fine as bars
        ChartKind::Bar
    }
}

/// Coerce any raw shape into a canonical [`ChartSpec`].
///
/// Labels are trimmed, capped and deduplicated (first wins); entries with
/// blank labels are dropped. Fewer than two surviving entries yields the
/// placeholder spec.
pub fn normalize_chart_spec(raw: &RawChartSpec) -> ChartSpec {
    let title = raw.title().unwrap_or(DEFAULT_TITLE).to_string();
    let kind = coerce_kind(raw.kind());

    let mut seen = HashSet::new();
    let (labels, values): (Vec<String>, Vec<f64>) = raw
        .points()
        .into_iter()
        .filter_map(|point| {
            let label: String = point.label.trim().chars().take(MAX_LABEL_CHARS).collect();
            let label = label.trim_end().to_string();
            if label.is_empty() || !seen.insert(label.to_lowercase()) {
                return None;
            }
            Some((label, point.value))
        })
        .unzip();

    if labels.len() < 2 {
        debug!(%title, entries = labels.len(), "insufficient chart data, using placeholder");
        return placeholder(title);
    }

    let signature = signature_of(&labels, &values);
    ChartSpec {
        kind,
        title,
        labels,
        values,
        signature,
    }
}

fn placeholder(title: String) -> ChartSpec {
    let labels = vec!["A".to_string(), "B".to_string()];
    let values = vec![0.0, 0.0];
    let signature = signature_of(&labels, &values);
    ChartSpec {
        kind: ChartKind::Bar,
        title,
        labels,
        values,
        signature,
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Scale- and order-invariant fingerprint of a spec's data.
pub fn signature(spec: &ChartSpec) -> String {
    signature_of(&spec.labels, &spec.values)
}

/// Each label's share of the total at 0.1% granularity, as sorted
/// `label=share` pairs joined by `|`.
pub fn signature_of(labels: &[String], values: &[f64]) -> String {
    let total: f64 = values.iter().map(|v| v.abs()).sum();

    let mut parts: Vec<String> = labels
        .iter()
        .zip(values)
        .map(|(label, value)| {
            let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            // adding 0.0 folds -0.0 into 0.0
            let share = (share * 10.0).round() / 10.0 + 0.0;
            format!("{}={share:.1}", label.trim().to_lowercase())
        })
        .collect();

    parts.sort();
    parts.join("|")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::gate::has_usable_data;

    #[test]
    fn explicit_arrays() {
        let raw = RawChartSpec::from_json(&json!({
            "type": "pie",
            "title": "Castes",
            "labels": ["Workers", "Soldiers", "Queens"],
            "values": [80, "15", "5%"],
        }));
        let spec = normalize_chart_spec(&raw);
        assert_eq!(spec.kind, ChartKind::Pie);
        assert_eq!(spec.title, "Castes");
        assert_eq!(spec.labels, vec!["Workers", "Soldiers", "Queens"]);
        assert_eq!(spec.values, vec![80.0, 15.0, 5.0]);
    }

    #[test]
    fn missing_titles_can_be_filled() {
        let untitled = RawChartSpec::from_json(&json!({"Workers": 80, "Soldiers": 15, "Queens": 5}));
        assert_eq!(normalize_chart_spec(&untitled.or_title("Castes")).title, "Castes");

        let titled = RawChartSpec::from_json(&json!({"title": "Roles", "data": {"A": 1, "B": 2}}));
        assert_eq!(normalize_chart_spec(&titled.or_title("Castes")).title, "Roles");
    }

    #[test]
    fn chartjs_datasets() {
        let raw = RawChartSpec::from_json(&json!({
            "type": "line",
            "labels": ["2020", "2021"],
            "datasets": [{"label": "Colonies", "data": [3, 9]}],
        }));
        let spec = normalize_chart_spec(&raw);
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.values, vec![3.0, 9.0]);
    }

    #[test]
    fn keyed_objects_and_series() {
        let keyed = RawChartSpec::from_json(&json!({"title": "Diet", "data": {"Seeds": 40, "Insects": 60}}));
        assert!(matches!(keyed, RawChartSpec::Keyed { .. }));
        assert_eq!(normalize_chart_spec(&keyed).labels.len(), 2);

        let bare = RawChartSpec::from_json(&json!({"Seeds": 40, "Insects": 60, "Nectar": 10}));
        assert_eq!(normalize_chart_spec(&bare).labels.len(), 3);

        let records = RawChartSpec::from_json(&json!([
            {"name": "Egg", "value": 7},
            {"label": "Larva", "count": "14"},
            ["Pupa", 10],
            {"label": "Adult"},
        ]));
        let spec = normalize_chart_spec(&records);
        assert_eq!(spec.labels, vec!["Egg", "Larva", "Pupa"]);
        assert_eq!(spec.values, vec![7.0, 14.0, 10.0]);
    }

    #[test]
    fn partial_specs_are_trimmed() {
        let raw = RawChartSpec::from_json(&json!({
            "kind": "donut",
            "labels": ["A", "B", "C"],
            "values": [1, "n/a", 3],
        }));
        let spec = normalize_chart_spec(&raw);
        assert_eq!(spec.kind, ChartKind::Doughnut);
        assert_eq!(spec.labels, vec!["A", "C"]);
    }

    #[test]
    fn malformed_input_becomes_unusable_placeholder() {
        for raw in [json!("bar chart"), json!({"labels": ["Only"], "values": [4]}), json!({"x": "y"}), json!(null)] {
            let spec = normalize_chart_spec(&RawChartSpec::from_json(&raw));
            assert_eq!(spec.labels, vec!["A", "B"]);
            assert_eq!(spec.values, vec![0.0, 0.0]);
            assert!(!has_usable_data(&spec), "{raw}");
        }
    }

    #[test]
    fn duplicate_labels_keep_first() {
        let raw = RawChartSpec::Series {
            kind: Some("histogram".into()),
            title: None,
            points: vec![
                DataPoint::new("Ants", 1.0),
                DataPoint::new("ants ", 5.0),
                DataPoint::new("Bees", 2.0),
            ],
        };
        let spec = normalize_chart_spec(&raw);
        assert_eq!(spec.kind, ChartKind::Column);
        assert_eq!(spec.values, vec![1.0, 2.0]);
        assert_eq!(spec.title, "Chart");
    }

    #[test]
    fn signature_ignores_scale_and_order() {
        let a = signature_of(&["X".into(), "Y".into()], &[10.0, 20.0]);
        let b = signature_of(&["X".into(), "Y".into()], &[100.0, 200.0]);
        let c = signature_of(&["y".into(), "x".into()], &[2.0, 1.0]);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, "x=33.3|y=66.7");

        let different = signature_of(&["X".into(), "Y".into()], &[20.0, 10.0]);
        assert_ne!(a, different);
    }
}
