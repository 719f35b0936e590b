//! Candidate chart seeding, ahead of document gating.

use tracing::{debug, instrument};

use briefwright_charts::{
    RawChartSpec, TabularSource, extract_from_slide, has_usable_data, normalize_chart_spec,
};
use briefwright_shared::{ChartSpec, RawSlide, SlideUnit};

/// Attach a candidate chart to every slide that has data for one.
///
/// Preference per slide: the outline's explicit chart object, then rows from
/// its `data_url`, then pairs mined from the slide text. A source that yields
/// no usable data passes to the next one; a slide with none stays chartless.
/// Only the unit that opens a raw slide sees that slide's chart hints, and
/// filler units are never seeded. Returns how many slides were seeded.
#[instrument(skip_all, fields(slides = slides.len()))]
pub async fn seed_charts(
    raws: &[RawSlide],
    slides: &mut [(Option<usize>, SlideUnit)],
    tabular: &dyn TabularSource,
    max_pairs: usize,
) -> usize {
    let mut seeded = 0;

    for (origin, unit) in slides.iter_mut() {
        if unit.is_filler {
            continue;
        }
        let hints = origin.and_then(|i| raws.get(i));

        let mut chart = hints
            .and_then(|raw| raw.chart.as_ref())
            .map(|value| {
                normalize_chart_spec(&RawChartSpec::from_json(value).or_title(unit.title.clone()))
            })
            .filter(|spec| usable(spec, unit, "explicit"));

        if chart.is_none() {
            if let Some(url) = hints.and_then(|raw| raw.data_url.as_deref()) {
                let points = tabular.fetch(url).await;
                let spec = normalize_chart_spec(&RawChartSpec::Series {
                    kind: None,
                    title: Some(unit.title.clone()),
                    points,
                });
                chart = Some(spec).filter(|spec| usable(spec, unit, "tabular"));
            }
        }

        if chart.is_none() {
            let pairs = extract_from_slide(unit, max_pairs);
            if !pairs.is_empty() {
                let spec = normalize_chart_spec(&RawChartSpec::Pairs {
                    title: Some(unit.title.clone()),
                    pairs,
                });
                chart = Some(spec).filter(|spec| usable(spec, unit, "mined"));
            }
        }

        if chart.is_some() {
            seeded += 1;
        }
        unit.chart = chart;
    }

    seeded
}

fn usable(spec: &ChartSpec, unit: &SlideUnit, origin: &str) -> bool {
    let ok = has_usable_data(spec);
    if !ok {
        debug!(slide = unit.index, origin, "chart data unusable");
    }
    ok
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use briefwright_charts::DataPoint;
    use briefwright_content::{NormalizerOptions, normalize_document_traced};
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct StubTabular {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TabularSource for StubTabular {
        async fn fetch(&self, url: &str) -> Vec<DataPoint> {
            self.calls.lock().unwrap().push(url.to_string());
            if url.ends_with("good.csv") {
                vec![
                    DataPoint::new("Spring", 12.0),
                    DataPoint::new("Summer", 30.0),
                    DataPoint::new("Autumn", 8.0),
                ]
            } else {
                Vec::new()
            }
        }
    }

    fn raw(title: &str, body: &str) -> RawSlide {
        RawSlide {
            title: title.into(),
            body: body.into(),
            ..RawSlide::default()
        }
    }

    fn traced(raws: &[RawSlide]) -> Vec<(Option<usize>, SlideUnit)> {
        normalize_document_traced(raws, &NormalizerOptions::default())
    }

    #[tokio::test]
    async fn prefers_explicit_then_tabular_then_mined() {
        let raws = vec![
            RawSlide {
                chart: Some(json!({"labels": ["Workers", "Soldiers", "Queens"], "values": [80, 15, 5]})),
                data_url: Some("https://data.example/good.csv".into()),
                ..raw("Castes", "Workers: 40%. Drones: 60%.")
            },
            RawSlide {
                data_url: Some("https://data.example/good.csv".into()),
                ..raw("Seasons", "Activity peaks in summer.")
            },
            raw("Diet", "Seeds: 45%. Insects: 35%. Nectar: 20%."),
            raw("Habitat", "Ants live almost everywhere."),
        ];
        let mut slides = traced(&raws);
        let tabular = StubTabular::default();

        let seeded = seed_charts(&raws, &mut slides, &tabular, 8).await;
        assert_eq!(seeded, 3);

        let castes = slides[0].1.chart.as_ref().expect("explicit chart");
        assert_eq!(castes.labels, vec!["Workers", "Soldiers", "Queens"]);
        assert_eq!(castes.title, "Castes");

        let seasons = slides[1].1.chart.as_ref().expect("tabular chart");
        assert_eq!(seasons.labels, vec!["Spring", "Summer", "Autumn"]);

        let diet = slides[2].1.chart.as_ref().expect("mined chart");
        assert_eq!(diet.labels, vec!["Seeds", "Insects", "Nectar"]);

        assert!(slides[3].1.chart.is_none());
        assert!(slides.iter().filter(|(_, u)| u.is_filler).all(|(_, u)| u.chart.is_none()));
        // the explicit chart won, so only the second slide hit the endpoint
        assert_eq!(tabular.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unusable_sources_fall_through() {
        let raws = vec![RawSlide {
            chart: Some(json!({"labels": ["Only"], "values": [1]})),
            data_url: Some("https://data.example/broken.json".into()),
            ..raw("Castes", "Workers: 80%. Soldiers: 15%.")
        }];
        let mut slides = traced(&raws);
        let tabular = StubTabular::default();

        seed_charts(&raws, &mut slides, &tabular, 8).await;
        let chart = slides[0].1.chart.as_ref().expect("mined fallback");
        assert_eq!(chart.labels, vec!["Workers", "Soldiers"]);
    }
}
