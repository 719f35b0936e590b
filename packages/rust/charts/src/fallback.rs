//! Last-resort chart synthesis for documents that admitted no chart.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use briefwright_content::content_words;
use briefwright_shared::{ChartSpec, NumericPair, SlideUnit};

use crate::numeric::{parse_pairs, slide_text};
use crate::spec::{DataPoint, RawChartSpec, normalize_chart_spec};

/// Keyword charts need at least this many distinct words.
const MIN_FALLBACK_KEYWORDS: usize = 3;

/// A synthesized chart and the slide position it belongs to, if any.
#[derive(Debug, Clone)]
pub struct FallbackCandidate {
    pub spec: ChartSpec,
    /// Position in the slide list of the first slide that contributed data.
    pub anchor: Option<usize>,
}

/// Build one synthetic chart from the whole document.
///
/// Mined numeric pairs are aggregated first, keeping the unit group
/// (percentages or plain numbers) with more entries. When that leaves fewer
/// than two labels, the most frequent title and bullet keywords are counted
/// instead. Filler slides never contribute.
pub fn derive_fallback(
    slides: &[SlideUnit],
    max_pairs: usize,
    keyword_count: usize,
) -> Option<FallbackCandidate> {
    if let Some(candidate) = aggregate_pairs(slides, max_pairs) {
        return Some(candidate);
    }
    keyword_frequency(slides, keyword_count)
}

fn aggregate_pairs(slides: &[SlideUnit], max_pairs: usize) -> Option<FallbackCandidate> {
    let mut mined: Vec<(usize, NumericPair)> = Vec::new();
    for (position, slide) in slides.iter().enumerate().filter(|(_, s)| !s.is_filler) {
        mined.extend(
            parse_pairs(&slide_text(slide), max_pairs)
                .into_iter()
                .map(|pair| (position, pair)),
        );
    }

    let percentages = mined.iter().filter(|(_, p)| p.is_percentage).count();
    let use_percentages = percentages * 2 >= mined.len();

    let mut seen = HashSet::new();
    let kept: Vec<(usize, NumericPair)> = mined
        .into_iter()
        .filter(|(_, p)| p.is_percentage == use_percentages)
        .filter(|(_, p)| seen.insert(p.label.to_lowercase()))
        .take(max_pairs)
        .collect();

    if kept.len() < 2 {
        debug!(pairs = kept.len(), "too few mined pairs for a fallback chart");
        return None;
    }

    let anchor = kept.first().map(|(position, _)| *position);
    let spec = normalize_chart_spec(&RawChartSpec::Pairs {
        title: Some("Key figures".to_string()),
        pairs: kept.into_iter().map(|(_, pair)| pair).collect(),
    });
    Some(FallbackCandidate { spec, anchor })
}

fn keyword_frequency(slides: &[SlideUnit], keyword_count: usize) -> Option<FallbackCandidate> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for slide in slides.iter().filter(|s| !s.is_filler) {
        let texts = std::iter::once(&slide.title).chain(slide.bullets.iter());
        for word in texts.flat_map(|t| content_words(t)) {
            let count = counts.entry(word.clone()).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }
    }

    if order.len() < MIN_FALLBACK_KEYWORDS {
        debug!(keywords = order.len(), "too few keywords for a fallback chart");
        return None;
    }

    // Stable sort keeps first-appearance order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    let points = order
        .into_iter()
        .take(keyword_count.max(MIN_FALLBACK_KEYWORDS))
        .map(|word| {
            let value = counts[&word] as f64;
            DataPoint::new(word, value)
        })
        .collect();

    let spec = normalize_chart_spec(&RawChartSpec::Keyed {
        kind: Some("bar".to_string()),
        title: Some("Most frequent themes".to_string()),
        points,
    });
    Some(FallbackCandidate { spec, anchor: None })
}
