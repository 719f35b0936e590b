//! Mining label/value pairs from free text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use briefwright_shared::{NumericPair, SlideUnit};

/// Default cap on pairs returned by one extraction call.
pub const DEFAULT_MAX_PAIRS: usize = 8;

/// Longest label kept, in characters.
pub const MAX_LABEL_CHARS: usize = 30;

/// `Label: 42`, `Label: 1,200`, `Label: 12.5%`
static COLON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{L}[\p{L}\p{N} '&/-]*?)[ \t]*:[ \t]*(-?\d[\d,]*(?:\.\d+)?)[ \t]*(%)?")
        .expect("valid regex")
});

/// `Label (12%)`
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{L}[\p{L}\p{N} '&/-]*?)[ \t]*\([ \t]*(-?\d+(?:\.\d+)?)[ \t]*%[ \t]*\)")
        .expect("valid regex")
});

/// Extract "Label: Number[%]" and "Label (Number%)" pairs in text order.
///
/// Pairs are deduplicated by lowercased label and percentage flag and capped
/// at `max`. Unparseable numbers are skipped.
pub fn parse_pairs(text: &str, max: usize) -> Vec<NumericPair> {
    let mut found: Vec<(usize, NumericPair)> = Vec::new();

    for caps in COLON_RE.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if let Some(pair) = build_pair(&caps[1], &caps[2], caps.get(3).is_some()) {
            found.push((start, pair));
        }
    }
    for caps in PAREN_RE.captures_iter(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if let Some(pair) = build_pair(&caps[1], &caps[2], true) {
            found.push((start, pair));
        }
    }

    found.sort_by_key(|(start, _)| *start);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, pair)| pair)
        .filter(|pair| seen.insert((pair.label.to_lowercase(), pair.is_percentage)))
        .take(max)
        .collect()
}

/// Pairs mined from everything a slide says, or nothing when fewer than two
/// distinct labels turn up.
pub fn extract_from_slide(slide: &SlideUnit, max: usize) -> Vec<NumericPair> {
    let pairs = parse_pairs(&slide_text(slide), max);

    let labels: HashSet<String> = pairs.iter().map(|p| p.label.to_lowercase()).collect();
    if labels.len() < 2 {
        if !pairs.is_empty() {
            debug!(slide = slide.index, "single numeric label, not chartable");
        }
        return Vec::new();
    }
    pairs
}

/// Subtitle, notes and bullets pooled on separate lines.
pub(crate) fn slide_text(slide: &SlideUnit) -> String {
    let mut parts: Vec<&str> = vec![slide.subtitle.as_str(), slide.notes.as_str()];
    parts.extend(slide.bullets.iter().map(String::as_str));
    parts.join("\n")
}

fn build_pair(raw_label: &str, raw_value: &str, is_percentage: bool) -> Option<NumericPair> {
    let label = clean_label(raw_label)?;
    let value: f64 = raw_value.replace(',', "").parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(NumericPair {
        label,
        value,
        is_percentage,
    })
}

/// Trim to the words nearest the number, within [`MAX_LABEL_CHARS`].
fn clean_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(['-', '/', '&']).trim();
    // "at 10:30" is a time, not a category
    if trimmed.is_empty() || trimmed.ends_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut len = 0;
    for word in trimmed.split_whitespace().rev() {
        let extra = word.chars().count() + usize::from(!kept.is_empty());
        if len + extra > MAX_LABEL_CHARS {
            break;
        }
        kept.push(word);
        len += extra;
    }

    if kept.is_empty() {
        return Some(trimmed.chars().take(MAX_LABEL_CHARS).collect());
    }
    kept.reverse();
    Some(kept.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(notes: &str, bullets: &[&str]) -> SlideUnit {
        SlideUnit {
            index: 0,
            title: "Colony".into(),
            subtitle: String::new(),
            notes: notes.into(),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
            keyword: "ant".into(),
            chart: None,
            image_url: None,
            is_filler: false,
        }
    }

    #[test]
    fn parses_both_forms_in_text_order() {
        let pairs = parse_pairs("Workers (80%) outnumber the rest. Queens: 1, males: 1,200.", 8);
        let labels: Vec<&str> = pairs.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Workers", "Queens", "males"]);
        assert!(pairs[0].is_percentage);
        assert_eq!(pairs[2].value, 1200.0);
        assert!(!pairs[2].is_percentage);
    }

    #[test]
    fn dedupes_by_label_and_unit() {
        let pairs = parse_pairs("Eggs: 20%. eggs: 25%. Eggs: 300", 8);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].value, 20.0);
        assert!(pairs[0].is_percentage);
        assert_eq!(pairs[1].value, 300.0);
    }

    #[test]
    fn caps_pair_count() {
        let text = (0..20)
            .map(|i| format!("Item {}: {i}", char::from(b'a' + i as u8)))
            .collect::<Vec<_>>()
            .join(". ");
        assert_eq!(parse_pairs(&text, 8).len(), 8);
        assert_eq!(parse_pairs(&text, DEFAULT_MAX_PAIRS).len(), DEFAULT_MAX_PAIRS);
    }

    #[test]
    fn long_labels_keep_nearest_words() {
        let pairs = parse_pairs(
            "The proportion of the colony devoted to foraging workers: 45%",
            8,
        );
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].label.chars().count() <= MAX_LABEL_CHARS);
        assert!(pairs[0].label.ends_with("foraging workers"));
    }

    #[test]
    fn ignores_times_and_plain_numbers() {
        assert!(parse_pairs("Meet at 10:30 with 40 ants", 8).is_empty());
    }

    #[test]
    fn slide_needs_two_distinct_labels() {
        let thin = slide("Workers: 80% of the colony.", &[]);
        assert!(extract_from_slide(&thin, 8).is_empty());

        let rich = slide("Workers: 80% of the colony.", &["Soldiers: 15%", "Queens: 5%"]);
        let pairs = extract_from_slide(&rich, 8);
        assert_eq!(pairs.len(), 3);
    }
}
