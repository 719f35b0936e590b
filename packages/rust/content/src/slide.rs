//! Slide normalization: bounded subtitles and bullets, unique titles, padding.

use std::collections::HashSet;

use tracing::debug;

use briefwright_shared::{ContentConfig, RawSlide, SlideUnit};

use crate::cleanup::{collapse_whitespace, strip_formatting};
use crate::paginate::{paginate, split_sentences};
use crate::words::content_words;

pub const MIN_BULLETS: usize = 3;
pub const MAX_BULLETS: usize = 6;

/// Generic bullets used only when a slide has nothing else to say.
const FILLER_BULLETS: &[&str] = &[
    "See the speaker notes for details",
    "Refer to the cited sources for more information",
    "Questions and discussion",
];

const FILLER_TITLE: &str = "Additional Notes";
const FILLER_SUBTITLE: &str = "Reserved for additional material.";
const FILLER_NOTES: &str =
    "Placeholder slide added to reach the minimum slide count. It carries no sourced content.";

/// Limits applied while normalizing one document.
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub min_slides: usize,
    pub subtitle_max_chars: usize,
    pub bullet_max_chars: usize,
    pub page_max_chars: usize,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self::from(&ContentConfig::default())
    }
}

impl From<&ContentConfig> for NormalizerOptions {
    fn from(config: &ContentConfig) -> Self {
        Self {
            min_slides: config.min_slides,
            subtitle_max_chars: config.subtitle_max_chars,
            bullet_max_chars: config.bullet_max_chars,
            page_max_chars: config.page_max_chars,
        }
    }
}

// ---------------------------------------------------------------------------
// SlideNormalizer
// ---------------------------------------------------------------------------

/// Normalizes the slides of one document. Remembers titles so that
/// repeated titles get a ` (2)`, ` (3)`, ... suffix.
#[derive(Debug, Clone, Default)]
pub struct SlideNormalizer {
    options: NormalizerOptions,
    seen_titles: HashSet<String>,
}

impl SlideNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self {
            options,
            seen_titles: HashSet::new(),
        }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Reshape one raw slide into a bounded [`SlideUnit`].
    pub fn normalize_slide(&mut self, raw: &RawSlide, index: usize) -> SlideUnit {
        let body = strip_formatting(&raw.body);
        let sentences = split_sentences(&body);

        let mut title = strip_formatting(&raw.title);
        if title.is_empty() {
            title = format!("Slide {}", index + 1);
        }
        let title = self.disambiguate(&title);

        let mut bullets = self.clean_bullets(&raw.bullets);

        let subtitle = match sentences.first() {
            Some(_) => self.subtitle_from(&sentences),
            None => bullets
                .first()
                .map(|b| truncate_chars(b, self.options.subtitle_max_chars))
                .unwrap_or_default(),
        };

        self.pad_bullets(&mut bullets, &sentences);

        let keyword = raw
            .keyword
            .as_deref()
            .map(|k| collapse_whitespace(k).to_lowercase())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| derive_keyword(&title, &body));

        SlideUnit {
            index,
            title,
            subtitle,
            notes: body,
            bullets,
            keyword,
            chart: None,
            image_url: None,
            is_filler: false,
        }
    }

    /// A clearly labeled padding unit.
    pub fn filler_slide(&mut self, index: usize) -> SlideUnit {
        SlideUnit {
            index,
            title: self.disambiguate(FILLER_TITLE),
            subtitle: FILLER_SUBTITLE.to_string(),
            notes: FILLER_NOTES.to_string(),
            bullets: FILLER_BULLETS.iter().map(|b| b.to_string()).collect(),
            keyword: "notes".to_string(),
            chart: None,
            image_url: None,
            is_filler: true,
        }
    }

    fn disambiguate(&mut self, title: &str) -> String {
        if self.seen_titles.insert(title.to_lowercase()) {
            return title.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{title} ({n})");
            if self.seen_titles.insert(candidate.to_lowercase()) {
                debug!(original = %title, renamed = %candidate, "duplicate slide title");
                return candidate;
            }
            n += 1;
        }
    }

    /// First sentence, plus the second when both fit.
    fn subtitle_from(&self, sentences: &[String]) -> String {
        let max = self.options.subtitle_max_chars;
        let first = &sentences[0];
        if let Some(second) = sentences.get(1) {
            let both = format!("{first} {second}");
            if both.chars().count() <= max {
                return both;
            }
        }
        truncate_chars(first, max)
    }

    fn clean_bullets(&self, raw: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        raw.iter()
            .map(|b| strip_formatting(b))
            .filter(|b| !b.is_empty())
            .map(|b| truncate_chars(&b, self.options.bullet_max_chars))
            .filter(|b| seen.insert(b.to_lowercase()))
            .take(MAX_BULLETS)
            .collect()
    }

    /// Top up to [`MIN_BULLETS`] from body sentences, then generic filler.
    fn pad_bullets(&self, bullets: &mut Vec<String>, sentences: &[String]) {
        let mut seen: HashSet<String> = bullets.iter().map(|b| b.to_lowercase()).collect();

        let from_body = sentences
            .iter()
            .map(|s| truncate_chars(s, self.options.bullet_max_chars));
        let generic = FILLER_BULLETS.iter().map(|b| b.to_string());

        for candidate in from_body.chain(generic) {
            if bullets.len() >= MIN_BULLETS {
                break;
            }
            if seen.insert(candidate.to_lowercase()) {
                bullets.push(candidate);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Document level
// ---------------------------------------------------------------------------

/// Normalize every slide of a document, paginating long bodies into
/// continuation slides and padding up to `min_slides` with filler units.
///
/// A paginated slide's first unit carries the full cleaned body as notes;
/// each continuation unit's notes hold its own page.
pub fn normalize_document(raws: &[RawSlide], options: &NormalizerOptions) -> Vec<SlideUnit> {
    normalize_document_traced(raws, options)
        .into_iter()
        .map(|(_, unit)| unit)
        .collect()
}

/// [`normalize_document`], pairing each unit with the position of the raw
/// slide it opens. Continuation and filler units carry `None`.
pub fn normalize_document_traced(
    raws: &[RawSlide],
    options: &NormalizerOptions,
) -> Vec<(Option<usize>, SlideUnit)> {
    let mut normalizer = SlideNormalizer::new(options.clone());
    let mut units: Vec<(Option<usize>, SlideUnit)> = Vec::new();

    for (origin, raw) in raws.iter().enumerate() {
        let body = strip_formatting(&raw.body);
        let pages = paginate(&body, options.page_max_chars);

        if pages.len() <= 1 {
            let unit = normalizer.normalize_slide(raw, units.len());
            units.push((Some(origin), unit));
            continue;
        }

        debug!(title = %raw.title, pages = pages.len(), "paginating long slide body");
        for (page_no, page) in pages.into_iter().enumerate() {
            let (part, traced) = if page_no == 0 {
                let part = RawSlide {
                    body: page,
                    ..raw.clone()
                };
                (part, Some(origin))
            } else {
                let part = RawSlide {
                    title: raw.title.clone(),
                    body: page,
                    keyword: raw.keyword.clone(),
                    ..RawSlide::default()
                };
                (part, None)
            };
            let mut unit = normalizer.normalize_slide(&part, units.len());
            if page_no == 0 {
                // the opening unit keeps the whole prose as its notes
                unit.notes = body.clone();
            }
            units.push((traced, unit));
        }
    }

    while units.len() < options.min_slides {
        let filler = normalizer.filler_slide(units.len());
        units.push((None, filler));
    }

    units
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Cut `text` to at most `max` characters, preferring a word boundary and
/// marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let head: String = text.chars().take(max - 1).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if pos >= head.len() / 2 => &head[..pos],
        _ => head.as_str(),
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    format!("{cut}…")
}

/// The longest content word of the title, else of the body.
fn derive_keyword(title: &str, body: &str) -> String {
    let longest = |words: Vec<String>| {
        words
            .into_iter()
            .fold(None::<String>, |best, w| match best {
                Some(b) if b.chars().count() >= w.chars().count() => Some(b),
                _ => Some(w),
            })
    };

    longest(content_words(title))
        .or_else(|| longest(content_words(body)))
        .unwrap_or_else(|| "overview".to_string())
}
