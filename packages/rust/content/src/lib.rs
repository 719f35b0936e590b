//! Content normalization for outline prose.
//!
//! Raw outline slides pass through a cleanup pipeline ([`strip_formatting`]),
//! are paginated on sentence boundaries ([`paginate`]) and reshaped into
//! bounded [`SlideUnit`](briefwright_shared::SlideUnit) records by a
//! per-document [`SlideNormalizer`]. [`normalize_document`] also pads short
//! documents with clearly labeled filler units.

mod cleanup;
mod paginate;
mod slide;
mod words;

pub use cleanup::strip_formatting;
pub use paginate::{paginate, split_sentences};
pub use slide::{
    MAX_BULLETS, MIN_BULLETS, NormalizerOptions, SlideNormalizer, normalize_document,
    normalize_document_traced, truncate_chars,
};
pub use words::{content_words, is_stop_word};
