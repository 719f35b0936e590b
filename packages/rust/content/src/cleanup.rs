//! Text cleanup pipeline for outline prose.
//!
//! Each pass is a function `&str -> String` applied in sequence. The result
//! is a single line of plain prose: no markup, no links, no template chatter.

use std::sync::LazyLock;

use regex::Regex;

/// Strip markup and boilerplate, collapsing the text to plain prose.
pub fn strip_formatting(text: &str) -> String {
    let mut result = text.to_string();

    result = drop_code_fences(&result);
    result = strip_html(&result);
    result = unwrap_links(&result);
    result = strip_markup_tokens(&result);
    result = strip_boilerplate(&result);
    result = collapse_whitespace(&result);
    result = tidy_punctuation(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Code fences
// ---------------------------------------------------------------------------

/// Remove ``` fence lines, keeping the fenced text.
fn drop_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass 2: HTML tags and entities
// ---------------------------------------------------------------------------

fn strip_html(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*(?:\s[^<>]*)?/?>").expect("valid regex")
    });

    TAG_RE
        .replace_all(text, " ")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

// ---------------------------------------------------------------------------
// Pass 3: Links and images
// ---------------------------------------------------------------------------

/// `[text](url)` becomes `text`; images become their alt text.
fn unwrap_links(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

    LINK_RE.replace_all(text, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Markdown tokens
// ---------------------------------------------------------------------------

fn strip_markup_tokens(text: &str) -> String {
    static LINE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
        // headings, quotes, list bullets and numbered items at line start
        Regex::new(r"(?m)^[ \t]*(?:#{1,6}|>+|[-*+•▪◦]|\d{1,2}[.)])[ \t]+").expect("valid regex")
    });
    static EMPHASIS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*{1,3}|_{2,3}|~~|`").expect("valid regex"));
    static RULE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,}|={3,})[ \t]*$").expect("valid regex"));

    let text = RULE_RE.replace_all(text, "");
    let text = LINE_MARKER_RE.replace_all(&text, "");
    EMPHASIS_RE.replace_all(&text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Boilerplate meta-phrases
// ---------------------------------------------------------------------------

/// Drop self-referential slide and template language.
fn strip_boilerplate(text: &str) -> String {
    static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?ix)
            \b(?:
                in\ this\ (?:slide|section|presentation|deck|report)
              | this\ (?:slide|section|presentation)\ (?:shows|covers|presents|illustrates|discusses|explains|will\ (?:show|cover|discuss|explain))
              | (?:the\ )?(?:following|next)\ slides?\ (?:shows?|covers?|will\ (?:show|cover))
              | as\ (?:shown|seen|illustrated)\ (?:below|above|here|on\ this\ slide)
              | click\ to\ (?:add|edit)\ [a-z]+(?:\ [a-z]+)?
              | insert\ [a-z]+\ here
              | speaker\ notes?:
              | placeholder\ text
              | lorem\ ipsum(?:\ dolor\ sit\ amet)?
            )\b[,:]?",
        )
        .expect("valid regex")
    });

    BOILERPLATE_RE.replace_all(text, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: Whitespace
// ---------------------------------------------------------------------------

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Pass 7: Punctuation left behind by removals
// ---------------------------------------------------------------------------

fn tidy_punctuation(text: &str) -> String {
    static SPACE_BEFORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").expect("valid regex"));

    static SENTENCE_START_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([.!?]\s+)(\p{Ll})").expect("valid regex"));

    let text = SPACE_BEFORE_RE.replace_all(text, "$1");
    let text = SENTENCE_START_RE.replace_all(&text, |caps: &regex::Captures| {
        format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    let text = text.trim_start_matches(|c: char| matches!(c, ',' | ';' | ':' | '.') || c.is_whitespace());

    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        Some(_) => text.to_string(),
        None => String::new(),
    }
}
