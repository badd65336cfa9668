use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Density band for a keyword's occurrence percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    VeryLow,
    VeryGood,
    VeryHigh,
}

/// Per-keyword analysis row. `occurrences` is the density percentage,
/// rounded to two decimals; `found` is the raw match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordResult {
    pub word: String,
    pub occurrences: f64,
    pub standing: Standing,
    pub found: usize,
}

/// Raw keyword input: a single comma-delimited string, or an already-split
/// list of entries.
#[derive(Debug, Clone, Copy)]
pub enum KeywordInput<'a> {
    Delimited(&'a str),
    List(&'a [String]),
}

/// Signal returned when no keyword survives normalization. An expected
/// user-input state, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoKeywordsProvided;

impl fmt::Display for NoKeywordsProvided {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The keywords are not set, please fill the keywords separated by comma"
        )
    }
}

impl std::error::Error for NoKeywordsProvided {}

// ---------------------------------------------------------------------------
// Band thresholds
// ---------------------------------------------------------------------------

struct Bands {
    good_over: f64,
    high_over: f64,
}

// Strict inequalities on both ends: 0.75 and 3.5 themselves are very_low.
static BANDS: Bands = Bands {
    good_over: 0.75,
    high_over: 3.5,
};

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

// A token is a maximal concatenation of single letters and runs of
// word chars / digits / : . ' - / that end in a word char or digit.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:[a-z]|[\w\d:.'\-/]+[\w\d])+").unwrap());

// Word grammar applied to a keyword on its own: digits and 0-9/.:+- count
// as word-internal, as do apostrophes and hyphens.
static KEYWORD_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9/.:+'\-]+").unwrap());

static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>").unwrap()
});

static P_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?p\b[^>]*>").unwrap());

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ---------------------------------------------------------------------------
// Decoding helpers
// ---------------------------------------------------------------------------

fn percent_decode(raw: &str) -> String {
    // Invalid escapes leave the input untouched rather than erroring.
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn strip_backslashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Keyword normalization
// ---------------------------------------------------------------------------

/// Parse a raw keyword specification into trimmed, decoded entries.
/// Order is preserved, exact duplicates included; entries that trim to
/// nothing are dropped. Never errors; empty input yields an empty vec.
pub fn normalize_keywords(input: KeywordInput) -> Vec<String> {
    let entries: Vec<String> = match input {
        KeywordInput::Delimited(raw) => percent_decode(raw)
            .split(',')
            .map(str::to_string)
            .collect(),
        KeywordInput::List(items) => items.iter().map(|item| percent_decode(item)).collect(),
    };

    entries
        .iter()
        .map(|entry| strip_backslashes(&decode_entities(entry)))
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Text canonicalization
// ---------------------------------------------------------------------------

/// Reduce raw rich text to plain prose: percent/entity/backslash decoding,
/// markup stripping, single spaces at paragraph and list-item boundaries,
/// whitespace collapsed.
pub fn canonicalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = strip_backslashes(&decode_entities(&percent_decode(raw)));
    // Keep list items from running together once their tags are stripped.
    let text = text.replace("<li", " <li");
    let text = SCRIPT_STYLE_RE.replace_all(&text, "");
    let text = P_TAG_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

/// Split canonical text into word tokens. Empty tokens and the lone hyphen
/// are discarded; order is preserved.
pub fn word_list(canonical: &str) -> Vec<String> {
    if canonical.trim().is_empty() {
        return Vec::new();
    }
    TOKEN_RE
        .find_iter(canonical)
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty() && token.as_str() != "-")
        .collect()
}

// ---------------------------------------------------------------------------
// Density analysis
// ---------------------------------------------------------------------------

fn keyword_word_count(keyword: &str) -> usize {
    KEYWORD_WORD_RE.find_iter(keyword).count()
}

fn count_token_matches(keyword: &str, words: &[String]) -> usize {
    words
        .iter()
        .filter(|word| word.eq_ignore_ascii_case(keyword))
        .count()
}

fn count_phrase_matches(keyword: &str, canonical: &str) -> usize {
    // Escaping the keyword keeps user input from ever being a pattern fault.
    let pattern = Regex::new(&format!("(?i){}", regex::escape(keyword))).unwrap();
    pattern.find_iter(canonical).count()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify a density percentage into its standing band.
pub fn standing_for(occurrence_percent: f64) -> Standing {
    if occurrence_percent > BANDS.good_over && occurrence_percent < BANDS.high_over {
        Standing::VeryGood
    } else if occurrence_percent > BANDS.high_over {
        Standing::VeryHigh
    } else {
        Standing::VeryLow
    }
}

fn score_keyword(keyword: &str, words: &[String], canonical: &str) -> KeywordResult {
    let k_word_count = keyword_word_count(keyword);

    // Single words match exact tokens; phrases (and keywords with no word
    // characters at all) match as literal substrings of the canonical text,
    // so they can span token boundaries and punctuation.
    let found = if k_word_count == 1 {
        count_token_matches(keyword, words)
    } else {
        count_phrase_matches(keyword, canonical)
    };

    let occurrences = if found > 0 && !words.is_empty() {
        // Weighting by the keyword's own word count is the documented
        // behavior, even though the raw count already reflects phrase hits.
        round2(found as f64 / words.len() as f64 * 100.0 * k_word_count as f64)
    } else {
        0.0
    };

    KeywordResult {
        word: keyword.to_string(),
        occurrences,
        standing: standing_for(occurrences),
        found,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze raw rich text against a keyword specification. Returns one
/// result per surviving keyword entry, in input order, or the
/// `NoKeywordsProvided` signal when normalization leaves no keywords.
pub fn analyze(
    keywords: KeywordInput,
    raw_text: &str,
) -> Result<Vec<KeywordResult>, NoKeywordsProvided> {
    let keywords = normalize_keywords(keywords);
    if keywords.is_empty() {
        return Err(NoKeywordsProvided);
    }

    let canonical = canonicalize(raw_text);
    let words = word_list(&canonical);

    Ok(keywords
        .iter()
        .map(|keyword| score_keyword(keyword, &words, &canonical))
        .collect())
}
