//! Regulation text segmenter.
//!
//! Splits the raw text of the RGPD into a validated, deduplicated,
//! ordered collection of [`Chunk`]s: recitals (`(N) ...` spans from the
//! preamble) followed by articles (`Article N ...` spans from the
//! enacting terms, which start at the `CHAPITRE I` heading).
//!
//! The extraction is pattern-driven and inherently heuristic, so the
//! marker matching lives behind one seam ([`find_spans`]) and everything
//! else — merge, threshold, ordering, validation — is plain data work.
//! [`segment`] never fails: missing markers degrade to fallbacks or
//! empty subsets, reported through [`Segmentation`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Chunk, ChunkKind};

/// Bodies at or below this many characters are rejected as extraction
/// noise (stray parenthetical numbers, truncated matches). Strictly
/// greater-than survives.
pub const MIN_BODY_CHARS: usize = 50;

/// Upper bound (exclusive) of the missing-article diagnostic range.
/// A reporting heuristic, not a contract: the source document's
/// numbering is not guaranteed contiguous or bounded by this.
const ARTICLE_RANGE_END: u32 = 100;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RECITAL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)\s").unwrap());
static CHAPTER_ONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"CHAPITRE\s+I").unwrap());
static CHAPTER_ANY: Lazy<Regex> = Lazy::new(|| Regex::new(r"CHAPITRE\s+[IVX]+").unwrap());
static ARTICLE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Article\s+(\d+)\s").unwrap());
static ARTICLE_ONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Article\s+1\s").unwrap());

/// First-article marker variants, tried in order. The first article is
/// frequently formatted irregularly (spelled-out ordinal, `1er` suffix)
/// rather than a plain numeral; `(?i)` covers the casing variants.
static FIRST_ARTICLE_VARIANTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)Article\s+premier\s").unwrap(),
        Regex::new(r"(?i)Article\s+1er\s").unwrap(),
        Regex::new(r"(?i)Article\s+1\s").unwrap(),
    ]
});

/// How the recital/article boundary was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// The `CHAPITRE I` heading was found.
    Chapter,
    /// No chapter heading; articles start at the first `Article 1`
    /// marker after the highest-numbered recital.
    AfterLastRecital,
    /// Neither heuristic matched; the whole text was scanned (degraded).
    WholeText,
}

impl std::fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryMode::Chapter => write!(f, "CHAPITRE I heading"),
            BoundaryMode::AfterLastRecital => write!(f, "after last recital (fallback)"),
            BoundaryMode::WholeText => write!(f, "whole text (degraded)"),
        }
    }
}

/// Output of one segmenter run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// All recitals (ascending by number) followed by all articles
    /// (ascending by number). Ids are globally unique.
    pub chunks: Vec<Chunk>,
    /// Which boundary heuristic located the enacting terms.
    pub boundary: BoundaryMode,
    /// Article numbers in `[1, ARTICLE_RANGE_END)` absent from the
    /// extraction. Diagnostic only — never fatal.
    pub missing_articles: Vec<u32>,
}

/// A numbered span located by [`find_spans`].
#[derive(Debug, Clone)]
pub struct Span {
    pub number: u32,
    pub body: String,
}

/// Collapse all whitespace runs to single spaces.
///
/// This normalization is a contract: every downstream pattern assumes
/// collapsed whitespace (single space between marker and body, no
/// newlines inside spans).
pub fn normalize_whitespace(raw: &str) -> String {
    WHITESPACE.replace_all(raw, " ").into_owned()
}

/// Locate every `start` marker in `text` and return one span per match.
///
/// Each span's body runs from the end of its marker to the earliest of:
/// the next start marker, the first match of any `ends` pattern after
/// the marker, or end of text. Bodies are trimmed. The marker's first
/// capture group must be the span number; matches whose number does not
/// parse are skipped rather than failing.
pub fn find_spans(text: &str, start: &Regex, ends: &[&Regex]) -> Vec<Span> {
    let starts: Vec<(usize, usize, u32)> = start
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let number = cap.get(1)?.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), number))
        })
        .collect();

    let mut spans = Vec::with_capacity(starts.len());
    for (i, &(_, body_start, number)) in starts.iter().enumerate() {
        let mut body_end = starts.get(i + 1).map_or(text.len(), |next| next.0);
        for end_re in ends {
            if let Some(m) = end_re.find_at(text, body_start) {
                if m.start() < body_end {
                    body_end = m.start();
                }
            }
        }
        spans.push(Span {
            number,
            body: text[body_start..body_end].trim().to_string(),
        });
    }
    spans
}

/// True when a body is long enough to be genuine content.
fn genuine(body: &str) -> bool {
    body.chars().count() > MIN_BODY_CHARS
}

/// Merge one numbered body into the map: the existing entry wins unless
/// the incoming body is strictly longer (a longer match means a more
/// complete extraction across overlapping boundary heuristics).
fn merge_span(map: &mut BTreeMap<u32, String>, number: u32, body: String) {
    match map.get(&number) {
        Some(existing) if body.chars().count() <= existing.chars().count() => {}
        _ => {
            map.insert(number, body);
        }
    }
}

/// Segment the regulation text into recitals and articles.
///
/// Never returns an error: malformed input yields empty subsets and a
/// degraded [`BoundaryMode`], not a failure.
pub fn segment(raw: &str) -> Segmentation {
    let text = normalize_whitespace(raw);

    // Recitals live before the enacting terms. Scanning past the chapter
    // heading would re-match parenthetical numbers inside article text
    // and break id uniqueness.
    let chapter = CHAPTER_ONE.find(&text);
    let recital_zone = &text[..chapter.map_or(text.len(), |m| m.start())];

    let mut recitals: BTreeMap<u32, String> = BTreeMap::new();
    for span in find_spans(recital_zone, &RECITAL_START, &[]) {
        if genuine(&span.body) {
            merge_span(&mut recitals, span.number, span.body);
        }
    }
    let last_recital = recitals.keys().next_back().copied();

    let (article_zone, boundary) = match chapter {
        Some(m) => (&text[m.start()..], BoundaryMode::Chapter),
        None => locate_articles_fallback(&text, last_recital),
    };

    let mut articles: BTreeMap<u32, String> = BTreeMap::new();

    // The first article seeds the map; later generic matches for number 1
    // may still override it when strictly longer.
    if let Some(body) = extract_first_article(article_zone) {
        if genuine(&body) {
            articles.insert(1, body);
        }
    }

    for span in find_spans(article_zone, &ARTICLE_START, &[&CHAPTER_ANY]) {
        if genuine(&span.body) {
            merge_span(&mut articles, span.number, span.body);
        }
    }

    let missing_articles: Vec<u32> = (1..ARTICLE_RANGE_END)
        .filter(|n| !articles.contains_key(n))
        .collect();

    // BTreeMap iteration gives ascending numbers within each kind.
    let mut chunks: Vec<Chunk> = Vec::with_capacity(recitals.len() + articles.len());
    chunks.extend(
        recitals
            .into_iter()
            .map(|(n, body)| Chunk::new(ChunkKind::Recital, n, body)),
    );
    chunks.extend(
        articles
            .into_iter()
            .map(|(n, body)| Chunk::new(ChunkKind::Article, n, body)),
    );

    Segmentation {
        chunks,
        boundary,
        missing_articles,
    }
}

/// Fallback boundary: the text after the highest-numbered recital, from
/// the first explicit `Article 1` marker onward. If that fails too, the
/// entire text is scanned.
fn locate_articles_fallback(text: &str, last_recital: Option<u32>) -> (&str, BoundaryMode) {
    if let Some(n) = last_recital {
        if let Ok(marker) = Regex::new(&format!(r"\({}\)\s", n)) {
            if let Some(m) = marker.find(text) {
                if let Some(art) = ARTICLE_ONE.find_at(text, m.end()) {
                    return (&text[art.start()..], BoundaryMode::AfterLastRecital);
                }
            }
        }
    }
    (text, BoundaryMode::WholeText)
}

/// Try the first-article marker variants in order; the first pattern
/// that matches wins. The body runs until the next explicit `Article N`
/// marker or end of text.
fn extract_first_article(zone: &str) -> Option<String> {
    for variant in FIRST_ARTICLE_VARIANTS.iter() {
        if let Some(m) = variant.find(zone) {
            let body_end = ARTICLE_START
                .find_at(zone, m.end())
                .map_or(zone.len(), |next| next.start());
            return Some(zone[m.end()..body_end].trim().to_string());
        }
    }
    None
}
