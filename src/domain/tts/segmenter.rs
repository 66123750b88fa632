use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence terminal plus the whitespace that follows it.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("sentence regex"));

/// A slice of normalized text synthesized independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub text: String,
}

/// Split text into engine-sized segments along sentence boundaries.
///
/// Lengths are counted in chars. Sentences are packed greedily; a single
/// sentence longer than `max_len` is emitted as its own oversized segment
/// rather than cut. Concatenating the returned texts gives back `text`.
pub fn segment(text: &str, max_len: usize) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }

    if text.chars().count() <= max_len {
        return vec![Segment {
            index: 0,
            text: text.to_string(),
        }];
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in sentences(text) {
        let sentence_len = sentence.chars().count();

        if !current.is_empty() && current_len + sentence_len > max_len {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Segment { index, text })
        .collect()
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut last_end = 0;
    let mut pieces = Vec::new();

    for mat in SENTENCE_END.find_iter(text) {
        pieces.push(&text[last_end..mat.end()]);
        last_end = mat.end();
    }

    if last_end < text.len() {
        pieces.push(&text[last_end..]);
    }

    pieces.into_iter()
}
