//! Text cleanup applied before synthesis.
//!
//! Markdown and HTML leftovers are read aloud literally by every engine we
//! use, and a handful of technical acronyms come out as mangled words, so
//! the text goes through a fixed sequence of rewrites first.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("link regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex"));
static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("fence regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Whole-token replacements applied after markup is gone.
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    entries: Vec<(String, String)>,
}

impl AbbreviationTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self::new([
            ("kubectl", "kube control"),
            ("2FA", "two factor authentication"),
            ("SSH", "S S H"),
            ("HTTP", "H T T P"),
            ("HTTPS", "H T T P S"),
            ("API", "A P I"),
            ("CRUD", "C R U D"),
            ("SMTP", "S M T P"),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    abbreviations: Option<(Regex, AbbreviationTable)>,
}

impl TextNormalizer {
    pub fn new(table: AbbreviationTable) -> Result<Self, regex::Error> {
        if table.is_empty() {
            return Ok(Self { abbreviations: None });
        }

        // Word boundaries keep HTTP from firing inside HTTPS, so entry order is irrelevant
        let alternation = table
            .entries
            .iter()
            .map(|(pattern, _)| regex::escape(pattern))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = Regex::new(&format!(r"\b(?:{alternation})\b"))?;

        Ok(Self {
            abbreviations: Some((matcher, table)),
        })
    }

    /// Rewrite raw input into something the engine pronounces well.
    /// Never fails; degenerate input yields an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let text = LINK.replace_all(text, "$1");
        let text = BOLD.replace_all(&text, "$1");
        let text = ITALIC.replace_all(&text, "$1");
        let text = FENCED_CODE.replace_all(&text, "");
        let text = INLINE_CODE.replace_all(&text, "$1");
        let text = TAG.replace_all(&text, "");
        let text = WHITESPACE.replace_all(&text, " ");
        let text = text.trim();

        let expanded = match &self.abbreviations {
            Some((matcher, table)) => matcher
                .replace_all(text, |caps: &regex::Captures| {
                    let token = &caps[0];
                    table
                        .entries
                        .iter()
                        .find(|(pattern, _)| pattern == token)
                        .map(|(_, replacement)| replacement.clone())
                        .unwrap_or_else(|| token.to_string())
                })
                .into_owned(),
            None => text.to_string(),
        };

        expanded.replace("...", ".").replace("--", "-")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(AbbreviationTable::default()).expect("default abbreviation table compiles")
    }
}
