//! Case-insensitive regex pattern scanning

use promptgate_core::{Error, Result, Span};
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

/// A single pattern hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Index of the pattern in its set
    pub pattern_index: usize,

    /// The matched text
    pub matched: String,

    /// Character span of the match in the scanned text
    pub span: Span,
}

/// An ordered list of compiled patterns for one cascade stage
///
/// Matching is case-insensitive and unanchored. A `RegexSet` picks out the
/// patterns that match at all; only those are searched for exact offsets.
#[derive(Debug, Clone)]
pub struct PatternSet {
    name: String,
    set: RegexSet,
    regexes: Vec<Regex>,
}

impl PatternSet {
    /// Compile `patterns` for the stage called `name`
    ///
    /// Patterns that fail to compile, or that match empty text, are rejected.
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let sources: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        let mut regexes = Vec::with_capacity(sources.len());
        for source in &sources {
            let regex = RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    Error::Config(format!("invalid pattern '{}' in {}: {}", source, name, e))
                })?;

            if regex.is_match("") {
                return Err(Error::Config(format!(
                    "pattern '{}' in {} matches empty text",
                    source, name
                )));
            }

            regexes.push(regex);
        }

        let set = RegexSetBuilder::new(&sources)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid pattern set {}: {}", name, e)))?;

        Ok(Self { name, set, regexes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    /// Source strings of the compiled patterns, in order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.regexes.iter().map(|r| r.as_str())
    }

    /// Every non-empty match of every pattern in `text`
    ///
    /// Matches are grouped by pattern index, then ordered by position.
    pub fn scan(&self, text: &str) -> Vec<PatternMatch> {
        let hits = self.set.matches(text);
        if !hits.matched_any() {
            return Vec::new();
        }

        let offsets = CharOffsets::new(text);
        let mut matches = Vec::new();

        for index in hits.iter() {
            let regex = &self.regexes[index];
            for found in regex.find_iter(text) {
                if found.is_empty() {
                    continue;
                }
                matches.push(PatternMatch {
                    pattern_index: index,
                    matched: found.as_str().to_string(),
                    span: Span::with_label(
                        offsets.char_index(found.start()),
                        offsets.char_index(found.end()),
                        regex.as_str(),
                    ),
                });
            }
        }

        matches
    }

    /// Spans of every match in `text`
    pub fn spans(&self, text: &str) -> Vec<Span> {
        self.scan(text).into_iter().map(|m| m.span).collect()
    }
}

/// Maps byte offsets reported by `regex` to character offsets
struct CharOffsets {
    /// Byte offset of every character, `None` for ASCII text
    boundaries: Option<Vec<usize>>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let boundaries = if text.is_ascii() {
            None
        } else {
            Some(text.char_indices().map(|(i, _)| i).collect())
        };
        Self { boundaries }
    }

    /// `byte` must fall on a character boundary or at the end of the text
    fn char_index(&self, byte: usize) -> usize {
        match &self.boundaries {
            None => byte,
            Some(boundaries) => boundaries.partition_point(|&b| b < byte),
        }
    }
}
