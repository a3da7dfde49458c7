//! Case-insensitive multi-keyword substring matching.
//!
//! Keywords are compiled once into a [`RegexSet`] of escaped literals, so a
//! single scan answers "does any keyword occur" regardless of list size.

use regex::RegexSet;

use crate::error::Result;

/// An ordered set of keywords matched as plain substrings.
///
/// Matching is case-insensitive: keywords are lower-cased at construction and
/// callers pass lower-cased haystacks (or use [`KeywordSet::find_in`], which
/// lower-cases for them).
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
    regex_set: RegexSet,
}

impl KeywordSet {
    /// Compiles a keyword list. Empty entries are ignored.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let regex_set = RegexSet::new(keywords.iter().map(|k| regex::escape(k)))?;

        Ok(Self {
            keywords,
            regex_set,
        })
    }

    /// Returns the compiled keywords in their configured order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns true if no keywords are configured.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Returns true if any keyword occurs in an already lower-cased text.
    pub fn matches_lowercase(&self, text_lower: &str) -> bool {
        self.regex_set.is_match(text_lower)
    }

    /// Returns the first keyword, in list order, occurring in `text`.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        self.find_in_lowercase(&text.to_lowercase())
    }

    /// Like [`KeywordSet::find_in`] for an already lower-cased text.
    pub fn find_in_lowercase(&self, text_lower: &str) -> Option<&str> {
        self.regex_set
            .matches(text_lower)
            .iter()
            .next()
            .map(|idx| self.keywords[idx].as_str())
    }
}
