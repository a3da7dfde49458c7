//! Sensitive-content detection for brand-safety adjacency.

use super::KeywordSet;
use crate::config::SafetyConfig;
use crate::error::Result;
use crate::model::ContentItem;

/// Flags content items that restricted ads must not appear next to
/// (children's programming, school material, and similar).
///
/// Pure keyword heuristic over `title + " " + description`, lower-cased.
#[derive(Debug, Clone)]
pub struct ContentSafetyClassifier {
    keywords: KeywordSet,
}

impl ContentSafetyClassifier {
    /// Creates a classifier from an explicit keyword list.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            keywords: KeywordSet::new(keywords)?,
        })
    }

    /// Creates a classifier from the safety configuration.
    pub fn from_config(config: &SafetyConfig) -> Result<Self> {
        Self::new(&config.sensitive_keywords)
    }

    /// Returns true if the item contains any sensitivity keyword.
    pub fn is_sensitive(&self, item: &ContentItem) -> bool {
        self.keywords.matches_lowercase(&item.searchable_text())
    }

    /// Returns the first keyword (in list order) found in the item.
    pub fn matched_keyword(&self, item: &ContentItem) -> Option<&str> {
        self.keywords.find_in_lowercase(&item.searchable_text())
    }

    /// Returns true if any item in the window is sensitive.
    pub fn any_sensitive<'a, I>(&self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a ContentItem>,
    {
        items.into_iter().any(|item| self.is_sensitive(item))
    }
}
