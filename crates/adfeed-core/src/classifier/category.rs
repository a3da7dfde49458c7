//! Restricted ad category detection.

use super::KeywordSet;
use crate::config::SafetyConfig;
use crate::error::Result;
use crate::model::AdCreative;

/// Decides whether a creative belongs to a restricted category
/// (alcohol, gambling, dating, political, ...).
///
/// A category matches when its name occurs, case-insensitively, inside any
/// of the creative's interest tags or its title.
#[derive(Debug, Clone)]
pub struct RestrictedCategoryMatcher {
    categories: KeywordSet,
}

impl RestrictedCategoryMatcher {
    /// Creates a matcher from an explicit category list.
    pub fn new<I, S>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            categories: KeywordSet::new(categories)?,
        })
    }

    /// Creates a matcher from the safety configuration.
    pub fn from_config(config: &SafetyConfig) -> Result<Self> {
        Self::new(&config.restricted_categories)
    }

    /// Returns the first restricted category the creative falls into.
    ///
    /// Interest tags are checked in order before the title.
    pub fn category_of(&self, ad: &AdCreative) -> Option<&str> {
        ad.target_interests
            .iter()
            .chain(std::iter::once(&ad.title))
            .find_map(|text| self.categories.find_in(text))
    }

    /// Returns true if the creative is in any restricted category.
    pub fn is_restricted(&self, ad: &AdCreative) -> bool {
        self.category_of(ad).is_some()
    }
}
