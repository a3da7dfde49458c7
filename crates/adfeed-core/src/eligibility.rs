//! Per-slot ad eligibility.
//!
//! ## Rules
//!
//! 1. Inactive creatives are dropped
//! 2. Creatives at or above `max_per_creative` session showings are dropped
//! 3. If any item in the slot's adjacency window is sensitive, creatives in a
//!    restricted category are dropped
//!
//! Surviving creatives keep their pool order.

use crate::classifier::{ContentSafetyClassifier, RestrictedCategoryMatcher};
use crate::config::{FeedAdConfig, SafetyConfig};
use crate::error::Result;
use crate::exposure::ExposureTracker;
use crate::model::{AdCreative, ContentItem};

/// Filters an ad pool down to the creatives allowed in one slot.
#[derive(Debug, Clone)]
pub struct AdEligibilityFilter {
    classifier: ContentSafetyClassifier,
    restricted: RestrictedCategoryMatcher,
}

impl AdEligibilityFilter {
    /// Creates a filter from its two brand-safety classifiers.
    pub fn new(
        classifier: ContentSafetyClassifier,
        restricted: RestrictedCategoryMatcher,
    ) -> Self {
        Self {
            classifier,
            restricted,
        }
    }

    /// Builds both classifiers from the safety configuration.
    pub fn from_config(config: &SafetyConfig) -> Result<Self> {
        Ok(Self::new(
            ContentSafetyClassifier::from_config(config)?,
            RestrictedCategoryMatcher::from_config(config)?,
        ))
    }

    /// Returns the sensitivity classifier.
    pub fn classifier(&self) -> &ContentSafetyClassifier {
        &self.classifier
    }

    /// Returns the ads eligible for a slot surrounded by `adjacent_items`.
    pub fn filter<'a, T>(
        &self,
        ads: &'a [AdCreative],
        exposure: &T,
        adjacent_items: &[ContentItem],
        config: &FeedAdConfig,
    ) -> Vec<&'a AdCreative>
    where
        T: ExposureTracker + ?Sized,
    {
        let under_cap: Vec<&AdCreative> = ads
            .iter()
            .filter(|ad| {
                if !ad.active {
                    tracing::trace!(creative = %ad.id, "Dropped inactive creative");
                    return false;
                }
                let shown = exposure.session_exposure(&ad.id);
                if shown >= config.max_per_creative() {
                    tracing::trace!(creative = %ad.id, shown, "Dropped capped creative");
                    return false;
                }
                true
            })
            .collect();

        if under_cap.is_empty() || !self.classifier.any_sensitive(adjacent_items) {
            return under_cap;
        }
        let keyword = adjacent_items
            .iter()
            .find_map(|item| self.classifier.matched_keyword(item))
            .unwrap_or_default();

        under_cap
            .into_iter()
            .filter(|ad| match self.restricted.category_of(ad) {
                Some(category) => {
                    tracing::trace!(
                        creative = %ad.id,
                        category,
                        keyword,
                        "Dropped restricted creative next to sensitive content"
                    );
                    false
                }
                None => true,
            })
            .collect()
    }
}
