//! Fairness-first creative selection.
//!
//! Among eligible creatives the least-shown one this session wins; equal
//! exposure goes to the higher priority, and remaining ties to the
//! configured [`TieBreak`].

use std::cmp::{Ordering, Reverse};

use crate::config::{FeedAdConfig, TieBreak};
use crate::eligibility::AdEligibilityFilter;
use crate::exposure::ExposureTracker;
use crate::model::{AdCreative, ContentItem};

/// Picks one creative for a slot.
#[derive(Debug, Clone)]
pub struct CreativeSelector {
    filter: AdEligibilityFilter,
}

impl CreativeSelector {
    /// Creates a selector over the given eligibility filter.
    pub fn new(filter: AdEligibilityFilter) -> Self {
        Self { filter }
    }

    /// Returns the eligibility filter.
    pub fn filter(&self) -> &AdEligibilityFilter {
        &self.filter
    }

    /// Selects the creative for a slot, or `None` if nothing is eligible.
    pub fn select_ad<'a, T>(
        &self,
        ads: &'a [AdCreative],
        exposure: &T,
        adjacent_items: &[ContentItem],
        config: &FeedAdConfig,
    ) -> Option<&'a AdCreative>
    where
        T: ExposureTracker + ?Sized,
    {
        self.rank(ads, exposure, adjacent_items, config)
            .into_iter()
            .next()
    }

    /// Returns every eligible creative in selection order.
    ///
    /// The sort is stable, so with [`TieBreak::PoolOrder`] fully tied
    /// creatives keep the order they were supplied in.
    pub fn rank<'a, T>(
        &self,
        ads: &'a [AdCreative],
        exposure: &T,
        adjacent_items: &[ContentItem],
        config: &FeedAdConfig,
    ) -> Vec<&'a AdCreative>
    where
        T: ExposureTracker + ?Sized,
    {
        let mut eligible = self.filter.filter(ads, exposure, adjacent_items, config);
        let tie_break = config.tie_break();
        eligible.sort_by(|a, b| compare(a, b, exposure, tie_break));
        eligible
    }
}

fn compare<T>(a: &AdCreative, b: &AdCreative, exposure: &T, tie_break: TieBreak) -> Ordering
where
    T: ExposureTracker + ?Sized,
{
    let key = |ad: &AdCreative| (exposure.session_exposure(&ad.id), Reverse(ad.priority));

    key(a).cmp(&key(b)).then_with(|| match tie_break {
        TieBreak::PoolOrder => Ordering::Equal,
        TieBreak::CreativeId => a.id.cmp(&b.id),
    })
}
