//! Feed interleaving: decides where sponsored slots go and fills them.
//!
//! ## Slot Placement
//!
//! Content items are emitted in their original order. After every
//! `interval`-th item a slot is triggered; it fires only if
//!
//! 1. at least `min_spacing` output positions separate it from the previous
//!    ad inserted in this pass,
//! 2. fewer than `max_ads_per_session` ads were inserted in this pass, and
//! 3. `session_ad_count` plus the ads inserted in this pass is still below
//!    `max_ads_per_session`.
//!
//! Both session checks apply together, so a session that already showed ads
//! has proportionally less headroom. A fired slot that finds no eligible
//! creative stays empty and nothing is retried.

use crate::classifier::ContentSafetyClassifier;
use crate::config::{EngineConfig, FeedAdConfig};
use crate::eligibility::AdEligibilityFilter;
use crate::error::Result;
use crate::exposure::{AdInsertionContext, ExposureTracker};
use crate::model::{AdCreative, ContentItem, FeedItem};
use crate::selector::CreativeSelector;

/// Why a triggered slot did not fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotBlock {
    Spacing,
    CallCap,
    SessionCap,
}

impl SlotBlock {
    fn name(&self) -> &'static str {
        match self {
            SlotBlock::Spacing => "spacing",
            SlotBlock::CallCap => "call_cap",
            SlotBlock::SessionCap => "session_cap",
        }
    }
}

/// Inserts ads into an ordered content feed.
#[derive(Debug, Clone)]
pub struct FeedInterleaver {
    config: FeedAdConfig,
    selector: CreativeSelector,
}

impl FeedInterleaver {
    /// Creates an interleaver from pacing config and a creative selector.
    pub fn new(config: FeedAdConfig, selector: CreativeSelector) -> Self {
        Self { config, selector }
    }

    /// Builds the whole pipeline from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let filter = AdEligibilityFilter::from_config(&config.safety)?;
        Ok(Self::new(config.feed, CreativeSelector::new(filter)))
    }

    /// Creates an interleaver with default pacing and safety lists.
    pub fn with_defaults() -> Result<Self> {
        Self::from_config(&EngineConfig::default())
    }

    /// Returns the pacing configuration.
    pub fn config(&self) -> &FeedAdConfig {
        &self.config
    }

    /// Returns the sensitivity classifier used for adjacency checks.
    pub fn classifier(&self) -> &ContentSafetyClassifier {
        self.selector.filter().classifier()
    }

    /// Interleaves `ads` into `items`, recording each insertion in `exposure`.
    ///
    /// Video order and count are always preserved. Pass the same tracker to
    /// every page of a session so per-creative caps accumulate.
    pub fn insert_ads_into_feed<T>(
        &self,
        items: &[ContentItem],
        ads: &[AdCreative],
        exposure: &mut T,
    ) -> Vec<FeedItem>
    where
        T: ExposureTracker + ?Sized,
    {
        if items.is_empty() {
            return Vec::new();
        }
        if ads.is_empty() {
            return items.iter().cloned().map(FeedItem::Video).collect();
        }

        let interval = self.config.interval() as usize;
        let min_spacing = self.config.min_spacing() as usize;
        let max_ads = self.config.max_ads_per_session();
        let prior_ads = exposure.session_ad_count();

        let mut feed = Vec::with_capacity(items.len() + items.len() / interval);
        let mut last_ad_position: Option<usize> = None;
        let mut inserted: u32 = 0;

        for (i, item) in items.iter().enumerate() {
            feed.push(FeedItem::Video(item.clone()));

            if (i + 1) % interval != 0 {
                continue;
            }

            let position = feed.len();
            let too_close = last_ad_position.is_some_and(|last| position - last < min_spacing);
            let blocked = if too_close {
                Some(SlotBlock::Spacing)
            } else if inserted >= max_ads {
                Some(SlotBlock::CallCap)
            } else if prior_ads.saturating_add(inserted) >= max_ads {
                Some(SlotBlock::SessionCap)
            } else {
                None
            };

            if let Some(reason) = blocked {
                tracing::debug!(index = i, position, reason = reason.name(), "Slot skipped");
                continue;
            }

            let window = &items[i.saturating_sub(1)..(i + 2).min(items.len())];
            match self.selector.select_ad(ads, &*exposure, window, &self.config) {
                Some(ad) => {
                    feed.push(FeedItem::Ad(ad.clone()));
                    last_ad_position = Some(feed.len());
                    inserted += 1;
                    exposure.record_exposure(&ad.id);
                    tracing::debug!(
                        index = i,
                        position = feed.len(),
                        creative = %ad.id,
                        "Slot filled"
                    );
                }
                None => {
                    tracing::debug!(index = i, position, "No eligible creative for slot");
                }
            }
        }

        tracing::debug!(
            videos = items.len(),
            ads = inserted,
            prior_ads,
            "Interleaved feed"
        );
        feed
    }

    /// Interleaves a page and returns the feed with the updated context.
    pub fn interleave(
        &self,
        items: &[ContentItem],
        ads: &[AdCreative],
        mut context: AdInsertionContext,
    ) -> (Vec<FeedItem>, AdInsertionContext) {
        let feed = self.insert_ads_into_feed(items, ads, &mut context);
        (feed, context)
    }

    /// Computes placements without touching the caller's counters.
    pub fn preview(
        &self,
        items: &[ContentItem],
        ads: &[AdCreative],
        context: &AdInsertionContext,
    ) -> Vec<FeedItem> {
        let mut scratch = context.clone();
        self.insert_ads_into_feed(items, ads, &mut scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::SharedExposureTracker;
    use crate::model::count_ads;

    fn interleaver(
        interval: i64,
        spacing: i64,
        max_session: i64,
        max_creative: i64,
    ) -> FeedInterleaver {
        let config = EngineConfig {
            feed: FeedAdConfig::new(interval, spacing, max_session, max_creative).unwrap(),
            ..Default::default()
        };
        FeedInterleaver::from_config(&config).unwrap()
    }

    fn items(n: usize) -> Vec<ContentItem> {
        (1..=n)
            .map(|i| ContentItem::new(format!("v{i}"), format!("Clip {i}"), "Travel and food"))
            .collect()
    }

    fn video_ids(feed: &[FeedItem]) -> Vec<String> {
        feed.iter()
            .filter_map(FeedItem::as_video)
            .map(|v| v.id.clone())
            .collect()
    }

    fn ad_positions(feed: &[FeedItem]) -> Vec<usize> {
        feed.iter()
            .enumerate()
            .filter(|(_, item)| item.is_ad())
            .map(|(idx, _)| idx + 1)
            .collect()
    }

    fn ad_ids(feed: &[FeedItem]) -> Vec<String> {
        feed.iter()
            .filter_map(FeedItem::as_ad)
            .map(|a| a.id.clone())
            .collect()
    }

    // === Example scenarios ===

    #[test]
    fn single_creative_stops_at_its_cap() {
        let engine = interleaver(5, 3, 8, 2);
        let ads = vec![AdCreative::new("a1", "Sneakers").with_priority(1)];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&items(20), &ads, &mut ctx);

        assert_eq!(feed.len(), 22);
        assert_eq!(count_ads(&feed), 2);
        assert_eq!(ad_positions(&feed), vec![6, 12]);
        assert_eq!(ctx.session_exposure("a1"), 2);
    }

    #[test]
    fn equal_exposure_picks_higher_priority() {
        let engine = interleaver(5, 3, 1, 2);
        let ads = vec![
            AdCreative::new("a2", "Coffee").with_priority(1),
            AdCreative::new("a1", "Sneakers").with_priority(5),
        ];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&items(5), &ads, &mut ctx);

        assert_eq!(ad_ids(&feed), vec!["a1"]);
    }

    #[test]
    fn restricted_ad_skipped_next_to_cartoon() {
        let engine = interleaver(2, 0, 8, 2);
        let content = vec![
            ContentItem::new("v1", "Morning news", ""),
            ContentItem::new("v2", "Cartoon hour", ""),
        ];
        let ads = vec![AdCreative::new("a1", "Jackpot").with_interest("gambling")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&content, &ads, &mut ctx);

        assert_eq!(count_ads(&feed), 0);
        assert_eq!(video_ids(&feed), vec!["v1", "v2"]);
        assert_eq!(ctx.session_exposure("a1"), 0);
    }

    // === Edge cases ===

    #[test]
    fn empty_items_yield_empty_feed() {
        let engine = interleaver(1, 0, 8, 2);
        let ads = vec![AdCreative::new("a1", "Sneakers")];
        let mut ctx = AdInsertionContext::new();
        assert!(engine.insert_ads_into_feed(&[], &ads, &mut ctx).is_empty());
    }

    #[test]
    fn empty_ads_wrap_every_item() {
        let engine = interleaver(1, 0, 8, 2);
        let mut ctx = AdInsertionContext::new();
        let feed = engine.insert_ads_into_feed(&items(4), &[], &mut ctx);
        assert_eq!(feed.len(), 4);
        assert_eq!(video_ids(&feed), vec!["v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn all_inactive_inserts_nothing() {
        let engine = interleaver(1, 0, 100, 100);
        let ads = vec![
            AdCreative::new("a1", "").with_active(false),
            AdCreative::new("a2", "").with_active(false),
        ];
        let mut ctx = AdInsertionContext::new();
        let feed = engine.insert_ads_into_feed(&items(10), &ads, &mut ctx);
        assert_eq!(count_ads(&feed), 0);
        assert!(ctx.session_exposure.is_empty());
    }

    #[test]
    fn zero_session_cap_inserts_nothing() {
        let engine = interleaver(1, 0, 0, 5);
        let ads = vec![AdCreative::new("a1", "Sneakers")];
        let mut ctx = AdInsertionContext::new();
        let feed = engine.insert_ads_into_feed(&items(6), &ads, &mut ctx);
        assert_eq!(count_ads(&feed), 0);
    }

    #[test]
    fn unfilled_slot_does_not_advance_spacing() {
        let engine = interleaver(1, 2, 8, 5);
        let content = vec![
            ContentItem::new("v1", "Nursery rhymes", ""),
            ContentItem::new("v2", "Car review", ""),
            ContentItem::new("v3", "Car review", ""),
            ContentItem::new("v4", "Car review", ""),
        ];
        let ads = vec![AdCreative::new("a1", "Craft beer").with_interest("alcohol")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&content, &ads, &mut ctx);

        // Slots after v1 and v2 see v1 in their window; v3 is the first clear one.
        assert_eq!(ad_positions(&feed), vec![4]);
        assert_eq!(video_ids(&feed), vec!["v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn adjacency_window_includes_next_item() {
        let engine = interleaver(1, 0, 8, 5);
        let content = vec![
            ContentItem::new("v1", "Car review", ""),
            ContentItem::new("v2", "Kids crafts", ""),
        ];
        let ads = vec![AdCreative::new("a1", "Online dating")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&content, &ads, &mut ctx);

        assert_eq!(count_ads(&feed), 0);
    }

    #[test]
    fn adjacency_window_excludes_items_two_away() {
        let engine = interleaver(3, 0, 8, 5);
        let content = vec![
            ContentItem::new("v1", "Kids crafts", ""),
            ContentItem::new("v2", "Car review", ""),
            ContentItem::new("v3", "Car review", ""),
            ContentItem::new("v4", "Car review", ""),
        ];
        let ads = vec![AdCreative::new("a1", "Online dating")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&content, &ads, &mut ctx);

        assert_eq!(ad_positions(&feed), vec![4]);
    }

    #[test]
    fn unrestricted_ad_fills_slot_next_to_sensitive_content() {
        let engine = interleaver(1, 0, 1, 5);
        let content = vec![ContentItem::new("v1", "Cartoon hour", "")];
        let ads = vec![
            AdCreative::new("a1", "Jackpot").with_interest("gambling").with_priority(9),
            AdCreative::new("a2", "Juice boxes"),
        ];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&content, &ads, &mut ctx);

        assert_eq!(ad_ids(&feed), vec!["a2"]);
    }

    // === Properties ===

    #[test]
    fn video_order_and_count_preserved() {
        let engine = interleaver(2, 1, 50, 50);
        let ads = vec![AdCreative::new("a1", ""), AdCreative::new("a2", "")];
        let content = items(17);
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&content, &ads, &mut ctx);

        let expected: Vec<String> = content.iter().map(|c| c.id.clone()).collect();
        assert_eq!(video_ids(&feed), expected);
        assert_eq!(feed.len(), content.len() + count_ads(&feed));
    }

    #[test]
    fn ads_respect_min_spacing() {
        for spacing in 0..6 {
            let engine = interleaver(1, spacing, 100, 100);
            let ads = vec![AdCreative::new("a1", ""), AdCreative::new("a2", "")];
            let mut ctx = AdInsertionContext::new();

            let feed = engine.insert_ads_into_feed(&items(30), &ads, &mut ctx);
            let positions = ad_positions(&feed);

            assert!(!positions.is_empty());
            for pair in positions.windows(2) {
                assert!(
                    pair[1] - pair[0] >= spacing as usize,
                    "spacing {spacing}: ads at {pair:?}"
                );
            }
        }
    }

    #[test]
    fn spacing_blocks_adjacent_triggers() {
        let engine = interleaver(1, 3, 100, 100);
        let ads = vec![AdCreative::new("a1", "")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&items(8), &ads, &mut ctx);

        // Ad after v1 at 2; next trigger allowed once the video position is 3 past it.
        assert_eq!(ad_positions(&feed), vec![2, 6, 10]);
    }

    #[test]
    fn per_creative_cap_holds_after_call() {
        let engine = interleaver(1, 0, 100, 3);
        let ads = vec![
            AdCreative::new("a1", "").with_priority(3),
            AdCreative::new("a2", "").with_priority(2),
        ];
        let mut ctx = AdInsertionContext::new().with_session_exposure("a2", 1);

        let feed = engine.insert_ads_into_feed(&items(20), &ads, &mut ctx);

        for id in ad_ids(&feed) {
            assert!(ctx.session_exposure(&id) <= 3);
        }
        assert_eq!(count_ads(&feed), 5);
    }

    #[test]
    fn rotation_alternates_equal_creatives() {
        let engine = interleaver(1, 0, 4, 10);
        let ads = vec![AdCreative::new("a1", ""), AdCreative::new("a2", "")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&items(4), &ads, &mut ctx);

        assert_eq!(ad_ids(&feed), vec!["a1", "a2", "a1", "a2"]);
    }

    #[test]
    fn per_call_cap_limits_insertions() {
        let engine = interleaver(1, 0, 3, 100);
        let ads = vec![AdCreative::new("a1", "")];
        let mut ctx = AdInsertionContext::new();

        let feed = engine.insert_ads_into_feed(&items(10), &ads, &mut ctx);

        assert_eq!(count_ads(&feed), 3);
    }

    #[test]
    fn prior_session_ads_reduce_headroom() {
        let engine = interleaver(1, 0, 8, 100);
        let ads = vec![AdCreative::new("a1", "")];
        let mut ctx = AdInsertionContext::new().with_session_ad_count(5);

        let feed = engine.insert_ads_into_feed(&items(20), &ads, &mut ctx);

        assert_eq!(count_ads(&feed), 3);
        assert_eq!(ctx.session_ad_count, 5);
    }

    #[test]
    fn exhausted_session_inserts_nothing() {
        let engine = interleaver(1, 0, 8, 100);
        let ads = vec![AdCreative::new("a1", "")];
        let mut ctx = AdInsertionContext::new().with_session_ad_count(12);

        let feed = engine.insert_ads_into_feed(&items(10), &ads, &mut ctx);

        assert_eq!(count_ads(&feed), 0);
    }

    #[test]
    fn identical_inputs_are_deterministic() {
        let engine = interleaver(3, 2, 6, 2);
        let ads = vec![
            AdCreative::new("a1", "").with_priority(1),
            AdCreative::new("a2", "").with_priority(1),
            AdCreative::new("a3", "Casino").with_priority(4),
        ];
        let content = items(25);

        let (first, _) = engine.interleave(&content, &ads, AdInsertionContext::new());
        let (second, _) = engine.interleave(&content, &ads, AdInsertionContext::new());

        assert_eq!(first, second);
    }

    // === Session state ===

    #[test]
    fn caps_accumulate_across_pages() {
        let engine = interleaver(5, 3, 8, 2);
        let ads = vec![AdCreative::new("a1", "")];
        let mut ctx = AdInsertionContext::new();

        let page1 = engine.insert_ads_into_feed(&items(5), &ads, &mut ctx);
        let page2 = engine.insert_ads_into_feed(&items(5), &ads, &mut ctx);
        let page3 = engine.insert_ads_into_feed(&items(5), &ads, &mut ctx);

        assert_eq!(count_ads(&page1), 1);
        assert_eq!(count_ads(&page2), 1);
        assert_eq!(count_ads(&page3), 0);
        assert_eq!(ctx.session_exposure("a1"), 2);
    }

    #[test]
    fn interleave_returns_updated_context() {
        let engine = interleaver(2, 0, 8, 5);
        let ads = vec![AdCreative::new("a1", "")];

        let (feed, ctx) = engine.interleave(&items(6), &ads, AdInsertionContext::new());

        assert_eq!(count_ads(&feed), 3);
        assert_eq!(ctx.session_exposure("a1"), 3);
    }

    #[test]
    fn preview_leaves_context_untouched() {
        let engine = interleaver(2, 0, 8, 5);
        let ads = vec![AdCreative::new("a1", "")];
        let ctx = AdInsertionContext::new().with_session_exposure("a1", 1);

        let previewed = engine.preview(&items(6), &ads, &ctx);
        let (committed, updated) = engine.interleave(&items(6), &ads, ctx.clone());

        assert_eq!(previewed, committed);
        assert_eq!(ctx.session_exposure("a1"), 1);
        assert_eq!(updated.session_exposure("a1"), 4);
    }

    #[test]
    fn shared_tracker_records_insertions() {
        let engine = interleaver(1, 0, 8, 2);
        let ads = vec![AdCreative::new("a1", ""), AdCreative::new("a2", "")];
        let tracker = SharedExposureTracker::default();
        let mut handle = tracker.clone();

        let feed = engine.insert_ads_into_feed(&items(10), &ads, &mut handle);

        assert_eq!(count_ads(&feed), 4);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.session_exposure("a1"), 2);
        assert_eq!(snapshot.session_exposure("a2"), 2);
    }

    #[test]
    fn works_through_trait_object() {
        let engine = interleaver(1, 0, 8, 1);
        let ads = vec![AdCreative::new("a1", "")];
        let mut ctx = AdInsertionContext::new();
        let tracker: &mut dyn ExposureTracker = &mut ctx;

        let feed = engine.insert_ads_into_feed(&items(3), &ads, tracker);

        assert_eq!(count_ads(&feed), 1);
        assert_eq!(ctx.session_exposure("a1"), 1);
    }

    #[test]
    fn default_pipeline_uses_default_safety_lists() {
        let engine = FeedInterleaver::with_defaults().unwrap();
        assert_eq!(engine.config(), &FeedAdConfig::default());
        assert!(engine
            .classifier()
            .is_sensitive(&ContentItem::new("v1", "Sesame Street", "")));
    }
}
