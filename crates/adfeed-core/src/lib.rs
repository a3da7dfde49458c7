//! Adfeed Core - ad slot placement for content feeds.
//!
//! Given an ordered list of content items and a pool of creatives, the
//! [`FeedInterleaver`] decides which positions become sponsored slots and
//! which creative fills each one, subject to pacing, frequency caps,
//! rotation fairness, and brand-safety adjacency rules.
//!
//! ```
//! use adfeed_core::{AdCreative, AdInsertionContext, ContentItem, FeedInterleaver};
//!
//! let engine = FeedInterleaver::with_defaults().unwrap();
//! let items: Vec<ContentItem> = (1..=10)
//!     .map(|i| ContentItem::new(format!("v{i}"), "Street food tour", ""))
//!     .collect();
//! let ads = vec![AdCreative::new("a1", "Running shoes")];
//! let mut context = AdInsertionContext::new();
//!
//! let feed = engine.insert_ads_into_feed(&items, &ads, &mut context);
//! assert_eq!(feed.len(), 12);
//! ```

pub mod classifier;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod exposure;
pub mod interleaver;
pub mod model;
pub mod selector;

pub use classifier::{ContentSafetyClassifier, KeywordSet, RestrictedCategoryMatcher};
pub use config::{EngineConfig, FeedAdConfig, SafetyConfig, TieBreak};
pub use eligibility::AdEligibilityFilter;
pub use error::{ConfigurationError, Result};
pub use exposure::{AdInsertionContext, ExposureTracker, SharedExposureTracker};
pub use interleaver::FeedInterleaver;
pub use model::{count_ads, AdCreative, ContentItem, FeedItem};
pub use selector::CreativeSelector;
