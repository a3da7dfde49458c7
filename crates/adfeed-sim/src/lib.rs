//! Scenario loading and paged simulation for the adfeed engine.
//!
//! A scenario bundles engine config, the content feed, the ad pool, and the
//! session's starting exposure. The simulator splits the feed into pages and
//! runs each through one [`FeedInterleaver`] with a single shared context,
//! the way a client paginating a feed would.

use std::path::Path;

use adfeed_core::{
    count_ads, AdCreative, AdInsertionContext, ContentItem, EngineConfig, FeedInterleaver,
    FeedItem,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Input document for a simulation run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Engine configuration.
    pub config: EngineConfig,
    /// Ranked content feed.
    pub items: Vec<ContentItem>,
    /// Candidate ad pool.
    pub ads: Vec<AdCreative>,
    /// Starting exposure for the session, read from the top-level
    /// `session_ad_count`, `session_exposure`, and `cross_session_exposure` keys.
    #[serde(flatten)]
    pub context: AdInsertionContext,
}

impl Scenario {
    /// Parses a scenario from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scenario")
    }

    /// Reads a scenario file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json_str(&contents)
    }
}

/// How pages are run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationOptions {
    /// Content items per page; 0 runs the whole feed as one page.
    pub page_size: usize,
    /// Compute placements without carrying exposure between pages.
    pub preview: bool,
    /// Add each page's ads to `session_ad_count` before the next page, as an
    /// impression tracker would once the page is rendered.
    pub track_impressions: bool,
}

/// One simulated page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Zero-based page number.
    pub page: usize,
    /// Ads inserted on this page.
    pub ads: usize,
    /// Interleaved page content.
    pub feed: Vec<FeedItem>,
}

/// Result of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Per-page output.
    pub pages: Vec<PageReport>,
    /// Content items processed.
    pub videos: usize,
    /// Ads inserted across all pages.
    pub ads: usize,
    /// Ads per content item.
    pub fill_rate: f64,
    /// Session exposure after the run.
    pub context: AdInsertionContext,
}

/// Runs scenarios through the engine.
pub struct Simulator {
    engine: FeedInterleaver,
    options: SimulationOptions,
}

impl Simulator {
    /// Builds a simulator for the scenario's engine config.
    pub fn new(config: &EngineConfig, options: SimulationOptions) -> Result<Self> {
        let engine =
            FeedInterleaver::from_config(config).context("Invalid engine configuration")?;
        Ok(Self { engine, options })
    }

    /// Pages the scenario feed through the engine.
    pub fn run(&self, scenario: &Scenario) -> SimulationReport {
        let page_size = if self.options.page_size == 0 {
            scenario.items.len().max(1)
        } else {
            self.options.page_size
        };

        let mut context = scenario.context.clone();
        let mut pages = Vec::new();

        for (page, chunk) in scenario.items.chunks(page_size).enumerate() {
            let feed = if self.options.preview {
                self.engine.preview(chunk, &scenario.ads, &context)
            } else {
                self.engine
                    .insert_ads_into_feed(chunk, &scenario.ads, &mut context)
            };
            let ads = count_ads(&feed);

            if self.options.track_impressions && !self.options.preview {
                context.session_ad_count = context
                    .session_ad_count
                    .saturating_add(u32::try_from(ads).unwrap_or(u32::MAX));
            }

            tracing::info!(page, videos = chunk.len(), ads, "Simulated page");
            pages.push(PageReport { page, ads, feed });
        }

        let videos = scenario.items.len();
        let ads: usize = pages.iter().map(|p| p.ads).sum();
        let fill_rate = if videos == 0 {
            0.0
        } else {
            ads as f64 / videos as f64
        };

        SimulationReport {
            pages,
            videos,
            ads,
            fill_rate,
            context,
        }
    }
}
