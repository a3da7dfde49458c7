//! Engine configuration: slot pacing, frequency caps, and brand-safety lists.
//!
//! [`FeedAdConfig`] can only be obtained through validating constructors
//! (including deserialization), so an engine never sees a zero interval or a
//! negative count.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Final tie-break applied when exposure and priority are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order the ad pool was supplied in.
    #[default]
    PoolOrder,
    /// Prefer the lexicographically smallest creative id.
    CreativeId,
}

/// Pacing and capping parameters for slot placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeedAdConfig")]
pub struct FeedAdConfig {
    interval: u32,
    min_spacing: u32,
    max_ads_per_session: u32,
    max_per_creative: u32,
    tie_break: TieBreak,
}

impl FeedAdConfig {
    /// Creates a validated configuration.
    ///
    /// Rejects `interval < 1` and any negative count.
    pub fn new(
        interval: i64,
        min_spacing: i64,
        max_ads_per_session: i64,
        max_per_creative: i64,
    ) -> Result<Self> {
        if interval < 1 {
            return Err(ConfigurationError::InvalidInterval(interval));
        }

        Ok(Self {
            interval: to_count("interval", interval)?,
            min_spacing: to_count("min_spacing", min_spacing)?,
            max_ads_per_session: to_count("max_ads_per_session", max_ads_per_session)?,
            max_per_creative: to_count("max_per_creative", max_per_creative)?,
            tie_break: TieBreak::default(),
        })
    }

    /// Sets the final tie-break rule.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// A slot is considered after every `interval` content items.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Minimum distance, in output positions, between two slots.
    pub fn min_spacing(&self) -> u32 {
        self.min_spacing
    }

    /// Session-wide cap on inserted ads.
    pub fn max_ads_per_session(&self) -> u32 {
        self.max_ads_per_session
    }

    /// Per-creative session frequency cap.
    pub fn max_per_creative(&self) -> u32 {
        self.max_per_creative
    }

    /// Final tie-break rule for creative selection.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}

impl Default for FeedAdConfig {
    fn default() -> Self {
        Self {
            interval: 5,
            min_spacing: 3,
            max_ads_per_session: 8,
            max_per_creative: 2,
            tie_break: TieBreak::PoolOrder,
        }
    }
}

fn to_count(field: &'static str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(ConfigurationError::NegativeValue { field, value });
    }
    u32::try_from(value).map_err(|_| ConfigurationError::OutOfRange { field, value })
}

/// Unvalidated wire form of [`FeedAdConfig`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawFeedAdConfig {
    interval: i64,
    min_spacing: i64,
    max_ads_per_session: i64,
    max_per_creative: i64,
    #[serde(default)]
    tie_break: TieBreak,
}

impl TryFrom<RawFeedAdConfig> for FeedAdConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawFeedAdConfig) -> Result<Self> {
        Ok(FeedAdConfig::new(
            raw.interval,
            raw.min_spacing,
            raw.max_ads_per_session,
            raw.max_per_creative,
        )?
        .with_tie_break(raw.tie_break))
    }
}

/// Keyword lists for brand-safety adjacency checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Substrings marking a content item as sensitive (e.g., children's content).
    pub sensitive_keywords: Vec<String>,
    /// Substrings marking a creative as a restricted category.
    pub restricted_categories: Vec<String>,
}

impl SafetyConfig {
    /// Default sensitivity keywords.
    pub fn default_sensitive_keywords() -> Vec<String> {
        [
            "kids",
            "children",
            "toddler",
            "cartoon",
            "nursery",
            "cocomelon",
            "peppa pig",
            "paw patrol",
            "sesame street",
            "bluey",
            "school",
            "learning",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Default restricted ad categories.
    pub fn default_restricted_categories() -> Vec<String> {
        ["alcohol", "gambling", "casino", "betting", "dating", "political"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            sensitive_keywords: Self::default_sensitive_keywords(),
            restricted_categories: Self::default_restricted_categories(),
        }
    }
}

/// Complete engine configuration, typically delivered by remote config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Slot pacing and caps.
    pub feed: FeedAdConfig,
    /// Brand-safety keyword lists.
    pub safety: SafetyConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded engine config");
        Ok(config)
    }
}
