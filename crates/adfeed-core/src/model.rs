//! Content, creative, and feed item types.

use serde::{Deserialize, Serialize};

/// A content item supplied by the upstream feed.
///
/// Only `title` and `description` are inspected, and only for brand-safety
/// heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier.
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

impl ContentItem {
    /// Creates a new content item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Returns the lower-cased text used for keyword heuristics.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// An ad creative from the serving backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCreative {
    /// Unique identifier.
    pub id: String,
    /// Whether the creative may be served.
    pub active: bool,
    /// Selection priority; higher wins ties on exposure.
    #[serde(default)]
    pub priority: i32,
    /// Interest tags the campaign targets.
    #[serde(default)]
    pub target_interests: Vec<String>,
    /// Display title.
    #[serde(default)]
    pub title: String,
}

impl AdCreative {
    /// Creates an active creative with priority 0 and no interest tags.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: true,
            priority: 0,
            target_interests: Vec::new(),
            title: title.into(),
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether the creative is active.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Adds a target interest tag.
    pub fn with_interest(mut self, interest: impl Into<String>) -> Self {
        self.target_interests.push(interest.into());
        self
    }
}

/// One entry of the interleaved output feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FeedItem {
    /// A content item, in its original relative order.
    Video(ContentItem),
    /// A sponsored slot.
    Ad(AdCreative),
}

impl FeedItem {
    /// Returns true if this is a sponsored slot.
    pub fn is_ad(&self) -> bool {
        matches!(self, FeedItem::Ad(_))
    }

    /// Returns the content item, if this is a video.
    pub fn as_video(&self) -> Option<&ContentItem> {
        match self {
            FeedItem::Video(item) => Some(item),
            FeedItem::Ad(_) => None,
        }
    }

    /// Returns the creative, if this is an ad.
    pub fn as_ad(&self) -> Option<&AdCreative> {
        match self {
            FeedItem::Ad(ad) => Some(ad),
            FeedItem::Video(_) => None,
        }
    }
}

/// Counts the sponsored slots in a feed.
pub fn count_ads(feed: &[FeedItem]) -> usize {
    feed.iter().filter(|item| item.is_ad()).count()
}
