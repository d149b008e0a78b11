//! Domain model: videos, channel snapshots and per-video metric sets.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::api::VideoId;

/// Weekday display names, Monday-first. Index matches
/// `Weekday::num_days_from_monday`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// One published video with its lifetime counters.
///
/// `impressions` and `subscribers_gained` come from the analytics API and
/// are not always available, hence optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub impressions: Option<u64>,
    pub subscribers_gained: Option<u64>,
}

impl VideoRecord {
    /// Engagement rate in percent: (likes + comments) / views * 100.
    ///
    /// Undefined (None) when the video has zero views.
    pub fn engagement_rate(&self) -> Option<f64> {
        if self.views == 0 {
            return None;
        }
        Some((self.likes + self.comments) as f64 / self.views as f64 * 100.0)
    }

    /// Proxy click-through rate in percent: views / impressions * 100.
    ///
    /// Undefined when impressions are missing or zero.
    pub fn proxy_ctr(&self) -> Option<f64> {
        match self.impressions {
            Some(impressions) if impressions > 0 => {
                Some(self.views as f64 / impressions as f64 * 100.0)
            }
            _ => None,
        }
    }

    /// Subscriber conversion rate in percent: subscribers gained / views * 100.
    pub fn conversion_rate(&self) -> Option<f64> {
        match self.subscribers_gained {
            Some(gained) if self.views > 0 => Some(gained as f64 / self.views as f64 * 100.0),
            _ => None,
        }
    }

    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    pub fn publish_weekday(&self) -> Weekday {
        self.published_at.weekday()
    }

    pub fn publish_hour(&self) -> u32 {
        self.published_at.hour()
    }
}

/// Channel-level lifetime counters, independent of the fetched video window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelTotals {
    pub subscriber_count: u64,
    pub total_views: u64,
}

/// A point-in-time view of a channel: its totals plus the most recent
/// uploads, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub channel_name: String,
    pub totals: ChannelTotals,
    pub videos: Vec<VideoRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl ChannelSnapshot {
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }
}

/// Derived per-video metrics, computed once and reused across services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSet {
    pub video_id: VideoId,
    pub engagement_rate: Option<f64>,
    pub proxy_ctr: Option<f64>,
    pub conversion_rate: Option<f64>,
    /// Views per day since publication (full lifetime counter / age in days,
    /// age clamped to at least one day).
    pub velocity: f64,
    pub days_since_published: i64,
}

impl MetricSet {
    pub fn compute(video: &VideoRecord, now: DateTime<Utc>) -> Self {
        let days = (now - video.published_at).num_days().max(1);
        MetricSet {
            video_id: video.id.clone(),
            engagement_rate: video.engagement_rate(),
            proxy_ctr: video.proxy_ctr(),
            conversion_rate: video.conversion_rate(),
            velocity: video.views as f64 / days as f64,
            days_since_published: days,
        }
    }
}
