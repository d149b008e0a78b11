//! Core metric calculator: channel summaries, rankings, distributions
//! and performance tiers over a slice of videos.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{MetricSet, VideoRecord, WEEKDAY_NAMES};
use crate::services::{mean, population_std, quantile};

/// Channel-level aggregates over the analysed videos.
///
/// Rate averages are means over the videos where the rate is defined;
/// None when no video defines it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_videos: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_impressions: u64,
    pub total_subscribers_gained: u64,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub avg_engagement_rate: Option<f64>,
    pub avg_proxy_ctr: Option<f64>,
    pub avg_conversion_rate: Option<f64>,
}

/// Key used to rank videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Views,
    Likes,
    Comments,
    EngagementRate,
}

/// One entry of a top-N ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoHighlight {
    pub id: crate::api::VideoId,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub engagement_rate: Option<f64>,
}

/// Aggregates for one publish weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPerformance {
    pub weekday: String,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_engagement_rate: Option<f64>,
}

/// Aggregates for one publish hour (0..=23).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourPerformance {
    pub hour: u32,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_engagement_rate: Option<f64>,
}

/// Distribution of defined engagement rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementDistribution {
    pub sample_count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierInfo {
    pub min_views: f64,
    pub count: usize,
}

/// View-count tiers cut at the 75th, 50th and 25th percentiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTiers {
    pub viral: TierInfo,
    pub good: TierInfo,
    pub average: TierInfo,
    pub low: TierInfo,
}

pub fn compute_summary(videos: &[VideoRecord]) -> SummaryStats {
    let total_videos = videos.len();
    let total_views: u64 = videos.iter().map(|v| v.views).sum();
    let total_likes: u64 = videos.iter().map(|v| v.likes).sum();
    let total_comments: u64 = videos.iter().map(|v| v.comments).sum();
    let total_impressions: u64 = videos.iter().filter_map(|v| v.impressions).sum();
    let total_subscribers_gained: u64 =
        videos.iter().filter_map(|v| v.subscribers_gained).sum();

    let count = total_videos.max(1) as f64;
    let engagement: Vec<f64> = videos.iter().filter_map(|v| v.engagement_rate()).collect();
    let ctr: Vec<f64> = videos.iter().filter_map(|v| v.proxy_ctr()).collect();
    let conversion: Vec<f64> = videos.iter().filter_map(|v| v.conversion_rate()).collect();

    SummaryStats {
        total_videos,
        total_views,
        total_likes,
        total_comments,
        total_impressions,
        total_subscribers_gained,
        avg_views: total_views as f64 / count,
        avg_likes: total_likes as f64 / count,
        avg_comments: total_comments as f64 / count,
        avg_engagement_rate: mean(&engagement),
        avg_proxy_ctr: mean(&ctr),
        avg_conversion_rate: mean(&conversion),
    }
}

/// Rank value for an undefined engagement rate; defined rates are never
/// negative, so this sorts below all of them.
const UNDEFINED_RATE_RANK: f64 = -1.0;

fn sort_value(video: &VideoRecord, key: SortKey) -> f64 {
    match key {
        SortKey::Views => video.views as f64,
        SortKey::Likes => video.likes as f64,
        SortKey::Comments => video.comments as f64,
        SortKey::EngagementRate => video.engagement_rate().unwrap_or(UNDEFINED_RATE_RANK),
    }
}

/// Top `n` videos by the given key, descending.
pub fn top_videos(videos: &[VideoRecord], key: SortKey, n: usize) -> Vec<VideoHighlight> {
    let mut sorted: Vec<&VideoRecord> = videos.iter().collect();
    sorted.sort_by(|a, b| {
        sort_value(b, key)
            .partial_cmp(&sort_value(a, key))
            .unwrap_or(Ordering::Equal)
    });
    sorted.into_iter().take(n).map(highlight).collect()
}

/// Bottom `n` videos by the given key, ascending.
pub fn bottom_videos(videos: &[VideoRecord], key: SortKey, n: usize) -> Vec<VideoHighlight> {
    let mut sorted: Vec<&VideoRecord> = videos.iter().collect();
    sorted.sort_by(|a, b| {
        sort_value(a, key)
            .partial_cmp(&sort_value(b, key))
            .unwrap_or(Ordering::Equal)
    });
    sorted.into_iter().take(n).map(highlight).collect()
}

fn highlight(video: &VideoRecord) -> VideoHighlight {
    VideoHighlight {
        id: video.id.clone(),
        title: video.title.clone(),
        published_at: video.published_at,
        views: video.views,
        likes: video.likes,
        comments: video.comments,
        engagement_rate: video.engagement_rate(),
    }
}

/// Per-weekday aggregates, Monday-first, only for weekdays with uploads.
pub fn day_performance(videos: &[VideoRecord]) -> Vec<DayPerformance> {
    let mut by_day: HashMap<usize, Vec<&VideoRecord>> = HashMap::new();
    for video in videos {
        by_day
            .entry(video.publish_weekday().num_days_from_monday() as usize)
            .or_default()
            .push(video);
    }

    let mut out = Vec::new();
    for (idx, name) in WEEKDAY_NAMES.iter().enumerate() {
        if let Some(group) = by_day.get(&idx) {
            let views: Vec<f64> = group.iter().map(|v| v.views as f64).collect();
            let engagement: Vec<f64> =
                group.iter().filter_map(|v| v.engagement_rate()).collect();
            out.push(DayPerformance {
                weekday: name.to_string(),
                video_count: group.len(),
                avg_views: mean(&views).unwrap_or(0.0),
                avg_engagement_rate: mean(&engagement),
            });
        }
    }
    out
}

/// Per-hour aggregates, ascending hour, only for hours with uploads.
pub fn hour_performance(videos: &[VideoRecord]) -> Vec<HourPerformance> {
    let mut by_hour: HashMap<u32, Vec<&VideoRecord>> = HashMap::new();
    for video in videos {
        by_hour.entry(video.publish_hour()).or_default().push(video);
    }

    let mut out = Vec::new();
    for hour in 0..24 {
        if let Some(group) = by_hour.get(&hour) {
            let views: Vec<f64> = group.iter().map(|v| v.views as f64).collect();
            let engagement: Vec<f64> =
                group.iter().filter_map(|v| v.engagement_rate()).collect();
            out.push(HourPerformance {
                hour,
                video_count: group.len(),
                avg_views: mean(&views).unwrap_or(0.0),
                avg_engagement_rate: mean(&engagement),
            });
        }
    }
    out
}

/// Distribution of engagement rates over the videos where the rate is
/// defined. None when no video has a defined rate.
pub fn engagement_distribution(videos: &[VideoRecord]) -> Option<EngagementDistribution> {
    let rates: Vec<f64> = videos.iter().filter_map(|v| v.engagement_rate()).collect();
    if rates.is_empty() {
        return None;
    }
    let min = rates.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(EngagementDistribution {
        sample_count: rates.len(),
        mean: mean(&rates)?,
        median: quantile(&rates, 0.5)?,
        std_dev: population_std(&rates)?,
        min,
        max,
        p25: quantile(&rates, 0.25)?,
        p75: quantile(&rates, 0.75)?,
    })
}

/// Cut videos into view-count tiers at the 75th/50th/25th percentiles.
pub fn performance_tiers(videos: &[VideoRecord]) -> Option<PerformanceTiers> {
    if videos.is_empty() {
        return None;
    }
    let views: Vec<f64> = videos.iter().map(|v| v.views as f64).collect();
    let q75 = quantile(&views, 0.75)?;
    let q50 = quantile(&views, 0.5)?;
    let q25 = quantile(&views, 0.25)?;

    let tier = |min: f64, max: Option<f64>| TierInfo {
        min_views: min,
        count: views
            .iter()
            .filter(|v| **v >= min && max.map(|m| **v < m).unwrap_or(true))
            .count(),
    };

    Some(PerformanceTiers {
        viral: tier(q75, None),
        good: tier(q50, Some(q75)),
        average: tier(q25, Some(q50)),
        low: TierInfo {
            min_views: 0.0,
            count: views.iter().filter(|v| **v < q25).count(),
        },
    })
}

/// Derived metric set for every video.
pub fn compute_metric_sets(videos: &[VideoRecord], now: DateTime<Utc>) -> Vec<MetricSet> {
    videos.iter().map(|v| MetricSet::compute(v, now)).collect()
}
