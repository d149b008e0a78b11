//! Content pattern detector: title themes, length and duration buckets,
//! upload cadence and the engagement split.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::VideoRecord;
use crate::services::{mean, median, population_std};

/// Keyword table driving theme detection. A title may match several
/// themes; matching is case-insensitive substring search.
const THEME_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Tutorial",
        &["how to", "tutorial", "guide", "step by step", "learn"],
    ),
    ("Review", &["review", "unboxing", "honest", "worth it"]),
    ("List", &["top", "best", "ranked", "tips"]),
    (
        "Entertainment",
        &["challenge", "vlog", "storytime", "reacting", "q&a"],
    ),
    ("News", &["news", "update", "announcement"]),
    (
        "Educational",
        &["why", "what is", "explained", "science", "understanding"],
    ),
    ("Gaming", &["gaming", "gameplay", "let's play", "speedrun"]),
];

const TITLE_LENGTH_BUCKETS: &[(&str, usize, usize)] = &[
    ("Very Short (< 30)", 0, 30),
    ("Short (30-49)", 30, 50),
    ("Medium (50-69)", 50, 70),
    ("Long (70-89)", 70, 90),
    ("Very Long (>= 90)", 90, usize::MAX),
];

/// Duration buckets in seconds.
const DURATION_BUCKETS: &[(&str, u32, u32)] = &[
    ("Short (< 5 min)", 0, 300),
    ("Medium (5-15 min)", 300, 900),
    ("Long (15-30 min)", 900, 1800),
    ("Very Long (>= 30 min)", 1800, u32::MAX),
];

/// Aggregates for the videos matching one theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeStats {
    pub theme: String,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_engagement_rate: Option<f64>,
    /// Theme average views relative to the channel average, in percent.
    pub vs_channel_avg_pct: f64,
    /// Title of the best-viewed video in the theme.
    pub example_title: String,
    pub performance: String,
}

/// Aggregates for one title-length or duration bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketStats {
    pub label: String,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_engagement_rate: Option<f64>,
}

/// Cadence of uploads derived from gaps between consecutive publish dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConsistency {
    pub avg_gap_days: f64,
    pub gap_std_days: f64,
    pub uploads_per_week: f64,
    pub rating: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

/// High vs low engagement halves, split at the median engagement rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementSplit {
    pub median_engagement_rate: f64,
    pub high: GroupStats,
    pub low: GroupStats,
    /// How much more the high half is viewed, in percent. None when the
    /// low half averages zero views.
    pub views_lift_pct: Option<f64>,
}

/// Themes detected in the video titles, ordered by average views
/// descending. Themes nothing matches are omitted.
pub fn detect_themes(videos: &[VideoRecord]) -> Vec<ThemeStats> {
    let all_views: Vec<f64> = videos.iter().map(|v| v.views as f64).collect();
    let channel_avg = mean(&all_views).unwrap_or(0.0);

    let mut out = Vec::new();
    for (theme, keywords) in THEME_KEYWORDS {
        let matched: Vec<&VideoRecord> = videos
            .iter()
            .filter(|v| {
                let title = v.title.to_lowercase();
                keywords.iter().any(|k| title.contains(k))
            })
            .collect();
        if matched.is_empty() {
            continue;
        }
        let views: Vec<f64> = matched.iter().map(|v| v.views as f64).collect();
        let engagement: Vec<f64> = matched.iter().filter_map(|v| v.engagement_rate()).collect();
        let avg_views = mean(&views).unwrap_or(0.0);
        let vs_channel = if channel_avg > 0.0 {
            (avg_views - channel_avg) / channel_avg * 100.0
        } else {
            0.0
        };
        let example_title = matched
            .iter()
            .max_by_key(|v| v.views)
            .map(|v| v.title.clone())
            .unwrap_or_default();
        out.push(ThemeStats {
            theme: theme.to_string(),
            video_count: matched.len(),
            avg_views,
            avg_engagement_rate: mean(&engagement),
            vs_channel_avg_pct: vs_channel,
            example_title,
            performance: performance_rating(avg_views, channel_avg).to_string(),
        });
    }
    out.sort_by(|a, b| {
        b.avg_views
            .partial_cmp(&a.avg_views)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

/// Rate a group's average views against the channel average.
fn performance_rating(avg_views: f64, channel_avg: f64) -> &'static str {
    if avg_views >= channel_avg * 1.5 {
        "Excellent"
    } else if avg_views >= channel_avg {
        "Good"
    } else if avg_views >= channel_avg * 0.5 {
        "Average"
    } else {
        "Below Average"
    }
}

fn bucket_stats<'a, F>(videos: &'a [VideoRecord], labels: &[&str], assign: F) -> Vec<BucketStats>
where
    F: Fn(&'a VideoRecord) -> usize,
{
    let mut groups: Vec<Vec<&VideoRecord>> = vec![Vec::new(); labels.len()];
    for video in videos {
        groups[assign(video)].push(video);
    }
    labels
        .iter()
        .zip(groups)
        .filter(|(_, group)| !group.is_empty())
        .map(|(label, group)| {
            let views: Vec<f64> = group.iter().map(|v| v.views as f64).collect();
            let engagement: Vec<f64> = group.iter().filter_map(|v| v.engagement_rate()).collect();
            BucketStats {
                label: label.to_string(),
                video_count: group.len(),
                avg_views: mean(&views).unwrap_or(0.0),
                avg_engagement_rate: mean(&engagement),
            }
        })
        .collect()
}

/// Videos grouped by title length in characters. Empty buckets omitted.
pub fn title_length_buckets(videos: &[VideoRecord]) -> Vec<BucketStats> {
    let labels: Vec<&str> = TITLE_LENGTH_BUCKETS.iter().map(|b| b.0).collect();
    bucket_stats(videos, &labels, |v| {
        let len = v.title.chars().count();
        TITLE_LENGTH_BUCKETS
            .iter()
            .position(|(_, lo, hi)| len >= *lo && len < *hi)
            .unwrap_or(TITLE_LENGTH_BUCKETS.len() - 1)
    })
}

/// Videos grouped by duration. Empty buckets omitted.
pub fn duration_buckets(videos: &[VideoRecord]) -> Vec<BucketStats> {
    let labels: Vec<&str> = DURATION_BUCKETS.iter().map(|b| b.0).collect();
    bucket_stats(videos, &labels, |v| {
        DURATION_BUCKETS
            .iter()
            .position(|(_, lo, hi)| v.duration_seconds >= *lo && v.duration_seconds < *hi)
            .unwrap_or(DURATION_BUCKETS.len() - 1)
    })
}

fn consistency_rating(gap_std: f64) -> &'static str {
    if gap_std < 2.0 {
        "Very Consistent"
    } else if gap_std <= 5.0 {
        "Moderately Consistent"
    } else {
        "Inconsistent"
    }
}

/// Upload cadence from gaps between consecutive publish dates.
/// None with fewer than two videos.
pub fn upload_consistency(videos: &[VideoRecord]) -> Option<UploadConsistency> {
    if videos.len() < 2 {
        return None;
    }
    let mut dates: Vec<NaiveDate> = videos.iter().map(|v| v.published_date()).collect();
    dates.sort();
    let gaps: Vec<f64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    let avg_gap = mean(&gaps)?;
    let gap_std = population_std(&gaps)?;
    let uploads_per_week = if avg_gap > 0.0 { 7.0 / avg_gap } else { 7.0 };
    Some(UploadConsistency {
        avg_gap_days: avg_gap,
        gap_std_days: gap_std,
        uploads_per_week,
        rating: consistency_rating(gap_std).to_string(),
    })
}

/// Split videos at the median defined engagement rate and compare the
/// halves. Videos exactly at the median land in the low half. Videos
/// with no defined rate are excluded. None when no rate is defined.
pub fn engagement_split(videos: &[VideoRecord]) -> Option<EngagementSplit> {
    let rated: Vec<(&VideoRecord, f64)> = videos
        .iter()
        .filter_map(|v| v.engagement_rate().map(|r| (v, r)))
        .collect();
    if rated.is_empty() {
        return None;
    }
    let rates: Vec<f64> = rated.iter().map(|(_, r)| *r).collect();
    let med = median(&rates)?;

    let group = |members: Vec<&VideoRecord>| {
        let views: Vec<f64> = members.iter().map(|v| v.views as f64).collect();
        let likes: Vec<f64> = members.iter().map(|v| v.likes as f64).collect();
        let comments: Vec<f64> = members.iter().map(|v| v.comments as f64).collect();
        GroupStats {
            video_count: members.len(),
            avg_views: mean(&views).unwrap_or(0.0),
            avg_likes: mean(&likes).unwrap_or(0.0),
            avg_comments: mean(&comments).unwrap_or(0.0),
        }
    };

    let high = group(
        rated
            .iter()
            .filter(|(_, r)| *r > med)
            .map(|(v, _)| *v)
            .collect(),
    );
    let low = group(
        rated
            .iter()
            .filter(|(_, r)| *r <= med)
            .map(|(v, _)| *v)
            .collect(),
    );
    let views_lift_pct = if low.avg_views > 0.0 {
        Some((high.avg_views - low.avg_views) / low.avg_views * 100.0)
    } else {
        None
    };
    Some(EngagementSplit {
        median_engagement_rate: med,
        high,
        low,
        views_lift_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VideoId;
    use chrono::{TimeZone, Utc};

    fn create_test_video(title: &str, day: u32, views: u64, likes: u64) -> VideoRecord {
        VideoRecord {
            id: VideoId::from(title),
            title: title.to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 3, day, 14, 0, 0).unwrap(),
            duration_seconds: 600,
            views,
            likes,
            comments: likes / 4,
            impressions: None,
            subscribers_gained: None,
        }
    }

    #[test]
    fn test_theme_detection_matches_keywords() {
        let videos = vec![
            create_test_video("How to Bake Bread", 1, 5000, 100),
            create_test_video("Honest Review of My Oven", 2, 2000, 50),
            create_test_video("Random upload", 3, 100, 2),
        ];
        let themes = detect_themes(&videos);
        let names: Vec<&str> = themes.iter().map(|t| t.theme.as_str()).collect();
        assert!(names.contains(&"Tutorial"));
        assert!(names.contains(&"Review"));
        assert!(!names.contains(&"Gaming"));
        // Ordered by average views descending.
        assert_eq!(themes[0].theme, "Tutorial");
    }

    #[test]
    fn test_theme_carries_example_and_performance_rating() {
        // Tutorials average 4000 views, channel average is 2100:
        // 4000 >= 2100 * 1.5, so the theme rates Excellent.
        let videos = vec![
            create_test_video("How to Bake Bread", 1, 5000, 100),
            create_test_video("How to Knead Dough", 2, 3000, 60),
            create_test_video("Random upload", 3, 200, 4),
            create_test_video("Another plain one", 4, 200, 4),
        ];
        let themes = detect_themes(&videos);
        let tutorial = themes.iter().find(|t| t.theme == "Tutorial").unwrap();
        assert_eq!(tutorial.example_title, "How to Bake Bread");
        assert_eq!(tutorial.performance, "Excellent");
    }

    #[test]
    fn test_underperforming_theme_rates_below_average() {
        let videos = vec![
            create_test_video("Honest Review", 1, 100, 2),
            create_test_video("Plain upload one", 2, 5000, 100),
            create_test_video("Plain upload two", 3, 5000, 100),
        ];
        let themes = detect_themes(&videos);
        let review = themes.iter().find(|t| t.theme == "Review").unwrap();
        assert_eq!(review.performance, "Below Average");
    }

    #[test]
    fn test_theme_matching_is_plain_substring() {
        // "laptop" contains "top", so substring matching files it under List.
        let videos = vec![create_test_video("My laptop setup", 1, 100, 2)];
        let themes = detect_themes(&videos);
        assert!(themes.iter().any(|t| t.theme == "List"));
    }

    #[test]
    fn test_title_length_buckets_boundaries() {
        let videos = vec![
            create_test_video("Short", 1, 100, 2),
            create_test_video(&"x".repeat(30), 2, 200, 4),
            create_test_video(&"y".repeat(95), 3, 300, 6),
        ];
        let buckets = title_length_buckets(&videos);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Very Short (< 30)", "Short (30-49)", "Very Long (>= 90)"]
        );
    }

    #[test]
    fn test_duration_buckets_omit_empty() {
        let mut v = create_test_video("A video", 1, 100, 2);
        v.duration_seconds = 120;
        let buckets = duration_buckets(&[v]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Short (< 5 min)");
    }

    #[test]
    fn test_even_spacing_is_very_consistent() {
        // Every 3 days, so every gap is 3 and the std is 0.
        let videos: Vec<VideoRecord> = (0..5)
            .map(|i| create_test_video(&format!("v{i}"), 1 + i * 3, 100, 2))
            .collect();
        let c = upload_consistency(&videos).unwrap();
        assert_eq!(c.avg_gap_days, 3.0);
        assert_eq!(c.gap_std_days, 0.0);
        assert_eq!(c.rating, "Very Consistent");
    }

    #[test]
    fn test_irregular_spacing_is_inconsistent() {
        let videos = vec![
            create_test_video("a", 1, 100, 2),
            create_test_video("b", 2, 100, 2),
            create_test_video("c", 20, 100, 2),
        ];
        let c = upload_consistency(&videos).unwrap();
        assert_eq!(c.rating, "Inconsistent");
    }

    #[test]
    fn test_consistency_needs_two_videos() {
        let videos = vec![create_test_video("only", 1, 100, 2)];
        assert!(upload_consistency(&videos).is_none());
    }

    #[test]
    fn test_engagement_split_ties_go_low() {
        // Rates: 2%, 2%, 10%. Median is 2%, so both 2% videos go low.
        let videos = vec![
            create_test_video("a", 1, 1000, 20),
            create_test_video("b", 2, 1000, 20),
            create_test_video("c", 3, 4000, 400),
        ];
        let split = engagement_split(&videos).unwrap();
        assert_eq!(split.low.video_count, 2);
        assert_eq!(split.high.video_count, 1);
        assert_eq!(split.views_lift_pct, Some(300.0));
    }

    #[test]
    fn test_engagement_split_excludes_zero_view_videos() {
        let videos = vec![create_test_video("dead", 1, 0, 0)];
        assert!(engagement_split(&videos).is_none());
    }
}
