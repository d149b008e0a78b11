//! Calendar optimizer: day and hour rankings plus a generated posting
//! schedule with content suggestions per weekday.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{VideoRecord, WEEKDAY_NAMES};
use crate::services::mean;

/// Fixed content suggestion for one weekday. Monday-first.
#[derive(Debug, Clone, Serialize)]
pub struct ContentSlot {
    pub weekday: &'static str,
    pub content_type: &'static str,
    pub description: &'static str,
    pub rationale: &'static str,
    pub example: &'static str,
    pub title_template: &'static str,
}

const CONTENT_SLOTS: [ContentSlot; 7] = [
    ContentSlot {
        weekday: "Monday",
        content_type: "Educational",
        description: "In-depth explainer on a topic your audience struggles with",
        rationale: "Viewers start the week looking to learn something new",
        example: "Why Your Thumbnails Get Ignored, Explained",
        title_template: "How to [Achieve Result] - Step by Step",
    },
    ContentSlot {
        weekday: "Tuesday",
        content_type: "Tutorial",
        description: "Hands-on walkthrough with a concrete end result",
        rationale: "Midweek viewers follow along with practical content",
        example: "Complete Editing Workflow from Raw Footage to Upload",
        title_template: "Complete Tutorial: [Topic] from Start to Finish",
    },
    ContentSlot {
        weekday: "Wednesday",
        content_type: "List",
        description: "Ranked or curated list around one theme",
        rationale: "Lists are easy to scan and widely shared midweek",
        example: "Top 7 Tools I Use Every Single Day",
        title_template: "Top [Number] [Topic] You Need to See",
    },
    ContentSlot {
        weekday: "Thursday",
        content_type: "Reaction",
        description: "React to news or trends in your niche",
        rationale: "Trend content rides search interest before the weekend",
        example: "Reacting to This Week's Biggest Announcement",
        title_template: "Reacting to [Trend] - My Honest Take",
    },
    ContentSlot {
        weekday: "Friday",
        content_type: "Behind the Scenes",
        description: "Show the process behind your channel or craft",
        rationale: "Lighter personal content suits the end of the week",
        example: "How I Plan a Month of Videos in One Afternoon",
        title_template: "Behind the Scenes: [Process or Event]",
    },
    ContentSlot {
        weekday: "Saturday",
        content_type: "Entertainment",
        description: "High-energy entertainment piece or challenge",
        rationale: "Weekend watch time favors longer entertainment sessions",
        example: "I Tried Uploading Daily for a Week",
        title_template: "[Challenge] - Here Is What Happened",
    },
    ContentSlot {
        weekday: "Sunday",
        content_type: "Q&A",
        description: "Answer audience questions from the week",
        rationale: "Community content closes the week and feeds comments",
        example: "Answering Your Most-Asked Questions",
        title_template: "Answering Your Questions About [Topic]",
    },
];

/// Content suggestion table indexed by weekday (0 = Monday).
pub fn content_slots() -> &'static [ContentSlot; 7] {
    &CONTENT_SLOTS
}

/// One weekday in the publish-day ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRanking {
    pub weekday: String,
    pub weekday_index: usize,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_engagement_rate: f64,
}

/// One hour in the publish-hour ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourRanking {
    pub hour: u32,
    pub video_count: usize,
    pub avg_views: f64,
    pub avg_engagement_rate: f64,
}

/// One planned upload in the generated calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub week: u32,
    pub date: NaiveDate,
    pub weekday: String,
    pub hour: u32,
    pub content_type: String,
    pub description: String,
    pub rationale: String,
    pub example: String,
    pub title_template: String,
}

/// Weekdays ranked best-first. Ties break on average engagement, then
/// on weekday order, so the ranking is fully deterministic.
pub fn rank_days(videos: &[VideoRecord]) -> Vec<DayRanking> {
    let mut by_day: HashMap<usize, Vec<&VideoRecord>> = HashMap::new();
    for video in videos {
        by_day
            .entry(video.publish_weekday().num_days_from_monday() as usize)
            .or_default()
            .push(video);
    }

    let mut ranking: Vec<DayRanking> = by_day
        .into_iter()
        .map(|(idx, group)| {
            let views: Vec<f64> = group.iter().map(|v| v.views as f64).collect();
            let engagement: Vec<f64> = group.iter().filter_map(|v| v.engagement_rate()).collect();
            DayRanking {
                weekday: WEEKDAY_NAMES[idx].to_string(),
                weekday_index: idx,
                video_count: group.len(),
                avg_views: mean(&views).unwrap_or(0.0),
                avg_engagement_rate: mean(&engagement).unwrap_or(0.0),
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.avg_views
            .partial_cmp(&a.avg_views)
            .unwrap_or(Ordering::Equal)
            .then(
                b.avg_engagement_rate
                    .partial_cmp(&a.avg_engagement_rate)
                    .unwrap_or(Ordering::Equal),
            )
            .then(a.weekday_index.cmp(&b.weekday_index))
    });
    ranking
}

/// Publish hours ranked best-first, same tie chain as `rank_days` with
/// the hour itself as the final tiebreak.
pub fn rank_hours(videos: &[VideoRecord]) -> Vec<HourRanking> {
    let mut by_hour: HashMap<u32, Vec<&VideoRecord>> = HashMap::new();
    for video in videos {
        by_hour.entry(video.publish_hour()).or_default().push(video);
    }

    let mut ranking: Vec<HourRanking> = by_hour
        .into_iter()
        .map(|(hour, group)| {
            let views: Vec<f64> = group.iter().map(|v| v.views as f64).collect();
            let engagement: Vec<f64> = group.iter().filter_map(|v| v.engagement_rate()).collect();
            HourRanking {
                hour,
                video_count: group.len(),
                avg_views: mean(&views).unwrap_or(0.0),
                avg_engagement_rate: mean(&engagement).unwrap_or(0.0),
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.avg_views
            .partial_cmp(&a.avg_views)
            .unwrap_or(Ordering::Equal)
            .then(
                b.avg_engagement_rate
                    .partial_cmp(&a.avg_engagement_rate)
                    .unwrap_or(Ordering::Equal),
            )
            .then(a.hour.cmp(&b.hour))
    });
    ranking
}

/// Generate a posting calendar starting at `start`.
///
/// Picks the channel's `videos_per_week` best weekdays (capped at 7) and
/// its single best publish hour, then lays out `weeks` weeks of uploads,
/// each slot carrying the content suggestion for its weekday. Empty for
/// a channel with no videos.
pub fn generate_calendar(
    videos: &[VideoRecord],
    start: NaiveDate,
    weeks: u32,
    videos_per_week: usize,
) -> Vec<CalendarEntry> {
    let day_ranking = rank_days(videos);
    if day_ranking.is_empty() {
        return Vec::new();
    }
    let per_week = videos_per_week.min(7);
    // Weekdays without uploads rank after every observed one, in weekday
    // order, so asking for seven days always yields seven.
    let mut ranked: Vec<usize> = day_ranking.iter().map(|d| d.weekday_index).collect();
    for idx in 0..7 {
        if !ranked.contains(&idx) {
            ranked.push(idx);
        }
    }
    let chosen: Vec<usize> = ranked.into_iter().take(per_week).collect();
    let best_hour = rank_hours(videos).first().map(|h| h.hour).unwrap_or(14);

    let start_weekday = start.weekday().num_days_from_monday() as i64;
    let mut entries = Vec::new();
    for week in 0..weeks {
        let mut week_entries: Vec<CalendarEntry> = chosen
            .iter()
            .map(|&idx| {
                let offset = (idx as i64 - start_weekday).rem_euclid(7);
                let date = start + Duration::days(week as i64 * 7 + offset);
                let slot = &CONTENT_SLOTS[idx];
                CalendarEntry {
                    week: week + 1,
                    date,
                    weekday: slot.weekday.to_string(),
                    hour: best_hour,
                    content_type: slot.content_type.to_string(),
                    description: slot.description.to_string(),
                    rationale: slot.rationale.to_string(),
                    example: slot.example.to_string(),
                    title_template: slot.title_template.to_string(),
                }
            })
            .collect();
        week_entries.sort_by_key(|e| e.date);
        entries.extend(week_entries);
    }
    entries
}
