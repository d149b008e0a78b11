//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{
    BucketStats, CalendarEntry, DayPerformance, DayRanking, EngagementDistribution,
    EngagementSplit, ForecastResult, GrowthTrajectory, HourPerformance, HourRanking, MetricSet,
    PerformanceTiers, SummaryStats, ThemeStats, UploadConsistency, VideoHighlight,
};
use crate::services::chatbot::{AnswerSource, QuestionCategory};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub videos_per_week: Option<usize>,
    pub weeks: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AbTestRequest {
    pub current_title: String,
    pub proposed_title: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub category: Option<QuestionCategory>,
    pub source: AnswerSource,
}

/// Everything the summary endpoint returns for one channel.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub channel_id: String,
    pub channel_name: String,
    pub fetched_at: DateTime<Utc>,
    pub summary: SummaryStats,
    pub top_videos: Vec<VideoHighlight>,
    pub by_day: Vec<DayPerformance>,
    pub by_hour: Vec<HourPerformance>,
    pub engagement_distribution: Option<EngagementDistribution>,
    pub tiers: Option<PerformanceTiers>,
    pub video_metrics: Vec<MetricSet>,
}

#[derive(Debug, Serialize)]
pub struct PatternsResponse {
    pub channel_id: String,
    pub themes: Vec<ThemeStats>,
    pub title_length: Vec<BucketStats>,
    pub duration: Vec<BucketStats>,
    pub consistency: Option<UploadConsistency>,
    pub engagement_split: Option<EngagementSplit>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub channel_id: String,
    pub day_ranking: Vec<DayRanking>,
    pub hour_ranking: Vec<HourRanking>,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub channel_id: String,
    pub views: ForecastResult,
    pub subscribers: ForecastResult,
    pub engagement: ForecastResult,
    pub trajectory: Option<GrowthTrajectory>,
}
