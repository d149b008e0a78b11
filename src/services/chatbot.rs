//! Chatbot: keyword routing over an ordered rule list, data-grounded
//! answers, and a hosted-LLM fallback for everything unrouted.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ForecastSettings;
use crate::llm::LlmClient;
use crate::models::VideoRecord;
use crate::services::{calendar, forecast, metrics, patterns};

/// Question categories, in routing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Metrics,
    Impressions,
    Ctr,
    Subscribers,
    Forecast,
    Schedule,
    Patterns,
}

/// Ordered routing rules; the first category with a keyword hit wins.
const ROUTING_RULES: &[(QuestionCategory, &[&str])] = &[
    (
        QuestionCategory::Metrics,
        &[
            "how many",
            "how much",
            "total",
            "average",
            "top video",
            "best video",
            "worst",
            "summary",
            "overview",
        ],
    ),
    (QuestionCategory::Impressions, &["impression"]),
    (
        QuestionCategory::Ctr,
        &["ctr", "click-through", "click through", "thumbnail"],
    ),
    (QuestionCategory::Subscribers, &["subscriber", "conversion"]),
    (
        QuestionCategory::Forecast,
        &["forecast", "predict", "future", "projection", "growth", "trend"],
    ),
    (
        QuestionCategory::Schedule,
        &[
            "when should",
            "schedule",
            "best day",
            "best time",
            "best hour",
            "what day",
            "what time",
            "calendar",
            "posting",
        ],
    ),
    (
        QuestionCategory::Patterns,
        &["theme", "content", "pattern", "title", "duration", "what should i make"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Routed to a category and answered from channel data.
    RuleBased,
    /// Produced by the hosted completion API.
    Generated,
    /// Data summary used because no route matched and no LLM answered.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub text: String,
    pub category: Option<QuestionCategory>,
    pub source: AnswerSource,
}

/// Route a question to the first matching category.
pub fn classify(question: &str) -> Option<QuestionCategory> {
    let lowered = question.to_lowercase();
    for (category, keywords) in ROUTING_RULES {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return Some(*category);
        }
    }
    None
}

fn tip_for(category: Option<QuestionCategory>) -> &'static str {
    match category {
        Some(QuestionCategory::Metrics) => {
            "double down on the formats behind your top videos"
        }
        Some(QuestionCategory::Impressions) => {
            "refresh thumbnails on videos with many impressions but few views"
        }
        Some(QuestionCategory::Ctr) => {
            "A/B test thumbnail styles on your next three uploads"
        }
        Some(QuestionCategory::Subscribers) => {
            "add a verbal subscribe prompt in the first 30 seconds"
        }
        Some(QuestionCategory::Forecast) => {
            "keep your upload cadence steady so the trend holds"
        }
        Some(QuestionCategory::Schedule) => {
            "publish at the same slot for a month before judging it"
        }
        Some(QuestionCategory::Patterns) => {
            "make your next video in your best-performing theme"
        }
        None => "post consistently and review these numbers weekly",
    }
}

fn with_growth_tip(mut text: String, category: Option<QuestionCategory>) -> String {
    if !text.to_lowercase().contains("tip") {
        text.push_str("\n\nTip to grow: ");
        text.push_str(tip_for(category));
        text.push('.');
    }
    text
}

fn fmt_opt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => "not available".to_string(),
    }
}

fn answer_metrics(videos: &[VideoRecord], question: &str) -> String {
    let lowered = question.to_lowercase();
    if lowered.contains("top") || lowered.contains("best video") {
        let top = metrics::top_videos(videos, metrics::SortKey::Views, 3);
        let mut text = String::from("Your top videos by views:\n");
        for (i, v) in top.iter().enumerate() {
            text.push_str(&format!("{}. \"{}\" with {} views\n", i + 1, v.title, v.views));
        }
        return text;
    }
    if lowered.contains("worst") {
        let bottom = metrics::bottom_videos(videos, metrics::SortKey::Views, 3);
        let mut text = String::from("Your least-viewed videos:\n");
        for (i, v) in bottom.iter().enumerate() {
            text.push_str(&format!("{}. \"{}\" with {} views\n", i + 1, v.title, v.views));
        }
        return text;
    }
    let summary = metrics::compute_summary(videos);
    format!(
        "Across {} videos you have {} total views ({:.0} per video on average), \
         {} likes and {} comments. Average engagement rate: {}.",
        summary.total_videos,
        summary.total_views,
        summary.avg_views,
        summary.total_likes,
        summary.total_comments,
        fmt_opt_pct(summary.avg_engagement_rate),
    )
}

fn answer_impressions(videos: &[VideoRecord]) -> String {
    let summary = metrics::compute_summary(videos);
    if summary.total_impressions == 0 {
        return "Impression data is not available for this channel.".to_string();
    }
    let with_data = videos.iter().filter(|v| v.impressions.is_some()).count();
    format!(
        "Your videos collected {} impressions in total across {} videos with \
         impression data. Average proxy CTR from those impressions: {}.",
        summary.total_impressions,
        with_data,
        fmt_opt_pct(summary.avg_proxy_ctr),
    )
}

fn answer_ctr(videos: &[VideoRecord]) -> String {
    let summary = metrics::compute_summary(videos);
    match summary.avg_proxy_ctr {
        Some(ctr) => format!(
            "Your average proxy click-through rate is {ctr:.2}% \
             (views divided by impressions). Anything above 4% is solid."
        ),
        None => "Click-through rate needs impression data, which this channel \
                 does not have."
            .to_string(),
    }
}

fn answer_subscribers(videos: &[VideoRecord]) -> String {
    let summary = metrics::compute_summary(videos);
    if summary.total_subscribers_gained == 0 {
        return "Subscriber data is not available for this channel.".to_string();
    }
    format!(
        "These videos gained {} subscribers. Average conversion rate: {} of \
         viewers subscribe after watching.",
        summary.total_subscribers_gained,
        fmt_opt_pct(summary.avg_conversion_rate),
    )
}

fn answer_forecast(videos: &[VideoRecord], question: &str, settings: &ForecastSettings) -> String {
    let lowered = question.to_lowercase();
    if lowered.contains("growth") || lowered.contains("trend") {
        return match forecast::growth_trajectory(videos, settings) {
            Some(t) => {
                let label = match t.label {
                    forecast::TrendLabel::Accelerating => "accelerating",
                    forecast::TrendLabel::Stable => "stable",
                    forecast::TrendLabel::Declining => "declining",
                };
                let change = t
                    .growth_pct
                    .map(|p| format!("{p:+.1}%"))
                    .unwrap_or_else(|| "an undefined amount".to_string());
                format!(
                    "Your channel growth is {label}: recent videos average {:.0} \
                     views vs {:.0} earlier, a change of {change}.",
                    t.second_half_avg_views, t.first_half_avg_views,
                )
            }
            None => "Not enough history yet to judge the growth trend.".to_string(),
        };
    }
    let result = forecast::forecast_metric(
        videos,
        forecast::ForecastMetric::Views,
        settings.horizon_days,
        settings,
    );
    match result.unavailable_reason {
        Some(reason) => format!("No view forecast is possible: {reason}."),
        None => format!(
            "Over the next {} days the trend projects about {:.0} views in \
             total, roughly {:.0} per day.",
            result.horizon_days, result.total_forecast, result.daily_average,
        ),
    }
}

fn answer_schedule(videos: &[VideoRecord]) -> String {
    let days = calendar::rank_days(videos);
    let hours = calendar::rank_hours(videos);
    match (days.first(), hours.first()) {
        (Some(day), Some(hour)) => format!(
            "Your best publish day is {} (averaging {:.0} views) and your best \
             hour is {}:00. Schedule your most important uploads there.",
            day.weekday, day.avg_views, hour.hour,
        ),
        _ => "Not enough uploads yet to rank days and hours.".to_string(),
    }
}

fn answer_patterns(videos: &[VideoRecord]) -> String {
    let themes = patterns::detect_themes(videos);
    let consistency = patterns::upload_consistency(videos);
    let mut text = match themes.first() {
        Some(best) => format!(
            "Your strongest theme is {} ({} videos averaging {:.0} views, \
             {:+.0}% vs the channel average).",
            best.theme, best.video_count, best.avg_views, best.vs_channel_avg_pct,
        ),
        None => "No known theme matches your titles yet.".to_string(),
    };
    if let Some(c) = consistency {
        text.push_str(&format!(
            " You upload every {:.1} days on average ({}).",
            c.avg_gap_days, c.rating,
        ));
    }
    text
}

/// One-paragraph data summary used to seed LLM prompts and as the final
/// fallback answer.
pub fn data_summary(videos: &[VideoRecord]) -> String {
    let summary = metrics::compute_summary(videos);
    let best_day = calendar::rank_days(videos)
        .first()
        .map(|d| d.weekday.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let top_title = metrics::top_videos(videos, metrics::SortKey::Views, 1)
        .first()
        .map(|v| v.title.clone())
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Channel data: {} videos, {} total views, {:.0} average views, \
         average engagement rate {}, best publish day {}, top video \"{}\".",
        summary.total_videos,
        summary.total_views,
        summary.avg_views,
        fmt_opt_pct(summary.avg_engagement_rate),
        best_day,
        top_title,
    )
}

fn build_prompt(videos: &[VideoRecord], question: &str) -> String {
    format!(
        "{}\n\nViewer question: {}",
        data_summary(videos),
        question
    )
}

/// Answer a question about the channel.
///
/// Routed questions are answered from the data. Unrouted questions go to
/// the LLM when one is configured; any LLM failure degrades to the data
/// summary so the endpoint never errors on a routable request.
pub async fn answer(
    videos: &[VideoRecord],
    question: &str,
    llm: Option<&dyn LlmClient>,
    settings: &ForecastSettings,
) -> ChatAnswer {
    if videos.is_empty() {
        return ChatAnswer {
            text: "No channel data is loaded yet, so I cannot answer that. \
                   Load a channel first."
                .to_string(),
            category: None,
            source: AnswerSource::RuleBased,
        };
    }

    if let Some(category) = classify(question) {
        let text = match category {
            QuestionCategory::Metrics => answer_metrics(videos, question),
            QuestionCategory::Impressions => answer_impressions(videos),
            QuestionCategory::Ctr => answer_ctr(videos),
            QuestionCategory::Subscribers => answer_subscribers(videos),
            QuestionCategory::Forecast => answer_forecast(videos, question, settings),
            QuestionCategory::Schedule => answer_schedule(videos),
            QuestionCategory::Patterns => answer_patterns(videos),
        };
        return ChatAnswer {
            text: with_growth_tip(text, Some(category)),
            category: Some(category),
            source: AnswerSource::RuleBased,
        };
    }

    if let Some(client) = llm {
        match client.complete(&build_prompt(videos, question)).await {
            Ok(text) => {
                return ChatAnswer {
                    text: with_growth_tip(text, None),
                    category: None,
                    source: AnswerSource::Generated,
                }
            }
            Err(e) => warn!(error = %e, "completion failed, answering from data summary"),
        }
    }

    ChatAnswer {
        text: with_growth_tip(data_summary(videos), None),
        category: None,
        source: AnswerSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VideoId;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    fn create_test_video(title: &str, day: u32, views: u64) -> VideoRecord {
        VideoRecord {
            id: VideoId::from(title),
            title: title.to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 5, day, 15, 0, 0).unwrap(),
            duration_seconds: 600,
            views,
            likes: views / 20,
            comments: views / 100,
            impressions: Some(views * 4),
            subscribers_gained: Some(views / 50),
        }
    }

    fn sample_videos() -> Vec<VideoRecord> {
        (1..=6)
            .map(|d| create_test_video(&format!("Video {d}"), d, d as u64 * 100))
            .collect()
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, crate::llm::LlmError> {
            Err(crate::llm::LlmError::Timeout)
        }
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, prompt: &str) -> Result<String, crate::llm::LlmError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    #[test]
    fn test_classify_first_match_wins() {
        // "how many" routes to metrics even though "subscriber" also matches.
        assert_eq!(
            classify("How many subscribers did I gain?"),
            Some(QuestionCategory::Metrics)
        );
        assert_eq!(
            classify("What is my subscriber conversion?"),
            Some(QuestionCategory::Subscribers)
        );
    }

    #[test]
    fn test_classify_each_category() {
        assert_eq!(classify("show me a summary"), Some(QuestionCategory::Metrics));
        assert_eq!(
            classify("impressions please"),
            Some(QuestionCategory::Impressions)
        );
        assert_eq!(classify("is my ctr good"), Some(QuestionCategory::Ctr));
        assert_eq!(
            classify("forecast my views"),
            Some(QuestionCategory::Forecast)
        );
        assert_eq!(
            classify("when should i post"),
            Some(QuestionCategory::Schedule)
        );
        assert_eq!(
            classify("which theme works"),
            Some(QuestionCategory::Patterns)
        );
        assert_eq!(classify("hello there"), None);
    }

    #[tokio::test]
    async fn test_routed_answer_carries_growth_tip() {
        let videos = sample_videos();
        let reply = answer(&videos, "give me a summary", None, &ForecastSettings::default()).await;
        assert_eq!(reply.category, Some(QuestionCategory::Metrics));
        assert_eq!(reply.source, AnswerSource::RuleBased);
        assert!(reply.text.contains("Tip to grow"));
    }

    #[tokio::test]
    async fn test_unrouted_without_llm_falls_back_to_summary() {
        let videos = sample_videos();
        let reply = answer(&videos, "hello there", None, &ForecastSettings::default()).await;
        assert_eq!(reply.source, AnswerSource::Fallback);
        assert!(reply.text.contains("Channel data"));
        assert!(reply.text.contains("Tip to grow"));
    }

    #[tokio::test]
    async fn test_failing_llm_degrades_to_fallback() {
        let videos = sample_videos();
        let llm = FailingLlm;
        let reply = answer(
            &videos,
            "hello there",
            Some(&llm),
            &ForecastSettings::default(),
        )
        .await;
        assert_eq!(reply.source, AnswerSource::Fallback);
        assert!(reply.text.contains("Channel data"));
    }

    #[tokio::test]
    async fn test_working_llm_answers_unrouted_questions() {
        let videos = sample_videos();
        let llm = EchoLlm;
        let reply = answer(
            &videos,
            "hello there",
            Some(&llm),
            &ForecastSettings::default(),
        )
        .await;
        assert_eq!(reply.source, AnswerSource::Generated);
        assert!(reply.text.starts_with("echo:"));
    }

    #[tokio::test]
    async fn test_empty_channel_short_circuits() {
        let reply = answer(&[], "give me a summary", None, &ForecastSettings::default()).await;
        assert!(reply.text.contains("No channel data"));
    }

    #[tokio::test]
    async fn test_schedule_answer_names_best_day() {
        // All uploads on 2026-05-04, a Monday.
        let videos = vec![create_test_video("A", 4, 1000)];
        let reply = answer(
            &videos,
            "what is the best day to post?",
            None,
            &ForecastSettings::default(),
        )
        .await;
        assert_eq!(reply.category, Some(QuestionCategory::Schedule));
        assert!(reply.text.contains("Monday"));
    }
}
