//! Report builder: one structure gathering every analysis for a channel,
//! plus a markdown rendering of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ForecastSettings;
use crate::models::ChannelSnapshot;
use crate::services::forecast::{ForecastMetric, ForecastResult, GrowthTrajectory, TrendLabel};
use crate::services::metrics::{DayPerformance, SortKey, SummaryStats, VideoHighlight};
use crate::services::patterns::{ThemeStats, UploadConsistency};
use crate::services::{calendar, forecast, metrics, patterns};

/// Everything the full-channel report contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub channel_name: String,
    pub summary: SummaryStats,
    pub top_videos: Vec<VideoHighlight>,
    pub day_performance: Vec<DayPerformance>,
    pub best_day: Option<String>,
    pub best_hour: Option<u32>,
    pub themes: Vec<ThemeStats>,
    pub consistency: Option<UploadConsistency>,
    pub views_forecast: ForecastResult,
    pub subscriber_forecast: ForecastResult,
    pub trajectory: Option<GrowthTrajectory>,
    pub action_plan: Vec<String>,
}

pub fn build_report(
    snapshot: &ChannelSnapshot,
    settings: &ForecastSettings,
    now: DateTime<Utc>,
) -> ReportData {
    let videos = &snapshot.videos;
    let summary = metrics::compute_summary(videos);
    let day_ranking = calendar::rank_days(videos);
    let hour_ranking = calendar::rank_hours(videos);
    let themes = patterns::detect_themes(videos);
    let consistency = patterns::upload_consistency(videos);
    let trajectory = forecast::growth_trajectory(videos, settings);

    let action_plan = build_action_plan(
        &day_ranking,
        &hour_ranking,
        &themes,
        consistency.as_ref(),
        trajectory.as_ref(),
    );

    ReportData {
        generated_at: now,
        channel_name: snapshot.channel_name.clone(),
        summary,
        top_videos: metrics::top_videos(videos, SortKey::Views, 5),
        day_performance: metrics::day_performance(videos),
        best_day: day_ranking.first().map(|d| d.weekday.clone()),
        best_hour: hour_ranking.first().map(|h| h.hour),
        themes,
        consistency,
        views_forecast: forecast::forecast_metric(
            videos,
            ForecastMetric::Views,
            settings.horizon_days,
            settings,
        ),
        subscriber_forecast: forecast::forecast_metric(
            videos,
            ForecastMetric::Subscribers,
            settings.horizon_days,
            settings,
        ),
        trajectory,
        action_plan,
    }
}

fn build_action_plan(
    days: &[calendar::DayRanking],
    hours: &[calendar::HourRanking],
    themes: &[ThemeStats],
    consistency: Option<&UploadConsistency>,
    trajectory: Option<&GrowthTrajectory>,
) -> Vec<String> {
    let mut plan = Vec::new();
    if let (Some(day), Some(hour)) = (days.first(), hours.first()) {
        plan.push(format!(
            "Publish your most important uploads on {} around {}:00.",
            day.weekday, hour.hour
        ));
    }
    if let Some(best) = themes.first() {
        plan.push(format!(
            "Lean into {} content; it averages {:.0} views ({:+.0}% vs channel average).",
            best.theme, best.avg_views, best.vs_channel_avg_pct
        ));
    }
    if let Some(c) = consistency {
        if c.rating != "Very Consistent" {
            plan.push(format!(
                "Tighten your upload cadence; gaps currently vary by {:.1} days.",
                c.gap_std_days
            ));
        }
    }
    if let Some(t) = trajectory {
        match t.label {
            TrendLabel::Declining => plan.push(
                "Recent videos underperform your earlier ones; revisit what changed.".to_string(),
            ),
            TrendLabel::Accelerating => plan.push(
                "Momentum is building; increase upload frequency while it lasts.".to_string(),
            ),
            TrendLabel::Stable => {}
        }
    }
    if plan.is_empty() {
        plan.push("Publish more videos to unlock channel-specific recommendations.".to_string());
    }
    plan
}

/// Render the report as a markdown document.
pub fn render_markdown(report: &ReportData) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Channel Report: {}\n\n", report.channel_name));
    out.push_str(&format!(
        "Generated {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    out.push_str("## Summary\n\n");
    let s = &report.summary;
    out.push_str(&format!(
        "- Videos analysed: {}\n- Total views: {}\n- Average views: {:.0}\n",
        s.total_videos, s.total_views, s.avg_views
    ));
    if let Some(rate) = s.avg_engagement_rate {
        out.push_str(&format!("- Average engagement rate: {rate:.2}%\n"));
    }
    out.push('\n');

    if !report.top_videos.is_empty() {
        out.push_str("## Top Videos\n\n");
        for (i, v) in report.top_videos.iter().enumerate() {
            out.push_str(&format!("{}. \"{}\" ({} views)\n", i + 1, v.title, v.views));
        }
        out.push('\n');
    }

    if let (Some(day), Some(hour)) = (&report.best_day, report.best_hour) {
        out.push_str("## Best Publishing Slot\n\n");
        out.push_str(&format!("{day} at {hour}:00\n\n"));
    }

    if !report.themes.is_empty() {
        out.push_str("## Themes\n\n");
        for theme in &report.themes {
            out.push_str(&format!(
                "- {}: {} videos, {:.0} avg views ({:+.0}% vs channel, {}), e.g. \"{}\"\n",
                theme.theme,
                theme.video_count,
                theme.avg_views,
                theme.vs_channel_avg_pct,
                theme.performance,
                theme.example_title
            ));
        }
        out.push('\n');
    }

    if let Some(c) = &report.consistency {
        out.push_str("## Upload Cadence\n\n");
        out.push_str(&format!(
            "Every {:.1} days on average ({:.1} uploads/week): {}\n\n",
            c.avg_gap_days, c.uploads_per_week, c.rating
        ));
    }

    out.push_str("## Forecast\n\n");
    match &report.views_forecast.unavailable_reason {
        Some(reason) => out.push_str(&format!("Views forecast unavailable: {reason}\n")),
        None => out.push_str(&format!(
            "Next {} days: about {:.0} views in total ({:.0}/day).\n",
            report.views_forecast.horizon_days,
            report.views_forecast.total_forecast,
            report.views_forecast.daily_average
        )),
    }
    if let Some(t) = &report.trajectory {
        let label = match t.label {
            TrendLabel::Accelerating => "accelerating",
            TrendLabel::Stable => "stable",
            TrendLabel::Declining => "declining",
        };
        out.push_str(&format!("Growth trajectory: {label}\n"));
    }
    out.push('\n');

    out.push_str("## Action Plan\n\n");
    for (i, action) in report.action_plan.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, action));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VideoId;
    use crate::models::{ChannelTotals, VideoRecord};
    use chrono::TimeZone;

    fn snapshot(videos: Vec<VideoRecord>) -> ChannelSnapshot {
        ChannelSnapshot {
            channel_id: "chan".to_string(),
            channel_name: "Test Channel".to_string(),
            totals: ChannelTotals {
                subscriber_count: 1000,
                total_views: videos.iter().map(|v| v.views).sum(),
            },
            videos,
            fetched_at: Utc.with_ymd_and_hms(2026, 6, 20, 0, 0, 0).unwrap(),
        }
    }

    fn create_test_video(day: u32, views: u64) -> VideoRecord {
        VideoRecord {
            id: VideoId::from(format!("v{day}").as_str()),
            title: format!("How to do thing {day}"),
            published_at: Utc.with_ymd_and_hms(2026, 6, day, 14, 0, 0).unwrap(),
            duration_seconds: 600,
            views,
            likes: views / 20,
            comments: views / 100,
            impressions: Some(views * 4),
            subscribers_gained: Some(views / 50),
        }
    }

    #[test]
    fn test_report_covers_every_section() {
        let snap = snapshot((1..=12).map(|d| create_test_video(d, d as u64 * 100)).collect());
        let now = Utc.with_ymd_and_hms(2026, 6, 20, 0, 0, 0).unwrap();
        let report = build_report(&snap, &ForecastSettings::default(), now);

        assert_eq!(report.channel_name, "Test Channel");
        assert_eq!(report.summary.total_videos, 12);
        assert_eq!(report.top_videos.len(), 5);
        assert!(report.best_day.is_some());
        assert!(report.best_hour.is_some());
        assert!(!report.themes.is_empty());
        assert!(report.consistency.is_some());
        assert!(report.views_forecast.unavailable_reason.is_none());
        assert!(report.trajectory.is_some());
        assert!(!report.action_plan.is_empty());
    }

    #[test]
    fn test_report_on_empty_channel_degrades() {
        let snap = snapshot(Vec::new());
        let now = Utc.with_ymd_and_hms(2026, 6, 20, 0, 0, 0).unwrap();
        let report = build_report(&snap, &ForecastSettings::default(), now);
        assert!(report.best_day.is_none());
        assert!(report.views_forecast.unavailable_reason.is_some());
        assert_eq!(report.action_plan.len(), 1);
    }

    #[test]
    fn test_markdown_rendering_has_headings() {
        let snap = snapshot((1..=6).map(|d| create_test_video(d, 500)).collect());
        let now = Utc.with_ymd_and_hms(2026, 6, 20, 0, 0, 0).unwrap();
        let report = build_report(&snap, &ForecastSettings::default(), now);
        let md = render_markdown(&report);
        assert!(md.starts_with("# Channel Report: Test Channel"));
        assert!(md.contains("## Summary"));
        assert!(md.contains("## Forecast"));
        assert!(md.contains("## Action Plan"));
    }
}
