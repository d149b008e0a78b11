//! Request handlers. Compute-heavy endpoints run on the blocking pool.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use tracing::debug;

use crate::services::forecast::ForecastMetric;
use crate::services::{ab_test, calendar, chatbot, forecast, metrics, patterns, report};

use super::dto::{
    AbTestRequest, CalendarQuery, CalendarResponse, ChatRequest, ChatResponse, ForecastQuery,
    ForecastResponse, HealthResponse, PatternsResponse, SummaryResponse,
};
use super::error::AppError;
use super::state::AppState;

const MAX_FORECAST_DAYS: usize = 365;
const MAX_CALENDAR_WEEKS: u32 = 12;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let snapshot = state.load_snapshot(&channel).await?;
    let now = Utc::now();
    let videos = &snapshot.videos;
    debug!(channel, videos = videos.len(), "building summary");

    Ok(Json(SummaryResponse {
        channel_id: snapshot.channel_id.clone(),
        channel_name: snapshot.channel_name.clone(),
        fetched_at: snapshot.fetched_at,
        summary: metrics::compute_summary(videos),
        top_videos: metrics::top_videos(videos, metrics::SortKey::Views, 10),
        by_day: metrics::day_performance(videos),
        by_hour: metrics::hour_performance(videos),
        engagement_distribution: metrics::engagement_distribution(videos),
        tiers: metrics::performance_tiers(videos),
        video_metrics: metrics::compute_metric_sets(videos, now),
    }))
}

pub async fn get_patterns(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<PatternsResponse>, AppError> {
    let snapshot = state.load_snapshot(&channel).await?;
    let videos = &snapshot.videos;

    Ok(Json(PatternsResponse {
        channel_id: snapshot.channel_id.clone(),
        themes: patterns::detect_themes(videos),
        title_length: patterns::title_length_buckets(videos),
        duration: patterns::duration_buckets(videos),
        consistency: patterns::upload_consistency(videos),
        engagement_split: patterns::engagement_split(videos),
    }))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let videos_per_week = query.videos_per_week.unwrap_or(3);
    let weeks = query.weeks.unwrap_or(4);
    if videos_per_week == 0 {
        return Err(AppError::BadRequest(
            "videos_per_week must be at least 1".to_string(),
        ));
    }
    if weeks == 0 || weeks > MAX_CALENDAR_WEEKS {
        return Err(AppError::BadRequest(format!(
            "weeks must be between 1 and {MAX_CALENDAR_WEEKS}"
        )));
    }

    let snapshot = state.load_snapshot(&channel).await?;
    let start = Utc::now().date_naive();
    Ok(Json(CalendarResponse {
        channel_id: snapshot.channel_id.clone(),
        day_ranking: calendar::rank_days(&snapshot.videos),
        hour_ranking: calendar::rank_hours(&snapshot.videos),
        entries: calendar::generate_calendar(&snapshot.videos, start, weeks, videos_per_week),
    }))
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    let horizon = query.days.unwrap_or(state.settings.forecast.horizon_days);
    if horizon == 0 || horizon > MAX_FORECAST_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {MAX_FORECAST_DAYS}"
        )));
    }

    let snapshot = state.load_snapshot(&channel).await?;
    let settings = state.settings.forecast.clone();
    let response = tokio::task::spawn_blocking(move || ForecastResponse {
        channel_id: snapshot.channel_id.clone(),
        views: forecast::forecast_metric(
            &snapshot.videos,
            ForecastMetric::Views,
            horizon,
            &settings,
        ),
        subscribers: forecast::forecast_metric(
            &snapshot.videos,
            ForecastMetric::Subscribers,
            horizon,
            &settings,
        ),
        engagement: forecast::forecast_metric(
            &snapshot.videos,
            ForecastMetric::Engagement,
            horizon,
            &settings,
        ),
        trajectory: forecast::growth_trajectory(&snapshot.videos, &settings),
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(response))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<report::ReportData>, AppError> {
    let snapshot = state.load_snapshot(&channel).await?;
    let settings = state.settings.forecast.clone();
    let report = tokio::task::spawn_blocking(move || {
        report::build_report(&snapshot, &settings, Utc::now())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(report))
}

pub async fn get_report_markdown(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<String, AppError> {
    let snapshot = state.load_snapshot(&channel).await?;
    let settings = state.settings.forecast.clone();
    let markdown = tokio::task::spawn_blocking(move || {
        let report = report::build_report(&snapshot, &settings, Utc::now());
        report::render_markdown(&report)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(markdown)
}

pub async fn post_ab_test(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(body): Json<AbTestRequest>,
) -> Result<Json<ab_test::TitleChangeSimulation>, AppError> {
    if body.current_title.trim().is_empty() || body.proposed_title.trim().is_empty() {
        return Err(AppError::BadRequest(
            "both current_title and proposed_title are required".to_string(),
        ));
    }
    let snapshot = state.load_snapshot(&channel).await?;
    Ok(Json(ab_test::simulate_title_change(
        &snapshot.videos,
        &body.current_title,
        &body.proposed_title,
    )))
}

pub async fn post_chat(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if body.question.trim().is_empty() {
        return Err(AppError::BadRequest("question is required".to_string()));
    }
    let snapshot = state.load_snapshot(&channel).await?;
    let reply = chatbot::answer(
        &snapshot.videos,
        &body.question,
        state.llm.as_deref(),
        &state.settings.forecast,
    )
    .await;
    Ok(Json(ChatResponse {
        answer: reply.text,
        category: reply.category,
        source: reply.source,
    }))
}
