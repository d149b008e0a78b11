//! Forecaster: least-squares trend fits over daily aggregates, forward
//! projections with a confidence band, and the growth trajectory label.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ForecastSettings;
use crate::models::VideoRecord;
use crate::services::{mean, population_std};

/// Which daily aggregate is forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMetric {
    Views,
    Subscribers,
    Engagement,
}

/// Trend model selected for a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitModel {
    Linear,
    Quadratic,
}

/// Fitted model coefficients. `quadratic` is None for a linear fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub model: FitModel,
    pub intercept: f64,
    pub slope: f64,
    pub quadratic: Option<f64>,
    pub r_squared: f64,
}

/// Forward projection of one daily metric.
///
/// When the history cannot support a fit, every series is empty and
/// `unavailable_reason` says why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub metric: ForecastMetric,
    pub horizon_days: usize,
    pub dates: Vec<NaiveDate>,
    pub predictions: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub model: Option<FitSummary>,
    pub total_forecast: f64,
    pub daily_average: f64,
    pub unavailable_reason: Option<String>,
}

impl ForecastResult {
    fn unavailable(metric: ForecastMetric, horizon_days: usize, reason: &str) -> Self {
        ForecastResult {
            metric,
            horizon_days,
            dates: Vec::new(),
            predictions: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
            model: None,
            total_forecast: 0.0,
            daily_average: 0.0,
            unavailable_reason: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Accelerating,
    Stable,
    Declining,
}

/// First-half vs second-half comparison of average views over the
/// channel's chronological upload history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthTrajectory {
    pub label: TrendLabel,
    /// None when the first half averages zero views.
    pub growth_pct: Option<f64>,
    pub first_half_avg_views: f64,
    pub second_half_avg_views: f64,
}

/// Daily aggregate of one metric, keyed by publish date.
fn daily_series(videos: &[VideoRecord], metric: ForecastMetric) -> BTreeMap<NaiveDate, f64> {
    match metric {
        ForecastMetric::Views => {
            let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for v in videos {
                *days.entry(v.published_date()).or_insert(0.0) += v.views as f64;
            }
            days
        }
        ForecastMetric::Subscribers => {
            let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for v in videos {
                if let Some(gained) = v.subscribers_gained {
                    *days.entry(v.published_date()).or_insert(0.0) += gained as f64;
                }
            }
            days
        }
        ForecastMetric::Engagement => {
            let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
            for v in videos {
                if let Some(rate) = v.engagement_rate() {
                    let entry = sums.entry(v.published_date()).or_insert((0.0, 0));
                    entry.0 += rate;
                    entry.1 += 1;
                }
            }
            sums.into_iter()
                .map(|(date, (sum, n))| (date, sum / n as f64))
                .collect()
        }
    }
}

/// Ordinary least squares line over (x, y) points.
/// Returns (intercept, slope); None when x has no spread.
fn fit_linear(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((intercept, slope))
}

/// Degree-2 polynomial fit via the normal equations.
/// Returns (c0, c1, c2) of c0 + c1*x + c2*x^2.
fn fit_quadratic(points: &[(f64, f64)]) -> Option<(f64, f64, f64)> {
    let n = points.len() as f64;
    let s1: f64 = points.iter().map(|(x, _)| x).sum();
    let s2: f64 = points.iter().map(|(x, _)| x.powi(2)).sum();
    let s3: f64 = points.iter().map(|(x, _)| x.powi(3)).sum();
    let s4: f64 = points.iter().map(|(x, _)| x.powi(4)).sum();
    let t0: f64 = points.iter().map(|(_, y)| y).sum();
    let t1: f64 = points.iter().map(|(x, y)| x * y).sum();
    let t2: f64 = points.iter().map(|(x, y)| x * x * y).sum();

    solve_3x3(
        [[n, s1, s2], [s1, s2, s3], [s2, s3, s4]],
        [t0, t1, t2],
    )
    .map(|c| (c[0], c[1], c[2]))
}

/// Gaussian elimination with partial pivoting on a 3x3 system.
fn solve_3x3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = [0.0; 3];
    for col in (0..3).rev() {
        let mut sum = b[col];
        for k in (col + 1)..3 {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }
    Some(x)
}

fn r_squared(points: &[(f64, f64)], predict: impl Fn(f64) -> f64) -> f64 {
    let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
    let avg = match mean(&ys) {
        Some(m) => m,
        None => return 0.0,
    };
    let ss_res: f64 = points.iter().map(|(x, y)| (y - predict(*x)).powi(2)).sum();
    let ss_tot: f64 = ys.iter().map(|y| (y - avg).powi(2)).sum();
    if ss_tot.abs() < f64::EPSILON {
        // Flat history: a fit that reproduces it exactly counts as perfect.
        return if ss_res < 1e-9 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Forecast `metric` for `horizon` days past the last publish date.
///
/// Linear fit always; for views a quadratic is also tried once the
/// history spans at least `poly_min_samples` distinct days, and wins on
/// in-sample R^2. Predictions are floored at zero (engagement is further
/// capped at 100); the 95% band is prediction plus or minus 1.96
/// in-sample residual standard deviations.
pub fn forecast_metric(
    videos: &[VideoRecord],
    metric: ForecastMetric,
    horizon: usize,
    settings: &ForecastSettings,
) -> ForecastResult {
    let series = daily_series(videos, metric);
    if series.is_empty() {
        let reason = match metric {
            ForecastMetric::Views => "no view history",
            ForecastMetric::Subscribers => "subscriber data not available",
            ForecastMetric::Engagement => "no video has a defined engagement rate",
        };
        return ForecastResult::unavailable(metric, horizon, reason);
    }
    if series.len() < 2 {
        return ForecastResult::unavailable(
            metric,
            horizon,
            "at least two distinct publish days are required",
        );
    }

    let first_date = *series.keys().next().unwrap_or(&NaiveDate::MIN);
    let last_date = *series.keys().next_back().unwrap_or(&NaiveDate::MIN);
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(date, value)| ((*date - first_date).num_days() as f64, *value))
        .collect();

    let (intercept, slope) = match fit_linear(&points) {
        Some(fit) => fit,
        None => {
            return ForecastResult::unavailable(metric, horizon, "history has no time spread")
        }
    };
    let linear_r2 = r_squared(&points, |x| intercept + slope * x);

    let mut summary = FitSummary {
        model: FitModel::Linear,
        intercept,
        slope,
        quadratic: None,
        r_squared: linear_r2,
    };
    // Only the views trend ever gets a curved fit; subscriber and
    // engagement forecasts stay linear.
    if metric == ForecastMetric::Views && series.len() >= settings.poly_min_samples {
        if let Some((c0, c1, c2)) = fit_quadratic(&points) {
            let quad_r2 = r_squared(&points, |x| c0 + c1 * x + c2 * x * x);
            if quad_r2 > linear_r2 {
                summary = FitSummary {
                    model: FitModel::Quadratic,
                    intercept: c0,
                    slope: c1,
                    quadratic: Some(c2),
                    r_squared: quad_r2,
                };
            }
        }
    }

    let predict = |x: f64| match summary.model {
        FitModel::Linear => summary.intercept + summary.slope * x,
        FitModel::Quadratic => {
            summary.intercept + summary.slope * x + summary.quadratic.unwrap_or(0.0) * x * x
        }
    };

    let residuals: Vec<f64> = points.iter().map(|(x, y)| y - predict(*x)).collect();
    let residual_std = population_std(&residuals).unwrap_or(0.0);
    let band = 1.96 * residual_std;

    let last_x = (last_date - first_date).num_days() as f64;
    let mut dates = Vec::with_capacity(horizon);
    let mut predictions = Vec::with_capacity(horizon);
    let mut lower = Vec::with_capacity(horizon);
    let mut upper = Vec::with_capacity(horizon);
    for step in 1..=horizon {
        let x = last_x + step as f64;
        let raw = predict(x);
        // Engagement is a percentage, so it cannot leave [0, 100].
        let value = if metric == ForecastMetric::Engagement {
            raw.clamp(0.0, 100.0)
        } else {
            raw.max(0.0)
        };
        dates.push(last_date + Duration::days(step as i64));
        predictions.push(value);
        lower.push(value - band);
        upper.push(value + band);
    }

    let total_forecast: f64 = predictions.iter().sum();
    let daily_average = if horizon > 0 {
        total_forecast / horizon as f64
    } else {
        0.0
    };

    ForecastResult {
        metric,
        horizon_days: horizon,
        dates,
        predictions,
        lower,
        upper,
        model: Some(summary),
        total_forecast,
        daily_average,
        unavailable_reason: None,
    }
}

/// Classify channel growth by comparing average views of the first and
/// second chronological halves of the upload history. None with fewer
/// than two videos.
pub fn growth_trajectory(
    videos: &[VideoRecord],
    settings: &ForecastSettings,
) -> Option<GrowthTrajectory> {
    if videos.len() < 2 {
        return None;
    }
    let mut ordered: Vec<&VideoRecord> = videos.iter().collect();
    ordered.sort_by_key(|v| v.published_at);
    let mid = ordered.len() / 2;

    let first: Vec<f64> = ordered[..mid].iter().map(|v| v.views as f64).collect();
    let second: Vec<f64> = ordered[mid..].iter().map(|v| v.views as f64).collect();
    let first_avg = mean(&first)?;
    let second_avg = mean(&second)?;

    let (growth_pct, label) = if first_avg > 0.0 {
        let pct = (second_avg - first_avg) / first_avg * 100.0;
        let label = if pct > settings.accelerating_pct {
            TrendLabel::Accelerating
        } else if pct < settings.declining_pct {
            TrendLabel::Declining
        } else {
            TrendLabel::Stable
        };
        (Some(pct), label)
    } else {
        (None, TrendLabel::Stable)
    };

    Some(GrowthTrajectory {
        label,
        growth_pct,
        first_half_avg_views: first_avg,
        second_half_avg_views: second_avg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VideoId;
    use chrono::{TimeZone, Utc};

    fn create_test_video(day: u32, views: u64) -> VideoRecord {
        VideoRecord {
            id: VideoId::from(format!("v{day}").as_str()),
            title: format!("Video {day}"),
            published_at: Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap(),
            duration_seconds: 600,
            views,
            likes: views / 20,
            comments: views / 100,
            impressions: None,
            subscribers_gained: None,
        }
    }

    #[test]
    fn test_linear_history_forecasts_the_exact_line() {
        // Views 100, 200, ..., 500 on consecutive days: y = 100 * (x + 1).
        let videos: Vec<VideoRecord> =
            (1..=5).map(|d| create_test_video(d, d as u64 * 100)).collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Views,
            3,
            &ForecastSettings::default(),
        );
        let fit = result.model.unwrap();
        assert_eq!(fit.model, FitModel::Linear);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!((result.predictions[0] - 600.0).abs() < 1e-6);
        assert!((result.predictions[2] - 800.0).abs() < 1e-6);
        // Perfect fit, so the band collapses onto the prediction.
        assert!((result.upper[0] - result.lower[0]).abs() < 1e-6);
    }

    #[test]
    fn test_single_day_history_is_unavailable() {
        let videos = vec![create_test_video(1, 500)];
        let result = forecast_metric(
            &videos,
            ForecastMetric::Views,
            30,
            &ForecastSettings::default(),
        );
        assert!(result.unavailable_reason.is_some());
        assert!(result.predictions.is_empty());
    }

    #[test]
    fn test_same_day_uploads_aggregate_into_one_point() {
        let mut videos = vec![create_test_video(1, 300)];
        videos.push(create_test_video(1, 200));
        let result = forecast_metric(
            &videos,
            ForecastMetric::Views,
            5,
            &ForecastSettings::default(),
        );
        // Two uploads on one date collapse to a single day, not enough to fit.
        assert!(result.unavailable_reason.is_some());
    }

    #[test]
    fn test_declining_trend_floors_at_zero() {
        let videos: Vec<VideoRecord> = (1..=5)
            .map(|d| create_test_video(d, 500 - d as u64 * 100))
            .collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Views,
            10,
            &ForecastSettings::default(),
        );
        assert!(result.predictions.iter().all(|p| *p >= 0.0));
        assert_eq!(*result.predictions.last().unwrap(), 0.0);
    }

    #[test]
    fn test_quadratic_selected_for_curved_history() {
        // y = x^2 over 12 distinct days, clearly not linear.
        let videos: Vec<VideoRecord> =
            (1..=12).map(|d| create_test_video(d, (d * d) as u64)).collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Views,
            5,
            &ForecastSettings::default(),
        );
        let fit = result.model.unwrap();
        assert_eq!(fit.model, FitModel::Quadratic);
        assert!((fit.r_squared - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_not_tried_below_sample_threshold() {
        let videos: Vec<VideoRecord> =
            (1..=6).map(|d| create_test_video(d, (d * d) as u64)).collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Views,
            5,
            &ForecastSettings::default(),
        );
        assert_eq!(result.model.unwrap().model, FitModel::Linear);
    }

    #[test]
    fn test_subscriber_forecast_stays_linear_on_curved_history() {
        // Quadratic subscriber gains over 12 distinct days would win on
        // R^2, but only the views metric is allowed a curved fit.
        let videos: Vec<VideoRecord> = (1..=12)
            .map(|d| {
                let mut v = create_test_video(d, 1_000);
                v.subscribers_gained = Some((d * d) as u64);
                v
            })
            .collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Subscribers,
            5,
            &ForecastSettings::default(),
        );
        assert_eq!(result.model.unwrap().model, FitModel::Linear);
    }

    #[test]
    fn test_engagement_forecast_capped_at_one_hundred() {
        // Engagement rates 60%..100% rising 10 points a day would cross
        // 100% on the first forecast day without the cap.
        let videos: Vec<VideoRecord> = (1..=5)
            .map(|d| {
                let mut v = create_test_video(d, 100);
                v.likes = 50 + d as u64 * 10;
                v.comments = 0;
                v
            })
            .collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Engagement,
            10,
            &ForecastSettings::default(),
        );
        assert!(result.unavailable_reason.is_none());
        assert!(result.predictions.iter().all(|p| *p <= 100.0));
        assert_eq!(*result.predictions.last().unwrap(), 100.0);
    }

    #[test]
    fn test_subscriber_forecast_unavailable_without_data() {
        let videos: Vec<VideoRecord> = (1..=5).map(|d| create_test_video(d, 100)).collect();
        let result = forecast_metric(
            &videos,
            ForecastMetric::Subscribers,
            30,
            &ForecastSettings::default(),
        );
        assert_eq!(
            result.unavailable_reason.as_deref(),
            Some("subscriber data not available")
        );
    }

    #[test]
    fn test_growth_trajectory_accelerating() {
        let mut videos: Vec<VideoRecord> = (1..=4).map(|d| create_test_video(d, 100)).collect();
        videos.extend((5..=8).map(|d| create_test_video(d, 500)));
        let t = growth_trajectory(&videos, &ForecastSettings::default()).unwrap();
        assert_eq!(t.label, TrendLabel::Accelerating);
        assert_eq!(t.growth_pct, Some(400.0));
    }

    #[test]
    fn test_growth_trajectory_stable_within_band() {
        let mut videos: Vec<VideoRecord> = (1..=4).map(|d| create_test_video(d, 100)).collect();
        videos.extend((5..=8).map(|d| create_test_video(d, 105)));
        let t = growth_trajectory(&videos, &ForecastSettings::default()).unwrap();
        assert_eq!(t.label, TrendLabel::Stable);
    }

    #[test]
    fn test_growth_trajectory_declining() {
        let mut videos: Vec<VideoRecord> = (1..=4).map(|d| create_test_video(d, 1000)).collect();
        videos.extend((5..=8).map(|d| create_test_video(d, 100)));
        let t = growth_trajectory(&videos, &ForecastSettings::default()).unwrap();
        assert_eq!(t.label, TrendLabel::Declining);
    }

    #[test]
    fn test_growth_trajectory_zero_first_half_is_stable() {
        let videos = vec![create_test_video(1, 0), create_test_video(2, 500)];
        let t = growth_trajectory(&videos, &ForecastSettings::default()).unwrap();
        assert_eq!(t.label, TrendLabel::Stable);
        assert_eq!(t.growth_pct, None);
    }

    #[test]
    fn test_growth_trajectory_needs_two_videos() {
        assert!(growth_trajectory(
            &[create_test_video(1, 100)],
            &ForecastSettings::default()
        )
        .is_none());
    }
}
