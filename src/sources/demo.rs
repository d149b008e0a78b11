//! Deterministic demo data generator. Seeded per channel so the same
//! channel name always yields the same history.

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::VideoId;
use crate::models::{ChannelSnapshot, ChannelTotals, VideoRecord};

use super::{SourceError, VideoSource};

/// Hours that get most uploads; the rest of the day is a fallback.
const PEAK_HOURS: [u32; 5] = [12, 14, 15, 17, 19];

/// (category, title stems, duration range in seconds)
const CATEGORIES: &[(&str, &[&str], (u32, u32))] = &[
    (
        "Tutorial",
        &[
            "How to Edit Faster",
            "Complete Beginner Guide to Lighting",
            "How to Script a Video, Step by Step",
            "Tutorial: Color Grading Basics",
        ],
        (480, 1500),
    ),
    (
        "Review",
        &[
            "Honest Review of the New Camera",
            "Unboxing My Studio Upgrade",
            "Is This Microphone Worth It",
        ],
        (360, 900),
    ),
    (
        "List",
        &[
            "Top 10 Editing Mistakes",
            "Best 5 Free Tools for Creators",
            "7 Tips for Better Thumbnails",
        ],
        (300, 720),
    ),
    (
        "Entertainment",
        &[
            "I Tried Uploading Daily Challenge",
            "Studio Vlog: Behind the Chaos",
            "Q&A: You Asked, I Answer",
        ],
        (600, 1800),
    ),
    (
        "Educational",
        &[
            "Why Watch Time Beats Views, Explained",
            "What Is the Algorithm Actually Doing",
            "Understanding Audience Retention",
        ],
        (540, 1200),
    ),
];

pub struct DemoSource {
    seed: u64,
}

impl DemoSource {
    pub fn new(seed: u64) -> Self {
        DemoSource { seed }
    }

    fn channel_seed(&self, channel: &str) -> u64 {
        channel
            .bytes()
            .fold(self.seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
    }

    /// Build a deterministic history of `count` uploads ending today.
    pub fn generate(&self, channel: &str, count: usize) -> ChannelSnapshot {
        let mut rng = StdRng::seed_from_u64(self.channel_seed(channel));
        let now = Utc::now();
        let count = count.max(1);
        let start = now.date_naive() - Duration::days(count as i64);

        let mut videos = Vec::with_capacity(count);
        let mut total_subs: u64 = 0;
        for i in 0..count {
            let (_category, titles, (min_dur, max_dur)) =
                CATEGORIES[rng.random_range(0..CATEGORIES.len())];
            let stem = titles[rng.random_range(0..titles.len())];

            let hour = if rng.random_bool(0.7) {
                PEAK_HOURS[rng.random_range(0..PEAK_HOURS.len())]
            } else {
                rng.random_range(8..23)
            };
            let date = start + Duration::days(i as i64);
            let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
            let published_at = date.and_time(time).and_utc();

            // Channel grows slowly over the window, with a rare viral spike.
            let growth = 1.0 + i as f64 / count as f64;
            let mut views =
                (2_000.0 * growth * rng.random_range(0.2..3.0)).round() as u64;
            if rng.random_bool(0.05) {
                views *= rng.random_range(5..15);
            }

            let likes = (views as f64 * rng.random_range(0.02..0.08)).round() as u64;
            let comments = (views as f64 * rng.random_range(0.002..0.02)).round() as u64;
            let impressions = (views as f64 * rng.random_range(2.0..5.0)).round() as u64;
            let gained = (views as f64 * rng.random_range(0.01..0.05)).round() as u64;
            total_subs += gained;

            videos.push(VideoRecord {
                id: VideoId(format!("demo-{channel}-{i:04}")),
                title: format!("{stem} #{}", i + 1),
                published_at,
                duration_seconds: rng.random_range(min_dur..=max_dur),
                views,
                likes,
                comments,
                impressions: Some(impressions),
                subscribers_gained: Some(gained),
            });
        }

        // Newest first, matching what a real source returns.
        videos.reverse();
        let total_views = videos.iter().map(|v| v.views).sum();
        ChannelSnapshot {
            channel_id: channel.to_string(),
            channel_name: format!("Demo Channel ({channel})"),
            totals: ChannelTotals {
                subscriber_count: total_subs * 12,
                total_views,
            },
            videos,
            fetched_at: now,
        }
    }
}

#[async_trait]
impl VideoSource for DemoSource {
    async fn fetch_channel(
        &self,
        channel: &str,
        max_videos: usize,
    ) -> Result<ChannelSnapshot, SourceError> {
        Ok(self.generate(channel, max_videos))
    }
}
