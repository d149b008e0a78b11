//! Video sources: where channel snapshots come from.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ChannelSnapshot;

mod demo;

pub use demo::DemoSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("channel not found: {0}")]
    NotFound(String),
    #[error("source quota exceeded")]
    QuotaExceeded,
    #[error("transport error: {0}")]
    Transport(String),
}

/// A backend able to produce a channel snapshot with up to `max_videos`
/// recent uploads.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_channel(
        &self,
        channel: &str,
        max_videos: usize,
    ) -> Result<ChannelSnapshot, SourceError>;
}
