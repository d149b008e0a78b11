//! Shared application state and the snapshot-loading pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::LlmClient;
use crate::models::ChannelSnapshot;
use crate::sources::{DemoSource, VideoSource};
use crate::store::SnapshotCache;

use super::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn VideoSource>,
    pub llm: Option<Arc<dyn LlmClient>>,
    pub cache: Arc<SnapshotCache>,
    pub settings: Arc<Settings>,
    demo: Arc<DemoSource>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn VideoSource>,
        llm: Option<Arc<dyn LlmClient>>,
        settings: Settings,
    ) -> Self {
        let cache = Arc::new(SnapshotCache::new(Duration::from_secs(
            settings.cache_ttl_secs,
        )));
        let demo = Arc::new(DemoSource::new(settings.demo_seed));
        AppState {
            source,
            llm,
            cache,
            settings: Arc::new(settings),
            demo,
        }
    }

    /// Load a channel snapshot: fresh cache first, then the source, then
    /// a stale cache entry, and finally generated demo data so every
    /// request gets an answer.
    pub async fn load_snapshot(&self, channel: &str) -> Result<Arc<ChannelSnapshot>, AppError> {
        if let Some(snapshot) = self.cache.fresh(channel) {
            return Ok(snapshot);
        }

        match self
            .source
            .fetch_channel(channel, self.settings.max_videos)
            .await
        {
            Ok(snapshot) if !snapshot.is_empty() => {
                info!(channel, videos = snapshot.len(), "fetched channel snapshot");
                Ok(self.cache.store(channel, snapshot))
            }
            Ok(_) => {
                warn!(channel, "source returned an empty channel, using demo data");
                self.demo_fallback(channel)
            }
            Err(e) => {
                warn!(channel, error = %e, "source fetch failed");
                if let Some(stale) = self.cache.any(channel) {
                    return Ok(stale);
                }
                self.demo_fallback(channel)
            }
        }
    }

    fn demo_fallback(&self, channel: &str) -> Result<Arc<ChannelSnapshot>, AppError> {
        let snapshot = self.demo.generate(channel, self.settings.max_videos);
        Ok(self.cache.store(channel, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceError;
    use async_trait::async_trait;

    struct BrokenSource;

    #[async_trait]
    impl VideoSource for BrokenSource {
        async fn fetch_channel(
            &self,
            _channel: &str,
            _max_videos: usize,
        ) -> Result<ChannelSnapshot, SourceError> {
            Err(SourceError::Transport("boom".to_string()))
        }
    }

    fn demo_state() -> AppState {
        let settings = Settings::default();
        let source = Arc::new(DemoSource::new(settings.demo_seed));
        AppState::new(source, None, settings)
    }

    #[tokio::test]
    async fn test_load_snapshot_caches_the_fetch() {
        let state = demo_state();
        let first = state.load_snapshot("creator").await.unwrap();
        let second = state.load_snapshot("creator").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_broken_source_falls_back_to_demo_data() {
        let settings = Settings::default();
        let state = AppState::new(Arc::new(BrokenSource), None, settings);
        let snapshot = state.load_snapshot("creator").await.unwrap();
        assert!(!snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_stale_cache_preferred_over_demo_on_failure() {
        let mut settings = Settings::default();
        settings.cache_ttl_secs = 0;
        let state = AppState::new(Arc::new(BrokenSource), None, settings);
        // Seed the cache directly, then expire it.
        let seeded = DemoSource::new(1).generate("creator", 10);
        let seeded_name = seeded.channel_name.clone();
        state.cache.store("creator", seeded);
        let snapshot = state.load_snapshot("creator").await.unwrap();
        assert_eq!(snapshot.channel_name, seeded_name);
        assert_eq!(snapshot.len(), 10);
    }
}
