//! Public API surface of the analytics engine.
//!
//! Re-exports the domain model and the result types produced by the
//! service layer so that consumers (the HTTP layer, the binary, tests)
//! can depend on a single flat module.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a single video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        VideoId(value.to_string())
    }
}

pub use crate::models::{ChannelSnapshot, ChannelTotals, MetricSet, VideoRecord};

pub use crate::services::ab_test::{
    Confidence, FeatureChange, FeatureChangeKind, FeatureLift, TitleChangeSimulation,
};
pub use crate::services::calendar::{CalendarEntry, ContentSlot, DayRanking, HourRanking};
pub use crate::services::chatbot::{AnswerSource, ChatAnswer, QuestionCategory};
pub use crate::services::forecast::{
    FitModel, FitSummary, ForecastResult, GrowthTrajectory, TrendLabel,
};
pub use crate::services::metrics::{
    DayPerformance, EngagementDistribution, HourPerformance, PerformanceTiers, SortKey,
    SummaryStats, TierInfo, VideoHighlight,
};
pub use crate::services::patterns::{
    BucketStats, EngagementSplit, GroupStats, ThemeStats, UploadConsistency,
};
pub use crate::services::report::ReportData;
