//! Runtime configuration, read from environment variables with sensible
//! defaults so the server starts with no setup at all.

use std::env;

/// Parameters of the forecaster and the growth classifier.
#[derive(Debug, Clone)]
pub struct ForecastSettings {
    /// Default forecast horizon in days.
    pub horizon_days: usize,
    /// Minimum number of distinct publish days before the degree-2
    /// polynomial model is considered.
    pub poly_min_samples: usize,
    /// Second-half vs first-half growth (percent) above which the channel
    /// counts as accelerating.
    pub accelerating_pct: f64,
    /// Growth (percent) below which the channel counts as declining.
    pub declining_pct: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        ForecastSettings {
            horizon_days: 30,
            poly_min_samples: 10,
            accelerating_pct: 10.0,
            declining_pct: -10.0,
        }
    }
}

/// Connection settings for the hosted chat-completion API. Absent when no
/// API key is configured; the chatbot then runs rule-based only.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// How many recent uploads a source fetch asks for.
    pub max_videos: usize,
    /// Snapshot cache time-to-live in seconds.
    pub cache_ttl_secs: u64,
    /// Seed of the demo data generator.
    pub demo_seed: u64,
    pub llm: Option<LlmSettings>,
    pub forecast: ForecastSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_videos: 150,
            cache_ttl_secs: 900,
            demo_seed: 42,
            llm: None,
            forecast: ForecastSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        let llm = env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()).map(|api_key| {
            LlmSettings {
                api_key,
                base_url: env_or("LLM_BASE_URL", "https://api.openai.com/v1"),
                model: env_or("LLM_MODEL", "gpt-4o-mini"),
            }
        });

        Settings {
            host: env_or("HOST", &defaults.host),
            port: env_parse("PORT", defaults.port),
            max_videos: env_parse("MAX_VIDEOS", defaults.max_videos),
            cache_ttl_secs: env_parse("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            demo_seed: env_parse("DEMO_SEED", defaults.demo_seed),
            llm,
            forecast: ForecastSettings {
                horizon_days: env_parse("FORECAST_HORIZON_DAYS", defaults.forecast.horizon_days),
                poly_min_samples: env_parse(
                    "FORECAST_POLY_MIN_SAMPLES",
                    defaults.forecast.poly_min_samples,
                ),
                accelerating_pct: env_parse(
                    "GROWTH_ACCELERATING_PCT",
                    defaults.forecast.accelerating_pct,
                ),
                declining_pct: env_parse("GROWTH_DECLINING_PCT", defaults.forecast.declining_pct),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
