use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tubescope::config::Settings;
use tubescope::http::{create_router, AppState};
use tubescope::llm::{LlmClient, OpenAiClient};
use tubescope::sources::{DemoSource, VideoSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let settings = Settings::from_env();

    let source: Arc<dyn VideoSource> = Arc::new(DemoSource::new(settings.demo_seed));
    let llm: Option<Arc<dyn LlmClient>> = match &settings.llm {
        Some(llm_settings) => match OpenAiClient::new(llm_settings) {
            Ok(client) => {
                info!(model = %llm_settings.model, "chat completion client configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "completion client unavailable, chatbot runs rule-based only");
                None
            }
        },
        None => None,
    };

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(source, llm, settings);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "analytics server listening");
    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
