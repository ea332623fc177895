use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pulse_onsite::config::Settings;
use pulse_onsite::engine::NotificationCenter;
use pulse_onsite::fetch::{HttpCandidateSource, PageContext};
use pulse_onsite::render::LogSink;
use pulse_onsite::runtime::{SystemClock, TokioScheduler};
use pulse_onsite::storage::FileStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(settings.display.debug);
    tracing::info!("Configuration loaded");

    // Durable client state
    let backend = Arc::new(FileStorage::new(&settings.storage.path)?);

    // Timer plumbing: armed timers come back through the receiver
    let (scheduler, mut timers) = TokioScheduler::new();

    let sink = Arc::new(LogSink::new());
    let mut center = NotificationCenter::new(
        settings.clone(),
        Arc::new(SystemClock),
        scheduler,
        sink,
        backend,
    );

    // One-shot candidate fetch, then the engine runs on timers and events
    let source = HttpCandidateSource::new(settings.api.base_url.clone());
    let page = PageContext {
        url: settings.api.page_url.clone(),
        page_id: settings.api.page_id,
    };
    center.start(&source, &page).await;
    tracing::info!("Engine started");

    loop {
        tokio::select! {
            Some(timer) = timers.recv() => center.handle_timer(timer),
            _ = signal::ctrl_c() => break,
        }
    }

    tracing::info!("Engine shutdown complete");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
