use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use fee_chat::{
    config::Config,
    routes,
    services::{
        completion::OpenAiProvider, prompt::build_system_prompt, rate_limiter::RateLimiter,
    },
    state::AppState,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fee_chat=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    debug!(?config, "configuration loaded");

    // Nothing binds until the prompt is ready.
    let prompt = build_system_prompt(&config.prompt)
        .await
        .context("failed to load system prompt")?;

    let provider =
        OpenAiProvider::new(&config.provider).context("failed to build provider client")?;
    info!(model = provider.model(), "completion provider ready");

    let state = Arc::new(AppState::new(&config, prompt, Arc::new(provider)));
    spawn_rate_limit_purge(state.limiter.clone());

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("🚀 Server is running on http://localhost:{}", config.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn spawn_rate_limit_purge(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        loop {
            ticker.tick().await;
            let removed = limiter.purge_expired().await;
            if removed > 0 {
                debug!(removed, "expired rate limit windows purged");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
