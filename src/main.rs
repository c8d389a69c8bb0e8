use std::sync::Arc;

use tokio::{signal, sync::watch};
use tracing_subscriber::EnvFilter;

use marquee_watch::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache},
    services::{
        delivery::{telegram::TelegramMessenger, Messenger},
        providers::{omdb::OmdbProvider, yts::YtsProvider, CatalogProvider, RatingsProvider},
        Monitor, NoveltyTracker,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);

    let catalog: Arc<dyn CatalogProvider> =
        Arc::new(YtsProvider::new(cache.clone(), config.yts_api_url.clone())?);

    let ratings: Option<Arc<dyn RatingsProvider>> = match config.omdb_api_key.clone() {
        Some(key) if !key.trim().is_empty() => Some(Arc::new(OmdbProvider::new(
            cache.clone(),
            key,
            config.omdb_api_url.clone(),
        )?)),
        _ => {
            tracing::warn!("OMDB_API_KEY not set, notifications will not include extra ratings");
            None
        }
    };

    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(
        config.telegram_api_url.clone(),
        config.bot_token.clone(),
        config.chat_id.clone(),
    )?);

    let monitor = Monitor::new(
        catalog,
        ratings,
        messenger,
        NoveltyTracker::default(),
        config.ranking_engine(),
        config.formatter(),
        config.monitor_settings(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = {
        let monitor = monitor.clone();
        let mut rx = shutdown_rx.clone();
        tokio::spawn(async move {
            monitor
                .run(async move {
                    let _ = rx.wait_for(|stop| *stop).await;
                })
                .await;
        })
    };

    let app = create_router(AppState::new(monitor));
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Control plane listening");

    let mut server_rx = shutdown_rx;
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = server_rx.wait_for(|stop| *stop).await;
    });

    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown requested");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Monitor task failed");
    }
    cache_writer.shutdown().await;

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
