mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use apotheca_api::auth::{AppState, AppStateInner};
use apotheca_core::notifications::{NotificationQueue, run_notification_worker};
use apotheca_core::object_store::LocalObjectStore;
use apotheca_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apotheca=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and object storage
    let db = Arc::new(Database::open(&config.db_path)?);
    let objects = Arc::new(LocalObjectStore::new(config.upload_dir.clone(), &config.public_url).await?);

    // Notification worker; stops once the app state (and its queue handle) is dropped
    let (queue, events) = NotificationQueue::new();
    let app_state: AppState = Arc::new(AppStateInner::new(
        db,
        objects.clone(),
        queue,
        config.notify_concurrency,
        config.jwt_secret.clone(),
    ));
    let worker = tokio::spawn(run_notification_worker(
        app_state.notifications.clone(),
        events,
    ));

    let cors = if config.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    };

    let app = apotheca_api::router(app_state)
        .nest_service("/uploads", ServeDir::new(objects.dir()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Apotheca server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last queue handle) is gone; let the
    // worker finish what is already queued.
    if let Err(e) = worker.await {
        error!("Notification worker ended abnormally: {}", e);
    }
    info!("Apotheca server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
