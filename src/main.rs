use anyhow::Context;
use fieldops_api::config::{load_config, AppConfig};
use fieldops_api::db::{establish_connection_from_app_config, run_migrations};
use fieldops_api::events::outbox::OutboxWorker;
use fieldops_api::events::{event_channel, process_events};
use fieldops_api::{handlers, AppState};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config);

    info!(
        environment = %config.environment,
        "Starting fieldops-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db = establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to database")?;
    if config.auto_migrate {
        run_migrations(&db).await.context("migrations failed")?;
    }

    let (event_sender, event_receiver) = event_channel(1024);
    tokio::spawn(process_events(event_receiver));
    tokio::spawn(OutboxWorker::new(db.clone(), event_sender).run());

    let state = AppState::new(db, config.clone());

    if config.maintenance_scan_interval_secs > 0 {
        let maintenance = state.services.maintenance.clone();
        let interval = Duration::from_secs(config.maintenance_scan_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = maintenance.scan(chrono::Utc::now().date_naive()).await {
                    error!("periodic maintenance scan failed: {}", e);
                }
            }
        });
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, handlers::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
