mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = basinq_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = basinq_core::load_catalog(config.catalog_path.as_deref())?;
    tracing::info!(
        family = %catalog.family,
        diameters = catalog.diameters().len(),
        source = config
            .catalog_path
            .as_ref()
            .map_or_else(|| "builtin".to_string(), |p| p.display().to_string()),
        "catalog loaded"
    );

    let extractor = basinq_vision::build_extractor(&config)?;
    let auth = AuthState::from_config(&config)?;
    let state = AppState {
        catalog: Arc::new(catalog),
        extractor,
        options: config.enrich_options(),
    };
    let app = build_app(
        state,
        auth,
        default_rate_limit_state(),
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        mode = %config.extraction_mode,
        non_positive_height = %config.non_positive_height,
        "basinq server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
