mod api;
mod feed;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    feed::FacilityFeed,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(ricelink_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = ricelink_db::PoolConfig::from_app_config(&config);
    let pool = ricelink_db::connect_pool(&config.database_url, pool_config).await?;
    ricelink_db::run_migrations(&pool).await?;

    let vietmap = match config.vietmap_api_key.as_deref() {
        Some(key) => Some(Arc::new(ricelink_vietmap::VietmapClient::with_base_url(
            key,
            config.vietmap_timeout_secs,
            &config.vietmap_base_url,
        )?)),
        None => {
            tracing::warn!("VIETMAP_API_KEY not set; the matching endpoint will be unavailable");
            None
        }
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        ricelink_core::Environment::Development
    ))?;
    let state = AppState {
        pool,
        config: Arc::clone(&config),
        vietmap,
        feed: FacilityFeed::new(),
        http: reqwest::Client::new(),
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "ricelink-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
