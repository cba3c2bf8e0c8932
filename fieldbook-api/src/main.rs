//! # Fieldbook API Server
//!
//! REST backend for the Fieldbook web app.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fieldbook-api
//! ```

use std::sync::Arc;

use fieldbook_api::{
    app::{build_router, AppState},
    config::Config,
};
use fieldbook_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    mail::{HttpMailer, LogMailer, Mailer},
    repository::Repositories,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fieldbook_api=debug,fieldbook_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Fieldbook API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let mailer: Arc<dyn Mailer> = match config.mail_config() {
        Some(mail_config) => Arc::new(HttpMailer::new(mail_config)?),
        None => {
            tracing::warn!("MAIL_API_URL not set, password reset emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let address = config.bind_address();
    let state = AppState::new(Repositories::postgres(pool.clone()), config, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, exiting...");
}
