// src/main.rs

use std::{net::SocketAddr, sync::Arc, time::Duration};

use academically::{
    config::Config,
    error::AppError,
    repository::{PgRepository, Repository},
    routes,
    state::AppState,
    telemetry,
    utils::hash::hash_password,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let _guard = telemetry::init_tracing(&config.rust_log, "logs");

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    return Err(e.into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };
    tracing::info!("Database connected...");

    let repo = PgRepository::new(pool);

    tracing::info!("Running migrations...");
    repo.migrate().await?;
    tracing::info!("Migrations applied successfully.");

    if let Err(e) = seed_admin_user(&repo, &config).await {
        tracing::error!("Failed to seed admin user: {}", e);
    }

    let state = AppState {
        repo: Arc::new(repo),
        config: config.clone(),
    };
    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn seed_admin_user(repo: &PgRepository, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    if repo.find_user_by_username(username).await?.is_none() {
        tracing::info!("Seeding admin user: {}", username);
        let hashed_password = hash_password(password)?;
        repo.create_user(username, &hashed_password, "admin").await?;
        tracing::info!("Admin user created successfully.");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
