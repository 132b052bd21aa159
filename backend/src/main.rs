//! Main entry point for the calculator backend.
//!
//! This file initializes the Axum web server, sets up database connections,
//! and registers all API routes and middleware.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use anyhow::Context;
use config::Config;
use database::Database;
use services::user_service::UserService;
use tracing::info;
use tracing_subscriber::fmt::init;
use utils::jwt::JwtUtils;
use utils::password::PasswordHasher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let db = Database::new(&config)
        .await
        .context("Failed to initialize database")?;
    let pool = db.pool().clone();

    let hasher = PasswordHasher::new(config.bcrypt_cost);
    let jwt_utils = JwtUtils::from_config(&config);

    if let Some(admin) = &config.bootstrap_admin {
        let user = UserService::new(&pool, hasher)
            .ensure_admin(admin)
            .await
            .context("Failed to create bootstrap admin")?;
        info!("Bootstrap admin ready: {}", user.username);
    }

    let app = api::app_router(pool, jwt_utils, hasher);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting calculator server on port {}", config.server_port);
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}
