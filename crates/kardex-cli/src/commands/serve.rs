//! Serve command - starts the API server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use kardex_api::{ApiServer, ApiServerConfig, AppState};
use kardex_core::db::{create_pool, run_migrations};

/// Server configuration from CLI arguments.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Port to listen on.
    pub port: u16,
    /// Hostname to bind to.
    pub host: String,
    /// Database URL.
    pub database_url: String,
    /// Shared API-key secret.
    pub api_key: String,
    /// Enable Swagger UI.
    pub enable_swagger: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Runs the API server.
pub async fn run_server(config: ServeConfig) -> Result<()> {
    println!("{} Starting Kardex API Server...", "[server]".cyan());

    println!("  {} Database: {}", "→".green(), config.database_url);
    let db_pool = create_pool(&config.database_url)
        .await
        .context("Failed to create database connection pool")?;

    println!("  {} Running migrations...", "→".green());
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    println!("  {} Migrations complete", "✓".green());

    let state = AppState::new(db_pool, config.api_key);

    let bind_address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    let server_config = ApiServerConfig {
        bind_address,
        request_timeout: Duration::from_secs(config.timeout_secs),
        enable_swagger: config.enable_swagger,
    };

    println!();
    println!("{}", "Kardex API Server".bold());
    println!("{}", "═".repeat(40));
    println!("  {} http://{}", "Address:".cyan(), bind_address);
    println!("  {} {}", "Database:".cyan(), config.database_url);

    if config.enable_swagger {
        println!("  {} http://{}/docs", "Swagger UI:".cyan(), bind_address);
    }

    println!();
    println!("{}", "Endpoints:".bold());
    println!("  GET    /health                         - Health check");
    println!("  GET    /ready                          - Readiness probe");
    println!("  GET    /api/asset-types/               - List asset types");
    println!("  POST   /api/asset-types/               - Create asset type");
    println!("  GET    /api/asset-types/:id/           - Get asset type");
    println!("  GET    /api/asset-types/:id/fields/    - List type fields");
    println!("  POST   /api/asset-types/:id/fields/    - Add field to type");
    println!("  GET    /api/assets/                    - List assets");
    println!("  POST   /api/assets/                    - Create asset");
    println!("  GET    /api/assets/:id/                - Get asset");
    println!("  PUT    /api/assets/:id/                - Update asset values");
    println!("  DELETE /api/assets/:id/                - Delete asset");
    println!();
    println!("Press {} to stop", "Ctrl+C".yellow());
    println!();

    let server = ApiServer::new(state, server_config);
    server.run().await.context("Server error")?;

    println!();
    println!("{} Server stopped", "[server]".cyan());

    Ok(())
}
