//! Kardex CLI
//!
//! Command-line interface for the Kardex asset catalog service.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{run_server, ServeConfig};

#[derive(Parser)]
#[command(name = "kardex")]
#[command(version)]
#[command(about = "Dynamic-schema asset catalog service", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Database URL (sqlite:// or postgres://)
        #[arg(
            short,
            long,
            env = "KARDEX_DATABASE_URL",
            default_value = "sqlite://kardex.db?mode=rwc"
        )]
        database: String,

        /// Shared secret clients must present in the X-API-KEY header
        #[arg(long, env = "KARDEX_API_KEY")]
        api_key: String,

        /// Disable Swagger UI
        #[arg(long)]
        no_swagger: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve {
            port,
            host,
            database,
            api_key,
            no_swagger,
        } => {
            run_server(ServeConfig {
                port,
                host,
                database_url: database,
                api_key,
                enable_swagger: !no_swagger,
                timeout_secs: 30,
            })
            .await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
