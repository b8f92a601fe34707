use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use catalog::{Catalog, CatalogConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit_db::DbHandle;
use runtime::{AppConfig, CliArgs};

mod http;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "catalog";

/// Catalog Server - movie catalog REST service
#[derive(Parser)]
#[command(name = "catalog-server")]
#[command(about = "Catalog Server - movie catalog REST service")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("Catalog Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::Migrate => migrate(config).await,
    }
}

fn catalog_config(config: &AppConfig) -> Result<CatalogConfig> {
    CatalogConfig::from_value(config.module_config(MODULE_NAME))
}

async fn connect(config: &AppConfig) -> Result<DbHandle> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database configuration is required"))?;
    if db_config.url.trim().is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let dsn = db_config.resolved_url(&config.home_dir());
    tracing::info!(
        "Connecting to database: {}",
        modkit_db::redact_credentials_in_dsn(Some(&dsn))
    );
    let db = DbHandle::connect(&dsn, db_config.connect_opts())
        .await
        .context("failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let catalog_cfg = catalog_config(&config)?;
    let db = connect(&config).await?;
    Catalog::migrate(db.seaorm()).await?;

    let catalog = Catalog::new(db.sea(), &catalog_cfg)?;
    let router = http::build_router(catalog.router(), config.server.request_timeout());

    let result = http::serve(router, &config.server.bind_addr()).await;
    db.close().await;
    tracing::info!("Catalog Server stopped");
    result
}

async fn migrate(config: AppConfig) -> Result<()> {
    let db = connect(&config).await?;
    Catalog::migrate(db.seaorm()).await?;
    db.close().await;
    println!("Migrations applied");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    catalog_config(&config)?;
    if config.database.is_none() {
        return Err(anyhow!("Database configuration is required"));
    }
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server: {}", config.server.bind_addr());
    Ok(())
}
