use anyhow::{Context, Result};
use api_ingress::ApiIngress;
use clap::{Parser, Subcommand};
use datasource::Data;
use mimalloc::MiMalloc;
use products::{ProductsConfig, ProductsModule};
use runtime::{AppConfig, CliArgs, DataConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use users::{UsersConfig, UsersModule};

mod migrate;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Layout Server - users and products over HTTP
#[derive(Parser)]
#[command(name = "layout-server")]
#[command(about = "Layout Server - users and products over HTTP")]
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

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let home_dir = PathBuf::from(&config.server.home_dir);

    let (otel_layer, telemetry, export_error) =
        match runtime::telemetry::init_tracing(config.tracing.as_ref()) {
            Ok((layer, guard)) => (layer, guard, None),
            Err(e) => (None, runtime::TelemetryGuard::disabled(), Some(e)),
        };
    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::config::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, &home_dir, otel_layer);
    if let Some(e) = export_error {
        tracing::warn!(error = format!("{e:#}"), "span export disabled");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Layout Server starting");

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config, &home_dir).await,
        Commands::Check => check_config(&config),
        Commands::Migrate => run_migrations(&config, &home_dir).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = format!("{e:#}"), "Layout Server failed");
    }
    telemetry.shutdown();
    result
}

async fn run_server(config: &AppConfig, home_dir: &Path) -> Result<()> {
    let data = Data::connect(&config.data, home_dir)
        .await
        .context("connecting data stores")?;
    let data = Arc::new(data);

    let result = serve(config, data.clone()).await;

    data.shutdown().await;
    tracing::info!("Layout Server stopped");
    result
}

async fn serve(config: &AppConfig, data: Arc<Data>) -> Result<()> {
    let auto_migrate = config
        .data
        .relational
        .as_ref()
        .is_some_and(|r| r.auto_migrate);
    if auto_migrate {
        migrate::apply(&data).await?;
    }

    tracing::info!("Initializing modules...");
    let users = UsersModule::new(&data, config.module_config::<UsersConfig>("users")?)
        .context("initializing users module")?;
    let products = ProductsModule::new(&data, config.module_config::<ProductsConfig>("products")?)
        .context("initializing products module")?;

    let mut openapi = UsersModule::openapi();
    openapi.merge(ProductsModule::openapi());
    openapi.info.title = "Layout API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

    let ingress = ApiIngress::new(config.server.clone(), openapi)?;
    let routes = users.router().merge(products.router());
    let router = ingress.build_router(routes, data)?;

    let cancel = CancellationToken::new();
    let signals = svckit::shutdown::cancel_on_signal(cancel.clone());

    let result = ingress.serve(router, cancel).await;
    signals.abort();
    result
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(rel) = &config.data.relational {
        datasource::DbEngine::from_driver(&rel.driver)
            .with_context(|| format!("invalid data.relational.driver '{}'", rel.driver))?;
    }
    config.module_config::<UsersConfig>("users")?;
    config.module_config::<ProductsConfig>("products")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_migrations(config: &AppConfig, home_dir: &Path) -> Result<()> {
    let relational_only = DataConfig {
        relational: config.data.relational.clone(),
        ..DataConfig::default()
    };
    let data = Data::connect(&relational_only, home_dir)
        .await
        .context("connecting relational store")?;

    let result = migrate::apply(&data).await;
    data.shutdown().await;
    result
}
