//! sql-tracer - run SQL files against MySQL and keep a trace of each run.

use sql_tracer::cli::Cli;
use sql_tracer::config::{Config, ConnectionConfig};
use sql_tracer::db::{self, DatabaseClient};
use sql_tracer::error::{Result, TracerError};
use sql_tracer::logging;
use sql_tracer::query::Query;
use sql_tracer::secrets::{self, SecretStorage};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A .env file may provide MYSQL_* connection defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let config = Config::load_from_file(&cli.config_path());

    // Log level: CLI flag, then config file, then RUST_LOG
    let log_level = cli.log_level.clone().or_else(|| {
        config
            .as_ref()
            .ok()
            .and_then(|config| config.log_level.clone())
    });
    logging::init_stderr_logging(log_level.as_deref());

    let result = match config {
        Ok(config) => run(&cli, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut connection = resolve_connection(cli, config)?;
    secrets::resolve_password(
        &mut connection,
        &SecretStorage::new(),
        cli.ask_password,
        cli.store_password,
    )?;

    info!("Connection: {}", connection.display_string());
    let client: Arc<dyn DatabaseClient> = Arc::from(db::connect(&connection).await?);

    let template_vars = cli.template_vars();
    let queries: Vec<Query> = cli
        .queries
        .iter()
        .map(|path| Query::new(path, template_vars.clone(), Arc::clone(&client)))
        .collect();

    let destination = cli.destination.as_deref().or(config.destination.as_deref());
    let outcome = run_queries(&queries, cli.display, destination).await;

    client.close().await?;
    outcome
}

/// Runs the queries one after the other, stopping at the first failure.
async fn run_queries(queries: &[Query], display: bool, destination: Option<&Path>) -> Result<()> {
    for query in queries {
        if display {
            query.display().await?;
        } else {
            let (report, _export) = query.export(destination).await?;
            info!("{} traced in {}", query.name(), report.display());
        }
    }
    Ok(())
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let cli_connection = cli.to_connection_config()?;

    // A connection string is complete on its own
    if cli.url.is_some() {
        if let Some(conn) = cli_connection {
            return Ok(conn);
        }
    }

    // Named connection, or the default one, from the config file
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            TracerError::config(format!("Connection '{name}' not found in config file"))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    // Individual CLI flags override the file
    if let Some(overrides) = &cli_connection {
        connection.merge(overrides);
    }

    connection.apply_env_defaults();

    if connection.database.is_none() {
        return Err(TracerError::config(
            "No database configured. Use --url, --database or a [connections] entry.",
        ));
    }

    Ok(connection)
}
