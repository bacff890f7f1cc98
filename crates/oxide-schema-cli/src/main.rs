//! oxide-schema CLI
//!
//! Command-line tool for reconciling model tables with a database.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use oxide_schema::{Connection, ModelSchema, SchemaRegistry};
use oxide_schema_sqlx::GatewayOptions;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use oxide_schema_cli::{describe, models, plan, status, sync, with_deadline};

/// Declarative, additive schema reconciliation.
#[derive(Parser)]
#[command(name = "oxide-schema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Maximum number of pooled connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables, columns and foreign keys.
    Sync {
        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,

        /// Abandon the pass after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show which tables and columns are missing.
    Status,

    /// Print the DDL each model declares.
    Describe {
        /// Print the declarations as JSON.
        #[arg(long)]
        json: bool,
    },
}

async fn connect(url: &str, options: GatewayOptions) -> anyhow::Result<Connection> {
    if url.starts_with("sqlite:") {
        let gateway = oxide_schema_sqlx::SqliteGateway::connect_with(url, options)
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;
        return Ok(gateway.into_connection());
    }
    #[cfg(feature = "mysql")]
    if url.starts_with("mysql:") {
        let gateway = oxide_schema_sqlx::MySqlGateway::connect_with(url, options)
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;
        return Ok(gateway.into_connection());
    }
    bail!("Unsupported database URL: {url}")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = GatewayOptions::default().max_connections(cli.max_connections);
    let connection = connect(&cli.database, options).await?;
    let registry = SchemaRegistry::new();
    let set = models::all();

    match cli.command {
        Commands::Sync {
            dry_run,
            timeout_secs,
        } => {
            let limit = timeout_secs.map(Duration::from_secs);
            let timed_out = || {
                let secs = timeout_secs.unwrap_or_default();
                anyhow!("Schema sync did not finish within {secs}s")
            };

            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                let statements = with_deadline(limit, plan(&set, &connection))
                    .await
                    .map_err(|_| timed_out())??;
                if statements.is_empty() {
                    info!("Nothing to do.");
                }
                for statement in &statements {
                    println!("{statement};");
                }
            } else {
                with_deadline(limit, sync(&set, &registry, &connection))
                    .await
                    .map_err(|_| timed_out())??;
            }
        }

        Commands::Status => {
            let report = status(&set, &registry, &connection).await?;

            println!("\nSchema status ({}):", connection.dialect().name());
            println!("{:-<60}", "");
            for table in &report {
                if !table.exists {
                    println!(" [ ] {} (missing)", table.table);
                } else if table.missing_columns.is_empty() {
                    println!(" [X] {}", table.table);
                } else {
                    println!(
                        " [~] {} (missing columns: {})",
                        table.table,
                        table.missing_columns.join(", ")
                    );
                }
            }
            println!();

            if report.iter().any(|t| !t.is_synced()) {
                warn!("Schema is out of date. Run `oxide-schema sync` to apply.");
            }
        }

        Commands::Describe { json } => {
            if json {
                let schemas = set.schemas(&registry);
                let declarations: Vec<&ModelSchema> = schemas.iter().map(Arc::as_ref).collect();
                println!("{}", serde_json::to_string_pretty(&declarations)?);
            } else {
                print!("{}", describe(&set, &registry, &connection));
            }
        }
    }

    Ok(())
}
