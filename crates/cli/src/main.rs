//! Waitline CLI - drives the persistent queue on the local device

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;

use config::{AppConfig, DEFAULT_DB_PATH, DEFAULT_NAMESPACE};
use waitline_core::application::{CheckInService, PersistentOrderedQueue};
use waitline_core::domain::{QueueEntry, QueueUpdate};
use waitline_core::port::SystemTimeProvider;
use waitline_infra_sqlite::{create_pool, run_migrations, SqliteKeyValueStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "waitline")]
#[command(about = "Durable ordered queue with permanent numbering", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (or sqlx URL)
    #[arg(long, env = "WAITLINE_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db_path: String,

    /// Queue namespace
    #[arg(long, env = "WAITLINE_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Number a participant (or recall their number) and queue them once
    CheckIn {
        /// Participant UID
        uid: String,
    },

    /// Remove a participant from the queue
    CheckOut {
        /// Participant UID
        uid: String,
    },

    /// Add an entry with an explicit timestamp and number
    Add {
        /// Participant UID
        uid: String,

        /// Timestamp (YYYY-MM-DD HH:MM:SS)
        #[arg(short, long)]
        timestamp: String,

        /// Sequence number
        #[arg(short, long)]
        number: i64,

        /// Add even if the UID is already queued
        #[arg(long)]
        allow_duplicate: bool,
    },

    /// Apply a queue update received from a peer (JSON)
    Apply {
        /// e.g. {"uid":"04A1","timestamp":"2024-01-01 10:00:00","number":3,"remove_from_queue":false}
        update: String,
    },

    /// Show a participant's permanent number without assigning one
    Number {
        /// Participant UID
        uid: String,
    },

    /// Exit with status 0 if the UID is queued, 1 otherwise
    Exists {
        /// Participant UID
        uid: String,
    },

    /// List the queue in order
    List {
        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    Text,
    Table,
    Json,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "No")]
    number: i64,
    #[tabled(rename = "UID")]
    uid: String,
    #[tabled(rename = "Time")]
    timestamp: String,
}

impl From<&QueueEntry> for EntryRow {
    fn from(entry: &QueueEntry) -> Self {
        Self {
            number: entry.number,
            uid: entry.uid.clone(),
            timestamp: entry.timestamp.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    logging::init(logging::LogFormat::from_env())?;
    info!("Waitline v{} starting...", VERSION);

    // 2. Load configuration
    let config = AppConfig::resolve(&cli.db_path, &cli.namespace)?;
    info!(database = %config.database_url, namespace = %config.namespace, "Opening queue");

    // 3. Initialize database
    let pool = create_pool(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Wire the queue
    let store = Arc::new(SqliteKeyValueStore::new(pool.clone()));
    let queue = PersistentOrderedQueue::open(store, &config.namespace)
        .await
        .context("Failed to load queue")?;

    let exit_code = run(cli.command, queue).await?;

    pool.close().await;
    std::process::exit(exit_code);
}

async fn run(command: Commands, mut queue: PersistentOrderedQueue) -> Result<i32> {
    match command {
        Commands::CheckIn { uid } => {
            let mut service = checkin_service(queue);
            let outcome = service.check_in(&uid).await?;

            if outcome.newly_queued {
                println!("{}", format!("✓ {} queued", uid).green().bold());
            } else {
                println!("{}", format!("• {} already waiting", uid).yellow());
            }
            println!("{}", outcome.entry);
        }

        Commands::CheckOut { uid } => {
            let mut service = checkin_service(queue);

            if service.check_out(&uid).await? {
                println!("{}", format!("✓ Removed from queue: {}", uid).green().bold());
            } else {
                println!("{}", format!("{} was not queued", uid).yellow());
            }
        }

        Commands::Add {
            uid,
            timestamp,
            number,
            allow_duplicate,
        } => {
            let added = if allow_duplicate {
                queue.add(&uid, &timestamp, number).await?;
                true
            } else {
                queue.add_if_new(&uid, &timestamp, number).await?
            };

            if added {
                println!("{}", format!("✓ {} added", uid).green().bold());
            } else {
                println!("{}", format!("• {} already queued", uid).yellow());
            }
        }

        Commands::Apply { update } => {
            let update: QueueUpdate =
                serde_json::from_str(&update).context("Invalid update JSON")?;
            let uid = update.uid.clone();

            let mut service = checkin_service(queue);
            service.apply_update(update).await?;

            println!("{}", format!("✓ Update for {} applied", uid).green().bold());
        }

        Commands::Number { uid } => match queue.permanent_number(&uid).await? {
            Some(number) => println!("{}", number),
            None => {
                println!("{}", format!("{} has no permanent number", uid).yellow());
                return Ok(1);
            }
        },

        Commands::Exists { uid } => {
            let exists = queue.exists(&uid);
            println!("{}", exists);
            if !exists {
                return Ok(1);
            }
        }

        Commands::List { format } => match format {
            ListFormat::Text => queue.print(),
            ListFormat::Table => {
                let rows: Vec<EntryRow> = queue.iter().map(EntryRow::from).collect();
                println!("{}", Table::new(rows));
            }
            ListFormat::Json => {
                println!("{}", serde_json::to_string_pretty(queue.entries())?);
            }
        },
    }

    Ok(0)
}

fn checkin_service(queue: PersistentOrderedQueue) -> CheckInService {
    CheckInService::new(queue, Arc::new(SystemTimeProvider))
}
