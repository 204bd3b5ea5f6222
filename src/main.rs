//! Durable Cache - user directory tool
//!
//! Keeps a collection of users in a persisted cache on local disk.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use durable_cache::models::{load_users, User};
use durable_cache::{CacheConfig, CacheEngine, CacheHandle, FileBackend, RecordStore};

/// Storage key the user directory persists under.
const USER_STORAGE_KEY: &str = "user_data_center";

/// Durable Cache - user directory backed by a persisted cache
#[derive(Parser, Debug)]
#[command(name = "durable_cache")]
#[command(version)]
#[command(about = "User directory backed by a persisted TTL cache")]
struct Cli {
    /// Directory holding the persisted cache (defaults to $CACHE_DATA_DIR or ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List all users
    List,
    /// Add a user, replacing any user with the same id
    Add { id: String, name: String, email: String },
    /// Remove a user by id
    Remove { id: String },
    /// Replace the whole directory with users read from a JSON array
    Import { path: PathBuf },
    /// Print cache statistics
    Stats,
    /// Remove expired cache entries now
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "durable_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CacheConfig::from_env().with_storage_key(USER_STORAGE_KEY);
    let data_dir = cli
        .data_dir
        .or_else(|| env::var("CACHE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./data"));
    info!(
        "Configuration loaded: max_size={}, default_ttl={:?}, persistence={}, data_dir={}",
        config.max_size,
        config.default_ttl,
        config.enable_persistence,
        data_dir.display()
    );

    let engine = CacheEngine::new(config, FileBackend::new(&data_dir))
        .context("failed to open cache")?;
    let cache = CacheHandle::start(engine);
    let users = RecordStore::<User>::new(cache.clone());

    let outcome = run(&users, cli.command.unwrap_or(Command::List)).await;
    cache.shutdown();
    outcome
}

async fn run(users: &RecordStore<User>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            for user in users.list().await {
                println!("{}\t{}\t{}", user.id, user.name, user.email);
            }
        }
        Command::Add { id, name, email } => {
            users.add(User::new(id.as_str(), name, email)).await?;
            println!("User '{}' saved", id);
        }
        Command::Remove { id } => {
            if users.remove(&id).await? {
                println!("User '{}' removed", id);
            } else {
                println!("User '{}' not found", id);
            }
        }
        Command::Import { path } => {
            let loaded = load_users(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let count = loaded.len();
            users.save_all(loaded).await?;
            println!("Imported {} users", count);
        }
        Command::Stats => {
            let stats = users.cache().stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            println!("hit rate: {:.2}", stats.hit_rate());
        }
        Command::Sweep => {
            let removed = users.cache().sweep().await;
            println!("Removed {} expired entries", removed);
        }
    }
    Ok(())
}
