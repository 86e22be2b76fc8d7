//! # ncemacros: NCE macro provisioning tool
//!
//! Composition root that wires a resource store into the macro-set services
//! and runs them once.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations, or use an
//!   in-memory store for dry runs
//! - Construct the application services, injecting the store via the port
//!   trait
//! - Print the resulting report and map it to the process exit status
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ncemacros_adapter_storage_sqlite_sqlx::{Config as DatabaseConfig, SqliteResourceStore};
use ncemacros_app::memory_store::InMemoryResourceStore;
use ncemacros_app::ports::ResourceStore;
use ncemacros_app::services::{MacroSetAuditor, MacroSetProvisioner};
use ncemacros_domain::id::MacroCount;
use ncemacros_domain::station::CommandStation;

use crate::config::Config;

/// Create, wire and activate NCE macro triggers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (defaults to `ncemacros.toml` if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command station preset deciding the macro count
    #[arg(long)]
    station: Option<CommandStation>,

    /// Explicit number of macros, overriding the station preset
    #[arg(long)]
    count: Option<u32>,

    /// `SQLite` connection URL
    #[arg(long)]
    database_url: Option<String>,

    /// Only report drift from the desired macro set; change nothing
    #[arg(long, conflicts_with_all = ["dry_run", "export"])]
    check: bool,

    /// Provision into an in-memory store instead of the database
    #[arg(long, conflicts_with = "export")]
    dry_run: bool,

    /// Print every stored resource as JSON and exit
    #[arg(long)]
    export: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Command-line flags take precedence over file and environment values.
    fn apply_to(&self, config: &mut Config) {
        if let Some(station) = self.station {
            config.provisioning.station = station;
        }
        if let Some(count) = self.count {
            config.provisioning.macro_count = Some(count);
        }
        if let Some(url) = &self.database_url {
            config.database.url.clone_from(url);
        }
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print<T: Serialize + std::fmt::Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

/// Run the selected use case; returns whether the store matches the
/// desired macro set afterwards.
async fn execute<S: ResourceStore>(
    store: S,
    args: &Args,
    count: MacroCount,
) -> anyhow::Result<bool> {
    if args.check {
        let report = MacroSetAuditor::new(store).audit(count).await?;
        print(&report, args.json)?;
        return Ok(report.is_clean());
    }

    let report = MacroSetProvisioner::new(store).provision(count).await?;
    print(&report, args.json)?;
    Ok(report.is_success())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    init_tracing(&config.logging.filter);

    let count = config.macro_count()?;
    tracing::info!(
        station = %config.provisioning.station,
        count = %count,
        dry_run = args.dry_run,
        check = args.check,
        "starting"
    );

    let clean = if args.dry_run {
        execute(InMemoryResourceStore::new(), &args, count).await?
    } else {
        let db = DatabaseConfig {
            database_url: config.database_url().to_string(),
        }
        .build()
        .await?;
        let store = SqliteResourceStore::new(db.pool().clone());

        if args.export {
            let graph = store.export().await?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            return Ok(ExitCode::SUCCESS);
        }
        execute(store, &args, count).await?
    };

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
