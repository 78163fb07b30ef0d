//! showtimes - theater schedule retriever
//!
//! Prints a schedule, mails a multi-theater digest, or reconciles a
//! schedule into the local SQLite database.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use showtimes_common::config::{
    resolve_database_path, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use showtimes_common::db::init::init_database;
use showtimes_common::reconcile::reconcile_in_transaction;
use showtimes_common::theaters::{Theater, TheaterRegistry};
use showtimes_common::time::{self, parse_date_range, DateRange};
use showtimes_common::{Filter, FullSchedule};
use showtimes_retriever::cli::{Cli, Command, EmailArgs, PlaintextArgs, SqliteArgs};
use showtimes_retriever::notify::{build_digest, Address, MailtrapClient};
use showtimes_retriever::{
    collect_schedule, is_empty_input, FileListing, ListingClient, ListingSource, NO_DATA_MESSAGE,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config decides the log level, so it is read under a temporary subscriber
    let config = tracing::subscriber::with_default(stderr_subscriber("warn"), || {
        TomlConfig::load_or_default(cli.config.as_deref())
    })
    .context("Failed to load config")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(&config.logging.level))
        .init();

    info!("Starting showtimes v{}", env!("CARGO_PKG_VERSION"));

    let registry = TheaterRegistry::with_overrides(&config.theaters);
    let today = time::today();

    match cli.command {
        Command::Plaintext(args) => run_plaintext(args, &registry, today).await,
        Command::Email(args) => run_email(args, &config, &registry, today).await,
        Command::Sqlite(args) => run_sqlite(args, cli.root_folder, &config, &registry, today).await,
    }
}

/// `RUST_LOG` when set, otherwise the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn stderr_subscriber(level: &str) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(level))
        .finish()
}

/// Collect a schedule; `None` when there was no data at all
async fn collect_or_none<S: ListingSource + ?Sized>(
    source: &S,
    theater: &Theater,
    range: DateRange,
    filter: &Filter,
) -> Result<Option<FullSchedule>> {
    match collect_schedule(source, theater, range, filter).await {
        Ok(schedule) => Ok(Some(schedule)),
        Err(e) if is_empty_input(&e) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to collect schedule for {}", theater.name)),
    }
}

async fn run_plaintext(
    args: PlaintextArgs,
    registry: &TheaterRegistry,
    today: NaiveDate,
) -> Result<()> {
    let theater = registry.get(&args.theater)?;
    let filter = args.filter();

    let schedule = match (&args.filepath, &args.date) {
        (Some(path), _) => {
            let source = FileListing::new(path);
            collect_or_none(&source, theater, DateRange::single(today), &filter).await?
        }
        (None, date) => {
            let range = parse_date_range(date.as_deref().unwrap_or("today"), today)?;
            let client = ListingClient::new()?;
            collect_or_none(&client, theater, range, &filter).await?
        }
    };

    let Some(schedule) = schedule else {
        println!("{}", NO_DATA_MESSAGE);
        return Ok(());
    };

    println!("{}", schedule.output(args.name_only, args.date_only));
    println!("\n- {} showtimes", schedule.len());
    Ok(())
}

async fn run_email(
    args: EmailArgs,
    config: &TomlConfig,
    registry: &TheaterRegistry,
    today: NaiveDate,
) -> Result<()> {
    let range = parse_date_range(&args.date, today)?;

    let theaters: Vec<&Theater> = if args.theaters.is_empty() {
        registry.iter().collect()
    } else {
        args.theaters
            .iter()
            .map(|name| registry.get(name))
            .collect::<showtimes_common::Result<_>>()?
    };

    let from = args
        .from
        .or_else(|| config.mail.sender.clone())
        .context("No sender address: pass --from or set [mail] sender")?;
    let from_name = args
        .from_name
        .unwrap_or_else(|| config.mail.sender_name.clone());
    let to = args
        .to
        .or_else(|| config.mail.receiver.clone())
        .context("No recipient address: pass --to or set [mail] receiver")?;

    let mailer = MailtrapClient::from_env()?;
    let client = ListingClient::new()?;

    let mut schedules = BTreeMap::new();
    for theater in theaters {
        match collect_or_none(&client, theater, range, &Filter::empty()).await? {
            Some(schedule) => {
                schedules.insert(theater.name.clone(), schedule);
            }
            None => warn!(theater = %theater.name, "{}", NO_DATA_MESSAGE),
        }
    }

    if schedules.is_empty() {
        println!("{}", NO_DATA_MESSAGE);
        return Ok(());
    }

    let mail = build_digest(
        &schedules,
        range,
        Address::named(from, from_name),
        Address::new(to),
        time::now(),
    );
    mailer.send(&mail).await?;

    info!(theaters = schedules.len(), subject = %mail.subject, "Digest sent");
    Ok(())
}

async fn run_sqlite(
    args: SqliteArgs,
    root_folder: Option<PathBuf>,
    config: &TomlConfig,
    registry: &TheaterRegistry,
    today: NaiveDate,
) -> Result<()> {
    let theater = registry.get(&args.theater)?;
    let range = parse_date_range(&args.date, today)?;

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(root_folder)
        .with_config(config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = resolve_database_path(config, initializer.root_folder());
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let client = ListingClient::new()?;
    let Some(schedule) = collect_or_none(&client, theater, range, &Filter::empty()).await? else {
        println!("{}", NO_DATA_MESSAGE);
        return Ok(());
    };

    let report = reconcile_in_transaction(&pool, &theater.name, range, &schedule)
        .await
        .context("Reconciliation failed")?;

    println!(
        "{}: {} inserted, {} unchanged, {} removed",
        theater.name,
        report.inserted,
        report.skipped,
        report.deleted.len()
    );

    pool.close().await;
    Ok(())
}
