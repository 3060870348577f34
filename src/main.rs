use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gamesdb_mirror::api::handlers::parse_ids;
use gamesdb_mirror::api::models::GamesResult;
use gamesdb_mirror::api::ApiServer;
use gamesdb_mirror::config::MirrorConfig;
use gamesdb_mirror::store::{QueryStore, StoreHandle};
use gamesdb_mirror::sync::{DataDir, HttpOrigin, Pipeline, SyncOutcome, SyncReport};
use gamesdb_mirror::tracing::{init_tracing, DEFAULT_FILTER};
use gamesdb_mirror::util::env;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gamesdb-mirror", version, about = "TheGamesDB catalog mirror")]
struct Cli {
    /// Override DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Fetch the dump if it changed, then transform and persist it
    Sync,
    /// Re-transform the dump already on disk without contacting the origin
    Rebuild,
    /// Serve the query API from the persisted snapshot
    Serve {
        /// Run a sync before loading the snapshot
        #[arg(long, default_value_t = false)]
        sync: bool,
    },
    /// Answer one query against the persisted snapshot and print it as JSON
    Query {
        /// Case-insensitive title substring
        #[arg(long, conflicts_with = "ids", required_unless_present = "ids")]
        name: Option<String>,
        /// Comma-separated game ids
        #[arg(long)]
        ids: Option<String>,
        /// Result cap; defaults to MAX_RESULTS_PER_REQUEST
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    env::init_env();
    init_tracing(DEFAULT_FILTER)?;

    let cli = Cli::parse();
    let mut config = MirrorConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Sync => {
            let report = pipeline(&config)?.run().await.context("sync failed")?;
            log_report(&report);
        }
        Commands::Rebuild => {
            let report = pipeline(&config)?
                .rebuild()
                .await
                .context("rebuild failed")?;
            log_report(&report);
        }
        Commands::Serve { sync } => serve(config, sync).await?,
        Commands::Query { name, ids, limit } => {
            let data_dir = DataDir::new(&config.data_dir);
            let Some(db) = data_dir.read_clean().await? else {
                bail!(
                    "no snapshot in {}; run `gamesdb-mirror sync` first",
                    data_dir.root().display()
                );
            };
            let store = QueryStore::from(db);
            let limit = limit.unwrap_or(config.max_results);
            let games = match (name, ids) {
                (Some(name), _) => store.find_by_title(&name, limit),
                (None, Some(ids)) => store.find_by_ids(&parse_ids(&ids), limit),
                (None, None) => Vec::new(),
            };
            let body = GamesResult {
                games,
                image_base_urls: store.image_base_urls(),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

fn pipeline(config: &MirrorConfig) -> Result<Pipeline<HttpOrigin>> {
    let origin = HttpOrigin::new(config.dump_url.clone(), config.fetch_timeout)?;
    Ok(Pipeline::new(origin, DataDir::new(&config.data_dir)))
}

fn log_report(report: &SyncReport) {
    match &report.outcome {
        SyncOutcome::NotModified => info!(
            last_edit_id = report.meta.db_dump_last_edit_id,
            "dump unchanged"
        ),
        SyncOutcome::Updated(db) => info!(
            last_edit_id = report.meta.db_dump_last_edit_id,
            games = db.games.len(),
            "snapshot updated"
        ),
    }
}

async fn serve(config: MirrorConfig, sync_first: bool) -> Result<()> {
    let pipeline = pipeline(&config)?;

    let mut fresh = None;
    if sync_first {
        match pipeline.run().await {
            Ok(report) => {
                log_report(&report);
                if let SyncOutcome::Updated(db) = report.outcome {
                    fresh = Some(db);
                }
            }
            Err(e) => warn!(error = %e, "initial sync failed; serving persisted snapshot"),
        }
    }

    let store = match fresh {
        Some(db) => QueryStore::from(db),
        None => match pipeline.data_dir().read_clean().await {
            Ok(Some(db)) => QueryStore::from(db),
            Ok(None) => {
                warn!(
                    dir = %pipeline.data_dir().root().display(),
                    "no snapshot yet; serving an empty store"
                );
                QueryStore::empty()
            }
            Err(e) => {
                error!(error = %e, "snapshot unreadable; serving an empty store");
                QueryStore::empty()
            }
        },
    };
    info!(games = store.len(), "snapshot loaded");
    let store = Arc::new(StoreHandle::new(store));

    if let Some(every) = config.resync_interval {
        actix_web::rt::spawn(resync_loop(pipeline, store.clone(), every));
    }

    ApiServer::from_config(&config).run(store).await
}

/// One sync at a time; a failed run leaves the current snapshot serving.
async fn resync_loop(pipeline: Pipeline<HttpOrigin>, store: Arc<StoreHandle>, every: Duration) {
    info!(interval_secs = every.as_secs(), "background resync enabled");
    loop {
        tokio::time::sleep(every).await;
        match pipeline.run().await {
            Ok(report) => {
                log_report(&report);
                if let SyncOutcome::Updated(db) = report.outcome {
                    let previous = store.replace(QueryStore::from(db));
                    info!(
                        previous = previous.len(),
                        current = store.snapshot().len(),
                        "store swapped"
                    );
                }
            }
            Err(e) => warn!(error = %e, "resync failed; keeping current snapshot"),
        }
    }
}
