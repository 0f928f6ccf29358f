//! Showroom media pipeline daemon.
//!
//! Wires configuration, database, cache, the remote media store, and the
//! task queue together, then runs the pipeline worker until shutdown.
//! HTTP serving lives elsewhere; this binary owns the asynchronous side
//! of the system.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use showroom_cache::CacheManager;
use showroom_core::config::AppConfig;
use showroom_core::error::AppError;
use showroom_database::repositories::banner::BannerRepository;
use showroom_database::repositories::category::CategoryRepository;
use showroom_database::repositories::task::TaskRepository;
use showroom_media::{CdnMediaStore, StagingArea};
use showroom_worker::{
    MediaTaskProcessor, RepositoryWriteBack, TaskQueue, TaskSweeper, WorkerRunner,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Pipeline error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SHOWROOM_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Showroom pipeline v{}", env!("CARGO_PKG_VERSION"));

    // ── Database + migrations ────────────────────────────────────
    let db = showroom_database::DatabasePool::connect(&config.database).await?;
    showroom_database::migration::run_migrations(db.pool()).await?;

    // ── Cache ────────────────────────────────────────────────────
    let cache = CacheManager::new(&config.cache).await?;

    // ── Media store + staging ────────────────────────────────────
    let store = Arc::new(CdnMediaStore::new(&config.media.cdn)?);
    let staging = StagingArea::from_config(&config.media);
    tokio::fs::create_dir_all(staging.root()).await?;

    // ── Repositories ─────────────────────────────────────────────
    let banner_repo = Arc::new(BannerRepository::new(db.pool().clone()));
    let category_repo = Arc::new(CategoryRepository::new(db.pool().clone()));
    let task_repo = Arc::new(TaskRepository::new(db.pool().clone()));

    // ── Queue + worker ───────────────────────────────────────────
    let worker_id = format!("pipeline-{}", std::process::id());
    let queue = Arc::new(TaskQueue::new(
        Arc::clone(&task_repo),
        config.worker.queue.clone(),
        worker_id.clone(),
    ));

    let processor = Arc::new(MediaTaskProcessor::new(
        store,
        Arc::new(RepositoryWriteBack::new(banner_repo, category_repo)),
        staging,
        cache.clone(),
    ));

    let (cancel_tx, cancel_rx) = watch::channel(false);

    let mut handles = Vec::new();

    if config.worker.enabled {
        let runner = WorkerRunner::new(
            Arc::clone(&queue),
            processor,
            config.worker.clone(),
            worker_id,
        );
        let runner_cancel = cancel_rx.clone();
        handles.push(tokio::spawn(async move {
            runner.run(runner_cancel).await;
        }));
    } else {
        tracing::warn!("Worker disabled by configuration; tasks will accumulate");
    }

    let sweeper = TaskSweeper::new(
        Arc::clone(&task_repo),
        config.worker.sweep_interval_seconds,
        config.worker.retention_hours,
    );
    let sweeper_cancel = cancel_rx.clone();
    handles.push(tokio::spawn(async move {
        sweeper.run(sweeper_cancel).await;
    }));

    tracing::info!("Pipeline running, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;

    tracing::info!("Shutdown signal received");
    let _ = cancel_tx.send(true);

    for handle in handles {
        let _ = handle.await;
    }

    db.close().await;
    tracing::info!("Pipeline stopped");
    Ok(())
}
