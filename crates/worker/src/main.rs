use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driveline_events::TransitionFeed;
use driveline_gemini::{GeminiClient, Oracle};
use driveline_pipeline::{
    ColumnarConverter, DashboardRunner, DriveAnalyzer, ExportRunner, JobRunner, RouteMatcher,
    SweepScheduler, TransitionDispatcher, VinDecoder,
};
use driveline_storage::{BlobStore, LocalBlobStore, S3BlobStore};

mod config;

use config::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "driveline_worker=debug,driveline_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = driveline_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    driveline_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    driveline_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Oracle ---
    let gemini = GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_pro_model.clone(),
        config.gemini_flash_model.clone(),
    );
    tracing::info!(
        pro_model = gemini.pro_model(),
        flash_model = gemini.flash_model(),
        "Gemini client created"
    );
    let oracle: Arc<dyn Oracle> = Arc::new(gemini);

    // --- Blob store ---
    let store: Arc<dyn BlobStore> = match (&config.storage_root, &config.s3_bucket) {
        (Some(root), _) => {
            tracing::info!(root = %root, "Using local blob store");
            Arc::new(LocalBlobStore::new(root))
        }
        (None, Some(bucket)) => Arc::new(S3BlobStore::new(bucket.clone()).await),
        (None, None) => panic!("Either S3_BUCKET or STORAGE_ROOT must be set"),
    };

    // --- Pipeline tasks ---
    let cancel = CancellationToken::new();
    let mut handles = Vec::new();

    let dispatcher = TransitionDispatcher::new(
        pool.clone(),
        TransitionFeed::new(config.feed_batch_size, config.feed_visibility_timeout_secs),
        DriveAnalyzer::new(pool.clone(), Arc::clone(&oracle)),
        RouteMatcher::new(pool.clone()),
        ColumnarConverter::new(pool.clone(), Arc::clone(&store)),
        VinDecoder::new(pool.clone(), config.vin_api_base.clone()),
    );
    let task_cancel = cancel.clone();
    handles.push(tokio::spawn(async move {
        dispatcher.run(task_cancel).await;
    }));

    let job_runner = JobRunner::new(pool.clone(), Arc::clone(&oracle));
    let task_cancel = cancel.clone();
    handles.push(tokio::spawn(async move {
        job_runner.run(task_cancel).await;
    }));

    let dashboard_runner = DashboardRunner::new(pool.clone(), Arc::clone(&oracle));
    let task_cancel = cancel.clone();
    handles.push(tokio::spawn(async move {
        dashboard_runner.run(task_cancel).await;
    }));

    let export_runner = ExportRunner::new(pool.clone(), Arc::clone(&store));
    let task_cancel = cancel.clone();
    handles.push(tokio::spawn(async move {
        export_runner.run(task_cancel).await;
    }));

    let sweep_scheduler = SweepScheduler::new(pool.clone(), Arc::clone(&oracle));
    let task_cancel = cancel.clone();
    handles.push(tokio::spawn(async move {
        sweep_scheduler.run(task_cancel).await;
    }));

    tracing::info!(
        task_count = handles.len(),
        "Worker started (dispatcher, job runners, sweep scheduler)"
    );

    // --- Shutdown ---
    shutdown_signal().await;

    cancel.cancel();
    for handle in handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
