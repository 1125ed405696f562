use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_manager::api::router;
use schedule_manager::config::{AppConfig, StoreBackend};
use schedule_manager::db;
use schedule_manager::error::AppError;
use schedule_manager::services::{ReloadScheduler, ScheduleController};
use schedule_manager::state::AppState;
use schedule_manager::store::{DocumentStore, FirestoreClient, MemoryStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "schedule_manager=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let store = open_store(&config).await?;

    let controller = Arc::new(ScheduleController::new(store));
    controller.check_connection().await?;

    match controller.load().await {
        Ok(stats) => info!("initial load: {} subjects, {} assignments", stats.subjects, stats.assignments),
        Err(e) => warn!("initial load failed, starting empty: {}", e),
    }

    if config.refresh_interval_secs > 0 {
        let scheduler = ReloadScheduler::new(controller.clone(), config.refresh_interval_secs);
        tokio::spawn(scheduler.start());
    }

    let state = AppState::new(controller, Duration::from_millis(config.assistant_delay_ms));
    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    match config.backend {
        StoreBackend::Firestore => {
            let firestore = config
                .firestore
                .clone()
                .ok_or_else(|| AppError::Config("Firestore settings missing".to_string()))?;
            info!("using Firestore project {}", firestore.project_id);
            Ok(Arc::new(FirestoreClient::new(firestore)?))
        }
        StoreBackend::Sqlite => {
            info!("using SQLite store at {}", config.database_url);
            let pool = db::connect(&config.database_url, 5).await?;
            Ok(Arc::new(SqliteStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("using in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
