//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toto_screen::adapters::catalog::QuestionBank;
use toto_screen::adapters::persistence::{JsonStore, MemoryRepo, SqliteRepo};
use toto_screen::adapters::ui::tui::TuiInputPort;
use toto_screen::ports::{ChildRepository, InputPort, QuestionProvider, ScreeningRepository};
use toto_screen::shared::config::{AppConfig, StoreBackend};
use toto_screen::usecases::{ChildService, DashboardService, HistoryService, ScreeningService};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type Stores = (Arc<dyn ChildRepository>, Arc<dyn ScreeningRepository>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    toto_screen::adapters::ui::init_ui();

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("{}", e))?;
    let language = cfg.language().map_err(|e| anyhow::anyhow!("{}", e))?;
    let backend = cfg.store_backend().map_err(|e| anyhow::anyhow!("{}", e))?;
    let data_path = cfg.data_dir_or_default();
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), ?backend, ?language, "starting");

    let bank = QuestionBank::builtin().map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(count = bank.len(), "question bank loaded");
    let questions: Arc<dyn QuestionProvider> = Arc::new(bank);

    let (children, screenings) = open_store(backend, &data_path).await?;

    // --- Services ---
    let child_service = Arc::new(ChildService::new(Arc::clone(&children)));
    let screening_service = Arc::new(ScreeningService::new(
        Arc::clone(&questions),
        Arc::clone(&children),
        Arc::clone(&screenings),
    ));
    let recent_limit = cfg.recent_limit_or_default();
    let dashboard_service = Arc::new(DashboardService::new(
        Arc::clone(&children),
        Arc::clone(&screenings),
        recent_limit,
    ));
    let history_service = Arc::new(HistoryService::new(
        Arc::clone(&children),
        Arc::clone(&screenings),
    ));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        child_service,
        screening_service,
        dashboard_service,
        history_service,
        language,
        recent_limit,
    ));

    // --- Run (main menu -> screen / register / history / dashboard) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

/// One adapter serves both repositories.
async fn open_store(backend: StoreBackend, data_path: &Path) -> anyhow::Result<Stores> {
    match backend {
        StoreBackend::Sqlite => {
            let repo = Arc::new(
                SqliteRepo::connect(data_path)
                    .await
                    .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
            );
            info!(db = %repo.path().display(), "using SQLite store");
            Ok((
                Arc::clone(&repo) as Arc<dyn ChildRepository>,
                repo as Arc<dyn ScreeningRepository>,
            ))
        }
        StoreBackend::Json => {
            let store = JsonStore::new(data_path.join("store.json"));
            store.load().await.map_err(|e| anyhow::anyhow!("{}", e))?;
            let store = Arc::new(store);
            Ok((
                Arc::clone(&store) as Arc<dyn ChildRepository>,
                store as Arc<dyn ScreeningRepository>,
            ))
        }
        StoreBackend::Memory => {
            info!("memory store selected; nothing will be saved to disk");
            let repo = Arc::new(MemoryRepo::new());
            Ok((
                Arc::clone(&repo) as Arc<dyn ChildRepository>,
                repo as Arc<dyn ScreeningRepository>,
            ))
        }
    }
}
