mod application;
mod domain;
mod infrastructure;
mod presentation;
mod shared;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum::routing::{delete, get, post};
use axum::Router;
use tokio_cron_scheduler::JobScheduler;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::application::{BatchSearchWantedUseCase, ScanWantedUseCase, SearchWantedItemUseCase, TranslateFileUseCase};
use crate::domain::repositories::{
    AnidbRepository, BlacklistRepository, ConfigRepository, JobRepository, ProviderCacheRepository,
    StatsRepository, WantedRepository,
};
use crate::infrastructure::database::{initialize_schema, ConnectionPool, ConnectionPoolConfig};
use crate::infrastructure::external::ffmpeg::FFprobeAdapter;
use crate::infrastructure::external::whisper::WhisperAdapter;
use crate::infrastructure::gpu::GpuCoordinator;
use crate::infrastructure::jobs::WhisperQueue;
use crate::infrastructure::media_server::{JellyfinBackend, MediaServerManager, PlexBackend};
use crate::infrastructure::messaging::{EventCatalog, NamedEventBus};
use crate::infrastructure::persistence::sqlite::{
    SqliteAnidbRepository, SqliteBlacklistRepository, SqliteConfigRepository, SqliteJobRepository,
    SqliteProviderCacheRepository, SqliteStatsRepository, SqliteWantedRepository,
};
use crate::infrastructure::providers::hash_match::HashMatchProvider;
use crate::infrastructure::providers::manager::ProviderManager;
use crate::infrastructure::providers::metadata_search::MetadataSearchProvider;
use crate::infrastructure::scheduler::{AnidbRefreshTask, BackupTask, CleanupTask, PeriodicTask, WantedScanTask, WantedSearchTask};
use crate::infrastructure::subtitle::detector::SubtitleDetector;
use crate::infrastructure::translation::{GlossaryNativeBackend, OpenAiCompatBackend, TranslationManager};
use crate::infrastructure::translator::engine::TranslatorEngine;
use crate::infrastructure::wanted::{CatalogClient, MediaManagerAClient, MediaManagerBClient, SearchLoop, WantedScanner};
use crate::presentation::http::handlers::{health_handlers, job_handlers, status_handlers, wanted_handlers};
use crate::presentation::http::middleware::{cors, logging};
use crate::shared::config::Config;

#[derive(Clone)]
struct AppState {
    scan_use_case: Arc<ScanWantedUseCase>,
    search_one_use_case: Arc<SearchWantedItemUseCase>,
    batch_search_use_case: Arc<BatchSearchWantedUseCase>,
    translate_file_use_case: Arc<TranslateFileUseCase>,
    job_repository: Arc<dyn JobRepository>,
    whisper_queue: Arc<WhisperQueue>,
    stats_repository: Arc<dyn StatsRepository>,
}

impl FromRef<AppState> for Arc<ScanWantedUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.scan_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<SearchWantedItemUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.search_one_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<BatchSearchWantedUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.batch_search_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<TranslateFileUseCase> {
    fn from_ref(state: &AppState) -> Self {
        state.translate_file_use_case.clone()
    }
}

impl FromRef<AppState> for Arc<dyn JobRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.job_repository.clone()
    }
}

impl FromRef<AppState> for Arc<WhisperQueue> {
    fn from_ref(state: &AppState) -> Self {
        state.whisper_queue.clone()
    }
}

impl FromRef<AppState> for Arc<dyn StatsRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.stats_repository.clone()
    }
}

async fn build_provider_manager(
    config: &Config,
    cache_repository: Arc<dyn ProviderCacheRepository>,
    blacklist_repository: Arc<dyn BlacklistRepository>,
) -> anyhow::Result<Arc<ProviderManager>> {
    let mut manager = ProviderManager::new(cache_repository, blacklist_repository);

    if !config.series_catalog_url.is_empty() {
        manager
            .register(Arc::new(HashMatchProvider::new(&config.series_catalog_url, &config.series_catalog_api_key)))
            .await?;
        manager
            .register(Arc::new(MetadataSearchProvider::new(&config.series_catalog_url, &config.series_catalog_api_key)))
            .await?;
    }

    Ok(Arc::new(manager))
}

fn build_translation_manager(config: &Config) -> Arc<TranslationManager> {
    let mut manager = TranslationManager::new();

    if let Ok(base_url) = std::env::var("TRANSLATION_OPENAI_BASE_URL") {
        let api_key = std::env::var("TRANSLATION_OPENAI_API_KEY").unwrap_or_default();
        let model = std::env::var("TRANSLATION_OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        manager.register(Arc::new(OpenAiCompatBackend::new(&base_url, &api_key, &model)));
    }

    if let Ok(base_url) = std::env::var("TRANSLATION_GLOSSARY_BASE_URL") {
        let api_key = std::env::var("TRANSLATION_GLOSSARY_API_KEY").unwrap_or_default();
        manager.register(Arc::new(GlossaryNativeBackend::new(&base_url, &api_key)));
    }

    let _ = config;
    Arc::new(manager)
}

fn build_media_server_manager(config: &Config) -> Arc<MediaServerManager> {
    let mut manager = MediaServerManager::new();

    if let (Some(url), Some(api_key)) = (&config.jellyfin_url, &config.jellyfin_api_key) {
        manager.register(Arc::new(JellyfinBackend::new(url, api_key, Duration::from_secs(30))), true);
    }
    if let (Some(url), Some(token)) = (&config.plex_url, &config.plex_token) {
        manager.register(Arc::new(PlexBackend::new(url, token, Duration::from_secs(30))), true);
    }

    Arc::new(manager)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    info!(data_dir = %config.data_dir, "starting sublarrd");

    let pool_config = ConnectionPoolConfig::new(config.database_url.clone());
    let connection_pool = ConnectionPool::create(pool_config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create connection pool: {}", e))?;
    let pool = connection_pool.inner().clone();
    initialize_schema(&pool).await?;

    let wanted_repository: Arc<dyn WantedRepository> = Arc::new(SqliteWantedRepository::new(pool.clone()));
    let job_repository: Arc<dyn JobRepository> = Arc::new(SqliteJobRepository::new(pool.clone()));
    let provider_cache_repository: Arc<dyn ProviderCacheRepository> = Arc::new(SqliteProviderCacheRepository::new(pool.clone()));
    let blacklist_repository: Arc<dyn BlacklistRepository> = Arc::new(SqliteBlacklistRepository::new(pool.clone()));
    let stats_repository: Arc<dyn StatsRepository> = Arc::new(SqliteStatsRepository::new(pool.clone()));
    let anidb_repository: Arc<dyn AnidbRepository> = Arc::new(SqliteAnidbRepository::new(pool.clone()));
    let config_repository: Arc<dyn ConfigRepository> = Arc::new(SqliteConfigRepository::new(pool.clone()));

    let provider_manager = build_provider_manager(&config, provider_cache_repository.clone(), blacklist_repository.clone()).await?;
    let translation_manager = build_translation_manager(&config);
    let media_server_manager = build_media_server_manager(&config);

    let whisper_model_path = std::env::var("WHISPER_MODEL_PATH").unwrap_or_else(|_| "/app/models/ggml-small.bin".to_string());
    let whisper_adapter = Arc::new(WhisperAdapter::new(
        std::path::PathBuf::from(whisper_model_path),
        Duration::from_secs(3600),
    ));
    let ffprobe_adapter = Arc::new(FFprobeAdapter::new(Duration::from_secs(10)));
    let gpu_coordinator = Arc::new(GpuCoordinator::new());

    let translator_engine = Arc::new(TranslatorEngine {
        provider_manager: provider_manager.clone(),
        translation_manager: translation_manager.clone(),
        whisper_adapter: whisper_adapter.clone(),
        ffprobe_adapter,
        gpu_coordinator,
        detector: SubtitleDetector::new(),
        source_language: config.source_language.clone(),
        use_embedded_subs: config.use_embedded_subs,
        upgrade_enabled: config.upgrade_enabled,
        upgrade_score_delta: config.upgrade_score_delta,
        upgrade_prefer_ass: config.upgrade_prefer_ass,
    });

    let event_bus = Arc::new(NamedEventBus::new(EventCatalog::known()));

    let whisper_queue = Arc::new(WhisperQueue::new(
        config.whisper_queue_permits,
        whisper_adapter,
        job_repository.clone(),
        event_bus.clone(),
    ));

    let search_loop = Arc::new(SearchLoop::new(
        translator_engine,
        wanted_repository.clone(),
        job_repository.clone(),
        anidb_repository.clone(),
        stats_repository.clone(),
        media_server_manager,
        event_bus.clone(),
    ));

    let mut catalog_clients: Vec<Arc<dyn CatalogClient>> = Vec::new();
    if !config.series_catalog_url.is_empty() {
        catalog_clients.push(Arc::new(MediaManagerAClient::new(
            &config.series_catalog_url,
            &config.series_catalog_api_key,
            Duration::from_secs(30),
        )));
    }
    if !config.movie_catalog_url.is_empty() {
        catalog_clients.push(Arc::new(MediaManagerBClient::new(
            &config.movie_catalog_url,
            &config.movie_catalog_api_key,
            Duration::from_secs(30),
        )));
    }
    let wanted_scanner = Arc::new(WantedScanner::new(catalog_clients, wanted_repository.clone()));

    let scan_use_case = Arc::new(ScanWantedUseCase::new(wanted_scanner.clone()));
    let search_one_use_case = Arc::new(SearchWantedItemUseCase::new(wanted_repository.clone(), search_loop.clone()));
    let batch_search_use_case = Arc::new(BatchSearchWantedUseCase::new(wanted_repository.clone(), search_loop.clone()));
    let translate_file_use_case = Arc::new(TranslateFileUseCase::new(wanted_repository.clone(), search_loop.clone()));

    let scheduler = JobScheduler::new().await.map_err(|e| anyhow::anyhow!("failed to create job scheduler: {}", e))?;

    let wanted_scan_task = Arc::new(PeriodicTask::new(
        Arc::new(WantedScanTask { scanner: wanted_scanner }),
        config_repository.clone(),
    ));
    wanted_scan_task.start();

    let wanted_search_task = Arc::new(PeriodicTask::new(
        Arc::new(WantedSearchTask { search_loop: search_loop.clone(), wanted_repository: wanted_repository.clone() }),
        config_repository.clone(),
    ));
    wanted_search_task.start();

    let cleanup_task = Arc::new(PeriodicTask::new(
        Arc::new(CleanupTask { job_repository: job_repository.clone(), provider_cache_repository: provider_cache_repository.clone() }),
        config_repository.clone(),
    ));
    cleanup_task.start();

    let anidb_refresh_task = Arc::new(PeriodicTask::new(
        Arc::new(AnidbRefreshTask {
            mapping_url: config.anidb_mapping_url.clone(),
            http_client: reqwest::Client::new(),
            anidb_repository,
        }),
        config_repository,
    ));
    anidb_refresh_task.start();

    let backup_task = Arc::new(BackupTask::new(pool.clone(), config.backup_dir.clone()));
    backup_task.spawn(&scheduler).await.map_err(|e| anyhow::anyhow!("failed to schedule backup task: {}", e))?;

    scheduler.start().await.map_err(|e| anyhow::anyhow!("failed to start job scheduler: {}", e))?;

    let state = AppState {
        scan_use_case,
        search_one_use_case,
        batch_search_use_case,
        translate_file_use_case,
        job_repository,
        whisper_queue,
        stats_repository,
    };

    let app = Router::new()
        .route("/health", get(health_handlers::health_check))
        .route("/wanted/scan", post(wanted_handlers::trigger_scan))
        .route("/wanted/search", post(wanted_handlers::trigger_batch_search))
        .route("/wanted/:wanted_item_id/search", post(wanted_handlers::trigger_search_one))
        .route("/wanted/translate", post(wanted_handlers::trigger_translate_file))
        .route("/jobs/:job_id", get(job_handlers::get_job))
        .route("/jobs/whisper/:job_id", delete(job_handlers::cancel_whisper_job))
        .route("/status/today", get(status_handlers::today_stats))
        .layer(axum::middleware::from_fn(logging::logging_middleware))
        .layer(cors::cors_layer())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("server listening on {}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
