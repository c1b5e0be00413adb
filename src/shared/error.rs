//! Shared error types for the application
//!
//! One `thiserror` enum per component family, aggregated into
//! [`ApplicationError`] via `#[from]`.

use thiserror::Error;

/// Repository errors - errors that occur during data access
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("duplicate entity: {0}")]
    Duplicate(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if db_err.is_check_violation() {
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Database(db_err.message().to_string())
                }
            }
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                RepositoryError::Connection("connection pool timeout".to_string())
            }
            sqlx::Error::PoolClosed => {
                RepositoryError::Connection("connection pool closed".to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Provider registry, HTTP session and download errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider '{0}' not registered")]
    NotRegistered(String),

    #[error("circuit open for provider '{0}'")]
    CircuitOpen(String),

    #[error("rate limited by provider '{0}'")]
    RateLimited(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP status {0}: {1}")]
    HttpStatus(u16, String),

    #[error("authentication failed for provider '{0}'")]
    AuthFailed(String),

    #[error("no results from provider '{0}'")]
    NoResults(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("archive extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("timeout contacting provider '{0}'")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

/// Translation-backend manager errors
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("no active translation backend configured")]
    NoActiveBackend,

    #[error("backend '{0}' not registered")]
    NotRegistered(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::Timeout(err.to_string())
        } else {
            TranslationError::HttpError(err.to_string())
        }
    }
}

/// Media-server manager errors
#[derive(Debug, Error)]
pub enum MediaServerError {
    #[error("server '{0}' not registered")]
    NotRegistered(String),

    #[error("authentication failed for server '{0}'")]
    AuthFailed(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for MediaServerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MediaServerError::Timeout(err.to_string())
        } else {
            MediaServerError::Http(err.to_string())
        }
    }
}

/// Job and whisper-queue errors
#[derive(Debug, Clone, Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job failed: {0}")]
    Failed(String),

    #[error("job cancelled: {0}")]
    Cancelled(String),

    #[error("queue is full (capacity {0})")]
    QueueFull(usize),
}

/// Video/audio probing errors (ffprobe)
#[derive(Debug, Error)]
pub enum VideoAnalyzerError {
    #[error("ffprobe not found on PATH")]
    FfprobeNotFound,

    #[error("ffprobe execution failed: {0}")]
    ExecutionFailed(String),

    #[error("ffprobe timed out: {0}")]
    Timeout(String),

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// whisper.cpp transcription errors
#[derive(Debug, Error)]
pub enum SpeechToTextError {
    #[error("whisper-cli not found on PATH")]
    WhisperNotFound,

    #[error("audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Translator engine errors
#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("subtitle file not found: {0}")]
    FileNotFound(String),

    #[error("invalid subtitle format: {0}")]
    InvalidFormat(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("ffprobe failed: {0}")]
    ProbeFailed(#[from] VideoAnalyzerError),

    #[error("ffmpeg extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("transcription failed: {0}")]
    Transcription(#[from] SpeechToTextError),

    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("no acceptable source found for '{0}'")]
    NoSourceFound(String),
}

/// Wanted scanner/search errors
#[derive(Debug, Error)]
pub enum WantedError {
    #[error("catalog client error: {0}")]
    CatalogError(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("item blacklisted: {0}")]
    Blacklisted(String),

    #[error("translator error: {0}")]
    Translator(#[from] TranslatorError),

    #[error("wanted item not found: {0}")]
    NotFound(String),
}

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("task '{0}' already running")]
    AlreadyRunning(String),

    #[error("cron expression invalid: {0}")]
    InvalidCron(String),

    #[error("task failed: {0}")]
    TaskFailed(String),
}

/// Event bus / hook / webhook dispatch errors
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("unknown event name: {0}")]
    UnknownEvent(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("hook execution failed: {0}")]
    HookFailed(String),

    #[error("webhook delivery failed: {0}")]
    WebhookFailed(String),
}

impl From<serde_json::Error> for EventBusError {
    fn from(err: serde_json::Error) -> Self {
        EventBusError::Serialization(err.to_string())
    }
}

/// Aggregated top-level error for library consumers.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("media server error: {0}")]
    MediaServer(#[from] MediaServerError),

    #[error("job error: {0}")]
    Job(#[from] JobError),

    #[error("translator error: {0}")]
    Translator(#[from] TranslatorError),

    #[error("wanted error: {0}")]
    Wanted(#[from] WantedError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("event bus error: {0}")]
    EventBus(#[from] EventBusError),
}
