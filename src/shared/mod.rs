//! Shared types and utilities used across the application

pub mod error;
pub mod config;

pub use error::{
    ApplicationError,
    RepositoryError,
    ProviderError,
    TranslationError,
    MediaServerError,
    JobError,
    TranslatorError,
    WantedError,
    SchedulerError,
    EventBusError,
};
pub use config::Config;
