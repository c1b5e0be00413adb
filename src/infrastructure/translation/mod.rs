//! Pluggable translation backends behind one registry/manager,
//! mirroring the provider manager's circuit-breaker-per-collaborator
//! pattern as the circuit breaker.

pub mod backend_trait;
pub mod glossary_native;
pub mod manager;
pub mod openai_compat;

pub use backend_trait::{ConfigField, ConfigFieldKind, TranslationBackend};
pub use glossary_native::GlossaryNativeBackend;
pub use manager::TranslationManager;
pub use openai_compat::OpenAiCompatBackend;
