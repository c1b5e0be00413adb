// Infrastructure Layer
//
// Adapters and managers for every collaborator the domain depends on:
// persistence, external processes (ffprobe/whisper/ollama), subtitle
// providers, translation backends, media-server backends, the job
// queue, the wanted-item pipeline, the scheduler, messaging and the
// GPU coordinator.

pub mod database;
pub mod external;
pub mod gpu;
pub mod jobs;
pub mod media_server;
pub mod messaging;
pub mod persistence;
pub mod providers;
pub mod scheduler;
pub mod subtitle;
pub mod translation;
pub mod translator;
pub mod wanted;

pub use database::*;
pub use external::*;
pub use gpu::*;
pub use jobs::*;
pub use messaging::*;
pub use subtitle::*;
