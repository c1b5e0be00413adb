//! Bounded job queue for translate/transcribe work.

mod queue;
mod whisper_queue;

pub use queue::{JobMap, JobQueue};
pub use whisper_queue::WhisperQueue;
