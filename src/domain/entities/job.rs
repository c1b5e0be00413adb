//! Job queue and whisper-queue shared lifecycle types.
//!
//! Grounded on the teacher's `JobStore`: pending -> processing ->
//! completed/failed, with a terminal-state retention window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    /// Translate/transcribe a single wanted item.
    Translate,
    /// Whisper transcription only.
    Transcribe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub wanted_item_id: Uuid,
    pub state: JobState,
    /// 0-100
    pub progress: u8,
    pub phase: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(kind: JobKind, wanted_item_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            wanted_item_id,
            state: JobState::Pending,
            progress: 0,
            phase: "queued".to_string(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start(&mut self) {
        self.state = JobState::Processing;
        self.updated_at = Utc::now();
    }

    pub fn update_progress(&mut self, progress: u8, phase: impl Into<String>) {
        self.progress = progress.min(100);
        self.phase = phase.into();
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.state = JobState::Completed;
        self.progress = 100;
        self.phase = "done".to_string();
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.state = JobState::Cancelled;
        self.updated_at = Utc::now();
    }

    /// A job stuck in `Processing` for longer than this is considered a
    /// zombie and expired to `Failed` by the housekeeping pass.
    pub fn is_zombie(&self, now: DateTime<Utc>, zombie_after: chrono::Duration) -> bool {
        self.state == JobState::Processing && now - self.updated_at > zombie_after
    }

    /// Terminal jobs older than this are pruned from the in-memory store.
    pub fn is_expired(&self, now: DateTime<Utc>, retention: chrono::Duration) -> bool {
        self.state.is_terminal() && now - self.updated_at > retention
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zombie_detection_respects_window() {
        let mut job = Job::new(JobKind::Translate, Uuid::new_v4());
        job.start();
        job.updated_at = Utc::now() - chrono::Duration::hours(3);
        assert!(job.is_zombie(Utc::now(), chrono::Duration::hours(2)));
    }

    #[test]
    fn fresh_job_is_not_zombie() {
        let mut job = Job::new(JobKind::Translate, Uuid::new_v4());
        job.start();
        assert!(!job.is_zombie(Utc::now(), chrono::Duration::hours(2)));
    }
}
