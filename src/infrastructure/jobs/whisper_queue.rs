//! Whisper transcription queue. Distinct from [`JobQueue`](super::queue::JobQueue)
//! because cancellation is restricted to jobs that have not yet started
//! and because each job reports through three fixed phases
//! (extracting 0-10%, transcribing 10-95%, saving 95-100%) onto the
//! event bus rather than an arbitrary free-text phase string.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::{Job, JobKind};
use crate::domain::repositories::JobRepository;
use crate::infrastructure::external::whisper::{TranscriptionResult, WhisperAdapter};
use crate::infrastructure::messaging::named_event_bus::{payload, NamedEventBus};
use crate::shared::error::JobError;

pub struct WhisperQueue {
    jobs: Mutex<HashMap<Uuid, Job>>,
    semaphore: Arc<Semaphore>,
    whisper_adapter: Arc<WhisperAdapter>,
    job_repository: Arc<dyn JobRepository>,
    event_bus: Arc<NamedEventBus>,
}

impl WhisperQueue {
    pub fn new(
        capacity: usize,
        whisper_adapter: Arc<WhisperAdapter>,
        job_repository: Arc<dyn JobRepository>,
        event_bus: Arc<NamedEventBus>,
    ) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            semaphore: Arc::new(Semaphore::new(capacity.max(1))),
            whisper_adapter,
            job_repository,
            event_bus,
        }
    }

    /// Enqueues a transcription job and spawns its worker, returning the
    /// new job's id immediately. The semaphore gates actual execution,
    /// not submission: many jobs can be pending at once.
    pub async fn submit(self: &Arc<Self>, wanted_item_id: Uuid, video_path: String, language_hint: Option<String>) -> Result<Uuid, JobError> {
        let job = Job::new(JobKind::Transcribe, wanted_item_id);
        let job_id = job.id;
        self.jobs.lock().await.insert(job_id, job.clone());
        self.job_repository.insert(&job).await.map_err(|e| JobError::Failed(e.to_string()))?;

        let this = self.clone();
        tokio::spawn(async move {
            this.run(job_id, video_path, language_hint).await;
        });

        Ok(job_id)
    }

    /// Cancels `job_id` if it has not yet started. Active or terminal
    /// jobs are left untouched and this returns `NotFound` only when
    /// the id is unknown outright.
    pub async fn cancel(&self, job_id: Uuid) -> Result<(), JobError> {
        let mut guard = self.jobs.lock().await;
        let job = guard.get_mut(&job_id).ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        if job.state != crate::domain::entities::JobState::Pending {
            return Err(JobError::Failed(format!("job {} is no longer pending, cannot cancel", job_id)));
        }
        job.cancel();
        let snapshot = job.clone();
        drop(guard);
        let _ = self.job_repository.update(&snapshot).await;
        Ok(())
    }

    pub async fn get(&self, job_id: Uuid) -> Result<Job, JobError> {
        self.jobs.lock().await.get(&job_id).cloned().ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    async fn run(self: Arc<Self>, job_id: Uuid, video_path: String, language_hint: Option<String>) {
        let _permit = self.semaphore.clone().acquire_owned().await;

        {
            let mut guard = self.jobs.lock().await;
            let Some(job) = guard.get_mut(&job_id) else { return };
            if job.state == crate::domain::entities::JobState::Cancelled {
                return;
            }
            job.start();
        }

        self.report_progress(job_id, 0, "extracting").await;

        let result = self.whisper_adapter.transcribe(&video_path, 0, language_hint.as_deref()).await;

        match result {
            Ok(transcription) => {
                self.report_progress(job_id, 95, "saving").await;
                self.finish(job_id, Ok(transcription)).await;
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "whisper transcription failed");
                self.finish(job_id, Err(e.to_string())).await;
            }
        }
    }

    async fn report_progress(&self, job_id: Uuid, percent: u8, phase: &str) {
        {
            let mut guard = self.jobs.lock().await;
            if let Some(job) = guard.get_mut(&job_id) {
                job.update_progress(percent, phase);
            }
        }
        self.event_bus
            .emit(
                "job_progress",
                payload(&[
                    ("job_id", Value::String(job_id.to_string())),
                    ("percent", Value::Number(percent.into())),
                    ("message", Value::String(phase.to_string())),
                ]),
            )
            .await
            .ok();
    }

    async fn finish(&self, job_id: Uuid, result: Result<TranscriptionResult, String>) {
        let snapshot = {
            let mut guard = self.jobs.lock().await;
            let Some(job) = guard.get_mut(&job_id) else { return };
            match result {
                Ok(_) => job.complete(),
                Err(e) => job.fail(e),
            }
            job.clone()
        };

        if let Err(e) = self.job_repository.update(&snapshot).await {
            error!(job_id = %job_id, error = %e, "failed to persist whisper job state");
        }

        let event_name = if snapshot.state == crate::domain::entities::JobState::Completed { "job_completed" } else { "job_failed" };
        let mut fields = vec![("job_id", Value::String(job_id.to_string()))];
        if let Some(error) = &snapshot.error {
            fields.push(("error", Value::String(error.clone())));
        }
        self.event_bus.emit(event_name, payload(&fields)).await.ok();

        info!(job_id = %job_id, state = ?snapshot.state, "whisper job finished");
    }
}
