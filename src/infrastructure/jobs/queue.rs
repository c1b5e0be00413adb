//! Bounded job queue with a fixed pool of worker slots. Grounded on the teacher's
//! `JobStore` (shared `Arc<Mutex<HashMap>>` job map) combined with
//! [`GpuCoordinator`](crate::infrastructure::gpu::GpuCoordinator)'s
//! semaphore-based slot limiting.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::{Job, JobKind};
use crate::domain::repositories::JobRepository;
use crate::shared::error::JobError;

pub type JobMap = Arc<Mutex<HashMap<Uuid, Job>>>;

/// Bounded queue: at most `capacity` jobs pending at once, at most
/// `workers` running concurrently. Excess submissions are rejected with
/// [`JobError::QueueFull`] rather than buffered without limit.
pub struct JobQueue {
    jobs: JobMap,
    sender: mpsc::Sender<QueuedTask>,
    capacity: usize,
    pending_count: Arc<std::sync::atomic::AtomicUsize>,
}

type QueuedTask = Box<dyn FnOnce() -> futures::future::BoxFuture<'static, ()> + Send>;

impl JobQueue {
    pub fn new<R>(workers: usize, capacity: usize, repository: Arc<R>) -> Self
    where
        R: JobRepository + Send + Sync + 'static,
    {
        let jobs: JobMap = Arc::new(Mutex::new(HashMap::new()));
        let (sender, mut receiver) = mpsc::channel::<QueuedTask>(capacity);
        let semaphore = Arc::new(Semaphore::new(workers));
        let pending_count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let pending_count_worker = pending_count.clone();

        tokio::spawn(async move {
            while let Some(task) = receiver.recv().await {
                let permit = semaphore.clone().acquire_owned().await;
                let pending_count = pending_count_worker.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    task().await;
                    pending_count.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
                });
            }
        });

        let jobs_for_housekeeping = jobs.clone();
        let repository_for_housekeeping = repository.clone();
        tokio::spawn(housekeeping_loop(jobs_for_housekeeping, repository_for_housekeeping));

        Self { jobs, sender, capacity, pending_count }
    }

    /// Submits `run` for job `kind`/`wanted_item_id`, returning the new
    /// job's id. Rejects if the queue is at capacity.
    pub async fn submit<F>(&self, kind: JobKind, wanted_item_id: Uuid, run: F) -> Result<Uuid, JobError>
    where
        F: FnOnce(JobMap, Uuid) -> futures::future::BoxFuture<'static, Result<(), String>> + Send + 'static,
    {
        if self.pending_count.load(std::sync::atomic::Ordering::SeqCst) >= self.capacity {
            return Err(JobError::QueueFull(self.capacity));
        }

        let job = Job::new(kind, wanted_item_id);
        let job_id = job.id;
        self.jobs.lock().await.insert(job_id, job);
        self.pending_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let jobs = self.jobs.clone();
        let task: QueuedTask = Box::new(move || {
            Box::pin(async move {
                {
                    let mut guard = jobs.lock().await;
                    if let Some(job) = guard.get_mut(&job_id) {
                        job.start();
                    }
                }

                let result = run(jobs.clone(), job_id).await;

                let mut guard = jobs.lock().await;
                if let Some(job) = guard.get_mut(&job_id) {
                    match result {
                        Ok(()) => job.complete(),
                        Err(e) => {
                            error!(job_id = %job_id, error = %e, "job failed");
                            job.fail(e);
                        }
                    }
                }
            })
        });

        self.sender
            .send(task)
            .await
            .map_err(|_| JobError::Failed("job queue channel closed".to_string()))?;

        Ok(job_id)
    }

    pub async fn get(&self, job_id: Uuid) -> Result<Job, JobError> {
        self.jobs
            .lock()
            .await
            .get(&job_id)
            .cloned()
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    pub async fn cancel(&self, job_id: Uuid) -> Result<(), JobError> {
        let mut guard = self.jobs.lock().await;
        let job = guard.get_mut(&job_id).ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        job.cancel();
        Ok(())
    }
}

/// Periodically expires zombie (stuck `Processing`) jobs and prunes
/// terminal jobs past their retention window, persisting the final
/// states through `repository`.
async fn housekeeping_loop<R>(jobs: JobMap, repository: Arc<R>)
where
    R: JobRepository + Send + Sync + 'static,
{
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
    loop {
        interval.tick().await;
        let now = chrono::Utc::now();
        let zombie_after = ChronoDuration::hours(2);
        let retention = ChronoDuration::hours(24);

        let mut guard = jobs.lock().await;
        let mut to_persist = Vec::new();
        guard.retain(|_, job| {
            if job.is_zombie(now, zombie_after) {
                job.fail("job exceeded maximum processing time");
                to_persist.push(job.clone());
            }
            !job.is_expired(now, retention)
        });
        drop(guard);

        for job in to_persist {
            if let Err(e) = repository.update(&job).await {
                error!(error = %e, "failed to persist expired job");
            }
        }
        info!("job queue housekeeping pass complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::JobRepository;
    use crate::shared::error::RepositoryError;
    use async_trait::async_trait;

    struct NoopRepository;

    #[async_trait]
    impl JobRepository for NoopRepository {
        async fn insert(&self, _job: &Job) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Job>, RepositoryError> {
            Ok(None)
        }
        async fn list_by_state(&self, _state: crate::domain::entities::JobState) -> Result<Vec<Job>, RepositoryError> {
            Ok(vec![])
        }
        async fn update(&self, _job: &Job) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn delete_older_than(&self, _cutoff: chrono::DateTime<chrono::Utc>) -> Result<u64, RepositoryError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn submits_and_completes_a_job() {
        let queue = JobQueue::new(2, 10, Arc::new(NoopRepository));
        let job_id = queue
            .submit(JobKind::Translate, Uuid::new_v4(), |_jobs, _id| Box::pin(async { Ok(()) }))
            .await
            .unwrap();

        for _ in 0..20 {
            let job = queue.get(job_id).await.unwrap();
            if job.state.is_terminal() {
                assert_eq!(job.state, crate::domain::entities::JobState::Completed);
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("job never completed");
    }

    #[tokio::test]
    async fn rejects_submissions_over_capacity() {
        let queue = JobQueue::new(1, 0, Arc::new(NoopRepository));
        let result = queue
            .submit(JobKind::Translate, Uuid::new_v4(), |_jobs, _id| Box::pin(async { Ok(()) }))
            .await;
        assert!(matches!(result, Err(JobError::QueueFull(0))));
    }
}
