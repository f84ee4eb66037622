//! Derivative job queue.
//!
//! Jobs are enqueued fire-and-forget when an image node is created and
//! drained by a single worker. Statuses live in memory; a failed job is
//! visible in the logs and in the registry but never surfaces to the
//! request that triggered it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

/// Monotonic job identifier.
pub type JobId = u64;

/// Finished jobs retained for status lookups; older ones are evicted so
/// the registry stays bounded on a long-lived server.
const MAX_FINISHED_JOBS: usize = 256;

/// Lifecycle of a derivative job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, not yet picked up.
    Pending,
    /// Picked up by the worker.
    Running,
    /// All derivatives written.
    Succeeded,
    /// Gave up; partial derivatives were removed.
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// A derivative generation job.
#[derive(Debug, Clone)]
pub struct DerivativeJob {
    /// Job ID.
    pub id: JobId,
    /// Image node to derive from.
    pub file_id: i64,
    /// Owner of the node.
    pub owner_id: i64,
    /// Current status.
    pub status: JobStatus,
}

/// In-memory job queue and status registry.
pub struct JobQueue {
    tx: UnboundedSender<JobId>,
    jobs: Mutex<HashMap<JobId, DerivativeJob>>,
    next_id: AtomicU64,
}

impl JobQueue {
    /// Create a queue and the receiver its worker will drain.
    pub fn new() -> (Arc<Self>, UnboundedReceiver<JobId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Arc::new(Self {
            tx,
            jobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });
        (queue, rx)
    }

    /// Enqueue a derivative job for an image node.
    ///
    /// Never blocks and never fails the caller; if the worker is gone
    /// the job stays Pending and a warning is logged.
    pub fn enqueue(&self, file_id: i64, owner_id: i64) -> JobId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = DerivativeJob {
            id,
            file_id,
            owner_id,
            status: JobStatus::Pending,
        };

        self.jobs.lock().unwrap().insert(id, job);

        if self.tx.send(id).is_err() {
            warn!(job_id = id, file_id, "Derivative worker is not running");
        }
        id
    }

    /// Look up a job by ID.
    pub fn job(&self, id: JobId) -> Option<DerivativeJob> {
        self.jobs.lock().unwrap().get(&id).cloned()
    }

    /// Look up the most recent job for a file node.
    pub fn job_for_file(&self, file_id: i64) -> Option<DerivativeJob> {
        self.jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.file_id == file_id)
            .max_by_key(|j| j.id)
            .cloned()
    }

    /// Current status of a job.
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.lock().unwrap().get(&id).map(|j| j.status)
    }

    /// Update a job's status. Unknown IDs are ignored.
    ///
    /// Finishing a job may evict the oldest finished entries.
    pub fn set_status(&self, id: JobId, status: JobStatus) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            job.status = status;
        }
        if status.is_finished() {
            Self::prune_finished(&mut jobs);
        }
    }

    fn prune_finished(jobs: &mut HashMap<JobId, DerivativeJob>) {
        let mut finished: Vec<JobId> = jobs
            .values()
            .filter(|j| j.status.is_finished())
            .map(|j| j.id)
            .collect();

        if finished.len() <= MAX_FINISHED_JOBS {
            return;
        }

        // IDs are monotonic, so the smallest are the oldest
        finished.sort_unstable();
        for id in &finished[..finished.len() - MAX_FINISHED_JOBS] {
            jobs.remove(id);
        }
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue").finish()
    }
}
