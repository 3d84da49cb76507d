//! Deferred enrichment jobs with observable status.
//!
//! Each scheduled job runs on its own tokio task after an optional delay.
//! Jobs are independent: nothing orders them relative to each other or to
//! later requests, and several jobs for the same owner may run at once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::domain::ThoughtStatus;
use crate::enrichment::worker::EnrichmentWorker;

/// Work the scheduler knows how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentJob {
    EnrichThought {
        thought_id: Uuid,
        original_content: String,
    },
    RerunAll,
}

impl EnrichmentJob {
    fn kind(&self) -> TaskKind {
        match self {
            Self::EnrichThought { thought_id, .. } => TaskKind::EnrichThought {
                thought_id: *thought_id,
            },
            Self::RerunAll => TaskKind::RerunAll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum TaskKind {
    EnrichThought { thought_id: Uuid },
    RerunAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed { detail: String },
    Failed { error: String },
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Status record of one scheduled job.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: Uuid,
    #[serde(skip)]
    pub owner_id: String,
    pub kind: TaskKind,
    #[serde(flatten)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Runs [`EnrichmentJob`]s in the background and tracks their progress.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    worker: EnrichmentWorker,
    delay: Duration,
    retention: chrono::Duration,
    tasks: Arc<RwLock<HashMap<Uuid, watch::Sender<TaskRecord>>>>,
}

impl TaskScheduler {
    pub fn new(worker: EnrichmentWorker, delay: Duration, retention: Duration) -> Self {
        Self {
            worker,
            delay,
            retention: chrono::Duration::from_std(retention)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Queue `job` for `owner_id` and return immediately.
    pub async fn schedule(&self, owner_id: &str, job: EnrichmentJob) -> TaskRecord {
        let record = TaskRecord {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            kind: job.kind(),
            status: TaskStatus::Queued,
            created_at: Utc::now(),
            finished_at: None,
        };
        let (tx, _) = watch::channel(record.clone());

        {
            let mut tasks = self.tasks.write().await;
            self.prune(&mut tasks);
            tasks.insert(record.id, tx.clone());
        }

        tracing::debug!(
            task_id = %record.id,
            owner_id = %owner_id,
            kind = ?record.kind,
            delay_ms = self.delay.as_millis(),
            "Scheduled enrichment task"
        );

        let worker = self.worker.clone();
        let delay = self.delay;
        let owner_id = owner_id.to_string();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            tx.send_modify(|r| r.status = TaskStatus::Running);

            let status = run_job(&worker, &owner_id, job).await;

            tx.send_modify(|r| {
                r.status = status;
                r.finished_at = Some(Utc::now());
            });
        });

        record
    }

    /// Current record of a task, if it is still retained.
    pub async fn get(&self, id: Uuid) -> Option<TaskRecord> {
        self.tasks.read().await.get(&id).map(|tx| tx.borrow().clone())
    }

    /// Wait until the task finishes; `None` if it is unknown.
    pub async fn wait(&self, id: Uuid) -> Option<TaskRecord> {
        let mut rx = self.tasks.read().await.get(&id)?.subscribe();
        let record = rx.wait_for(|r| r.status.is_finished()).await.ok()?;
        Some(record.clone())
    }

    fn prune(&self, tasks: &mut HashMap<Uuid, watch::Sender<TaskRecord>>) {
        let cutoff = Utc::now() - self.retention;
        tasks.retain(|_, tx| {
            let record = tx.borrow();
            record.finished_at.is_none_or(|at| at > cutoff)
        });
    }
}

async fn run_job(worker: &EnrichmentWorker, owner_id: &str, job: EnrichmentJob) -> TaskStatus {
    match job {
        EnrichmentJob::EnrichThought {
            thought_id,
            original_content,
        } => match worker
            .enrich_thought(thought_id, owner_id, &original_content)
            .await
        {
            Ok(ThoughtStatus::Failed { reason }) => TaskStatus::Failed { error: reason },
            Ok(other) => TaskStatus::Completed {
                detail: other.label().to_string(),
            },
            Err(e) => TaskStatus::Failed {
                error: format!("enrichment not recorded: {e}"),
            },
        },
        EnrichmentJob::RerunAll => match worker.rerun_all(owner_id).await {
            Ok(count) => TaskStatus::Completed {
                detail: format!("{count} thoughts re-enriched"),
            },
            Err(e) => {
                tracing::error!(owner_id, error = %e, "Rerun-all failed to list thoughts");
                TaskStatus::Failed {
                    error: e.to_string(),
                }
            }
        },
    }
}
