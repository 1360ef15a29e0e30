//! Task lifecycle operations over the queue adapter.
//!
//! Bulk operations take one snapshot and act on it. Tasks that disappear or
//! fail in between are counted and skipped; the sweep itself never aborts.

use pal_core::{Task, TaskFilter, TaskId, TaskStatus};
use pal_queue::{QueueError, TaskQueueAdapter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::descriptor::Operation;
use crate::error::PaletteError;

/// Per-item tally of a bulk sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub attempted: usize,
    pub succeeded: usize,
}

impl BulkOutcome {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    /// The snapshot was empty, so nothing was attempted.
    pub fn is_empty(&self) -> bool {
        self.attempted == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunningOutcome {
    NoneRunning,
    Deleted(TaskId),
    NotDeleted(TaskId),
}

impl RunningOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, RunningOutcome::Deleted(_))
    }
}

pub struct TaskLifecycleService {
    queue: Arc<dyn TaskQueueAdapter>,
}

impl TaskLifecycleService {
    pub fn new(queue: Arc<dyn TaskQueueAdapter>) -> Self {
        Self { queue }
    }

    /// Delete one task. A false delete is classified by looking the task up
    /// again: gone means `NotFound`, still present means the store refused.
    pub fn delete_task(&self, task_id: &TaskId) -> Result<(), PaletteError> {
        if self.queue.delete_by_id(task_id)? {
            info!(task_id = %task_id, "task deleted");
            return Ok(());
        }

        match self.queue.get_by_id(task_id)? {
            None => {
                debug!(task_id = %task_id, "task already gone");
                Err(PaletteError::NotFound {
                    task_id: task_id.0.clone(),
                })
            }
            Some(_) => {
                warn!(task_id = %task_id, "store refused task delete");
                Err(PaletteError::Refused {
                    task_id: task_id.0.clone(),
                })
            }
        }
    }

    pub fn delete_all_tasks(&self) -> Result<BulkOutcome, PaletteError> {
        let snapshot = self.queue.list_all()?;
        Ok(self.delete_each(Operation::DeleteAllTasks, snapshot))
    }

    /// Only root tasks are swept; failed sub-tasks go with their parent.
    pub fn delete_all_failed_tasks(&self) -> Result<BulkOutcome, PaletteError> {
        let filter = TaskFilter::any()
            .with_status(TaskStatus::Error)
            .with_level(0);
        let snapshot = self.queue.list_where(&filter)?;
        Ok(self.delete_each(Operation::DeleteAllFailedTasks, snapshot))
    }

    pub fn delete_all_tasks_by_type(&self, task_type: &str) -> Result<BulkOutcome, PaletteError> {
        let snapshot = self.queue.list_where(&TaskFilter::of_type(task_type))?;
        Ok(self.delete_each(Operation::DeleteAllTasksByType, snapshot))
    }

    pub fn delete_pending_tasks(&self) -> Result<BulkOutcome, PaletteError> {
        let snapshot = self.queue.list_pending()?;
        Ok(self.delete_each(Operation::DeletePendingTasks, snapshot))
    }

    pub fn delete_running_task(&self) -> Result<RunningOutcome, PaletteError> {
        let Some(task) = self.queue.get_running()? else {
            debug!("no running task");
            return Ok(RunningOutcome::NoneRunning);
        };

        match self.queue.delete_by_id(&task.id) {
            Ok(true) => {
                info!(task_id = %task.id, task_type = %task.task_type, "running task deleted");
                Ok(RunningOutcome::Deleted(task.id))
            }
            Ok(false) => {
                warn!(task_id = %task.id, "running task could not be deleted");
                Ok(RunningOutcome::NotDeleted(task.id))
            }
            Err(err) => {
                warn!(task_id = %task.id, error = %err, "running task delete failed");
                Ok(RunningOutcome::NotDeleted(task.id))
            }
        }
    }

    /// Requeue every failed task, sub-tasks included.
    pub fn restart_failed_tasks(&self) -> Result<BulkOutcome, PaletteError> {
        let snapshot = self
            .queue
            .list_where(&TaskFilter::any().with_status(TaskStatus::Error))?;
        Ok(self.sweep(Operation::RestartFailedTasks, snapshot, |id| {
            self.queue.requeue_by_id(id)
        }))
    }

    /// Whether the store holds any live task at all.
    pub fn has_tasks(&self) -> Result<bool, PaletteError> {
        Ok(!self.queue.list_all()?.is_empty())
    }

    fn delete_each(&self, operation: Operation, snapshot: Vec<Task>) -> BulkOutcome {
        self.sweep(operation, snapshot, |id| self.queue.delete_by_id(id))
    }

    fn sweep(
        &self,
        operation: Operation,
        snapshot: Vec<Task>,
        act: impl Fn(&TaskId) -> Result<bool, QueueError>,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for task in &snapshot {
            outcome.attempted += 1;
            match act(&task.id) {
                Ok(true) => outcome.succeeded += 1,
                Ok(false) => {
                    debug!(%operation, task_id = %task.id, "task skipped, gone or not eligible");
                }
                Err(err) => {
                    warn!(%operation, task_id = %task.id, error = %err, "task skipped after store failure");
                }
            }
        }

        info!(
            %operation,
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            "bulk sweep finished"
        );
        outcome
    }
}
