//! Contract over the external task store.

use pal_core::{Task, TaskFilter, TaskId, TaskStatus};

use crate::error::QueueError;

/// Thin view of a task store that is concurrently driven by an execution
/// engine. Every call is individually atomic; nothing spans calls.
pub trait TaskQueueAdapter: Send + Sync {
    /// All non-terminal tasks in the store's natural (insertion) order.
    fn list_all(&self) -> Result<Vec<Task>, QueueError>;

    fn list_pending(&self) -> Result<Vec<Task>, QueueError> {
        self.list_where(&TaskFilter::any().with_status(TaskStatus::Pending))
    }

    /// Non-terminal tasks matching `filter`, natural order.
    fn list_where(&self, filter: &TaskFilter) -> Result<Vec<Task>, QueueError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect())
    }

    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, QueueError>;

    /// The running task, if any. The engine runs one task at a time; should a
    /// store hold several, the first in natural order wins.
    fn get_running(&self) -> Result<Option<Task>, QueueError> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|task| task.status == TaskStatus::Running))
    }

    /// `Ok(false)` when the id is unknown or the store refuses the delete.
    fn delete_by_id(&self, id: &TaskId) -> Result<bool, QueueError>;

    /// Delete every task matching `filter`, returning how many went away.
    fn delete_where(&self, filter: &TaskFilter) -> Result<usize, QueueError> {
        let mut deleted = 0;
        for task in self.list_where(filter)? {
            if self.delete_by_id(&task.id)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Put a failed task back to pending. `Ok(false)` when the task is gone or
    /// not in error.
    fn requeue_by_id(&self, id: &TaskId) -> Result<bool, QueueError>;
}
