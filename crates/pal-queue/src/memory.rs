//! In-process task queue kept in insertion order.

use pal_core::{Task, TaskFilter, TaskId, TaskStatus};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::adapter::TaskQueueAdapter;
use crate::error::QueueError;

#[derive(Debug, Default)]
pub struct InMemoryTaskQueue {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks.into_iter().collect()),
        }
    }

    /// Enqueue `task`, replacing any task with the same id in place.
    pub fn insert(&self, task: Task) -> Result<(), QueueError> {
        let mut tasks = self.lock()?;
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
        Ok(())
    }

    /// Engine-side status change. Returns false for unknown ids.
    pub fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<bool, QueueError> {
        let mut tasks = self.lock()?;
        match tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) => {
                task.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Every stored task, including finished ones.
    pub fn snapshot(&self) -> Result<Vec<Task>, QueueError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Task>>, QueueError> {
        self.tasks.lock().map_err(|_| QueueError::Poisoned)
    }
}

impl TaskQueueAdapter for InMemoryTaskQueue {
    fn list_all(&self) -> Result<Vec<Task>, QueueError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|task| !task.status.is_terminal())
            .cloned()
            .collect())
    }

    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, QueueError> {
        Ok(self.lock()?.iter().find(|task| &task.id == id).cloned())
    }

    fn delete_by_id(&self, id: &TaskId) -> Result<bool, QueueError> {
        let mut tasks = self.lock()?;
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        let deleted = tasks.len() != before;
        debug!(task_id = %id, deleted, "in-memory delete");
        Ok(deleted)
    }

    fn delete_where(&self, filter: &TaskFilter) -> Result<usize, QueueError> {
        let mut tasks = self.lock()?;
        let before = tasks.len();
        tasks.retain(|task| task.status.is_terminal() || !filter.matches(task));
        Ok(before - tasks.len())
    }

    fn requeue_by_id(&self, id: &TaskId) -> Result<bool, QueueError> {
        let mut tasks = self.lock()?;
        match tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) if task.status.can_requeue() => {
                task.status = TaskStatus::Pending;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_task(id: &str, task_type: &str, status: TaskStatus) -> Task {
        Task::new(id, task_type, format!("{task_type} #{id}")).with_status(status)
    }

    fn mk_queue() -> InMemoryTaskQueue {
        InMemoryTaskQueue::from_tasks([
            mk_task("1", "A", TaskStatus::Error),
            mk_task("2", "B", TaskStatus::Pending),
            mk_task("3", "A", TaskStatus::Running),
            mk_task("4", "A", TaskStatus::Done),
        ])
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_ref()).collect()
    }

    #[test]
    fn list_all_hides_done_tasks_and_keeps_insertion_order() {
        let queue = mk_queue();
        let tasks = queue.list_all().expect("list all");
        assert_eq!(ids(&tasks), vec!["1", "2", "3"]);
    }

    #[test]
    fn list_pending_and_get_running_read_current_status() {
        let queue = mk_queue();
        assert_eq!(ids(&queue.list_pending().expect("pending")), vec!["2"]);
        let running = queue.get_running().expect("running").expect("one running");
        assert_eq!(running.id, TaskId::new("3"));

        queue
            .set_status(&TaskId::new("3"), TaskStatus::Done)
            .expect("finish running");
        assert!(queue.get_running().expect("running").is_none());
    }

    #[test]
    fn delete_by_id_reports_missing_ids_as_false() {
        let queue = mk_queue();
        assert!(queue.delete_by_id(&TaskId::new("2")).expect("delete"));
        assert!(!queue.delete_by_id(&TaskId::new("2")).expect("second delete"));
        assert!(!queue.delete_by_id(&TaskId::new("99")).expect("unknown id"));
        assert_eq!(queue.len().expect("len"), 3);
    }

    #[test]
    fn delete_where_applies_conjunction_and_spares_done_tasks() {
        let queue = mk_queue();
        let deleted = queue
            .delete_where(&TaskFilter::of_type("A").with_status(TaskStatus::Error))
            .expect("delete where");
        assert_eq!(deleted, 1);

        let deleted = queue
            .delete_where(&TaskFilter::of_type("A"))
            .expect("delete by type");
        assert_eq!(deleted, 1);
        assert_eq!(ids(&queue.snapshot().expect("snapshot")), vec!["2", "4"]);
    }

    #[test]
    fn requeue_only_moves_error_tasks_back_to_pending() {
        let queue = mk_queue();
        assert!(queue.requeue_by_id(&TaskId::new("1")).expect("requeue error"));
        assert!(!queue.requeue_by_id(&TaskId::new("2")).expect("requeue pending"));
        assert!(!queue.requeue_by_id(&TaskId::new("3")).expect("requeue running"));
        assert!(!queue.requeue_by_id(&TaskId::new("99")).expect("requeue unknown"));

        let task = queue
            .get_by_id(&TaskId::new("1"))
            .expect("get")
            .expect("task 1");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn insert_replaces_existing_task_in_place() {
        let queue = mk_queue();
        queue
            .insert(mk_task("2", "C", TaskStatus::Error))
            .expect("replace");
        let tasks = queue.list_all().expect("list all");
        assert_eq!(ids(&tasks), vec!["1", "2", "3"]);
        assert_eq!(tasks[1].task_type, "C");
    }
}
