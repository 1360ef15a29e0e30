//! Queue doubles shared by the palette's unit tests.

use pal_core::{Task, TaskFilter, TaskId, TaskStatus};
use pal_queue::{InMemoryTaskQueue, QueueError, TaskQueueAdapter};
use std::collections::HashSet;
use std::sync::Mutex;

/// Wraps an in-memory queue, records every adapter call, and can simulate
/// engine activity and store failures.
#[derive(Default)]
pub struct RecordingQueue {
    pub inner: InMemoryTaskQueue,
    calls: Mutex<Vec<&'static str>>,
    vanish_after_list: Mutex<Vec<TaskId>>,
    refuse_deletes: bool,
    failing_deletes: HashSet<TaskId>,
    unavailable: bool,
}

impl RecordingQueue {
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            inner: InMemoryTaskQueue::from_tasks(tasks),
            ..Self::default()
        }
    }

    /// The engine removes `id` right after the next listing call returns.
    pub fn vanish_after_list(self, id: &str) -> Self {
        self.vanish_after_list
            .lock()
            .expect("vanish lock")
            .push(TaskId::new(id));
        self
    }

    pub fn refusing_deletes(mut self) -> Self {
        self.refuse_deletes = true;
        self
    }

    pub fn failing_delete_of(mut self, id: &str) -> Self {
        self.failing_deletes.insert(TaskId::new(id));
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|seen| **seen == call).count()
    }

    /// Number of calls that could have changed the store.
    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(**call, "delete_by_id" | "delete_where" | "requeue_by_id"))
            .count()
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner
            .snapshot()
            .expect("snapshot")
            .into_iter()
            .map(|task| task.id.0)
            .collect()
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.inner
            .get_by_id(&TaskId::new(id))
            .expect("get by id")
            .map(|task| task.status)
    }

    fn record(&self, call: &'static str) -> Result<(), QueueError> {
        self.calls.lock().expect("calls lock").push(call);
        if self.unavailable {
            return Err(QueueError::Unavailable {
                message: "store offline".to_string(),
            });
        }
        Ok(())
    }

    fn after_list(&self) {
        let vanished: Vec<TaskId> = self
            .vanish_after_list
            .lock()
            .expect("vanish lock")
            .drain(..)
            .collect();
        for id in vanished {
            let _ = self.inner.delete_by_id(&id);
        }
    }
}

impl TaskQueueAdapter for RecordingQueue {
    fn list_all(&self) -> Result<Vec<Task>, QueueError> {
        self.record("list_all")?;
        let tasks = self.inner.list_all();
        self.after_list();
        tasks
    }

    fn list_pending(&self) -> Result<Vec<Task>, QueueError> {
        self.record("list_pending")?;
        let tasks = self.inner.list_pending();
        self.after_list();
        tasks
    }

    fn list_where(&self, filter: &TaskFilter) -> Result<Vec<Task>, QueueError> {
        self.record("list_where")?;
        let tasks = self.inner.list_where(filter);
        self.after_list();
        tasks
    }

    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, QueueError> {
        self.record("get_by_id")?;
        self.inner.get_by_id(id)
    }

    fn get_running(&self) -> Result<Option<Task>, QueueError> {
        self.record("get_running")?;
        self.inner.get_running()
    }

    fn delete_by_id(&self, id: &TaskId) -> Result<bool, QueueError> {
        self.record("delete_by_id")?;
        if self.failing_deletes.contains(id) {
            return Err(QueueError::Unavailable {
                message: format!("constraint violation deleting {id}"),
            });
        }
        if self.refuse_deletes {
            return Ok(false);
        }
        self.inner.delete_by_id(id)
    }

    fn delete_where(&self, filter: &TaskFilter) -> Result<usize, QueueError> {
        self.record("delete_where")?;
        self.inner.delete_where(filter)
    }

    fn requeue_by_id(&self, id: &TaskId) -> Result<bool, QueueError> {
        self.record("requeue_by_id")?;
        self.inner.requeue_by_id(id)
    }
}

pub fn task(id: &str, task_type: &str, status: TaskStatus) -> Task {
    Task::new(id, task_type, format!("{task_type} task {id}")).with_status(status)
}
