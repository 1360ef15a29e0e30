//! SQLite-backed task queue over a single `tasks` table.

use chrono::{DateTime, Utc};
use pal_core::{Task, TaskFilter, TaskId, TaskStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::adapter::TaskQueueAdapter;
use crate::error::QueueError;

const TASK_COLUMNS: &str =
    "task_id, task_type, status, level, parent_id, description, created_at";

#[derive(Debug)]
pub struct SqliteTaskQueue {
    conn: Mutex<Connection>,
}

impl SqliteTaskQueue {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, QueueError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn migrate(&self) -> Result<(), QueueError> {
        self.lock()?.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS tasks (
    task_id TEXT PRIMARY KEY,
    task_type TEXT NOT NULL,
    status TEXT NOT NULL,
    level INTEGER NOT NULL DEFAULT 0,
    parent_id TEXT,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_type ON tasks(task_type);
"#,
        )?;
        Ok(())
    }

    /// Insert or replace a task. Replacing keeps its place in the queue.
    pub fn insert_task(&self, task: &Task) -> Result<(), QueueError> {
        self.lock()?.execute(
            r#"
INSERT INTO tasks (task_id, task_type, status, level, parent_id, description, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT(task_id) DO UPDATE SET
  task_type = excluded.task_type,
  status = excluded.status,
  level = excluded.level,
  parent_id = excluded.parent_id,
  description = excluded.description
"#,
            params![
                task.id.0,
                task.task_type,
                task.status.as_str(),
                i64::from(task.level),
                task.parent_id.as_ref().map(|id| id.0.clone()),
                task.description,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, QueueError> {
        self.conn.lock().map_err(|_| QueueError::Poisoned)
    }

    fn query_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, QueueError> {
        let (where_sql, values) = filter_clause(filter);
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE {where_sql} ORDER BY rowid ASC");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), TaskRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }
}

impl TaskQueueAdapter for SqliteTaskQueue {
    fn list_all(&self) -> Result<Vec<Task>, QueueError> {
        self.query_tasks(&TaskFilter::any())
    }

    fn list_where(&self, filter: &TaskFilter) -> Result<Vec<Task>, QueueError> {
        self.query_tasks(filter)
    }

    fn get_by_id(&self, id: &TaskId) -> Result<Option<Task>, QueueError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1"),
                params![id.0],
                TaskRow::from_row,
            )
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    fn delete_by_id(&self, id: &TaskId) -> Result<bool, QueueError> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM tasks WHERE task_id = ?1", params![id.0])?;
        debug!(task_id = %id, deleted, "sqlite delete");
        Ok(deleted > 0)
    }

    fn delete_where(&self, filter: &TaskFilter) -> Result<usize, QueueError> {
        let (where_sql, values) = filter_clause(filter);
        let deleted = self.lock()?.execute(
            &format!("DELETE FROM tasks WHERE {where_sql}"),
            params_from_iter(values),
        )?;
        debug!(?filter, deleted, "sqlite delete where");
        Ok(deleted)
    }

    fn requeue_by_id(&self, id: &TaskId) -> Result<bool, QueueError> {
        let changed = self.lock()?.execute(
            "UPDATE tasks SET status = ?1 WHERE task_id = ?2 AND status = ?3",
            params![
                TaskStatus::Pending.as_str(),
                id.0,
                TaskStatus::Error.as_str()
            ],
        )?;
        Ok(changed > 0)
    }
}

/// SQL conjunction for `filter`. Done tasks never match.
fn filter_clause(filter: &TaskFilter) -> (String, Vec<Value>) {
    let mut clauses = vec![format!("status != '{}'", TaskStatus::Done.as_str())];
    let mut values = Vec::new();

    if let Some(task_type) = &filter.task_type {
        values.push(Value::Text(task_type.clone()));
        clauses.push(format!("task_type = ?{}", values.len()));
    }
    if let Some(status) = filter.status {
        values.push(Value::Text(status.as_str().to_string()));
        clauses.push(format!("status = ?{}", values.len()));
    }
    if let Some(level) = filter.level {
        values.push(Value::Integer(i64::from(level)));
        clauses.push(format!("level = ?{}", values.len()));
    }

    (clauses.join(" AND "), values)
}

struct TaskRow {
    task_id: String,
    task_type: String,
    status: String,
    level: i64,
    parent_id: Option<String>,
    description: String,
    created_at: String,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            task_id: row.get(0)?,
            task_type: row.get(1)?,
            status: row.get(2)?,
            level: row.get(3)?,
            parent_id: row.get(4)?,
            description: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_task(self) -> Result<Task, QueueError> {
        let status = self
            .status
            .parse::<TaskStatus>()
            .map_err(|_| QueueError::UnknownStatus {
                value: self.status.clone(),
            })?;
        let level =
            u32::try_from(self.level).map_err(|_| QueueError::InvalidLevel { value: self.level })?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|source| QueueError::TimestampParse {
                value: self.created_at.clone(),
                source,
            })?
            .with_timezone(&Utc);

        Ok(Task {
            id: TaskId(self.task_id),
            task_type: self.task_type,
            status,
            level,
            parent_id: self.parent_id.map(TaskId),
            description: self.description,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_store() -> SqliteTaskQueue {
        let store = SqliteTaskQueue::open_in_memory().expect("open sqlite");
        store.migrate().expect("migrate");
        store
    }

    fn mk_task(id: &str, task_type: &str, status: TaskStatus) -> Task {
        Task::new(id, task_type, format!("{task_type} #{id}")).with_status(status)
    }

    fn seeded_store() -> SqliteTaskQueue {
        let store = mk_store();
        for task in [
            mk_task("1", "A", TaskStatus::Error),
            mk_task("2", "B", TaskStatus::Pending),
            mk_task("3", "A", TaskStatus::Running),
            mk_task("4", "A", TaskStatus::Done),
        ] {
            store.insert_task(&task).expect("insert task");
        }
        store
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_ref()).collect()
    }

    #[test]
    fn insert_and_get_by_id_roundtrip() {
        let store = mk_store();
        let root = mk_task("10", "Resave", TaskStatus::Error);
        let child = mk_task("11", "Resave", TaskStatus::Pending).with_parent(&root);
        store.insert_task(&root).expect("insert root");
        store.insert_task(&child).expect("insert child");

        let loaded = store
            .get_by_id(&TaskId::new("11"))
            .expect("get")
            .expect("child present");
        assert_eq!(loaded.level, 1);
        assert_eq!(loaded.parent_id, Some(TaskId::new("10")));
        assert_eq!(loaded.description, "Resave #11");
        assert_eq!(loaded.created_at.timestamp(), child.created_at.timestamp());
        assert!(store.get_by_id(&TaskId::new("404")).expect("get").is_none());
    }

    #[test]
    fn list_all_hides_done_and_keeps_insertion_order_across_upserts() {
        let store = seeded_store();
        store
            .insert_task(&mk_task("1", "A", TaskStatus::Pending))
            .expect("upsert first task");

        let tasks = store.list_all().expect("list all");
        assert_eq!(ids(&tasks), vec!["1", "2", "3"]);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn pending_and_running_views_follow_status() {
        let store = seeded_store();
        assert_eq!(ids(&store.list_pending().expect("pending")), vec!["2"]);
        let running = store.get_running().expect("running").expect("one running");
        assert_eq!(running.id, TaskId::new("3"));
    }

    #[test]
    fn delete_where_builds_a_conjunction() {
        let store = seeded_store();
        let deleted = store
            .delete_where(&TaskFilter::of_type("A").with_status(TaskStatus::Error).with_level(0))
            .expect("delete where");
        assert_eq!(deleted, 1);

        let deleted = store.delete_where(&TaskFilter::any()).expect("delete all");
        assert_eq!(deleted, 2);
        assert!(store.list_all().expect("list all").is_empty());
        assert!(store.get_by_id(&TaskId::new("4")).expect("get").is_some());
    }

    #[test]
    fn delete_by_id_is_false_for_missing_ids() {
        let store = seeded_store();
        assert!(store.delete_by_id(&TaskId::new("2")).expect("delete"));
        assert!(!store.delete_by_id(&TaskId::new("2")).expect("delete again"));
    }

    #[test]
    fn requeue_only_from_error() {
        let store = seeded_store();
        assert!(store.requeue_by_id(&TaskId::new("1")).expect("requeue error"));
        assert!(!store.requeue_by_id(&TaskId::new("1")).expect("requeue twice"));
        assert!(!store.requeue_by_id(&TaskId::new("2")).expect("requeue pending"));
        assert!(!store.requeue_by_id(&TaskId::new("404")).expect("requeue missing"));
        assert_eq!(ids(&store.list_pending().expect("pending")), vec!["1", "2"]);
    }

    #[test]
    fn corrupt_status_is_reported_not_panicked() {
        let store = seeded_store();
        store
            .lock()
            .expect("lock")
            .execute("UPDATE tasks SET status = 'stuck' WHERE task_id = '2'", [])
            .expect("corrupt row");

        let err = store.list_all().expect_err("unknown status");
        assert!(matches!(err, QueueError::UnknownStatus { ref value } if value == "stuck"));
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tasks.sqlite");
        {
            let store = SqliteTaskQueue::open(&path).expect("open file store");
            store.migrate().expect("migrate");
            store
                .insert_task(&mk_task("1", "A", TaskStatus::Pending))
                .expect("insert");
        }

        let reopened = SqliteTaskQueue::open(&path).expect("reopen");
        reopened.migrate().expect("migrate again");
        assert_eq!(ids(&reopened.list_all().expect("list")), vec!["1"]);
    }
}
