//! Core task types shared by the queue adapters and the palette.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of a queued task.
///
/// ```text
/// Pending → Running → Done
///              ↓
///            Error → (requeue) → Pending
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Error,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Error => "error",
            TaskStatus::Done => "done",
        }
    }

    /// Done tasks are never surfaced by queue enumeration.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Only failed tasks go back to the queue.
    pub fn can_requeue(self) -> bool {
        matches!(self, TaskStatus::Error)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "error" => Ok(TaskStatus::Error),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!(
                "invalid task status '{other}'. valid values: pending, running, error, done"
            )),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of deferred work as seen through the queue store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    /// Hierarchy depth; 0 for root tasks.
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        task_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: TaskId::new(id),
            task_type: task_type.into(),
            status: TaskStatus::Pending,
            level: 0,
            parent_id: None,
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach this task under `parent`, one level below it.
    pub fn with_parent(mut self, parent: &Task) -> Self {
        self.parent_id = Some(parent.id.clone());
        self.level = parent.level + 1;
        self
    }
}

/// Conjunction of equality filters over a task.
///
/// An empty filter matches every task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub level: Option<u32>,
}

impl TaskFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of_type(task_type: impl Into<String>) -> Self {
        Self {
            task_type: Some(task_type.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.task_type.is_none() && self.status.is_none() && self.level.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.task_type
            .as_deref()
            .map_or(true, |task_type| task.task_type == task_type)
            && self.status.map_or(true, |status| task.status == status)
            && self.level.map_or(true, |level| task.level == level)
    }
}
