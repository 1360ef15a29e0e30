//! Message keys and the catalog that turns them into display strings.
//!
//! No logic in the palette depends on the rendered text; hosts may swap the
//! catalog for a translated one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    DeleteATask,
    DeleteAllTasks,
    DeleteAllFailedTasks,
    DeleteAllTasksByType,
    DeletePendingTasks,
    DeleteRunningTask,
    RestartFailedTasks,
    NoTasks,
    NoRunningTask,
    TaskDeleted,
    TaskNotDeleted,
    TasksDeleted,
    RunningTaskDeleted,
    RunningTaskNotDeleted,
    FailedTasksRestarted,
    MissingInformation,
    StoreFailure,
    NotExecutable,
}

impl MessageKey {
    pub const ALL: [MessageKey; 18] = [
        MessageKey::DeleteATask,
        MessageKey::DeleteAllTasks,
        MessageKey::DeleteAllFailedTasks,
        MessageKey::DeleteAllTasksByType,
        MessageKey::DeletePendingTasks,
        MessageKey::DeleteRunningTask,
        MessageKey::RestartFailedTasks,
        MessageKey::NoTasks,
        MessageKey::NoRunningTask,
        MessageKey::TaskDeleted,
        MessageKey::TaskNotDeleted,
        MessageKey::TasksDeleted,
        MessageKey::RunningTaskDeleted,
        MessageKey::RunningTaskNotDeleted,
        MessageKey::FailedTasksRestarted,
        MessageKey::MissingInformation,
        MessageKey::StoreFailure,
        MessageKey::NotExecutable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::DeleteATask => "delete_a_task",
            MessageKey::DeleteAllTasks => "delete_all_tasks",
            MessageKey::DeleteAllFailedTasks => "delete_all_failed_tasks",
            MessageKey::DeleteAllTasksByType => "delete_all_tasks_by_type",
            MessageKey::DeletePendingTasks => "delete_pending_tasks",
            MessageKey::DeleteRunningTask => "delete_running_task",
            MessageKey::RestartFailedTasks => "restart_failed_tasks",
            MessageKey::NoTasks => "no_tasks",
            MessageKey::NoRunningTask => "no_running_task",
            MessageKey::TaskDeleted => "task_deleted",
            MessageKey::TaskNotDeleted => "task_not_deleted",
            MessageKey::TasksDeleted => "tasks_deleted",
            MessageKey::RunningTaskDeleted => "running_task_deleted",
            MessageKey::RunningTaskNotDeleted => "running_task_not_deleted",
            MessageKey::FailedTasksRestarted => "failed_tasks_restarted",
            MessageKey::MissingInformation => "missing_information",
            MessageKey::StoreFailure => "store_failure",
            MessageKey::NotExecutable => "not_executable",
        }
    }

    /// English text used when no override is configured.
    pub fn default_text(self) -> &'static str {
        match self {
            MessageKey::DeleteATask => "Delete a task",
            MessageKey::DeleteAllTasks => "Delete all tasks",
            MessageKey::DeleteAllFailedTasks => "Delete all failed tasks",
            MessageKey::DeleteAllTasksByType => "Delete all tasks by type",
            MessageKey::DeletePendingTasks => "Delete pending tasks",
            MessageKey::DeleteRunningTask => "Delete running task",
            MessageKey::RestartFailedTasks => "Restart failed tasks",
            MessageKey::NoTasks => "There are no tasks at the moment.",
            MessageKey::NoRunningTask => "There is no running task at the moment.",
            MessageKey::TaskDeleted => "Task deleted.",
            MessageKey::TaskNotDeleted => "Couldn't delete task.",
            MessageKey::TasksDeleted => "Tasks deleted.",
            MessageKey::RunningTaskDeleted => "Running task deleted.",
            MessageKey::RunningTaskNotDeleted => "Couldn't delete the running task.",
            MessageKey::FailedTasksRestarted => "Failed tasks restarted.",
            MessageKey::MissingInformation => "Missing required information.",
            MessageKey::StoreFailure => "Something went wrong while talking to the task queue.",
            MessageKey::NotExecutable => "This command opens a list and cannot be run directly.",
        }
    }
}

impl std::str::FromStr for MessageKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        MessageKey::ALL
            .into_iter()
            .find(|key| key.as_str() == needle)
            .ok_or_else(|| format!("unknown message key '{needle}'"))
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait MessageCatalog: Send + Sync {
    fn text(&self, key: MessageKey) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl MessageCatalog for EnglishCatalog {
    fn text(&self, key: MessageKey) -> String {
        key.default_text().to_string()
    }
}

/// Catalog with per-key overrides on top of the English defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideCatalog {
    overrides: BTreeMap<MessageKey, String>,
}

impl OverrideCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: MessageKey, text: impl Into<String>) -> Self {
        self.overrides.insert(key, text.into());
        self
    }

    /// Build from raw config entries. Unknown keys and blank values are skipped;
    /// config validation reports them.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut overrides = BTreeMap::new();
        for (raw_key, text) in entries {
            if text.trim().is_empty() {
                continue;
            }
            if let Ok(key) = raw_key.parse::<MessageKey>() {
                overrides.insert(key, text.clone());
            }
        }
        Self { overrides }
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl MessageCatalog for OverrideCatalog {
    fn text(&self, key: MessageKey) -> String {
        self.overrides
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_text().to_string())
    }
}
