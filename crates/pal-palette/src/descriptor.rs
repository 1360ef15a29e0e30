//! Menu entries and the operations they are bound to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TASK_ID_PARAM: &str = "taskId";
pub const TASK_TYPE_PARAM: &str = "taskType";

/// Parameters bound to a descriptor, and the variables passed at dispatch.
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListTasks,
    DeleteTask,
    DeleteAllTasks,
    DeleteAllFailedTasks,
    ListTaskTypes,
    DeleteAllTasksByType,
    DeletePendingTasks,
    DeleteRunningTask,
    RestartFailedTasks,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::ListTasks,
        Operation::DeleteTask,
        Operation::DeleteAllTasks,
        Operation::DeleteAllFailedTasks,
        Operation::ListTaskTypes,
        Operation::DeleteAllTasksByType,
        Operation::DeletePendingTasks,
        Operation::DeleteRunningTask,
        Operation::RestartFailedTasks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListTasks => "list_tasks",
            Operation::DeleteTask => "delete_task",
            Operation::DeleteAllTasks => "delete_all_tasks",
            Operation::DeleteAllFailedTasks => "delete_all_failed_tasks",
            Operation::ListTaskTypes => "list_task_types",
            Operation::DeleteAllTasksByType => "delete_all_tasks_by_type",
            Operation::DeletePendingTasks => "delete_pending_tasks",
            Operation::DeleteRunningTask => "delete_running_task",
            Operation::RestartFailedTasks => "restart_failed_tasks",
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase().replace('-', "_");
        Operation::ALL
            .into_iter()
            .find(|operation| operation.as_str() == needle)
            .ok_or_else(|| {
                let valid = Operation::ALL.map(Operation::as_str).join(", ");
                format!("invalid operation '{}'. valid values: {valid}", value.trim())
            })
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable palette entry. Built fresh on every registry query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    #[serde(default)]
    pub expandable: bool,
    #[serde(default)]
    pub confirm: bool,
    pub operation: Operation,
    #[serde(default)]
    pub params: Params,
}

impl CommandDescriptor {
    /// An entry that opens a sub-list.
    pub fn listing(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            expandable: true,
            confirm: false,
            operation,
            params: Params::new(),
        }
    }

    /// An entry that runs `operation` after the operator confirms.
    pub fn confirmed(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            expandable: false,
            confirm: true,
            operation,
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
