//! Resolves a selected descriptor into a lifecycle call and a status message.

use pal_core::{MessageCatalog, MessageKey, TaskId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::descriptor::{CommandDescriptor, Operation, Params, TASK_ID_PARAM, TASK_TYPE_PARAM};
use crate::error::{FailureKind, PaletteError};
use crate::lifecycle::{BulkOutcome, RunningOutcome, TaskLifecycleService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskArgs {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteByTypeArgs {
    pub task_type: String,
}

/// A fully validated call into the lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    DeleteTask(DeleteTaskArgs),
    DeleteAllTasks,
    DeleteAllFailedTasks,
    DeleteAllTasksByType(DeleteByTypeArgs),
    DeletePendingTasks,
    DeleteRunningTask,
    RestartFailedTasks,
}

impl Invocation {
    /// Validate `variables` for `operation`. Blank values count as missing.
    pub fn resolve(operation: Operation, variables: &Params) -> Result<Self, PaletteError> {
        let invocation = match operation {
            Operation::ListTasks | Operation::ListTaskTypes => {
                return Err(PaletteError::Expandable { operation })
            }
            Operation::DeleteTask => Invocation::DeleteTask(DeleteTaskArgs {
                task_id: TaskId::new(required(operation, variables, TASK_ID_PARAM)?),
            }),
            Operation::DeleteAllTasksByType => Invocation::DeleteAllTasksByType(DeleteByTypeArgs {
                task_type: required(operation, variables, TASK_TYPE_PARAM)?,
            }),
            Operation::DeleteAllTasks => Invocation::DeleteAllTasks,
            Operation::DeleteAllFailedTasks => Invocation::DeleteAllFailedTasks,
            Operation::DeletePendingTasks => Invocation::DeletePendingTasks,
            Operation::DeleteRunningTask => Invocation::DeleteRunningTask,
            Operation::RestartFailedTasks => Invocation::RestartFailedTasks,
        };
        Ok(invocation)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Invocation::DeleteTask(_) => Operation::DeleteTask,
            Invocation::DeleteAllTasks => Operation::DeleteAllTasks,
            Invocation::DeleteAllFailedTasks => Operation::DeleteAllFailedTasks,
            Invocation::DeleteAllTasksByType(_) => Operation::DeleteAllTasksByType,
            Invocation::DeletePendingTasks => Operation::DeletePendingTasks,
            Invocation::DeleteRunningTask => Operation::DeleteRunningTask,
            Invocation::RestartFailedTasks => Operation::RestartFailedTasks,
        }
    }
}

fn required(
    operation: Operation,
    variables: &Params,
    name: &'static str,
) -> Result<String, PaletteError> {
    variables
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(PaletteError::InvalidArguments { operation, name })
}

/// What the host should do with the open menu after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    #[default]
    None,
    CloseMenu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub ok: bool,
    pub message: String,
    pub side_effect: SideEffect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Per-item tally for bulk operations. `ok` does not depend on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk: Option<BulkOutcome>,
}

/// Descriptor params first, then caller variables, which win on conflict.
pub fn merge_variables(descriptor: &CommandDescriptor, variables: &Params) -> Params {
    let mut merged = descriptor.params.clone();
    merged.extend(
        variables
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

pub struct Dispatcher {
    service: TaskLifecycleService,
    catalog: Arc<dyn MessageCatalog>,
}

impl Dispatcher {
    pub fn new(service: TaskLifecycleService, catalog: Arc<dyn MessageCatalog>) -> Self {
        Self { service, catalog }
    }

    pub fn dispatch(&self, descriptor: &CommandDescriptor, variables: &Params) -> DispatchResult {
        let merged = merge_variables(descriptor, variables);
        match Invocation::resolve(descriptor.operation, &merged) {
            Ok(invocation) => self.execute(invocation),
            Err(err) => {
                warn!(operation = %descriptor.operation, error = %err, "dispatch rejected");
                self.failed(&err)
            }
        }
    }

    pub fn execute(&self, invocation: Invocation) -> DispatchResult {
        let operation = invocation.operation();
        info!(%operation, "dispatching");

        match invocation {
            Invocation::DeleteTask(args) => match self.service.delete_task(&args.task_id) {
                Ok(()) => self.reply(true, MessageKey::TaskDeleted, SideEffect::CloseMenu),
                Err(err) => {
                    let key = match &err {
                        PaletteError::Store(_) => MessageKey::StoreFailure,
                        _ => MessageKey::TaskNotDeleted,
                    };
                    DispatchResult {
                        failure: Some(err.kind()),
                        ..self.reply(false, key, SideEffect::None)
                    }
                }
            },
            Invocation::DeleteAllTasks => {
                self.bulk(self.service.delete_all_tasks(), MessageKey::TasksDeleted)
            }
            Invocation::DeleteAllFailedTasks => self.bulk(
                self.service.delete_all_failed_tasks(),
                MessageKey::TasksDeleted,
            ),
            Invocation::DeleteAllTasksByType(args) => self.bulk(
                self.service.delete_all_tasks_by_type(&args.task_type),
                MessageKey::TasksDeleted,
            ),
            Invocation::DeletePendingTasks => self.bulk(
                self.service.delete_pending_tasks(),
                MessageKey::TasksDeleted,
            ),
            Invocation::RestartFailedTasks => self.bulk(
                self.service.restart_failed_tasks(),
                MessageKey::FailedTasksRestarted,
            ),
            Invocation::DeleteRunningTask => match self.service.delete_running_task() {
                Ok(RunningOutcome::Deleted(_)) => {
                    self.reply(true, MessageKey::RunningTaskDeleted, SideEffect::None)
                }
                Ok(RunningOutcome::NoneRunning) => DispatchResult {
                    failure: Some(FailureKind::NotFound),
                    ..self.reply(false, MessageKey::NoRunningTask, SideEffect::None)
                },
                Ok(RunningOutcome::NotDeleted(_)) => DispatchResult {
                    failure: Some(FailureKind::StoreFailure),
                    ..self.reply(false, MessageKey::RunningTaskNotDeleted, SideEffect::None)
                },
                Err(err) => self.failed(&err),
            },
        }
    }

    /// Bulk sweeps report success whenever the snapshot could be taken. The
    /// "no tasks" notice is reserved for an empty store, not an empty match.
    fn bulk(&self, result: Result<BulkOutcome, PaletteError>, done: MessageKey) -> DispatchResult {
        match result {
            Ok(outcome) => {
                let key = if !outcome.is_empty() {
                    done
                } else {
                    match self.service.has_tasks() {
                        Ok(true) => done,
                        Ok(false) => MessageKey::NoTasks,
                        Err(err) => return self.failed(&err),
                    }
                };
                DispatchResult {
                    bulk: Some(outcome),
                    ..self.reply(true, key, SideEffect::None)
                }
            }
            Err(err) => self.failed(&err),
        }
    }

    fn failed(&self, err: &PaletteError) -> DispatchResult {
        let key = match err.kind() {
            FailureKind::InvalidArguments => MessageKey::MissingInformation,
            FailureKind::NotFound => MessageKey::TaskNotDeleted,
            FailureKind::StoreFailure => MessageKey::StoreFailure,
            FailureKind::NotExecutable => MessageKey::NotExecutable,
        };
        DispatchResult {
            failure: Some(err.kind()),
            ..self.reply(false, key, SideEffect::None)
        }
    }

    fn reply(&self, ok: bool, key: MessageKey, side_effect: SideEffect) -> DispatchResult {
        DispatchResult {
            ok,
            message: self.catalog.text(key),
            side_effect,
            failure: None,
            bulk: None,
        }
    }
}
