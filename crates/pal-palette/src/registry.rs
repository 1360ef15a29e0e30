//! Builds the palette's descriptor lists.
//!
//! Nothing here is cached: every call reflects the queue as it is now.

use pal_core::{MessageCatalog, MessageKey};
use pal_queue::TaskQueueAdapter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::descriptor::{CommandDescriptor, Operation, TASK_ID_PARAM, TASK_TYPE_PARAM};
use crate::error::PaletteError;

/// A sub-list produced by an expandable descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    pub items: Vec<CommandDescriptor>,
    /// Set when `items` is empty, for the host to show instead of a blank menu.
    pub notice: Option<String>,
}

pub struct CommandRegistry {
    queue: Arc<dyn TaskQueueAdapter>,
    catalog: Arc<dyn MessageCatalog>,
}

impl CommandRegistry {
    pub fn new(queue: Arc<dyn TaskQueueAdapter>, catalog: Arc<dyn MessageCatalog>) -> Self {
        Self { queue, catalog }
    }

    /// The fixed root menu, in display order.
    pub fn top_level(&self) -> Vec<CommandDescriptor> {
        let text = |key| self.catalog.text(key);
        vec![
            CommandDescriptor::listing(text(MessageKey::DeleteATask), Operation::ListTasks),
            CommandDescriptor::confirmed(
                text(MessageKey::DeleteAllTasks),
                Operation::DeleteAllTasks,
            ),
            CommandDescriptor::confirmed(
                text(MessageKey::DeleteAllFailedTasks),
                Operation::DeleteAllFailedTasks,
            ),
            CommandDescriptor::listing(
                text(MessageKey::DeleteAllTasksByType),
                Operation::ListTaskTypes,
            ),
            CommandDescriptor::confirmed(
                text(MessageKey::DeletePendingTasks),
                Operation::DeletePendingTasks,
            ),
            CommandDescriptor::confirmed(
                text(MessageKey::DeleteRunningTask),
                Operation::DeleteRunningTask,
            ),
            CommandDescriptor::confirmed(
                text(MessageKey::RestartFailedTasks),
                Operation::RestartFailedTasks,
            ),
        ]
    }

    /// One delete entry per queued task.
    pub fn tasks_list(&self) -> Result<Vec<CommandDescriptor>, PaletteError> {
        Ok(self
            .queue
            .list_all()?
            .into_iter()
            .map(|task| {
                CommandDescriptor::confirmed(task.description, Operation::DeleteTask)
                    .with_param(TASK_ID_PARAM, task.id.0)
            })
            .collect())
    }

    /// One delete-by-type entry per distinct task type, in first-seen order.
    pub fn types_list(&self) -> Result<Vec<CommandDescriptor>, PaletteError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for task in self.queue.list_all()? {
            if seen.insert(task.task_type.clone()) {
                out.push(
                    CommandDescriptor::confirmed(
                        task.task_type.clone(),
                        Operation::DeleteAllTasksByType,
                    )
                    .with_param(TASK_TYPE_PARAM, task.task_type),
                );
            }
        }
        Ok(out)
    }

    pub fn expand(&self, descriptor: &CommandDescriptor) -> Result<Expansion, PaletteError> {
        let items = match descriptor.operation {
            Operation::ListTasks => self.tasks_list()?,
            Operation::ListTaskTypes => self.types_list()?,
            operation => return Err(PaletteError::NotExpandable { operation }),
        };
        let notice = items
            .is_empty()
            .then(|| self.catalog.text(MessageKey::NoTasks));
        Ok(Expansion { items, notice })
    }
}
