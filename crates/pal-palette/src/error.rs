use pal_queue::QueueError;
use serde::{Deserialize, Serialize};

use crate::descriptor::Operation;

/// Failure classes reported back to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidArguments,
    NotFound,
    StoreFailure,
    NotExecutable,
}

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("missing required argument `{name}` for {operation}")]
    InvalidArguments {
        operation: Operation,
        name: &'static str,
    },
    #[error("task not found: {task_id}")]
    NotFound { task_id: String },
    #[error("task store refused to delete task {task_id}")]
    Refused { task_id: String },
    #[error(transparent)]
    Store(#[from] QueueError),
    #[error("{operation} opens a sub-list and cannot be dispatched")]
    Expandable { operation: Operation },
    #[error("{operation} does not open a sub-list")]
    NotExpandable { operation: Operation },
}

impl PaletteError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PaletteError::InvalidArguments { .. } => FailureKind::InvalidArguments,
            PaletteError::NotFound { .. } => FailureKind::NotFound,
            PaletteError::Refused { .. } | PaletteError::Store(_) => FailureKind::StoreFailure,
            PaletteError::Expandable { .. } | PaletteError::NotExpandable { .. } => {
                FailureKind::NotExecutable
            }
        }
    }
}
