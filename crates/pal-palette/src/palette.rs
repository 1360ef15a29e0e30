use pal_core::MessageCatalog;
use pal_queue::TaskQueueAdapter;
use std::sync::Arc;

use crate::descriptor::{CommandDescriptor, Params};
use crate::dispatch::{DispatchResult, Dispatcher};
use crate::error::PaletteError;
use crate::lifecycle::TaskLifecycleService;
use crate::registry::{CommandRegistry, Expansion};

/// Registry and dispatcher wired over one queue and one catalog.
pub struct Palette {
    registry: CommandRegistry,
    dispatcher: Dispatcher,
}

impl Palette {
    pub fn new(queue: Arc<dyn TaskQueueAdapter>, catalog: Arc<dyn MessageCatalog>) -> Self {
        Self {
            registry: CommandRegistry::new(queue.clone(), catalog.clone()),
            dispatcher: Dispatcher::new(TaskLifecycleService::new(queue), catalog),
        }
    }

    pub fn top_level(&self) -> Vec<CommandDescriptor> {
        self.registry.top_level()
    }

    pub fn expand(&self, descriptor: &CommandDescriptor) -> Result<Expansion, PaletteError> {
        self.registry.expand(descriptor)
    }

    pub fn dispatch(&self, descriptor: &CommandDescriptor, variables: &Params) -> DispatchResult {
        self.dispatcher.dispatch(descriptor, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Operation;
    use crate::dispatch::SideEffect;
    use crate::testing::{task, RecordingQueue};
    use pal_core::{EnglishCatalog, TaskStatus};

    #[test]
    fn expand_then_dispatch_deletes_selected_task() {
        let queue = Arc::new(RecordingQueue::with_tasks([
            task("1", "A", TaskStatus::Pending),
            task("2", "B", TaskStatus::Error),
        ]));
        let palette = Palette::new(queue.clone(), Arc::new(EnglishCatalog));

        let menu = palette.top_level();
        let delete_a_task = menu
            .iter()
            .find(|d| d.operation == Operation::ListTasks)
            .expect("listing entry");
        let expansion = palette.expand(delete_a_task).expect("expand");
        assert_eq!(expansion.items.len(), 2);
        assert_eq!(expansion.notice, None);

        let result = palette.dispatch(&expansion.items[0], &Params::new());
        assert!(result.ok);
        assert_eq!(result.side_effect, SideEffect::CloseMenu);
        assert_eq!(queue.ids(), vec!["2"]);
    }
}
