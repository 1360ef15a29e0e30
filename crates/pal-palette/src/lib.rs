pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod palette;
pub mod registry;

#[cfg(test)]
mod testing;

pub use descriptor::*;
pub use dispatch::*;
pub use error::*;
pub use lifecycle::*;
pub use palette::*;
pub use registry::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_root_reexports() {
        let descriptor = CommandDescriptor::listing("Delete a task", Operation::ListTasks);
        assert!(descriptor.expandable);
        assert_eq!(FailureKind::NotFound, PaletteError::NotFound { task_id: "1".into() }.kind());
        assert!(BulkOutcome::default().is_empty());
        assert_eq!(SideEffect::default(), SideEffect::None);
    }
}
