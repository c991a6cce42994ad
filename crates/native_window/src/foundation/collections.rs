//! Handle types for slot-map backed registries

pub use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Registration handle for a window observer
    pub struct ObserverId;

    /// Handle for a task posted to a `TaskRunner`
    pub struct TaskId;
}
