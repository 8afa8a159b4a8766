/// Capability flag describing whether the current execution context can load
/// and run a module the way a dedicated worker does.
pub trait WorkerContext {
    fn supports_module_loading(&self) -> bool;
}

/// Fixed answer, for hosts that already know what they are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSupport {
    Available,
    Unavailable,
}

impl WorkerContext for WorkerSupport {
    fn supports_module_loading(&self) -> bool {
        matches!(self, WorkerSupport::Available)
    }
}
