use crate::model::{CommandResult, DeviceCodeAuthorization};

/// Callback invoked exactly once with a command's result.
pub type CommandCallback = Box<dyn FnOnce(CommandResult) + Send>;

/// Receives the user code and verification URI once a device code flow
/// has been authorized, before polling begins.
pub type UserCodeSink = Box<dyn Fn(&DeviceCodeAuthorization) + Send>;

/// Where a caller wants its result delivered.
///
/// The dispatcher never invokes callbacks while holding internal locks; it
/// hands a closure to the caller's queue and moves on. An inline queue runs
/// the closure on the delivering thread, a UI adapter would marshal it onto
/// the main thread instead.
pub trait ResultQueue: Send + Sync {
    fn post(&self, task: Box<dyn FnOnce() + Send>);
}
