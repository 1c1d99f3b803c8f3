use crate::ports::ResultQueue;

/// Runs delivery tasks immediately on the posting thread.
///
/// Suitable for CLIs and tests; a UI host would provide a queue that
/// marshals onto its main thread instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineQueue;

impl ResultQueue for InlineQueue {
    fn post(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_runs_task_synchronously() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        InlineQueue.post(Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
    }
}
