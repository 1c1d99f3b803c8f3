use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::warn;

use crate::ports::ResultQueue;

type Job = Box<dyn FnOnce() + Send>;

/// Fixed-size thread pool over a shared job channel.
///
/// Workers drain jobs until the pool is dropped; `Drop` closes the channel
/// and joins every worker, so no queued job is abandoned mid-run.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                std::thread::spawn(move || loop {
                    let job = match receiver.lock() {
                        Ok(guard) => guard.recv(),
                        Err(_) => break,
                    };
                    match job {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// A single-threaded pool; jobs run strictly in submission order.
    pub fn serial() -> Self {
        Self::new(1)
    }

    pub fn execute(&self, job: Job) {
        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                warn!("worker pool has shut down, dropping job");
            }
        }
    }
}

impl ResultQueue for WorkerPool {
    fn post(&self, task: Box<dyn FnOnce() + Send>) {
        self.execute(task);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread panicked");
            }
        }
    }
}
