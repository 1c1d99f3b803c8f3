//! Command dispatch and result multiplexing.
//!
//! Deduplicable commands are keyed by [`CommandKey`]; while one execution
//! is in flight, later identical submissions only register an observer on
//! it. The entry is removed before results fan out, so an observer that
//! arrives after completion starts a fresh execution rather than receiving
//! a stale result. Delivery always goes through the observer's own result
//! queue and never happens while the in-flight map is locked.

use std::collections::HashMap;
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::adapters::WorkerPool;
use crate::error::{CommandError, PopAuthError, PopAuthResult};
use crate::model::{
    Command, CommandKey, CommandPayload, CommandRequest, CommandResult, CorrelationId,
};
use crate::ports::{CommandCallback, ResultQueue, TelemetryEvent, TelemetrySink, UserCodeSink};
use crate::use_cases::CommandExecutor;

struct Observer {
    callback: CommandCallback,
    queue: Arc<dyn ResultQueue>,
    correlation_id: CorrelationId,
}

struct InFlight {
    canonical_correlation_id: CorrelationId,
    observers: Vec<Observer>,
}

type InFlightMap = HashMap<CommandKey, InFlight>;

/// Entry point for command submission.
///
/// Interactive commands run on a dedicated serial worker so at most one
/// piece of UI is in progress; everything else shares the silent pool.
pub struct Dispatcher {
    executor: Arc<CommandExecutor>,
    telemetry: Arc<dyn TelemetrySink>,
    interactive_pool: WorkerPool,
    silent_pool: WorkerPool,
    in_flight: Arc<Mutex<InFlightMap>>,
}

impl Dispatcher {
    pub fn new(
        executor: Arc<CommandExecutor>,
        telemetry: Arc<dyn TelemetrySink>,
        silent_workers: usize,
    ) -> Self {
        Self {
            executor,
            telemetry,
            interactive_pool: WorkerPool::serial(),
            silent_pool: WorkerPool::new(silent_workers),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submit a command; `callback` is posted to `queue` exactly once with
    /// the result.
    pub fn submit(&self, command: Command, queue: Arc<dyn ResultQueue>, callback: CommandCallback) {
        let observer = Observer {
            callback,
            queue,
            correlation_id: command.correlation_id().clone(),
        };

        if !command.request().is_deduplicable() {
            self.spawn(command, None, vec![observer], None);
            return;
        }

        let key = command.key();
        {
            let mut map = lock_in_flight(&self.in_flight);
            if let Some(entry) = map.get_mut(&key) {
                if entry.canonical_correlation_id != observer.correlation_id {
                    warn!(
                        canonical = entry.canonical_correlation_id.as_str(),
                        joined = observer.correlation_id.as_str(),
                        "command joins an in-flight execution under a different correlation id"
                    );
                }
                self.telemetry.record(TelemetryEvent::CommandCoalesced {
                    correlation_id: observer.correlation_id.as_str().to_string(),
                });
                entry.observers.push(observer);
                return;
            }
            map.insert(
                key.clone(),
                InFlight {
                    canonical_correlation_id: observer.correlation_id.clone(),
                    observers: vec![observer],
                },
            );
        }
        self.spawn(command, Some(key), Vec::new(), None);
    }

    /// Submit a device code flow. `on_user_code` fires once the flow has
    /// been authorized, before polling begins; `callback` receives the
    /// final token result. The two phases cannot be submitted separately.
    pub fn submit_device_code_flow(
        &self,
        command: Command,
        queue: Arc<dyn ResultQueue>,
        on_user_code: UserCodeSink,
        callback: CommandCallback,
    ) {
        let observer = Observer {
            callback,
            queue,
            correlation_id: command.correlation_id().clone(),
        };
        self.spawn(command, None, vec![observer], Some(on_user_code));
    }

    /// Submit without caring about the result.
    pub fn submit_and_forget(&self, command: Command) {
        self.submit(
            command,
            Arc::new(crate::adapters::InlineQueue),
            Box::new(|_| {}),
        );
    }

    /// Submit and block the calling thread until the result arrives.
    pub fn submit_blocking(&self, command: Command) -> PopAuthResult<CommandResult> {
        let (tx, rx) = channel();
        self.submit(
            command,
            Arc::new(crate::adapters::InlineQueue),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.recv()
            .map_err(|_| CommandError::ResultChannelClosed.into())
    }

    /// Number of deduplicable executions currently in flight.
    pub fn outstanding_commands(&self) -> usize {
        lock_in_flight(&self.in_flight).len()
    }

    fn spawn(
        &self,
        command: Command,
        tracked: Option<CommandKey>,
        direct: Vec<Observer>,
        user_code: Option<UserCodeSink>,
    ) {
        let executor = Arc::clone(&self.executor);
        let telemetry = Arc::clone(&self.telemetry);
        let in_flight = Arc::clone(&self.in_flight);

        let pool = if command.request().creates_ui() {
            &self.interactive_pool
        } else {
            &self.silent_pool
        };
        pool.execute(Box::new(move || {
            let outcome = match (command.request(), user_code.as_ref()) {
                (CommandRequest::DeviceCodeFlow(params), Some(sink)) => executor
                    .device_code_flow(params, command.correlation_id(), sink.as_ref())
                    .map(CommandPayload::Token),
                _ => executor.execute(&command),
            };
            let result = match outcome {
                Ok(payload) => {
                    CommandResult::completed(command.correlation_id().clone(), payload)
                }
                Err(PopAuthError::Command(CommandError::UserCancelled)) => {
                    CommandResult::Cancelled {
                        correlation_id: command.correlation_id().clone(),
                    }
                }
                Err(err) => CommandResult::failed(command.correlation_id().clone(), err),
            };

            if command.request().is_eligible_for_telemetry() {
                telemetry.record(TelemetryEvent::CommandExecuted {
                    public_api_id: command.public_api_id().to_string(),
                    correlation_id: command.correlation_id().as_str().to_string(),
                    status: result.status(),
                });
            }

            let observers = match tracked {
                Some(key) => lock_in_flight(&in_flight)
                    .remove(&key)
                    .map(|entry| entry.observers)
                    .unwrap_or_default(),
                None => direct,
            };
            deliver(observers, result);
        }));
    }
}

fn lock_in_flight(map: &Mutex<InFlightMap>) -> MutexGuard<'_, InFlightMap> {
    match map.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Fan a result out in observer registration order. An observer that
/// joined under a different correlation id gets the canonical result as
/// is; the mismatch is only logged.
fn deliver(observers: Vec<Observer>, result: CommandResult) {
    for observer in observers {
        if observer.correlation_id != *result.correlation_id() {
            debug!(
                delivered = result.correlation_id().as_str(),
                observer = observer.correlation_id.as_str(),
                "delivering result under the canonical correlation id"
            );
        }
        let callback = observer.callback;
        let observer_result = result.clone();
        observer
            .queue
            .post(Box::new(move || callback(observer_result)));
    }
}
