//! Per-session debouncing of editor events.
//!
//! Each debouncer owns one worker thread. `schedule` replaces whatever is
//! pending; when the delay elapses without another `schedule`, the handler
//! runs on the worker with the latest payload. Handlers for one debouncer
//! therefore never overlap.
//!
//! A generation counter makes replacement atomic with respect to firing:
//! `schedule` and `cancel` bump the generation before talking to the
//! worker, and the worker only fires a payload whose generation is still
//! current.

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

enum Command<T> {
    Schedule {
        generation: u64,
        delay: Duration,
        payload: T,
    },
    Cancel,
    Shutdown,
}

struct Pending<T> {
    generation: u64,
    deadline: Instant,
    payload: T,
}

pub struct EventDebouncer<T: Send + 'static> {
    name: String,
    tx: Sender<Command<T>>,
    generation: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> EventDebouncer<T> {
    /// Start a debouncer whose `handler` runs on its own worker thread.
    ///
    /// A panicking handler is logged and does not stop the worker.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = unbounded::<Command<T>>();
        let generation = Arc::new(AtomicU64::new(0));

        let worker_generation = Arc::clone(&generation);
        let worker_name = name.clone();
        let worker = thread::spawn(move || {
            run_worker(&worker_name, rx, worker_generation, handler);
        });

        Self {
            name,
            tx,
            generation,
            worker: Some(worker),
        }
    }

    /// Run `handler(payload)` after `delay`, replacing any pending payload.
    pub fn schedule(&self, payload: T, delay: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .tx
            .send(Command::Schedule {
                generation,
                delay,
                payload,
            })
            .is_err()
        {
            debug!(debouncer = %self.name, "schedule after shutdown ignored");
        }
    }

    /// Drop the pending payload, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(Command::Cancel).is_err() {
            debug!(debouncer = %self.name, "cancel after shutdown ignored");
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cancel anything pending and stop the worker, waiting for a running
    /// handler to finish. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let _ = self.tx.send(Command::Shutdown);
            if handle.thread().id() == thread::current().id() {
                // Dropped from inside its own handler; the loop exits on
                // Shutdown once the handler returns.
                return;
            }
            if handle.join().is_err() {
                error!(debouncer = %self.name, "debounce worker panicked");
            }
        }
    }
}

impl<T: Send + 'static> Drop for EventDebouncer<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<T, F>(
    name: &str,
    rx: crossbeam_channel::Receiver<Command<T>>,
    generation: Arc<AtomicU64>,
    mut handler: F,
) where
    F: FnMut(T),
{
    let mut pending: Option<Pending<T>> = None;

    loop {
        let received = match &pending {
            Some(p) => rx.recv_deadline(p.deadline),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Command::Schedule {
                generation,
                delay,
                payload,
            }) => {
                trace!(debouncer = name, generation, "rescheduled");
                pending = Some(Pending {
                    generation,
                    deadline: Instant::now() + delay,
                    payload,
                });
            }
            Ok(Command::Cancel) => pending = None,
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let Some(due) = pending.take() else {
                    continue;
                };
                if due.generation != generation.load(Ordering::SeqCst) {
                    trace!(debouncer = name, generation = due.generation, "stale fire skipped");
                    continue;
                }
                if catch_unwind(AssertUnwindSafe(|| handler(due.payload))).is_err() {
                    error!(debouncer = name, "debounced handler panicked");
                }
            }
        }
    }

    debug!(debouncer = name, "debounce worker stopped");
}
