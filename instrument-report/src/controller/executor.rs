// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    any::Any,
    io,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::mpsc,
    thread::{self, JoinHandle},
};
use tracing::warn;

/// A unit of work sent to a [`MainThreadExecutor`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks in the host's main execution context.
pub trait MainThreadExecutor {
    /// Schedules a task. This does not wait for the task to run.
    fn execute(&self, task: Task);
}

/// Runs tasks immediately, on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl MainThreadExecutor for InlineExecutor {
    fn execute(&self, task: Task) {
        task()
    }
}

/// Runs tasks in order on a dedicated thread.
///
/// A task that panics is logged, and the tasks after it still run. Dropping the executor waits
/// for all scheduled tasks to run.
#[derive(Debug)]
pub struct WorkerThreadExecutor {
    // Invariant: sender and handle are always Some while the executor is alive.
    sender: Option<mpsc::Sender<Task>>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerThreadExecutor {
    /// Spawns the worker thread.
    pub fn new() -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Task>();
        let handle = thread::Builder::new()
            .name("instrument-report-main".to_owned())
            .spawn(move || {
                while let Ok(task) = receiver.recv() {
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
                        warn!(
                            message = panic_payload_to_string(payload),
                            "task on main thread executor panicked"
                        );
                    }
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }
}

impl MainThreadExecutor for WorkerThreadExecutor {
    fn execute(&self, task: Task) {
        let Some(sender) = &self.sender else {
            return;
        };
        // The worker only exits once the sender is dropped.
        if sender.send(task).is_err() {
            warn!("main thread executor has exited, task dropped");
        }
    }
}

impl Drop for WorkerThreadExecutor {
    fn drop(&mut self) {
        // Dropping the sender signals the worker to exit once the queue is drained.
        std::mem::drop(self.sender.take());

        if let Some(handle) = self.handle.take()
            && let Err(payload) = handle.join()
        {
            warn!(
                message = panic_payload_to_string(payload),
                "main thread executor exited abnormally"
            );
        }
    }
}

fn panic_payload_to_string(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "(unknown panic payload)".to_owned()
    }
}
