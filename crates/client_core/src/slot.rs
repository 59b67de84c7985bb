use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Holds at most one in-flight request for a view. Issuing a new request
/// aborts the previous one, and dropping the slot aborts whatever is still
/// running, so a superseded or orphaned response never reaches view state.
pub struct RequestSlot<T> {
    label: &'static str,
    generation: u64,
    active: Option<(u64, JoinHandle<T>)>,
}

impl<T: Send + 'static> RequestSlot<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            generation: 0,
            active: None,
        }
    }

    pub fn issue<F>(&mut self, request: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        self.active = Some((generation, tokio::spawn(request)));
        debug!(slot = self.label, generation, "request issued");
        generation
    }

    pub fn cancel(&mut self) {
        if let Some((generation, task)) = self.active.take() {
            task.abort();
            debug!(slot = self.label, generation, "request superseded");
        }
        self.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves with the latest request's output. Returns `None` when nothing
    /// is in flight or the task died. Dropping the returned future keeps the
    /// request alive.
    pub async fn next(&mut self) -> Option<T> {
        let (generation, task) = self.active.as_mut()?;
        let generation = *generation;
        let outcome = task.await;
        self.active = None;

        match outcome {
            Ok(output) => Some(output),
            Err(err) if err.is_cancelled() => None,
            Err(err) => {
                error!(slot = self.label, generation, "request task failed: {err}");
                None
            }
        }
    }
}

impl<T> Drop for RequestSlot<T> {
    fn drop(&mut self) {
        if let Some((_, task)) = self.active.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/slot_tests.rs"]
mod tests;
