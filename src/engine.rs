//! # Concurrent Execution Engine
//!
//! Fans a batch of independent tasks out to a bounded rayon pool and fans
//! their results back in as a stream of [`Completion`]s, in completion
//! order, each tagged with the index of the task that produced it.
//!
//! ## Guarantees
//!
//! - Every task runs exactly once and yields exactly one completion; the
//!   stream ends once all N completions have been delivered.
//! - A task returning `Err`, or panicking, produces a completion for that
//!   index only. Siblings are neither cancelled nor delayed.
//! - Abandoning the stream does not abort in-flight tasks: the pool keeps
//!   running spawned work until it is done, even after it is dropped.
//!
//! ```
//! use gee::engine::fan_out;
//!
//! let tasks: Vec<_> = (0..4).map(|n| move |_index: usize| Ok(n * 10)).collect();
//! let results = fan_out(tasks, 2).unwrap().into_indexed();
//! assert_eq!(results.len(), 4);
//! assert_eq!(*results[3].as_ref().unwrap(), 30);
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};

use log::{debug, trace};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Error, Result};

/// The result of one task.
#[derive(Debug)]
pub struct Completion<T> {
    pub index: usize,
    pub result: Result<T>,
}

/// The fan-in side of a batch: yields one [`Completion`] per task.
pub struct Completions<T> {
    rx: Receiver<Completion<T>>,
    total: usize,
    remaining: usize,
    // Held so the workers outlive the call that spawned them.
    _pool: Option<ThreadPool>,
}

impl<T> Completions<T> {
    /// Drain the stream into a vector indexed by task.
    ///
    /// A task whose completion never arrived is reported as
    /// [`Error::TaskLost`].
    pub fn into_indexed(self) -> Vec<Result<T>> {
        let total = self.total;
        let mut slots: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();
        for completion in self {
            if let Some(slot) = slots.get_mut(completion.index) {
                *slot = Some(completion.result);
            }
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or(Err(Error::TaskLost { index })))
            .collect()
    }
}

impl<T> Iterator for Completions<T> {
    type Item = Completion<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match self.rx.recv() {
            Ok(completion) => {
                self.remaining -= 1;
                trace!(
                    "task {} completed, {} remaining",
                    completion.index,
                    self.remaining
                );
                Some(completion)
            }
            // Every sender is gone; nothing more can arrive.
            Err(_) => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Run `tasks` on at most `concurrency` worker threads.
///
/// Each task receives its own index. Returns once every task has been
/// submitted; consume the returned [`Completions`] to wait for them.
/// Only pool construction can fail.
pub fn fan_out<T, F>(tasks: Vec<F>, concurrency: usize) -> Result<Completions<T>>
where
    T: Send + 'static,
    F: FnOnce(usize) -> Result<T> + Send + 'static,
{
    let total = tasks.len();
    let (tx, rx) = mpsc::channel();

    if total == 0 {
        return Ok(Completions {
            rx,
            total,
            remaining: 0,
            _pool: None,
        });
    }

    let threads = concurrency.clamp(1, total);
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("gee-worker-{}", i))
        .build()
        .map_err(|e| Error::Pool {
            message: e.to_string(),
        })?;
    debug!("fanning out {} tasks on {} workers", total, threads);

    for (index, task) in tasks.into_iter().enumerate() {
        let tx = tx.clone();
        pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| task(index))).unwrap_or_else(|payload| {
                Err(Error::TaskPanicked {
                    index,
                    message: panic_message(payload.as_ref()),
                })
            });
            // The receiver may already be gone; the task still ran.
            let _ = tx.send(Completion { index, result });
        });
    }

    Ok(Completions {
        rx,
        total,
        remaining: total,
        _pool: Some(pool),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
