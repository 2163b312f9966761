//! Process-wide bounded worker pool.
//!
//! Two kinds of work run here:
//!
//! - leaf tasks ([`WorkerPool::submit`]), i.e. brightness lookups. Each one
//!   holds a leaf permit for its whole run and the submitter waits for a
//!   free permit, so nothing queues without bound.
//! - fork-join fan-out ([`WorkerPool::fork_join`]), i.e. recursive
//!   sub-searches. A child is spawned only while it holds one of the
//!   `capacity` process-wide fan-out slots. When every slot is taken the
//!   caller runs the child itself, so at most `capacity` fan-out tasks are
//!   ever spawned no matter how wide or deep the recursion gets.
//!
//! Nothing ever waits for a fan-out slot, and leaves never wait on the
//! pool, so a deep recursion tree cannot starve itself.

use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::task::{JoinHandle, JoinSet};

use crate::error::PoolError;

#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    permits: Arc<Semaphore>,
    fanout: Arc<Semaphore>,
    capacity: u32,
    closed: AtomicBool,
}

impl WorkerPool {
    /// A pool running at most `capacity` leaf tasks and `capacity` spawned
    /// fan-out tasks at once (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = u32::try_from(capacity.max(1)).unwrap_or(u32::MAX);
        Self {
            inner: Arc::new(PoolInner {
                permits: Arc::new(Semaphore::new(capacity as usize)),
                fanout: Arc::new(Semaphore::new(capacity as usize)),
                capacity,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Capacity = available parallelism × `multiplier`.
    #[must_use]
    pub fn with_parallelism_multiplier(multiplier: usize) -> Self {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(cores.saturating_mul(multiplier.max(1)))
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity as usize
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Spawned fan-out tasks currently holding a slot.
    #[must_use]
    pub fn fanout_in_flight(&self) -> usize {
        self.capacity()
            .saturating_sub(self.inner.fanout.available_permits())
    }

    /// Waits for a free worker, then spawns `task` on it.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] once [`WorkerPool::shutdown`] has begun.
    pub async fn submit<F, T>(&self, task: F) -> Result<JoinHandle<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return Err(PoolError::ShutDown);
        }
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::ShutDown)?;
        Ok(tokio::spawn(async move {
            let output = task.await;
            drop(permit);
            output
        }))
    }

    /// Runs every task and waits for all of them.
    ///
    /// Children that get a fan-out slot run on their own tokio task; the
    /// rest run in the caller, one after another. Results come back in
    /// completion order. A task that panics is logged and replaced by
    /// `T::default()`. A closed pool runs nothing.
    pub async fn fork_join<F, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Default + Send + 'static,
    {
        if self.is_closed() {
            tracing::warn!("worker pool is shut down; skipping fan-out");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(tasks.len());
        let mut spawned = JoinSet::new();
        for task in tasks {
            match Arc::clone(&self.inner.fanout).try_acquire_owned() {
                Ok(slot) => {
                    spawned.spawn(async move {
                        let output = task.await;
                        drop(slot);
                        output
                    });
                }
                Err(TryAcquireError::NoPermits) => results.push(run_inline(task).await),
                Err(TryAcquireError::Closed) => {
                    tracing::warn!("worker pool closed mid fan-out; dropping remaining children");
                    break;
                }
            }
        }

        while let Some(joined) = spawned.join_next().await {
            results.push(joined.unwrap_or_else(|e| {
                tracing::error!(error = %e, "child task failed; treating as empty");
                T::default()
            }));
        }
        results
    }

    /// Rejects new work, waits for in-flight leaf tasks, then closes.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!(capacity = self.inner.capacity, "draining worker pool");
        if let Ok(all) = self.inner.permits.acquire_many(self.inner.capacity).await {
            all.forget();
        }
        self.inner.permits.close();
        self.inner.fanout.close();
        tracing::info!("worker pool closed");
    }
}

async fn run_inline<F, T>(task: F) -> T
where
    F: Future<Output = T>,
    T: Default,
{
    AssertUnwindSafe(task).catch_unwind().await.unwrap_or_else(|_| {
        tracing::error!("child task panicked; treating as empty");
        T::default()
    })
}
