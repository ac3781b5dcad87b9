//! Background runtime for option fetches.
//!
//! Widgets react to synchronous events (a dropdown opens, a topic is
//! invalidated) by starting fetches they do not await. Those fetches run on
//! an [`AsyncRuntime`], a multi-threaded Tokio runtime that counts the tasks
//! still pending.
//!
//! This module requires the `tokio` feature (enabled by default).
//!
//! ```no_run
//! use carbure_core::async_runtime::AsyncRuntime;
//!
//! # async fn fetch_depots() -> Vec<String> { vec![] }
//! let runtime = AsyncRuntime::global();
//! let task = runtime.spawn(fetch_depots());
//! let depots = runtime.block_on(task).unwrap_or_default();
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::logging::targets;

static GLOBAL_RUNTIME: OnceLock<AsyncRuntime> = OnceLock::new();

/// Settings of an [`AsyncRuntime`].
#[derive(Debug, Clone)]
pub struct AsyncRuntimeConfig {
    /// Worker thread count; Tokio picks one per core when `None`.
    pub worker_threads: Option<usize>,
    /// Prefix of the worker thread names.
    pub thread_name: String,
}

impl Default for AsyncRuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "carbure-fetch".to_string(),
        }
    }
}

impl AsyncRuntimeConfig {
    /// Use `count` worker threads (at least one).
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count.max(1));
        self
    }

    /// Name the worker threads `name`.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Errors creating an [`AsyncRuntime`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsyncRuntimeError {
    /// The global runtime was already set up.
    #[error("Async runtime already initialized")]
    AlreadyInitialized,
    /// Tokio could not build the runtime.
    #[error("Failed to create async runtime: {0}")]
    CreationFailed(String),
}

/// Tokio runtime running detached fetches.
pub struct AsyncRuntime {
    runtime: Runtime,
    pending: Arc<AtomicUsize>,
}

impl AsyncRuntime {
    /// The process-wide runtime, created with default settings on first use.
    ///
    /// # Panics
    ///
    /// Panics if the runtime threads cannot be spawned.
    pub fn global() -> &'static AsyncRuntime {
        GLOBAL_RUNTIME.get_or_init(|| {
            AsyncRuntime::new(AsyncRuntimeConfig::default())
                .expect("Failed to create global async runtime")
        })
    }

    /// Set up the process-wide runtime with `config`.
    ///
    /// Fails if [`global`](Self::global) or this function already ran.
    pub fn init_global(config: AsyncRuntimeConfig) -> Result<&'static AsyncRuntime, AsyncRuntimeError> {
        let runtime = AsyncRuntime::new(config)?;
        GLOBAL_RUNTIME.set(runtime).map_err(|_| {
            crate::carbure_warn!("global async runtime already initialized");
            AsyncRuntimeError::AlreadyInitialized
        })?;
        GLOBAL_RUNTIME.get().ok_or(AsyncRuntimeError::AlreadyInitialized)
    }

    /// Build a runtime from `config`.
    pub fn new(config: AsyncRuntimeConfig) -> Result<Self, AsyncRuntimeError> {
        tracing::debug!(target: targets::RUNTIME, workers = ?config.worker_threads, "creating async runtime");

        let mut builder = Builder::new_multi_thread();
        builder.thread_name(&config.thread_name).enable_time();
        if let Some(workers) = config.worker_threads {
            builder.worker_threads(workers);
        }

        let runtime = builder
            .build()
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;

        Ok(Self {
            runtime,
            pending: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of spawned tasks not finished yet.
    pub fn pending_tasks(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Run `future` in the background.
    ///
    /// The returned handle may be awaited or dropped; dropping it does not
    /// cancel the task.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let pending = self.pending.clone();
        let count = pending.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(target: targets::RUNTIME, pending = count, "spawning task");

        self.runtime.spawn(async move {
            let output = future.await;
            pending.fetch_sub(1, Ordering::AcqRel);
            output
        })
    }

    /// Run a spawned task's handle, or any future, to completion.
    ///
    /// Must not be called from inside the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_spawn_and_join() {
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default().with_worker_threads(2)).unwrap();
        let task = runtime.spawn(async { 42 });
        assert_eq!(runtime.block_on(task).unwrap(), 42);
    }

    #[test]
    fn test_pending_tasks_drain() {
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default()).unwrap();
        let tasks: Vec<_> = (0..5)
            .map(|i| {
                runtime.spawn(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    i
                })
            })
            .collect();

        let total: i32 = runtime.block_on(async {
            let mut total = 0;
            for task in tasks {
                total += task.await.unwrap();
            }
            total
        });
        assert_eq!(total, 10);

        for _ in 0..100 {
            if runtime.pending_tasks() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(runtime.pending_tasks(), 0);
    }

    #[test]
    fn test_worker_threads_at_least_one() {
        let config = AsyncRuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, Some(1));
    }
}
