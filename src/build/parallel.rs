// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded worker pool for batch derivation.
//!
//! Profiles within a batch don't depend on each other, so the batch is an
//! embarrassingly parallel `par_iter()`. The pool is owned by the caller and
//! sized once; nothing here spawns threads on its own. `run_batch` returns
//! only when every task of the batch has finished, which is the barrier the
//! orderer relies on.
//!
//! Results come back in input order regardless of which thread finished
//! first, so merging is deterministic. `try_run_batch` stops scheduling new
//! tasks after the first failure. Without the `parallel` feature the
//! same API runs everything on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::DeriveError;

pub struct WorkerPool {
    threads: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// A pool with `threads` workers; 0 means one per available CPU.
    #[cfg(feature = "parallel")]
    pub fn new(threads: usize) -> Result<Self, DeriveError> {
        let threads = resolve_threads(threads);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("rankc-derive-{}", i))
            .build()
            .map_err(|e| DeriveError::WorkerPool(e.to_string()))?;
        Ok(Self { threads, pool })
    }

    /// Sequential stand-in: the thread count is recorded but unused.
    #[cfg(not(feature = "parallel"))]
    pub fn new(threads: usize) -> Result<Self, DeriveError> {
        Ok(Self {
            threads: resolve_threads(threads),
        })
    }

    /// Single-threaded pool.
    pub fn sequential() -> Result<Self, DeriveError> {
        Self::new(1)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `task` over every item and wait for all of them. Output order
    /// matches input order.
    #[cfg(feature = "parallel")]
    pub fn run_batch<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.par_iter().map(|item| task(item)).collect())
    }

    #[cfg(not(feature = "parallel"))]
    pub fn run_batch<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        items.iter().map(task).collect()
    }

    /// Like [`run_batch`](Self::run_batch) for fallible tasks, but stops
    /// handing out work once a task fails. Tasks already running finish;
    /// their results are dropped.
    #[cfg(feature = "parallel")]
    pub fn try_run_batch<T, R, E, F>(&self, items: &[T], task: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        self.pool
            .install(|| items.par_iter().map(|item| task(item)).collect())
    }

    #[cfg(not(feature = "parallel"))]
    pub fn try_run_batch<T, R, E, F>(&self, items: &[T], task: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        items.iter().map(task).collect()
    }
}

fn resolve_threads(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}
