//! Fixed-size worker pool for the partitioned construction phases.
//!
//! Work lists are cut into contiguous chunks of `ceil(len / workers)` items
//! and each chunk is handled by exactly one worker. Results are returned in
//! input order, so the outcome never depends on scheduling.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use ucnet_core::{UcError, UcResult};

pub struct WorkerPool {
    workers: usize,
    pool: Option<ThreadPool>,
}

impl WorkerPool {
    /// `0` uses one worker per available thread, `1` runs everything inline.
    pub fn new(workers: usize) -> UcResult<Self> {
        let workers = if workers == 0 {
            rayon::current_num_threads().max(1)
        } else {
            workers
        };
        if workers == 1 {
            return Ok(Self::serial());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ucnet-worker-{i}"))
            .build()
            .map_err(|e| UcError::Runtime(format!("cannot start {workers} workers: {e}")))?;
        Ok(Self {
            workers,
            pool: Some(pool),
        })
    }

    pub fn serial() -> Self {
        Self {
            workers: 1,
            pool: None,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Items handed to each worker for a list of `len` items.
    pub fn chunk_size(&self, len: usize) -> usize {
        len.div_ceil(self.workers).max(1)
    }

    /// Apply `f` to every chunk and concatenate the results in order.
    /// The first error, in chunk order, wins.
    pub fn try_map_chunks<T, R, F>(&self, items: &[T], f: F) -> UcResult<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&[T]) -> UcResult<Vec<R>> + Sync,
    {
        let size = self.chunk_size(items.len());
        let parts: Vec<Vec<R>> = match &self.pool {
            None => items.chunks(size).map(&f).collect::<UcResult<_>>()?,
            Some(pool) => pool.install(|| {
                items
                    .par_chunks(size)
                    .map(&f)
                    .collect::<UcResult<Vec<_>>>()
            })?,
        };
        Ok(parts.into_iter().flatten().collect())
    }
}
