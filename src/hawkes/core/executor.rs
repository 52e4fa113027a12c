//! Per-dimension task dispatch over a fixed-size rayon pool.
//!
//! Every parallel pass in the crate (kernel recursion, sufficient statistics,
//! loss, gradient) is "one independent task per dimension". [`Executor`]
//! runs those tasks either on a dedicated [`rayon::ThreadPool`] or, when the
//! configured size is one, sequentially on the calling thread without ever
//! touching rayon's global pool.
//!
//! Results are gathered in task order, so reductions performed by callers
//! over the returned `Vec` are deterministic regardless of scheduling.
use crate::hawkes::errors::{HawkesError, HawkesResult};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use std::sync::Arc;

/// Worker pool handle; `pool == None` means sequential execution.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: Option<Arc<ThreadPool>>,
    n_threads: usize,
}

impl Executor {
    /// Build an executor with `n_threads` workers.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidThreadCount`] if `n_threads == 0`.
    /// - [`HawkesError::ThreadPool`] if rayon cannot spawn the pool.
    pub fn new(n_threads: usize) -> HawkesResult<Self> {
        match n_threads {
            0 => Err(HawkesError::InvalidThreadCount { n_threads }),
            1 => Ok(Executor { pool: None, n_threads }),
            _ => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n_threads)
                    .thread_name(|idx| format!("hawkes-worker-{idx}"))
                    .build()
                    .map_err(|e| HawkesError::ThreadPool { reason: e.to_string() })?;
                Ok(Executor { pool: Some(Arc::new(pool)), n_threads })
            }
        }
    }

    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Evaluate `task(i)` for `i in 0..n` and collect the results in index order.
    ///
    /// The first error (in whichever task raises it) aborts the pass; no
    /// partial results are returned.
    pub fn try_map<R, F>(&self, n: usize, task: F) -> HawkesResult<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> HawkesResult<R> + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| (0..n).into_par_iter().map(task).collect()),
            None => (0..n).map(task).collect(),
        }
    }

    /// Consume `items`, running `task` on each; items usually carry disjoint
    /// `&mut` views of a shared buffer.
    pub fn try_for_each<T, F>(&self, items: Vec<T>, task: F) -> HawkesResult<()>
    where
        T: Send,
        F: Fn(T) -> HawkesResult<()> + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().try_for_each(task)),
            None => items.into_iter().try_for_each(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // One thread is sequential, more threads build a pool, zero is rejected.
    fn new_selects_pool_by_thread_count() {
        assert!(!Executor::new(1).unwrap().is_parallel());
        let exec = Executor::new(3).unwrap();
        assert!(exec.is_parallel());
        assert_eq!(exec.n_threads(), 3);
        assert_eq!(
            Executor::new(0).unwrap_err(),
            HawkesError::InvalidThreadCount { n_threads: 0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // `try_map` keeps index order on both execution paths.
    fn try_map_preserves_order() {
        for n_threads in [1, 4] {
            let exec = Executor::new(n_threads).unwrap();
            let out = exec.try_map(16, |i| Ok(i * i)).unwrap();
            assert_eq!(out, (0..16).map(|i| i * i).collect::<Vec<_>>());
        }
    }

    #[test]
    // Purpose
    // -------
    // A failing task fails the whole pass.
    fn try_map_propagates_errors() {
        let exec = Executor::new(2).unwrap();
        let res = exec.try_map(8, |i| if i == 5 { Err(HawkesError::NoEvents) } else { Ok(i) });
        assert_eq!(res.unwrap_err(), HawkesError::NoEvents);
    }

    #[test]
    // Purpose
    // -------
    // Disjoint mutable chunks are written by independent tasks.
    fn try_for_each_writes_disjoint_chunks() {
        let exec = Executor::new(2).unwrap();
        let mut buf = vec![0.0_f64; 12];
        let items: Vec<(usize, &mut [f64])> = buf.chunks_mut(3).enumerate().collect();
        exec.try_for_each(items, |(i, chunk)| {
            chunk.fill(i as f64);
            Ok(())
        })
        .unwrap();
        assert_eq!(buf[0..3], [0.0; 3]);
        assert_eq!(buf[9..12], [3.0; 3]);
    }
}
