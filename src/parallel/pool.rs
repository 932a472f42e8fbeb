//! Rayon thread pool configuration for Monte Carlo batches.
//!
//! [`WorkerPool::install`] runs a closure on a pool with a fixed thread count, or on
//! Rayon's global pool (all cores) when the count is 0.

use rayon::ThreadPoolBuilder;
use tracing::warn;

/// How many worker threads parallel simulations use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use all available CPU cores (Rayon default).
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run `f` with this worker count. A pool that fails to build falls back to the
    /// global pool; results do not depend on the thread count.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                warn!(workers = self.workers, "worker pool unavailable ({err}), using global pool");
                f()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rayon::prelude::*;

    use super::*;

    #[test]
    fn fixed_pool_runs_with_requested_threads() {
        let threads = WorkerPool::with_workers(2).install(rayon::current_num_threads);
        assert_eq!(threads, 2);
    }

    #[test]
    fn default_pool_uses_global_rayon() {
        let pool = WorkerPool::default_workers();
        assert_eq!(pool.workers, 0);
        let sum: u64 = pool.install(|| (1..=100u64).into_par_iter().sum());
        assert_eq!(sum, 5050);
    }
}
