pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, fixed_size_batches};
pub use pool::WorkerPool;
