//! Batch boundaries for parallel Monte Carlo runs. Each batch owns a contiguous
//! slice of the iteration range and its own fleet graph.

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use broadside::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Ranges of at most `batch_size` items. The batch count depends only on `total`,
/// so a seeded run replays identically on any number of workers.
pub fn fixed_size_batches(total: usize, batch_size: usize) -> Vec<(usize, usize)> {
    if batch_size == 0 {
        return Vec::new();
    }
    batch_ranges(total, total.div_ceil(batch_size))
}
