use crate::error::{EraError, Result};
use log::debug;
use std::future::Future;

/// Spotify accepts at most 100 track ids per playlist add/remove request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Number of calls needed to send `len` items `batch_size` at a time.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size)
}

/// Applies `mutate` to consecutive chunks of at most `batch_size` items, in order.
///
/// Returns how many chunks were applied. The first failure stops the loop;
/// chunks sent before it stay applied.
pub async fn apply_batched<T, F, Fut>(
    items: &[T],
    batch_size: usize,
    mut mutate: F,
) -> Result<usize>
where
    T: Clone,
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if batch_size == 0 {
        return Err(EraError::Config("batch size must be at least 1".to_string()));
    }

    let batches = batch_count(items.len(), batch_size);
    for (index, chunk) in items.chunks(batch_size).enumerate() {
        debug!("Batch {}/{} ({} items)", index + 1, batches, chunk.len());
        mutate(chunk.to_vec())
            .await
            .map_err(|source| EraError::Batch {
                batch: index + 1,
                batches,
                source: Box::new(source),
            })?;
    }

    Ok(batches)
}
