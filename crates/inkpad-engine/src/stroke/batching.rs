//! Block batching of pending samples onto a fixed-capacity pool.
//!
//! GPU-free: the compositor drives this through [`BlockSink`], so block plans
//! are checked in tests with a recording sink.

use super::StrokeSample;

/// Usable dab slots per block. One slot is reserved when every final block
/// also carries the canvas resolve.
#[inline]
pub fn usable_capacity(pool_size: usize, resolving: bool) -> usize {
    pool_size.saturating_sub(usize::from(resolving))
}

/// Destination of blocks: a pool of reusable slots plus a submit/wait step.
pub trait BlockSink {
    type Error;

    /// Dab slots available per block.
    fn capacity(&self) -> usize;

    /// Whether the final block of a drain must carry the resolve batch.
    fn resolving(&self) -> bool;

    /// Writes one sample's parameters into slot `slot`.
    fn write_slot(&mut self, slot: usize, sample: &StrokeSample);

    /// Submits slots `0..count` as one block (plus the resolve batch when
    /// `with_resolve`) under the queue lock and blocks until it completes.
    fn submit_block(&mut self, count: usize, with_resolve: bool) -> Result<(), Self::Error>;
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrainStats {
    pub blocks: usize,
    pub draws: usize,
}

/// Number of blocks `ceil(samples / capacity)`.
#[inline]
pub fn block_count(samples: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    samples.div_ceil(capacity)
}

/// Applies `samples` in order, `sink.capacity()` per block.
///
/// Slots are rewritten only after the previous block's submit returned, i.e.
/// after its completion wait. An empty slice submits nothing.
pub fn drain_samples<S>(sink: &mut S, samples: &[StrokeSample]) -> Result<DrainStats, S::Error>
where
    S: BlockSink,
{
    let capacity = sink.capacity();
    if samples.is_empty() || capacity == 0 {
        if capacity == 0 && !samples.is_empty() {
            log::warn!("dropping {} samples: pool has no usable slots", samples.len());
        }
        return Ok(DrainStats::default());
    }

    let blocks = block_count(samples.len(), capacity);
    let resolving = sink.resolving();
    let mut stats = DrainStats::default();

    for (index, block) in samples.chunks(capacity).enumerate() {
        for (slot, sample) in block.iter().enumerate() {
            sink.write_slot(slot, sample);
        }

        let last = index + 1 == blocks;
        sink.submit_block(block.len(), resolving && last)?;

        stats.blocks += 1;
        stats.draws += block.len();
    }

    log::debug!("drained {} samples in {} blocks", stats.draws, stats.blocks);
    Ok(stats)
}
