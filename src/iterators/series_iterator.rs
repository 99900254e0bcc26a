use crate::common::pool::ValuePool;
use crate::common::Timestamp;
use crate::error::TsdbError;
use crate::iterators::{Batch, MergeIterator, NonOverlappingIterator, ValueKind};
use enum_dispatch::enum_dispatch;

/// A batch-at-a-time cursor over the samples of one series.
///
/// This is both what the merge consumes and what it produces, so merges can be
/// stacked. Histogram payloads of the current batch live in the `pool` passed
/// to `seek`/`next`; every iterator participating in one merge shares it.
#[enum_dispatch]
pub trait SeriesIterator {
    /// Position on the first sample at or after `t`, buffering at most `size`
    /// samples. Returns `None` when no such sample exists or an error occurred.
    fn seek(&mut self, t: Timestamp, size: usize, pool: &mut ValuePool) -> Option<ValueKind>;

    /// Drop the current batch and load the next one.
    fn next(&mut self, size: usize, pool: &mut ValuePool) -> Option<ValueKind>;

    /// Timestamp at the read position of the current batch, or
    /// `Timestamp::MAX` when nothing is buffered.
    fn at_time(&self) -> Timestamp;

    /// The current batch. Valid until the next `seek`/`next`.
    fn batch(&self) -> &Batch;

    /// Mutable access to the current batch, used by a parent merge to move the
    /// batch's values into its own window.
    fn batch_mut(&mut self) -> &mut Batch;

    /// The first error encountered, if any.
    fn err(&self) -> Option<&TsdbError>;

    /// Hand every buffered pooled value back to `pool`.
    fn release(&mut self, pool: &mut ValuePool);
}

impl<T: SeriesIterator + ?Sized> SeriesIterator for Box<T> {
    fn seek(&mut self, t: Timestamp, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        (**self).seek(t, size, pool)
    }

    fn next(&mut self, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        (**self).next(size, pool)
    }

    fn at_time(&self) -> Timestamp {
        (**self).at_time()
    }

    fn batch(&self) -> &Batch {
        (**self).batch()
    }

    fn batch_mut(&mut self) -> &mut Batch {
        (**self).batch_mut()
    }

    fn err(&self) -> Option<&TsdbError> {
        (**self).err()
    }

    fn release(&mut self, pool: &mut ValuePool) {
        (**self).release(pool)
    }
}

/// The inputs a merge can consume: a partition of raw chunks or another merge.
#[enum_dispatch(SeriesIterator)]
pub enum SeriesCursor {
    Chunks(NonOverlappingIterator),
    Merge(Box<MergeIterator>),
}

impl From<MergeIterator> for SeriesCursor {
    fn from(value: MergeIterator) -> Self {
        SeriesCursor::Merge(Box::new(value))
    }
}
