use crate::common::pool::ValuePool;
use crate::common::{Sample, Timestamp};
use crate::config::MergeConfig;
use crate::error::TsdbError;
use crate::iterators::{
    BatchStream, BatchView, MergeIterator, MergeStrategy, SeriesCursor, SeriesIterator,
    ValueKind,
};
use crate::series::chunks::GenericChunk;

/// The merge surface handed to query evaluation.
///
/// Owns a [`MergeIterator`] together with the [`ValuePool`] its histogram
/// payloads are borrowed from, so callers never deal with the pool directly.
/// One cursor serves one series at a time; `reset` points it at another chunk
/// set while keeping its buffers and pool.
pub struct MergeCursor<S: MergeStrategy = BatchStream> {
    iter: MergeIterator<S>,
    pool: ValuePool,
}

impl<S: MergeStrategy> MergeCursor<S> {
    pub fn new(chunks: Vec<GenericChunk>, config: &MergeConfig) -> Self {
        Self {
            iter: MergeIterator::new(chunks, config),
            pool: ValuePool::new(),
        }
    }

    /// Merge per-group merges, e.g. one group of chunks per replica or per
    /// storage tier. Earlier groups win timestamp ties.
    pub fn nested(groups: Vec<Vec<GenericChunk>>, config: &MergeConfig) -> Self {
        let children = groups
            .into_iter()
            .map(|chunks| SeriesCursor::from(MergeIterator::<BatchStream>::new(chunks, config)))
            .collect();
        Self::from_cursors(children, config)
    }

    pub fn from_cursors(children: Vec<SeriesCursor>, config: &MergeConfig) -> Self {
        Self {
            iter: MergeIterator::from_cursors(children, config),
            pool: ValuePool::new(),
        }
    }

    pub fn seek(&mut self, t: Timestamp, size: usize) -> Option<ValueKind> {
        self.iter.seek(t, size, &mut self.pool)
    }

    pub fn next(&mut self, size: usize) -> Option<ValueKind> {
        self.iter.next(size, &mut self.pool)
    }

    /// Timestamp at the read position; `Timestamp::MAX` when nothing is
    /// buffered.
    pub fn at_time(&self) -> Timestamp {
        self.iter.at_time()
    }

    /// The current batch, valid until the next `seek` or `next`.
    pub fn batch(&self) -> Option<BatchView<'_>> {
        let batch = self.iter.batch();
        if batch.is_empty() {
            None
        } else {
            Some(batch.view(&self.pool))
        }
    }

    pub fn err(&self) -> Option<&TsdbError> {
        self.iter.err()
    }

    pub fn reset(&mut self, chunks: Vec<GenericChunk>) {
        self.iter.reset(chunks, &mut self.pool);
    }

    pub fn pool(&self) -> &ValuePool {
        &self.pool
    }

    pub fn buffered_samples(&self) -> usize {
        self.iter.buffered_samples()
    }

    /// Drain the cursor sample by sample from its read position, copying
    /// payloads out of the pool.
    pub fn samples(self, size: usize) -> MergedSamples<S> {
        let pos = self.batch().map(|view| view.index());
        MergedSamples {
            cursor: self,
            size,
            pos,
        }
    }
}

/// Owned samples of a [`MergeCursor`], in timestamp order. Check
/// [`MergedSamples::err`] once the iterator is exhausted.
pub struct MergedSamples<S: MergeStrategy = BatchStream> {
    cursor: MergeCursor<S>,
    size: usize,
    pos: Option<usize>,
}

impl<S: MergeStrategy> MergedSamples<S> {
    pub fn err(&self) -> Option<&TsdbError> {
        self.cursor.err()
    }

    pub fn into_cursor(self) -> MergeCursor<S> {
        self.cursor
    }
}

impl<S: MergeStrategy> Iterator for MergedSamples<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let (Some(pos), Some(view)) = (self.pos, self.cursor.batch()) {
                if pos < view.len() {
                    self.pos = Some(pos + 1);
                    return Some(view.sample(pos));
                }
            }
            self.cursor.next(self.size)?;
            self.pos = self.cursor.batch().map(|view| view.index());
        }
    }
}
