use crate::common::binary_search::find_first_ge_index_by_key;
use crate::common::pool::ValuePool;
use crate::common::Timestamp;
use crate::error::TsdbError;
use crate::iterators::{Batch, ChunkIterator, SeriesIterator, ValueKind};
use crate::series::chunks::GenericChunk;

/// Iterates a partition: chunks that are sorted by time and do not overlap.
///
/// Concatenating the chunks' samples is already sorted, so this only has to
/// step from one chunk to the next when the current one runs out.
pub struct NonOverlappingIterator {
    chunks: Vec<GenericChunk>,
    curr: usize,
    iter: ChunkIterator,
}

impl NonOverlappingIterator {
    pub fn new(chunks: Vec<GenericChunk>) -> Self {
        debug_assert!(
            chunks.windows(2).all(|pair| pair[0].max_time < pair[1].min_time),
            "partition chunks overlap"
        );
        let iter = chunks.first().map(ChunkIterator::new).unwrap_or_default();
        Self {
            chunks,
            curr: 0,
            iter,
        }
    }

    /// Reuse the iterator for another partition.
    pub fn reset(&mut self, chunks: Vec<GenericChunk>, pool: &mut ValuePool) {
        self.iter.release(pool);
        self.chunks = chunks;
        self.curr = 0;
        if let Some(chunk) = self.chunks.first() {
            self.iter.set_chunk(chunk, pool);
        } else {
            self.iter = ChunkIterator::default();
        }
    }

    pub fn chunks(&self) -> &[GenericChunk] {
        &self.chunks
    }

    fn next_chunk(&mut self, pool: &mut ValuePool) -> bool {
        self.curr = (self.curr + 1).min(self.chunks.len());
        match self.chunks.get(self.curr) {
            Some(chunk) => {
                self.iter.set_chunk(chunk, pool);
                true
            }
            None => {
                self.iter.finish(pool);
                false
            }
        }
    }
}

impl SeriesIterator for NonOverlappingIterator {
    fn seek(&mut self, t: Timestamp, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        // max times ascend within a partition, so this is the first chunk that
        // can hold a sample at or after t
        let idx = find_first_ge_index_by_key(&self.chunks, &t, |c| c.max_time);
        if idx >= self.chunks.len() {
            self.iter.finish(pool);
            self.curr = self.chunks.len();
            return None;
        }
        if idx != self.curr {
            self.curr = idx;
            self.iter.set_chunk(&self.chunks[idx], pool);
        }

        loop {
            if let Some(kind) = self.iter.seek(t, size, pool) {
                return Some(kind);
            }
            if self.iter.err().is_some() || !self.next_chunk(pool) {
                return None;
            }
        }
    }

    fn next(&mut self, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        loop {
            if let Some(kind) = self.iter.next(size, pool) {
                return Some(kind);
            }
            if self.iter.err().is_some() || !self.next_chunk(pool) {
                return None;
            }
        }
    }

    fn at_time(&self) -> Timestamp {
        let batch = self.iter.batch();
        if batch.index() < batch.len() {
            batch.at_time()
        } else {
            Timestamp::MAX
        }
    }

    fn batch(&self) -> &Batch {
        self.iter.batch()
    }

    fn batch_mut(&mut self) -> &mut Batch {
        self.iter.batch_mut()
    }

    fn err(&self) -> Option<&TsdbError> {
        self.iter.err()
    }

    fn release(&mut self, pool: &mut ValuePool) {
        self.iter.release(pool);
    }
}
