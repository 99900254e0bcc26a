use crate::common::pool::ValuePool;
use crate::common::Timestamp;
use crate::config::MergeConfig;
use crate::error::TsdbError;
use crate::iterators::{
    Batch, BatchStream, MergeStrategy, NonOverlappingIterator, SeriesCursor, SeriesIterator,
    ValueKind,
};
use crate::series::chunks::{partition_chunks, GenericChunk};
use min_max_heap::MinMaxHeap;
use std::cmp::Ordering;

static EMPTY_BATCH: Batch = Batch::new(ValueKind::Float);

/// A child iterator together with its position in partition order.
///
/// Entries order by the child's next timestamp, then by `order`. The stream
/// uses `order` to pick the winner of a duplicate timestamp.
struct HeapEntry {
    order: usize,
    cursor: SeriesCursor,
}

impl HeapEntry {
    fn key(&self) -> (Timestamp, usize) {
        (self.cursor.at_time(), self.order)
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Merges several sorted series iterators into one time-ordered,
/// deduplicated series iterator.
///
/// Children with buffered data live in a min-heap keyed by their next
/// timestamp; exhausted children are parked in `idle` so a later `seek` can
/// revive them. The output window is held by the merge strategy `S`.
pub struct MergeIterator<S: MergeStrategy = BatchStream> {
    idle: Vec<HeapEntry>,
    heap: MinMaxHeap<HeapEntry>,
    stream: S,
    config: MergeConfig,
    primed: bool,
    err: Option<TsdbError>,
}

impl<S: MergeStrategy> MergeIterator<S> {
    /// Merge the chunks of a single series.
    pub fn new(chunks: Vec<GenericChunk>, config: &MergeConfig) -> Self {
        let mut iter = Self::with_config(config);
        iter.load_chunks(chunks, None);
        iter
    }

    /// Merge already sorted series iterators, e.g. one merge per replica.
    /// Earlier children win timestamp ties.
    pub fn from_cursors(children: Vec<SeriesCursor>, config: &MergeConfig) -> Self {
        let mut iter = Self::with_config(config);
        iter.idle.extend(
            children
                .into_iter()
                .enumerate()
                .map(|(order, cursor)| HeapEntry { order, cursor }),
        );
        iter
    }

    fn with_config(config: &MergeConfig) -> Self {
        Self {
            idle: Vec::new(),
            heap: MinMaxHeap::new(),
            stream: S::default(),
            config: *config,
            primed: false,
            err: None,
        }
    }

    /// Reuse this iterator for another set of chunks. Buffers keep their
    /// capacity; every pooled value still held goes back to `pool`.
    pub fn reset(&mut self, chunks: Vec<GenericChunk>, pool: &mut ValuePool) {
        self.release(pool);
        self.err = None;
        self.load_chunks(chunks, Some(pool));
    }

    fn load_chunks(&mut self, chunks: Vec<GenericChunk>, mut pool: Option<&mut ValuePool>) {
        let num_chunks = chunks.len();
        let partitions = partition_chunks(chunks);
        log::debug!(
            "merge iterator: {num_chunks} chunks in {} partitions",
            partitions.len()
        );

        self.idle.sort_unstable_by_key(|entry| entry.order);
        let num_partitions = partitions.len();
        for (order, partition) in partitions.into_iter().enumerate() {
            match (self.idle.get_mut(order), pool.as_deref_mut()) {
                (
                    Some(HeapEntry {
                        cursor: SeriesCursor::Chunks(iter),
                        ..
                    }),
                    Some(pool),
                ) => iter.reset(partition, pool),
                (Some(entry), _) => {
                    entry.cursor = NonOverlappingIterator::new(partition).into();
                }
                (None, _) => self.idle.push(HeapEntry {
                    order,
                    cursor: NonOverlappingIterator::new(partition).into(),
                }),
            }
        }
        self.idle.truncate(num_partitions);
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Number of children still holding unread samples.
    pub fn active_children(&self) -> usize {
        self.heap.len()
    }

    pub fn buffered_samples(&self) -> usize {
        self.stream.buffered_samples()
    }

    fn record_err(&mut self, err: &TsdbError) {
        if self.err.is_none() {
            log::warn!("merge iterator halted by child error: {err}");
            self.err = Some(err.clone());
        }
    }

    /// Load the first sample of every child.
    fn prime(&mut self, pool: &mut ValuePool) {
        self.primed = true;
        let mut i = 0;
        while i < self.idle.len() {
            if self.idle[i].cursor.next(1, pool).is_some() {
                let entry = self.idle.swap_remove(i);
                self.heap.push(entry);
                continue;
            }
            if let Some(err) = self.idle[i].cursor.err() {
                let err = err.clone();
                self.record_err(&err);
            }
            i += 1;
        }
    }

    fn park_heap(&mut self) {
        self.idle.extend(self.heap.drain());
    }

    /// Merge child batches into the window until its first batch is closed:
    /// no child has a pending sample at or before that batch's last timestamp.
    fn build_next_batch(&mut self, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        loop {
            let window_end = self.stream.current().and_then(Batch::last_timestamp);
            match self.heap.peek_min() {
                Some(top) if window_end.is_none_or(|end| top.cursor.at_time() <= end) => {}
                _ => break,
            }
            let Some(mut entry) = self.heap.pop_min() else {
                break;
            };

            self.stream.merge(entry.cursor.batch_mut(), entry.order, size, pool);

            if entry.cursor.next(size, pool).is_some() {
                self.heap.push(entry);
                continue;
            }
            let err = entry.cursor.err().cloned();
            self.idle.push(entry);
            if let Some(err) = err {
                self.record_err(&err);
                return None;
            }
        }

        self.stream.current().map(Batch::kind)
    }
}

impl<S: MergeStrategy> SeriesIterator for MergeIterator<S> {
    fn seek(&mut self, t: Timestamp, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        if self.err.is_some() {
            return None;
        }
        let size = self.config.clamp_size(size);
        self.primed = true;

        // only the first batch is closed: every child is already past its
        // last timestamp, so moving the read index is enough
        match self.stream.current_mut() {
            Some(batch) if batch.contains_time(t) => batch.seek_index(t),
            _ => self.stream.clear(pool),
        }

        if self.stream.is_empty() {
            self.park_heap();
            let mut i = 0;
            while i < self.idle.len() {
                if self.idle[i].cursor.seek(t, size, pool).is_some() {
                    let entry = self.idle.swap_remove(i);
                    self.heap.push(entry);
                    continue;
                }
                if let Some(err) = self.idle[i].cursor.err() {
                    let err = err.clone();
                    self.record_err(&err);
                    return None;
                }
                i += 1;
            }
        }

        self.build_next_batch(size, pool)
    }

    fn next(&mut self, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        if self.err.is_some() {
            return None;
        }
        let size = self.config.clamp_size(size);
        if !self.primed {
            self.prime(pool);
            if self.err.is_some() {
                return None;
            }
        } else {
            self.stream.remove_first(pool);
        }
        self.build_next_batch(size, pool)
    }

    fn at_time(&self) -> Timestamp {
        match self.stream.current() {
            Some(batch) if batch.index() < batch.len() => batch.at_time(),
            _ => Timestamp::MAX,
        }
    }

    fn batch(&self) -> &Batch {
        self.stream.current().unwrap_or(&EMPTY_BATCH)
    }

    fn batch_mut(&mut self) -> &mut Batch {
        match self.stream.current_mut() {
            Some(batch) => batch,
            None => panic!("batch_mut called on a merge iterator with nothing buffered"),
        }
    }

    fn err(&self) -> Option<&TsdbError> {
        self.err.as_ref()
    }

    fn release(&mut self, pool: &mut ValuePool) {
        self.stream.clear(pool);
        self.park_heap();
        for entry in self.idle.iter_mut() {
            entry.cursor.release(pool);
        }
        self.primed = false;
    }
}
