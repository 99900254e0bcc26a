use crate::common::pool::ValuePool;
use crate::common::Timestamp;
use crate::iterators::{Batch, BatchValue};
use std::collections::VecDeque;

/// How a merge iterator accumulates incoming batches into its output window.
///
/// The strategy is picked through the merge iterator's type parameter when it
/// is built and cannot change afterwards.
pub trait MergeStrategy: Default {
    /// Merge the entries of `batch` from its read position onwards into the
    /// buffered stream. `order` is the partition order of the child that
    /// produced `batch`; on a timestamp tie the lower order wins. Every value
    /// of `batch` is either moved into the stream or returned to `pool`;
    /// `batch` is left empty. Output batches hold at most `size` samples.
    fn merge(&mut self, batch: &mut Batch, order: usize, size: usize, pool: &mut ValuePool);

    /// The batch the consumer is reading.
    fn current(&self) -> Option<&Batch>;

    fn current_mut(&mut self) -> Option<&mut Batch>;

    /// Retire the current batch, returning its pooled values.
    fn remove_first(&mut self, pool: &mut ValuePool);

    /// Retire every buffered batch.
    fn clear(&mut self, pool: &mut ValuePool);

    /// Number of buffered batches.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buffered samples across all batches.
    fn buffered_samples(&self) -> usize;
}

/// An output batch and the partition order each of its samples came from.
#[derive(Default)]
struct WindowBatch {
    batch: Batch,
    origins: Vec<usize>,
}

impl WindowBatch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            batch: Batch::with_capacity(capacity),
            origins: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, timestamp: Timestamp, value: BatchValue, origin: usize) {
        self.batch.push(timestamp, value);
        self.origins.push(origin);
    }

    fn release_consumed(&mut self, pool: &mut ValuePool) {
        let consumed = self.batch.index();
        self.batch.release_consumed(pool);
        self.origins.drain(..consumed);
    }

    fn entries(&self) -> impl Iterator<Item = (Timestamp, BatchValue, usize)> + '_ {
        self.batch
            .timestamps
            .iter()
            .zip(self.batch.values.iter())
            .zip(self.origins.iter())
            .map(|((&ts, &value), &origin)| (ts, value, origin))
    }
}

/// A sorted, deduplicated run of batches.
///
/// When two samples share a timestamp the one from the lower partition order
/// is kept and the other is released, whatever order they arrived in. A new
/// batch is started whenever the value kind changes or the current one is
/// full; retired batches are kept for reuse.
#[derive(Default)]
pub struct BatchStream {
    batches: VecDeque<WindowBatch>,
    merged: VecDeque<WindowBatch>,
    spare: Vec<WindowBatch>,
}

impl BatchStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter().map(|w| &w.batch)
    }

    fn last_timestamp(&self) -> Option<Timestamp> {
        self.batches.back().and_then(|w| w.batch.last_timestamp())
    }

    fn recycle(spare: &mut Vec<WindowBatch>, mut window: WindowBatch) {
        // values have been moved out or released by now
        window.batch.timestamps.clear();
        window.batch.values.clear();
        window.batch.index = 0;
        window.origins.clear();
        spare.push(window);
    }
}

fn append(
    out: &mut VecDeque<WindowBatch>,
    spare: &mut Vec<WindowBatch>,
    timestamp: Timestamp,
    value: BatchValue,
    origin: usize,
    size: usize,
) {
    let kind = value.kind();
    let start_new = match out.back() {
        Some(last) => last.batch.kind() != kind || last.batch.len() >= size,
        None => true,
    };
    if start_new {
        let mut window = spare
            .pop()
            .unwrap_or_else(|| WindowBatch::with_capacity(size));
        window.batch.reset(kind);
        out.push_back(window);
    }
    if let Some(last) = out.back_mut() {
        last.push(timestamp, value, origin);
    }
}

impl MergeStrategy for BatchStream {
    fn merge(&mut self, batch: &mut Batch, order: usize, size: usize, pool: &mut ValuePool) {
        batch.release_consumed(pool);
        if batch.is_empty() {
            return;
        }

        // entries the consumer already moved past are not part of the window
        if let Some(first) = self.batches.front_mut() {
            first.release_consumed(pool);
            if first.batch.is_empty() {
                if let Some(first) = self.batches.pop_front() {
                    Self::recycle(&mut self.spare, first);
                }
            }
        }

        let starts_after = match (self.last_timestamp(), batch.first_timestamp()) {
            (Some(last), Some(first)) => last < first,
            _ => true,
        };

        if starts_after {
            for (&ts, &value) in batch.timestamps.iter().zip(batch.values.iter()) {
                append(&mut self.batches, &mut self.spare, ts, value, order, size);
            }
        } else {
            {
            let mut left = self.batches.iter().flat_map(|w| w.entries()).peekable();
            let mut right = batch
                .timestamps
                .iter()
                .copied()
                .zip(batch.values.iter().copied())
                .map(|(ts, value)| (ts, value, order))
                .peekable();

            loop {
                let next = match (left.peek(), right.peek()) {
                    (Some(&(lt, ..)), Some(&(rt, ..))) if lt < rt => left.next(),
                    (Some(&(lt, ..)), Some(&(rt, ..))) if rt < lt => right.next(),
                    (Some(&(_, _, buffered)), Some(_)) => {
                        // same timestamp: the lower partition order wins
                        let (winner, loser) = if order < buffered {
                            (right.next(), left.next())
                        } else {
                            (left.next(), right.next())
                        };
                        if let Some((_, duplicate, _)) = loser {
                            duplicate.release(pool);
                        }
                        winner
                    }
                    (Some(_), None) => left.next(),
                    (None, Some(_)) => right.next(),
                    (None, None) => None,
                };
                let Some((ts, value, origin)) = next else {
                    break;
                };
                append(&mut self.merged, &mut self.spare, ts, value, origin, size);
            }
            }

            std::mem::swap(&mut self.batches, &mut self.merged);
            while let Some(old) = self.merged.pop_front() {
                Self::recycle(&mut self.spare, old);
            }
        }

        // every value has been moved into the stream or released
        batch.timestamps.clear();
        batch.values.clear();
        batch.index = 0;
    }

    fn current(&self) -> Option<&Batch> {
        self.batches.front().map(|w| &w.batch)
    }

    fn current_mut(&mut self) -> Option<&mut Batch> {
        self.batches.front_mut().map(|w| &mut w.batch)
    }

    fn remove_first(&mut self, pool: &mut ValuePool) {
        if let Some(mut first) = self.batches.pop_front() {
            first.batch.release(pool);
            Self::recycle(&mut self.spare, first);
        }
    }

    fn clear(&mut self, pool: &mut ValuePool) {
        while let Some(mut window) = self.batches.pop_front() {
            window.batch.release(pool);
            Self::recycle(&mut self.spare, window);
        }
    }

    fn len(&self) -> usize {
        self.batches.len()
    }

    fn buffered_samples(&self) -> usize {
        self.batches.iter().map(|w| w.batch.len()).sum()
    }
}
