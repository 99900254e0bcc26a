use crate::common::pool::ValuePool;
use crate::common::Timestamp;
use crate::error::TsdbError;
use crate::iterators::{Batch, BatchValue, ValueKind};
use crate::series::chunks::{GenericChunk, SampleDecoder};

/// Decodes a single chunk into batches of at most `size` samples.
///
/// A batch holds one value kind only, so decoding stops early where the kind
/// of the chunk's samples changes. The decoder is left on the first sample
/// not yet copied into a batch.
#[derive(Default)]
pub struct ChunkIterator {
    max_time: Timestamp,
    decoder: Option<Box<dyn SampleDecoder>>,
    started: bool,
    batch: Batch,
    err: Option<TsdbError>,
}

impl ChunkIterator {
    pub fn new(chunk: &GenericChunk) -> Self {
        Self {
            max_time: chunk.max_time,
            decoder: Some(chunk.decoder()),
            ..Default::default()
        }
    }

    /// Point the iterator at another chunk, handing back whatever the current
    /// batch still holds.
    pub fn set_chunk(&mut self, chunk: &GenericChunk, pool: &mut ValuePool) {
        self.batch.release(pool);
        self.max_time = chunk.max_time;
        self.decoder = Some(chunk.decoder());
        self.started = false;
        self.err = None;
    }

    pub fn seek(&mut self, t: Timestamp, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        // nothing in this chunk at or after t
        if self.max_time < t {
            self.batch.release(pool);
            return None;
        }

        if self.batch.contains_time(t) {
            self.batch.seek_index(t);
            if self.batch.index() + size < self.batch.len() {
                return Some(self.batch.kind());
            }
        }

        let kind = match self.decoder.as_mut() {
            Some(decoder) => {
                self.started = true;
                decoder.seek(t)
            }
            None => None,
        };
        self.fill(kind, size, pool)
    }

    pub fn next(&mut self, size: usize, pool: &mut ValuePool) -> Option<ValueKind> {
        let kind = match self.decoder.as_mut() {
            Some(decoder) if self.started => decoder.current(),
            Some(decoder) => {
                self.started = true;
                decoder.scan()
            }
            None => None,
        };
        self.fill(kind, size, pool)
    }

    fn fill(
        &mut self,
        kind: Option<ValueKind>,
        size: usize,
        pool: &mut ValuePool,
    ) -> Option<ValueKind> {
        self.batch.release(pool);

        let decoder = self.decoder.as_mut()?;
        let Some(kind) = kind else {
            if let Some(err) = decoder.err() {
                self.err = Some(err.clone());
            }
            return None;
        };

        self.batch.reset(kind);
        let mut current = Some(kind);
        while current == Some(kind) && self.batch.len() < size {
            let value = match kind {
                ValueKind::Float => BatchValue::Float(decoder.at_float()),
                ValueKind::Histogram => {
                    let h = pool.histograms.take();
                    decoder.at_histogram(pool.histograms.get_mut(h));
                    BatchValue::Histogram(h)
                }
                ValueKind::FloatHistogram => {
                    let fh = pool.float_histograms.take();
                    decoder.at_float_histogram(pool.float_histograms.get_mut(fh));
                    BatchValue::FloatHistogram(fh)
                }
            };
            self.batch.push(decoder.at_time(), value);
            current = decoder.scan();
        }

        if current.is_none() {
            if let Some(err) = decoder.err() {
                self.err = Some(err.clone());
            }
        }

        Some(kind)
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn batch_mut(&mut self) -> &mut Batch {
        &mut self.batch
    }

    pub fn release(&mut self, pool: &mut ValuePool) {
        self.batch.release(pool);
    }

    /// Drop the decoder so `seek` and `next` report nothing until the next
    /// `set_chunk`. A recorded error is kept.
    pub fn finish(&mut self, pool: &mut ValuePool) {
        self.batch.release(pool);
        self.decoder = None;
        self.started = false;
    }

    pub fn err(&self) -> Option<&TsdbError> {
        self.err.as_ref()
    }
}
