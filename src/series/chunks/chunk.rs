use crate::common::Timestamp;
use crate::error::TsdbError;
use crate::histogram::{FloatHistogram, Histogram};
use crate::iterators::ValueKind;
use std::fmt;
use std::sync::Arc;

/// Sample-at-a-time access to one encoded chunk.
///
/// A decoder is positioned on a "current" sample. `scan` moves to the next
/// sample and `seek` moves to the first sample at or after a timestamp. Both
/// return the kind of the new current sample, or `None` once the chunk is
/// exhausted or decoding failed (check [`SampleDecoder::err`]).
pub trait SampleDecoder {
    fn seek(&mut self, t: Timestamp) -> Option<ValueKind>;
    fn scan(&mut self) -> Option<ValueKind>;
    /// Kind of the current sample, `None` before the first `scan`/`seek` and
    /// after the end of the chunk.
    fn current(&self) -> Option<ValueKind>;
    fn at_time(&self) -> Timestamp;
    fn at_float(&self) -> f64;
    /// Copy the current histogram into `dest`, reusing its allocations.
    fn at_histogram(&self, dest: &mut Histogram);
    fn at_float_histogram(&self, dest: &mut FloatHistogram);
    fn err(&self) -> Option<&TsdbError>;
}

/// Decode capability of an encoded chunk. Implementations own the encoded
/// bytes; the merge engine only ever reads them through a decoder.
pub trait ChunkSource: fmt::Debug {
    fn decoder(self: Arc<Self>) -> Box<dyn SampleDecoder>;
}

/// A time bounded chunk of samples for a single series. Both bounds are
/// inclusive.
#[derive(Clone)]
pub struct GenericChunk {
    pub min_time: Timestamp,
    pub max_time: Timestamp,
    pub source: Arc<dyn ChunkSource>,
}

impl GenericChunk {
    pub fn new(min_time: Timestamp, max_time: Timestamp, source: Arc<dyn ChunkSource>) -> Self {
        debug_assert!(min_time <= max_time, "chunk bounds are inverted");
        Self {
            min_time,
            max_time,
            source,
        }
    }

    pub fn decoder(&self) -> Box<dyn SampleDecoder> {
        Arc::clone(&self.source).decoder()
    }

    pub fn overlaps(&self, other: &GenericChunk) -> bool {
        self.min_time <= other.max_time && other.min_time <= self.max_time
    }
}

impl fmt::Debug for GenericChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericChunk")
            .field("min_time", &self.min_time)
            .field("max_time", &self.max_time)
            .finish()
    }
}
