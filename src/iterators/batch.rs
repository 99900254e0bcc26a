use crate::common::binary_search::find_first_ge_index;
use crate::common::pool::{PoolRef, ValuePool};
use crate::common::{Sample, SampleValue, Timestamp};
use crate::histogram::{FloatHistogram, Histogram};
use strum::{Display, EnumIter, IntoStaticStr};

/// The kind of value held by every sample of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Float,
    Histogram,
    FloatHistogram,
}

/// A single batch entry. Histogram payloads live in the [`ValuePool`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BatchValue {
    Float(f64),
    Histogram(PoolRef<Histogram>),
    FloatHistogram(PoolRef<FloatHistogram>),
}

impl BatchValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BatchValue::Float(_) => ValueKind::Float,
            BatchValue::Histogram(_) => ValueKind::Histogram,
            BatchValue::FloatHistogram(_) => ValueKind::FloatHistogram,
        }
    }

    /// Hand a pooled payload back. Floats hold nothing.
    #[inline]
    pub(crate) fn release(self, pool: &mut ValuePool) {
        match self {
            BatchValue::Float(_) => {}
            BatchValue::Histogram(h) => pool.histograms.put(h),
            BatchValue::FloatHistogram(fh) => pool.float_histograms.put(fh),
        }
    }
}

/// A reusable window of decoded samples of a single [`ValueKind`].
///
/// Timestamps are strictly increasing. `index` is the read position and always
/// satisfies `index <= len()`. A batch owns the pooled payloads of all of its
/// entries until a merge moves them into another batch or they are handed back
/// with [`Batch::release`].
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub(crate) timestamps: Vec<Timestamp>,
    pub(crate) values: Vec<BatchValue>,
    pub(crate) kind: ValueKind,
    pub(crate) index: usize,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new(ValueKind::Float)
    }
}

impl Batch {
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            timestamps: Vec::new(),
            values: Vec::new(),
            kind,
            index: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            kind: ValueKind::Float,
            index: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of entries at or after the read position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len() - self.index
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn values(&self) -> &[BatchValue] {
        &self.values
    }

    #[inline]
    pub fn at_time(&self) -> Timestamp {
        self.timestamps[self.index]
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// Does `t` fall between the first and last timestamp of the batch?
    pub fn contains_time(&self, t: Timestamp) -> bool {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => first <= t && t <= last,
            _ => false,
        }
    }

    /// Move the read position to the first entry at or after `t`.
    pub fn seek_index(&mut self, t: Timestamp) {
        self.index = find_first_ge_index(&self.timestamps, &t);
    }

    /// Start an empty batch of `kind`. Any entries still held must have been
    /// released or moved out.
    pub(crate) fn reset(&mut self, kind: ValueKind) {
        debug_assert!(self.is_empty(), "resetting a batch that still owns values");
        self.timestamps.clear();
        self.values.clear();
        self.kind = kind;
        self.index = 0;
    }

    #[inline]
    pub(crate) fn push(&mut self, timestamp: Timestamp, value: BatchValue) {
        debug_assert_eq!(
            value.kind(),
            self.kind,
            "pushing a {} value into a {} batch",
            value.kind(),
            self.kind
        );
        debug_assert!(
            self.timestamps.last().is_none_or(|last| *last < timestamp),
            "batch timestamps must be strictly increasing"
        );
        self.timestamps.push(timestamp);
        self.values.push(value);
    }

    /// Return every pooled payload of the batch and empty it.
    pub(crate) fn release(&mut self, pool: &mut ValuePool) {
        for value in self.values.drain(..) {
            value.release(pool);
        }
        self.timestamps.clear();
        self.index = 0;
    }

    /// Return the pooled payloads of the entries before the read position.
    pub(crate) fn release_consumed(&mut self, pool: &mut ValuePool) {
        for value in self.values.drain(..self.index) {
            value.release(pool);
        }
        self.timestamps.drain(..self.index);
        self.index = 0;
    }

    pub fn view<'a>(&'a self, pool: &'a ValuePool) -> BatchView<'a> {
        BatchView { batch: self, pool }
    }
}

/// Read-only access to a batch together with the pool its histograms live in.
///
/// Valid until the next `seek`/`next` on the cursor that produced it. Payloads
/// must be copied out if they are needed past that point.
#[derive(Clone, Copy)]
pub struct BatchView<'a> {
    batch: &'a Batch,
    pool: &'a ValuePool,
}

impl<'a> BatchView<'a> {
    pub fn kind(&self) -> ValueKind {
        self.batch.kind
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn index(&self) -> usize {
        self.batch.index
    }

    pub fn timestamps(&self) -> &'a [Timestamp] {
        &self.batch.timestamps
    }

    pub fn timestamp(&self, i: usize) -> Timestamp {
        self.batch.timestamps[i]
    }

    pub fn float(&self, i: usize) -> Option<f64> {
        match self.batch.values[i] {
            BatchValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn histogram(&self, i: usize) -> Option<&'a Histogram> {
        match self.batch.values[i] {
            BatchValue::Histogram(h) => Some(self.pool.histograms.get(h)),
            _ => None,
        }
    }

    pub fn float_histogram(&self, i: usize) -> Option<&'a FloatHistogram> {
        match self.batch.values[i] {
            BatchValue::FloatHistogram(fh) => Some(self.pool.float_histograms.get(fh)),
            _ => None,
        }
    }

    /// Copy entry `i` out of the pool.
    pub fn sample(&self, i: usize) -> Sample {
        let value = match self.batch.values[i] {
            BatchValue::Float(v) => SampleValue::Float(v),
            BatchValue::Histogram(h) => {
                SampleValue::Histogram(Box::new(self.pool.histograms.get(h).clone()))
            }
            BatchValue::FloatHistogram(fh) => {
                SampleValue::FloatHistogram(Box::new(self.pool.float_histograms.get(fh).clone()))
            }
        };
        Sample {
            timestamp: self.batch.timestamps[i],
            value,
        }
    }

    /// Owned copies of the entries from the read position onwards.
    pub fn remaining_samples(&self) -> impl Iterator<Item = Sample> + 'a {
        let view = *self;
        (self.batch.index..self.batch.len()).map(move |i| view.sample(i))
    }
}
