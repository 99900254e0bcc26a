//! Native histogram payloads carried alongside plain float samples.
//!
//! Both representations use the sparse bucket layout: `spans` describe runs of
//! populated buckets and `buckets` holds one count per populated bucket. Integer
//! histograms store bucket counts delta-encoded, float histograms store them as
//! absolute values.
use get_size::GetSize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, GetSize)]
pub enum CounterResetHint {
    #[default]
    Unknown,
    CounterReset,
    NotCounterReset,
    Gauge,
}

/// A run of `length` consecutive buckets starting `offset` buckets after the
/// end of the previous span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, GetSize)]
pub struct Span {
    pub offset: i32,
    pub length: u32,
}

impl Span {
    pub const fn new(offset: i32, length: u32) -> Self {
        Self { offset, length }
    }
}

#[derive(Clone, Debug, Default, PartialEq, GetSize)]
pub struct Histogram {
    pub counter_reset_hint: CounterResetHint,
    pub schema: i32,
    pub zero_threshold: f64,
    pub zero_count: u64,
    pub count: u64,
    pub sum: f64,
    pub positive_spans: Vec<Span>,
    pub negative_spans: Vec<Span>,
    /// Delta encoded: each entry is relative to the previous bucket.
    pub positive_buckets: Vec<i64>,
    pub negative_buckets: Vec<i64>,
}

impl Histogram {
    /// Overwrite `dest` with the contents of `self`, reusing its allocations.
    pub fn copy_to(&self, dest: &mut Histogram) {
        dest.counter_reset_hint = self.counter_reset_hint;
        dest.schema = self.schema;
        dest.zero_threshold = self.zero_threshold;
        dest.zero_count = self.zero_count;
        dest.count = self.count;
        dest.sum = self.sum;
        dest.positive_spans.clone_from(&self.positive_spans);
        dest.negative_spans.clone_from(&self.negative_spans);
        dest.positive_buckets.clone_from(&self.positive_buckets);
        dest.negative_buckets.clone_from(&self.negative_buckets);
    }

    /// Absolute (non delta) positive bucket counts.
    pub fn positive_counts(&self) -> impl Iterator<Item = i64> + '_ {
        absolute_counts(&self.positive_buckets)
    }

    pub fn negative_counts(&self) -> impl Iterator<Item = i64> + '_ {
        absolute_counts(&self.negative_buckets)
    }

    /// Convert into `dest`, reusing its allocations.
    pub fn to_float(&self, dest: &mut FloatHistogram) {
        dest.counter_reset_hint = self.counter_reset_hint;
        dest.schema = self.schema;
        dest.zero_threshold = self.zero_threshold;
        dest.zero_count = self.zero_count as f64;
        dest.count = self.count as f64;
        dest.sum = self.sum;
        dest.positive_spans.clone_from(&self.positive_spans);
        dest.negative_spans.clone_from(&self.negative_spans);
        dest.positive_buckets.clear();
        dest.positive_buckets
            .extend(self.positive_counts().map(|c| c as f64));
        dest.negative_buckets.clear();
        dest.negative_buckets
            .extend(self.negative_counts().map(|c| c as f64));
    }
}

fn absolute_counts(deltas: &[i64]) -> impl Iterator<Item = i64> + '_ {
    deltas.iter().scan(0i64, |acc, delta| {
        *acc += *delta;
        Some(*acc)
    })
}

#[derive(Clone, Debug, Default, PartialEq, GetSize)]
pub struct FloatHistogram {
    pub counter_reset_hint: CounterResetHint,
    pub schema: i32,
    pub zero_threshold: f64,
    pub zero_count: f64,
    pub count: f64,
    pub sum: f64,
    pub positive_spans: Vec<Span>,
    pub negative_spans: Vec<Span>,
    pub positive_buckets: Vec<f64>,
    pub negative_buckets: Vec<f64>,
}

impl FloatHistogram {
    /// Overwrite `dest` with the contents of `self`, reusing its allocations.
    pub fn copy_to(&self, dest: &mut FloatHistogram) {
        dest.counter_reset_hint = self.counter_reset_hint;
        dest.schema = self.schema;
        dest.zero_threshold = self.zero_threshold;
        dest.zero_count = self.zero_count;
        dest.count = self.count;
        dest.sum = self.sum;
        dest.positive_spans.clone_from(&self.positive_spans);
        dest.negative_spans.clone_from(&self.negative_spans);
        dest.positive_buckets.clone_from(&self.positive_buckets);
        dest.negative_buckets.clone_from(&self.negative_buckets);
    }
}
