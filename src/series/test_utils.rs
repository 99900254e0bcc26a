use crate::common::{Sample, SampleValue, Timestamp};
use crate::error::TsdbError;
use crate::histogram::{FloatHistogram, Histogram, Span};
use crate::iterators::ValueKind;
use crate::series::chunks::{
    partition_chunks, ChunkSource, GenericChunk, SampleDecoder, UncompressedChunk,
};
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Float samples every `step` from `start` to `end` inclusive, valued by
/// their timestamp.
pub fn float_chunk_range(start: Timestamp, end: Timestamp, step: usize) -> GenericChunk {
    let samples: Vec<(Timestamp, f64)> = (start..=end)
        .step_by(step)
        .map(|ts| (ts, ts as f64))
        .collect();
    float_chunk(&samples)
}

pub fn float_chunk(samples: &[(Timestamp, f64)]) -> GenericChunk {
    UncompressedChunk::from_floats(samples)
        .unwrap()
        .into_generic()
        .unwrap()
}

/// Histogram with `count` set to the sample timestamp so merged output can be
/// traced back to its input.
pub fn make_histogram(ts: Timestamp) -> Histogram {
    Histogram {
        count: ts as u64,
        sum: ts as f64 / 2.0,
        positive_spans: vec![Span::new(0, 2)],
        positive_buckets: vec![1, (ts % 5) + 1],
        ..Default::default()
    }
}

pub fn histogram_chunk(timestamps: &[Timestamp]) -> GenericChunk {
    let samples = timestamps
        .iter()
        .map(|&ts| Sample::new(ts, make_histogram(ts)))
        .collect();
    UncompressedChunk::new(samples)
        .unwrap()
        .into_generic()
        .unwrap()
}

/// A float chunk spanning `[min_time, max_time]` whose decoder yields one
/// sample per timestamp from `min_time` and fails after `ok` samples.
pub fn failing_chunk(min_time: Timestamp, max_time: Timestamp, ok: usize) -> GenericChunk {
    GenericChunk::new(min_time, max_time, Arc::new(FailingChunk { min_time, ok }))
}

#[derive(Debug)]
struct FailingChunk {
    min_time: Timestamp,
    ok: usize,
}

impl ChunkSource for FailingChunk {
    fn decoder(self: Arc<Self>) -> Box<dyn SampleDecoder> {
        Box::new(FailingDecoder {
            min_time: self.min_time,
            ok: self.ok,
            pos: 0,
            started: false,
            err: None,
        })
    }
}

struct FailingDecoder {
    min_time: Timestamp,
    ok: usize,
    pos: usize,
    started: bool,
    err: Option<TsdbError>,
}

impl SampleDecoder for FailingDecoder {
    fn seek(&mut self, t: Timestamp) -> Option<ValueKind> {
        if self.current().is_none_or(|_| self.at_time() > t) {
            self.pos = 0;
            self.started = false;
            self.err = None;
        }
        loop {
            if self.started && self.at_time() >= t {
                return self.current();
            }
            self.scan()?;
        }
    }

    fn scan(&mut self) -> Option<ValueKind> {
        if self.err.is_some() {
            return None;
        }
        if self.started {
            self.pos += 1;
        } else {
            self.started = true;
        }
        if self.pos >= self.ok {
            self.err = Some(TsdbError::DecodingError(format!(
                "corrupt sample at offset {}",
                self.pos
            )));
        }
        self.current()
    }

    fn current(&self) -> Option<ValueKind> {
        (self.started && self.err.is_none()).then_some(ValueKind::Float)
    }

    fn at_time(&self) -> Timestamp {
        self.min_time + self.pos as Timestamp
    }

    fn at_float(&self) -> f64 {
        self.at_time() as f64
    }

    fn at_histogram(&self, _dest: &mut Histogram) {
        panic!("float only chunk")
    }

    fn at_float_histogram(&self, _dest: &mut FloatHistogram) {
        panic!("float only chunk")
    }

    fn err(&self) -> Option<&TsdbError> {
        self.err.as_ref()
    }
}

fn decode_all(chunk: &GenericChunk) -> Vec<Sample> {
    let mut decoder = chunk.decoder();
    let mut samples = vec![];
    while let Some(kind) = decoder.scan() {
        let value = match kind {
            ValueKind::Float => SampleValue::Float(decoder.at_float()),
            ValueKind::Histogram => {
                let mut h = Histogram::default();
                decoder.at_histogram(&mut h);
                SampleValue::Histogram(Box::new(h))
            }
            ValueKind::FloatHistogram => {
                let mut fh = FloatHistogram::default();
                decoder.at_float_histogram(&mut fh);
                SampleValue::FloatHistogram(Box::new(fh))
            }
        };
        samples.push(Sample::new(decoder.at_time(), value));
    }
    samples
}

/// Every sample of `chunks` grouped by timestamp, in partition order.
pub fn reference_candidates(chunks: &[GenericChunk]) -> BTreeMap<Timestamp, Vec<Sample>> {
    let mut merged: BTreeMap<Timestamp, Vec<Sample>> = BTreeMap::new();
    for partition in partition_chunks(chunks.to_vec()) {
        for chunk in &partition {
            for sample in decode_all(chunk) {
                merged.entry(sample.timestamp).or_default().push(sample);
            }
        }
    }
    merged
}

/// One sample per timestamp, taken from the lowest partition holding it.
pub fn reference_samples(chunks: &[GenericChunk]) -> Vec<Sample> {
    reference_candidates(chunks)
        .into_values()
        .filter_map(|candidates| candidates.into_iter().next())
        .collect()
}

/// Random float chunks that overlap heavily. Values encode the chunk number so
/// a wrong dedup winner shows up in comparisons.
pub fn random_float_chunks(rng: &mut SmallRng, count: usize, span: Timestamp) -> Vec<GenericChunk> {
    (0..count)
        .map(|n| {
            let start = rng.random_range(0..span);
            let len = rng.random_range(1..=24);
            let mut ts = start;
            let samples: Vec<(Timestamp, f64)> = (0..len)
                .map(|_| {
                    ts += rng.random_range(1..=5);
                    (ts, (n * 100_000) as f64 + ts as f64)
                })
                .collect();
            float_chunk(&samples)
        })
        .collect()
}
