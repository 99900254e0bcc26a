use crate::common::binary_search::find_first_ge_index_by_key;
use crate::common::{Sample, SampleValue, Timestamp};
use crate::error::{TsdbError, TsdbResult};
use crate::histogram::{FloatHistogram, Histogram};
use crate::iterators::ValueKind;
use crate::series::chunks::{ChunkSource, GenericChunk, SampleDecoder};
use std::sync::Arc;

/// A chunk whose samples are already decoded and held in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UncompressedChunk {
    samples: Vec<Sample>,
}

impl UncompressedChunk {
    pub fn new(samples: Vec<Sample>) -> TsdbResult<Self> {
        if let Some(pair) = samples
            .windows(2)
            .find(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            return Err(TsdbError::InvalidChunk(format!(
                "samples must be strictly ascending ({} is followed by {})",
                pair[0].timestamp, pair[1].timestamp
            )));
        }
        Ok(Self { samples })
    }

    pub fn from_floats(samples: &[(Timestamp, f64)]) -> TsdbResult<Self> {
        let samples = samples
            .iter()
            .map(|&(ts, value)| Sample::new(ts, value))
            .collect();
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Wrap the chunk with its time bounds. Empty chunks have no bounds and are
    /// rejected.
    pub fn into_generic(self) -> TsdbResult<GenericChunk> {
        let (Some(min_time), Some(max_time)) = (self.first_timestamp(), self.last_timestamp())
        else {
            return Err(TsdbError::InvalidChunk("chunk has no samples".to_string()));
        };
        Ok(GenericChunk::new(min_time, max_time, Arc::new(self)))
    }

    fn get_sample_index(&self, ts: Timestamp) -> usize {
        find_first_ge_index_by_key(&self.samples, &ts, |s| s.timestamp)
    }
}

impl ChunkSource for UncompressedChunk {
    fn decoder(self: Arc<Self>) -> Box<dyn SampleDecoder> {
        Box::new(UncompressedDecoder {
            chunk: self,
            pos: 0,
            started: false,
        })
    }
}

pub struct UncompressedDecoder {
    chunk: Arc<UncompressedChunk>,
    pos: usize,
    started: bool,
}

impl UncompressedDecoder {
    fn sample(&self) -> &Sample {
        &self.chunk.samples[self.pos]
    }
}

impl SampleDecoder for UncompressedDecoder {
    fn seek(&mut self, t: Timestamp) -> Option<ValueKind> {
        self.started = true;
        self.pos = self.chunk.get_sample_index(t);
        self.current()
    }

    fn scan(&mut self) -> Option<ValueKind> {
        if self.started {
            self.pos = (self.pos + 1).min(self.chunk.len());
        } else {
            self.started = true;
        }
        self.current()
    }

    fn current(&self) -> Option<ValueKind> {
        if !self.started {
            return None;
        }
        self.chunk.samples.get(self.pos).map(Sample::kind)
    }

    fn at_time(&self) -> Timestamp {
        self.sample().timestamp
    }

    fn at_float(&self) -> f64 {
        match &self.sample().value {
            SampleValue::Float(v) => *v,
            other => panic!("at_float called on a {} sample", other.kind()),
        }
    }

    fn at_histogram(&self, dest: &mut Histogram) {
        match &self.sample().value {
            SampleValue::Histogram(h) => h.copy_to(dest),
            other => panic!("at_histogram called on a {} sample", other.kind()),
        }
    }

    fn at_float_histogram(&self, dest: &mut FloatHistogram) {
        match &self.sample().value {
            SampleValue::FloatHistogram(fh) => fh.copy_to(dest),
            // integer histograms read as floats are converted on the fly
            SampleValue::Histogram(h) => h.to_float(dest),
            other => panic!("at_float_histogram called on a {} sample", other.kind()),
        }
    }

    fn err(&self) -> Option<&TsdbError> {
        None
    }
}
