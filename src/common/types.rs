use crate::histogram::{FloatHistogram, Histogram};
use crate::iterators::ValueKind;

pub type Timestamp = i64;

/// The value carried by a single decoded sample.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleValue {
    Float(f64),
    Histogram(Box<Histogram>),
    FloatHistogram(Box<FloatHistogram>),
}

impl SampleValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SampleValue::Float(_) => ValueKind::Float,
            SampleValue::Histogram(_) => ValueKind::Histogram,
            SampleValue::FloatHistogram(_) => ValueKind::FloatHistogram,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SampleValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        SampleValue::Float(value)
    }
}

impl From<Histogram> for SampleValue {
    fn from(value: Histogram) -> Self {
        SampleValue::Histogram(Box::new(value))
    }
}

impl From<FloatHistogram> for SampleValue {
    fn from(value: FloatHistogram) -> Self {
        SampleValue::FloatHistogram(Box::new(value))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: SampleValue,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: impl Into<SampleValue>) -> Self {
        Self {
            timestamp,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}
