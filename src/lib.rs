//! Merge engine for series chunks.
//!
//! Replicated writes and multiple storage tiers hand the read path several
//! chunks per series whose time ranges overlap. [`MergeCursor`] turns such a
//! set into one strictly time-ascending, deduplicated stream of batches that
//! can be read incrementally with `next` or positioned with `seek`. Histogram
//! payloads are recycled through a [`ValuePool`] instead of being allocated
//! per sample.
//!
//! ```
//! use series_merge::{MergeConfig, MergeCursor, UncompressedChunk};
//!
//! let chunks = vec![
//!     UncompressedChunk::from_floats(&[(10, 1.0), (20, 2.0)]).unwrap().into_generic().unwrap(),
//!     UncompressedChunk::from_floats(&[(15, 1.5), (20, 9.0)]).unwrap().into_generic().unwrap(),
//! ];
//! let cursor: MergeCursor = MergeCursor::new(chunks, &MergeConfig::default());
//! let timestamps: Vec<i64> = cursor.samples(12).map(|s| s.timestamp).collect();
//! assert_eq!(timestamps, vec![10, 15, 20]);
//! ```
pub mod common;
pub mod config;
mod error;
pub mod histogram;
pub mod iterators;
pub mod series;

pub use common::pool::{Pool, PoolRef, ValuePool};
pub use common::{Sample, SampleValue, Timestamp};
pub use config::MergeConfig;
pub use error::{TsdbError, TsdbResult};
pub use histogram::{FloatHistogram, Histogram, Span};
pub use iterators::{
    Batch, BatchStream, BatchValue, BatchView, MergeCursor, MergeIterator, MergeStrategy,
    MergedSamples, SeriesCursor, SeriesIterator, ValueKind,
};
pub use series::chunks::{
    partition_chunks, ChunkSource, GenericChunk, SampleDecoder, UncompressedChunk,
};
