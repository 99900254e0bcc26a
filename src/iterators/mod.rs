mod batch;
mod batch_stream;
mod chunk_iterator;
mod merge_cursor;
mod merge_iterator;
mod non_overlapping_iterator;
mod series_iterator;

pub use batch::*;
pub use batch_stream::*;
pub use chunk_iterator::ChunkIterator;
pub use merge_cursor::*;
pub use merge_iterator::MergeIterator;
pub use non_overlapping_iterator::NonOverlappingIterator;
pub use series_iterator::*;
