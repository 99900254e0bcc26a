use crate::common::Timestamp;
use crate::series::chunks::GenericChunk;
use smallvec::SmallVec;

/// Split `chunks` into groups of mutually non-overlapping chunks, each sorted by
/// `min_time`.
///
/// Greedy first-fit over chunks ordered by `min_time`: a chunk joins the first
/// partition whose last chunk ends strictly before it starts, otherwise it opens
/// a new partition. The number of partitions tracks the replication factor, so
/// the last end time of each partition is kept inline. Every input chunk lands
/// in exactly one partition. The sort is stable, so ties keep input order.
pub fn partition_chunks(mut chunks: Vec<GenericChunk>) -> Vec<Vec<GenericChunk>> {
    chunks.sort_by_key(|c| c.min_time);
    let total = chunks.len();

    let mut partitions: Vec<Vec<GenericChunk>> = Vec::new();
    let mut last_max_time: SmallVec<Timestamp, 4> = SmallVec::new();

    'outer: for chunk in chunks {
        for (i, max_time) in last_max_time.iter_mut().enumerate() {
            if *max_time < chunk.min_time {
                *max_time = chunk.max_time;
                partitions[i].push(chunk);
                continue 'outer;
            }
        }
        let mut partition = Vec::with_capacity((total / (partitions.len() + 1)).max(1));
        last_max_time.push(chunk.max_time);
        partition.push(chunk);
        partitions.push(partition);
    }

    partitions
}
