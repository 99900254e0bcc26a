/// Find the index of the first element of `arr` that is greater
/// or equal to `val`.
/// Assumes that `arr` is sorted.
pub fn find_first_ge_index<T>(arr: &[T], val: &T) -> usize
where
    T: Ord,
{
    if arr.len() <= 16 {
        // If the vectors are small, perform a linear search.
        return arr.iter().position(|x| x >= val).unwrap_or(arr.len());
    }
    arr.binary_search(val).unwrap_or_else(|x| x)
}

/// Find the index of the first element of `arr` whose key is greater or equal
/// to `val`. Assumes that `arr` is sorted by `key`.
pub fn find_first_ge_index_by_key<T, K, F>(arr: &[T], val: &K, mut key: F) -> usize
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    if arr.len() <= 16 {
        return arr
            .iter()
            .position(|x| key(x) >= *val)
            .unwrap_or(arr.len());
    }
    arr.partition_point(|x| key(x) < *val)
}
