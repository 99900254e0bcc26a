//! Free-list pools for the histogram payloads referenced by batches.
//!
//! A batch never owns a histogram directly. Decoding takes a slot from the
//! pool and stores its [`PoolRef`] in the batch; the handle then travels with
//! the sample through the merge, and the slot is handed back with
//! [`Pool::put`] when the batch holding it is retired. Slots keep their
//! allocations, so steady state iteration does not allocate per sample.
use crate::histogram::{FloatHistogram, Histogram};
use get_size::GetSize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed handle to a slot in a [`Pool<T>`].
pub struct PoolRef<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolRef<T> {
    fn new(index: usize) -> Self {
        Self {
            index: index as u32,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for PoolRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolRef<T> {}

impl<T> PartialEq for PoolRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for PoolRef<T> {}

impl<T> Hash for PoolRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for PoolRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolRef({})", self.index)
    }
}

pub struct Pool<T> {
    slots: Vec<T>,
    borrowed: Vec<bool>,
    free: Vec<u32>,
    borrowed_count: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            borrowed: Vec::new(),
            free: Vec::new(),
            borrowed_count: 0,
        }
    }
}

impl<T: Default> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a slot. The slot holds whatever its previous user left in it;
    /// callers overwrite it before reading.
    pub fn take(&mut self) -> PoolRef<T> {
        let index = match self.free.pop() {
            Some(index) => index as usize,
            None => {
                self.slots.push(T::default());
                self.borrowed.push(false);
                self.slots.len() - 1
            }
        };
        self.borrowed[index] = true;
        self.borrowed_count += 1;
        PoolRef::new(index)
    }

    /// Return a slot to the pool. A handle must be returned exactly once.
    pub fn put(&mut self, handle: PoolRef<T>) {
        let index = handle.index();
        let is_borrowed = self.borrowed.get(index).copied().unwrap_or(false);
        debug_assert!(is_borrowed, "pool slot {index} returned twice");
        if !is_borrowed {
            return;
        }
        self.borrowed[index] = false;
        self.borrowed_count -= 1;
        self.free.push(handle.index);
    }

    #[inline]
    pub fn get(&self, handle: PoolRef<T>) -> &T {
        debug_assert!(self.borrowed[handle.index()], "read of a returned pool slot");
        &self.slots[handle.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, handle: PoolRef<T>) -> &mut T {
        debug_assert!(self.borrowed[handle.index()], "write to a returned pool slot");
        &mut self.slots[handle.index()]
    }

    pub fn is_borrowed(&self, handle: PoolRef<T>) -> bool {
        self.borrowed.get(handle.index()).copied().unwrap_or(false)
    }

    /// Number of slots currently handed out.
    pub fn borrowed(&self) -> usize {
        self.borrowed_count
    }

    /// Number of slots ever allocated by this pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T: GetSize> Pool<T> {
    pub fn heap_size(&self) -> usize {
        self.slots.get_heap_size()
            + self.borrowed.capacity() * size_of::<bool>()
            + self.free.capacity() * size_of::<u32>()
    }
}

/// The pools shared by every iterator participating in one merge.
#[derive(Default)]
pub struct ValuePool {
    pub histograms: Pool<Histogram>,
    pub float_histograms: Pool<FloatHistogram>,
}

impl ValuePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of histogram values currently borrowed from either pool.
    pub fn borrowed(&self) -> usize {
        self.histograms.borrowed() + self.float_histograms.borrowed()
    }

    pub fn heap_size(&self) -> usize {
        self.histograms.heap_size() + self.float_histograms.heap_size()
    }
}

impl fmt::Debug for ValuePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePool")
            .field("histograms", &self.histograms.borrowed())
            .field("float_histograms", &self.float_histograms.borrowed())
            .finish()
    }
}
