//! Bounded free lists for recycled tweens and groups

/// A free list holding at most `capacity` recycled objects
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<T>,
    capacity: usize,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::new(),
            capacity,
        }
    }

    /// Take a recycled object, if any
    pub fn take(&mut self) -> Option<T> {
        self.free.pop()
    }

    /// Return an object, dropping it if the pool is full
    ///
    /// Returns whether the object was kept.
    pub fn give(&mut self, item: T) -> bool {
        if self.free.len() >= self.capacity {
            return false;
        }
        self.free.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
