//! Fixed-capacity storage for per-frame geometry.
//!
//! A [`FixedBuffer`] allocates its full capacity once and never grows. Writes
//! that do not fit are rejected as a whole.

use crate::error::{BufferKind, Error, Result};

#[derive(Debug)]
pub struct FixedBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    kind: BufferKind,
}

impl<T: Copy> FixedBuffer<T> {
    pub fn with_capacity(kind: BufferKind, capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            kind,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Fails with `CapacityExceeded` unless `count` more items fit.
    pub fn reserve_check(&self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(Error::CapacityExceeded {
                buffer: self.kind,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, value: T) -> Result<()> {
        self.reserve_check(1)?;
        self.data.push(value);
        Ok(())
    }

    /// Appends all of `values`, or nothing.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.reserve_check(values.len())?;
        self.data.extend_from_slice(values);
        Ok(())
    }

    /// Drops the contents but keeps the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}
