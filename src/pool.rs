use crate::error::{SortError, SortResult};

/// Recycles fixed-length output buffers so repeated sorts do not allocate once
/// the pool is warm.
#[derive(Debug)]
pub struct BufferPool {
    buffer_len: usize,
    capacity: usize,
    free: Vec<Vec<f32>>,
}

impl BufferPool {
    pub fn new(buffer_len: usize, capacity: usize) -> Self {
        let free = (0..capacity).map(|_| vec![0.0; buffer_len]).collect();
        Self {
            buffer_len,
            capacity,
            free,
        }
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn acquire(&mut self) -> Vec<f32> {
        match self.free.pop() {
            Some(buffer) => buffer,
            None => {
                log::debug!("buffer pool exhausted, allocating {} floats", self.buffer_len);
                vec![0.0; self.buffer_len]
            }
        }
    }

    /// Returns a buffer for reuse. Buffers beyond the pool capacity are
    /// dropped.
    pub fn release(&mut self, buffer: Vec<f32>) -> SortResult<()> {
        if buffer.len() != self.buffer_len {
            return Err(SortError::ForeignBuffer {
                expected: self.buffer_len,
                actual: buffer.len(),
            });
        }
        if self.free.len() < self.capacity {
            self.free.push(buffer);
        }
        Ok(())
    }
}
