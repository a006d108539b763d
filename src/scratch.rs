//! Reusable numeric scratch buffers with scoped leases.
//!
//! Inference and training produce short-lived arrays at high frequency. The
//! pool hands these out as RAII leases so every buffer goes back to the pool
//! on each exit path, including early returns and error paths.

use ndarray::{Array1, Array2};
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Pool of reusable f32 arrays keyed by shape.
pub struct ScratchPool {
    pool_1d: RefCell<Vec<Array1<f32>>>,
    pool_2d: RefCell<Vec<Array2<f32>>>,
    max_pool_size: usize,
}

impl ScratchPool {
    pub fn new(max_pool_size: usize) -> Self {
        ScratchPool {
            pool_1d: RefCell::new(Vec::with_capacity(max_pool_size)),
            pool_2d: RefCell::new(Vec::with_capacity(max_pool_size)),
            max_pool_size,
        }
    }

    /// Lease a zeroed 1D buffer of the given length.
    pub fn lease_1d(&self, len: usize) -> BufferLease<'_> {
        let mut pool = self.pool_1d.borrow_mut();
        let buffer = if let Some(pos) = pool.iter().position(|a| a.len() == len) {
            pool.swap_remove(pos)
        } else {
            Array1::zeros(len)
        };
        BufferLease {
            pool: self,
            buffer: Some(buffer),
        }
    }

    /// Lease a zeroed 2D buffer of the given shape.
    pub fn lease_2d(&self, shape: (usize, usize)) -> BufferLease2<'_> {
        let mut pool = self.pool_2d.borrow_mut();
        let buffer = if let Some(pos) = pool.iter().position(|a| a.dim() == shape) {
            pool.swap_remove(pos)
        } else {
            Array2::zeros(shape)
        };
        BufferLease2 {
            pool: self,
            buffer: Some(buffer),
        }
    }

    fn release_1d(&self, mut buffer: Array1<f32>) {
        let mut pool = self.pool_1d.borrow_mut();
        if pool.len() < self.max_pool_size {
            buffer.fill(0.0);
            pool.push(buffer);
        }
    }

    fn release_2d(&self, mut buffer: Array2<f32>) {
        let mut pool = self.pool_2d.borrow_mut();
        if pool.len() < self.max_pool_size {
            buffer.fill(0.0);
            pool.push(buffer);
        }
    }

    /// Number of idle 1D buffers currently held.
    pub fn idle_1d(&self) -> usize {
        self.pool_1d.borrow().len()
    }

    /// Number of idle 2D buffers currently held.
    pub fn idle_2d(&self) -> usize {
        self.pool_2d.borrow().len()
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Scoped lease over a pooled `Array1<f32>`. Returns the buffer on drop.
pub struct BufferLease<'a> {
    pool: &'a ScratchPool,
    buffer: Option<Array1<f32>>,
}

impl Deref for BufferLease<'_> {
    type Target = Array1<f32>;

    fn deref(&self) -> &Self::Target {
        self.buffer.as_ref().expect("lease already released")
    }
}

impl DerefMut for BufferLease<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffer.as_mut().expect("lease already released")
    }
}

impl Drop for BufferLease<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release_1d(buffer);
        }
    }
}

/// Scoped lease over a pooled `Array2<f32>`. Returns the buffer on drop.
pub struct BufferLease2<'a> {
    pool: &'a ScratchPool,
    buffer: Option<Array2<f32>>,
}

impl Deref for BufferLease2<'_> {
    type Target = Array2<f32>;

    fn deref(&self) -> &Self::Target {
        self.buffer.as_ref().expect("lease already released")
    }
}

impl DerefMut for BufferLease2<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffer.as_mut().expect("lease already released")
    }
}

impl Drop for BufferLease2<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release_2d(buffer);
        }
    }
}
