//! Reusable write buffers.
//!
//! A process-wide [`BufferPool`] is created once, filled with
//! [`BufferPool::preallocate`], and passed explicitly to every writer. Buffers
//! are lent out as [`PooledBuffer`] guards that return themselves on drop.

mod pool;

pub use pool::{BufferPool, PooledBuffer};
