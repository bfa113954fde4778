//! Shared pool of fixed-capacity write buffers.

use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::PoolConfig;
use crate::error::LineError;

/// A pool of reusable, fixed-capacity byte buffers.
///
/// The pool is a bounded free-list, not a blocking queue: [`borrow`] never
/// waits. When no idle buffer exists a new one is allocated on demand, and it
/// joins the idle set when released. The pool therefore only grows under
/// contention and shrinks only on [`preallocate`].
///
/// There is no global instance. Share one pool between readers and writers
/// by passing an `Arc<BufferPool>` to each of them.
///
/// # Example
///
/// ```
/// use linemill::{BufferPool, PoolConfig};
///
/// let pool = BufferPool::new(PoolConfig::new(2, 64)?)?;
/// pool.preallocate();
///
/// let mut buf = pool.borrow();
/// assert!(buf.put_slice(b"hello"));
/// assert_eq!(buf.len(), 5);
/// drop(buf); // back in the pool, cleared
///
/// assert_eq!(pool.idle_count(), 2);
/// # Ok::<(), linemill::LineError>(())
/// ```
///
/// [`borrow`]: BufferPool::borrow
/// [`preallocate`]: BufferPool::preallocate
#[derive(Debug)]
pub struct BufferPool {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

#[derive(Debug, Default)]
struct PoolState {
    idle: Vec<BytesMut>,
    on_demand: usize,
}

impl BufferPool {
    /// Creates an empty pool. Call [`BufferPool::preallocate`] to fill it.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: PoolConfig) -> Result<Self, LineError> {
        config.validate()?;
        Ok(Self {
            config,
            state: Mutex::new(PoolState::default()),
        })
    }

    /// Discards every idle buffer and allocates a fresh set of
    /// `buffer_count` buffers.
    ///
    /// Safe to call any number of times. Buffers currently borrowed are not
    /// affected; they rejoin the (new) idle set when released.
    pub fn preallocate(&self) {
        let fresh: Vec<BytesMut> = (0..self.config.buffer_count())
            .map(|_| BytesMut::with_capacity(self.config.buffer_size()))
            .collect();

        let stale = {
            let mut state = self.state.lock();
            state.on_demand = 0;
            std::mem::replace(&mut state.idle, fresh)
        };

        debug!(
            buffers = self.config.buffer_count(),
            buffer_size = self.config.buffer_size(),
            discarded = stale.len(),
            "preallocated buffer pool"
        );
    }

    /// Takes an idle buffer, or allocates a new one if none is idle.
    ///
    /// The returned buffer is empty. It goes back to the pool when dropped.
    pub fn borrow(&self) -> PooledBuffer<'_> {
        let reused = {
            let mut state = self.state.lock();
            let reused = state.idle.pop();
            if reused.is_none() {
                state.on_demand += 1;
            }
            reused
        };

        let data = match reused {
            Some(mut data) => {
                data.clear();
                data
            }
            None => {
                debug!(
                    buffer_size = self.config.buffer_size(),
                    "buffer pool empty, allocating on demand"
                );
                BytesMut::with_capacity(self.config.buffer_size())
            }
        };

        PooledBuffer {
            data,
            capacity: self.config.buffer_size(),
            pool: self,
        }
    }

    /// Returns a buffer to the pool.
    ///
    /// Equivalent to dropping it; provided for call sites that want the
    /// hand-back to be explicit.
    pub fn release(&self, buffer: PooledBuffer<'_>) {
        debug_assert!(
            std::ptr::eq(self, buffer.pool),
            "buffer released to a pool it was not borrowed from"
        );
        drop(buffer);
    }

    /// Number of buffers currently idle.
    pub fn idle_count(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Number of buffers allocated because the pool was empty, since the last
    /// [`BufferPool::preallocate`].
    pub fn on_demand_allocations(&self) -> usize {
        self.state.lock().on_demand
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn reclaim(&self, mut data: BytesMut) {
        data.clear();
        self.state.lock().idle.push(data);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self {
            config: PoolConfig::default(),
            state: Mutex::new(PoolState::default()),
        }
    }
}

/// A buffer on loan from a [`BufferPool`].
///
/// The buffer never grows past the pool's `buffer_size`: [`put_slice`]
/// refuses data that does not fit. It is cleared and handed back to its pool
/// when dropped.
///
/// [`put_slice`]: PooledBuffer::put_slice
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    data: BytesMut,
    capacity: usize,
    pool: &'a BufferPool,
}

impl PooledBuffer<'_> {
    /// Appends `src` if it fits in the remaining capacity.
    ///
    /// Returns `false` and leaves the buffer untouched otherwise.
    pub fn put_slice(&mut self, src: &[u8]) -> bool {
        if src.len() > self.remaining() {
            return false;
        }
        self.data.extend_from_slice(src);
        true
    }

    /// Bytes written so far (the write position).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing has been written since the last clear.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fixed capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Space left before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Resets the write position without deallocating.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Hands the buffer back to its pool.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.reclaim(std::mem::take(&mut self.data));
    }
}
