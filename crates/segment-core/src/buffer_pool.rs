//! Reusable byte-buffer pool for response bodies (C10).

use bytes::BytesMut;
use parking_lot::Mutex;

/// Recycles `BytesMut` buffers. `acquire` returns a fresh-or-recycled buffer;
/// `release` clears it and returns it to the pool. No size bound — callers
/// that need one should cap how many buffers they hold outstanding.
#[derive(Default)]
pub struct BufferPool {
    free: Mutex<Vec<BytesMut>>,
}

impl BufferPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a buffer, reusing one from the pool if available.
    #[must_use]
    pub fn acquire(&self) -> BytesMut {
        self.free.lock().pop().unwrap_or_default()
    }

    /// Clears `buf` and returns it to the pool for reuse.
    pub fn release(&self, mut buf: BytesMut) {
        buf.clear();
        self.free.lock().push(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_buffer_is_reused_and_cleared() {
        let pool = BufferPool::new();
        let mut buf = pool.acquire();
        buf.extend_from_slice(b"hello");
        pool.release(buf);

        let reused = pool.acquire();
        assert!(reused.is_empty());
        assert!(reused.capacity() >= 5);
    }

    #[test]
    fn acquire_on_empty_pool_allocates_fresh() {
        let pool = BufferPool::new();
        let buf = pool.acquire();
        assert!(buf.is_empty());
    }
}
