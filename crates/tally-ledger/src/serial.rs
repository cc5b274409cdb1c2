use std::sync::atomic::{AtomicU64, Ordering};

/// Issues strictly increasing 64-bit serials for new commissions.
///
/// Serials start at 1; serial 0 is never issued.
#[derive(Debug)]
pub struct SerialAllocator {
    next: AtomicU64,
}

impl SerialAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Resume allocation from a known watermark, e.g. after restart.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first.max(1)),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// The serial the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for SerialAllocator {
    fn default() -> Self {
        Self::new()
    }
}
