use core::{alloc::Layout, cell::Cell, ptr::NonNull};
use std::rc::Rc;

use log::{error, trace};

use crate::{error::AllocError, global::Global, traits::Allocator};

/// Counters shared by every clone of a [`Tracking`] allocator.
#[derive(Debug, Default)]
pub struct AllocStats {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    live_bytes: Cell<usize>,
    peak_bytes: Cell<usize>,
    failures: Cell<usize>,
}

impl AllocStats {
    /// Number of successful allocations.
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    /// Bytes allocated and not yet deallocated.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    /// Highest value `live_bytes` has reached.
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.get()
    }

    /// Number of requests that failed.
    pub fn failures(&self) -> usize {
        self.failures.get()
    }

    /// Number of allocations that have not been deallocated.
    pub fn live_allocations(&self) -> usize {
        self.allocations.get() - self.deallocations.get()
    }
}

/// An allocator wrapper that counts the traffic going to `A`.
///
/// Clones share their counters, so every array copied from one built on a `Tracking` allocator
/// reports into the same [`AllocStats`]. An optional byte limit makes requests fail with
/// [`AllocError::OutOfMemory`] once the live total would exceed it.
#[derive(Clone, Debug)]
pub struct Tracking<A: Allocator = Global> {
    inner: A,
    stats: Rc<AllocStats>,
    limit: Option<usize>,
}

impl Tracking<Global> {
    pub fn new() -> Self {
        Self::wrap(Global)
    }

    /// Tracks the global allocator, refusing to keep more than `limit` bytes live.
    pub fn with_limit(limit: usize) -> Self {
        Self::wrap(Global).limited(limit)
    }
}

impl Default for Tracking<Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Tracking<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            stats: Rc::new(AllocStats::default()),
            limit: None,
        }
    }

    pub fn limited(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn stats(&self) -> &AllocStats {
        &self.stats
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

unsafe impl<A: Allocator> Allocator for Tracking<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let stats = &self.stats;
        let live = stats.live_bytes.get();
        if let Some(limit) = self.limit {
            if live.saturating_add(layout.size()) > limit {
                error!(
                    "allocation of {} bytes would exceed the limit of {} bytes ({} live)",
                    layout.size(),
                    limit,
                    live
                );
                stats.failures.set(stats.failures.get() + 1);
                return Err(AllocError::OutOfMemory);
            }
        }

        match self.inner.allocate(layout) {
            Ok(ptr) => {
                trace!("allocated {} bytes at {:p}", layout.size(), ptr);
                stats.allocations.set(stats.allocations.get() + 1);
                stats.live_bytes.set(live + layout.size());
                stats.peak_bytes.set(stats.peak_bytes.get().max(live + layout.size()));
                Ok(ptr)
            }
            Err(err) => {
                stats.failures.set(stats.failures.get() + 1);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        trace!("deallocating {} bytes at {:p}", layout.size(), ptr);
        let stats = &self.stats;
        stats.deallocations.set(stats.deallocations.get() + 1);
        stats.live_bytes.set(stats.live_bytes.get() - layout.size());
        self.inner.deallocate(ptr, layout);
    }

    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        self.inner.construct(slot, value)
    }

    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        self.inner.destroy(slot)
    }
}
