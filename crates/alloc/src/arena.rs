use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use bitvec::{boxed::BitBox, order::Lsb0, vec::BitVec};
use bytesize::ByteSize;
use log::{debug, error, warn};

use crate::{
    config::ArenaConfig,
    error::{AllocError, ConfigError},
    global::Global,
    ptr::RelPtrUsize,
    traits::Allocator,
};

/// A non-global allocator that hands out runs of fixed-size blocks from one contiguous memory
/// region reserved up front. Blocks can be individually freed and reused.
///
/// Requests are served first-fit: the lowest run of free blocks that can hold the layout wins.
/// A request can be served only if its alignment is no stricter than the block size.
///
/// Allocation needs only `&self`, so `&Arena` is the handle containers carry around.
pub struct Arena {
    base: NonNull<u8>,
    region: Layout,
    block_size: usize,
    block_count: usize,
    // 1 bit per block, guards against double-frees
    in_use: BitBox<Cell<usize>, Lsb0>,
    // set on the first block of every live run
    run_start: BitBox<Cell<usize>, Lsb0>,
    used: Cell<usize>,
}

impl Arena {
    /// Reserves a region for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the configuration is invalid.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let total = config.total_bytes().ok_or(ConfigError::RegionTooLarge)?;
        let region = Layout::from_size_align(total, config.block_size)
            .map_err(|_| ConfigError::RegionTooLarge)?;
        let base = match Global.allocate(region) {
            Ok(base) => base,
            Err(_) => std::alloc::handle_alloc_error(region),
        };
        debug!("reserved arena region of {config}");

        Ok(Self {
            base,
            region,
            block_size: config.block_size,
            block_count: config.block_count,
            in_use: BitVec::<Cell<usize>, Lsb0>::repeat(false, config.block_count)
                .into_boxed_bitslice(),
            run_start: BitVec::<Cell<usize>, Lsb0>::repeat(false, config.block_count)
                .into_boxed_bitslice(),
            used: Cell::new(0),
        })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the number of blocks currently handed out.
    #[inline]
    pub fn used_blocks(&self) -> usize {
        self.used.get()
    }

    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.block_count - self.used.get()
    }

    /// Returns the size of the whole region in bytes.
    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.region.size()
    }

    /// Returns `true` if the arena's region contains the pointer address.
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let start = self.base.as_ptr() as usize;
        (start..start + self.region.size()).contains(&(ptr as usize))
    }

    /// Returns the number of blocks needed to hold `bytes`.
    #[inline]
    fn blocks_for(&self, bytes: usize) -> usize {
        (bytes + self.block_size - 1) / self.block_size
    }

    /// Returns the index of the first run of `blocks` free blocks.
    fn find_run(&self, blocks: usize) -> Option<usize> {
        let mut start = 0;
        while start + blocks <= self.block_count {
            match self.in_use[start..start + blocks].last_one() {
                // no run starting at or before the used block can fit
                Some(used) => start += used + 1,
                None => return Some(start),
            }
        }
        None
    }

    fn mark(&self, start: usize, blocks: usize, value: bool) {
        self.run_start.set_aliased(start, value);
        for index in start..start + blocks {
            self.in_use.set_aliased(index, value);
        }
    }

    /// Returns the length of the live run starting at `start`.
    fn run_len(&self, start: usize) -> usize {
        let rest = start + 1;
        let free = self.in_use[rest..].first_zero();
        let next = self.run_start[rest..].first_one();
        let tail = match (free, next) {
            (Some(free), Some(next)) => free.min(next),
            (Some(end), None) | (None, Some(end)) => end,
            (None, None) => self.block_count - rest,
        };
        tail + 1
    }

    /// Frees allocated memory.
    ///
    /// This is [`Allocator::deallocate`] with the outcome reported instead of logged.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this arena with the same `layout`, must not
    /// have been released already, and the memory must not be used afterwards. Pointers that are
    /// detectably wrong are rejected with an error, but a live run released through its own start
    /// pointer cannot be told apart from a legitimate release.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the pointer is not the start of a live run or the layout does not match the
    /// run. The arena is left unchanged in that case.
    pub unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) -> Result<(), AllocError> {
        let rel = RelPtrUsize::<u8>::from_raw(self.base, ptr)
            .map_err(|_| AllocError::PointerOutsideRange)?;
        let addr = rel.addr();
        if addr >= self.region.size() {
            return Err(AllocError::PointerOutsideRange);
        }
        if addr % self.block_size != 0 {
            return Err(AllocError::PointerNotAligned);
        }

        let start = addr / self.block_size;
        if !self.in_use[start] {
            return Err(AllocError::BlockAlreadyFree);
        }
        if !self.run_start[start] {
            return Err(AllocError::PointerNotAligned);
        }
        let blocks = self.run_len(start);
        if self.blocks_for(layout.size()).max(1) != blocks {
            return Err(AllocError::LayoutMismatch);
        }

        self.mark(start, blocks, false);
        self.used.set(self.used.get() - blocks);
        Ok(())
    }
}

unsafe impl Allocator for Arena {
    /// Allocates memory.
    ///
    /// Returns a pointer to an uninitialized run of blocks that meets the size and alignment
    /// required by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = layout.size();
        assert!(size != 0, "zero-sized allocations are not supported");

        if layout.align() > self.block_size {
            error!(
                "alignment requested is stricter than the block size: {} > {}",
                layout.align(),
                self.block_size
            );
            return Err(AllocError::UnsupportedAlignment);
        }

        if size > self.region.size() {
            error!(
                "size requested is larger than the arena: {} > {}",
                ByteSize::b(size as u64).to_string_as(true),
                ByteSize::b(self.region.size() as u64).to_string_as(true)
            );
            return Err(AllocError::RequestTooLarge);
        }

        let blocks = self.blocks_for(size);
        let start = match self.find_run(blocks) {
            Some(start) => start,
            None => {
                error!(
                    "no run of {} free blocks for a request of {} ({} of {} blocks in use)",
                    blocks,
                    ByteSize::b(size as u64).to_string_as(true),
                    self.used.get(),
                    self.block_count
                );
                return Err(AllocError::OutOfMemory);
            }
        };

        self.mark(start, blocks, true);
        self.used.set(self.used.get() + blocks);

        // SAFETY: the run lies inside the region
        Ok(unsafe { RelPtrUsize::<u8>::with_addr(start * self.block_size).resolve(self.base) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Err(err) = self.release(ptr, layout) {
            error!("ignored invalid arena deallocation at {:p}: {}", ptr, err);
        }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        if self.used.get() != 0 {
            warn!(
                "arena dropped with {} of {} blocks still in use",
                self.used.get(),
                self.block_count
            );
        }
        // SAFETY: the region was allocated from `Global` with this layout
        unsafe { Global.deallocate(self.base, self.region) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(block_size: usize, block_count: usize) -> Arena {
        Arena::new(ArenaConfig::new(block_size, block_count)).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            Arena::new(ArenaConfig::new(12, 4)),
            Err(ConfigError::BlockSizeNotPowerOfTwo(12))
        ));
    }

    #[test]
    fn allocations_are_block_aligned_and_disjoint() {
        let arena = arena(16, 8);
        let a = arena.allocate(Layout::new::<u64>()).unwrap();
        let b = arena.allocate(Layout::array::<u64>(3).unwrap()).unwrap();

        assert!(arena.contains(a.as_ptr()));
        assert!(arena.contains(b.as_ptr()));
        assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 16);
        assert_eq!(arena.used_blocks(), 3);
        assert_eq!(arena.free_blocks(), 5);

        unsafe {
            arena.deallocate(a, Layout::new::<u64>());
            arena.deallocate(b, Layout::array::<u64>(3).unwrap());
        }
        assert_eq!(arena.used_blocks(), 0);
    }

    #[test]
    fn freed_blocks_are_reused_first_fit() {
        let arena = arena(16, 4);
        let layout = Layout::from_size_align(16, 8).unwrap();
        let a = arena.allocate(layout).unwrap();
        let b = arena.allocate(layout).unwrap();
        unsafe { arena.release(a, layout) }.unwrap();

        let c = arena.allocate(layout).unwrap();
        assert_eq!(c, a);
        unsafe {
            arena.release(b, layout).unwrap();
            arena.release(c, layout).unwrap();
        }
    }

    #[test]
    fn fragmented_arena_skips_short_runs() {
        let arena = arena(16, 4);
        let one = Layout::from_size_align(16, 8).unwrap();
        let two = Layout::from_size_align(32, 8).unwrap();
        let a = arena.allocate(one).unwrap();
        let b = arena.allocate(one).unwrap();
        let c = arena.allocate(one).unwrap();
        unsafe { arena.release(b, one) }.unwrap();

        // block 1 is free but too short, block 3 is the only other free one
        assert_eq!(arena.allocate(two), Err(AllocError::OutOfMemory));
        unsafe { arena.release(c, one) }.unwrap();
        let d = arena.allocate(two).unwrap();
        assert_eq!(d.as_ptr() as usize - a.as_ptr() as usize, 16);

        // adjacent runs keep their own lengths
        unsafe {
            assert_eq!(arena.release(a, two), Err(AllocError::LayoutMismatch));
            arena.release(a, one).unwrap();
            arena.release(d, two).unwrap();
        }
        assert_eq!(arena.used_blocks(), 0);
    }

    #[test]
    fn request_limits() {
        let arena = arena(16, 4);
        assert_eq!(
            arena.allocate(Layout::from_size_align(65, 8).unwrap()),
            Err(AllocError::RequestTooLarge)
        );
        assert_eq!(
            arena.allocate(Layout::from_size_align(16, 32).unwrap()),
            Err(AllocError::UnsupportedAlignment)
        );
    }

    #[test]
    fn double_free_and_foreign_pointers_are_detected() {
        let arena = arena(16, 4);
        let layout = Layout::new::<u32>();
        let a = arena.allocate(layout).unwrap();
        unsafe {
            assert_eq!(arena.release(a, layout), Ok(()));
            assert_eq!(arena.release(a, layout), Err(AllocError::BlockAlreadyFree));

            let inner = NonNull::new_unchecked(a.as_ptr().add(4));
            assert_eq!(arena.release(inner, layout), Err(AllocError::PointerNotAligned));

            let mut outside = 0u32;
            let outside = NonNull::from(&mut outside).cast::<u8>();
            assert_eq!(
                arena.release(outside, layout),
                Err(AllocError::PointerOutsideRange)
            );
        }
        assert_eq!(arena.used_blocks(), 0);
    }

    #[test]
    fn run_cannot_be_released_from_the_middle() {
        let arena = arena(16, 4);
        let two = Layout::from_size_align(32, 8).unwrap();
        let run = arena.allocate(two).unwrap();
        let second = unsafe { NonNull::new_unchecked(run.as_ptr().add(16)) };
        let one = Layout::from_size_align(16, 8).unwrap();

        unsafe {
            assert_eq!(arena.release(second, one), Err(AllocError::PointerNotAligned));
            assert_eq!(arena.release(second, two), Err(AllocError::PointerNotAligned));
        }
        assert_eq!(arena.used_blocks(), 2);

        // the run is still whole, so the next allocation lands after it
        let next = arena.allocate(two).unwrap();
        assert_eq!(next.as_ptr() as usize - run.as_ptr() as usize, 32);

        unsafe {
            assert_eq!(arena.release(run, one), Err(AllocError::LayoutMismatch));
            arena.release(run, two).unwrap();
            arena.release(next, two).unwrap();
        }
        assert_eq!(arena.used_blocks(), 0);
    }

    #[test]
    fn arrays_sharing_an_arena_never_share_storage() {
        use crate::DynamicArray;

        let arena = arena(16, 4);
        let mut a = DynamicArray::from_slice_in(&[1u64, 2], &arena);
        let layout = Layout::array::<u64>(2).unwrap();
        let inside = unsafe { NonNull::new_unchecked(a.data_mut().add(1)).cast::<u8>() };
        assert!(unsafe { arena.release(inside, layout) }.is_err());

        let b = DynamicArray::from_slice_in(&[9u64, 9], &arena);
        assert_ne!(a.data(), b.data());
        a[0] = 42;
        assert_eq!(b.as_slice(), [9, 9]);
    }
}
