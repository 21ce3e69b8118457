use core::{alloc::Layout, ptr::NonNull};

use crate::error::AllocError;

/// A source of raw memory that containers construct their elements into.
///
/// The allocator only hands out and takes back memory. Containers decide which slots hold live
/// values and route every construction and destruction through [`construct`](Allocator::construct)
/// and [`destroy`](Allocator::destroy).
///
/// # Safety
///
/// - A pointer returned by `allocate` must be valid for reads and writes of `layout.size()` bytes,
///   aligned to `layout.align()`, and must stay valid until it is passed to `deallocate`.
/// - Cloning an allocator (or copying a reference to it) must produce a handle that can
///   deallocate memory allocated by the handle it came from.
pub unsafe trait Allocator {
    /// Allocates a block of memory described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the memory.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block of memory.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator (or a clone of it) with the
    /// same `layout`, and must not have been deallocated already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Constructs `value` in an allocated, unconstructed slot.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and must not hold a live value.
    #[inline]
    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        slot.as_ptr().write(value);
    }

    /// Destroys the live value in `slot`, leaving it allocated but unconstructed.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value, which must not be used afterwards.
    #[inline]
    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        slot.as_ptr().drop_in_place();
    }
}

unsafe impl<A: Allocator> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }

    #[inline]
    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        (**self).construct(slot, value)
    }

    #[inline]
    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        (**self).destroy(slot)
    }
}
