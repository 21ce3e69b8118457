use core::{alloc::Layout, ptr::NonNull};
use std::alloc;

use crate::{error::AllocError, traits::Allocator};

/// The process-wide allocator.
///
/// `Global` is zero-sized, so arrays using it pay nothing for carrying their allocator around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        assert!(layout.size() != 0, "zero-sized allocations are not supported");
        // SAFETY: layout has a non-zero size
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError::OutOfMemory)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout);
    }
}
