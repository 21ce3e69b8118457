use core::{fmt, iter::FusedIterator, marker::PhantomData, ptr::NonNull, slice};

use super::dynamic_array::release_slots;
use crate::traits::Allocator;

/// An iterator that moves out of a [`DynamicArray`](crate::DynamicArray).
///
/// Elements not yet yielded are destroyed, and the storage released, when the iterator is dropped.
pub struct IntoIter<T, A: Allocator> {
    buf: Option<NonNull<T>>,
    cap: usize,
    // live slots are [start, end)
    start: usize,
    end: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// # Safety
    ///
    /// The parts must describe storage allocated from `alloc` with `[0, len)` live, and nothing else
    /// may own them.
    pub(super) unsafe fn from_raw_parts(
        buf: Option<NonNull<T>>,
        len: usize,
        cap: usize,
        alloc: A,
    ) -> Self {
        Self {
            buf,
            cap,
            start: 0,
            end: len,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Returns the elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        match self.buf {
            // SAFETY: [start, end) are live
            Some(buf) => unsafe {
                slice::from_raw_parts(buf.as_ptr().add(self.start), self.end - self.start)
            },
            None => &[],
        }
    }

    /// # Safety
    ///
    /// `index` must be in `[start, end)` and the slot must not be read again.
    #[inline]
    unsafe fn take_slot(&self, index: usize) -> T {
        let buf = self.buf.unwrap_unchecked();
        buf.as_ptr().add(index).read()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.start += 1;
        // SAFETY: the slot was live and is now outside [start, end)
        Some(unsafe { self.take_slot(self.start - 1) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the slot was live and is now outside [start, end)
        Some(unsafe { self.take_slot(self.end) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf {
            let (start, end) = (self.start, self.end);
            self.start = end;
            for index in start..end {
                // SAFETY: the slot was live and is no longer reachable
                unsafe {
                    self.alloc
                        .destroy(NonNull::new_unchecked(buf.as_ptr().add(index)))
                };
            }
        }
        // SAFETY: no live values remain
        unsafe { release_slots(&self.alloc, self.buf, self.cap) };
    }
}
