use core::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Sub, SubAssign},
};

/// A random-access position in a borrowed [`DynamicArray`](crate::DynamicArray).
///
/// Cursors are cheap to copy and may be moved anywhere, including past either end; only
/// positions in `[0, len)` dereference to an element. The borrow keeps the array from being
/// reallocated or dropped while any cursor into it is alive.
///
/// Cursors compare equal and are ordered only when they come from the same array.
pub struct Cursor<'a, T> {
    slice: &'a [T],
    // address of the array; empty and zero-sized buffers share dangling slice pointers
    owner: usize,
    pos: usize,
}

impl<'a, T> Cursor<'a, T> {
    #[inline]
    pub(crate) fn new(slice: &'a [T], owner: usize, pos: usize) -> Self {
        Self { slice, owner, pos }
    }

    /// Returns the index the cursor points at.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the element under the cursor, or `None` if the cursor is outside `[0, len)`.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.slice.get(self.pos)
    }

    /// Returns the element under the cursor without bounds checking.
    ///
    /// # Safety
    ///
    /// The cursor must be inside `[0, len)`.
    #[inline]
    pub unsafe fn get_unchecked(&self) -> &'a T {
        self.slice.get_unchecked(self.pos)
    }

    /// Moves to the next position.
    #[inline]
    pub fn advance(&mut self) -> &mut Self {
        self.pos = self.pos.wrapping_add(1);
        self
    }

    /// Moves to the previous position.
    #[inline]
    pub fn retreat(&mut self) -> &mut Self {
        self.pos = self.pos.wrapping_sub(1);
        self
    }

    /// Returns a cursor `delta` positions away.
    #[inline]
    pub fn offset(self, delta: isize) -> Self {
        Self {
            pos: self.pos.wrapping_add_signed(delta),
            ..self
        }
    }

    #[inline]
    fn same_array(&self, other: &Self) -> bool {
        self.owner == other.owner
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_array(other) && self.pos == other.pos
    }
}

impl<T> Eq for Cursor<'_, T> {}

/// Cursors into different arrays are unordered.
impl<T> PartialOrd for Cursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.same_array(other)
            .then(|| (self.pos as isize).cmp(&(other.pos as isize)))
    }
}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &(self.pos as isize))
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<T> Add<isize> for Cursor<'_, T> {
    type Output = Self;

    fn add(self, delta: isize) -> Self {
        self.offset(delta)
    }
}

impl<T> Sub<isize> for Cursor<'_, T> {
    type Output = Self;

    fn sub(self, delta: isize) -> Self {
        self.offset(delta.wrapping_neg())
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, delta: isize) {
        *self = self.offset(delta);
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, delta: isize) {
        *self = self.offset(delta.wrapping_neg());
    }
}

/// Returns the number of positions from `rhs` to `self`.
impl<'a, T> Sub for Cursor<'a, T> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        debug_assert!(self.same_array(&rhs));
        self.pos.wrapping_sub(rhs.pos) as isize
    }
}

/// A cursor that walks a [`DynamicArray`](crate::DynamicArray) back to front.
///
/// It wraps a forward cursor and dereferences the element just before it, so the reverse cursor
/// built on `end()` yields the last element and the one built on `begin()` is past the front.
pub struct RevCursor<'a, T> {
    base: Cursor<'a, T>,
}

impl<'a, T> RevCursor<'a, T> {
    #[inline]
    pub fn new(base: Cursor<'a, T>) -> Self {
        Self { base }
    }

    /// Returns the underlying forward cursor, one position after the element this one yields.
    #[inline]
    pub fn base(&self) -> Cursor<'a, T> {
        self.base
    }

    /// Returns the element under the cursor, or `None` if the cursor is past either end.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.base.offset(-1).get()
    }

    /// # Safety
    ///
    /// The cursor must be between `rbegin()` (inclusive) and `rend()` (exclusive).
    #[inline]
    pub unsafe fn get_unchecked(&self) -> &'a T {
        self.base.offset(-1).get_unchecked()
    }

    /// Moves one position towards the front of the array.
    #[inline]
    pub fn advance(&mut self) -> &mut Self {
        self.base.retreat();
        self
    }

    /// Moves one position towards the back of the array.
    #[inline]
    pub fn retreat(&mut self) -> &mut Self {
        self.base.advance();
        self
    }

    #[inline]
    pub fn offset(self, delta: isize) -> Self {
        Self::new(self.base.offset(delta.wrapping_neg()))
    }
}

impl<T> Copy for RevCursor<'_, T> {}

impl<T> Clone for RevCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for RevCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<T> Eq for RevCursor<'_, T> {}

impl<T> PartialOrd for RevCursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.base.partial_cmp(&self.base)
    }
}

impl<T> fmt::Debug for RevCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RevCursor").field(&self.base).finish()
    }
}

impl<T> Add<isize> for RevCursor<'_, T> {
    type Output = Self;

    fn add(self, delta: isize) -> Self {
        self.offset(delta)
    }
}

impl<T> Sub<isize> for RevCursor<'_, T> {
    type Output = Self;

    fn sub(self, delta: isize) -> Self {
        self.offset(delta.wrapping_neg())
    }
}

impl<T> AddAssign<isize> for RevCursor<'_, T> {
    fn add_assign(&mut self, delta: isize) {
        *self = self.offset(delta);
    }
}

impl<T> SubAssign<isize> for RevCursor<'_, T> {
    fn sub_assign(&mut self, delta: isize) {
        *self = self.offset(delta.wrapping_neg());
    }
}

impl<'a, T> Sub for RevCursor<'a, T> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        rhs.base - self.base
    }
}
