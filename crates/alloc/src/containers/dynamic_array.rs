use core::{
    alloc::Layout,
    fmt,
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Add, Index, IndexMut, Sub},
    ptr::{self, NonNull},
    slice,
};

use log::{error, trace};

use super::{
    cursor::{Cursor, RevCursor},
    into_iter::IntoIter,
};
use crate::{
    error::{AllocError, ArrayError},
    global::Global,
    growth::round_up_pow2,
    traits::Allocator,
};

/// Creates a [`DynamicArray`] containing the arguments.
///
/// ```
/// use tessera_alloc::dynarr;
///
/// let v = dynarr![1, 2, 3];
/// assert_eq!(v.as_slice(), [1, 2, 3]);
/// assert_eq!(v.capacity(), 3);
///
/// let w = dynarr![String::from("hi"); 2];
/// assert_eq!(w.as_slice(), ["hi", "hi"]);
/// ```
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::DynamicArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynamicArray::from_elem($elem, $n)
    };
    ($($elem:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($elem),+])
    };
}

fn slots_layout<T>(count: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(count).map_err(|_| AllocError::CapacityOverflow)
}

/// Allocates `count` unconstructed slots for `T`.
///
/// Zero slots allocate nothing and return `None`. Zero-sized types get a dangling handle without
/// asking the allocator.
pub(super) fn allocate_slots<T, A: Allocator>(
    alloc: &A,
    count: usize,
) -> Result<Option<NonNull<T>>, AllocError> {
    if count == 0 {
        return Ok(None);
    }
    let layout = slots_layout::<T>(count)?;
    if layout.size() == 0 {
        return Ok(Some(NonNull::dangling()));
    }
    alloc.allocate(layout).map(|ptr| Some(ptr.cast()))
}

/// Returns slots obtained from [`allocate_slots`] to the allocator.
///
/// # Safety
///
/// `ptr` and `count` must come from the same `allocate_slots` call on `alloc` (or a clone of it),
/// and none of the slots may hold a live value.
pub(super) unsafe fn release_slots<T, A: Allocator>(
    alloc: &A,
    ptr: Option<NonNull<T>>,
    count: usize,
) {
    if let (Some(ptr), Ok(layout)) = (ptr, slots_layout::<T>(count)) {
        if layout.size() != 0 {
            alloc.deallocate(ptr.cast(), layout);
        }
    }
}

#[track_caller]
fn handle_alloc<R>(result: Result<R, AllocError>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!("dynamic array allocation failed: {err}");
            panic!("dynamic array allocation failed: {err}");
        }
    }
}

/// A contiguous growable array whose storage comes from an [`Allocator`].
///
/// The array owns one block of `capacity` slots. Slots `[0, len)` hold live values and slots
/// `[len, capacity)` are allocated but unconstructed. An array that has never allocated (or has
/// been shrunk to nothing) holds no block at all, and [`data`](Self::data) returns null.
///
/// Appending to a full array grows it to the next power of two, so the capacity after repeated
/// pushes from empty only takes the values 0, 1, 2, 4, 8, …
///
/// Copies are deep and replicate the capacity of the source. Moving an array (or calling
/// [`take`](Self::take)) hands the block over without touching the elements.
pub struct DynamicArray<T, A: Allocator = Global> {
    // None iff cap == 0
    ptr: Option<NonNull<T>>,
    len: usize,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send, A: Allocator + Send> Send for DynamicArray<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for DynamicArray<T, A> {}

impl<T> DynamicArray<T, Global> {
    /// Constructs a new, empty `DynamicArray<T>`. Nothing is allocated.
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Constructs an array of `len` default values with exactly `len` slots.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::with_len_in(len, Global)
    }

    /// Constructs an array holding copies of `values`, with exactly `values.len()` slots.
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(values, Global)
    }

    /// Constructs an array of `n` copies of `elem`.
    pub fn from_elem(elem: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity_in(n, Global);
        if n > 0 {
            for _ in 1..n {
                // SAFETY: n slots were allocated
                unsafe { array.construct_at_end(elem.clone()) };
            }
            unsafe { array.construct_at_end(elem) };
        }
        array
    }
}

impl<T, A: Allocator> DynamicArray<T, A> {
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: None,
            len: 0,
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Constructs an empty array with exactly `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocError> {
        let ptr = allocate_slots::<T, A>(&alloc, capacity)?;
        Ok(Self {
            ptr,
            len: 0,
            cap: capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        handle_alloc(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Constructs an array of `len` default values with exactly `len` slots.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots.
    pub fn try_with_len_in(len: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        let mut array = Self::try_with_capacity_in(len, alloc)?;
        for _ in 0..len {
            // SAFETY: len slots were allocated
            unsafe { array.construct_at_end(T::default()) };
        }
        Ok(array)
    }

    pub fn with_len_in(len: usize, alloc: A) -> Self
    where
        T: Default,
    {
        handle_alloc(Self::try_with_len_in(len, alloc))
    }

    /// Constructs an array holding copies of `values`, with exactly `values.len()` slots.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots.
    pub fn try_from_slice_in(values: &[T], alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut array = Self::try_with_capacity_in(values.len(), alloc)?;
        for value in values {
            // SAFETY: values.len() slots were allocated
            unsafe { array.construct_at_end(value.clone()) };
        }
        Ok(array)
    }

    pub fn from_slice_in(values: &[T], alloc: A) -> Self
    where
        T: Clone,
    {
        handle_alloc(Self::try_from_slice_in(values, alloc))
    }

    /// Deep-copies the array into new storage with the same capacity.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::try_with_capacity_in(self.cap, self.alloc.clone())?;
        for value in self.as_slice() {
            // SAFETY: copy has at least self.len slots
            unsafe { copy.construct_at_end(value.clone()) };
        }
        Ok(copy)
    }

    /// Moves the contents out, leaving `self` empty with no storage.
    ///
    /// No element is touched and nothing is allocated.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    /// Replaces the contents with a deep copy of `other`.
    ///
    /// The copy is built before anything is changed, so on failure `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide storage for the copy.
    pub fn assign(&mut self, other: &Self) -> Result<(), AllocError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = other.try_clone()?;
        copy.swap(self);
        Ok(())
    }

    /// Replaces the contents with copies of `values`, with exactly `values.len()` slots.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots. `self` is left untouched.
    pub fn assign_slice(&mut self, values: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::try_from_slice_in(values, self.alloc.clone())?;
        copy.swap(self);
        Ok(())
    }

    /// Returns a reference to the allocator backing this array.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of allocated slots, constructed or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0 || self.cap == 0
    }

    /// Returns a raw pointer to the storage, or null if nothing is allocated.
    #[inline]
    pub fn data(&self) -> *const T {
        self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr() as *const T)
    }

    #[inline]
    pub fn data_mut(&mut self) -> *mut T {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.ptr {
            // SAFETY: [0, len) are live
            Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.len) },
            None => &[],
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.ptr {
            // SAFETY: [0, len) are live
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Returns the first element, or `None` if the array is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Returns the last element, or `None` if the array is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(ArrayError::OutOfRange { index, len })
    }

    /// Returns the element at `index` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::OutOfRange { index, len })
    }

    /// Returns the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        &*self.slot(index).as_ptr()
    }

    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        &mut *self.slot(index).as_ptr()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Returns a cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.address(), 0)
    }

    /// Returns a cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.address(), self.len)
    }

    /// Returns a reverse cursor at the last element.
    #[inline]
    pub fn rbegin(&self) -> RevCursor<'_, T> {
        RevCursor::new(self.end())
    }

    /// Returns a reverse cursor one before the first element.
    #[inline]
    pub fn rend(&self) -> RevCursor<'_, T> {
        RevCursor::new(self.begin())
    }

    /// Grows the storage to exactly `capacity` slots. Does nothing if the array already has that
    /// many.
    ///
    /// On failure the array is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity <= self.cap {
            return Ok(());
        }
        self.relocate(capacity)
    }

    /// Grows the storage to exactly `capacity` slots. Does nothing if the array already has that
    /// many.
    ///
    /// # Panics
    ///
    /// Panics if the allocator cannot provide the slots.
    pub fn reserve(&mut self, capacity: usize) {
        handle_alloc(self.try_reserve(capacity))
    }

    /// Sets the length to `len`, filling new slots with values returned by `f`.
    ///
    /// Shrinking destroys the dropped elements and keeps the capacity. Growing reserves the next
    /// power of two at or above `len` first.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the slots. The array is left untouched.
    pub fn try_resize_with<F>(&mut self, len: usize, mut f: F) -> Result<(), AllocError>
    where
        F: FnMut() -> T,
    {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }

        self.try_grow_to(len)?;
        while self.len < len {
            // SAFETY: capacity >= len
            unsafe { self.construct_at_end(f()) };
        }
        Ok(())
    }

    pub fn resize_with<F>(&mut self, len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        handle_alloc(self.try_resize_with(len, f))
    }

    /// Sets the length to `len`, filling new slots with default values.
    ///
    /// # Panics
    ///
    /// Panics if the allocator cannot provide the slots.
    pub fn resize(&mut self, len: usize)
    where
        T: Default,
    {
        self.resize_with(len, T::default)
    }

    /// Shortens the array to `len` elements, destroying the rest. Does nothing if `len` is not
    /// less than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old_len = self.len;
        // lower len first, so a panicking destructor cannot cause a double drop
        self.len = len;
        for index in len..old_len {
            // SAFETY: the slot was live and is no longer reachable
            unsafe { self.alloc.destroy(self.slot(index)) };
        }
    }

    /// Destroys every element, keeping the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Shrinks the storage to exactly `len` slots. An empty array releases its storage.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator cannot provide the new block. The array is left untouched.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), AllocError> {
        if self.cap == self.len {
            return Ok(());
        }
        self.relocate(self.len)
    }

    pub fn shrink_to_fit(&mut self) {
        handle_alloc(self.try_shrink_to_fit())
    }

    /// Appends an element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the array was full and the allocator cannot provide more slots. `value`
    /// is dropped and the array is left untouched.
    pub fn try_push_back(&mut self, value: T) -> Result<(), AllocError> {
        self.try_grow_for_one()?;
        // SAFETY: there is at least one free slot
        unsafe { self.construct_at_end(value) };
        Ok(())
    }

    /// Appends an element.
    ///
    /// Takes amortized *O*(1) time.
    ///
    /// # Panics
    ///
    /// Panics if the allocator cannot provide more slots.
    pub fn push_back(&mut self, value: T) {
        handle_alloc(self.try_push_back(value))
    }

    /// Appends the value returned by `make`, which is only called once room has been made, and
    /// returns a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the allocator cannot provide more slots.
    pub fn emplace_back<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        handle_alloc(self.try_grow_for_one());
        // SAFETY: there is at least one free slot, and the new slot is live and borrowed from self
        unsafe {
            let slot = self.construct_at_end(make());
            &mut *slot.as_ptr()
        }
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is no longer reachable
        Some(unsafe { self.slot(self.len).as_ptr().read() })
    }

    /// Exchanges storage, length, capacity and allocator with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns the element-wise sum of two arrays of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::SizeMismatch`] if the lengths differ.
    pub fn try_add<B: Allocator>(&self, rhs: &DynamicArray<T, B>) -> Result<Self, ArrayError>
    where
        T: Clone + Add<Output = T>,
        A: Clone,
    {
        self.zip_with(rhs, |l, r| l.clone() + r.clone())
    }

    /// Returns the element-wise difference of two arrays of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::SizeMismatch`] if the lengths differ.
    pub fn try_sub<B: Allocator>(&self, rhs: &DynamicArray<T, B>) -> Result<Self, ArrayError>
    where
        T: Clone + Sub<Output = T>,
        A: Clone,
    {
        self.zip_with(rhs, |l, r| l.clone() - r.clone())
    }

    fn zip_with<B, F>(&self, rhs: &DynamicArray<T, B>, mut f: F) -> Result<Self, ArrayError>
    where
        B: Allocator,
        A: Clone,
        F: FnMut(&T, &T) -> T,
    {
        if self.len != rhs.len {
            return Err(ArrayError::SizeMismatch {
                left: self.len,
                right: rhs.len,
            });
        }

        let mut out = Self::try_with_capacity_in(self.len, self.alloc.clone())?;
        for (l, r) in self.iter().zip(rhs.iter()) {
            // SAFETY: out has self.len slots
            unsafe { out.construct_at_end(f(l, r)) };
        }
        Ok(out)
    }

    /// Identifies the array for as long as it is borrowed.
    #[inline]
    fn address(&self) -> usize {
        self as *const Self as usize
    }

    /// Hands the storage to an owning iterator.
    fn into_raw_parts(self) -> (Option<NonNull<T>>, usize, usize, A) {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never used or dropped again
        let alloc = unsafe { ptr::read(&me.alloc) };
        (me.ptr, me.len, me.cap, alloc)
    }

    /// Returns the slot at `index`.
    ///
    /// # Safety
    ///
    /// Storage must be allocated and `index` must be at most `cap`.
    #[inline]
    unsafe fn slot(&self, index: usize) -> NonNull<T> {
        let base = self.ptr.unwrap_unchecked();
        NonNull::new_unchecked(base.as_ptr().add(index))
    }

    /// Constructs `value` in the first unconstructed slot and returns it.
    ///
    /// # Safety
    ///
    /// `len` must be less than `cap`.
    #[inline]
    unsafe fn construct_at_end(&mut self, value: T) -> NonNull<T> {
        debug_assert!(self.len < self.cap);
        let slot = self.slot(self.len);
        self.alloc.construct(slot, value);
        self.len += 1;
        slot
    }

    /// Makes room for one more element if the array is full.
    fn try_grow_for_one(&mut self) -> Result<(), AllocError> {
        if self.len < self.cap {
            return Ok(());
        }
        let required = self.len.checked_add(1).ok_or(AllocError::CapacityOverflow)?;
        self.try_grow_to(required)
    }

    /// Reserves the next power of two at or above `required`.
    fn try_grow_to(&mut self, required: usize) -> Result<(), AllocError> {
        let capacity = round_up_pow2(required).ok_or(AllocError::CapacityOverflow)?;
        self.try_reserve(capacity)
    }

    /// Moves the live elements into a new block of exactly `capacity` slots and releases the old
    /// block.
    fn relocate(&mut self, capacity: usize) -> Result<(), AllocError> {
        debug_assert!(capacity >= self.len);
        let new = allocate_slots::<T, A>(&self.alloc, capacity)?;
        trace!(
            "relocating {} of {} slots into a block of {}",
            self.len,
            self.cap,
            capacity
        );

        if let (Some(old), Some(new)) = (self.ptr, new) {
            // SAFETY: the blocks are distinct and both hold at least len slots
            unsafe { ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), self.len) };
        }
        // SAFETY: the live values were moved out above
        unsafe { release_slots(&self.alloc, self.ptr, self.cap) };

        self.ptr = new;
        self.cap = capacity;
        Ok(())
    }
}

impl<T, A: Allocator> Drop for DynamicArray<T, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: no live values remain
        unsafe { release_slots(&self.alloc, self.ptr, self.cap) };
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for DynamicArray<T, A> {
    fn clone(&self) -> Self {
        handle_alloc(self.try_clone())
    }

    fn clone_from(&mut self, source: &Self) {
        handle_alloc(self.assign(source))
    }
}

impl<T, A: Allocator + Default> Default for DynamicArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for DynamicArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Two arrays are equal if both hold storage, have the same length, and are equal element-wise.
///
/// An array without storage is unequal to every array, including another array without storage
/// and itself, so this relation is not reflexive and there is no `Eq` impl.
impl<T, U, A, B> PartialEq<DynamicArray<U, B>> for DynamicArray<T, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &DynamicArray<U, B>) -> bool {
        if self.ptr.is_none() || other.ptr.is_none() {
            return false;
        }
        self.as_slice() == other.as_slice()
    }
}

impl<T, A: Allocator> Index<usize> for DynamicArray<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T, A: Allocator> IndexMut<usize> for DynamicArray<T, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, 'b, T, A> Add<&'b DynamicArray<T, A>> for &'a DynamicArray<T, A>
where
    T: Clone + Add<Output = T>,
    A: Allocator + Clone,
{
    type Output = Result<DynamicArray<T, A>, ArrayError>;

    fn add(self, rhs: &'b DynamicArray<T, A>) -> Self::Output {
        self.try_add(rhs)
    }
}

impl<'a, 'b, T, A> Sub<&'b DynamicArray<T, A>> for &'a DynamicArray<T, A>
where
    T: Clone + Sub<Output = T>,
    A: Allocator + Clone,
{
    type Output = Result<DynamicArray<T, A>, ArrayError>;

    fn sub(self, rhs: &'b DynamicArray<T, A>) -> Self::Output {
        self.try_sub(rhs)
    }
}

impl<T, A: Allocator> AsRef<[T]> for DynamicArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> AsMut<[T]> for DynamicArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator> Extend<T> for DynamicArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Some(required) = self.len.checked_add(lower) {
            if required > self.cap {
                handle_alloc(self.try_grow_to(required));
            }
        }
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T, Global> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T, Global> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity_in(N, Global);
        for value in values {
            // SAFETY: N slots were allocated
            unsafe { array.construct_at_end(value) };
        }
        array
    }
}

impl<T, A: Allocator> IntoIterator for DynamicArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        let (ptr, len, cap, alloc) = self.into_raw_parts();
        // SAFETY: the parts come from a live array that gave up ownership
        unsafe { IntoIter::from_raw_parts(ptr, len, cap, alloc) }
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a DynamicArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut DynamicArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.iter_mut()
    }
}
