use core::{fmt, marker::PhantomData, mem, ptr::NonNull};
use num_traits::{PrimInt, Unsigned};

/// An error where a memory location cannot be expressed relative to a base address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressError {
    /// The offset overflowed the range of `isize`.
    IsizeOverflow,
    /// The location lies before the base address.
    BelowBase,
    /// The offset does not fit in the address type.
    AddressOverflow,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsizeOverflow => f.write_str("offset overflowed isize"),
            Self::BelowBase => f.write_str("address lies before the base address"),
            Self::AddressOverflow => f.write_str("offset does not fit in the address type"),
        }
    }
}

impl std::error::Error for AddressError {}

fn offset_between(from: usize, to: usize) -> Result<isize, AddressError> {
    let (result, overflow) = to.overflowing_sub(from);
    if (!overflow && result <= (isize::MAX as usize))
        || (overflow && result >= (isize::MIN as usize))
    {
        Ok(result as isize)
    } else {
        Err(AddressError::IsizeOverflow)
    }
}

pub trait Address: PrimInt + Unsigned {
    fn from_usize(addr: usize) -> Option<Self>;
    fn to_usize(self) -> usize;
}

macro_rules! impl_address {
    ($ty:ty) => {
        impl Address for $ty {
            #[inline]
            fn from_usize(addr: usize) -> Option<Self> {
                <$ty>::try_from(addr).ok()
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_address!(usize);
#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl_address!(u32);
#[cfg(target_pointer_width = "64")]
impl_address!(u64);

pub type RelPtrUsize<T> = RelPtr<T, usize>;
#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
pub type RelPtrU32<T> = RelPtr<T, u32>;
#[cfg(target_pointer_width = "64")]
pub type RelPtrU64<T> = RelPtr<T, u64>;

/// A strongly-typed pointer to a memory address, relative to some base address.
#[repr(transparent)]
pub struct RelPtr<T, P: Address> {
    addr: P,
    _marker: PhantomData<*mut T>,
}

impl<T, P: Address> Copy for RelPtr<T, P> {}

impl<T, P: Address> Clone for RelPtr<T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P: Address> PartialEq for RelPtr<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T, P: Address> Eq for RelPtr<T, P> {}

impl<T, P: Address + fmt::Debug> fmt::Debug for RelPtr<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RelPtr").field(&self.addr).finish()
    }
}

impl<T, P: Address> RelPtr<T, P> {
    /// Returns a pointer `addr` bytes past the base.
    ///
    /// # Panics
    ///
    /// Panics if `addr` does not fit in `P`.
    pub fn with_addr(addr: usize) -> Self {
        match P::from_usize(addr) {
            Some(addr) => Self {
                addr,
                _marker: PhantomData,
            },
            None => panic!("relative address {addr} does not fit the address type"),
        }
    }

    /// Expresses `ptr` relative to `base`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `ptr` lies before `base` or the distance does not fit in `P`.
    pub fn from_raw(base: NonNull<u8>, ptr: NonNull<T>) -> Result<Self, AddressError> {
        let offset = offset_between(base.as_ptr() as usize, ptr.as_ptr() as usize)?;
        if offset < 0 {
            return Err(AddressError::BelowBase);
        }
        let addr = P::from_usize(offset as usize).ok_or(AddressError::AddressOverflow)?;
        Ok(Self {
            addr,
            _marker: PhantomData,
        })
    }

    /// Returns the offset in bytes from the base.
    #[inline]
    pub fn addr(self) -> usize {
        self.addr.to_usize()
    }

    #[inline]
    pub fn cast<U>(self) -> RelPtr<U, P> {
        RelPtr {
            addr: self.addr,
            _marker: PhantomData,
        }
    }

    /// Turns the relative pointer back into an absolute one.
    ///
    /// # Safety
    ///
    /// `base` must be the address this pointer was made relative to, and the result must stay
    /// inside the same allocated object as `base`.
    #[inline]
    pub unsafe fn resolve(self, base: NonNull<u8>) -> NonNull<T> {
        NonNull::new_unchecked(base.as_ptr().add(self.addr())).cast()
    }
}

// pointer arithmetic
impl<T, P: Address> RelPtr<T, P> {
    /// Moves the pointer forward by `count` elements of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the new address does not fit in `P`.
    pub fn add(self, count: usize) -> Self {
        let addr = self
            .addr()
            .checked_add(count * mem::size_of::<T>())
            .expect("relative address overflowed");
        Self::with_addr(addr)
    }

    /// Moves the pointer back by `count` elements of `T`.
    ///
    /// # Panics
    ///
    /// Panics if the new address would lie before the base.
    pub fn sub(self, count: usize) -> Self {
        let addr = self
            .addr()
            .checked_sub(count * mem::size_of::<T>())
            .expect("relative address underflowed");
        Self::with_addr(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_between_handles_both_directions() {
        assert_eq!(offset_between(16, 48), Ok(32));
        assert_eq!(offset_between(48, 16), Ok(-32));
        assert_eq!(
            offset_between(0, usize::MAX),
            Err(AddressError::IsizeOverflow)
        );
    }

    #[test]
    fn arithmetic_scales_by_element_size() {
        let ptr = RelPtrUsize::<u64>::with_addr(8);
        assert_eq!(ptr.add(3).addr(), 32);
        assert_eq!(ptr.add(3).sub(1).addr(), 24);
        assert_eq!(ptr.cast::<u8>().add(3).addr(), 11);
    }

    #[test]
    fn round_trip_through_base() {
        let mut buf = [0u32; 8];
        let base = NonNull::from(&mut buf).cast::<u8>();
        let elem = NonNull::from(&mut buf[5]);

        let rel = RelPtrU32::<u32>::from_raw(base, elem).unwrap();
        assert_eq!(rel.addr(), 20);
        assert_eq!(unsafe { rel.resolve(base) }, elem);
    }

    #[test]
    fn pointer_before_base_is_rejected() {
        let mut buf = [0u8; 4];
        let base = NonNull::from(&mut buf[2]);
        let before = NonNull::from(&mut buf[0]);
        assert_eq!(
            RelPtrUsize::<u8>::from_raw(base, before),
            Err(AddressError::BelowBase)
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn narrow_address_type_overflows() {
        assert_eq!(<u32 as Address>::from_usize(u32::MAX as usize + 1), None);
    }
}
