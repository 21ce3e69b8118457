//! Growable arrays over pluggable allocators.
//!
//! This crate re-exports [`tessera_alloc`]. Most users only need the [`prelude`].
//!
//! ```
//! use tessera::prelude::*;
//!
//! let tracking = Tracking::new();
//! let mut a = DynamicArray::from_slice_in(&[1, 2, 3], tracking.clone());
//! let b = a.clone();
//! a.push_back(4);
//!
//! assert_eq!(b.capacity(), 3);
//! assert_eq!(a.capacity(), 4);
//! assert!((&a + &b).is_err());
//! assert_eq!(tracking.stats().live_allocations(), 2);
//! ```

pub use tessera_alloc::*;

pub mod prelude {
    pub use tessera_alloc::{
        dynarr, Allocator, Arena, ArenaConfig, ArrayError, DynamicArray, Global, Tracking,
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn prelude_covers_arena_backed_arrays() {
        let arena = Arena::new(ArenaConfig::new(32, 8)).unwrap();
        let mut a = DynamicArray::new_in(&arena);
        a.extend([1u32, 2, 3]);
        let b = a.clone();
        assert_eq!((&a - &b).unwrap().as_slice(), [0, 0, 0]);
        assert_eq!(a.at(3), Err(ArrayError::OutOfRange { index: 3, len: 3 }));
        assert_eq!(arena.used_blocks(), 2);
    }

    #[test]
    fn macro_is_reexported() {
        let v = dynarr![1, 2, 3];
        let rev: Vec<_> = v.into_iter().rev().collect();
        assert_eq!(rev, [3, 2, 1]);
    }
}
