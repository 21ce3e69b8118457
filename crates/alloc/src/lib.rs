//! Allocator-parameterized contiguous containers.
//!
//! [`DynamicArray`] is a growable array that takes all of its memory from an [`Allocator`] and
//! keeps allocated storage separate from constructed elements. Allocators available here:
//!
//! - [`Global`], the process-wide allocator (the default),
//! - [`Arena`], a bounded first-fit block allocator over one pre-reserved region,
//! - [`Tracking`], a wrapper that counts the traffic to another allocator and can cap it.
//!
//! ```
//! use tessera_alloc::{Arena, ArenaConfig, DynamicArray};
//!
//! let arena = Arena::new(ArenaConfig::default()).unwrap();
//! let mut values = DynamicArray::new_in(&arena);
//! for i in 0..5 {
//!     values.push_back(i);
//! }
//! assert_eq!(values.capacity(), 8);
//! assert_eq!(values.at(4), Ok(&4));
//! assert!(values.at(5).is_err());
//! ```

pub mod arena;
mod config;
pub mod containers;
mod error;
mod global;
pub mod growth;
pub mod ptr;
mod traits;
mod tracking;

pub use arena::Arena;
pub use config::ArenaConfig;
pub use containers::{Cursor, DynamicArray, IntoIter, RevCursor};
pub use error::{AllocError, ArrayError, ConfigError};
pub use global::Global;
pub use traits::Allocator;
pub use tracking::{AllocStats, Tracking};
